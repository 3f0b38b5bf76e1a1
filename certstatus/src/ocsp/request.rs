use crate::hash::HashAlgorithm;
use crate::oids;
use crate::x509::Certificate;
use certstatus_asn1::{BigInteger, Element};
use certstatus_asn1_der::Asn1EncodingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    /// missing serial number
    #[error("missing the certificate serial number")]
    MissingSerialNumber,

    /// missing issuer name
    #[error("missing the issuer details from the certificate")]
    MissingIssuerName,

    /// missing issuer public key
    #[error("missing the issuer public key from the issuer certificate")]
    MissingIssuerPublicKey,

    /// serial number is not a decimal integer
    #[error("certificate serial number `{serial_number}` is not a decimal integer")]
    InvalidSerialNumber { serial_number: String },

    /// nothing to request
    #[error("an OCSP request needs at least one certificate")]
    Empty,

    /// asn1 encoding error
    #[error("couldn't encode OCSP request: {0}")]
    Encoding(#[from] Asn1EncodingError),
}

/// Status query for a single certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    serial_number: BigInteger,
    issuer_name_der: Vec<u8>,
    issuer_public_key_bytes: Vec<u8>,
}

impl Request {
    /// `serial_number` is the certificate serial number in decimal notation.
    pub fn new<N, K>(serial_number: &str, issuer_name_der: N, issuer_public_key_bytes: K) -> Result<Self, RequestError>
    where
        N: Into<Vec<u8>>,
        K: Into<Vec<u8>>,
    {
        if serial_number.is_empty() {
            return Err(RequestError::MissingSerialNumber);
        }

        if !serial_number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RequestError::InvalidSerialNumber {
                serial_number: serial_number.to_owned(),
            });
        }

        let serial_number = serial_number
            .parse::<BigInteger>()
            .map_err(|_| RequestError::InvalidSerialNumber {
                serial_number: serial_number.to_owned(),
            })?;

        Self::from_parts(serial_number, issuer_name_der.into(), issuer_public_key_bytes.into())
    }

    /// Request for `certificate`, issued by `issuer`.
    pub fn from_certificates(certificate: &Certificate, issuer: &Certificate) -> Result<Self, RequestError> {
        Self::from_parts(
            certificate.serial_number().clone(),
            certificate.issuer_der().to_vec(),
            issuer.public_key_bytes().to_vec(),
        )
    }

    fn from_parts(
        serial_number: BigInteger,
        issuer_name_der: Vec<u8>,
        issuer_public_key_bytes: Vec<u8>,
    ) -> Result<Self, RequestError> {
        if issuer_name_der.is_empty() {
            return Err(RequestError::MissingIssuerName);
        }

        if issuer_public_key_bytes.is_empty() {
            return Err(RequestError::MissingIssuerPublicKey);
        }

        Ok(Self {
            serial_number,
            issuer_name_der,
            issuer_public_key_bytes,
        })
    }

    pub fn serial_number(&self) -> &BigInteger {
        &self.serial_number
    }

    pub fn issuer_name_der(&self) -> &[u8] {
        &self.issuer_name_der
    }

    pub fn issuer_public_key_bytes(&self) -> &[u8] {
        &self.issuer_public_key_bytes
    }

    /// ```text
    /// CertID          ::=     SEQUENCE {
    ///     hashAlgorithm       AlgorithmIdentifier,
    ///     issuerNameHash      OCTET STRING, -- Hash of issuer's DN
    ///     issuerKeyHash       OCTET STRING, -- Hash of issuer's public key
    ///     serialNumber        CertificateSerialNumber }
    /// ```
    pub fn cert_id(&self) -> Element {
        Element::sequence(vec![
            Element::sequence(vec![Element::oid(oids::object_identifier(oids::SHA1)), Element::null()]),
            Element::octet_string(HashAlgorithm::SHA1.digest(&self.issuer_name_der)),
            Element::octet_string(HashAlgorithm::SHA1.digest(&self.issuer_public_key_bytes)),
            Element::integer(self.serial_number.clone()),
        ])
    }
}

/// Certificates queried together in one `OCSPRequest`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestList {
    requests: Vec<Request>,
}

impl RequestList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, request: Request) -> &mut Self {
        self.requests.push(request);
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Request> {
        self.requests.iter()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// ```text
    /// OCSPRequest     ::=     SEQUENCE {
    ///     tbsRequest                  TBSRequest,
    ///     optionalSignature   [0]     EXPLICIT Signature OPTIONAL }
    ///
    /// TBSRequest      ::=     SEQUENCE {
    ///     version             [0]     EXPLICIT Version DEFAULT v1,
    ///     requestorName       [1]     EXPLICIT GeneralName OPTIONAL,
    ///     requestList                 SEQUENCE OF Request,
    ///     requestExtensions   [2]     EXPLICIT Extensions OPTIONAL }
    ///
    /// Request         ::=     SEQUENCE {
    ///     reqCert                     CertID,
    ///     singleRequestExtensions     [0] EXPLICIT Extensions OPTIONAL }
    /// ```
    pub fn to_der(&self) -> Result<Vec<u8>, RequestError> {
        if self.requests.is_empty() {
            return Err(RequestError::Empty);
        }

        let request_list = self
            .requests
            .iter()
            .map(|request| Element::sequence(vec![request.cert_id()]))
            .collect();

        let ocsp_request = Element::sequence(vec![Element::sequence(vec![Element::sequence(request_list)])]);

        Ok(certstatus_asn1_der::to_vec(&ocsp_request)?)
    }
}

impl Extend<Request> for RequestList {
    fn extend<T: IntoIterator<Item = Request>>(&mut self, iter: T) {
        self.requests.extend(iter)
    }
}

impl FromIterator<Request> for RequestList {
    fn from_iter<T: IntoIterator<Item = Request>>(iter: T) -> Self {
        Self {
            requests: iter.into_iter().collect(),
        }
    }
}

impl From<Request> for RequestList {
    fn from(request: Request) -> Self {
        Self {
            requests: vec![request],
        }
    }
}

impl<'a> IntoIterator for &'a RequestList {
    type Item = &'a Request;
    type IntoIter = std::slice::Iter<'a, Request>;

    fn into_iter(self) -> Self::IntoIter {
        self.requests.iter()
    }
}
