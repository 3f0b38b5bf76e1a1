use crate::hash::HashAlgorithm;
use crate::oids;
use certstatus_asn1::{BigInteger, Element, ObjectIdentifier};
use certstatus_asn1_der::Asn1EncodingError;

/// Hash of the data to timestamp, plus the options sent with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimestampRequest {
    hash_algorithm: HashAlgorithm,
    hashed_message: Vec<u8>,
    nonce: Option<BigInteger>,
    cert_req: bool,
}

impl TimestampRequest {
    /// Request for `data`, hashed with `hash_algorithm`.
    pub fn new(hash_algorithm: HashAlgorithm, data: &[u8]) -> Self {
        Self::from_hash(hash_algorithm, hash_algorithm.digest(data))
    }

    /// Request for an already computed hash.
    pub fn from_hash(hash_algorithm: HashAlgorithm, hashed_message: Vec<u8>) -> Self {
        Self {
            hash_algorithm,
            hashed_message,
            nonce: None,
            cert_req: true,
        }
    }

    pub fn with_nonce(mut self, nonce: impl Into<BigInteger>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Whether the TSA should embed its certificate in the reply.
    pub fn with_certificate_request(mut self, cert_req: bool) -> Self {
        self.cert_req = cert_req;
        self
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    pub fn hashed_message(&self) -> &[u8] {
        &self.hashed_message
    }

    pub fn nonce(&self) -> Option<&BigInteger> {
        self.nonce.as_ref()
    }

    pub fn cert_req(&self) -> bool {
        self.cert_req
    }

    pub(crate) fn hash_algorithm_oid(&self) -> ObjectIdentifier {
        oids::object_identifier(self.hash_algorithm.oid())
    }

    /// ```text
    /// MessageImprint ::= SEQUENCE  {
    ///      hashAlgorithm                AlgorithmIdentifier,
    ///      hashedMessage                OCTET STRING  }
    /// ```
    pub(crate) fn message_imprint(&self) -> Element {
        Element::sequence(vec![
            Element::sequence(vec![Element::oid(self.hash_algorithm_oid()), Element::null()]),
            Element::octet_string(self.hashed_message.clone()),
        ])
    }

    /// ```text
    /// TimeStampReq ::= SEQUENCE  {
    ///    version                      INTEGER  { v1(1) },
    ///    messageImprint               MessageImprint,
    ///    reqPolicy             TSAPolicyId              OPTIONAL,
    ///    nonce                 INTEGER                  OPTIONAL,
    ///    certReq               BOOLEAN                  DEFAULT FALSE,
    ///    extensions            [0] IMPLICIT Extensions  OPTIONAL  }
    /// ```
    pub fn to_der(&self) -> Result<Vec<u8>, Asn1EncodingError> {
        let mut fields = vec![Element::integer(1), self.message_imprint()];

        if let Some(nonce) = &self.nonce {
            fields.push(Element::integer(nonce.clone()));
        }

        // DEFAULT FALSE is omitted in DER
        if self.cert_req {
            fields.push(Element::boolean(true));
        }

        certstatus_asn1_der::to_vec(&Element::sequence(fields))
    }
}
