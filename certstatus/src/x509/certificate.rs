use crate::key::{KeyError, PublicKey};
use crate::oids::{self, OidResolver};
use crate::pem::{self, Pem, PemError};
use crate::signature::SignatureAlgorithm;
use crate::x509::name::format_name;
use certstatus_asn1::{BigInteger, Element, ObjectIdentifier, UniversalTag};
use certstatus_asn1_der::Asn1DecodingError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error)]
pub enum CertificateError {
    /// asn1 decoding error
    #[error("(asn1) couldn't decode {element}: {source}")]
    Asn1Decoding {
        element: &'static str,
        source: Asn1DecodingError,
    },

    /// invalid PEM label error
    #[error("invalid PEM label: {label}")]
    InvalidPemLabel { label: String },

    /// PEM error
    #[error(transparent)]
    Pem(#[from] PemError),

    /// couldn't read certificate file
    #[error("couldn't read {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    /// public key error
    #[error("invalid subject public key: {0}")]
    Key(#[from] KeyError),

    /// certificate is not yet valid
    #[error("certificate is not yet valid (not before: {not_before}, now: {now})")]
    NotYetValid {
        not_before: OffsetDateTime,
        now: OffsetDateTime,
    },

    /// certificate expired
    #[error("certificate expired (not after: {not_after}, now: {now})")]
    Expired {
        not_after: OffsetDateTime,
        now: OffsetDateTime,
    },
}

const CERT_PEM_LABELS: &[&str] = &["CERTIFICATE", "X509 CERTIFICATE", "TRUSTED CERTIFICATE"];
const CERT_PEM_LABEL: &str = "CERTIFICATE";

/// A certificate extension as found in the `extensions` list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extension {
    oid: ObjectIdentifier,
    critical: bool,
    value: Vec<u8>,
}

impl Extension {
    pub fn oid(&self) -> &ObjectIdentifier {
        &self.oid
    }

    pub fn critical(&self) -> bool {
        self.critical
    }

    /// DER encoding carried by `extnValue`.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    fn decoded_value(&self) -> Option<Element> {
        match certstatus_asn1_der::from_bytes(&self.value) {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("couldn't decode extension {}: {}", self.oid, e);
                None
            }
        }
    }
}

/// X.509 certificate, decoded once and kept alongside its encoding.
///
/// ```text
/// Certificate  ::=  SEQUENCE  {
///      tbsCertificate       TBSCertificate,
///      signatureAlgorithm   AlgorithmIdentifier,
///      signatureValue       BIT STRING  }
///
/// TBSCertificate  ::=  SEQUENCE  {
///      version         [0]  EXPLICIT Version DEFAULT v1,
///      serialNumber         CertificateSerialNumber,
///      signature            AlgorithmIdentifier,
///      issuer               Name,
///      validity             Validity,
///      subject              Name,
///      subjectPublicKeyInfo SubjectPublicKeyInfo,
///      issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
///      subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
///      extensions      [3]  EXPLICIT Extensions OPTIONAL }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    tbs_der: Vec<u8>,
    serial_number: BigInteger,
    issuer: Element,
    issuer_der: Vec<u8>,
    subject: Element,
    subject_der: Vec<u8>,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
    subject_public_key_info: Element,
    extensions: Vec<Extension>,
    signature_algorithm: ObjectIdentifier,
    signature_value: Vec<u8>,
}

impl Certificate {
    /// Decodes a DER certificate. The encodings it exposes and verifies are slices of `der`, kept as received.
    pub fn from_der<T: ?Sized + AsRef<[u8]>>(der: &T) -> Result<Self, CertificateError> {
        let der = der.as_ref();
        let certificate = certstatus_asn1_der::from_bytes(der).map_err(|source| CertificateError::Asn1Decoding {
            element: "certificate",
            source,
        })?;
        Self::decode(&certificate, der)
    }

    fn decode(certificate: &Element, der: &[u8]) -> Result<Self, CertificateError> {
        let tbs = required(certificate.first_untagged_child(UniversalTag::SEQUENCE), "tbsCertificate")?;
        let signature_algorithm = required(
            certificate
                .nth_untagged_child(1, UniversalTag::SEQUENCE)
                .and_then(|algorithm| algorithm.first_untagged_child(UniversalTag::OID))
                .and_then(Element::as_oid),
            "signatureAlgorithm",
        )?
        .clone();
        let signature_value = required(
            certificate
                .first_untagged_child(UniversalTag::BIT_STRING)
                .and_then(Element::as_bit_string),
            "signatureValue",
        )?
        .data()
        .to_vec();

        let serial_number = required(
            tbs.first_untagged_child(UniversalTag::INTEGER).and_then(Element::as_integer),
            "serialNumber",
        )?;
        let issuer = required(tbs.nth_untagged_child(1, UniversalTag::SEQUENCE), "issuer")?;
        let validity = required(tbs.nth_untagged_child(2, UniversalTag::SEQUENCE), "validity")?;
        let subject = required(tbs.nth_untagged_child(3, UniversalTag::SEQUENCE), "subject")?;
        let subject_public_key_info =
            required(tbs.nth_untagged_child(4, UniversalTag::SEQUENCE), "subjectPublicKeyInfo")?.clone();

        let (not_before, not_after) = match validity.children() {
            [not_before, not_after, ..] => (
                required(not_before.as_time(), "notBefore")?,
                required(not_after.as_time(), "notAfter")?,
            ),
            _ => return Err(missing("validity")),
        };

        let extensions = tbs
            .context_child(3)
            .map(|extensions| extensions.children().iter().filter_map(parse_extension).collect())
            .unwrap_or_default();

        let tbs_der = required(certstatus_asn1_der::child_encoding(der, certificate, tbs), "tbsCertificate")?;
        let issuer_der = required(certstatus_asn1_der::child_encoding(tbs_der, tbs, issuer), "issuer")?;
        let subject_der = required(certstatus_asn1_der::child_encoding(tbs_der, tbs, subject), "subject")?;

        Ok(Self {
            der: der.to_vec(),
            tbs_der: tbs_der.to_vec(),
            serial_number: serial_number.clone(),
            issuer_der: issuer_der.to_vec(),
            issuer: issuer.clone(),
            subject_der: subject_der.to_vec(),
            subject: subject.clone(),
            not_before,
            not_after,
            subject_public_key_info,
            extensions,
            signature_algorithm,
            signature_value,
        })
    }

    pub fn from_pem(pem: &Pem) -> Result<Self, CertificateError> {
        if CERT_PEM_LABELS.contains(&pem.label()) {
            Self::from_der(pem.data())
        } else {
            Err(CertificateError::InvalidPemLabel {
                label: pem.label().to_owned(),
            })
        }
    }

    pub fn from_pem_str(pem_str: &str) -> Result<Self, CertificateError> {
        let pem = pem::parse_pem(pem_str)?;
        Self::from_pem(&pem)
    }

    /// Loads a certificate from either PEM or raw DER.
    pub fn load(bytes: &[u8]) -> Result<Self, CertificateError> {
        if pem::ensure_der(bytes)?.as_ref() == bytes {
            Self::from_der(bytes)
        } else {
            Self::from_pem(&pem::parse_pem(bytes)?)
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CertificateError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| CertificateError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::load(&bytes)
    }

    pub fn to_der(&self) -> &[u8] {
        &self.der
    }

    pub fn to_pem(&self) -> Pem<'static> {
        Pem::new(CERT_PEM_LABEL, self.der.clone())
    }

    pub fn serial_number(&self) -> &BigInteger {
        &self.serial_number
    }

    pub fn issuer(&self) -> &Element {
        &self.issuer
    }

    /// DER encoding of the issuer `Name`.
    pub fn issuer_der(&self) -> &[u8] {
        &self.issuer_der
    }

    pub fn subject(&self) -> &Element {
        &self.subject
    }

    /// DER encoding of the subject `Name`.
    pub fn subject_der(&self) -> &[u8] {
        &self.subject_der
    }

    pub fn issuer_name(&self) -> String {
        format_name(&self.issuer, None)
    }

    pub fn issuer_name_with(&self, resolver: &dyn OidResolver) -> String {
        format_name(&self.issuer, Some(resolver))
    }

    pub fn subject_name(&self) -> String {
        format_name(&self.subject, None)
    }

    pub fn subject_name_with(&self, resolver: &dyn OidResolver) -> String {
        format_name(&self.subject, Some(resolver))
    }

    pub fn not_before(&self) -> OffsetDateTime {
        self.not_before
    }

    pub fn not_after(&self) -> OffsetDateTime {
        self.not_after
    }

    pub fn check_validity_at(&self, now: OffsetDateTime) -> Result<(), CertificateError> {
        if self.not_before > now {
            return Err(CertificateError::NotYetValid {
                not_before: self.not_before,
                now,
            });
        }

        if self.not_after < now {
            return Err(CertificateError::Expired {
                not_after: self.not_after,
                now,
            });
        }

        Ok(())
    }

    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        self.check_validity_at(now).is_ok()
    }

    pub fn subject_public_key_info(&self) -> &Element {
        &self.subject_public_key_info
    }

    /// Content of the `subjectPublicKey` BIT STRING, what OCSP hashes into `issuerKeyHash`.
    pub fn public_key_bytes(&self) -> &[u8] {
        self.subject_public_key_info
            .first_untagged_child(UniversalTag::BIT_STRING)
            .and_then(Element::as_bit_string)
            .map(|bits| bits.data())
            .unwrap_or_default()
    }

    pub fn public_key(&self) -> Result<PublicKey, CertificateError> {
        Ok(PublicKey::from_subject_public_key_info(&self.subject_public_key_info)?)
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn extension(&self, oid: &str) -> Option<&Extension> {
        self.extensions.iter().find(|extension| extension.oid.as_str() == oid)
    }

    pub fn ocsp_responder_url(&self) -> Option<String> {
        self.access_location(oids::AD_OCSP)
    }

    pub fn ca_issuers_url(&self) -> Option<String> {
        self.access_location(oids::AD_CA_ISSUERS)
    }

    /// ```text
    /// AuthorityInfoAccessSyntax  ::= SEQUENCE SIZE (1..MAX) OF AccessDescription
    ///
    /// AccessDescription  ::=  SEQUENCE {
    ///         accessMethod          OBJECT IDENTIFIER,
    ///         accessLocation        GeneralName  }
    /// ```
    ///
    /// Only `uniformResourceIdentifier [6] IA5String` locations are returned.
    fn access_location(&self, method: &str) -> Option<String> {
        let access = self.extension(oids::AUTHORITY_INFO_ACCESS)?.decoded_value()?;

        access.children().iter().find_map(|description| {
            let access_method = description.first_untagged_child(UniversalTag::OID)?.as_oid()?;
            if access_method.as_str() != method {
                return None;
            }

            let location = description.context_child(6)?.as_raw_primitive()?;
            String::from_utf8(location.to_vec()).ok()
        })
    }

    pub fn subject_key_identifier(&self) -> Option<Vec<u8>> {
        let identifier = self.extension(oids::SUBJECT_KEY_IDENTIFIER)?.decoded_value()?;
        identifier.as_octet_string().map(<[u8]>::to_vec)
    }

    pub fn has_extended_key_usage(&self, purpose: &str) -> bool {
        self.extension(oids::EXTENDED_KEY_USAGE)
            .and_then(Extension::decoded_value)
            .map(|usages| {
                usages
                    .children()
                    .iter()
                    .filter_map(Element::as_oid)
                    .any(|usage| usage.as_str() == purpose)
            })
            .unwrap_or(false)
    }

    /// DER encoding of `tbsCertificate`, the signed part.
    pub fn tbs_certificate_der(&self) -> &[u8] {
        &self.tbs_der
    }

    pub fn signature_algorithm(&self) -> &ObjectIdentifier {
        &self.signature_algorithm
    }

    pub fn signature_value(&self) -> &[u8] {
        &self.signature_value
    }

    /// Whether `issuer` is named as this certificate's issuer and its key verifies this certificate's signature.
    pub fn is_issued_by(&self, issuer: &Certificate) -> bool {
        if self.issuer_der != issuer.subject_der {
            return false;
        }

        let verified = SignatureAlgorithm::from_oid(&self.signature_algorithm)
            .map_err(|e| e.to_string())
            .and_then(|algorithm| {
                let key = issuer.public_key().map_err(|e| e.to_string())?;
                algorithm
                    .verify(&key, &self.tbs_der, &self.signature_value)
                    .map_err(|e| e.to_string())
            });

        match verified {
            Ok(()) => true,
            Err(e) => {
                log::debug!(
                    "{} is not issued by {}: {}",
                    self.subject_name(),
                    issuer.subject_name(),
                    e
                );
                false
            }
        }
    }
}

/// ```text
/// Extension  ::=  SEQUENCE  {
///      extnID      OBJECT IDENTIFIER,
///      critical    BOOLEAN DEFAULT FALSE,
///      extnValue   OCTET STRING  }
/// ```
fn parse_extension(extension: &Element) -> Option<Extension> {
    let oid = extension.first_untagged_child(UniversalTag::OID)?.as_oid()?.clone();
    let critical = extension
        .first_untagged_child(UniversalTag::BOOLEAN)
        .and_then(Element::as_boolean)
        .unwrap_or(false);
    let value = extension
        .first_untagged_child(UniversalTag::OCTET_STRING)?
        .as_octet_string()?
        .to_vec();

    Some(Extension { oid, critical, value })
}

fn required<T>(value: Option<T>, element: &'static str) -> Result<T, CertificateError> {
    value.ok_or_else(|| missing(element))
}

fn missing(element: &'static str) -> CertificateError {
    CertificateError::Asn1Decoding {
        element,
        source: Asn1DecodingError::missing(element),
    }
}
