use crate::hash::HashAlgorithm;
use crate::oids;
use crate::signature::SignatureAlgorithm;
use crate::tsa::{TimestampRequest, TsaError};
use crate::x509::Certificate;
use certstatus_asn1::{BigInteger, Element, ObjectIdentifier, UniversalTag};
use certstatus_asn1_der::{Asn1DecodingError, Decoder};
use time::OffsetDateTime;

/// Validated time-stamp token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimestampToken {
    der: Vec<u8>,
    gen_time: OffsetDateTime,
    serial_number: BigInteger,
    policy: ObjectIdentifier,
    hash_algorithm: HashAlgorithm,
    hashed_message: Vec<u8>,
    nonce: Option<BigInteger>,
}

impl TimestampToken {
    /// DER encoding of the `TimeStampToken` ContentInfo, as it would be embedded in a signature.
    pub fn to_der(&self) -> &[u8] {
        &self.der
    }

    pub fn gen_time(&self) -> OffsetDateTime {
        self.gen_time
    }

    pub fn serial_number(&self) -> &BigInteger {
        &self.serial_number
    }

    pub fn policy(&self) -> &ObjectIdentifier {
        &self.policy
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
}

/// Certificates the token validation may look into.
pub(crate) struct Trust<'a> {
    pub trusted_certificates: &'a [Certificate],
    pub validation_time: OffsetDateTime,
}

/// ```text
/// TimeStampToken ::= ContentInfo
///
/// ContentInfo ::= SEQUENCE {
///   contentType ContentType,
///   content [0] EXPLICIT ANY DEFINED BY contentType }
///
/// SignedData ::= SEQUENCE {
///   version CMSVersion,
///   digestAlgorithms DigestAlgorithmIdentifiers,
///   encapContentInfo EncapsulatedContentInfo,
///   certificates [0] IMPLICIT CertificateSet OPTIONAL,
///   crls [1] IMPLICIT RevocationInfoChoices OPTIONAL,
///   signerInfos SignerInfos }
///
/// EncapsulatedContentInfo ::= SEQUENCE {
///   eContentType ContentType,
///   eContent [0] EXPLICIT OCTET STRING OPTIONAL }
/// ```
pub(crate) fn validate_token(
    token: &Element,
    token_der: &[u8],
    request: &TimestampRequest,
    trust: &Trust<'_>,
) -> Result<TimestampToken, TsaError> {
    let content_type = token
        .first_untagged_child(UniversalTag::OID)
        .and_then(Element::as_oid)
        .ok_or_else(|| missing("contentType"))?;

    if content_type.as_str() != oids::SIGNED_DATA {
        return Err(TsaError::InvalidResponse {
            context: format!("time-stamp token content is {}", oids::name_or_dotted(content_type)),
        });
    }

    let signed_data = token.context_child(0).ok_or_else(|| missing("SignedData"))?;
    let signed_data_der = encoding_of(token_der, token, signed_data)?;

    let encap_content_info = signed_data
        .first_untagged_child(UniversalTag::SEQUENCE)
        .ok_or_else(|| missing("encapContentInfo"))?;

    let e_content_type = encap_content_info
        .first_untagged_child(UniversalTag::OID)
        .and_then(Element::as_oid)
        .ok_or_else(|| missing("eContentType"))?;

    if e_content_type.as_str() != oids::TST_INFO {
        return Err(TsaError::InvalidResponse {
            context: format!("encapsulated content is {}", oids::name_or_dotted(e_content_type)),
        });
    }

    let e_content = encap_content_info
        .context_child(0)
        .and_then(Element::as_octet_string)
        .ok_or_else(|| missing("eContent"))?;

    let certificates = match signed_data.context_child(0) {
        Some(certificates) => Decoder::new().nested_encodings(encoding_of(signed_data_der, signed_data, certificates)?)?,
        None => Vec::new(),
    };
    let embedded: Vec<Certificate> = certificates
        .into_iter()
        .filter_map(|certificate| match Certificate::from_der(certificate) {
            Ok(certificate) => Some(certificate),
            Err(e) => {
                log::warn!("ignoring embedded certificate: {}", e);
                None
            }
        })
        .collect();

    let signer_infos = signed_data
        .nth_untagged_child(1, UniversalTag::SET)
        .ok_or_else(|| missing("SignerInfos"))?;
    let signer_info = signer_infos.children().first().ok_or_else(|| missing("SignerInfo"))?;
    let signer_info_der = encoding_of(encoding_of(signed_data_der, signed_data, signer_infos)?, signer_infos, signer_info)?;

    verify_signer_info(signer_info, signer_info_der, e_content, &embedded, trust)?;

    let tst_info = decode_tst_info(&certstatus_asn1_der::from_bytes(e_content)?, request)?;

    Ok(TimestampToken {
        der: token_der.to_vec(),
        ..tst_info
    })
}

/// ```text
/// SignerInfo ::= SEQUENCE {
///   version CMSVersion,
///   sid SignerIdentifier,
///   digestAlgorithm DigestAlgorithmIdentifier,
///   signedAttrs [0] IMPLICIT SignedAttributes OPTIONAL,
///   signatureAlgorithm SignatureAlgorithmIdentifier,
///   signature SignatureValue,
///   unsignedAttrs [1] IMPLICIT UnsignedAttributes OPTIONAL }
///
/// SignerIdentifier ::= CHOICE {
///   issuerAndSerialNumber IssuerAndSerialNumber,
///   subjectKeyIdentifier [0] SubjectKeyIdentifier }
/// ```
fn verify_signer_info(
    signer_info: &Element,
    signer_info_der: &[u8],
    e_content: &[u8],
    embedded: &[Certificate],
    trust: &Trust<'_>,
) -> Result<(), TsaError> {
    let fields = signer_info.children();
    let sid = fields.get(1).ok_or_else(|| missing("sid"))?;

    let candidates = || embedded.iter().chain(trust.trusted_certificates);

    let signer = match sid.as_sequence() {
        Some(_) => {
            let issuer = sid
                .first_untagged_child(UniversalTag::SEQUENCE)
                .ok_or_else(|| missing("IssuerAndSerialNumber issuer"))?;
            let issuer = encoding_of(encoding_of(signer_info_der, signer_info, sid)?, sid, issuer)?;
            let serial_number = sid
                .first_untagged_child(UniversalTag::INTEGER)
                .and_then(Element::as_integer)
                .ok_or_else(|| missing("IssuerAndSerialNumber serialNumber"))?;

            candidates()
                .find(|certificate| certificate.issuer_der() == issuer && certificate.serial_number() == serial_number)
        }
        None => {
            let key_identifier = sid.as_raw_primitive().ok_or_else(|| TsaError::InvalidResponse {
                context: "unexpected signer identifier".to_owned(),
            })?;

            candidates().find(|certificate| certificate.subject_key_identifier().as_deref() == Some(key_identifier))
        }
    }
    .ok_or(TsaError::SignerCertificateNotFound)?;

    let issuer = find_issuer(signer, candidates(), trust)?;
    signer.check_validity_at(trust.validation_time)?;
    issuer.check_validity_at(trust.validation_time)?;

    log::debug!(
        "time-stamp token signed by {}, issued by {}",
        signer.subject_name(),
        issuer.subject_name()
    );

    // digestAlgorithm and signatureAlgorithm, after sid
    let mut algorithms = fields
        .iter()
        .skip(2)
        .filter(|field| field.is_untagged() && field.as_sequence().is_some())
        .filter_map(|field| field.first_untagged_child(UniversalTag::OID))
        .filter_map(Element::as_oid);
    let digest_algorithm = algorithms.next().ok_or_else(|| missing("digestAlgorithm"))?;
    let signature_algorithm = algorithms.next().ok_or_else(|| missing("signatureAlgorithm"))?;

    let signature = signer_info
        .first_untagged_child(UniversalTag::OCTET_STRING)
        .and_then(Element::as_octet_string)
        .ok_or_else(|| missing("signature"))?;

    // sid may be context-specific 0 as well
    let signed_attributes = fields
        .iter()
        .skip(2)
        .find(|field| field.context_number() == Some(0))
        .ok_or_else(|| missing("signedAttrs"))?;

    let algorithm = SignatureAlgorithm::from_cms(signature_algorithm, digest_algorithm)?;

    let message_digest = signed_attributes
        .implicit_list_entries()
        .iter()
        .find(|attribute| {
            attribute
                .first_untagged_child(UniversalTag::OID)
                .and_then(Element::as_oid)
                .map(|ty| ty.as_str() == oids::MESSAGE_DIGEST)
                .unwrap_or(false)
        })
        .and_then(|attribute| attribute.first_untagged_child(UniversalTag::SET))
        .and_then(|values| values.children().first())
        .and_then(Element::as_octet_string)
        .map(<[u8]>::to_vec)
        .ok_or_else(|| missing("messageDigest attribute"))?;

    if message_digest != algorithm.hash_algorithm().digest(e_content) {
        return Err(TsaError::MessageDigestMismatch);
    }

    // signed as an explicit SET OF, not with the implicit [0] used on the wire
    let mut signed = encoding_of(signer_info_der, signer_info, signed_attributes)?.to_vec();
    if let Some(identifier) = signed.first_mut() {
        *identifier = SET_OF_IDENTIFIER;
    }

    algorithm
        .verify(&signer.public_key()?, &signed, signature)
        .map_err(|e| {
            log::debug!("signer info signature: {}", e);
            TsaError::SignatureVerificationFailed
        })
}

/// Constructed universal SET, in place of the `[0]` identifier of `signedAttrs`.
const SET_OF_IDENTIFIER: u8 = 0x31;

/// First trusted candidate named as the signer's issuer whose key verifies the signer.
///
/// Cross-signed CAs give several candidates the same subject.
fn find_issuer<'a>(
    signer: &Certificate,
    candidates: impl Iterator<Item = &'a Certificate>,
    trust: &Trust<'_>,
) -> Result<&'a Certificate, TsaError> {
    let mut untrusted = None;
    let mut unverified = false;

    for issuer in candidates.filter(|certificate| certificate.subject_der() == signer.issuer_der()) {
        if !trust.trusted_certificates.is_empty() && !trust.trusted_certificates.contains(issuer) {
            log::debug!("{} is not trusted", issuer.subject_name());
            untrusted.get_or_insert(issuer);
        } else if signer.is_issued_by(issuer) {
            return Ok(issuer);
        } else {
            unverified = true;
        }
    }

    if unverified {
        Err(TsaError::SignatureVerificationFailed)
    } else if let Some(issuer) = untrusted {
        Err(TsaError::UntrustedIssuer {
            issuer: issuer.subject_name(),
        })
    } else {
        Err(TsaError::IssuerCertificateNotFound {
            issuer: signer.issuer_name(),
        })
    }
}

fn encoding_of<'a>(parent_der: &'a [u8], parent: &Element, child: &Element) -> Result<&'a [u8], TsaError> {
    certstatus_asn1_der::child_encoding(parent_der, parent, child).ok_or_else(|| TsaError::InvalidResponse {
        context: "element not found in its encoding".to_owned(),
    })
}

/// ```text
/// TSTInfo ::= SEQUENCE  {
///    version                      INTEGER  { v1(1) },
///    policy                       TSAPolicyId,
///    messageImprint               MessageImprint,
///    serialNumber                 INTEGER,
///    genTime                      GeneralizedTime,
///    accuracy                     Accuracy                 OPTIONAL,
///    ordering                     BOOLEAN             DEFAULT FALSE,
///    nonce                        INTEGER                  OPTIONAL,
///    tsa                          [0] GeneralName          OPTIONAL,
///    extensions                   [1] IMPLICIT Extensions   OPTIONAL  }
/// ```
fn decode_tst_info(tst_info: &Element, request: &TimestampRequest) -> Result<TimestampToken, TsaError> {
    let policy = tst_info
        .first_untagged_child(UniversalTag::OID)
        .and_then(Element::as_oid)
        .ok_or_else(|| missing("TSTInfo policy"))?
        .clone();

    let message_imprint = tst_info
        .first_untagged_child(UniversalTag::SEQUENCE)
        .ok_or_else(|| missing("TSTInfo messageImprint"))?;

    let hash_algorithm = message_imprint
        .first_untagged_child(UniversalTag::SEQUENCE)
        .and_then(|algorithm| algorithm.first_untagged_child(UniversalTag::OID))
        .and_then(Element::as_oid)
        .ok_or_else(|| missing("messageImprint hashAlgorithm"))?;

    let hashed_message = message_imprint
        .first_untagged_child(UniversalTag::OCTET_STRING)
        .and_then(Element::as_octet_string)
        .ok_or_else(|| missing("messageImprint hashedMessage"))?;

    if *hash_algorithm != request.hash_algorithm_oid() || hashed_message != request.hashed_message() {
        return Err(TsaError::ImprintMismatch);
    }

    let serial_number = tst_info
        .nth_untagged_child(1, UniversalTag::INTEGER)
        .and_then(Element::as_integer)
        .ok_or_else(|| missing("TSTInfo serialNumber"))?
        .clone();

    let gen_time = tst_info
        .first_untagged_child(UniversalTag::GENERALIZED_TIME)
        .and_then(Element::as_generalized_time)
        .ok_or_else(|| missing("TSTInfo genTime"))?;

    let nonce = tst_info
        .nth_untagged_child(2, UniversalTag::INTEGER)
        .and_then(Element::as_integer)
        .cloned();

    if let Some(sent) = request.nonce() {
        if nonce.as_ref() != Some(sent) {
            return Err(TsaError::NonceMismatch);
        }
    }

    Ok(TimestampToken {
        der: Vec::new(),
        gen_time,
        serial_number,
        policy,
        hash_algorithm: request.hash_algorithm(),
        hashed_message: hashed_message.to_vec(),
        nonce,
    })
}

fn missing(element: &'static str) -> TsaError {
    TsaError::Decoding(Asn1DecodingError::missing(element))
}
