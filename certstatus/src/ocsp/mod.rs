//! Online Certificate Status Protocol client ([RFC 6960](https://www.rfc-editor.org/rfc/rfc6960)).

mod request;
mod response;

pub use request::{Request, RequestError, RequestList};
pub use response::{CertStatus, RevocationReason, Response, ResponseList};

use crate::http::{self, HttpTransport, TransportError, OCSP_REQUEST_MEDIA_TYPE, OCSP_RESPONSE_MEDIA_TYPE};
use crate::oids;
use crate::signature::{self, SignatureAlgorithm, SignatureError};
use crate::x509::{Certificate, CertificateError};
use certstatus_asn1::{Element, ObjectIdentifier, UniversalTag};
use certstatus_asn1_der::{Asn1DecodingError, Decoder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcspError {
    /// responder rejected the request as malformed
    #[error("OCSP responder reported a malformed request")]
    MalformedRequest,

    /// responder internal error
    #[error("OCSP responder reported an internal error")]
    InternalError,

    /// responder asks to try again later
    #[error("OCSP responder is busy, try again later")]
    TryLater,

    /// responder requires signed requests
    #[error("OCSP responder requires a signed request")]
    SigRequired,

    /// client isn't authorized to query this responder
    #[error("unauthorized to query this OCSP responder")]
    Unauthorized,

    /// response doesn't follow the expected structure
    #[error("invalid OCSP response: {context}")]
    InvalidResponse { context: String },

    /// response carries no revocation data
    #[error("OCSP response carries no revocation data")]
    MissingResponseBytes,

    /// a single response was expected
    #[error("OCSP response carries more than one certificate status")]
    MultipleResponses,

    /// response type other than id-pkix-ocsp-basic
    #[error("unsupported OCSP response type: {response_type}")]
    UnsupportedResponseType { response_type: String },

    /// response signature couldn't be verified
    #[error("OCSP response signature couldn't be verified with the available certificates")]
    SignatureVerificationFailed,

    /// no certificate to verify the response with
    #[error("OCSP response carries no certificate and no signer certificate is configured")]
    UnauthenticatedResponse,

    /// asn1 decoding error
    #[error("couldn't decode OCSP response: {0}")]
    Decoding(#[from] Asn1DecodingError),

    /// certificate error
    #[error(transparent)]
    Certificate(#[from] CertificateError),

    /// request error
    #[error(transparent)]
    Request(#[from] RequestError),

    /// transport error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// signature error
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// What to do with a response when no certificate is available to verify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationPolicy {
    /// Accept the response unverified when neither a signer certificate nor an embedded certificate exists.
    SkipWhenNoCertificate,
    /// Every response must be verified.
    RequireSignature,
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self::SkipWhenNoCertificate
    }
}

#[derive(Debug, Clone, Default)]
pub struct OcspConfig {
    pub verification: VerificationPolicy,
    /// Responder (or CA) certificate trusted to sign responses.
    pub signer_certificate: Option<Certificate>,
}

/// Decodes and verifies OCSP responses.
#[derive(Debug, Clone, Default)]
pub struct Ocsp {
    config: OcspConfig,
}

impl Ocsp {
    pub fn new(config: OcspConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OcspConfig {
        &self.config
    }

    /// Posts `requests` to the responder at `url` and decodes its answer.
    pub fn query<T: HttpTransport + ?Sized>(
        &self,
        transport: &T,
        url: &str,
        requests: &RequestList,
    ) -> Result<ResponseList, OcspError> {
        let body = requests.to_der()?;
        let response = http::exchange(transport, url, OCSP_REQUEST_MEDIA_TYPE, OCSP_RESPONSE_MEDIA_TYPE, body)?;
        self.decode_response(&response)
    }

    /// Decodes the only certificate status of an `OCSPResponse`.
    pub fn decode_single_response(&self, der: &[u8]) -> Result<Response, OcspError> {
        self.decode_response(der)?.into_single()
    }

    /// ```text
    /// OCSPResponse ::= SEQUENCE {
    ///    responseStatus         OCSPResponseStatus,
    ///    responseBytes          [0] EXPLICIT ResponseBytes OPTIONAL }
    ///
    /// ResponseBytes ::=       SEQUENCE {
    ///    responseType   OBJECT IDENTIFIER,
    ///    response       OCTET STRING }
    /// ```
    pub fn decode_response(&self, der: &[u8]) -> Result<ResponseList, OcspError> {
        let ocsp_response = certstatus_asn1_der::from_bytes(der)?;

        let status = ocsp_response
            .first_untagged_child(UniversalTag::ENUMERATED)
            .and_then(Element::as_enumerated)
            .ok_or_else(|| OcspError::Decoding(Asn1DecodingError::missing("responseStatus")))?;

        match status.to_u64() {
            Some(0) => {}
            Some(1) => return Err(OcspError::MalformedRequest),
            Some(2) => return Err(OcspError::InternalError),
            Some(3) => return Err(OcspError::TryLater),
            Some(5) => return Err(OcspError::SigRequired),
            Some(6) => return Err(OcspError::Unauthorized),
            _ => {
                return Err(OcspError::InvalidResponse {
                    context: format!("unknown response status {}", status),
                })
            }
        }

        let response_bytes = ocsp_response
            .context_child(0)
            .ok_or(OcspError::MissingResponseBytes)?;

        let response_type = response_bytes
            .first_untagged_child(UniversalTag::OID)
            .and_then(Element::as_oid)
            .ok_or_else(|| OcspError::Decoding(Asn1DecodingError::missing("responseType")))?;

        if response_type.as_str() != oids::OCSP_BASIC_RESPONSE {
            return Err(OcspError::UnsupportedResponseType {
                response_type: oids::name_or_dotted(response_type),
            });
        }

        let basic_response = response_bytes
            .first_untagged_child(UniversalTag::OCTET_STRING)
            .and_then(Element::as_octet_string)
            .ok_or_else(|| OcspError::Decoding(Asn1DecodingError::missing("response")))?;

        self.decode_basic_response(basic_response)
    }

    /// ```text
    /// BasicOCSPResponse       ::= SEQUENCE {
    ///    tbsResponseData      ResponseData,
    ///    signatureAlgorithm   AlgorithmIdentifier,
    ///    signature            BIT STRING,
    ///    certs            [0] EXPLICIT SEQUENCE OF Certificate OPTIONAL }
    ///
    /// ResponseData ::= SEQUENCE {
    ///    version              [0] EXPLICIT Version DEFAULT v1,
    ///    responderID              ResponderID,
    ///    producedAt               GeneralizedTime,
    ///    responses                SEQUENCE OF SingleResponse,
    ///    responseExtensions   [1] EXPLICIT Extensions OPTIONAL }
    /// ```
    fn decode_basic_response(&self, der: &[u8]) -> Result<ResponseList, OcspError> {
        let basic_response = certstatus_asn1_der::from_bytes(der)?;

        let tbs_response_data = basic_response
            .first_untagged_child(UniversalTag::SEQUENCE)
            .ok_or_else(|| OcspError::Decoding(Asn1DecodingError::missing("tbsResponseData")))?;

        let signature_algorithm = basic_response
            .nth_untagged_child(1, UniversalTag::SEQUENCE)
            .and_then(|algorithm| algorithm.first_untagged_child(UniversalTag::OID))
            .and_then(Element::as_oid)
            .ok_or_else(|| OcspError::Decoding(Asn1DecodingError::missing("signatureAlgorithm")))?;

        let signature = basic_response
            .first_untagged_child(UniversalTag::BIT_STRING)
            .and_then(Element::as_bit_string)
            .ok_or_else(|| OcspError::Decoding(Asn1DecodingError::missing("signature")))?;

        let certificates = match basic_response.context_child(0) {
            Some(certs) => Decoder::new().child_encodings(encoding_of(der, &basic_response, certs)?)?,
            None => Vec::new(),
        };
        let certificates: Vec<Certificate> = certificates
            .into_iter()
            .filter_map(|certificate| match Certificate::from_der(certificate) {
                Ok(certificate) => Some(certificate),
                Err(e) => {
                    log::warn!("ignoring embedded certificate: {}", e);
                    None
                }
            })
            .collect();

        let signed = encoding_of(der, &basic_response, tbs_response_data)?;
        self.verify_signature(signed, signature.data(), signature_algorithm, &certificates)?;

        let responses = tbs_response_data
            .first_untagged_child(UniversalTag::SEQUENCE)
            .ok_or_else(|| OcspError::Decoding(Asn1DecodingError::missing("responses")))?
            .children()
            .iter()
            .filter(|single_response| single_response.is_untagged())
            .map(response::decode_single_response)
            .collect::<Result<Vec<_>, _>>()?;

        ResponseList::from_responses(responses)
    }

    fn verify_signature(
        &self,
        signed: &[u8],
        signature: &[u8],
        algorithm: &ObjectIdentifier,
        embedded: &[Certificate],
    ) -> Result<(), OcspError> {
        if self.config.signer_certificate.is_none() && embedded.is_empty() {
            return match self.config.verification {
                VerificationPolicy::SkipWhenNoCertificate => {
                    log::debug!("no certificate to verify the OCSP response with, skipping verification");
                    Ok(())
                }
                VerificationPolicy::RequireSignature => Err(OcspError::UnauthenticatedResponse),
            };
        }

        let algorithm = SignatureAlgorithm::from_oid(algorithm)?;

        if let Some(signer) = &self.config.signer_certificate {
            if !signature::verifying_certificates(signed, signature, Some(signer), algorithm).is_empty() {
                log::debug!("OCSP response signed by {}", signer.subject_name());
                return Ok(());
            }

            // RFC 6960 §4.2.2.2 delegated responder
            let delegate = signature::verifying_certificates(signed, signature, embedded, algorithm)
                .into_iter()
                .find(|responder| {
                    responder.has_extended_key_usage(oids::KP_OCSP_SIGNING) && responder.is_issued_by(signer)
                });

            return match delegate {
                Some(responder) => {
                    log::debug!(
                        "OCSP response signed by {}, delegated by {}",
                        responder.subject_name(),
                        signer.subject_name()
                    );
                    Ok(())
                }
                None => Err(OcspError::SignatureVerificationFailed),
            };
        }

        match signature::verifying_certificates(signed, signature, embedded, algorithm).first() {
            Some(responder) => {
                log::debug!("OCSP response signed by embedded {}", responder.subject_name());
                Ok(())
            }
            None => Err(OcspError::SignatureVerificationFailed),
        }
    }
}

fn encoding_of<'a>(parent_der: &'a [u8], parent: &Element, child: &Element) -> Result<&'a [u8], OcspError> {
    certstatus_asn1_der::child_encoding(parent_der, parent, child).ok_or_else(|| OcspError::InvalidResponse {
        context: "element not found in its encoding".to_owned(),
    })
}
