//! Time-Stamp Protocol client ([RFC 3161](https://www.rfc-editor.org/rfc/rfc3161)).

mod request;
mod token;

pub use request::TimestampRequest;
pub use token::TimestampToken;

use crate::hash::HashAlgorithm;
use crate::http::{self, HttpTransport, TransportError, TIMESTAMP_QUERY_MEDIA_TYPE, TIMESTAMP_REPLY_MEDIA_TYPE};
use crate::signature::SignatureError;
use crate::x509::{Certificate, CertificateError};
use certstatus_asn1::{BigInteger, Element, UniversalTag};
use certstatus_asn1_der::{Asn1DecodingError, Asn1EncodingError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use time::OffsetDateTime;

/// ```text
/// PKIStatus ::= INTEGER {
///    granted                (0),
///    grantedWithMods        (1),
///    rejection              (2),
///    waiting                (3),
///    revocationWarning      (4),
///    revocationNotification (5) }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PkiStatus {
    Granted,
    GrantedWithMods,
    Rejection,
    Waiting,
    RevocationWarning,
    RevocationNotification,
}

impl PkiStatus {
    pub fn from_code(code: u64) -> Option<Self> {
        let status = match code {
            0 => Self::Granted,
            1 => Self::GrantedWithMods,
            2 => Self::Rejection,
            3 => Self::Waiting,
            4 => Self::RevocationWarning,
            5 => Self::RevocationNotification,
            _ => return None,
        };

        Some(status)
    }

    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted | Self::GrantedWithMods)
    }
}

impl fmt::Display for PkiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Granted => "granted",
            Self::GrantedWithMods => "grantedWithMods",
            Self::Rejection => "rejection",
            Self::Waiting => "waiting",
            Self::RevocationWarning => "revocationWarning",
            Self::RevocationNotification => "revocationNotification",
        };
        f.write_str(name)
    }
}

/// Named bits of `PKIFailureInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PkiFailureInfo {
    BadAlg,
    BadRequest,
    BadDataFormat,
    TimeNotAvailable,
    UnacceptedPolicy,
    UnacceptedExtension,
    AddInfoNotAvailable,
    SystemFailure,
}

impl PkiFailureInfo {
    const NAMED_BITS: [(usize, PkiFailureInfo); 8] = [
        (0, Self::BadAlg),
        (2, Self::BadRequest),
        (5, Self::BadDataFormat),
        (14, Self::TimeNotAvailable),
        (15, Self::UnacceptedPolicy),
        (16, Self::UnacceptedExtension),
        (17, Self::AddInfoNotAvailable),
        (25, Self::SystemFailure),
    ];

    pub fn bit(self) -> usize {
        Self::NAMED_BITS
            .iter()
            .find(|(_, failure)| *failure == self)
            .map(|(bit, _)| *bit)
            .unwrap_or_default()
    }

    /// First named failure set in `failure_info`.
    pub fn from_bit_string(failure_info: &certstatus_asn1::BitString) -> Option<Self> {
        Self::NAMED_BITS
            .iter()
            .find(|(bit, _)| failure_info.is_set(*bit))
            .map(|(_, failure)| *failure)
    }
}

impl fmt::Display for PkiFailureInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            Self::BadAlg => "unrecognized or unsupported algorithm identifier",
            Self::BadRequest => "transaction not permitted or supported",
            Self::BadDataFormat => "the data submitted has the wrong format",
            Self::TimeNotAvailable => "the TSA's time source is not available",
            Self::UnacceptedPolicy => "the requested TSA policy is not supported by the TSA",
            Self::UnacceptedExtension => "the requested extension is not supported by the TSA",
            Self::AddInfoNotAvailable => "the additional information requested is not available",
            Self::SystemFailure => "the request cannot be handled due to system failure",
        };
        f.write_str(description)
    }
}

fn rejection_reason(failure: &Option<PkiFailureInfo>, text: &Option<String>) -> String {
    match (failure, text) {
        (Some(failure), _) => failure.to_string(),
        (None, Some(text)) => text.clone(),
        (None, None) => "no reason given".to_owned(),
    }
}

#[derive(Debug, Error)]
pub enum TsaError {
    /// TSA didn't grant the request
    #[error("time-stamp request rejected ({status}): {}", rejection_reason(.failure, .text))]
    Rejected {
        status: PkiStatus,
        failure: Option<PkiFailureInfo>,
        text: Option<String>,
    },

    /// status outside of PKIStatus
    #[error("unknown PKIStatus {status}")]
    UnknownStatus { status: BigInteger },

    /// response doesn't follow the expected structure
    #[error("invalid time-stamp response: {context}")]
    InvalidResponse { context: String },

    /// asn1 decoding error
    #[error("couldn't decode time-stamp response: {0}")]
    Decoding(#[from] Asn1DecodingError),

    /// asn1 encoding error
    #[error("couldn't encode time-stamp structure: {0}")]
    Encoding(#[from] Asn1EncodingError),

    /// no certificate matches the signer identifier
    #[error("time-stamp signer certificate not found")]
    SignerCertificateNotFound,

    /// signer's issuer certificate is neither embedded nor trusted
    #[error("issuer certificate `{issuer}` of the time-stamp signer not found")]
    IssuerCertificateNotFound { issuer: String },

    /// signer's issuer isn't one of the trusted certificates
    #[error("time-stamp signer issued by untrusted `{issuer}`")]
    UntrustedIssuer { issuer: String },

    /// certificate error
    #[error(transparent)]
    Certificate(#[from] CertificateError),

    /// signature doesn't verify
    #[error("time-stamp token signature couldn't be verified")]
    SignatureVerificationFailed,

    /// messageDigest attribute doesn't match the signed content
    #[error("messageDigest attribute doesn't match the time-stamped content")]
    MessageDigestMismatch,

    /// token timestamps something else than what was requested
    #[error("time-stamp token message imprint doesn't match the request")]
    ImprintMismatch,

    /// nonce wasn't echoed
    #[error("time-stamp token nonce doesn't match the request")]
    NonceMismatch,

    /// signature error
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// transport error
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone)]
pub struct TsaConfig {
    pub hash_algorithm: HashAlgorithm,
    /// Ask the TSA to embed its certificate (`certReq`).
    pub request_certificate: bool,
    pub nonce: Option<BigInteger>,
    /// Certificates allowed to issue the TSA certificate. Empty trusts any issuer found in the token.
    pub trusted_certificates: Vec<Certificate>,
    /// Instant the certificates are checked against, now when unset.
    pub validation_time: Option<OffsetDateTime>,
}

impl Default for TsaConfig {
    fn default() -> Self {
        Self {
            hash_algorithm: HashAlgorithm::SHA2_512,
            request_certificate: true,
            nonce: None,
            trusted_certificates: Vec::new(),
            validation_time: None,
        }
    }
}

/// Requests and validates time-stamp tokens.
#[derive(Debug, Clone, Default)]
pub struct Tsa {
    config: TsaConfig,
}

impl Tsa {
    pub fn new(config: TsaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TsaConfig {
        &self.config
    }

    /// Request for `data` following the configuration.
    pub fn request_for(&self, data: &[u8]) -> TimestampRequest {
        let request = TimestampRequest::new(self.config.hash_algorithm, data)
            .with_certificate_request(self.config.request_certificate);

        match &self.config.nonce {
            Some(nonce) => request.with_nonce(nonce.clone()),
            None => request,
        }
    }

    /// Timestamps `data` with the TSA at `url`.
    pub fn timestamp<T: HttpTransport + ?Sized>(
        &self,
        transport: &T,
        url: &str,
        data: &[u8],
    ) -> Result<TimestampToken, TsaError> {
        let request = self.request_for(data);
        let body = request.to_der()?;
        let response = http::exchange(transport, url, TIMESTAMP_QUERY_MEDIA_TYPE, TIMESTAMP_REPLY_MEDIA_TYPE, body)?;
        self.validate_response(&request, &response)
    }

    /// ```text
    /// TimeStampResp ::= SEQUENCE  {
    ///    status                  PKIStatusInfo,
    ///    timeStampToken          TimeStampToken     OPTIONAL  }
    /// ```
    pub fn validate_response(&self, request: &TimestampRequest, der: &[u8]) -> Result<TimestampToken, TsaError> {
        let response = certstatus_asn1_der::from_bytes(der)?;

        let status_info = response
            .first_untagged_child(UniversalTag::SEQUENCE)
            .ok_or_else(|| TsaError::Decoding(Asn1DecodingError::missing("PKIStatusInfo")))?;
        check_status(status_info)?;

        let token = response
            .nth_untagged_child(1, UniversalTag::SEQUENCE)
            .ok_or_else(|| TsaError::Decoding(Asn1DecodingError::missing("timeStampToken")))?;

        let trust = token::Trust {
            trusted_certificates: &self.config.trusted_certificates,
            validation_time: self.config.validation_time.unwrap_or_else(OffsetDateTime::now_utc),
        };

        let token_der =
            certstatus_asn1_der::child_encoding(der, &response, token).ok_or_else(|| TsaError::InvalidResponse {
                context: "time-stamp token not found in the response encoding".to_owned(),
            })?;

        let token = token::validate_token(token, token_der, request, &trust)?;
        log::debug!("time-stamp token {} generated at {}", token.serial_number(), token.gen_time());

        Ok(token)
    }
}

/// ```text
/// PKIStatusInfo ::= SEQUENCE {
///    status        PKIStatus,
///    statusString  PKIFreeText     OPTIONAL,
///    failInfo      PKIFailureInfo  OPTIONAL  }
/// ```
fn check_status(status_info: &Element) -> Result<(), TsaError> {
    let code = status_info
        .first_untagged_child(UniversalTag::INTEGER)
        .and_then(Element::as_integer)
        .ok_or_else(|| TsaError::Decoding(Asn1DecodingError::missing("PKIStatus")))?;

    let status = code
        .to_u64()
        .and_then(PkiStatus::from_code)
        .ok_or_else(|| TsaError::UnknownStatus { status: code.clone() })?;

    if status.is_granted() {
        return Ok(());
    }

    let failure = status_info
        .first_untagged_child(UniversalTag::BIT_STRING)
        .and_then(Element::as_bit_string)
        .and_then(PkiFailureInfo::from_bit_string);

    let text = status_info
        .first_untagged_child(UniversalTag::SEQUENCE)
        .and_then(|free_text| free_text.children().iter().find_map(Element::as_str))
        .map(str::to_owned);

    Err(TsaError::Rejected { status, failure, text })
}
