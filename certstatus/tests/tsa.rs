mod common;

use certstatus::hash::HashAlgorithm;
use certstatus::http::{TIMESTAMP_QUERY_MEDIA_TYPE, TIMESTAMP_REPLY_MEDIA_TYPE};
use certstatus::tsa::{PkiFailureInfo, PkiStatus, TimestampRequest, Tsa, TsaConfig, TsaError};
use certstatus::x509::CertificateError;
use certstatus::BigInteger;
use common::*;
use pretty_assertions::assert_eq;
use time::macros::datetime;

const POLICY: &str = "1.3.6.1.4.1.57264.2.1";

fn request() -> TimestampRequest {
    TimestampRequest::new(HashAlgorithm::SHA2_256, TSA_PAYLOAD).with_nonce(TSA_NONCE)
}

fn config() -> TsaConfig {
    TsaConfig {
        hash_algorithm: HashAlgorithm::SHA2_256,
        nonce: Some(BigInteger::from(TSA_NONCE)),
        trusted_certificates: vec![root()],
        validation_time: Some(PRODUCED_AT),
        ..TsaConfig::default()
    }
}

#[test]
fn request_matches_query() {
    assert_eq!(request().to_der().unwrap(), TSA_QUERY);
    assert_eq!(Tsa::new(config()).request_for(TSA_PAYLOAD), request());
}

#[test]
fn granted_token() {
    let token = Tsa::new(config()).validate_response(&request(), TSA_REPLY).unwrap();

    assert_eq!(token.gen_time(), PRODUCED_AT);
    assert_eq!(token.serial_number(), &2u64);
    assert_eq!(token.policy().as_str(), POLICY);
    assert_eq!(token.hash_algorithm(), HashAlgorithm::SHA2_256);
    assert_eq!(
        token.hashed_message(),
        hex::decode("da508a7e1a1b49face5f733d41d4337a26400b14bb3421864c43b74cb5e14857").unwrap()
    );
    assert_eq!(token.nonce(), Some(&BigInteger::from(TSA_NONCE)));
    // ContentInfo following the PKIStatusInfo
    assert_eq!(token.to_der(), &TSA_REPLY[9..]);
}

#[test]
fn certificates_checked_at_another_time() {
    let tsa = Tsa::new(TsaConfig {
        validation_time: Some(datetime!(2044-06-01 0:00 UTC)),
        ..config()
    });

    assert!(matches!(
        tsa.validate_response(&request(), TSA_REPLY),
        Err(TsaError::Certificate(CertificateError::Expired { .. }))
    ));

    let tsa = Tsa::new(TsaConfig {
        validation_time: Some(datetime!(2023-06-01 0:00 UTC)),
        ..config()
    });

    assert!(matches!(
        tsa.validate_response(&request(), TSA_REPLY),
        Err(TsaError::Certificate(CertificateError::NotYetValid { .. }))
    ));
}

#[test]
fn issuer_must_be_available() {
    let tsa = Tsa::new(TsaConfig {
        trusted_certificates: Vec::new(),
        ..config()
    });

    assert!(matches!(
        tsa.validate_response(&request(), TSA_REPLY),
        Err(TsaError::IssuerCertificateNotFound { issuer }) if issuer == "CN=Contoso Root CA, OU=PKI, O=Contoso Ltd, L=Montreal, S=Quebec, C=CA"
    ));

    let tsa = Tsa::new(TsaConfig {
        trusted_certificates: vec![leaf(), responder()],
        ..config()
    });

    assert!(matches!(
        tsa.validate_response(&request(), TSA_REPLY),
        Err(TsaError::IssuerCertificateNotFound { .. })
    ));
}

#[test]
fn trusted_signer_without_embedded_certificate() {
    // the TSA certificate may come from the trust list as well
    let tsa = Tsa::new(TsaConfig {
        trusted_certificates: vec![tsa(), root()],
        ..config()
    });

    let token = tsa.validate_response(&request(), TSA_REPLY).unwrap();
    assert_eq!(token.serial_number(), &2u64);
}

#[test]
fn trusted_certificates_sharing_the_issuer_name() {
    // the impostor comes first and doesn't verify the TSA certificate
    let tsa = Tsa::new(TsaConfig {
        trusted_certificates: vec![impostor_root(), root()],
        ..config()
    });
    let token = tsa.validate_response(&request(), TSA_REPLY).unwrap();
    assert_eq!(token.serial_number(), &2u64);

    let tsa = Tsa::new(TsaConfig {
        trusted_certificates: vec![impostor_root()],
        ..config()
    });
    assert!(matches!(
        tsa.validate_response(&request(), TSA_REPLY),
        Err(TsaError::SignatureVerificationFailed)
    ));
}

#[test]
fn token_for_other_data() {
    let other = TimestampRequest::new(HashAlgorithm::SHA2_256, b"something else").with_nonce(TSA_NONCE);
    assert!(matches!(
        Tsa::new(config()).validate_response(&other, TSA_REPLY),
        Err(TsaError::ImprintMismatch)
    ));

    let other_algorithm = TimestampRequest::new(HashAlgorithm::SHA2_512, TSA_PAYLOAD).with_nonce(TSA_NONCE);
    assert!(matches!(
        Tsa::new(config()).validate_response(&other_algorithm, TSA_REPLY),
        Err(TsaError::ImprintMismatch)
    ));
}

#[test]
fn nonce_must_be_echoed() {
    let replayed = TimestampRequest::new(HashAlgorithm::SHA2_256, TSA_PAYLOAD).with_nonce(42u64);
    assert!(matches!(
        Tsa::new(config()).validate_response(&replayed, TSA_REPLY),
        Err(TsaError::NonceMismatch)
    ));

    // not asking for a nonce accepts any
    let without_nonce = TimestampRequest::new(HashAlgorithm::SHA2_256, TSA_PAYLOAD);
    Tsa::new(config())
        .validate_response(&without_nonce, TSA_REPLY)
        .unwrap();
}

#[test]
fn tampered_tst_info() {
    let mut tampered = TSA_REPLY.to_vec();
    let gen_time = tampered
        .windows(14)
        .position(|window| window == b"20261019163131")
        .unwrap();
    // 2026 -> 2027
    tampered[gen_time + 3] = b'7';

    assert!(matches!(
        Tsa::new(config()).validate_response(&request(), &tampered),
        Err(TsaError::MessageDigestMismatch)
    ));
}

#[test]
fn tampered_signature() {
    let mut tampered = TSA_REPLY.to_vec();
    let last = tampered.len() - 1;
    tampered[last] ^= 0x80;

    assert!(matches!(
        Tsa::new(config()).validate_response(&request(), &tampered),
        Err(TsaError::SignatureVerificationFailed)
    ));
}

#[test]
fn rejected_request() {
    let sha1 = TimestampRequest::new(HashAlgorithm::SHA1, TSA_PAYLOAD);
    let err = Tsa::new(config()).validate_response(&sha1, TSA_REJECTED).unwrap_err();

    assert_eq!(
        err.to_string(),
        "time-stamp request rejected (rejection): unrecognized or unsupported algorithm identifier"
    );

    match err {
        TsaError::Rejected { status, failure, text } => {
            assert_eq!(status, PkiStatus::Rejection);
            assert_eq!(failure, Some(PkiFailureInfo::BadAlg));
            assert_eq!(text.as_deref(), Some("Message digest algorithm is not supported."));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn timestamp_through_transport() {
    let transport = CannedTransport::new(TIMESTAMP_REPLY_MEDIA_TYPE, TSA_REPLY);

    let token = Tsa::new(config())
        .timestamp(&transport, "http://tsa.contoso.local", TSA_PAYLOAD)
        .unwrap();
    assert_eq!(token.gen_time(), PRODUCED_AT);

    let posted = transport.posted.borrow();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].1, TIMESTAMP_QUERY_MEDIA_TYPE);
    assert_eq!(posted[0].2, TSA_QUERY);
}
