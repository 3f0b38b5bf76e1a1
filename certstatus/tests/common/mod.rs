//! Contoso test PKI shared by the integration tests.
//!
//! Generated by `tests/data/generate.sh` (OpenSSL 3). Responses and the time-stamp token were produced on
//! 2026-10-19 16:31:31 UTC; every Contoso PKI certificate is valid from 2024-01-01 to 2044-01-01.

#![allow(dead_code)]

use certstatus::http::{HttpResponse, HttpTransport, TransportError};
use certstatus::x509::Certificate;
use std::cell::RefCell;
use time::macros::datetime;
use time::OffsetDateTime;

/// RSA root, `CN=Contoso Root CA`, serial 0x1000.
pub const ROOT_PEM: &str = include_str!("../data/root.pem");
/// P-256 leaf `CN=www.contoso.local`, serial 0x1001, with AIA (OCSP + caIssuers).
pub const LEAF_PEM: &str = include_str!("../data/leaf.pem");
/// `CN=old.contoso.local`, serial 0x1002, revoked for keyCompromise.
pub const REVOKED_PEM: &str = include_str!("../data/revoked.pem");
/// P-256 delegated OCSP responder, serial 0x1003, EKU OCSPSigning.
pub const RESPONDER_PEM: &str = include_str!("../data/responder.pem");
/// RSA time-stamping unit, serial 0x1004, EKU timeStamping.
pub const TSA_PEM: &str = include_str!("../data/tsa.pem");
/// Self-signed RSA certificate carrying the root's subject under another key, valid from 2026-10-19 16:56:08.
pub const IMPOSTOR_ROOT_PEM: &str = include_str!("../data/impostor_root.pem");
/// Self-signed P-256 `CN=Contoso Legacy CA`, serial 0x4c01, with its BOOLEANs encoded as 0x01.
pub const LEGACY_CA: &[u8] = include_bytes!("../data/legacy_ca.der");

/// Leaf status, signed by the delegated responder which is embedded.
pub const OCSP_GOOD_DELEGATED: &[u8] = include_bytes!("../data/ocsp_good_delegated.der");
/// Leaf status, signed by the delegated responder, no certificate embedded.
pub const OCSP_GOOD_NO_CERTS: &[u8] = include_bytes!("../data/ocsp_good_no_certs.der");
/// Revoked certificate status, signed by the root, no certificate embedded.
pub const OCSP_REVOKED: &[u8] = include_bytes!("../data/ocsp_revoked.der");
/// `openssl ocsp -issuer root.pem -cert leaf.pem -no_nonce`
pub const OCSP_GOOD_REQUEST: &[u8] = include_bytes!("../data/ocsp_good_request.der");

pub const TSA_PAYLOAD: &[u8] = include_bytes!("../data/tsa_payload.txt");
/// SHA-256 query for [`TSA_PAYLOAD`] with nonce [`TSA_NONCE`] and certReq.
pub const TSA_QUERY: &[u8] = include_bytes!("../data/tsa_query.der");
/// Granted reply to [`TSA_QUERY`].
pub const TSA_REPLY: &[u8] = include_bytes!("../data/tsa_reply.der");
/// Reply to a SHA-1 query: rejection, badAlg.
pub const TSA_REJECTED: &[u8] = include_bytes!("../data/tsa_rejected.der");
pub const TSA_NONCE: u64 = 0x1F2E_3D4C_5B6A_7988;

pub const PRODUCED_AT: OffsetDateTime = datetime!(2026-10-19 16:31:31 UTC);
pub const NEXT_UPDATE: OffsetDateTime = datetime!(2026-10-26 16:31:31 UTC);

pub fn certificate(pem: &str) -> Certificate {
    Certificate::from_pem_str(pem).expect("fixture certificate")
}

pub fn root() -> Certificate {
    certificate(ROOT_PEM)
}

pub fn leaf() -> Certificate {
    certificate(LEAF_PEM)
}

pub fn revoked() -> Certificate {
    certificate(REVOKED_PEM)
}

pub fn responder() -> Certificate {
    certificate(RESPONDER_PEM)
}

pub fn tsa() -> Certificate {
    certificate(TSA_PEM)
}

pub fn impostor_root() -> Certificate {
    certificate(IMPOSTOR_ROOT_PEM)
}

/// Transport answering every post with the same response, recording what was sent.
pub struct CannedTransport {
    response: HttpResponse,
    pub posted: RefCell<Vec<(String, String, Vec<u8>)>>,
}

impl CannedTransport {
    pub fn new(content_type: &str, body: &[u8]) -> Self {
        Self {
            response: HttpResponse {
                status: 200,
                content_type: Some(content_type.to_owned()),
                body: body.to_vec(),
            },
            posted: RefCell::new(Vec::new()),
        }
    }
}

impl HttpTransport for CannedTransport {
    fn post(&self, url: &str, content_type: &str, body: Vec<u8>) -> Result<HttpResponse, TransportError> {
        self.posted
            .borrow_mut()
            .push((url.to_owned(), content_type.to_owned(), body));
        Ok(self.response.clone())
    }
}
