//! [![Crates.io](https://img.shields.io/crates/v/certstatus.svg)](https://crates.io/crates/certstatus)
//! [![docs.rs](https://docs.rs/certstatus/badge.svg)](https://docs.rs/certstatus)
//! ![Crates.io](https://img.shields.io/crates/l/certstatus)
//! # certstatus
//!
//! Certificate revocation checking (OCSP) and trusted timestamping (RFC 3161).

pub mod hash;
pub mod http;
pub mod key;
pub mod ocsp;
pub mod oids;
pub mod pem;
pub mod signature;
pub mod tsa;
pub mod x509;

pub use certstatus_asn1::{BigInteger, Element, ObjectIdentifier};
