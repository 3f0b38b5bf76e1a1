//! X.509 certificate information extraction.

mod certificate;

pub mod name;

pub use certificate::{Certificate, CertificateError, Extension};
