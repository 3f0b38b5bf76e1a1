#[macro_use]
mod check_macro;

pub mod ocsp_request;
pub mod x509_v3_certificate;
