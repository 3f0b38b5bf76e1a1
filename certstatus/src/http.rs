//! Transport used to deliver OCSP and time-stamp queries.
//!
//! certstatus only needs "post these bytes, get bytes back". Implement [`HttpTransport`] on top of the HTTP
//! client of your choice, or enable the `http_client` feature for a blocking `reqwest` transport.

use thiserror::Error;

pub const OCSP_REQUEST_MEDIA_TYPE: &str = "application/ocsp-request";
pub const OCSP_RESPONSE_MEDIA_TYPE: &str = "application/ocsp-response";
pub const TIMESTAMP_QUERY_MEDIA_TYPE: &str = "application/timestamp-query";
pub const TIMESTAMP_REPLY_MEDIA_TYPE: &str = "application/timestamp-reply";

#[derive(Debug, Error)]
pub enum TransportError {
    /// request couldn't be performed
    #[error("request to {url} failed: {context}")]
    Request { url: String, context: String },

    /// unexpected status code
    #[error("server responded with status code {status}")]
    UnexpectedStatus { status: u16 },

    /// unexpected content type
    #[error("expected `{expected}` content, got {}", found.as_deref().unwrap_or("no content type"))]
    UnexpectedContentType {
        expected: &'static str,
        found: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

pub trait HttpTransport {
    fn post(&self, url: &str, content_type: &str, body: Vec<u8>) -> Result<HttpResponse, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn post(&self, url: &str, content_type: &str, body: Vec<u8>) -> Result<HttpResponse, TransportError> {
        (**self).post(url, content_type, body)
    }
}

/// Posts `body` and returns the response body if the server answered `200` with the `expected` media type.
pub fn exchange<T: HttpTransport + ?Sized>(
    transport: &T,
    url: &str,
    content_type: &'static str,
    expected: &'static str,
    body: Vec<u8>,
) -> Result<Vec<u8>, TransportError> {
    log::debug!("POST {} ({}, {} bytes)", url, content_type, body.len());

    let response = transport.post(url, content_type, body)?;

    if response.status != 200 {
        return Err(TransportError::UnexpectedStatus {
            status: response.status,
        });
    }

    let media_type_matches = response
        .content_type
        .as_deref()
        .and_then(|value| value.split(';').next())
        .map(|media_type| media_type.trim().eq_ignore_ascii_case(expected))
        .unwrap_or(false);

    if !media_type_matches {
        return Err(TransportError::UnexpectedContentType {
            expected,
            found: response.content_type,
        });
    }

    Ok(response.body)
}

#[cfg(feature = "http_client")]
pub use self::reqwest_transport::{HttpConfig, ReqwestTransport};

#[cfg(feature = "http_client")]
mod reqwest_transport {
    use super::{HttpResponse, HttpTransport, TransportError};
    use reqwest::blocking::Client;
    use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
    use std::time::Duration;

    #[derive(Clone, Debug)]
    pub struct HttpConfig {
        pub timeout: Duration,
        pub user_agent: String,
    }

    impl Default for HttpConfig {
        fn default() -> Self {
            Self {
                timeout: Duration::from_secs(30),
                user_agent: concat!("certstatus/", env!("CARGO_PKG_VERSION")).to_owned(),
            }
        }
    }

    /// Blocking transport backed by `reqwest`.
    #[derive(Clone, Debug)]
    pub struct ReqwestTransport {
        client: Client,
    }

    impl ReqwestTransport {
        pub fn new(config: &HttpConfig) -> Result<Self, TransportError> {
            let client = Client::builder()
                .timeout(config.timeout)
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(|e| TransportError::Request {
                    url: String::new(),
                    context: e.to_string(),
                })?;

            Ok(Self { client })
        }
    }

    impl HttpTransport for ReqwestTransport {
        fn post(&self, url: &str, content_type: &str, body: Vec<u8>) -> Result<HttpResponse, TransportError> {
            let request_error = |e: reqwest::Error| TransportError::Request {
                url: url.to_owned(),
                context: e.to_string(),
            };

            let response = self
                .client
                .post(url)
                .header(CACHE_CONTROL, "no-cache")
                .header(CONTENT_TYPE, content_type)
                .body(body)
                .send()
                .map_err(request_error)?;

            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let body = response.bytes().map_err(request_error)?.to_vec();

            Ok(HttpResponse {
                status,
                content_type,
                body,
            })
        }
    }
}
