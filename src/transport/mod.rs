//! # HTTP Transport
//!
//! The client never talks to the network directly. Every request is handed to
//! a [`Transport`], which only has to execute it once and report the status
//! code and raw body. [`http::ReqwestTransport`] is the default implementation.

pub mod http;

use async_trait::async_trait;
use std::sync::Arc;

pub use reqwest::Method;

/// Fully addressed request ready to go on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl TransportRequest {
    /// Returns the first header value matching `name` (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status code and raw body as returned by the remote end
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes a single HTTP exchange.
///
/// Implementations must be safe to share between tasks and must not retry:
/// an `Err` means the exchange could not be completed at all (connection,
/// timeout, ...). Any HTTP status, including errors, is an `Ok`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> anyhow::Result<TransportResponse>;
}

pub type ImplTransport = Arc<dyn Transport>;
