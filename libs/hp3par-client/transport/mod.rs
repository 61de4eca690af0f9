//! HTTP transport abstraction
//!
//! The session never talks to the network directly. It hands a fully built
//! [`TransportRequest`] to a [`Transport`] and gets the raw status, headers
//! and body back. Status codes are not interpreted here.

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use std::time::Duration;
use thiserror::Error;

/// Failures below the HTTP protocol level
#[derive(Error, Debug)]
pub enum TransportError {
    /// Request exceeded its timeout
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// Connection could not be established (refused, DNS, TLS handshake)
    #[error("Connection to {url} failed: {reason}")]
    Connect { url: String, reason: String },

    /// Any other failure while sending or reading the response
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The underlying HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

/// Outgoing request, built fresh for each attempt
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// Serialized JSON body
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

/// Raw response as returned by the wire
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Minimal interface the session needs from an HTTP client
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a single round trip
    ///
    /// Implementations must return `Ok` for every HTTP status, including
    /// 4xx and 5xx; only failures to obtain a response are errors.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
