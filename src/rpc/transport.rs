//! HTTP transport for XML-RPC calls.
//!
//! This module provides the [`Transport`] trait, the seam the connector
//! talks through, and [`HttpTransport`], its reqwest-backed implementation.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::codec::{decode_response, encode_call};
use crate::value::Value;

/// Path of the session/authentication service.
pub const COMMON_PATH: &str = "/xmlrpc/2/common";

/// Path of the model/data service.
pub const OBJECT_PATH: &str = "/xmlrpc/2/object";

/// Transport-level error types.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The endpoint URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The endpoint URL uses a scheme other than http/https.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// Network, TLS or client construction failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("Unexpected HTTP status {0}")]
    Status(StatusCode),

    /// The response body is not a valid XML-RPC document.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The server returned an XML-RPC fault.
    #[error("Server fault {code}: {message}")]
    Fault {
        /// Fault code (0 when the server sent a non-numeric code)
        code: i64,
        /// Fault string, usually the server-side exception text
        message: String,
    },

    /// The call succeeded but the result has the wrong shape.
    #[error("Unexpected result: expected {expected}, got {found}")]
    UnexpectedResult {
        expected: &'static str,
        found: &'static str,
    },
}

impl RpcError {
    pub(crate) fn unexpected(expected: &'static str, found: &Value) -> Self {
        RpcError::UnexpectedResult {
            expected,
            found: found.type_name(),
        }
    }
}

/// Build a service endpoint by appending `path` to the server base URL.
///
/// A trailing slash on `base` is ignored, so `https://erp.example.com/`
/// and `https://erp.example.com` give the same endpoint.
pub fn endpoint_url(base: &str, path: &str) -> Result<Url, RpcError> {
    let url = Url::parse(&format!("{}{}", base.trim_end_matches('/'), path))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RpcError::UnsupportedScheme(other.to_string())),
    }
}

/// A remote procedure call endpoint.
///
/// Implementations must be usable from several tasks at once.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Invoke `method` with positional `params` and return its result.
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError>;
}

/// XML-RPC over HTTP(S).
///
/// Cloning is cheap: the underlying `reqwest::Client` is reference counted
/// and carries the connection pool, so transports built from one client
/// share the same transport configuration.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let body = encode_call(method, &params);
        debug!(endpoint = %self.endpoint, method, bytes = body.len(), "Sending XML-RPC request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status(status));
        }

        let text = response.text().await?;
        decode_response(&text)
    }
}
