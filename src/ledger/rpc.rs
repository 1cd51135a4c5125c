//! JSON-RPC client for the ledger node
//!
//! The node speaks rippled-style JSON-RPC over HTTP:
//! `{"method": "...", "params": [{...}]}` in, `{"result": {"status": ...}}`
//! out. The wire side sits behind [`Transport`] so the polling and
//! submission logic can be exercised against canned responses.

use crate::error::{Error, Result};
use serde_json::{Value, json};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Per-request timeout for the HTTP transport
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends one JSON-RPC call and returns the raw response envelope
pub trait Transport {
    fn call(&self, method: &str, params: &Value) -> Result<Value>;
}

/// Build the request envelope for `method`
pub fn envelope(method: &str, params: &Value) -> Value {
    json!({
        "method": method,
        "params": [params],
    })
}

/// HTTP transport backed by a `ureq` agent
pub struct HttpTransport {
    url: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(url: &str) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();
        Self {
            url: url.to_string(),
            agent,
        }
    }

    fn map_error(&self, method: &str, e: ureq::Error) -> Error {
        let message = e.to_string();
        match e {
            ureq::Error::Io(_)
            | ureq::Error::ConnectionFailed
            | ureq::Error::HostNotFound
            | ureq::Error::Timeout(_) => Error::Connectivity {
                url: self.url.clone(),
                message,
            },
            ureq::Error::StatusCode(code) => Error::Rpc {
                method: method.to_string(),
                message: format!("HTTP status {}", code),
            },
            _ => Error::Rpc {
                method: method.to_string(),
                message,
            },
        }
    }
}

impl Transport for HttpTransport {
    fn call(&self, method: &str, params: &Value) -> Result<Value> {
        debug!(url = %self.url, method, "rpc call");

        let mut response = self
            .agent
            .post(&self.url)
            .send_json(envelope(method, params))
            .map_err(|e| self.map_error(method, e))?;

        response
            .body_mut()
            .read_json::<Value>()
            .map_err(|e| self.map_error(method, e))
    }
}

/// Status reported in `result.status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Success,
    Error,
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseStatus::Success => write!(f, "success"),
            ResponseStatus::Error => write!(f, "error"),
        }
    }
}

/// A decoded JSON-RPC response
#[derive(Debug, Clone)]
pub struct RpcResponse {
    pub status: ResponseStatus,
    pub result: Value,
}

impl RpcResponse {
    /// Decode the `result` object out of a response envelope
    pub fn from_envelope(method: &str, mut envelope: Value) -> Result<Self> {
        let result = envelope
            .get_mut("result")
            .map(Value::take)
            .filter(Value::is_object)
            .ok_or_else(|| Error::MalformedResponse {
                method: method.to_string(),
                field: "result".to_string(),
            })?;

        let status = match result.get("status").and_then(Value::as_str) {
            Some("success") => ResponseStatus::Success,
            Some(_) => ResponseStatus::Error,
            None => {
                return Err(Error::MalformedResponse {
                    method: method.to_string(),
                    field: "result.status".to_string(),
                });
            }
        };

        Ok(Self { status, result })
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Error code such as `actNotFound` for failed requests
    pub fn error_code(&self) -> Option<&str> {
        self.result.get("error").and_then(Value::as_str)
    }

    /// Human readable error, falling back to the code
    pub fn error_message(&self) -> String {
        self.result
            .get("error_message")
            .and_then(Value::as_str)
            .or_else(|| self.error_code())
            .unwrap_or("unknown error")
            .to_string()
    }
}

/// Connection to one ledger node
///
/// Built once from configuration and passed to whatever needs it.
pub struct RpcClient {
    url: String,
    transport: Box<dyn Transport>,
}

impl RpcClient {
    /// Client talking HTTP to `url`
    pub fn connect(url: &str) -> Self {
        Self::with_transport(url, HttpTransport::new(url))
    }

    /// Client with a custom transport
    pub fn with_transport(url: &str, transport: impl Transport + 'static) -> Self {
        Self {
            url: url.to_string(),
            transport: Box::new(transport),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one request and decode the response
    pub fn request(&self, method: &str, params: Value) -> Result<RpcResponse> {
        let envelope = self.transport.call(method, &params)?;
        let response = RpcResponse::from_envelope(method, envelope)?;
        debug!(method, status = %response.status, "rpc response");
        Ok(response)
    }
}

/// Pretty-print JSON with four-space indentation
///
/// Object keys come out sorted because `serde_json::Map` is ordered.
pub fn to_pretty_json(value: &Value) -> Result<String> {
    use serde::Serialize;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
