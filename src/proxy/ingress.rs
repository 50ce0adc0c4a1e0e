// Ingress negotiation: CORS, credential, and request body extraction

use std::fmt;

use axum::http::{header, HeaderMap, HeaderValue, Method};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;

use super::error::GatewayError;

/// Headers set on every response, preflight or not. The relay is called from
/// static front-ends on arbitrary origins.
pub const CORS_HEADERS: [(header::HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "POST"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
];

pub fn apply_cors(headers: &mut HeaderMap) {
    for (name, value) in CORS_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

pub fn is_preflight(method: &Method) -> bool {
    method == Method::OPTIONS
}

/// Upstream API key. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for an empty key.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var).ok().and_then(Self::new)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Deserialize)]
struct RawBody<'a> {
    #[serde(default)]
    target: Option<Value>,
    #[serde(default, borrow)]
    payload: Option<&'a RawValue>,
}

/// The two fields the relay cares about. `payload` holds the caller's JSON
/// text exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundBody {
    pub target: Option<String>,
    pub payload: Bytes,
}

impl InboundBody {
    /// An empty body reads as `{}` and so carries no target. A missing
    /// `payload` is forwarded as `null`.
    pub fn parse(body: &[u8]) -> Result<Self, GatewayError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self {
                target: None,
                payload: Bytes::from_static(b"null"),
            });
        }

        let raw: RawBody<'_> = serde_json::from_slice(body)
            .map_err(|e| GatewayError::MalformedBody(e.to_string()))?;

        let target = raw.target.map(|value| match value {
            Value::String(s) => s,
            other => other.to_string(),
        });

        let payload = match raw.payload {
            Some(raw) => Bytes::copy_from_slice(raw.get().as_bytes()),
            None => Bytes::from_static(b"null"),
        };

        Ok(Self { target, payload })
    }
}
