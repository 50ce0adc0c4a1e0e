// Proxy module - the dispatch gateway, independent of the HTTP server
//
// Every request goes through three stages: ingress (CORS, credential, body),
// target routing, and the upstream relay. Each path ends in exactly one
// `ProxyResponse`.

pub mod error;
pub mod ingress;
pub mod relay;
pub mod router;

use std::sync::Arc;

use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use bytes::Bytes;

use crate::config::Messages;
use error::GatewayError;
use ingress::{apply_cors, is_preflight, Credential, InboundBody};
use relay::Upstream;
use router::{Target, TargetRouter};

/// Inbound request as plain data.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyRequest {
    pub fn new(method: Method, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Outbound response as plain data. CORS headers are always present.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyResponse {
    fn new(status: StatusCode, content_type: Option<&'static str>, body: Bytes) -> Self {
        let mut headers = HeaderMap::new();
        apply_cors(&mut headers);
        if let Some(content_type) = content_type {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT, None, Bytes::new())
    }

    pub fn json(body: Bytes) -> Self {
        Self::new(StatusCode::OK, Some("application/json; charset=utf-8"), body)
    }

    pub fn text(status: StatusCode, message: &str) -> Self {
        Self::new(
            status,
            Some("text/plain; charset=utf-8"),
            Bytes::copy_from_slice(message.as_bytes()),
        )
    }
}

/// The dispatch gateway. Shared read-only across requests.
pub struct Gateway {
    credential: Option<Credential>,
    router: TargetRouter,
    upstream: Arc<dyn Upstream>,
    messages: Messages,
}

impl Gateway {
    /// `credential` is `None` when the key was not provisioned; the gateway
    /// still serves preflights and answers every other request with 500.
    pub fn new(credential: Option<Credential>, router: TargetRouter, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            credential,
            router,
            upstream,
            messages: Messages::default(),
        }
    }

    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub async fn handle(&self, request: ProxyRequest) -> ProxyResponse {
        if is_preflight(&request.method) {
            tracing::debug!("Answering CORS preflight");
            return ProxyResponse::no_content();
        }

        match self.dispatch(&request).await {
            Ok(body) => ProxyResponse::json(body),
            Err(err) => {
                match &err {
                    GatewayError::MissingCredential => {
                        tracing::error!("Upstream API key is not set; check the server secret configuration")
                    }
                    GatewayError::InvalidTarget(_) | GatewayError::MalformedBody(_) => {
                        tracing::warn!(error = %err, "Rejected request")
                    }
                    GatewayError::Upstream { .. } | GatewayError::Transport(_) => {
                        tracing::error!(error = %err, "Proxy request failed")
                    }
                }
                ProxyResponse::text(err.status(), err.client_message(&self.messages))
            }
        }
    }

    async fn dispatch(&self, request: &ProxyRequest) -> Result<Bytes, GatewayError> {
        let credential = self.credential.as_ref().ok_or(GatewayError::MissingCredential)?;
        let inbound = InboundBody::parse(&request.body)?;
        let target = Target::parse(inbound.target.as_deref())?;

        tracing::debug!(
            target_kind = %target,
            endpoint = %self.router.endpoint_url(target),
            payload_bytes = inbound.payload.len(),
            origin = ?request.headers.get(header::ORIGIN),
            "Relaying request"
        );

        let url = self.router.upstream_url(target, credential);
        relay::relay(self.upstream.as_ref(), &url, inbound.payload).await
    }
}
