// Error types for the dispatch gateway

use axum::http::StatusCode;
use thiserror::Error;

use crate::config::Messages;

/// Every way a request can fail before a success body is relayed.
///
/// The `Display` text is for server-side logs only; callers receive
/// [`GatewayError::client_message`].
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Upstream API key is not configured")]
    MissingCredential,

    #[error("Invalid target: {0:?}")]
    InvalidTarget(Option<String>),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Upstream request failed with status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Upstream transport error: {0}")]
    Transport(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidTarget(_) | Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::MissingCredential | Self::Upstream { .. } | Self::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Localized text sent to the caller. Never contains upstream details.
    pub fn client_message<'a>(&self, messages: &'a Messages) -> &'a str {
        match self {
            Self::MissingCredential => &messages.missing_credential,
            Self::InvalidTarget(_) => &messages.invalid_target,
            Self::MalformedBody(_) => &messages.malformed_body,
            Self::Upstream { .. } | Self::Transport(_) => &messages.upstream_failure,
        }
    }
}
