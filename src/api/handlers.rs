// API request handlers

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::Instrument;
use uuid::Uuid;

use super::AppState;
use crate::proxy::{ProxyRequest, ProxyResponse};

/// Single entry point: every method and path is handed to the gateway.
pub async fn relay(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> ProxyResponse {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("relay", %request_id, %method);

    let request = ProxyRequest {
        method,
        headers,
        body,
    };

    async move {
        let response = state.gateway.handle(request).await;
        tracing::info!(status = response.status.as_u16(), "Request finished");
        response
    }
    .instrument(span)
    .await
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
