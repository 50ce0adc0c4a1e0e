// Relay executor - the single upstream call and its outcome translation

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::IgnoredAny;

use super::error::GatewayError;

/// Everything an upstream POST can end in. Implementations never return
/// `Err`; transport problems are folded into [`UpstreamOutcome::Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamOutcome {
    /// 2xx with the raw response body.
    Success(Bytes),
    /// Non-2xx with the status and the body read as text.
    Failure { status: u16, body: String },
    /// Connection, TLS, timeout, or body read failure.
    Transport(String),
}

/// The outbound HTTP collaborator.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// POST `body` to `url` with `Content-Type: application/json`.
    async fn post_json(&self, url: &str, body: Bytes) -> UpstreamOutcome;
}

/// Send the payload and translate the outcome. A success body must be valid
/// JSON; it is returned byte-for-byte.
pub async fn relay(upstream: &dyn Upstream, url: &str, payload: Bytes) -> Result<Bytes, GatewayError> {
    match upstream.post_json(url, payload).await {
        UpstreamOutcome::Success(body) => {
            serde_json::from_slice::<IgnoredAny>(&body).map_err(|e| {
                GatewayError::Transport(format!("Upstream returned invalid JSON: {}", e))
            })?;
            Ok(body)
        }
        UpstreamOutcome::Failure { status, body } => Err(GatewayError::Upstream { status, body }),
        UpstreamOutcome::Transport(e) => Err(GatewayError::Transport(e)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays a fixed outcome and records what it was asked to send.
    pub(crate) struct FakeUpstream {
        outcome: UpstreamOutcome,
        calls: AtomicUsize,
        last: Mutex<Option<(String, Bytes)>>,
    }

    impl FakeUpstream {
        pub(crate) fn new(outcome: UpstreamOutcome) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            }
        }

        pub(crate) fn json(body: &str) -> Self {
            Self::new(UpstreamOutcome::Success(Bytes::copy_from_slice(body.as_bytes())))
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn last_request(&self) -> Option<(String, Bytes)> {
            self.last.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Upstream for FakeUpstream {
        async fn post_json(&self, url: &str, body: Bytes) -> UpstreamOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some((url.to_string(), body));
            self.outcome.clone()
        }
    }

    #[tokio::test]
    async fn success_body_is_returned_verbatim() {
        let raw = r#"{ "candidates" : [ {"index": 0} ] }"#;
        let upstream = FakeUpstream::json(raw);
        let body = relay(&upstream, "http://u", Bytes::from_static(b"{}"))
            .await
            .unwrap();
        assert_eq!(&body[..], raw.as_bytes());
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn payload_is_sent_unchanged() {
        let upstream = FakeUpstream::json("{}");
        let payload = Bytes::from_static(br#"{"contents":[{"parts":[{"text":"hi"}]}]}"#);
        relay(&upstream, "http://u/models/m:generateContent?key=k", payload.clone())
            .await
            .unwrap();
        let (url, sent) = upstream.last_request().unwrap();
        assert_eq!(url, "http://u/models/m:generateContent?key=k");
        assert_eq!(sent, payload);
    }

    #[tokio::test]
    async fn invalid_success_json_is_a_transport_error() {
        let upstream = FakeUpstream::json("<html>oops</html>");
        let err = relay(&upstream, "http://u", Bytes::new()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[tokio::test]
    async fn empty_success_body_is_a_transport_error() {
        let upstream = FakeUpstream::json("");
        let err = relay(&upstream, "http://u", Bytes::new()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[tokio::test]
    async fn non_success_status_keeps_status_and_body_for_logging() {
        let upstream = FakeUpstream::new(UpstreamOutcome::Failure {
            status: 400,
            body: "API key not valid".to_string(),
        });
        match relay(&upstream, "http://u", Bytes::new()).await {
            Err(GatewayError::Upstream { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "API key not valid");
            }
            other => panic!("expected Upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn transport_failure_passes_through() {
        let upstream = FakeUpstream::new(UpstreamOutcome::Transport("connection refused".to_string()));
        let err = relay(&upstream, "http://u", Bytes::new()).await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
