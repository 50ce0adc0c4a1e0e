// Target router - maps a declared target to its upstream model endpoint

use std::fmt;

use super::error::GatewayError;
use super::ingress::Credential;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Text,
    Image,
    Audio,
}

impl Target {
    pub const ALL: [Target; 3] = [Target::Text, Target::Image, Target::Audio];

    /// Exact, case-sensitive match on the wire name. Anything else,
    /// including a missing target, is rejected.
    pub fn parse(raw: Option<&str>) -> Result<Self, GatewayError> {
        match raw {
            Some("text") => Ok(Target::Text),
            Some("image") => Ok(Target::Image),
            Some("audio") => Ok(Target::Audio),
            other => Err(GatewayError::InvalidTarget(other.map(str::to_string))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Text => "text",
            Target::Image => "image",
            Target::Audio => "audio",
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            Target::Text => Endpoint {
                model: "gemini-2.5-flash-preview-05-20",
                method: "generateContent",
            },
            Target::Image => Endpoint {
                model: "imagen-3.0-generate-002",
                method: "predict",
            },
            Target::Audio => Endpoint {
                model: "gemini-2.5-flash-preview-tts",
                method: "generateContent",
            },
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixed model + RPC method pair on the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub model: &'static str,
    pub method: &'static str,
}

/// Builds upstream URLs against a base such as
/// `https://generativelanguage.googleapis.com/v1beta`.
#[derive(Debug, Clone)]
pub struct TargetRouter {
    base_url: String,
}

impl TargetRouter {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL without the credential; safe to log.
    pub fn endpoint_url(&self, target: Target) -> String {
        let endpoint = target.endpoint();
        format!("{}/models/{}:{}", self.base_url, endpoint.model, endpoint.method)
    }

    /// Full request URL. The key travels as a query parameter, which is how
    /// the Generative Language API authenticates API-key callers.
    pub fn upstream_url(&self, target: Target, credential: &Credential) -> String {
        format!(
            "{}?key={}",
            self.endpoint_url(target),
            urlencoding::encode(credential.expose())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

    #[test]
    fn known_targets() {
        assert_eq!(Target::parse(Some("text")).unwrap(), Target::Text);
        assert_eq!(Target::parse(Some("image")).unwrap(), Target::Image);
        assert_eq!(Target::parse(Some("audio")).unwrap(), Target::Audio);
    }

    #[test]
    fn unknown_or_missing_target_is_rejected() {
        for raw in [Some("video"), Some(""), Some("TEXT"), Some(" text"), None] {
            match Target::parse(raw) {
                Err(GatewayError::InvalidTarget(got)) => {
                    assert_eq!(got.as_deref(), raw);
                }
                other => panic!("expected InvalidTarget for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn endpoint_table() {
        let router = TargetRouter::new(BASE);
        assert_eq!(
            router.endpoint_url(Target::Text),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-preview-05-20:generateContent"
        );
        assert_eq!(
            router.endpoint_url(Target::Image),
            "https://generativelanguage.googleapis.com/v1beta/models/imagen-3.0-generate-002:predict"
        );
        assert_eq!(
            router.endpoint_url(Target::Audio),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-preview-tts:generateContent"
        );
    }

    #[test]
    fn credential_is_appended_as_key_query_param() {
        let router = TargetRouter::new(BASE);
        let credential = Credential::new("AIza-test").unwrap();
        let url = router.upstream_url(Target::Image, &credential);
        assert!(url.ends_with(":predict?key=AIza-test"));
    }

    #[test]
    fn credential_is_percent_encoded() {
        let router = TargetRouter::new(BASE);
        let credential = Credential::new("a&b=c d").unwrap();
        let url = router.upstream_url(Target::Text, &credential);
        assert!(url.ends_with("?key=a%26b%3Dc%20d"));
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let router = TargetRouter::new("http://127.0.0.1:9999/v1beta/");
        assert_eq!(router.base_url(), "http://127.0.0.1:9999/v1beta");
        assert!(router
            .endpoint_url(Target::Audio)
            .starts_with("http://127.0.0.1:9999/v1beta/models/"));
    }

    #[test]
    fn display_uses_wire_name() {
        for target in Target::ALL {
            let name = target.to_string();
            assert_eq!(Target::parse(Some(name.as_str())).unwrap(), target);
        }
    }
}
