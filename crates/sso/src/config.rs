use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::http::host_from_url;

/// Read-only settings shared by every operation of a client.
///
/// Optional values are `None` rather than empty strings; the `with_*` setters
/// treat an empty string as unset.
#[derive(Clone, Default)]
pub struct SsoConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Service-level bearer token used by the handshake and auto-login calls.
    pub service_access_token: Option<String>,
    /// Precomputed `host` signature, used when no key file is configured.
    pub signature: Option<String>,
    /// XML private key, re-read for every signed call.
    pub private_key_file: Option<PathBuf>,
    /// Whole-request timeout. `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
}

impl SsoConfig {
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::default()
        }
    }

    pub fn with_service_access_token(mut self, token: impl Into<String>) -> Self {
        self.service_access_token = non_empty(token.into());
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = non_empty(signature.into());
        self
    }

    pub fn with_private_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.private_key_file = (!path.as_os_str().is_empty()).then_some(path);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Host name of `base_url`, port stripped.
    pub fn host(&self) -> String {
        host_from_url(&self.base_url)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

impl fmt::Debug for SsoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsoConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("service_access_token", &self.service_access_token.as_ref().map(|_| "<redacted>"))
            .field("signature", &self.signature.as_ref().map(|_| "<redacted>"))
            .field("private_key_file", &self.private_key_file)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_unset() {
        let config = SsoConfig::new("https://sso.example.com", "id", "secret")
            .with_signature("")
            .with_service_access_token("")
            .with_private_key_file("");
        assert!(config.signature.is_none());
        assert!(config.service_access_token.is_none());
        assert!(config.private_key_file.is_none());
    }

    #[test]
    fn url_joins_without_double_slash() {
        let config = SsoConfig::new("https://sso.example.com/", "id", "secret");
        assert_eq!(config.url("/oauth2/token"), "https://sso.example.com/oauth2/token");
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = SsoConfig::new("https://sso.example.com", "id", "top-secret")
            .with_service_access_token("service-token");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("top-secret"));
        assert!(!rendered.contains("service-token"));
    }
}
