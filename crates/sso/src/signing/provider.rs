use std::fmt;
use std::path::Path;

use crate::config::SsoConfig;
use crate::error::{SsoError, SsoResult};
use crate::http::host_from_url;

use super::key::{KeyError, import_key, import_key_from_file};
use super::payload::CanonicalPayload;
use super::rsa::sign;

/// Name of the single pseudo-header covered by the host signature.
pub const SIGNED_HEADERS: &str = "host";

/// Returns the signature for the `Signature` authorization scheme.
///
/// A configured key file always wins: the key is re-read and `host: <host>` is
/// signed on every call. Without a key file the precomputed signature is used
/// as is.
pub fn get_signature(config: &SsoConfig) -> SsoResult<String> {
    match (&config.private_key_file, &config.signature) {
        (Some(path), _) => {
            let payload = CanonicalPayload::host(&host_from_url(&config.base_url));
            Ok(sign_with_key_file(path, &payload)?)
        }
        (None, Some(signature)) => Ok(signature.clone()),
        (None, None) => Err(SsoError::missing_signature()),
    }
}

pub fn sign_with_key_file(path: &Path, payload: &CanonicalPayload) -> Result<String, KeyError> {
    let key = import_key_from_file(path)?;
    sign(&key, payload.as_bytes())
}

pub fn sign_with_key_xml(xml: &str, payload: &CanonicalPayload) -> Result<String, KeyError> {
    let key = import_key(xml.as_bytes())?;
    sign(&key, payload.as_bytes())
}

/// Value of the `Authorization` header in the `Signature` scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub key_id: String,
    pub signature: String,
}

impl SignatureHeader {
    pub fn new(key_id: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            signature: signature.into(),
        }
    }

    /// Parses `Signature keyId="..",signature="..",headers=".."`. Returns `None`
    /// unless the scheme is `Signature`, both values are present and the signed
    /// headers are exactly `host`.
    pub fn parse(value: &str) -> Option<Self> {
        let params = value.strip_prefix("Signature ")?;
        let mut key_id = None;
        let mut signature = None;
        let mut headers = None;

        for param in params.split(',') {
            let (name, quoted) = param.trim().split_once('=')?;
            let unquoted = quoted.strip_prefix('"')?.strip_suffix('"')?;
            match name {
                "keyId" => key_id = Some(unquoted.to_string()),
                "signature" => signature = Some(unquoted.to_string()),
                "headers" => headers = Some(unquoted.to_string()),
                _ => {}
            }
        }

        if headers.as_deref() != Some(SIGNED_HEADERS) {
            return None;
        }
        Some(Self {
            key_id: key_id?,
            signature: signature?,
        })
    }
}

impl fmt::Display for SignatureHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signature keyId=\"{}\",signature=\"{}\",headers=\"{}\"",
            self.key_id, self.signature, SIGNED_HEADERS
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::signing::test_support::{seeded_key, write_key_file};

    fn config() -> SsoConfig {
        SsoConfig::new("https://accounts.example.com:8443/path", "client", "secret")
    }

    #[test]
    fn key_file_overrides_precomputed_signature() {
        let key = seeded_key("provider");
        let file = write_key_file(&key);
        let config = config()
            .with_signature("precomputed")
            .with_private_key_file(file.path());

        let signature = get_signature(&config).unwrap();
        let expected = sign(&key, b"host: accounts.example.com").unwrap();
        assert_eq!(signature, expected);
        assert_ne!(signature, "precomputed");
    }

    #[test]
    fn precomputed_signature_is_returned_verbatim() {
        let config = config().with_signature("abc==");
        assert_eq!(get_signature(&config).unwrap(), "abc==");
    }

    #[test]
    fn missing_configuration_is_reported() {
        let error = get_signature(&config()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingSignatureConfiguration);
    }

    #[test]
    fn unreadable_key_file_is_invalid_signature() {
        let config = config()
            .with_signature("precomputed")
            .with_private_key_file("/nonexistent/key.xml");
        let error = get_signature(&config).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidSignature);
    }

    #[test]
    fn xml_signing_uses_given_payload() {
        let key = seeded_key("xml");
        let payload = CanonicalPayload::auto_login("tok", "kid", 42);
        let signature = sign_with_key_xml(&key.to_xml().unwrap(), &payload).unwrap();
        crate::signing::verify(&key.public_key(), payload.as_bytes(), &signature).unwrap();
    }

    #[test]
    fn header_renders_signature_scheme() {
        let header = SignatureHeader::new("key-1", "c2ln");
        assert_eq!(
            header.to_string(),
            r#"Signature keyId="key-1",signature="c2ln",headers="host""#
        );
    }

    #[test]
    fn header_parse_inverts_display() {
        let header = SignatureHeader::new("key-1", "c2ln+/==");
        assert_eq!(SignatureHeader::parse(&header.to_string()), Some(header));
    }

    #[test]
    fn header_parse_rejects_other_schemes() {
        assert_eq!(SignatureHeader::parse("Bearer token"), None);
        assert_eq!(
            SignatureHeader::parse(r#"Signature keyId="k",signature="s",headers="date""#),
            None
        );
        assert_eq!(SignatureHeader::parse(r#"Signature keyId="k",headers="host""#), None);
    }
}
