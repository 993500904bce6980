use std::fmt;

/// The exact string a signature is computed over.
///
/// The provider rebuilds this string on its side and compares byte for byte,
/// so constructors fix the field order, separators and lack of trailing whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPayload(String);

impl CanonicalPayload {
    /// `host: <hostname>`, signed for the `Signature` authorization scheme.
    pub fn host(hostname: &str) -> Self {
        Self(format!("host: {hostname}"))
    }

    /// Newline-joined block signed with the user's own key for auto-login codes.
    pub fn auto_login(access_token: &str, key_id: &str, timestamp_millis: i64) -> Self {
        Self(format!(
            "access_token: {access_token}\nkey_id: {key_id}\ntimestamp: {timestamp_millis}"
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for CanonicalPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_payload_layout() {
        assert_eq!(
            CanonicalPayload::host("accounts.example.com").as_str(),
            "host: accounts.example.com"
        );
    }

    #[test]
    fn auto_login_payload_layout() {
        let payload = CanonicalPayload::auto_login("tok", "kid", 1_700_000_000_123);
        assert_eq!(
            payload.as_str(),
            "access_token: tok\nkey_id: kid\ntimestamp: 1700000000123"
        );
        assert!(!payload.as_str().ends_with('\n'));
    }
}
