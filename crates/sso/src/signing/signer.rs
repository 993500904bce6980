use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::key::KeyError;

/// Trait for signing canonical request payloads.
///
/// Implementations are sync: signing is CPU-bound and happens on the
/// caller's thread, right before the request is dispatched.
pub trait PayloadSigner: Send + Sync {
    /// Sign the exact payload bytes. Returns raw signature bytes.
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, KeyError>;

    /// Algorithm identifier as the provider names it (e.g. "rsa-sha256").
    fn algorithm(&self) -> &str;

    /// Standard-alphabet base64 of [`PayloadSigner::sign`], the form carried in headers and forms.
    fn sign_base64(&self, payload: &[u8]) -> Result<String, KeyError> {
        self.sign(payload).map(|signature| STANDARD.encode(signature))
    }
}
