use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rsa::RsaPublicKey;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use sha2::Sha256;

use super::key::{KeyError, KeyMaterial};
use super::signer::PayloadSigner;

/// RSA PKCS#1 v1.5 signer with SHA-256 digest.
///
/// PKCS#1 v1.5 padding is deterministic, so the same key and payload always
/// produce the same signature.
pub struct RsaSigner {
    signing_key: SigningKey<Sha256>,
}

impl RsaSigner {
    pub fn new(key: &KeyMaterial) -> Self {
        let signing_key = SigningKey::<Sha256>::new(key.as_rsa().clone());
        Self { signing_key }
    }
}

impl PayloadSigner for RsaSigner {
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, KeyError> {
        let signature = self
            .signing_key
            .try_sign(payload)
            .map_err(|e| KeyError::Signing(e.to_string()))?;
        Ok(signature.to_vec())
    }

    fn algorithm(&self) -> &str {
        "rsa-sha256"
    }
}

/// Signs `payload` and returns the base64 signature.
pub fn sign(key: &KeyMaterial, payload: &[u8]) -> Result<String, KeyError> {
    RsaSigner::new(key).sign_base64(payload)
}

/// Checks a base64 signature over `payload` against `public_key`.
pub fn verify(public_key: &RsaPublicKey, payload: &[u8], signature: &str) -> Result<(), KeyError> {
    let bytes = STANDARD
        .decode(signature.trim())
        .map_err(|e| KeyError::Verification(format!("signature is not base64: {e}")))?;
    let signature = Signature::try_from(bytes.as_slice())
        .map_err(|e| KeyError::Verification(e.to_string()))?;
    VerifyingKey::<Sha256>::new(public_key.clone())
        .verify(payload, &signature)
        .map_err(|e| KeyError::Verification(e.to_string()))
}
