use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

/// Failures of the key import and signing path.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("failed to read key file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode key: {0}")]
    Decode(String),
    #[error("failed to encode key: {0}")]
    Encode(String),
    #[error("inconsistent key material: {0}")]
    InvalidKey(String),
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("signature verification failed: {0}")]
    Verification(String),
}

/// Element layout of the XML key export, in export order. On import `DP`, `DQ`
/// and `InverseQ` are ignored and re-derived from `D`, `P` and `Q`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "RSAKeyValue")]
struct XmlKey {
    #[serde(rename = "Modulus", skip_serializing_if = "Option::is_none")]
    modulus: Option<String>,
    #[serde(rename = "Exponent", skip_serializing_if = "Option::is_none")]
    exponent: Option<String>,
    #[serde(rename = "P", skip_serializing_if = "Option::is_none")]
    p: Option<String>,
    #[serde(rename = "Q", skip_serializing_if = "Option::is_none")]
    q: Option<String>,
    #[serde(rename = "DP", skip_serializing_if = "Option::is_none")]
    dp: Option<String>,
    #[serde(rename = "DQ", skip_serializing_if = "Option::is_none")]
    dq: Option<String>,
    #[serde(rename = "InverseQ", skip_serializing_if = "Option::is_none")]
    inverse_q: Option<String>,
    #[serde(rename = "D", skip_serializing_if = "Option::is_none")]
    d: Option<String>,
}

impl XmlKey {
    fn to_xml(&self) -> Result<String, KeyError> {
        quick_xml::se::to_string(self).map_err(|e| KeyError::Encode(e.to_string()))
    }
}

fn b64(value: &BigUint) -> String {
    STANDARD.encode(value.to_bytes_be())
}

/// An RSA private key with CRT parameters precomputed.
///
/// Only obtainable through checked constructors: the modulus is the product of
/// the two primes and `D` inverts the public exponent.
#[derive(Clone)]
pub struct KeyMaterial {
    key: RsaPrivateKey,
}

impl KeyMaterial {
    pub fn from_components(
        modulus: BigUint,
        exponent: BigUint,
        d: BigUint,
        p: BigUint,
        q: BigUint,
    ) -> Result<Self, KeyError> {
        if modulus.bits() == 0 {
            return Err(KeyError::InvalidKey("modulus is zero".into()));
        }
        if &p * &q != modulus {
            return Err(KeyError::InvalidKey("modulus does not equal P * Q".into()));
        }

        let mut key = RsaPrivateKey::from_components(modulus, exponent, d, vec![p, q])
            .map_err(|e| KeyError::InvalidKey(e.to_string()))?;
        key.validate()
            .map_err(|e| KeyError::InvalidKey(e.to_string()))?;
        key.precompute()
            .map_err(|e| KeyError::InvalidKey(format!("precomputing CRT values: {e}")))?;

        Ok(Self { key })
    }

    /// Wraps a key produced by the `rsa` crate, running the same checks as import.
    pub fn from_rsa(key: RsaPrivateKey) -> Result<Self, KeyError> {
        let [p, q] = key.primes() else {
            return Err(KeyError::InvalidKey(format!(
                "expected two primes, found {}",
                key.primes().len()
            )));
        };
        Self::from_components(
            key.n().clone(),
            key.e().clone(),
            key.d().clone(),
            p.clone(),
            q.clone(),
        )
    }

    pub fn bits(&self) -> usize {
        self.key.size() * 8
    }

    pub fn public_key(&self) -> RsaPublicKey {
        self.key.to_public_key()
    }

    pub fn as_rsa(&self) -> &RsaPrivateKey {
        &self.key
    }

    /// Serializes the key back into the XML export format, derived CRT values included.
    pub fn to_xml(&self) -> Result<String, KeyError> {
        let primes = self.key.primes();
        XmlKey {
            modulus: Some(b64(self.key.n())),
            exponent: Some(b64(self.key.e())),
            p: primes.first().map(b64),
            q: primes.get(1).map(b64),
            dp: self.key.dp().map(b64),
            dq: self.key.dq().map(b64),
            inverse_q: self.key.crt_coefficient().as_ref().map(b64),
            d: Some(b64(self.key.d())),
        }
        .to_xml()
    }

    /// Public half only, in the same XML layout.
    pub fn public_xml(&self) -> Result<String, KeyError> {
        XmlKey {
            modulus: Some(b64(self.key.n())),
            exponent: Some(b64(self.key.e())),
            ..XmlKey::default()
        }
        .to_xml()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

/// Parses a private key from its XML export.
pub fn import_key(xml: &[u8]) -> Result<KeyMaterial, KeyError> {
    let parsed = parse_xml(xml)?;

    let modulus = BigUint::from_bytes_be(&element(&parsed.modulus, "Modulus")?);
    let exponent = BigUint::from(fold_exponent(&element(&parsed.exponent, "Exponent")?)?);
    let d = BigUint::from_bytes_be(&element(&parsed.d, "D")?);
    let p = BigUint::from_bytes_be(&element(&parsed.p, "P")?);
    let q = BigUint::from_bytes_be(&element(&parsed.q, "Q")?);

    KeyMaterial::from_components(modulus, exponent, d, p, q)
}

pub fn import_key_from_file(path: impl AsRef<Path>) -> Result<KeyMaterial, KeyError> {
    let path = path.as_ref();
    let xml = fs::read(path).map_err(|source| KeyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    import_key(&xml)
}

/// Parses the public half (`Modulus` and `Exponent`) of an XML key.
pub fn import_public_key(xml: &[u8]) -> Result<RsaPublicKey, KeyError> {
    let parsed = parse_xml(xml)?;
    let modulus = BigUint::from_bytes_be(&element(&parsed.modulus, "Modulus")?);
    let exponent = BigUint::from(fold_exponent(&element(&parsed.exponent, "Exponent")?)?);
    RsaPublicKey::new(modulus, exponent).map_err(|e| KeyError::InvalidKey(e.to_string()))
}

fn parse_xml(xml: &[u8]) -> Result<XmlKey, KeyError> {
    let text = std::str::from_utf8(xml)
        .map_err(|e| KeyError::Decode(format!("key is not UTF-8: {e}")))?;
    quick_xml::de::from_str(text).map_err(|e| KeyError::Decode(format!("malformed XML: {e}")))
}

fn element(value: &Option<String>, name: &str) -> Result<Vec<u8>, KeyError> {
    // exports are sometimes line-wrapped
    let text: String = value
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if text.is_empty() {
        return Err(KeyError::Decode(format!("missing <{name}> element")));
    }
    STANDARD
        .decode(text)
        .map_err(|e| KeyError::Decode(format!("<{name}> is not valid base64: {e}")))
}

/// Folds big-endian exponent bytes into an integer, most significant first.
fn fold_exponent(bytes: &[u8]) -> Result<u64, KeyError> {
    let significant = match bytes.iter().position(|&b| b != 0) {
        Some(start) => &bytes[start..],
        None => &[][..],
    };
    if significant.len() > 8 {
        return Err(KeyError::Decode(format!(
            "public exponent is {} bytes long",
            significant.len()
        )));
    }
    Ok(significant
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}
