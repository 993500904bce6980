use anyhow::{Context, Result};
use pod_sso::KeyMaterial;
use rand_chacha::ChaCha20Rng;
use rand_chacha::rand_core::SeedableRng;
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};

/// Deterministic RSA key derived from `seed`.
///
/// The SHA-256 hash of the seed seeds a ChaCha20 CSPRNG, so the same seed
/// always yields the same key.
pub fn key_from_seed(seed: &str, bits: usize) -> Result<KeyMaterial> {
    let hash = Sha256::digest(seed.as_bytes());
    let mut rng = ChaCha20Rng::from_seed(hash.into());
    let key = RsaPrivateKey::new(&mut rng, bits).context("generating RSA key from seed")?;
    KeyMaterial::from_rsa(key).context("checking generated RSA key")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_key() {
        let a = key_from_seed("fixture", 1024).unwrap();
        let b = key_from_seed("fixture", 1024).unwrap();
        assert_eq!(a.to_xml().unwrap(), b.to_xml().unwrap());
        assert_eq!(a.bits(), 1024);
    }

    #[test]
    fn different_seeds_differ() {
        let a = key_from_seed("one", 1024).unwrap();
        let b = key_from_seed("two", 1024).unwrap();
        assert_ne!(a.public_xml().unwrap(), b.public_xml().unwrap());
    }
}
