mod key;
mod payload;
mod provider;
mod rsa;
mod signer;

pub use key::{KeyError, KeyMaterial, import_key, import_key_from_file, import_public_key};
pub use payload::CanonicalPayload;
pub use provider::{SIGNED_HEADERS, SignatureHeader, get_signature, sign_with_key_file, sign_with_key_xml};
pub use self::rsa::{RsaSigner, sign, verify};
pub use signer::PayloadSigner;

pub use ::rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
