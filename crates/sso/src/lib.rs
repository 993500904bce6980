pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod signing;
pub mod types;

pub use client::PodClient;
pub use config::SsoConfig;
pub use error::{ErrorKind, SsoError, SsoResult};
pub use http::{Dispatcher, RequestContext};
pub use signing::{
    CanonicalPayload, KeyError, KeyMaterial, PayloadSigner, RsaSigner, SignatureHeader,
    get_signature, import_key, import_key_from_file, import_public_key, sign, verify,
};
