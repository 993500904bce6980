#![allow(dead_code)]

use std::io::Write;

use pod_sso::{KeyMaterial, PodClient, SsoConfig};
use pod_sso_stub::{AppState, RunningStub, StubConfig, fixtures::key_from_seed, spawn};
use tempfile::NamedTempFile;

pub const CLIENT_ID: &str = "stub-client";
pub const CLIENT_SECRET: &str = "stub-secret";
pub const SERVICE_TOKEN: &str = "service-token";
pub const HOST_KEY_ID: &str = "host-key";
pub const PHONE: &str = "09120000000";

pub fn host_key() -> KeyMaterial {
    key_from_seed("host-key", 1024).unwrap()
}

pub fn user_key() -> KeyMaterial {
    key_from_seed("user-key", 1024).unwrap()
}

pub fn key_file(key: &KeyMaterial) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(key.to_xml().unwrap().as_bytes()).unwrap();
    file
}

/// Stub that accepts signatures over `host: 127.0.0.1`, the host of its own URL.
pub fn start(host_key: &KeyMaterial) -> RunningStub {
    let config = StubConfig::new("127.0.0.1", host_key.public_key()).with_user_key(user_key());
    spawn(AppState::new(config)).unwrap()
}

pub fn config(stub: &RunningStub) -> SsoConfig {
    SsoConfig::new(stub.base_url(), CLIENT_ID, CLIENT_SECRET).with_service_access_token(SERVICE_TOKEN)
}

pub fn client(config: SsoConfig) -> PodClient {
    PodClient::new(config).unwrap()
}
