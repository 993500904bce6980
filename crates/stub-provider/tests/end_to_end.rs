mod common;

use pod_sso::types::OtpRequest;
use pod_sso::{ErrorKind, SsoConfig, get_signature};
use pod_sso_stub::{AppState, StubConfig, fixtures::key_from_seed, spawn};

const PRODUCTION_URL: &str = "https://sso.example.com";

#[test]
fn signature_for_production_host_validates_at_stub() {
    let key = key_from_seed("end-to-end", 2048).unwrap();
    let key_file = common::key_file(&key);

    // Signed offline against the production host, as a deployment would
    // precompute it.
    let signing_config = SsoConfig::new(PRODUCTION_URL, common::CLIENT_ID, common::CLIENT_SECRET)
        .with_private_key_file(key_file.path());
    let signature = get_signature(&signing_config).unwrap();

    let stub = spawn(AppState::new(StubConfig::new("sso.example.com", key.public_key()))).unwrap();
    let client = common::client(
        SsoConfig::new(stub.base_url(), common::CLIENT_ID, common::CLIENT_SECRET)
            .with_signature(signature),
    );

    let (otp, header) = client
        .send_otp(&OtpRequest::default(), common::HOST_KEY_ID, common::PHONE)
        .unwrap();
    assert_eq!(otp.identity, common::PHONE);
    assert_eq!(header.key_id, common::HOST_KEY_ID);
}

#[test]
fn signature_for_another_host_is_rejected() {
    let key = common::host_key();
    let key_file = common::key_file(&key);

    let signing_config = SsoConfig::new("https://other.example.com", common::CLIENT_ID, common::CLIENT_SECRET)
        .with_private_key_file(key_file.path());
    let signature = get_signature(&signing_config).unwrap();

    let stub = spawn(AppState::new(StubConfig::new("sso.example.com", key.public_key()))).unwrap();
    let client = common::client(
        SsoConfig::new(stub.base_url(), common::CLIENT_ID, common::CLIENT_SECRET)
            .with_signature(signature),
    );

    let error = client
        .send_otp(&OtpRequest::default(), common::HOST_KEY_ID, common::PHONE)
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Unauthorized);
}
