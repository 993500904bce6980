mod common;

use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use pod_sso::{CanonicalPayload, SignatureHeader, sign};
use pod_sso_stub::{AppState, StubConfig, router, test_routes};
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_state() -> AppState {
    AppState::new(StubConfig::new("127.0.0.1", common::host_key().public_key()))
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn otp_request(authorization: Option<String>) -> Request<axum::body::Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/oauth2/otp/authorize/09120000000")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(axum::body::Body::empty()).unwrap()
}

#[tokio::test]
async fn healthcheck_returns_200() {
    let app = router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthcheck")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Ok");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn otp_without_signature_is_401() {
    let app = router(test_state());

    let response = app.oneshot(otp_request(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], json!("invalid_signature_header"));
}

#[tokio::test]
async fn otp_with_valid_signature_is_accepted() {
    let key = common::host_key();
    let app = router(AppState::new(StubConfig::new("127.0.0.1", key.public_key())));

    let signature = sign(&key, CanonicalPayload::host("127.0.0.1").as_bytes()).unwrap();
    let header = SignatureHeader::new(common::HOST_KEY_ID, signature);
    let response = app.oneshot(otp_request(Some(header.to_string()))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["identity"], json!("09120000000"));
    assert_eq!(body["codeLength"], json!(6));
}

#[tokio::test]
async fn otp_with_unknown_key_id_is_401() {
    let key = common::host_key();
    let app = router(AppState::new(StubConfig::new("127.0.0.1", key.public_key())));

    let signature = sign(&key, CanonicalPayload::host("127.0.0.1").as_bytes()).unwrap();
    let header = SignatureHeader::new("someone-else", signature);
    let response = app.oneshot(otp_request(Some(header.to_string()))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], json!("unknown_key"));
}

#[tokio::test]
async fn token_requires_basic_auth() {
    let app = router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/oauth2/token")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(axum::body::Body::from("grant_type=refresh_token&refresh_token=refresh-token"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], json!("invalid_client"));
}

#[tokio::test]
async fn fixed_status_route_echoes_reason() {
    let app = router(test_state()).merge(test_routes());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/_stub/status/409")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(response).await, json!({"reason": "x"}));
}

#[tokio::test]
async fn provider_router_has_no_canned_routes() {
    for uri in ["/_stub/status/409", "/_stub/html", "/_stub/empty", "/_stub/slow"] {
        let response = router(test_state())
            .oneshot(Request::builder().uri(uri).body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}
