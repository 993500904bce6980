use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Form, Json, Router,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pod_sso::{CanonicalPayload, KeyMaterial, SignatureHeader, verify};
use rsa::RsaPublicKey;
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

type FormFields = Form<HashMap<String, String>>;

/// Credentials and keys the stub checks incoming calls against.
#[derive(Debug)]
pub struct StubConfig {
    /// Host name covered by the `Signature` header.
    pub host_name: String,
    pub host_key_id: String,
    pub host_key: RsaPublicKey,
    /// Key handed out by the private key handshake and checked on auto-login.
    pub user_key: Option<KeyMaterial>,
    pub user_key_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub service_token: String,
    pub access_token: String,
    pub refresh_token: String,
    pub otp: String,
    pub authorization_code: String,
}

impl StubConfig {
    pub fn new(host_name: impl Into<String>, host_key: RsaPublicKey) -> Self {
        Self {
            host_name: host_name.into(),
            host_key_id: "host-key".into(),
            host_key,
            user_key: None,
            user_key_id: "user-key".into(),
            client_id: "stub-client".into(),
            client_secret: "stub-secret".into(),
            service_token: "service-token".into(),
            access_token: "access-token".into(),
            refresh_token: "refresh-token".into(),
            otp: "123456".into(),
            authorization_code: "auth-code".into(),
        }
    }

    pub fn with_user_key(mut self, key: KeyMaterial) -> Self {
        self.user_key = Some(key);
        self
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<StubConfig>,
}

impl AppState {
    pub fn new(config: StubConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &StubConfig {
        &self.config
    }
}

/// Error response in the provider's `error`/`error_description` shape.
#[derive(Debug)]
pub struct Rejection {
    status: StatusCode,
    body: Value,
}

impl Rejection {
    fn new(status: StatusCode, error: &str, description: &str) -> Self {
        Self {
            status,
            body: json!({"error": error, "error_description": description}),
        }
    }

    fn unauthorized(error: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error, "authorization rejected")
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

type Reply = Result<Json<Value>, Rejection>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(|| async move { (StatusCode::OK, "Ok").into_response() }))
        .route("/oauth2/clients/handshake/{client_id}", post(client_handshake))
        .route("/oauth2/otp/authorize/{phone_number}", post(otp_authorize))
        .route("/oauth2/otp/verify/{phone_number}", post(otp_verify))
        .route("/oauth2/otp/autologin/code", post(auto_login_code))
        .route("/oauth2/token", post(token))
        .route("/oauth2/token/info", post(token_info))
        .route("/oauth2/token/revoke", post(token_revoke))
        .route("/users", get(user_info).post(change_user_info))
        .route("/users/info/list", get(list_users))
        .route("/users/keys/handshake", post(user_key_handshake))
        .with_state(state)
}

/// Canned responses for exercising client error handling. Not part of the
/// provider surface; only [`spawn`] and tests merge them in.
pub fn test_routes() -> Router {
    Router::new()
        .route("/_stub/status/{code}", get(fixed_status))
        .route("/_stub/html", get(|| async { (StatusCode::OK, "<html>oops</html>") }))
        .route("/_stub/empty", get(|| async { StatusCode::OK }))
        .route("/_stub/slow", get(slow))
}

pub async fn run(host: String, port: u16, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!(addr = %listener.local_addr()?, "stub provider listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// A stub served from a background thread. Shuts down when dropped.
#[derive(Debug)]
pub struct RunningStub {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl RunningStub {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for RunningStub {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// Serves the stub, [`test_routes`] included, on an ephemeral loopback port
/// from its own thread and runtime, so blocking callers can use it from plain
/// tests.
pub fn spawn(state: AppState) -> std::io::Result<RunningStub> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    listener.set_nonblocking(true)?;
    let addr = listener.local_addr()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let (shutdown, stopped) = oneshot::channel::<()>();

    std::thread::spawn(move || {
        runtime.block_on(async move {
            let listener = match tokio::net::TcpListener::from_std(listener) {
                Ok(listener) => listener,
                Err(error) => {
                    error!(%error, "registering stub listener");
                    return;
                }
            };
            let served = axum::serve(listener, router(state).merge(test_routes()))
                .with_graceful_shutdown(async move {
                    let _ = stopped.await;
                })
                .await;
            if let Err(error) = served {
                error!(%error, "stub provider stopped");
            }
        });
    });

    debug!(%addr, "stub provider spawned");
    Ok(RunningStub {
        addr,
        shutdown: Some(shutdown),
    })
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION)?.to_str().ok()
}

fn require_bearer(headers: &HeaderMap, expected: &str) -> Result<(), Rejection> {
    match authorization(headers).and_then(|value| value.strip_prefix("Bearer ")) {
        Some(token) if token == expected => Ok(()),
        _ => Err(Rejection::unauthorized("invalid_token")),
    }
}

fn require_basic(headers: &HeaderMap, config: &StubConfig) -> Result<(), Rejection> {
    let expected = format!("{}:{}", config.client_id, config.client_secret);
    let presented = authorization(headers)
        .and_then(|value| value.strip_prefix("Basic "))
        .and_then(|encoded| STANDARD.decode(encoded).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok());

    match presented {
        Some(credentials) if credentials == expected => Ok(()),
        _ => Err(Rejection::unauthorized("invalid_client")),
    }
}

/// Checks the `Signature` header against `host: <host_name>` and the host key.
fn require_signature(headers: &HeaderMap, config: &StubConfig) -> Result<(), Rejection> {
    let header = authorization(headers)
        .and_then(SignatureHeader::parse)
        .ok_or_else(|| Rejection::unauthorized("invalid_signature_header"))?;
    if header.key_id != config.host_key_id {
        return Err(Rejection::unauthorized("unknown_key"));
    }

    let payload = CanonicalPayload::host(&config.host_name);
    verify(&config.host_key, payload.as_bytes(), &header.signature).map_err(|error| {
        debug!(%error, "host signature rejected");
        Rejection::unauthorized("invalid_signature")
    })
}

fn field<'a>(form: &'a HashMap<String, String>, name: &str) -> &'a str {
    form.get(name).map(String::as_str).unwrap_or_default()
}

fn token_pair(config: &StubConfig) -> Value {
    json!({
        "access_token": config.access_token,
        "refresh_token": config.refresh_token,
        "expires_in": 900,
        "token_type": "bearer",
        "scope": "profile",
        "id_token": "",
        "device_uid": "",
    })
}

async fn client_handshake(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    headers: HeaderMap,
    Form(form): FormFields,
) -> Reply {
    let config = state.config();
    require_bearer(&headers, &config.service_token)?;
    if client_id != config.client_id {
        return Err(Rejection::new(StatusCode::NOT_FOUND, "invalid_client", "unknown client"));
    }
    let device_uid = field(&form, "device_uid");
    if device_uid.is_empty() {
        return Err(Rejection::new(StatusCode::BAD_REQUEST, "invalid_request", "device_uid missing"));
    }

    let algorithm = form.get("algorithm").map(String::as_str).unwrap_or("rsa-sha256");
    Ok(Json(json!({
        "algorithm": algorithm,
        "client": {"client_id": config.client_id, "name": "stub", "active": true},
        "device": {"uid": device_uid, "ip": field(&form, "device_client_ip"), "current": true},
        "expires_in": 3600,
        "keyFormat": "xml",
        "keyId": config.host_key_id,
        "publicKey": "",
    })))
}

async fn otp_authorize(
    State(state): State<AppState>,
    Path(phone_number): Path<String>,
    headers: HeaderMap,
) -> Reply {
    let config = state.config();
    require_signature(&headers, config)?;
    info!(%phone_number, "otp issued");
    Ok(Json(json!({
        "codeLength": config.otp.len(),
        "expires_in": 120,
        "identity": phone_number,
        "sent_before": false,
        "type": "SMS",
    })))
}

async fn otp_verify(
    State(state): State<AppState>,
    Path(_phone_number): Path<String>,
    headers: HeaderMap,
    Form(form): FormFields,
) -> Reply {
    let config = state.config();
    require_signature(&headers, config)?;
    if field(&form, "otp") != config.otp {
        return Err(Rejection::new(StatusCode::BAD_REQUEST, "invalid_otp", "otp mismatch"));
    }
    Ok(Json(json!({
        "code": config.authorization_code,
        "device_uid": "stub-device",
    })))
}

async fn token(State(state): State<AppState>, headers: HeaderMap, Form(form): FormFields) -> Reply {
    let config = state.config();
    require_basic(&headers, config)?;

    let granted = match field(&form, "grant_type") {
        "authorization_code" => field(&form, "code") == config.authorization_code,
        "refresh_token" => field(&form, "refresh_token") == config.refresh_token,
        _ => false,
    };
    if !granted {
        return Err(Rejection::new(StatusCode::BAD_REQUEST, "invalid_grant", "grant rejected"));
    }
    Ok(Json(token_pair(config)))
}

async fn token_info(State(state): State<AppState>, headers: HeaderMap, Form(form): FormFields) -> Reply {
    let config = state.config();
    require_basic(&headers, config)?;

    if field(&form, "token") != config.access_token {
        return Ok(Json(json!({"active": false})));
    }
    Ok(Json(json!({
        "active": true,
        "client_id": config.client_id,
        "sub": "1001",
        "scope": "profile",
        "exp": 900,
        "login_type": "otp",
        "callerClient": {"id": 1001, "preferred_username": "stub-user"},
    })))
}

async fn token_revoke(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode, Rejection> {
    require_basic(&headers, state.config())?;
    Ok(StatusCode::OK)
}

async fn user_info(State(state): State<AppState>, headers: HeaderMap) -> Reply {
    let config = state.config();
    require_bearer(&headers, &config.access_token)?;
    Ok(Json(json!({
        "id": 1001,
        "sub": "1001",
        "preferred_username": "stub-user",
        "given_name": "Stub",
        "family_name": "User",
        "phone_number_verified": true,
        "hasPassword": false,
    })))
}

async fn change_user_info(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): FormFields,
) -> Reply {
    require_bearer(&headers, &state.config().access_token)?;
    Ok(Json(json!({
        "updated": true,
        "nationalcode": field(&form, "nationalcode"),
        "birthdate": field(&form, "birthdate"),
    })))
}

async fn list_users(State(state): State<AppState>, headers: HeaderMap, RawQuery(query): RawQuery) -> Reply {
    require_basic(&headers, state.config())?;

    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .into_owned()
        .collect();
    let kinds = pairs.iter().filter(|(name, _)| name == "identityType").map(|(_, v)| v);
    let identities = pairs.iter().filter(|(name, _)| name == "identity").map(|(_, v)| v);

    let users: Vec<Value> = kinds
        .zip(identities)
        .enumerate()
        .map(|(index, (kind, identity))| {
            json!({"id": 1001 + index, "identityType": kind, "identity": identity})
        })
        .collect();
    Ok(Json(json!({"users": users})))
}

async fn user_key_handshake(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): FormFields,
) -> Reply {
    let config = state.config();
    require_bearer(&headers, &config.access_token)?;
    if field(&form, "keyAlgorithm") != "RSA" {
        return Err(Rejection::new(StatusCode::BAD_REQUEST, "invalid_request", "unsupported key algorithm"));
    }
    let key = config
        .user_key
        .as_ref()
        .ok_or_else(|| Rejection::new(StatusCode::NOT_IMPLEMENTED, "not_implemented", "no user key"))?;
    let private_key = key.to_xml().map_err(|error| {
        warn!(%error, "user key export failed");
        Rejection::new(StatusCode::INTERNAL_SERVER_ERROR, "server_error", "key export failed")
    })?;

    Ok(Json(json!({
        "keyId": config.user_key_id,
        "algorithm": "rsa-sha256",
        "privateKey": private_key,
    })))
}

async fn auto_login_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): FormFields,
) -> Reply {
    let config = state.config();
    require_bearer(&headers, &config.service_token)?;
    let key = config
        .user_key
        .as_ref()
        .ok_or_else(|| Rejection::new(StatusCode::NOT_IMPLEMENTED, "not_implemented", "no user key"))?;

    let key_id = field(&form, "keyId");
    if key_id != config.user_key_id {
        return Err(Rejection::unauthorized("unknown_key"));
    }
    let timestamp: i64 = field(&form, "timestamp")
        .parse()
        .map_err(|_| Rejection::new(StatusCode::BAD_REQUEST, "invalid_request", "timestamp missing"))?;

    let payload = CanonicalPayload::auto_login(field(&form, "access_token"), key_id, timestamp);
    verify(&key.public_key(), payload.as_bytes(), field(&form, "signature")).map_err(|error| {
        debug!(%error, "auto-login signature rejected");
        Rejection::unauthorized("invalid_signature")
    })?;

    Ok(Json(json!({"code": "auto-login-code", "expires_in": 60})))
}

async fn fixed_status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(json!({"reason": "x"}))).into_response()
}

async fn slow() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(2)).await;
    StatusCode::OK
}
