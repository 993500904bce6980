pub mod endpoints;

use tracing::info;
use uuid::Uuid;

use crate::config::SsoConfig;
use crate::error::{ErrorKind, SsoError, SsoResult};
use crate::http::{Dispatcher, RequestContext};
use crate::signing::{CanonicalPayload, SignatureHeader, get_signature, sign_with_key_xml};
use crate::types::{
    AutoLoginCodeRequest, ChangeUserInfoRequest, HandshakeRequest, HandshakeResponse, OtpRequest,
    OtpResponse, OtpVerifyResponse, RawResponse, RevokeTokenRequest, TokenInfoRequest,
    TokenInfoResponse, TokenRequest, TokenResponse, UserInfo, UserListRequest, VerifyOtpRequest,
};

/// Client for the provider's OAuth, OTP and user endpoints.
///
/// Holds a read-only configuration and a blocking dispatcher; every method
/// performs exactly one HTTP call on the caller's thread.
#[derive(Debug, Clone)]
pub struct PodClient {
    config: SsoConfig,
    dispatcher: Dispatcher,
}

impl PodClient {
    pub fn new(config: SsoConfig) -> SsoResult<Self> {
        let dispatcher = Dispatcher::new(config.timeout)?;
        Ok(Self { config, dispatcher })
    }

    pub fn config(&self) -> &SsoConfig {
        &self.config
    }

    /// Current `host` signature, per the configured key file or precomputed value.
    pub fn signature(&self) -> SsoResult<String> {
        get_signature(&self.config)
    }

    fn service_token(&self) -> SsoResult<&str> {
        self.config
            .service_access_token
            .as_deref()
            .ok_or_else(|| SsoError::new(ErrorKind::InvalidInput, "service access token missing"))
    }

    fn signed_header(&self, key_id: &str) -> SsoResult<SignatureHeader> {
        Ok(SignatureHeader::new(key_id, self.signature()?))
    }

    /// Registers a device with the provider. A fresh device id is generated
    /// when `device_uid` is `None`.
    pub fn handshake(
        &self,
        request: &HandshakeRequest,
        device_uid: Option<Uuid>,
    ) -> SsoResult<HandshakeResponse> {
        request.validate()?;
        let device_uid = device_uid.unwrap_or_else(Uuid::new_v4);

        let context = RequestContext::post(self.config.url(&endpoints::handshake(&self.config.client_id)))
            .bearer(self.service_token()?)
            .form(request.to_form(device_uid));
        self.dispatcher.execute(context)
    }

    /// Asks the provider to send an OTP to `phone_number`.
    ///
    /// Returns the signature header used, so the follow-up verification can
    /// reuse it through [`PodClient::verify_otp_with`].
    pub fn send_otp(
        &self,
        request: &OtpRequest,
        key_id: &str,
        phone_number: &str,
    ) -> SsoResult<(OtpResponse, SignatureHeader)> {
        let header = self.signed_header(key_id)?;
        let context = RequestContext::post(self.config.url(&endpoints::otp_authorize(phone_number)))
            .form(request.to_form())
            .signed(&self.config.host(), &header);

        let response = self.dispatcher.execute(context)?;
        info!(key_id, "otp requested");
        Ok((response, header))
    }

    /// Verifies an OTP, signing with the configured key material.
    pub fn verify_otp(&self, request: &VerifyOtpRequest, key_id: &str) -> SsoResult<OtpVerifyResponse> {
        request.validate()?;
        let header = self.signed_header(key_id)?;
        self.verify_otp_with(request, &header)
    }

    /// Verifies an OTP with the signature header returned by [`PodClient::send_otp`].
    pub fn verify_otp_with(
        &self,
        request: &VerifyOtpRequest,
        header: &SignatureHeader,
    ) -> SsoResult<OtpVerifyResponse> {
        request.validate()?;
        let context = RequestContext::post(self.config.url(&endpoints::otp_verify(&request.phone_number)))
            .form(request.to_form())
            .signed(&self.config.host(), header);
        self.dispatcher.execute(context)
    }

    /// Exchanges an authorization code for tokens.
    pub fn access_token(&self, request: &TokenRequest) -> SsoResult<TokenResponse> {
        self.token_grant(request)
    }

    pub fn refresh_token(&self, request: &TokenRequest) -> SsoResult<TokenResponse> {
        self.token_grant(request)
    }

    fn token_grant(&self, request: &TokenRequest) -> SsoResult<TokenResponse> {
        request.validate()?;
        let context = RequestContext::post(self.config.url(endpoints::TOKEN))
            .header("host", self.config.host())
            .basic(&self.config.client_id, &self.config.client_secret)
            .form(request.to_form());
        self.dispatcher.execute(context)
    }

    /// Revokes an access or refresh token. Requires elevated client access.
    pub fn revoke_token(&self, request: &RevokeTokenRequest) -> SsoResult<RawResponse> {
        request.validate()?;
        let context = RequestContext::post(self.config.url(endpoints::TOKEN_REVOKE))
            .basic(&self.config.client_id, &self.config.client_secret)
            .form(request.to_form());
        self.dispatcher.execute(context)
    }

    pub fn token_info(&self, request: &TokenInfoRequest) -> SsoResult<TokenInfoResponse> {
        request.validate()?;
        let context = RequestContext::post(self.config.url(endpoints::TOKEN_INFO))
            .basic(&self.config.client_id, &self.config.client_secret)
            .form(request.to_form());
        self.dispatcher.execute(context)
    }

    pub fn user_info(&self, access_token: &str) -> SsoResult<UserInfo> {
        let context = RequestContext::get(self.config.url(endpoints::USERS)).bearer(access_token);
        self.dispatcher.execute(context)
    }

    pub fn change_user_info(
        &self,
        request: &ChangeUserInfoRequest,
        access_token: &str,
    ) -> SsoResult<RawResponse> {
        let context = RequestContext::post(self.config.url(endpoints::USERS))
            .bearer(access_token)
            .form(request.to_form());
        self.dispatcher.execute(context)
    }

    /// Looks up several users at once. The body is left untyped until its
    /// schema is confirmed against the provider.
    pub fn list_users(&self, request: &UserListRequest) -> SsoResult<RawResponse> {
        request.validate()?;
        let context = RequestContext::get(self.config.url(endpoints::USERS_LIST))
            .query(request.to_query())
            .basic(&self.config.client_id, &self.config.client_secret);
        self.dispatcher.execute(context)
    }

    /// Asks the provider to issue an RSA key for the user, used by the
    /// auto-login code flow.
    pub fn private_key_handshake(&self, access_token: &str) -> SsoResult<RawResponse> {
        let context = RequestContext::post(self.config.url(endpoints::USER_KEY_HANDSHAKE))
            .bearer(access_token)
            .form(vec![("keyAlgorithm".into(), "RSA".into())]);
        self.dispatcher.execute(context)
    }

    /// Generates an auto-login code, signing the current timestamp with the
    /// user's own key.
    pub fn auto_login_code(&self, request: &AutoLoginCodeRequest) -> SsoResult<RawResponse> {
        request.validate()?;
        let service_token = self.service_token()?;

        let timestamp = chrono::Utc::now().timestamp_millis();
        let payload = CanonicalPayload::auto_login(&request.access_token, &request.key_id, timestamp);
        let signature = sign_with_key_xml(&request.private_key, &payload)?;

        let context = RequestContext::post(self.config.url(endpoints::AUTO_LOGIN_CODE))
            .bearer(service_token)
            .form(request.to_form(timestamp, &signature));
        self.dispatcher.execute(context)
    }
}
