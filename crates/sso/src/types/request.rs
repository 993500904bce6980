//! Request bodies sent to the provider.
//!
//! Each type maps itself to form pairs by hand: wire names are spelled out and
//! empty optional fields are left out, matching what the provider expects.

use uuid::Uuid;

use crate::error::{SsoError, SsoResult};

type Form = Vec<(String, String)>;

fn push(form: &mut Form, name: &str, value: &str) {
    if !value.is_empty() {
        form.push((name.to_string(), value.to_string()));
    }
}

fn required(value: &str) -> SsoResult<()> {
    if value.trim().is_empty() {
        return Err(SsoError::invalid_input());
    }
    Ok(())
}

/// Device category reported during the client handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    MobilePhone = 1,
    Desktop = 2,
    Tablet = 3,
    Console = 4,
    TvDevice = 5,
    MobileDevice = 6,
    Unknown = 7,
}

impl DeviceType {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Signature algorithm requested for the device key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    RsaSha256,
    RsaSha1,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::RsaSha256 => "rsa-sha256",
            Algorithm::RsaSha1 => "rsa-sha1",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeRequest {
    pub phone_number: String,
    pub device_lat: String,
    pub device_lon: String,
    pub device_os: String,
    pub device_os_version: String,
    pub device_type: Option<DeviceType>,
    pub device_name: String,
    pub device_app_name: String,
    pub device_app_version: String,
    pub device_client_ip: String,
    pub algorithm: Option<Algorithm>,
}

impl HandshakeRequest {
    pub fn validate(&self) -> SsoResult<()> {
        required(&self.device_client_ip)
    }

    pub fn to_form(&self, device_uid: Uuid) -> Form {
        let mut form = Form::new();
        push(&mut form, "phoneNumber", &self.phone_number);
        push(&mut form, "device_lat", &self.device_lat);
        push(&mut form, "device_lon", &self.device_lon);
        push(&mut form, "device_os", &self.device_os);
        push(&mut form, "device_os_version", &self.device_os_version);
        if let Some(device_type) = self.device_type {
            push(&mut form, "device_type", &device_type.code().to_string());
        }
        push(&mut form, "device_name", &self.device_name);
        push(&mut form, "device_app_name", &self.device_app_name);
        push(&mut form, "device_app_version", &self.device_app_version);
        push(&mut form, "device_client_ip", &self.device_client_ip);
        if let Some(algorithm) = self.algorithm {
            push(&mut form, "algorithm", algorithm.as_str());
        }
        push(&mut form, "device_uid", &device_uid.to_string());
        form
    }
}

/// Parameters of the OTP authorize call. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpRequest {
    pub response_type: String,
    pub identity_type: String,
    pub national_code: String,
    pub national_code_serial: String,
    pub birth_date: String,
    pub login_as_user_id: String,
    pub login_as_relative_national_code: String,
    pub login_as_username_child: String,
    pub otp_type: String,
    pub web_otp_domain: String,
    pub code_length: String,
    pub state: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub callback_uri: String,
    pub scope: String,
    pub code_challenge: String,
    pub code_challenge_method: String,
    pub referrer: String,
    pub referrer_type: String,
    pub link_delivery_type: String,
}

impl OtpRequest {
    pub fn to_form(&self) -> Form {
        let mut form = Form::new();
        push(&mut form, "response_type", &self.response_type);
        push(&mut form, "identityType", &self.identity_type);
        push(&mut form, "nationalcode", &self.national_code);
        push(&mut form, "nationalcodeSerial", &self.national_code_serial);
        push(&mut form, "birthdate", &self.birth_date);
        push(&mut form, "loginAsUserId", &self.login_as_user_id);
        push(&mut form, "loginAsRelativeNationalcode", &self.login_as_relative_national_code);
        push(&mut form, "loginAsUsernameChild", &self.login_as_username_child);
        push(&mut form, "otpType", &self.otp_type);
        push(&mut form, "webOtpDomain", &self.web_otp_domain);
        push(&mut form, "codeLength", &self.code_length);
        push(&mut form, "state", &self.state);
        push(&mut form, "client_id", &self.client_id);
        push(&mut form, "redirect_uri", &self.redirect_uri);
        push(&mut form, "callback_uri", &self.callback_uri);
        push(&mut form, "scope", &self.scope);
        push(&mut form, "code_challenge", &self.code_challenge);
        push(&mut form, "code_challenge_method", &self.code_challenge_method);
        push(&mut form, "referrer", &self.referrer);
        push(&mut form, "referrerType", &self.referrer_type);
        push(&mut form, "linkDeliveryType", &self.link_delivery_type);
        form
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyOtpRequest {
    pub otp: String,
    pub phone_number: String,
}

impl VerifyOtpRequest {
    pub fn new(otp: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            otp: otp.into(),
            phone_number: phone_number.into(),
        }
    }

    pub fn validate(&self) -> SsoResult<()> {
        required(&self.otp)?;
        required(&self.phone_number)
    }

    pub fn to_form(&self) -> Form {
        let mut form = Form::new();
        push(&mut form, "otp", &self.otp);
        push(&mut form, "phone_number", &self.phone_number);
        form
    }
}

/// Body of the token endpoint, for both the code and refresh grants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRequest {
    pub grant_type: String,
    pub code: String,
    pub redirect_uri: String,
    pub refresh_token: String,
    pub username: String,
    pub identity: String,
    pub identity_type: String,
    pub password: String,
    pub code_verifier: String,
}

impl TokenRequest {
    /// Exchanges the code returned by OTP verification.
    pub fn authorization_code(code: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            grant_type: "authorization_code".into(),
            code: code.into(),
            identity: phone_number.into(),
            identity_type: "phone_number".into(),
            ..Self::default()
        }
    }

    pub fn refresh(refresh_token: impl Into<String>) -> Self {
        Self {
            grant_type: "refresh_token".into(),
            refresh_token: refresh_token.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SsoResult<()> {
        required(&self.grant_type)
    }

    pub fn to_form(&self) -> Form {
        let mut form = Form::new();
        push(&mut form, "grant_type", &self.grant_type);
        push(&mut form, "code", &self.code);
        push(&mut form, "redirect_uri", &self.redirect_uri);
        push(&mut form, "refresh_token", &self.refresh_token);
        push(&mut form, "username", &self.username);
        push(&mut form, "identity", &self.identity);
        push(&mut form, "identityType", &self.identity_type);
        push(&mut form, "password", &self.password);
        push(&mut form, "code_verifier", &self.code_verifier);
        form
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevokeTokenRequest {
    pub token: String,
    /// `access_token` or `refresh_token`.
    pub token_type_hint: String,
    pub code_verifier: String,
}

impl RevokeTokenRequest {
    pub fn access_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            token_type_hint: "access_token".into(),
            ..Self::default()
        }
    }

    pub fn refresh_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            token_type_hint: "refresh_token".into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SsoResult<()> {
        required(&self.token)
    }

    pub fn to_form(&self) -> Form {
        let mut form = Form::new();
        push(&mut form, "token", &self.token);
        push(&mut form, "token_type_hint", &self.token_type_hint);
        push(&mut form, "code_verifier", &self.code_verifier);
        form
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenInfoRequest {
    pub access_token: String,
}

impl TokenInfoRequest {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn validate(&self) -> SsoResult<()> {
        required(&self.access_token)
    }

    pub fn to_form(&self) -> Form {
        vec![
            ("token".into(), self.access_token.clone()),
            ("token_type_hint".into(), "access_token".into()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeUserInfoRequest {
    pub national_code: String,
    pub birth_date: String,
}

impl ChangeUserInfoRequest {
    pub fn to_form(&self) -> Form {
        let mut form = Form::new();
        push(&mut form, "nationalcode", &self.national_code);
        push(&mut form, "birthdate", &self.birth_date);
        form
    }
}

/// Parallel lists: `identity[i]` is interpreted according to `identity_type[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListRequest {
    pub identity: Vec<String>,
    pub identity_type: Vec<String>,
}

impl UserListRequest {
    pub fn validate(&self) -> SsoResult<()> {
        if self.identity.is_empty() || self.identity.len() != self.identity_type.len() {
            return Err(SsoError::invalid_input());
        }
        Ok(())
    }

    pub fn to_query(&self) -> Form {
        self.identity_type
            .iter()
            .zip(&self.identity)
            .flat_map(|(kind, identity)| {
                [
                    ("identityType".to_string(), kind.clone()),
                    ("identity".to_string(), identity.clone()),
                ]
            })
            .collect()
    }
}

/// Input of the auto-login code flow. `private_key` is the user's XML key
/// obtained through the private key handshake.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AutoLoginCodeRequest {
    pub access_token: String,
    pub key_id: String,
    pub private_key: String,
}

impl AutoLoginCodeRequest {
    pub fn validate(&self) -> SsoResult<()> {
        required(&self.access_token)?;
        required(&self.key_id)?;
        required(&self.private_key)
    }

    /// Fields submitted alongside the signature; the provider rebuilds the
    /// signed payload from them.
    pub fn to_form(&self, timestamp_millis: i64, signature: &str) -> Form {
        vec![
            ("keyId".into(), self.key_id.clone()),
            ("timestamp".into(), timestamp_millis.to_string()),
            ("signature".into(), signature.to_string()),
            ("access_token".into(), self.access_token.clone()),
        ]
    }
}

impl std::fmt::Debug for AutoLoginCodeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoLoginCodeRequest")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}
