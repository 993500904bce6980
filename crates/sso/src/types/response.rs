//! Response bodies returned by the provider.
//!
//! Every field defaults when absent: the provider omits fields freely and an
//! error status is classified before these shapes are ever built.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientInfo {
    #[serde(rename = "accessTokenExpiryTime")]
    pub access_token_expiry_time: i64,
    pub active: bool,
    #[serde(rename = "allowedGrantTypes")]
    pub allowed_grant_types: Vec<String>,
    #[serde(rename = "allowedRedirectUris")]
    pub allowed_redirect_uris: Vec<String>,
    #[serde(rename = "allowedScopes")]
    pub allowed_scopes: Vec<String>,
    #[serde(rename = "autoLoginAs")]
    pub auto_login_as: bool,
    #[serde(rename = "captchaEnabled")]
    pub captcha_enabled: bool,
    pub client_id: String,
    #[serde(rename = "cssEnabled")]
    pub css_enabled: bool,
    pub id: i64,
    #[serde(rename = "limitedLoginAs")]
    pub limited_login_as: bool,
    #[serde(rename = "loginAsDepositEnabled")]
    pub login_as_deposit_enabled: bool,
    #[serde(rename = "loginUrl")]
    pub login_url: String,
    pub name: String,
    #[serde(rename = "otpCodeExpiryTime")]
    pub otp_code_expiry_time: i64,
    #[serde(rename = "pkceEnabled")]
    pub pkce_enabled: bool,
    #[serde(rename = "refreshTokenExpiryTime")]
    pub refresh_token_expiry_time: i64,
    pub roles: Vec<String>,
    #[serde(rename = "signupEnabled")]
    pub signup_enabled: bool,
    #[serde(rename = "twoFAEnabled")]
    pub two_fa_enabled: bool,
    pub url: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub current: bool,
    pub id: i64,
    pub ip: String,
    pub language: String,
    #[serde(rename = "lastAccessTime")]
    pub last_access_time: i64,
    pub location: Map<String, Value>,
    pub uid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandshakeResponse {
    pub algorithm: String,
    pub client: ClientInfo,
    pub device: DeviceInfo,
    pub expires_in: i64,
    #[serde(rename = "keyFormat")]
    pub key_format: String,
    #[serde(rename = "keyId")]
    pub key_id: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtpResponse {
    #[serde(rename = "codeLength")]
    pub code_length: i64,
    pub expires_in: i64,
    pub identity: String,
    pub sent_before: bool,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtpVerifyResponse {
    pub code: String,
    pub device_uid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    pub access_token: String,
    pub device_uid: String,
    pub expires_in: i64,
    pub id_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallerClient {
    pub email_verified: bool,
    pub family_name: String,
    pub given_name: String,
    #[serde(rename = "hasPassword")]
    pub has_password: bool,
    pub id: i64,
    pub nationalcode_serial_verified: bool,
    pub nationalcode_verified: bool,
    pub phone_number_verified: bool,
    pub physical_verified: bool,
    pub preferred_username: String,
}

/// Result of token introspection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenInfoResponse {
    pub active: bool,
    pub client_id: String,
    pub device_uid: String,
    pub exp: i64,
    pub is_api_token: bool,
    pub issuer_client: i64,
    #[serde(rename = "loginAsDepositEnabled")]
    pub login_as_deposit_enabled: bool,
    pub login_type: String,
    pub scope: String,
    pub shamsi_exp_date: String,
    pub sub: String,
    #[serde(rename = "callerClient")]
    pub caller_client: CallerClient,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    pub email_verified: bool,
    pub family_name: String,
    pub given_name: String,
    #[serde(rename = "hasNotinouProfile")]
    pub has_notinou_profile: bool,
    #[serde(rename = "hasPassword")]
    pub has_password: bool,
    pub id: i64,
    #[serde(rename = "legalNationalCode_verified")]
    pub legal_national_code_verified: bool,
    pub nationalcode_serial_verified: bool,
    pub nationalcode_verified: bool,
    pub phone_number_verified: bool,
    pub physical_verified: bool,
    pub preferred_username: String,
    #[serde(rename = "registerTime")]
    pub register_time: i64,
    #[serde(rename = "registerTimeShamsi")]
    pub register_time_shamsi: String,
    pub scope: String,
    pub sub: String,
    pub updated_at: i64,
    pub updated_at_shamsi: String,
}

/// Untyped body for endpoints whose schema is only partially known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawResponse(pub Value);

impl RawResponse {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// True for an empty body as well as an empty object or array.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }
}
