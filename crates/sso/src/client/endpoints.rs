//! Provider paths, relative to the configured base URL.

pub fn handshake(client_id: &str) -> String {
    format!("/oauth2/clients/handshake/{client_id}")
}

pub fn otp_authorize(phone_number: &str) -> String {
    format!("/oauth2/otp/authorize/{phone_number}")
}

pub fn otp_verify(phone_number: &str) -> String {
    format!("/oauth2/otp/verify/{phone_number}")
}

pub const TOKEN: &str = "/oauth2/token";
pub const TOKEN_INFO: &str = "/oauth2/token/info";
pub const TOKEN_REVOKE: &str = "/oauth2/token/revoke";
pub const USERS: &str = "/users";
pub const USERS_LIST: &str = "/users/info/list";
pub const USER_KEY_HANDSHAKE: &str = "/users/keys/handshake";
pub const AUTO_LOGIN_CODE: &str = "/oauth2/otp/autologin/code";
