mod request;
mod response;

pub use request::{
    Algorithm, AutoLoginCodeRequest, ChangeUserInfoRequest, DeviceType, HandshakeRequest,
    OtpRequest, RevokeTokenRequest, TokenInfoRequest, TokenRequest, UserListRequest,
    VerifyOtpRequest,
};
pub use response::{
    CallerClient, ClientInfo, DeviceInfo, HandshakeResponse, OtpResponse, OtpVerifyResponse,
    RawResponse, TokenInfoResponse, TokenResponse, UserInfo,
};
