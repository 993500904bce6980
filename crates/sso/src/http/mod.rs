mod dispatch;
mod host;
mod request;

pub use dispatch::{Dispatcher, classify};
pub use host::host_from_url;
pub use request::{Body, FORM_CONTENT_TYPE, RequestContext, basic_auth};

pub use reqwest::Method;
