use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use url::form_urlencoded;

use crate::signing::SignatureHeader;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    #[default]
    Empty,
    /// Encoded as `application/x-www-form-urlencoded`, pairs in order.
    Form(Vec<(String, String)>),
}

/// One outbound request: target, method, headers in insertion order and body.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: Body,
}

impl RequestContext {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }

    pub fn basic(self, client_id: &str, client_secret: &str) -> Self {
        self.header("Authorization", format!("Basic {}", basic_auth(client_id, client_secret)))
    }

    /// `Signature` authorization plus the `host` header it covers.
    pub fn signed(self, host: &str, signature: &SignatureHeader) -> Self {
        self.header("host", host)
            .header("Authorization", signature.to_string())
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = Body::Form(pairs);
        self.header("Content-Type", FORM_CONTENT_TYPE)
    }

    /// Appends pairs to the query string, percent-encoded.
    pub fn query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        if !encoded.is_empty() {
            let separator = if self.url.contains('?') { '&' } else { '?' };
            self.url.push(separator);
            self.url.push_str(&encoded);
        }
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub(crate) fn into_parts(self) -> (Method, String, Vec<(String, String)>, Body) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// `client_id:client_secret` in standard base64, as used by Basic auth.
pub fn basic_auth(client_id: &str, client_secret: &str) -> String {
    STANDARD.encode(format!("{client_id}:{client_secret}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_auth_encodes_pair() {
        assert_eq!(basic_auth("client", "secret"), "Y2xpZW50OnNlY3JldA==");
    }

    #[test]
    fn form_sets_content_type() {
        let request = RequestContext::post("https://sso.example.com/oauth2/token")
            .form(vec![("grant_type".into(), "refresh_token".into())]);
        assert_eq!(request.header_value("content-type"), Some(FORM_CONTENT_TYPE));
        assert_eq!(
            request.body(),
            &Body::Form(vec![("grant_type".into(), "refresh_token".into())])
        );
    }

    #[test]
    fn signed_request_carries_host_and_scheme() {
        let header = SignatureHeader::new("kid", "c2ln");
        let request = RequestContext::post("https://sso.example.com/x").signed("sso.example.com", &header);
        assert_eq!(request.header_value("host"), Some("sso.example.com"));
        assert_eq!(
            request.header_value("authorization"),
            Some(r#"Signature keyId="kid",signature="c2ln",headers="host""#)
        );
    }

    #[test]
    fn query_pairs_are_encoded_and_repeated() {
        let request = RequestContext::get("https://sso.example.com/users/info/list").query([
            ("identityType", "phone_number"),
            ("identity", "+98 912"),
            ("identityType", "username"),
            ("identity", "ali"),
        ]);
        assert_eq!(
            request.url(),
            "https://sso.example.com/users/info/list?identityType=phone_number&identity=%2B98+912&identityType=username&identity=ali"
        );
    }

    #[test]
    fn empty_query_leaves_url_alone() {
        let request = RequestContext::get("https://sso.example.com/users").query(Vec::<(String, String)>::new());
        assert_eq!(request.url(), "https://sso.example.com/users");
    }
}
