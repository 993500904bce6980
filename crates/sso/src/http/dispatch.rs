use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{SsoResult, Stage, normalize};

use super::request::{Body, RequestContext};

/// The only status the provider uses for success.
const SUCCESS: u16 = 200;

/// Blocking HTTP executor. Sends a request once, never retries, and returns
/// either the decoded body or a normalized error.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: Client,
}

impl Dispatcher {
    pub fn new(timeout: Option<Duration>) -> SsoResult<Self> {
        let mut builder = Client::builder().http1_only();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|error| {
            debug!(%error, "building HTTP client");
            normalize(Stage::Build, &[])
        })?;
        Ok(Self { client })
    }

    /// Build → Send → ReadBody → Decode → ClassifyStatus.
    ///
    /// An empty body decodes to `T::default()`.
    pub fn execute<T>(&self, request: RequestContext) -> SsoResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let (method, url, headers, body) = request.into_parts();
        debug!(%method, %url, "dispatching request");

        let mut builder = self.client.request(method, &url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Body::Form(pairs) = &body {
            builder = builder.form(pairs);
        }

        let request = builder.build().map_err(|error| {
            debug!(%error, "building request");
            normalize(Stage::Build, &[])
        })?;
        let response = self.client.execute(request).map_err(|error| {
            debug!(%error, "sending request");
            normalize(Stage::Send, &[])
        })?;

        let status = response.status().as_u16();
        let bytes = response.bytes().map_err(|error| {
            debug!(%error, "reading response body");
            normalize(Stage::ReadBody, &[])
        })?;
        debug!(status, len = bytes.len(), "response received");

        classify(status, &bytes)
    }
}

/// Turns a status and fully read body into the caller's result.
///
/// The body is parsed as JSON before the status is looked at, so a non-JSON
/// body is a decode failure even on an error status, and an error status
/// always carries the parsed diagnostic fields.
pub fn classify<T>(status: u16, body: &[u8]) -> SsoResult<T>
where
    T: DeserializeOwned + Default,
{
    let value = if body.is_empty() {
        None
    } else {
        Some(serde_json::from_slice::<Value>(body).map_err(|_| normalize(Stage::Decode, body))?)
    };

    if status != SUCCESS {
        return Err(normalize(Stage::Status(status), body));
    }

    match value {
        None => Ok(T::default()),
        Some(value) => serde_json::from_value(value).map_err(|_| normalize(Stage::Decode, body)),
    }
}
