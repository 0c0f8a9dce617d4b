//! reqwest-backed [`Transport`].

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use tracing::{debug, trace, warn};

use mecha_core::error::TransportError;
use mecha_core::{Body, Error, Method, PreparedRequest, RawResponse, Result, Transport};

const USER_AGENT: &str = concat!("mecha/", env!("CARGO_PKG_VERSION"));

/// Sends requests with a shared [`reqwest::Client`].
///
/// No timeout is configured on the client itself; the dispatcher bounds
/// each attempt.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(classify_error)?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one with custom proxy or TLS settings.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Map a reqwest failure onto the transport error taxonomy.
pub(crate) fn classify_error(err: reqwest::Error) -> TransportError {
    let message = error_chain(&err);
    if err.is_connect() {
        TransportError::Connection { message }
    } else {
        TransportError::Http { message }
    }
}

// reqwest's own Display hides the cause (refused, dns, tls)
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

const SECRET_FIELDS: &[&str] = &["password", "accessToken", "refreshToken"];

// Credentials travel in login and refresh bodies; keep them out of traces.
fn redacted(body: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(mut fields)) => {
            for key in SECRET_FIELDS {
                if let Some(value) = fields.get_mut(*key) {
                    *value = serde_json::Value::from("[REDACTED]");
                }
            }
            serde_json::Value::Object(fields).to_string()
        }
        Ok(other) => other.to_string(),
        Err(_) => format!("<{} bytes>", body.len()),
    }
}

/// Send one attempt, giving up after `timeout`.
///
/// On timeout the in-flight future is dropped, which cancels the request.
pub(crate) async fn send_bounded(
    transport: &dyn Transport,
    request: PreparedRequest,
    timeout: Duration,
) -> Result<RawResponse> {
    let method = request.method;
    let url = request.url.clone();
    debug!(%method, %url, "sending request");
    if let Some(body) = request.json_body() {
        trace!(body = %redacted(body), "request body");
    }

    match tokio::time::timeout(timeout, transport.send(request)).await {
        Ok(Ok(response)) => {
            debug!(%method, %url, status = response.status, "received response");
            Ok(response)
        }
        Ok(Err(e)) => {
            warn!(%method, %url, error = %e, "request failed");
            Err(e.into())
        }
        Err(_) => {
            let duration_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            warn!(%method, %url, duration_ms, "request timed out");
            Err(Error::Timeout { duration_ms })
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: PreparedRequest) -> std::result::Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), request.url.clone());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            Some(Body::Json(bytes)) => builder.body(bytes),
            Some(Body::Multipart(file)) => {
                let mut part = Part::bytes(file.bytes).file_name(file.file_name);
                if let Some(mime) = file.content_type {
                    part = part.mime_str(&mime).map_err(classify_error)?;
                }
                builder.multipart(Form::new().part(file.field_name, part))
            }
            None => builder,
        };

        let response = builder.send().await.map_err(classify_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(classify_error)?.to_vec();

        trace!(status, bytes = body.len(), "read response body");
        Ok(RawResponse::new(status, content_type, body))
    }
}
