//! Turning an endpoint and options into a [`PreparedRequest`].

use serde::Serialize;
use serde_json::Value;

use mecha_core::error::InvalidInputError;
use mecha_core::{
    AccessToken, ApiUrl, Body, FilePart, Method, PreparedRequest, QueryParams, QueryValue, Result,
};

const AUTHORIZATION: &str = "Authorization";

/// Per-call options for a dispatched request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: QueryParams,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    /// Send without a bearer token and never refresh on 401.
    pub skip_auth: bool,
    /// Send the bearer token but hand a 401 back instead of refreshing.
    pub no_refresh: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.push(key, value);
        self
    }

    pub fn params(mut self, params: QueryParams) -> Self {
        self.query = params;
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| InvalidInputError::Body {
            reason: e.to_string(),
        })?;
        Ok(self.body(value))
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    pub fn no_refresh(mut self) -> Self {
        self.no_refresh = true;
        self
    }

    /// Whether a 401 should go through the refresh coordinator.
    pub(crate) fn renews_on_401(&self) -> bool {
        !self.skip_auth && !self.no_refresh
    }
}

/// Builds requests against a fixed base origin.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    api_url: ApiUrl,
}

impl RequestBuilder {
    pub fn new(api_url: ApiUrl) -> Self {
        Self { api_url }
    }

    pub fn api_url(&self) -> &ApiUrl {
        &self.api_url
    }

    /// Build a JSON request. `token` is attached unless the options skip
    /// auth.
    pub fn prepare(
        &self,
        method: Method,
        endpoint: &str,
        options: &RequestOptions,
        token: Option<&AccessToken>,
    ) -> Result<PreparedRequest> {
        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];

        let body = match &options.body {
            Some(value) => {
                let bytes = serde_json::to_vec(value).map_err(|e| InvalidInputError::Body {
                    reason: e.to_string(),
                })?;
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                Some(Body::Json(bytes))
            }
            None => None,
        };

        Ok(self.finish(method, endpoint, options, headers, body, token))
    }

    /// Build a multipart upload. The transport sets the content type with
    /// its boundary.
    pub fn prepare_upload(
        &self,
        endpoint: &str,
        part: FilePart,
        options: &RequestOptions,
        token: Option<&AccessToken>,
    ) -> PreparedRequest {
        let headers = vec![("Accept".to_string(), "application/json".to_string())];
        self.finish(
            Method::Post,
            endpoint,
            options,
            headers,
            Some(Body::Multipart(part)),
            token,
        )
    }

    fn finish(
        &self,
        method: Method,
        endpoint: &str,
        options: &RequestOptions,
        mut headers: Vec<(String, String)>,
        body: Option<Body>,
        token: Option<&AccessToken>,
    ) -> PreparedRequest {
        for (name, value) in &options.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        let mut request = PreparedRequest {
            method,
            url: self.api_url.endpoint_url(endpoint, &options.query),
            headers,
            body,
        };

        if !options.skip_auth
            && let Some(token) = token
        {
            set_bearer(&mut request, token);
        }

        request
    }
}

/// Replace whatever bearer token `request` carries with `token`.
pub fn set_bearer(request: &mut PreparedRequest, token: &AccessToken) {
    request
        .headers
        .retain(|(name, _)| !name.eq_ignore_ascii_case(AUTHORIZATION));
    request
        .headers
        .push((AUTHORIZATION.to_string(), token.bearer()));
}
