//! The request dispatcher.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use mecha_core::{
    AccessToken, AuthError, FilePart, KeyValueStore, LoginRedirect, Method, Payload,
    PreparedRequest, Result, Transport,
};

use crate::auth::AuthService;
use crate::builder::{RequestBuilder, RequestOptions, set_bearer};
use crate::config::ClientConfig;
use crate::refresh::{HttpTokenRefresher, RefreshCoordinator, RefreshOutcome};
use crate::response::{Fallback, api_error, classify};
use crate::terminator::SessionTerminator;
use crate::token_store::TokenStore;
use crate::transport::{ReqwestTransport, send_bounded};

/// Where a logical call is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    /// First send with whatever token was stored.
    Initial,
    /// Re-sent once with a renewed token.
    Retried,
}

/// Authenticated client for the mecha API.
///
/// Cheap to clone; clones share the token store, the refresh coordinator
/// and the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
    tokens: TokenStore,
    coordinator: Arc<RefreshCoordinator>,
    terminator: Arc<SessionTerminator>,
}

impl ApiClient {
    /// Create a client speaking HTTP through reqwest.
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn KeyValueStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_transport(config, transport, store, redirect))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KeyValueStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Self {
        let tokens = TokenStore::new(store);
        let builder = RequestBuilder::new(config.api_url.clone());
        let terminator = Arc::new(SessionTerminator::new(
            tokens.clone(),
            redirect,
            config.login_path.clone(),
        ));
        let refresher = Arc::new(HttpTokenRefresher::new(
            transport.clone(),
            builder.clone(),
            config.timeout,
        ));
        let coordinator = Arc::new(RefreshCoordinator::new(
            tokens.clone(),
            refresher,
            terminator.clone(),
        ));

        Self {
            inner: Arc::new(ClientInner {
                config,
                builder,
                transport,
                tokens,
                coordinator,
                terminator,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The persisted credential pair.
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    pub fn terminator(&self) -> &SessionTerminator {
        &self.inner.terminator
    }

    /// Login, registration and session helpers bound to this client.
    pub fn auth(&self) -> AuthService {
        AuthService::new(self.clone())
    }

    /// Dispatch a request and return the raw payload.
    #[instrument(skip(self, options))]
    pub async fn send(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Payload> {
        let token = self.current_token(options.skip_auth)?;
        let request = self
            .inner
            .builder
            .prepare(method, endpoint, &options, token.as_ref())?;
        self.dispatch(request, options.renews_on_401(), Fallback::Status)
            .await
    }

    /// Dispatch a request and decode the JSON response into `T`.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        self.send(method, endpoint, options).await?.decode()
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        self.send_json(Method::Get, endpoint, options).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T> {
        self.send_json(Method::Post, endpoint, options.json(body)?)
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T> {
        self.send_json(Method::Put, endpoint, options.json(body)?)
            .await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T> {
        self.send_json(Method::Patch, endpoint, options.json(body)?)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        self.send_json(Method::Delete, endpoint, options).await
    }

    /// Upload one file as a multipart form.
    #[instrument(skip(self, file), fields(file_name = %file.file_name, field_name = %file.field_name))]
    pub async fn upload<T: DeserializeOwned>(&self, endpoint: &str, file: FilePart) -> Result<T> {
        let options = RequestOptions::new();
        let token = self.current_token(false)?;
        let request = self
            .inner
            .builder
            .prepare_upload(endpoint, file, &options, token.as_ref());
        self.dispatch(request, options.renews_on_401(), Fallback::Upload)
            .await?
            .decode()
    }

    /// Force a refresh outside the 401 path, sharing any cycle in flight.
    pub async fn refresh_session(&self) -> RefreshOutcome {
        self.inner.coordinator.refresh().await
    }

    fn current_token(&self, skip_auth: bool) -> Result<Option<AccessToken>> {
        if skip_auth {
            return Ok(None);
        }
        self.inner.tokens.access_token()
    }

    async fn dispatch(
        &self,
        mut request: PreparedRequest,
        renew_on_401: bool,
        fallback: Fallback,
    ) -> Result<Payload> {
        let mut attempt = Attempt::Initial;

        loop {
            let response = send_bounded(
                self.inner.transport.as_ref(),
                request.clone(),
                self.inner.config.timeout,
            )
            .await?;

            if response.status != 401 || !renew_on_401 {
                return classify(response, fallback);
            }

            match attempt {
                Attempt::Initial => {
                    debug!("request rejected with 401, renewing session");
                    let rejected = request.bearer_token().map(AccessToken::new);
                    let token = self.inner.coordinator.renew(rejected.as_ref()).await?;
                    set_bearer(&mut request, &token);
                    attempt = Attempt::Retried;
                }
                Attempt::Retried => {
                    let message = api_error(&response, fallback).message;
                    debug!("request rejected again after refresh");
                    return Err(AuthError::RejectedAfterRefresh { message }.into());
                }
            }
        }
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_url", &self.inner.config.api_url.as_str())
            .field("timeout", &self.inner.config.timeout)
            .finish_non_exhaustive()
    }
}
