//! Single-flight token refresh.
//!
//! However many requests see a 401 while a refresh is underway, only one
//! refresh call goes out. Every caller registers a waiter; the first one
//! also spawns the refresh cycle. When the cycle ends the `refreshing` flag
//! is cleared and the waiter list drained in one critical section, then
//! each waiter receives the same outcome in arrival order.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use mecha_core::{AccessToken, AuthError, CredentialPair, RefreshToken, Result, Transport};

use crate::builder::{RequestBuilder, RequestOptions};
use crate::endpoints::{REFRESH, RefreshRequest, RefreshResponse};
use crate::response::{Fallback, classify};
use crate::terminator::SessionTerminator;
use crate::token_store::TokenStore;
use crate::transport::send_bounded;

/// What every waiter of one refresh cycle receives.
pub type RefreshOutcome = std::result::Result<AccessToken, AuthError>;

/// Exchanges a refresh token for a new credential pair.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<CredentialPair>;
}

/// Calls `POST /api/auth/refresh` without a bearer token.
pub struct HttpTokenRefresher {
    transport: Arc<dyn Transport>,
    builder: RequestBuilder,
    timeout: Duration,
}

impl HttpTokenRefresher {
    pub fn new(transport: Arc<dyn Transport>, builder: RequestBuilder, timeout: Duration) -> Self {
        Self {
            transport,
            builder,
            timeout,
        }
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<CredentialPair> {
        let options = RequestOptions::new()
            .skip_auth()
            .json(&RefreshRequest {
                refresh_token: refresh_token.as_str(),
            })?;
        let request = self
            .builder
            .prepare(mecha_core::Method::Post, REFRESH, &options, None)?;

        let response = send_bounded(self.transport.as_ref(), request, self.timeout).await?;
        let tokens: RefreshResponse = classify(response, Fallback::Status)?.decode()?;
        Ok(tokens.into())
    }
}

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Owns the refresh state for one client.
pub struct RefreshCoordinator {
    tokens: TokenStore,
    refresher: Arc<dyn TokenRefresher>,
    terminator: Arc<SessionTerminator>,
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub fn new(
        tokens: TokenStore,
        refresher: Arc<dyn TokenRefresher>,
        terminator: Arc<SessionTerminator>,
    ) -> Self {
        Self {
            tokens,
            refresher,
            terminator,
            state: Mutex::new(RefreshState::default()),
        }
    }

    /// Whether a refresh cycle is currently running.
    pub fn is_refreshing(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .refreshing
    }

    /// Get a token to retry a request that was rejected while carrying
    /// `rejected`.
    ///
    /// If the store already holds a different token, a cycle finished after
    /// the request was sent and that token is returned without refreshing.
    pub async fn renew(self: &Arc<Self>, rejected: Option<&AccessToken>) -> RefreshOutcome {
        if !self.is_refreshing()
            && let Ok(Some(current)) = self.tokens.access_token()
            && Some(&current) != rejected
        {
            debug!("access token already renewed, retrying with current token");
            return Ok(current);
        }
        self.refresh().await
    }

    /// Join the running refresh cycle, starting one if none is running.
    ///
    /// The cycle runs on its own task, so dropping this future does not
    /// cancel it.
    pub async fn refresh(self: &Arc<Self>) -> RefreshOutcome {
        let (tx, rx) = oneshot::channel();

        let leader = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.waiters.push(tx);
            !std::mem::replace(&mut state.refreshing, true)
        };

        if leader {
            let coordinator = Arc::clone(self);
            tokio::spawn(async move { coordinator.run_cycle().await });
        } else {
            debug!("refresh in flight, waiting for result");
        }

        rx.await.unwrap_or_else(|_| {
            Err(AuthError::RefreshFailed {
                reason: "refresh cycle ended without a result".to_string(),
            })
        })
    }

    #[instrument(skip_all)]
    async fn run_cycle(&self) {
        info!("refreshing access token");
        let outcome = self.attempt().await;

        if let Err(e) = &outcome {
            warn!(error = %e, "token refresh failed");
            self.terminator.terminate();
        }

        let waiters = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };

        debug!(waiters = waiters.len(), "resolving refresh waiters");
        for waiter in waiters {
            // A waiter whose request was cancelled has dropped its receiver
            let _ = waiter.send(outcome.clone());
        }
    }

    async fn attempt(&self) -> RefreshOutcome {
        let refresh_token = self
            .tokens
            .refresh_token()
            .map_err(|e| AuthError::RefreshFailed {
                reason: e.to_string(),
            })?
            .ok_or(AuthError::MissingRefreshToken)?;

        let pair = self
            .refresher
            .refresh(&refresh_token)
            .await
            .map_err(|e| AuthError::RefreshFailed {
                reason: e.message(),
            })?;

        self.tokens
            .set(&pair)
            .map_err(|e| AuthError::RefreshFailed {
                reason: e.to_string(),
            })?;

        info!("access token refreshed");
        Ok(pair.access_token().clone())
    }
}

impl fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .finish_non_exhaustive()
    }
}
