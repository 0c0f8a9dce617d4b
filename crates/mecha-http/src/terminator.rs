//! Session teardown.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use mecha_core::LoginRedirect;

use crate::token_store::TokenStore;

/// Ends a session that can no longer be renewed.
///
/// Only the first [`terminate`](Self::terminate) after a session was
/// established redirects; later calls just make sure the store is empty.
/// Establishing a new session calls [`rearm`](Self::rearm).
pub struct SessionTerminator {
    tokens: TokenStore,
    redirect: Arc<dyn LoginRedirect>,
    login_path: String,
    terminated: AtomicBool,
}

impl SessionTerminator {
    pub fn new(
        tokens: TokenStore,
        redirect: Arc<dyn LoginRedirect>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            tokens,
            redirect,
            login_path: login_path.into(),
            terminated: AtomicBool::new(false),
        }
    }

    /// Clear the stored credentials and send the user to the login entry
    /// point.
    pub fn terminate(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "failed to clear tokens during session teardown");
        }

        if self.terminated.swap(true, Ordering::SeqCst) {
            return;
        }

        info!(login_path = %self.login_path, "session ended, redirecting to login");
        self.redirect.redirect_to_login(&self.login_path);
    }

    /// Allow the next [`terminate`](Self::terminate) to redirect again.
    pub fn rearm(&self) {
        self.terminated.store(false, Ordering::SeqCst);
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }
}

impl fmt::Debug for SessionTerminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTerminator")
            .field("login_path", &self.login_path)
            .field("terminated", &self.is_terminated())
            .finish()
    }
}
