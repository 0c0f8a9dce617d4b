//! Default [`LoginRedirect`] for headless callers.

use tracing::warn;

use mecha_core::LoginRedirect;

/// Logs the hand-off instead of navigating anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRedirect;

impl LoginRedirect for TracingRedirect {
    fn redirect_to_login(&self, entry_point: &str) {
        warn!(entry_point, "session expired, sign in again");
    }
}
