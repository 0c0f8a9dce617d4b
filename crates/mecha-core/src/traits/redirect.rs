//! Hand-off to the environment's unauthenticated entry point.

/// Sends the user back to the login entry point once the session is gone.
///
/// A browser would navigate to the sign-in page; a CLI prints how to log in
/// again. Called at most once per session by the session terminator.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self, entry_point: &str);
}
