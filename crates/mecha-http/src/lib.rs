//! mecha-http - Authenticated HTTP client for the mecha API.
//!
//! Requests carry the stored bearer token. A 401 triggers one shared token
//! refresh and a single retry; if the refresh fails the session is torn
//! down and the caller is sent back to the login entry point.

mod auth;
mod builder;
mod client;
pub mod config;
pub mod endpoints;
mod redirect;
mod refresh;
mod response;
mod terminator;
mod token_store;
mod transport;

#[cfg(test)]
mod test_support;

pub use auth::AuthService;
pub use builder::{RequestBuilder, RequestOptions};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use endpoints::{AccountStatus, AuthProvider, AuthResponse, RegisterRequest, User, UserRole};
pub use redirect::TracingRedirect;
pub use refresh::{HttpTokenRefresher, RefreshCoordinator, RefreshOutcome, TokenRefresher};
pub use terminator::SessionTerminator;
pub use token_store::TokenStore;
pub use transport::ReqwestTransport;
