//! Login, registration and the session lifecycle.

use tracing::{info, instrument, warn};

use mecha_core::{CredentialPair, Credentials, Method, Result};

use crate::builder::RequestOptions;
use crate::client::ApiClient;
use crate::endpoints::{
    AuthResponse, CURRENT_USER, LOGIN, LOGOUT, LoginRequest, REGISTER, RegisterRequest, User,
};

/// Auth operations bound to an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a session.
    #[instrument(skip_all, fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        let body = LoginRequest {
            email: credentials.email(),
            password: credentials.password(),
        };
        let response: AuthResponse = self
            .client
            .post(LOGIN, &body, RequestOptions::new().skip_auth())
            .await?;

        self.establish(&response.credentials())?;
        info!(user_id = response.user.id, "logged in");
        Ok(response)
    }

    /// Create an account and sign in to it.
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let response: AuthResponse = self
            .client
            .post(REGISTER, request, RequestOptions::new().skip_auth())
            .await?;

        self.establish(&response.credentials())?;
        info!(user_id = response.user.id, "registered");
        Ok(response)
    }

    /// Fetch the signed-in user's profile.
    pub async fn current_user(&self) -> Result<User> {
        self.client.get(CURRENT_USER, RequestOptions::new()).await
    }

    /// Tell the backend the session is over, then forget the tokens.
    ///
    /// The backend call is best effort and never refreshes; the local
    /// tokens are cleared even when it fails. No redirect happens.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<()> {
        if let Err(e) = self
            .client
            .send(Method::Post, LOGOUT, RequestOptions::new().no_refresh())
            .await
        {
            warn!(error = %e, "logout request failed, clearing local session anyway");
        }

        self.client.tokens().clear()?;
        info!("logged out");
        Ok(())
    }

    /// Store tokens obtained out of band, such as from the OAuth2 callback.
    #[instrument(skip_all)]
    pub fn adopt_tokens(
        &self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Result<()> {
        self.establish(&CredentialPair::new(access_token, refresh_token))?;
        info!("adopted external session tokens");
        Ok(())
    }

    /// True if an access token is stored. It may be expired.
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.client.tokens().access_token()?.is_some())
    }

    fn establish(&self, pair: &CredentialPair) -> Result<()> {
        self.client.tokens().set(pair)?;
        self.client.terminator().rearm();
        Ok(())
    }
}
