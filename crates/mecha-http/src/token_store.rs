//! Persisted credential pair.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use mecha_core::{AccessToken, CredentialPair, KeyValueStore, RefreshToken, Result};

/// Storage key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// The process-wide home of the current [`CredentialPair`].
///
/// Cheap to clone; every clone shares the same backing store.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// The stored pair, or `None` unless both halves are present.
    pub fn get(&self) -> Result<Option<CredentialPair>> {
        match (self.access_token()?, self.refresh_token()?) {
            (Some(access), Some(refresh)) => Ok(Some(CredentialPair::new(
                access.as_str(),
                refresh.as_str(),
            ))),
            _ => Ok(None),
        }
    }

    /// Overwrite both tokens in one write.
    pub fn set(&self, pair: &CredentialPair) -> Result<()> {
        self.backend.set_many(&[
            (ACCESS_TOKEN_KEY, pair.access_token().as_str()),
            (REFRESH_TOKEN_KEY, pair.refresh_token().as_str()),
        ])?;
        debug!("stored credential pair");
        Ok(())
    }

    /// Remove both tokens.
    pub fn clear(&self) -> Result<()> {
        self.backend
            .remove_many(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY])?;
        debug!("cleared credential pair");
        Ok(())
    }

    pub fn access_token(&self) -> Result<Option<AccessToken>> {
        Ok(self
            .backend
            .get(ACCESS_TOKEN_KEY)?
            .filter(|t| !t.is_empty())
            .map(AccessToken::new))
    }

    pub fn refresh_token(&self) -> Result<Option<RefreshToken>> {
        Ok(self
            .backend
            .get(REFRESH_TOKEN_KEY)?
            .filter(|t| !t.is_empty())
            .map(RefreshToken::new))
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}
