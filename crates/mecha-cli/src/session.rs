//! Session persistence and client construction.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;

use mecha_core::{ApiUrl, LoginRedirect};
use mecha_file::FileStore;
use mecha_http::{ApiClient, ClientConfig};

use crate::cli::GlobalArgs;
use crate::output;

/// Tells the user how to sign in again once the session is gone.
#[derive(Debug, Default)]
pub struct CliRedirect;

impl LoginRedirect for CliRedirect {
    fn redirect_to_login(&self, entry_point: &str) {
        output::error(&format!(
            "Session expired. Run 'mecha login' to sign in again ({entry_point})."
        ));
    }
}

/// Get the session file path.
pub fn session_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "mecha").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("session.json"))
}

/// Resolve client settings: flags first, then the environment.
pub fn client_config(global: &GlobalArgs) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("Invalid client configuration")?;

    if let Some(url) = &global.api_url {
        config.api_url = ApiUrl::new(url).context("Invalid API URL")?;
    }
    if let Some(timeout_ms) = global.timeout_ms {
        if timeout_ms == 0 {
            bail!("--timeout-ms must be greater than 0");
        }
        config.timeout = Duration::from_millis(timeout_ms);
    }

    Ok(config)
}

/// Build a client backed by the on-disk session file.
pub fn open_client(global: &GlobalArgs) -> Result<ApiClient> {
    let config = client_config(global)?;
    let store = Arc::new(FileStore::new(session_path()?));
    ApiClient::new(config, store, Arc::new(CliRedirect)).context("Failed to create HTTP client")
}

/// Build a client and make sure a session is stored.
pub fn open_session(global: &GlobalArgs) -> Result<ApiClient> {
    let client = open_client(global)?;
    let signed_in = client
        .auth()
        .is_authenticated()
        .context("Failed to read session")?;
    if !signed_in {
        bail!("No active session. Run 'mecha login' first.");
    }
    Ok(client)
}
