//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the full profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, global: &GlobalArgs) -> Result<()> {
    let client = session::open_session(global)?;

    let user = client
        .auth()
        .current_user()
        .await
        .context("Failed to fetch current user")?;

    if args.json {
        return output::json_pretty(&user);
    }

    output::field("ID", &user.id.to_string());
    output::field("Name", &user.full_name);
    output::field("Email", &user.email);
    output::field("Role", &format!("{:?}", user.role));
    output::field("Status", &format!("{:?}", user.status));

    Ok(())
}
