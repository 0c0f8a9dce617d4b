//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use mecha_core::Credentials;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(args: LoginArgs, global: &GlobalArgs) -> Result<()> {
    let client = session::open_client(global)?;
    let credentials = Credentials::new(&args.email, &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    let response = client
        .auth()
        .login(&credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("Name", &response.user.full_name);
    output::field("Email", &response.user.email);
    output::field("API", client.config().api_url.as_str());

    Ok(())
}
