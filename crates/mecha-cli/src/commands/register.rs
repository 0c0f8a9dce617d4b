//! Register command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use mecha_http::RegisterRequest;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,

    /// Display name
    #[arg(long)]
    pub full_name: String,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,
}

pub async fn run(args: RegisterArgs, global: &GlobalArgs) -> Result<()> {
    let client = session::open_client(global)?;
    let request = RegisterRequest {
        email: args.email,
        password: args.password,
        full_name: args.full_name,
        phone: args.phone,
    };

    eprintln!("{}", "Creating account...".dimmed());

    let response = client
        .auth()
        .register(&request)
        .await
        .context("Failed to register")?;

    output::success("Account created");
    println!();
    output::field("ID", &response.user.id.to_string());
    output::field("Email", &response.user.email);

    Ok(())
}
