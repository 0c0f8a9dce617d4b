//! Subcommand implementations.

mod login;
mod logout;
mod refresh_token;
mod register;
mod request;
mod upload;
mod whoami;

use anyhow::Result;
use clap::Subcommand;

use crate::cli::GlobalArgs;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in with email and password
    Login(login::LoginArgs),

    /// Create an account and sign in to it
    Register(register::RegisterArgs),

    /// Display the signed-in user
    Whoami(whoami::WhoamiArgs),

    /// Refresh the session tokens
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Sign out and forget the stored session
    Logout(logout::LogoutArgs),

    /// Send a request to an arbitrary endpoint
    Request(request::RequestArgs),

    /// Upload a file as multipart form data
    Upload(upload::UploadArgs),
}

pub async fn handle(cmd: Command, global: &GlobalArgs) -> Result<()> {
    match cmd {
        Command::Login(args) => login::run(args, global).await,
        Command::Register(args) => register::run(args, global).await,
        Command::Whoami(args) => whoami::run(args, global).await,
        Command::RefreshToken(args) => refresh_token::run(args, global).await,
        Command::Logout(args) => logout::run(args, global).await,
        Command::Request(args) => request::run(args, global).await,
        Command::Upload(args) => upload::run(args, global).await,
    }
}
