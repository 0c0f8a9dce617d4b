//! Upload command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::Value;

use mecha_core::FilePart;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Endpoint path (e.g. /api/files/upload)
    pub endpoint: String,

    /// File to upload
    pub file: PathBuf,

    /// Form field name
    #[arg(long, default_value = "file")]
    pub field: String,

    /// MIME type of the file
    #[arg(long)]
    pub content_type: Option<String>,
}

pub async fn run(args: UploadArgs, global: &GlobalArgs) -> Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .context("Upload path has no file name")?;

    let mut part = FilePart::new(file_name, bytes).field_name(&args.field);
    if let Some(mime) = &args.content_type {
        part = part.content_type(mime);
    }

    let client = session::open_client(global)?;

    eprintln!("{}", "Uploading...".dimmed());

    let response: Value = client
        .upload(&args.endpoint, part)
        .await
        .context("Failed to upload file")?;

    output::success("Upload complete");
    output::json_pretty(&response)
}
