//! Raw request command implementation.

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use serde_json::Value;

use mecha_core::Method;
use mecha_http::RequestOptions;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::Get,
            HttpMethod::Post => Method::Post,
            HttpMethod::Put => Method::Put,
            HttpMethod::Patch => Method::Patch,
            HttpMethod::Delete => Method::Delete,
        }
    }
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method
    #[arg(value_enum)]
    pub method: HttpMethod,

    /// Endpoint path (e.g. /api/products)
    pub endpoint: String,

    /// Query parameter as KEY=VALUE (repeatable)
    #[arg(short, long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<String>,

    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// Extra header as NAME:VALUE (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// Send without the stored token
    #[arg(long)]
    pub skip_auth: bool,
}

fn build_options(args: &RequestArgs) -> Result<RequestOptions> {
    let mut options = RequestOptions::new();

    for pair in &args.query {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid query parameter '{pair}', expected KEY=VALUE");
        };
        options = options.query(key, value);
    }

    for header in &args.headers {
        let Some((name, value)) = header.split_once(':') else {
            bail!("Invalid header '{header}', expected NAME:VALUE");
        };
        options = options.header(name.trim(), value.trim());
    }

    if let Some(data) = &args.data {
        let body: Value = serde_json::from_str(data).context("Request body is not valid JSON")?;
        options = options.body(body);
    }

    if args.skip_auth {
        options = options.skip_auth();
    }

    Ok(options)
}

pub async fn run(args: RequestArgs, global: &GlobalArgs) -> Result<()> {
    let options = build_options(&args)?;
    let client = session::open_client(global)?;

    let payload = client
        .send(args.method.into(), &args.endpoint, options)
        .await
        .with_context(|| format!("{:?} {} failed", args.method, args.endpoint))?;

    output::payload(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(query: &[&str], headers: &[&str], data: Option<&str>) -> RequestArgs {
        RequestArgs {
            method: HttpMethod::Get,
            endpoint: "/api/products".to_string(),
            query: query.iter().map(|s| s.to_string()).collect(),
            data: data.map(str::to_string),
            headers: headers.iter().map(|s| s.to_string()).collect(),
            skip_auth: false,
        }
    }

    #[test]
    fn parses_query_and_headers() {
        let options = build_options(&args(&["page=1", "search="], &["X-Locale: vi"], None)).unwrap();
        assert_eq!(options.query.present().count(), 1);
        assert_eq!(options.headers, vec![("X-Locale".to_string(), "vi".to_string())]);
        assert!(options.body.is_none());
    }

    #[test]
    fn rejects_malformed_query() {
        assert!(build_options(&args(&["page"], &[], None)).is_err());
    }

    #[test]
    fn rejects_invalid_json_body() {
        assert!(build_options(&args(&[], &[], Some("{not json"))).is_err());
    }
}
