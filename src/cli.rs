//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Send one HTTP request and save the response body to disk.
///
/// The output is treated as a directory when it already exists as one; the
/// file is then named from the Content-Disposition header or the URL path.
#[derive(Parser, Debug)]
#[command(name = "retrieve")]
#[command(author, version, about)]
pub struct Args {
    /// URL to request
    pub url: String,

    /// HTTP method (GET, POST, PUT or PATCH)
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Request header as "Name: value" (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Query parameter as "key=value" (repeatable)
    #[arg(short = 'Q', long = "query", value_parser = parse_query_pair)]
    pub query: Vec<(String, String)>,

    /// Raw request body
    #[arg(short = 'd', long, conflicts_with = "json")]
    pub data: Option<String>,

    /// JSON request body; sets Content-Type to application/json
    #[arg(long)]
    pub json: Option<String>,

    /// Output file or existing directory
    #[arg(short, long, default_value = "./")]
    pub output: PathBuf,

    /// Request timeout in seconds (1-3600)
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: u64,

    /// Save the response body even for 4xx/5xx status codes
    #[arg(long)]
    pub ignore_status: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected \"Name: value\", got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in {raw:?}"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn parse_query_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected \"key=value\", got {raw:?}"))?;
    if key.is_empty() {
        return Err(format!("query key is empty in {raw:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}
