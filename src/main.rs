//! CLI entry point for the retrieve tool.

use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Parser;
use retrieve::{Context, RequestBuilder};
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let (ctx, cancel) = Context::background().with_cancel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling request");
            cancel.cancel();
        }
    });

    let mut builder = RequestBuilder::new(args.url.as_str())
        .set_method(args.method.as_str())
        .set_headers(args.headers)
        .set_timeout(Duration::from_secs(args.timeout))
        .set_output(args.output)
        .set_context(ctx);

    if !args.query.is_empty() {
        builder = builder.set_query_params(args.query);
    }
    if let Some(data) = args.data {
        builder = builder.set_body(data);
    }
    if let Some(json) = args.json {
        let value: serde_json::Value =
            serde_json::from_str(&json).context("--json value is not valid JSON")?;
        builder = builder.set_json(&value);
    }
    if args.ignore_status {
        builder = builder.ignore_status_code();
    }

    let saved = builder
        .exec()
        .await
        .with_context(|| format!("failed to retrieve {}", args.url))?;

    info!(
        path = %saved.path.display(),
        bytes = saved.bytes_written,
        status = saved.status,
        "Download complete"
    );

    Ok(())
}
