//!
//! filehost server binary
//! ----------------------
//! Command-line entry point for starting the filehost HTTP server. Supports
//! configuration via CLI flags and environment variables.

use anyhow::Result;
use std::env;

use filehost::config::{has_flag, ServerConfig, USAGE};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{USAGE}");
        return Ok(());
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))?;
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let cfg = ServerConfig::from_env_and_args(&args);
    let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    tracing::info!(
        target: "filehost",
        "filehost starting: RUST_LOG='{}', bind={}, upload_dir='{}', max_upload_bytes={}",
        rust_log, cfg.bind_addr(), cfg.upload_dir.display(), cfg.max_upload_bytes
    );

    filehost::server::run_with_config(cfg).await
}
