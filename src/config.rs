//!
//! filehost configuration
//! -----------------------
//! Resolves the server settings from CLI flags, then environment variables, then
//! defaults. A value that is present but does not parse falls through to the next
//! source.

use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 100;

pub const USAGE: &str = "filehost server\n\nUSAGE:\n  filehost_server [--host ADDR] [--port N] [--upload-dir PATH] [--max-upload-mb N]\n\nOPTIONS:\n  --host ADDR          Bind address (env: FILEHOST_HOST, default 0.0.0.0)\n  --port N             HTTP port (env: PORT or FILEHOST_PORT, default 3000)\n  --upload-dir PATH    Directory holding uploaded files (env: FILEHOST_UPLOAD_DIR, default uploads)\n  --max-upload-mb N    Upload body limit in MiB (env: FILEHOST_MAX_UPLOAD_MB, default 100)\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Resolve from the process arguments and environment.
    pub fn from_env_and_args(args: &[String]) -> Self {
        Self::resolve(args, |name| std::env::var(name).ok())
    }

    /// Resolve with an injectable environment lookup.
    pub fn resolve<F>(args: &[String], env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = arg_value(args, "--host")
            .or_else(|| env("FILEHOST_HOST"))
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.host);

        let port = arg_value(args, "--port")
            .and_then(|v| v.parse::<u16>().ok())
            .or_else(|| env("PORT").and_then(|v| v.parse::<u16>().ok()))
            .or_else(|| env("FILEHOST_PORT").and_then(|v| v.parse::<u16>().ok()))
            .unwrap_or(defaults.port);

        let upload_dir = arg_value(args, "--upload-dir")
            .or_else(|| env("FILEHOST_UPLOAD_DIR"))
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.upload_dir);

        let max_upload_bytes = arg_value(args, "--max-upload-mb")
            .and_then(|v| parse_mb(&v))
            .or_else(|| env("FILEHOST_MAX_UPLOAD_MB").and_then(|v| parse_mb(&v)))
            .unwrap_or(defaults.max_upload_bytes);

        Self { host, port, upload_dir, max_upload_bytes }
    }

    pub fn bind_addr(&self) -> String { format!("{}:{}", self.host, self.port) }
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}

fn parse_mb(v: &str) -> Option<usize> {
    let mb = v.trim().parse::<usize>().ok()?;
    if mb == 0 { return None; }
    mb.checked_mul(1024 * 1024)
}
