use anyhow::{ensure, Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails fast if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub push_endpoint: String,
    pub port: u16,
    pub rust_log: String,
    /// Hours between scheduled notification sweeps. Always at least 1.
    pub sweep_interval_hours: u64,
}

const DEFAULT_PUSH_ENDPOINT: &str = "https://exp.host/--/api/v2/push/send";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            push_endpoint: std::env::var("PUSH_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_PUSH_ENDPOINT.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            sweep_interval_hours: parse_sweep_interval(
                &std::env::var("SWEEP_INTERVAL_HOURS").unwrap_or_else(|_| "24".to_string()),
            )?,
        })
    }
}

/// Log directive covering this crate's own modules. Tracing targets are
/// module paths, so the package name's hyphens must become underscores or
/// the directive matches nothing.
pub fn default_log_directive(level: &str) -> String {
    format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_"))
}

/// The sweep interval feeds `tokio::time::interval`, which panics on a zero
/// period; reject 0 here so misconfiguration surfaces at startup.
fn parse_sweep_interval(raw: &str) -> Result<u64> {
    let hours = raw
        .trim()
        .parse::<u64>()
        .context("SWEEP_INTERVAL_HOURS must be a whole number of hours")?;
    ensure!(hours > 0, "SWEEP_INTERVAL_HOURS must be at least 1");
    Ok(hours)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
