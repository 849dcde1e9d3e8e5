use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::notice::models::DrafterBackend;

/// 25 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 60 * 60;

/// Application configuration loaded from environment variables.
/// Fails at startup if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub drafting_backend: DrafterBackend,
    /// Only required when `drafting_backend` is `Llm`.
    pub anthropic_api_key: Option<String>,
    pub max_upload_bytes: usize,
    /// Sessions untouched for this long are discarded.
    pub session_idle_ttl: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let drafting_backend = parse_backend(
            &std::env::var("DRAFTING_BACKEND").unwrap_or_else(|_| "template".to_string()),
        )?;
        let anthropic_api_key = match drafting_backend {
            DrafterBackend::Llm => Some(require_env("ANTHROPIC_API_KEY")?),
            DrafterBackend::Template => std::env::var("ANTHROPIC_API_KEY").ok(),
        };

        Ok(Config {
            drafting_backend,
            anthropic_api_key,
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            session_idle_ttl: Duration::from_secs(match std::env::var("SESSION_IDLE_TTL_SECS") {
                Ok(v) => v
                    .parse::<u64>()
                    .context("SESSION_IDLE_TTL_SECS must be a number of seconds")?,
                Err(_) => DEFAULT_SESSION_IDLE_TTL_SECS,
            }),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Template drafting, no key, default limits.
    #[cfg(test)]
    pub fn local() -> Self {
        Config {
            drafting_backend: DrafterBackend::Template,
            anthropic_api_key: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session_idle_ttl: Duration::from_secs(DEFAULT_SESSION_IDLE_TTL_SECS),
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

fn parse_backend(value: &str) -> Result<DrafterBackend> {
    match value.trim().to_ascii_lowercase().as_str() {
        "template" | "" => Ok(DrafterBackend::Template),
        "llm" => Ok(DrafterBackend::Llm),
        other => bail!("DRAFTING_BACKEND must be 'template' or 'llm', got '{other}'"),
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
