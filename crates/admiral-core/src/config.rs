//! Environment-driven configuration.
//!
//! All knobs arrive through process environment variables and are
//! resolved once at startup into an immutable [`AppConfig`] handed to
//! the subsystems that need them.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is required")]
    Missing { name: &'static str },

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// The SQL store provider behind the repository layer.
///
/// Only the capability flags matter to this core; the provider itself
/// is reached through the repository traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseProvider {
    Postgresql,
    Mysql,
    Sqlserver,
    Oracle,
}

impl DatabaseProvider {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "postgresql" => Some(Self::Postgresql),
            "mysql" => Some(Self::Mysql),
            "sqlserver" => Some(Self::Sqlserver),
            "oracle" => Some(Self::Oracle),
            _ => None,
        }
    }

    /// Whether the provider can filter with native case-insensitive
    /// matching. Providers without it degrade to case-sensitive
    /// `contains` filters.
    pub fn supports_case_insensitive_filtering(self) -> bool {
        matches!(self, Self::Postgresql | Self::Sqlserver)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_provider: DatabaseProvider,
    /// Shared cache address; `None` selects the in-memory adapter.
    pub redis_url: Option<String>,
    /// Refuse to start in production without a shared cache.
    pub require_distributed_cache: bool,
    /// 256-bit key for AES-256-GCM secret encryption.
    pub encryption_key: [u8; 32],
    pub http_base_url: Option<String>,
    pub http_timeout: Duration,
    pub production: bool,
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration from an arbitrary variable source.
    /// Used by tests to avoid touching process-global state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let provider_raw = non_blank(lookup("DATABASE_PROVIDER"))
            .ok_or(ConfigError::Missing {
                name: "DATABASE_PROVIDER",
            })?;
        let database_provider =
            DatabaseProvider::parse(&provider_raw).ok_or_else(|| ConfigError::Invalid {
                name: "DATABASE_PROVIDER",
                reason: format!(
                    "must be one of postgresql, mysql, sqlserver, oracle (got {provider_raw})"
                ),
            })?;

        let encryption_key = decode_encryption_key(&non_blank(lookup("ENCRYPTION_KEY")).ok_or(
            ConfigError::Missing {
                name: "ENCRYPTION_KEY",
            },
        )?)?;

        let http_timeout = match non_blank(lookup("HTTP_TIMEOUT_MS")) {
            Some(raw) => {
                let ms: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    name: "HTTP_TIMEOUT_MS",
                    reason: format!("must be a positive integer (got {raw})"),
                })?;
                if ms == 0 {
                    return Err(ConfigError::Invalid {
                        name: "HTTP_TIMEOUT_MS",
                        reason: "must be positive".into(),
                    });
                }
                Duration::from_millis(ms)
            }
            None => Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
        };

        Ok(Self {
            database_provider,
            redis_url: non_blank(lookup("REDIS_URL")),
            require_distributed_cache: parse_flag(lookup("REQUIRE_DISTRIBUTED_CACHE").as_deref()),
            encryption_key,
            http_base_url: non_blank(lookup("HTTP_BASE_URL")),
            http_timeout,
            production: lookup("APP_ENV").as_deref() == Some("production"),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Unset, "false", "0", and "off" are false; any other value is true.
fn parse_flag(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "" | "false" | "0" | "off"),
    }
}

fn decode_encryption_key(encoded: &str) -> Result<[u8; 32], ConfigError> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| ConfigError::Invalid {
            name: "ENCRYPTION_KEY",
            reason: format!("base64 decode: {e}"),
        })?;
    bytes.try_into().map_err(|_| ConfigError::Invalid {
        name: "ENCRYPTION_KEY",
        reason: "must decode to 32 bytes for AES-256-GCM".into(),
    })
}
