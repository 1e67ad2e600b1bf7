use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!("unknown STORE_BACKEND '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    pub jwt_secret: String,
    pub jwt_access_ttl_secs: i64,
    pub jwt_refresh_ttl_secs: i64,

    pub max_history_days: u32,

    /// Auth requests allowed per client and path in each window.
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,

    // Best-effort garden growth; None disables the worker.
    pub garden_auto_grow_secs: Option<u64>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let store_backend: StoreBackend = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".into())
            .parse()?;

        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set when STORE_BACKEND=postgres");
        }

        Ok(Self {
            store_backend,
            database_url,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("PORT", "8080")?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            cors_extra_origins: env::var("CORS_EXTRA_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_access_ttl_secs: parse_var("JWT_ACCESS_TTL_SECS", "900")?,
            jwt_refresh_ttl_secs: parse_var("JWT_REFRESH_TTL_SECS", "604800")?,

            max_history_days: parse_var("MAX_HISTORY_DAYS", "365")?,

            rate_limit_max: positive(parse_var("RATE_LIMIT_MAX", "5")?, "RATE_LIMIT_MAX")?,
            rate_limit_window_secs: positive(
                parse_var("RATE_LIMIT_WINDOW_SECS", "60")?,
                "RATE_LIMIT_WINDOW_SECS",
            )?,

            garden_auto_grow_secs: parse_auto_grow(env::var("GARDEN_AUTO_GROW_SECS").ok())?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings for tests: in-memory store, fixed secret.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            database_url: None,
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            cors_extra_origins: Vec::new(),
            jwt_secret: "test-secret-with-enough-entropy".into(),
            jwt_access_ttl_secs: 900,
            jwt_refresh_ttl_secs: 604800,
            max_history_days: 365,
            rate_limit_max: 5,
            rate_limit_window_secs: 60,
            garden_auto_grow_secs: None,
        }
    }
}

fn parse_var<T>(name: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(name)
        .unwrap_or_else(|_| default.into())
        .parse()
        .with_context(|| format!("{} must be a number", name))
}

/// Unset or blank disables auto-grow. Zero is rejected: a zero-length
/// tokio interval panics.
fn parse_auto_grow(raw: Option<String>) -> anyhow::Result<Option<u64>> {
    let Some(raw) = raw.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    let secs: u64 = raw
        .trim()
        .parse()
        .context("GARDEN_AUTO_GROW_SECS must be a number")?;
    positive(secs, "GARDEN_AUTO_GROW_SECS").map(Some)
}

fn positive<T>(value: T, name: &str) -> anyhow::Result<T>
where
    T: PartialEq + Default,
{
    if value == T::default() {
        anyhow::bail!("{} must be greater than zero", name);
    }
    Ok(value)
}
