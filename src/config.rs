use anyhow::{Context, bail};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// Without it the service keeps everything in memory
    pub database_url: Option<String>,
    pub api_prefix: String,

    // Rate limiting
    pub rate_api_per_min: u32,

    pub worker_cache_ttl_secs: u64,
    pub run_migrations: bool,
    pub log_dir: String,
}

fn var_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        _ => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        let config = Self {
            server_addr: env::var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            rate_api_per_min: var_or("RATE_API_PER_MIN", 1000)?,
            worker_cache_ttl_secs: var_or("WORKER_CACHE_TTL_SECS", 300)?, // 5 min
            run_migrations: var_or("RUN_MIGRATIONS", false)?,
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        };

        if config.rate_api_per_min == 0 {
            bail!("RATE_API_PER_MIN must be greater than zero");
        }
        if !config.api_prefix.starts_with('/') {
            bail!("API_PREFIX must start with '/'");
        }
        Ok(config)
    }

    pub fn worker_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.worker_cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_values_use_defaults() {
        assert_eq!(var_or("WORKER_LEDGER_TEST_UNSET", 42u32).unwrap(), 42);
    }

    #[test]
    fn unparsable_value_is_an_error() {
        // SAFETY: this key is only touched by this test.
        unsafe { env::set_var("WORKER_LEDGER_TEST_BAD", "lots") };
        assert!(var_or("WORKER_LEDGER_TEST_BAD", 1u32).is_err());
        unsafe { env::remove_var("WORKER_LEDGER_TEST_BAD") };
    }
}
