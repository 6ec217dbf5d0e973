use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Number of feeds refreshed per tick when not configured
pub const DEFAULT_CONCURRENCY: usize = 10;
/// Time between ticks when not configured
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Deployment environment, selected by `APP_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    /// `prod` or `production` in any case; anything else, including unset, is dev
    pub fn from_app_env(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("prod" | "production") => Self::Prod,
            _ => Self::Dev,
        }
    }

    /// Directory holding the database when `DATA_PATH` is unset
    pub fn default_data_path(self) -> PathBuf {
        PathBuf::from(match self {
            Self::Dev => "./data",
            Self::Prod => "/data",
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: expected {expected}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub env: Environment,
    pub data_path: PathBuf,
    pub database_url: String,
    pub max_connections: u32,
    /// Maximum number of feeds refreshed in one tick
    pub concurrency: usize,
    /// Time between the start of consecutive ticks
    pub interval: Duration,
    /// Upper bound on a single feed request
    pub fetch_timeout: Duration,
}

impl Config {
    pub fn new(env: Environment, data_path: impl AsRef<Path>) -> Self {
        let data_path = data_path.as_ref().to_path_buf();
        let database_url = format!(
            "sqlite:{}?mode=rwc",
            data_path.join("aggregator.db").display()
        );
        Self {
            env,
            data_path,
            database_url,
            max_connections: 5,
            concurrency: DEFAULT_CONCURRENCY,
            interval: DEFAULT_INTERVAL,
            fetch_timeout: feed::DEFAULT_TIMEOUT,
        }
    }

    /// Build the config from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    ///
    /// Recognised keys: `APP_ENV`, `DATA_PATH`, `DATABASE_URL`,
    /// `SCRAPE_CONCURRENCY`, `SCRAPE_INTERVAL_SECS`, `FETCH_TIMEOUT_SECS`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Environment::from_app_env(lookup("APP_ENV").as_deref());
        let data_path = lookup("DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| env.default_data_path());

        let mut config = Self::new(env, data_path);

        if let Some(url) = lookup("DATABASE_URL") {
            config = config.with_database_url(url);
        }
        if let Some(value) = lookup("SCRAPE_CONCURRENCY") {
            config = config.with_concurrency(parse_positive("SCRAPE_CONCURRENCY", &value)?);
        }
        if let Some(value) = lookup("SCRAPE_INTERVAL_SECS") {
            let secs = parse_positive("SCRAPE_INTERVAL_SECS", &value)?;
            config = config.with_interval(Duration::from_secs(secs as u64));
        }
        if let Some(value) = lookup("FETCH_TIMEOUT_SECS") {
            let secs = parse_positive("FETCH_TIMEOUT_SECS", &value)?;
            config = config.with_fetch_timeout(Duration::from_secs(secs as u64));
        }

        Ok(config)
    }

    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            expected: "a positive integer",
        }),
    }
}
