//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_DATABASE_URL: &str = "sqlite://.statx-ajax.db?mode=rwc";
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 5000;
    pub const DEV_DB_CONNECT_TIMEOUT_SECS: u64 = 10;
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Embedded database settings.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// SQLite connection URL (`sqlite://path?mode=rwc` or `sqlite::memory:`)
    pub url: String,
    /// Seconds to wait when opening the database
    pub connect_timeout_secs: u64,
}

impl DatabaseSettings {
    /// Settings for a database at `url` with default timeouts.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout_secs: defaults::DEV_DB_CONNECT_TIMEOUT_SECS,
        }
    }

    /// Whether the database lives only in memory.
    pub fn is_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    /// Filesystem path of the database file, if it has one.
    pub fn file_path(&self) -> Option<PathBuf> {
        if self.is_memory() {
            return None;
        }
        let rest = self.url.strip_prefix("sqlite:")?;
        let rest = rest.strip_prefix("//").unwrap_or(rest);
        let path = rest.split('?').next().unwrap_or(rest);
        if path.is_empty() {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database settings
    pub database: DatabaseSettings,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In development mode (RUST_ENV=development):
    /// - All variables have sensible defaults
    /// - Only RUST_ENV is required
    ///
    /// In production mode (RUST_ENV=production):
    /// - STATX_DATABASE_URL is required
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `STATX_HOST`: Server host (default: 127.0.0.1)
    /// - `STATX_PORT`: Server port (default: 5000)
    /// - `STATX_DATABASE_URL`: SQLite URL (default: sqlite://.statx-ajax.db?mode=rwc)
    /// - `STATX_DB_CONNECT_TIMEOUT_SECS`: Database open timeout (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Parse environment - required
        let env_str = env::var("RUST_ENV").map_err(|_| ConfigError::MissingEnvVar("RUST_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "RUST_ENV must be 'development' or 'production'",
        ))?;

        let host = env::var("STATX_HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());

        let port = env::var("STATX_PORT")
            .unwrap_or_else(|_| defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("STATX_PORT must be a valid port number"))?;

        let url = env::var("STATX_DATABASE_URL")
            .unwrap_or_else(|_| defaults::DEV_DATABASE_URL.to_string());

        let connect_timeout_secs = env::var("STATX_DB_CONNECT_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults::DEV_DB_CONNECT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue("STATX_DB_CONNECT_TIMEOUT_SECS must be a valid number")
            })?;

        let config = Config {
            environment,
            host,
            port,
            database: DatabaseSettings {
                url,
                connect_timeout_secs,
            },
        };

        config.validate()?;

        // Validate production configuration
        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate settings that apply to every environment.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.database.url.starts_with("sqlite:") {
            return Err(ConfigError::InvalidValue(
                "STATX_DATABASE_URL must be a sqlite: URL",
            ));
        }
        Ok(())
    }

    /// Validate that production configuration does not use development defaults.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.database.url == defaults::DEV_DATABASE_URL {
            errors.push(format!(
                "STATX_DATABASE_URL is using development default '{}'. Set a production database path.",
                defaults::DEV_DATABASE_URL
            ));
        }

        if self.database.is_memory() {
            errors.push(
                "STATX_DATABASE_URL points to an in-memory database. Results would be lost on restart."
                    .to_string(),
            );
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
