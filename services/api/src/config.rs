//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use axum::http::HeaderValue;
use std::net::SocketAddr;
use tracing::Level;

/// Shortest signing secret accepted for session tokens, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// A Postgres URL, or `memory://` for the in-process store.
    pub database_url: String,
    pub log_level: Level,
    pub session_secret: Vec<u8>,
    /// Adds the `Secure` attribute to the session cookie.
    pub secure_cookies: bool,
    /// The single origin allowed to make credentialed cross-origin calls.
    pub client_origin: HeaderValue,
    pub argon2_memory_kib: Option<u32>,
    pub argon2_iterations: Option<u32>,
}

// The signing secret stays out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("database_url", &self.database_url)
            .field("log_level", &self.log_level)
            .field("session_secret", &"****")
            .field("secure_cookies", &self.secure_cookies)
            .field("client_origin", &self.client_origin)
            .field("argon2_memory_kib", &self.argon2_memory_kib)
            .field("argon2_iterations", &self.argon2_iterations)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server and Database Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:4000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Session Settings ---
        let session_secret = lookup("SESSION_SECRET")
            .ok_or_else(|| ConfigError::MissingVar("SESSION_SECRET".to_string()))?
            .into_bytes();
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::InvalidValue(
                "SESSION_SECRET".to_string(),
                format!("must be at least {} bytes long", MIN_SESSION_SECRET_LEN),
            ));
        }

        let app_env = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());
        let secure_cookies = app_env.eq_ignore_ascii_case("production");

        let client_origin_str =
            lookup("CLIENT_URL").unwrap_or_else(|| "http://localhost:5173".to_string());
        let client_origin = HeaderValue::from_str(&client_origin_str)
            .map_err(|e| ConfigError::InvalidValue("CLIENT_URL".to_string(), e.to_string()))?;

        // --- Password Hashing Cost ---
        let argon2_memory_kib = parse_optional_u32(&lookup, "ARGON2_MEMORY_KIB")?;
        let argon2_iterations = parse_optional_u32(&lookup, "ARGON2_ITERATIONS")?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            session_secret,
            secure_cookies,
            client_origin,
            argon2_memory_kib,
            argon2_iterations,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory:")
    }
}

fn parse_optional_u32<F>(lookup: &F, key: &str) -> Result<Option<u32>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u32>()
                .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
        })
        .transpose()
}
