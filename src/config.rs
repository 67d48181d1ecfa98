use std::env;

use thiserror::Error;

use crate::auth::{password::DEFAULT_COST, token::DEFAULT_TOKEN_TTL_HOURS};

/// Signing secret used when `JWT_SECRET` is unset or empty. Fine for local runs only.
pub const DEFAULT_JWT_SECRET: &str = "my_secret_key";

/// Upper bound for `JWT_TTL_HOURS`, about a hundred years.
pub const MAX_JWT_TTL_HOURS: i64 = 24 * 365 * 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` runs the server on in-memory stores.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let server_port = parse_or(get("SERVER_PORT"), "SERVER_PORT", 8080)?;
        let jwt_ttl_hours = parse_or(get("JWT_TTL_HOURS"), "JWT_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        if !(1..=MAX_JWT_TTL_HOURS).contains(&jwt_ttl_hours) {
            return Err(ConfigError::Invalid {
                key: "JWT_TTL_HOURS",
                value: jwt_ttl_hours.to_string(),
            });
        }
        let bcrypt_cost = parse_or(get("BCRYPT_COST"), "BCRYPT_COST", DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        Ok(Self {
            database_url: get("DATABASE_URL"),
            server_port,
            server_host: get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret: get("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
            jwt_ttl_hours,
            bcrypt_cost,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
