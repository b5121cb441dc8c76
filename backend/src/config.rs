//! Runtime configuration read from environment variables.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};

use crate::domain::time_utils::LocalTimeZone;

const DEFAULT_DATABASE_URL: &str = "sqlite:eventdesk.db";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
const DEFAULT_TIME_ZONE: &str = "Europe/Helsinki";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: SocketAddr,
    /// Zone used for date and time-of-day filters
    pub time_zone: LocalTimeZone,
    pub db_max_connections: u32,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Missing keys fall back
    /// to defaults; present but malformed values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let bind_address = get("BIND_ADDRESS", DEFAULT_BIND_ADDRESS);
        let bind_address = bind_address
            .parse()
            .with_context(|| format!("Invalid BIND_ADDRESS '{}'", bind_address))?;

        let time_zone = get("TIME_ZONE", DEFAULT_TIME_ZONE);
        let time_zone = time_zone
            .parse()
            .with_context(|| format!("Invalid TIME_ZONE '{}'", time_zone))?;

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(value) => value
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("Invalid DB_MAX_CONNECTIONS '{}'", value))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url: get("DATABASE_URL", DEFAULT_DATABASE_URL),
            bind_address,
            time_zone,
            db_max_connections,
            cors_origin: get("CORS_ORIGIN", DEFAULT_CORS_ORIGIN),
        })
    }
}
