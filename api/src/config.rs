use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::entities::IdAssignment;
use crate::error::ConfigError;

/// Deployment environment, selects the log format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Upper bound for a single request, including its database work
    pub request_timeout: Duration,
    /// How long in-flight requests get to finish after a shutdown signal
    pub shutdown_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// Who assigns order ids; one mode per process
    pub id_assignment: IdAssignment,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            environment: parse_or(&lookup, "ENV", Environment::Development)?,
            server: ServerConfig {
                addr: parse_or(&lookup, "SERVER_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
                request_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "REQUEST_TIMEOUT_SECS",
                    15,
                )?),
                shutdown_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "SHUTDOWN_TIMEOUT_SECS",
                    10,
                )?),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 25)?,
                min_connections: parse_or(&lookup, "DATABASE_MIN_CONNECTIONS", 5)?,
                max_lifetime: Duration::from_secs(parse_or(
                    &lookup,
                    "DATABASE_MAX_LIFETIME_SECS",
                    30 * 60,
                )?),
            },
            id_assignment: parse_or(&lookup, "ORDER_ID_ASSIGNMENT", IdAssignment::Constructor)?,
        })
    }
}

/// Parse `key` if set, otherwise fall back to `default`
fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
