//! Server configuration from the environment

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

use crate::engine::{
    EngineConfig, RevocationMode, DEFAULT_MAX_TTL_SECS, DEFAULT_TTL_SECS, DEFAULT_UPSTREAM_TIMEOUT,
};

pub const ENV_PORT: &str = "TFSECRETS_PORT";
pub const ENV_LOG_LEVEL: &str = "TFSECRETS_LOG_LEVEL";
pub const ENV_DEFAULT_TTL: &str = "TFSECRETS_DEFAULT_TTL";
pub const ENV_MAX_TTL: &str = "TFSECRETS_MAX_TTL";
pub const ENV_UPSTREAM_TIMEOUT: &str = "TFSECRETS_UPSTREAM_TIMEOUT";
pub const ENV_REVOKE_UPSTREAM: &str = "TFSECRETS_REVOKE_UPSTREAM";
pub const ENV_DATABASE_URL: &str = "TFSECRETS_DATABASE_URL";
pub const ENV_PROVIDER: &str = "TFSECRETS_PROVIDER";

const DEFAULT_PORT: u16 = 8200;

/// Invalid environment value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{var} has invalid value '{value}': {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Which upstream provider the server talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProviderKind {
    /// Terraform Cloud / Enterprise HTTP API
    #[default]
    Terraform,
    /// In-memory mock, for local development
    Mock,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terraform" | "tfc" => Ok(ProviderKind::Terraform),
            "mock" => Ok(ProviderKind::Mock),
            _ => Err("expected 'terraform' or 'mock'".into()),
        }
    }
}

/// Server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub log_level: Level,
    pub engine: EngineConfig,
    pub provider: ProviderKind,
    pub database_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_level: Level::INFO,
            engine: EngineConfig::default(),
            provider: ProviderKind::default(),
            database_url: None,
        }
    }
}

impl ServerConfig {
    /// Read settings from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    ///
    /// Unset or blank variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let port = parse_var(ENV_PORT, get(ENV_PORT), DEFAULT_PORT)?;
        let log_level = parse_var(ENV_LOG_LEVEL, get(ENV_LOG_LEVEL), Level::INFO)?;
        let default_ttl = parse_var(ENV_DEFAULT_TTL, get(ENV_DEFAULT_TTL), DEFAULT_TTL_SECS)?;
        let max_ttl = parse_var(ENV_MAX_TTL, get(ENV_MAX_TTL), DEFAULT_MAX_TTL_SECS)?;
        let timeout_secs = parse_var(
            ENV_UPSTREAM_TIMEOUT,
            get(ENV_UPSTREAM_TIMEOUT),
            DEFAULT_UPSTREAM_TIMEOUT.as_secs(),
        )?;
        let revoke_upstream = parse_var(ENV_REVOKE_UPSTREAM, get(ENV_REVOKE_UPSTREAM), false)?;
        let provider = parse_var(ENV_PROVIDER, get(ENV_PROVIDER), ProviderKind::default())?;

        if max_ttl == 0 {
            return Err(invalid(ENV_MAX_TTL, "0", "must be positive"));
        }
        if default_ttl == 0 || default_ttl > max_ttl {
            return Err(invalid(
                ENV_DEFAULT_TTL,
                &default_ttl.to_string(),
                &format!("must be between 1 and {} ({})", max_ttl, ENV_MAX_TTL),
            ));
        }
        if timeout_secs == 0 {
            return Err(invalid(ENV_UPSTREAM_TIMEOUT, "0", "must be positive"));
        }

        Ok(Self {
            port,
            log_level,
            engine: EngineConfig {
                default_ttl,
                max_ttl,
                upstream_timeout: Duration::from_secs(timeout_secs),
                revocation: if revoke_upstream {
                    RevocationMode::Upstream
                } else {
                    RevocationMode::Local
                },
            },
            provider,
            database_url: get(ENV_DATABASE_URL),
        })
    }
}

fn parse_var<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(var, &raw, &e.to_string())),
        None => Ok(default),
    }
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
