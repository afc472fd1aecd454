//! Server configuration from environment variables.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use dashgate_observability::LogFormat;

pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub session_ttl: Duration,
    pub log_format: LogFormat,
    pub seed_demo_users: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            session_ttl: Duration::minutes(60),
            log_format: LogFormat::Json,
            seed_demo_users: true,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("DASHGATE_BIND_ADDR") {
            config.bind_addr = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("DASHGATE_BIND_ADDR", format!("{e}")))?;
        }

        if let Some(raw) = lookup("DASHGATE_JWT_SECRET") {
            if raw.is_empty() {
                return Err(ConfigError::invalid("DASHGATE_JWT_SECRET", "must not be empty"));
            }
            config.jwt_secret = raw;
        }

        if let Some(raw) = lookup("DASHGATE_SESSION_TTL_MINUTES") {
            let minutes: i64 = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("DASHGATE_SESSION_TTL_MINUTES", format!("{e}")))?;
            if minutes <= 0 {
                return Err(ConfigError::invalid(
                    "DASHGATE_SESSION_TTL_MINUTES",
                    "must be positive",
                ));
            }
            config.session_ttl = Duration::try_minutes(minutes)
                .ok_or_else(|| {
                    ConfigError::invalid("DASHGATE_SESSION_TTL_MINUTES", "out of range")
                })?;
        }

        if let Some(raw) = lookup("DASHGATE_LOG_FORMAT") {
            config.log_format = raw
                .parse()
                .map_err(|reason: String| ConfigError::invalid("DASHGATE_LOG_FORMAT", reason))?;
        }

        if let Some(raw) = lookup("DASHGATE_SEED_DEMO_USERS") {
            config.seed_demo_users = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("DASHGATE_SEED_DEMO_USERS", format!("{e}")))?;
        }

        Ok(config)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ApiConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.uses_dev_secret());
        assert_eq!(config.session_ttl, Duration::minutes(60));
        assert!(config.seed_demo_users);
    }

    #[test]
    fn reads_every_variable() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("DASHGATE_BIND_ADDR", "127.0.0.1:9000"),
            ("DASHGATE_JWT_SECRET", "s3cr3t"),
            ("DASHGATE_SESSION_TTL_MINUTES", "15"),
            ("DASHGATE_LOG_FORMAT", "pretty"),
            ("DASHGATE_SEED_DEMO_USERS", "false"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert!(!config.uses_dev_secret());
        assert_eq!(config.session_ttl, Duration::minutes(15));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(!config.seed_demo_users);
    }

    #[test]
    fn rejects_bad_values_naming_the_variable() {
        let err = ApiConfig::from_lookup(lookup(&[("DASHGATE_SESSION_TTL_MINUTES", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("DASHGATE_SESSION_TTL_MINUTES"));

        let err = ApiConfig::from_lookup(lookup(&[("DASHGATE_BIND_ADDR", "nowhere")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "DASHGATE_BIND_ADDR", .. }));

        assert!(ApiConfig::from_lookup(lookup(&[("DASHGATE_LOG_FORMAT", "xml")])).is_err());
        assert!(ApiConfig::from_lookup(lookup(&[("DASHGATE_JWT_SECRET", "")])).is_err());
    }
}
