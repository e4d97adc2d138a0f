//! Service configuration from the environment.

use crate::config::loader::parse;
use crate::config::ConfigError;

pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Settings shared by the service binaries.
#[derive(Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub jwt_secret: Option<String>,
    pub mongo_uri: Option<String>,
    pub bcrypt_cost: u32,
    pub log_level: String,
}

impl ServiceConfig {
    pub fn from_env(default_port: u16) -> Result<Self, ConfigError> {
        Self::from_lookup(default_port, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(default_port: u16, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(v) => parse("PORT", &v)?,
            None => default_port,
        };
        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(v) => parse("BCRYPT_COST", &v)?,
            None => DEFAULT_BCRYPT_COST,
        };
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Env {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        Ok(Self {
            port,
            jwt_secret: lookup("JWT_SECRET").filter(|s| !s.is_empty()),
            mongo_uri: lookup("MONGO_URI"),
            bcrypt_cost,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// The signing secret, for services that issue tokens.
    pub fn require_secret(&self) -> Result<&str, ConfigError> {
        self.jwt_secret.as_deref().ok_or(ConfigError::Missing("JWT_SECRET"))
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("port", &self.port)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("mongo_uri", &self.mongo_uri)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServiceConfig::from_lookup(3002, |_| None).unwrap();
        assert_eq!(config.port, 3002);
        assert_eq!(config.bcrypt_cost, 10);
        assert!(matches!(config.require_secret(), Err(ConfigError::Missing("JWT_SECRET"))));
    }

    #[test]
    fn reads_overrides() {
        let config = ServiceConfig::from_lookup(3001, |key| match key {
            "PORT" => Some("4001".into()),
            "JWT_SECRET" => Some("s3cret".into()),
            "BCRYPT_COST" => Some("4".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:4001");
        assert_eq!(config.require_secret().unwrap(), "s3cret");
        assert_eq!(config.bcrypt_cost, 4);
        assert!(!format!("{:?}", config).contains("s3cret"));
    }

    #[test]
    fn rejects_out_of_range_cost() {
        let err = ServiceConfig::from_lookup(3001, |key| (key == "BCRYPT_COST").then(|| "2".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: "BCRYPT_COST", .. }));
    }
}
