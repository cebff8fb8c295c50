//! Environment configuration with built-in defaults.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};

/// Service configuration.
///
/// Every field has a working default; environment variables override
/// individual values for deployment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port. Environment variable: `PORT`.
    pub port: u16,
    /// Origin allowed by CORS. Environment variable: `CORS_ORIGIN`.
    pub cors_origin: String,
    /// Campaign id used when a request names none.
    /// Environment variable: `DEFAULT_CAMPAIGN`.
    pub default_campaign: String,
    /// Per-leaf entitlement when a submission carries no amounts.
    /// Environment variable: `DEFAULT_AMOUNT`.
    pub default_amount: u128,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 10001,
            cors_origin: "http://localhost:3000".to_string(),
            default_campaign: "default".to_string(),
            default_amount: 100,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(port) = env::var("PORT") {
            config.port = port.parse().context("PORT must be a valid port number")?;
        }
        if let Ok(origin) = env::var("CORS_ORIGIN") {
            config.cors_origin = origin;
        }
        if let Ok(campaign) = env::var("DEFAULT_CAMPAIGN") {
            config.default_campaign = campaign;
        }
        if let Ok(amount) = env::var("DEFAULT_AMOUNT") {
            config.default_amount = amount
                .parse()
                .context("DEFAULT_AMOUNT must be a non-negative integer")?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }
        if self.default_campaign.is_empty() {
            anyhow::bail!("default campaign id must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, 10001);
        assert_eq!(config.cors_origin, "http://localhost:3000");
        assert_eq!(config.default_campaign, "default");
        assert_eq!(config.default_amount, 100);
    }

    #[test]
    fn server_addr_uses_the_configured_port() {
        let config = Config {
            port: 9000,
            ..Config::default()
        };
        assert_eq!(config.server_addr().port(), 9000);
    }

    #[test]
    fn empty_default_campaign_is_rejected() {
        let config = Config {
            default_campaign: String::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
