//! Configuration management for Gatekeeper.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tracing::info;

use crate::error::{GatekeeperError, Result};
use crate::ratelimit::LimiterConfig;

/// Prefix for environment overrides, e.g. `GATEKEEPER__SERVER__HTTP_ADDR`.
const ENV_PREFIX: &str = "GATEKEEPER";

/// Main configuration for the Gatekeeper service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatekeeperConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
        }
    }
}

fn default_http_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Limiter applied to every API route, keyed by client IP
    #[serde(default = "default_api_limits")]
    pub api: LimiterConfig,

    /// Stricter limiter applied to contact form submissions
    #[serde(default = "default_contact_limits")]
    pub contact: LimiterConfig,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            api: default_api_limits(),
            contact: default_contact_limits(),
        }
    }
}

/// 60 requests per minute.
fn default_api_limits() -> LimiterConfig {
    LimiterConfig::new(60, 60_000)
}

/// 5 submissions per 10 minutes.
fn default_contact_limits() -> LimiterConfig {
    LimiterConfig::new(5, 600_000)
}

impl GatekeeperConfig {
    /// Load configuration from an optional YAML file, then apply
    /// `GATEKEEPER__*` environment overrides.
    ///
    /// Both sources are layered over the defaults, so they only need to name
    /// the fields they change.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder().add_source(Self::defaults()?);

        if let Some(path) = path {
            info!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(
                ::config::File::from(path).format(::config::FileFormat::Yaml),
            );
        }

        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(settings)
    }

    /// Load configuration from a YAML string, layered over the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let overrides: serde_yaml::Value = serde_yaml::from_str(yaml)
            .map_err(|e| GatekeeperError::Config(format!("Failed to parse configuration: {}", e)))?;

        let mut builder = ::config::Config::builder().add_source(Self::defaults()?);
        if !overrides.is_null() {
            builder = builder.add_source(::config::Config::try_from(&overrides)?);
        }

        Self::finish(builder.build()?)
    }

    fn defaults() -> Result<::config::Config> {
        Ok(::config::Config::try_from(&GatekeeperConfig::default())?)
    }

    fn finish(settings: ::config::Config) -> Result<Self> {
        let config: GatekeeperConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check every limiter section.
    pub fn validate(&self) -> Result<()> {
        self.rate_limiting.api.validate()?;
        self.rate_limiting.contact.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::DEFAULT_MAX_ENTRIES;

    #[test]
    fn test_defaults() {
        let config = GatekeeperConfig::default();
        assert_eq!(config.server.http_addr.port(), 8080);
        assert_eq!(config.rate_limiting.api, LimiterConfig::new(60, 60_000));
        assert_eq!(config.rate_limiting.contact.limit, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
server:
  http_addr: "0.0.0.0:3000"
rate_limiting:
  contact:
    limit: 3
    window_ms: 120000
    max_entries: 500
"#;
        let config = GatekeeperConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.http_addr.port(), 3000);
        assert_eq!(config.rate_limiting.api.max_entries, DEFAULT_MAX_ENTRIES);
        assert_eq!(
            config.rate_limiting.contact,
            LimiterConfig::new(3, 120_000).with_max_entries(500)
        );
    }

    #[test]
    fn test_zero_limit_rejected() {
        let yaml = r#"
rate_limiting:
  api:
    limit: 0
    window_ms: 60000
"#;
        let result = GatekeeperConfig::from_yaml(yaml);
        assert!(matches!(result, Err(GatekeeperError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let result = GatekeeperConfig::from_yaml("server: [not, a, map]");
        assert!(matches!(result, Err(GatekeeperError::Config(_))));
    }

    #[test]
    fn test_single_field_yaml_override_keeps_section_defaults() {
        let config = GatekeeperConfig::from_yaml("rate_limiting:\n  api:\n    limit: 100\n").unwrap();
        assert_eq!(config.rate_limiting.api, LimiterConfig::new(100, 60_000));
        assert_eq!(config.rate_limiting.contact, default_contact_limits());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = GatekeeperConfig::from_yaml("").unwrap();
        assert_eq!(config.rate_limiting.api, default_api_limits());
    }

    #[test]
    fn test_single_field_env_override_keeps_section_defaults() {
        std::env::set_var("GATEKEEPER__RATE_LIMITING__CONTACT__LIMIT", "100");
        let result = GatekeeperConfig::load(None);
        std::env::remove_var("GATEKEEPER__RATE_LIMITING__CONTACT__LIMIT");

        let config = result.unwrap();
        assert_eq!(config.rate_limiting.contact, LimiterConfig::new(100, 600_000));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = GatekeeperConfig::load(None).unwrap();
        assert_eq!(config.rate_limiting.api, default_api_limits());
    }
}
