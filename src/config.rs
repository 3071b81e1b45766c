use std::net::SocketAddr;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Symptom Checker";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_RETRIES: usize = 0;
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,symptom_checker_lib=debug"
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API key missing: set API_KEY (or GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Settings injected into the analysis gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
    pub max_retries: usize,
}

// Keeps the key out of logs.
impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub addr: SocketAddr,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which returns the raw value
    /// of an environment variable if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let api_key = non_blank("API_KEY")
            .or_else(|| non_blank("GEMINI_API_KEY"))
            .ok_or(ConfigError::MissingApiKey)?;

        let gateway = GatewayConfig {
            api_key: api_key.trim().to_string(),
            model: non_blank("SYMPTOM_CHECKER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            api_base: non_blank("SYMPTOM_CHECKER_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.into()),
            timeout_secs: parse_or(
                "SYMPTOM_CHECKER_TIMEOUT_SECS",
                non_blank("SYMPTOM_CHECKER_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?,
            max_retries: parse_or(
                "SYMPTOM_CHECKER_MAX_RETRIES",
                non_blank("SYMPTOM_CHECKER_MAX_RETRIES"),
                DEFAULT_MAX_RETRIES,
            )?,
        };

        if gateway.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "SYMPTOM_CHECKER_TIMEOUT_SECS",
                value: "0".into(),
            });
        }

        let raw_addr = non_blank("SYMPTOM_CHECKER_ADDR").unwrap_or_else(|| DEFAULT_ADDR.into());
        let addr: SocketAddr = parse_value("SYMPTOM_CHECKER_ADDR", &raw_addr)?;

        Ok(Self { gateway, addr })
    }
}

fn parse_value<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: raw.to_string(),
    })
}

fn parse_or<T: std::str::FromStr>(
    var: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => parse_value(var, &raw),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| env.get(var).cloned())
    }

    #[test]
    fn missing_key_is_an_error() {
        assert_eq!(config_from(&[]), Err(ConfigError::MissingApiKey));
        assert_eq!(
            config_from(&[("API_KEY", "   ")]),
            Err(ConfigError::MissingApiKey)
        );
    }

    #[test]
    fn defaults_are_applied() {
        let config = config_from(&[("API_KEY", "secret")]).unwrap();
        assert_eq!(config.gateway.api_key, "secret");
        assert_eq!(config.gateway.model, DEFAULT_MODEL);
        assert_eq!(config.gateway.api_base, DEFAULT_API_BASE);
        assert_eq!(config.gateway.timeout_secs, 60);
        assert_eq!(config.gateway.max_retries, 0);
        assert_eq!(config.addr.to_string(), DEFAULT_ADDR);
    }

    #[test]
    fn gemini_key_is_fallback() {
        let config = config_from(&[("GEMINI_API_KEY", "fallback")]).unwrap();
        assert_eq!(config.gateway.api_key, "fallback");

        let config = config_from(&[("API_KEY", "primary"), ("GEMINI_API_KEY", "fallback")]).unwrap();
        assert_eq!(config.gateway.api_key, "primary");
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("API_KEY", "k"),
            ("SYMPTOM_CHECKER_MODEL", "gemini-2.5-pro"),
            ("SYMPTOM_CHECKER_API_BASE", "http://localhost:8080"),
            ("SYMPTOM_CHECKER_TIMEOUT_SECS", "15"),
            ("SYMPTOM_CHECKER_MAX_RETRIES", "2"),
            ("SYMPTOM_CHECKER_ADDR", "0.0.0.0:8000"),
        ])
        .unwrap();
        assert_eq!(config.gateway.model, "gemini-2.5-pro");
        assert_eq!(config.gateway.api_base, "http://localhost:8080");
        assert_eq!(config.gateway.timeout_secs, 15);
        assert_eq!(config.gateway.max_retries, 2);
        assert_eq!(config.addr.port(), 8000);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = config_from(&[("API_KEY", "k"), ("SYMPTOM_CHECKER_TIMEOUT_SECS", "soon")])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "SYMPTOM_CHECKER_TIMEOUT_SECS",
                value: "soon".into()
            }
        );
        assert!(config_from(&[("API_KEY", "k"), ("SYMPTOM_CHECKER_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_from(&[("API_KEY", "k"), ("SYMPTOM_CHECKER_ADDR", "localhost")]).is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = config_from(&[("API_KEY", "super-secret")]).unwrap();
        let debug = format!("{:?}", config.gateway);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
