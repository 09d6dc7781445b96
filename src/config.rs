use crate::error::{PaymentError, Result};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SHORT_CODE: &str = "174379";

const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke";
const PRODUCTION_BASE_URL: &str = "https://api.safaricom.co.ke";

/// Which Daraja deployment the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
        }
    }
}

impl FromStr for Environment {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sandbox" => Ok(Environment::Sandbox),
            "production" => Ok(Environment::Production),
            other => Err(PaymentError::Config(format!(
                "unknown environment '{other}' (expected 'sandbox' or 'production')"
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Sandbox => write!(f, "sandbox"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Daraja API credentials and endpoints, loaded once at startup.
///
/// The struct is read-only for the process lifetime; the coordinator and
/// gateway adapter hold it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct MpesaConfig {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub short_code: String,
    pub passkey: String,
    pub callback_url: String,
    pub environment: Environment,
}

impl MpesaConfig {
    /// Loads the configuration from `MPESA_*` environment variables.
    ///
    /// `MPESA_BUSINESS_SHORT_CODE` defaults to the Daraja sandbox test
    /// shortcode and `MPESA_ENVIRONMENT` to `sandbox`; everything else is
    /// required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            get(key).ok_or_else(|| PaymentError::Config(format!("missing environment variable {key}")))
        };

        let environment = match get("MPESA_ENVIRONMENT") {
            Some(value) => value.parse()?,
            None => Environment::Sandbox,
        };

        Ok(Self {
            consumer_key: require("MPESA_CONSUMER_KEY")?,
            consumer_secret: require("MPESA_CONSUMER_SECRET")?,
            short_code: get("MPESA_BUSINESS_SHORT_CODE")
                .unwrap_or_else(|| DEFAULT_SHORT_CODE.to_string()),
            passkey: require("MPESA_PASSKEY")?,
            callback_url: require("MPESA_CALLBACK_URL")?,
            environment,
        })
    }

    pub fn base_url(&self) -> &'static str {
        self.environment.base_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_environment_base_urls() {
        assert_eq!(Environment::Sandbox.base_url(), SANDBOX_BASE_URL);
        assert_eq!(Environment::Production.base_url(), PRODUCTION_BASE_URL);
    }

    #[test]
    fn test_environment_parse_rejects_unknown() {
        assert!("sandbox".parse::<Environment>().is_ok());
        assert!("production".parse::<Environment>().is_ok());
        assert!(matches!(
            "staging".parse::<Environment>(),
            Err(PaymentError::Config(_))
        ));
    }

    #[test]
    fn test_config_defaults() {
        let env = vars(&[
            ("MPESA_CONSUMER_KEY", "key"),
            ("MPESA_CONSUMER_SECRET", "secret"),
            ("MPESA_PASSKEY", "passkey"),
            ("MPESA_CALLBACK_URL", "https://example.com/callback"),
        ]);
        let config = MpesaConfig::from_lookup(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.short_code, DEFAULT_SHORT_CODE);
        assert_eq!(config.environment, Environment::Sandbox);
        assert_eq!(config.base_url(), SANDBOX_BASE_URL);
    }

    #[test]
    fn test_config_missing_required_key() {
        let env = vars(&[("MPESA_CONSUMER_KEY", "key")]);
        let result = MpesaConfig::from_lookup(|k| env.get(k).cloned());

        assert!(matches!(result, Err(PaymentError::Config(_))));
    }
}
