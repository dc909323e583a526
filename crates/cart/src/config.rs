//! Cart client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `XIMY_STOREFRONT_URL` - Storefront serving the availability endpoint
//!   (default: <http://127.0.0.1:3000>)
//! - `XIMY_CART_PATH` - File the cart is persisted in (default: .ximy/cart.json)
//! - `XIMY_WHATSAPP_NUMBER` - Seller's WhatsApp number, digits only
//!   (default: 60149226456)
//! - `XIMY_VALIDATION_TIMEOUT_MS` - Availability check deadline in
//!   milliseconds (default: 5000)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_STOREFRONT_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_CART_PATH: &str = ".ximy/cart.json";
const DEFAULT_WHATSAPP_NUMBER: &str = "60149226456";
const DEFAULT_VALIDATION_TIMEOUT_MS: &str = "5000";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Settings for a cart session run outside the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartClientConfig {
    /// Base URL of the storefront
    pub storefront_url: Url,
    /// Where the cart payload lives
    pub cart_path: PathBuf,
    /// Seller's WhatsApp number in international format
    pub whatsapp_number: String,
    /// How long an availability check may take
    pub validation_timeout: Duration,
}

impl CartClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let storefront_url = Url::parse(&get("XIMY_STOREFRONT_URL", DEFAULT_STOREFRONT_URL))
            .map_err(|e| {
                ConfigError::InvalidEnvVar("XIMY_STOREFRONT_URL".to_string(), e.to_string())
            })?;

        let cart_path = PathBuf::from(get("XIMY_CART_PATH", DEFAULT_CART_PATH));

        let whatsapp_number = get("XIMY_WHATSAPP_NUMBER", DEFAULT_WHATSAPP_NUMBER);
        validate_phone_number(&whatsapp_number, "XIMY_WHATSAPP_NUMBER")?;

        let timeout_ms = get("XIMY_VALIDATION_TIMEOUT_MS", DEFAULT_VALIDATION_TIMEOUT_MS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("XIMY_VALIDATION_TIMEOUT_MS".to_string(), e.to_string())
            })?;
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "XIMY_VALIDATION_TIMEOUT_MS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            storefront_url,
            cart_path,
            whatsapp_number,
            validation_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

/// `wa.me` links take the number without `+`, spaces or dashes.
fn validate_phone_number(number: &str, var_name: &str) -> Result<(), ConfigError> {
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("expected digits only, got '{number}'"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CartClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CartClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.storefront_url.as_str(), "http://127.0.0.1:3000/");
        assert_eq!(config.cart_path, PathBuf::from(".ximy/cart.json"));
        assert_eq!(config.whatsapp_number, "60149226456");
        assert_eq!(config.validation_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("XIMY_STOREFRONT_URL", "https://ximy.my"),
            ("XIMY_CART_PATH", "/tmp/cart.json"),
            ("XIMY_WHATSAPP_NUMBER", "60123456789"),
            ("XIMY_VALIDATION_TIMEOUT_MS", "250"),
        ])
        .unwrap();
        assert_eq!(config.storefront_url.as_str(), "https://ximy.my/");
        assert_eq!(config.cart_path, PathBuf::from("/tmp/cart.json"));
        assert_eq!(config.whatsapp_number, "60123456789");
        assert_eq!(config.validation_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_rejects_formatted_phone_number() {
        let err = load(&[("XIMY_WHATSAPP_NUMBER", "+60 14-922 6456")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "XIMY_WHATSAPP_NUMBER"));
    }

    #[test]
    fn test_rejects_bad_timeout() {
        assert!(load(&[("XIMY_VALIDATION_TIMEOUT_MS", "soon")]).is_err());
        assert!(load(&[("XIMY_VALIDATION_TIMEOUT_MS", "0")]).is_err());
    }

    #[test]
    fn test_rejects_bad_url() {
        assert!(load(&[("XIMY_STOREFRONT_URL", "not a url")]).is_err());
    }
}
