//! # Adyen Configuration
//!
//! Configuration management for the Adyen integration.
//! All secrets are loaded from environment variables.

use std::env;
use workshop_core::WorkshopError;

const CHECKOUT_API_VERSION: &str = "v71";
const RECURRING_API_VERSION: &str = "v68";

/// Target platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdyenEnvironment {
    Test,
    Live,
}

/// Adyen API configuration
#[derive(Clone)]
pub struct AdyenConfig {
    /// API key sent as `X-API-Key`
    pub api_key: String,

    /// Client key for the browser Drop-in (test_... or live_...)
    pub client_key: String,

    /// Merchant account every request is made for
    pub merchant_account: String,

    /// Hex-encoded HMAC key for notification signatures
    pub hmac_key: String,

    pub environment: AdyenEnvironment,

    /// Checkout API base URL (for testing/mocking)
    pub checkout_base_url: String,

    /// Recurring API base URL (for testing/mocking)
    pub recurring_base_url: String,
}

impl AdyenConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `ADYEN_API_KEY`
    /// - `ADYEN_CLIENT_KEY`
    /// - `ADYEN_MERCHANT_ACCOUNT`
    /// - `ADYEN_HMAC_KEY`
    ///
    /// Optional: `ADYEN_ENVIRONMENT` (`test` or `live`), and
    /// `ADYEN_LIVE_URL_PREFIX` which is required when live.
    pub fn from_env() -> Result<Self, WorkshopError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_key = required_var("ADYEN_API_KEY")?;
        let client_key = required_var("ADYEN_CLIENT_KEY")?;
        let merchant_account = required_var("ADYEN_MERCHANT_ACCOUNT")?;
        let hmac_key = required_var("ADYEN_HMAC_KEY")?;

        let environment = match env::var("ADYEN_ENVIRONMENT")
            .unwrap_or_else(|_| "test".to_string())
            .to_lowercase()
            .as_str()
        {
            "test" => AdyenEnvironment::Test,
            "live" => AdyenEnvironment::Live,
            other => {
                return Err(WorkshopError::Configuration(format!(
                    "ADYEN_ENVIRONMENT must be test or live, got {}",
                    other
                )))
            }
        };

        let live_prefix = env::var("ADYEN_LIVE_URL_PREFIX").ok();

        Self::build(
            api_key,
            client_key,
            merchant_account,
            hmac_key,
            environment,
            live_prefix.as_deref(),
        )
    }

    /// Create a test-environment config with explicit values (for testing)
    pub fn new(
        api_key: impl Into<String>,
        client_key: impl Into<String>,
        merchant_account: impl Into<String>,
        hmac_key: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            client_key: client_key.into(),
            merchant_account: merchant_account.into(),
            hmac_key: hmac_key.into(),
            environment: AdyenEnvironment::Test,
            checkout_base_url: format!("https://checkout-test.adyen.com/{}", CHECKOUT_API_VERSION),
            recurring_base_url: format!(
                "https://pal-test.adyen.com/pal/servlet/Recurring/{}",
                RECURRING_API_VERSION
            ),
        }
    }

    fn build(
        api_key: String,
        client_key: String,
        merchant_account: String,
        hmac_key: String,
        environment: AdyenEnvironment,
        live_prefix: Option<&str>,
    ) -> Result<Self, WorkshopError> {
        // Validate key formats
        let expected_prefix = match environment {
            AdyenEnvironment::Test => "test_",
            AdyenEnvironment::Live => "live_",
        };
        if !client_key.starts_with(expected_prefix) {
            return Err(WorkshopError::Configuration(format!(
                "ADYEN_CLIENT_KEY must start with {}",
                expected_prefix
            )));
        }

        if hmac_key.is_empty() || hex::decode(&hmac_key).is_err() {
            return Err(WorkshopError::Configuration(
                "ADYEN_HMAC_KEY must be a hex-encoded key".to_string(),
            ));
        }

        let mut config = Self::new(api_key, client_key, merchant_account, hmac_key);

        if environment == AdyenEnvironment::Live {
            let prefix = live_prefix.filter(|p| !p.is_empty()).ok_or_else(|| {
                WorkshopError::Configuration(
                    "ADYEN_LIVE_URL_PREFIX is required for the live environment".to_string(),
                )
            })?;
            config.environment = AdyenEnvironment::Live;
            config.checkout_base_url = format!(
                "https://{}-checkout-live.adyenpayments.com/checkout/{}",
                prefix, CHECKOUT_API_VERSION
            );
            config.recurring_base_url = format!(
                "https://{}-pal-live.adyenpayments.com/pal/servlet/Recurring/{}",
                prefix, RECURRING_API_VERSION
            );
        }

        Ok(config)
    }

    /// Check if targeting the test platform
    pub fn is_test_mode(&self) -> bool {
        self.environment == AdyenEnvironment::Test
    }

    /// Builder: point both APIs at a custom base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.checkout_base_url = url.clone();
        self.recurring_base_url = url;
        self
    }
}

impl std::fmt::Debug for AdyenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdyenConfig")
            .field("api_key", &"[redacted]")
            .field("client_key", &self.client_key)
            .field("merchant_account", &self.merchant_account)
            .field("hmac_key", &"[redacted]")
            .field("environment", &self.environment)
            .field("checkout_base_url", &self.checkout_base_url)
            .field("recurring_base_url", &self.recurring_base_url)
            .finish()
    }
}

fn required_var(name: &str) -> Result<String, WorkshopError> {
    env::var(name).map_err(|_| WorkshopError::Configuration(format!("{} not set", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(client_key: &str, hmac_key: &str, environment: AdyenEnvironment, prefix: Option<&str>) -> Result<AdyenConfig, WorkshopError> {
        AdyenConfig::build(
            "AQE_api_key".to_string(),
            client_key.to_string(),
            "WorkshopECOM".to_string(),
            hmac_key.to_string(),
            environment,
            prefix,
        )
    }

    #[test]
    fn test_config_validation() {
        let config = build("test_ABC", "44782DEF547AAA06C910C43932B1EB0C", AdyenEnvironment::Test, None).unwrap();
        assert!(config.is_test_mode());
        assert!(config.checkout_base_url.starts_with("https://checkout-test.adyen.com"));

        assert!(build("live_ABC", "44782DEF", AdyenEnvironment::Test, None).is_err());
        assert!(build("test_ABC", "not-hex", AdyenEnvironment::Test, None).is_err());
    }

    #[test]
    fn test_live_requires_prefix() {
        assert!(build("live_ABC", "00FF", AdyenEnvironment::Live, None).is_err());

        let config = build("live_ABC", "00FF", AdyenEnvironment::Live, Some("1797a841fbb37ca7-AdyenDemo")).unwrap();
        assert!(!config.is_test_mode());
        assert_eq!(
            config.checkout_base_url,
            "https://1797a841fbb37ca7-AdyenDemo-checkout-live.adyenpayments.com/checkout/v71"
        );
    }

    #[test]
    fn test_with_api_base_url() {
        let config = AdyenConfig::new("key", "test_ABC", "WorkshopECOM", "00FF")
            .with_api_base_url("http://127.0.0.1:9999");
        assert_eq!(config.checkout_base_url, "http://127.0.0.1:9999");
        assert_eq!(config.recurring_base_url, "http://127.0.0.1:9999");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AdyenConfig::new("AQE-secret-api-key", "test_ABC", "WorkshopECOM", "00FF");
        let printed = format!("{:?}", config);

        assert!(!printed.contains("AQE-secret-api-key"));
        assert!(!printed.contains("00FF"));
        assert!(printed.contains("WorkshopECOM"));
        assert!(printed.contains("[redacted]"));
    }

    #[test]
    fn test_from_env_missing_key() {
        // Clear any existing env vars
        env::remove_var("ADYEN_API_KEY");

        let result = AdyenConfig::from_env();
        assert!(result.is_err());
    }
}
