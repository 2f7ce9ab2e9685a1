//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the payment processor, token store, webhook receiver,
//! configuration and checkout defaults.

use std::sync::Arc;
use workshop_adyen::{AdyenClient, AdyenConfig, HmacValidator, TokenRegistrar, WebhookReceiver};
use workshop_core::{
    BoxedPaymentProcessor, CheckoutDefaults, InMemoryTokenStore, PaymentOutcome,
    SharedTokenStore, SignatureValidator, WorkshopError, WorkshopResult,
};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public base URL (return URLs, result redirects)
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// URL scheme of the public base URL
    pub fn scheme(&self) -> &str {
        self.base_url.split("://").next().unwrap_or("http")
    }

    /// Host (and port) of the public base URL
    pub fn authority(&self) -> &str {
        let without_scheme = self
            .base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.base_url);
        without_scheme.split('/').next().unwrap_or(without_scheme)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment processor
    pub processor: BoxedPaymentProcessor,
    /// Stored recurring tokens
    pub tokens: SharedTokenStore,
    /// Notification webhook receiver
    pub webhooks: WebhookReceiver,
    /// Merchant account sent with every processor request
    pub merchant_account: String,
    /// Client key for the browser Drop-in
    pub client_key: String,
    /// Fixed request values
    pub defaults: CheckoutDefaults,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState backed by Adyen and an in-memory token store
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let defaults = load_checkout_defaults()?;

        let adyen_config = AdyenConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load Adyen config: {}", e))?;
        let merchant_account = adyen_config.merchant_account.clone();
        let client_key = adyen_config.client_key.clone();
        let validator = Arc::new(HmacValidator::new(&adyen_config.hmac_key));

        let client = AdyenClient::new(adyen_config)
            .map_err(|e| anyhow::anyhow!("Failed to initialize Adyen client: {}", e))?;

        Ok(Self::from_parts(
            config,
            defaults,
            merchant_account,
            client_key,
            Arc::new(client),
            validator,
            Arc::new(InMemoryTokenStore::new()),
        ))
    }

    /// Assemble state from explicit components
    pub fn from_parts(
        config: AppConfig,
        defaults: CheckoutDefaults,
        merchant_account: impl Into<String>,
        client_key: impl Into<String>,
        processor: BoxedPaymentProcessor,
        validator: Arc<dyn SignatureValidator>,
        tokens: SharedTokenStore,
    ) -> Self {
        let webhooks = WebhookReceiver::new(validator, Arc::new(TokenRegistrar::new(tokens.clone())));

        Self {
            processor,
            tokens,
            webhooks,
            merchant_account: merchant_account.into(),
            client_key: client_key.into(),
            defaults,
            config,
        }
    }

    /// Where the processor sends the shopper after a 3DS2 redirect
    pub fn shopper_redirect_url(&self) -> String {
        format!("{}/handleShopperRedirect", self.config.base_url)
    }

    /// Result page for a payment outcome
    pub fn result_url(&self, outcome: PaymentOutcome, reason: &str) -> WorkshopResult<String> {
        let query = serde_urlencoded::to_string([("reason", reason)])
            .map_err(|e| WorkshopError::Serialization(e.to_string()))?;

        Ok(format!(
            "{}/result/{}?{}",
            self.config.base_url,
            outcome.as_str(),
            query
        ))
    }
}

/// Load checkout defaults from config file
fn load_checkout_defaults() -> anyhow::Result<CheckoutDefaults> {
    // Try to load from config/checkout.toml
    let config_paths = [
        "config/checkout.toml",
        "../config/checkout.toml",
        "../../config/checkout.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let defaults = parse_checkout_defaults(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded checkout defaults from {}", path);
            return Ok(defaults);
        }
    }

    // Fall back to built-in defaults if no config found
    tracing::warn!("No checkout config found, using built-in defaults");
    Ok(CheckoutDefaults::default())
}

fn parse_checkout_defaults(content: &str) -> Result<CheckoutDefaults, toml::de::Error> {
    toml::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            base_url: "https://shop.example:8443/".to_string(),
            environment: "test".to_string(),
        }
    }

    #[test]
    fn test_app_config_defaults() {
        // Clear env vars for test
        std::env::remove_var("HOST");
        std::env::remove_var("PORT");
        std::env::remove_var("BASE_URL");

        let config = AppConfig::from_env();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_base_url_parts() {
        let config = config();
        assert_eq!(config.scheme(), "https");
        assert_eq!(config.authority(), "shop.example:8443");
    }

    #[test]
    fn test_result_url_encodes_reason() {
        let app_config = AppConfig {
            base_url: "http://localhost:8080".to_string(),
            ..config()
        };
        let state = AppState::from_parts(
            app_config,
            CheckoutDefaults::default(),
            "WorkshopECOM",
            "test_CLIENTKEY",
            Arc::new(
                AdyenClient::new(AdyenConfig::new("key", "test_CLIENTKEY", "WorkshopECOM", "00AB"))
                    .unwrap(),
            ),
            Arc::new(HmacValidator::new("00AB")),
            Arc::new(InMemoryTokenStore::new()),
        );

        assert_eq!(
            state.result_url(PaymentOutcome::Failed, "Refused").unwrap(),
            "http://localhost:8080/result/failed?reason=Refused"
        );
        assert_eq!(
            state.result_url(PaymentOutcome::Error, "a b&c=<d>").unwrap(),
            "http://localhost:8080/result/error?reason=a+b%26c%3D%3Cd%3E"
        );
    }

    #[test]
    fn test_parse_checkout_defaults() {
        let defaults = parse_checkout_defaults(
            r#"
currency = "EUR"
payment_amount = 1500
shopper_reference = "shopper-42"

[billing_address]
city = "Utrecht"
country = "NL"
houseNumberOrName = "1"
postalCode = "3511AA"
street = "Domplein"
"#,
        )
        .unwrap();

        assert_eq!(defaults.payment_amount, 1500);
        assert_eq!(defaults.subscription_amount, 500);
        assert_eq!(defaults.shopper_reference, "shopper-42");
        assert_eq!(defaults.billing_address.city, "Utrecht");
    }
}
