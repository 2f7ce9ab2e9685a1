//! # workshop-adyen
//!
//! Adyen integration for the checkout workshop.
//!
//! This crate provides:
//!
//! 1. **AdyenClient** - `PaymentProcessor` over the Checkout and Recurring APIs
//!    - payment methods, payments, payment details
//!    - checkout sessions for tokenization
//!    - disabling stored tokens
//!
//! 2. **HmacValidator** - HMAC-SHA256 verification of notification items
//!
//! 3. **WebhookReceiver** - parse, verify and dispatch notification envelopes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use workshop_adyen::AdyenClient;
//! use workshop_core::{PaymentMethodsRequest, PaymentProcessor};
//!
//! // Create client from environment
//! let client = AdyenClient::from_env()?;
//!
//! let methods = client
//!     .payment_methods(&PaymentMethodsRequest::new(&client.config().merchant_account))
//!     .await?;
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use workshop_adyen::{HmacValidator, TokenRegistrar, WebhookReceiver};
//!
//! let receiver = WebhookReceiver::new(
//!     Arc::new(HmacValidator::new(&config.hmac_key)),
//!     Arc::new(TokenRegistrar::new(token_store)),
//! );
//!
//! // In your webhook endpoint:
//! let outcome = receiver.receive(&body).await?;
//! ```

pub mod client;
pub mod config;
pub mod signature;
pub mod webhook;

// Re-exports
pub use client::AdyenClient;
pub use config::{AdyenConfig, AdyenEnvironment};
pub use signature::HmacValidator;
pub use webhook::{
    dispatch_notification, LoggingNotificationHandler, NotificationHandler, TokenRegistrar,
    WebhookOutcome, WebhookReceiver,
};
