//! # workshop-core
//!
//! Core types and traits for the checkout workshop.
//!
//! This crate provides:
//! - `PaymentProcessor` trait for the hosted payment API
//! - Payment, session and recurring request/response models
//! - `NotificationRequest` and the `SignatureValidator` trait for webhooks
//! - `TokenStore` trait with an in-memory implementation
//! - `WorkshopError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use workshop_core::{CheckoutDefaults, PaymentRequest, PaymentProcessor};
//!
//! let defaults = CheckoutDefaults::default();
//! let request = PaymentRequest::new(
//!     defaults.payment_amount(),
//!     "WorkshopECOM",
//!     uuid::Uuid::new_v4().to_string(),
//!     drop_in_payment_method,
//! );
//!
//! let response = processor.payments(&request, Some(&idempotency_key)).await?;
//! ```

pub mod defaults;
pub mod error;
pub mod notification;
pub mod payment;
pub mod processor;
pub mod recurring;
pub mod session;
pub mod token;

// Re-exports for convenience
pub use defaults::CheckoutDefaults;
pub use error::{WorkshopError, WorkshopResult};
pub use notification::{
    EventCode, NotificationItemContainer, NotificationRequest, NotificationRequestItem,
    SignatureValidator,
};
pub use payment::{
    stored_payment_method, Amount, AttemptAuthentication, AuthenticationData, BillingAddress,
    Channel, PaymentDetailsRequest, PaymentMethodsRequest, PaymentMethodsResponse,
    PaymentOutcome, PaymentRequest, PaymentResponse, RecurringProcessingModel, ResultCode,
    ShopperInteraction,
};
pub use processor::{BoxedPaymentProcessor, PaymentProcessor};
pub use recurring::{DisableRequest, DisableResult};
pub use session::{CheckoutSessionResponse, CreateCheckoutSessionRequest};
pub use token::{InMemoryTokenStore, SharedTokenStore, StoredToken, TokenStore};
