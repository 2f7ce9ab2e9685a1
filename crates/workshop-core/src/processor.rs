//! # Payment Processor Trait
//!
//! Seam between the HTTP handlers and the hosted payment API.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 PaymentProcessor (trait)                    │
//! │  ├── payment_methods()                                      │
//! │  ├── payments()                                             │
//! │  ├── payment_details()                                      │
//! │  ├── sessions()                                             │
//! │  └── disable()                                              │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                  ┌─────────┴─────────┐
//!                  │                   │
//!          ┌───────┴───────┐   ┌───────┴───────┐
//!          │  AdyenClient  │   │  test doubles │
//!          └───────────────┘   └───────────────┘
//! ```
//!
//! Every call returns `WorkshopResult`; vendor error bodies and transport
//! failures never cross this boundary as anything but `WorkshopError`.

use crate::error::WorkshopResult;
use crate::payment::{
    PaymentDetailsRequest, PaymentMethodsRequest, PaymentMethodsResponse, PaymentRequest,
    PaymentResponse,
};
use crate::recurring::{DisableRequest, DisableResult};
use crate::session::{CheckoutSessionResponse, CreateCheckoutSessionRequest};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Fetch the payment methods available to the merchant account.
    async fn payment_methods(
        &self,
        request: &PaymentMethodsRequest,
    ) -> WorkshopResult<PaymentMethodsResponse>;

    /// Submit a payment.
    ///
    /// # Arguments
    /// * `request` - The payment to submit
    /// * `idempotency_key` - Sent as `Idempotency-Key` when present
    async fn payments(
        &self,
        request: &PaymentRequest,
        idempotency_key: Option<&str>,
    ) -> WorkshopResult<PaymentResponse>;

    /// Submit additional details (3DS2 redirect result, challenge result).
    async fn payment_details(
        &self,
        request: &PaymentDetailsRequest,
    ) -> WorkshopResult<PaymentResponse>;

    /// Create a hosted checkout session.
    async fn sessions(
        &self,
        request: &CreateCheckoutSessionRequest,
    ) -> WorkshopResult<CheckoutSessionResponse>;

    /// Disable a stored token.
    async fn disable(&self, request: &DisableRequest) -> WorkshopResult<DisableResult>;

    /// Provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment processor (dynamic dispatch)
pub type BoxedPaymentProcessor = Arc<dyn PaymentProcessor>;
