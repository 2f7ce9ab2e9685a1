//! # Checkout Sessions
//!
//! Session creation for tokenization (zero-auth subscription sign-up).

use crate::payment::{Amount, Channel, RecurringProcessingModel, ShopperInteraction};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `/sessions` request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    pub amount: Amount,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,

    pub merchant_account: String,

    pub reference: String,

    pub return_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopper_reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopper_interaction: Option<ShopperInteraction>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_processing_model: Option<RecurringProcessingModel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_recurring: Option<bool>,
}

impl CreateCheckoutSessionRequest {
    pub fn new(
        amount: Amount,
        merchant_account: impl Into<String>,
        reference: impl Into<String>,
        return_url: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            country_code: None,
            merchant_account: merchant_account.into(),
            reference: reference.into(),
            return_url: return_url.into(),
            shopper_reference: None,
            channel: None,
            shopper_interaction: None,
            recurring_processing_model: None,
            enable_recurring: None,
        }
    }

    /// Builder: configure the session to store a subscription token
    pub fn for_subscription(mut self, shopper_reference: impl Into<String>) -> Self {
        self.shopper_reference = Some(shopper_reference.into());
        self.shopper_interaction = Some(ShopperInteraction::Ecommerce);
        self.recurring_processing_model = Some(RecurringProcessingModel::Subscription);
        self.enable_recurring = Some(true);
        self
    }
}

/// `/sessions` response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    /// Session ID
    pub id: String,

    /// Opaque session payload for the Drop-in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_data: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_session() {
        let request = CreateCheckoutSessionRequest::new(
            Amount::new("EUR", 0),
            "WorkshopECOM",
            "order-1",
            "http://localhost:8080/redirect?orderRef=order-1",
        )
        .for_subscription("shopper_a");

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["amount"]["value"], 0);
        assert_eq!(value["shopperReference"], "shopper_a");
        assert_eq!(value["shopperInteraction"], "Ecommerce");
        assert_eq!(value["recurringProcessingModel"], "Subscription");
        assert_eq!(value["enableRecurring"], true);
    }
}
