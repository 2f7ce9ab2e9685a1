//! # Checkout Defaults
//!
//! Fixed values the workshop sends with every request: currency, amounts,
//! shopper data and billing address. Loadable from `config/checkout.toml`;
//! any field left out falls back to the built-in value.

use crate::payment::{Amount, BillingAddress};
use serde::{Deserialize, Serialize};

/// Values used when building processor requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutDefaults {
    /// ISO 4217 currency for all amounts
    pub currency: String,

    /// Amount charged by the Drop-in checkout (minor units)
    pub payment_amount: i64,

    /// Amount charged when paying with a stored token (minor units)
    pub subscription_amount: i64,

    /// Country used for sessions
    pub country_code: String,

    /// Shopper IP sent with card payments
    pub shopper_ip: String,

    /// Shopper reference that owns every stored token
    pub shopper_reference: String,

    pub billing_address: BillingAddress,
}

impl CheckoutDefaults {
    pub fn payment_amount(&self) -> Amount {
        Amount::new(&self.currency, self.payment_amount)
    }

    pub fn subscription_amount(&self) -> Amount {
        Amount::new(&self.currency, self.subscription_amount)
    }

    /// Zero-value amount used for tokenization
    pub fn zero_auth_amount(&self) -> Amount {
        Amount::new(&self.currency, 0)
    }
}

impl Default for CheckoutDefaults {
    fn default() -> Self {
        Self {
            currency: "EUR".to_string(),
            payment_amount: 9998,
            subscription_amount: 500,
            country_code: "NL".to_string(),
            shopper_ip: "192.168.0.1".to_string(),
            shopper_reference: "workshop-shopper-0001".to_string(),
            billing_address: BillingAddress {
                city: "Amsterdam".to_string(),
                country: "NL".to_string(),
                house_number_or_name: "49".to_string(),
                postal_code: "1012KK".to_string(),
                street: "Rokin".to_string(),
            },
        }
    }
}
