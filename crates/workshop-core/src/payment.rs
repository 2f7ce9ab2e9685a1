//! # Payment Types
//!
//! Request and response models for the processor's payment endpoints
//! (`/paymentMethods`, `/payments`, `/payments/details`).
//!
//! Fields the workshop never inspects are carried through untouched in an
//! `extra` map so the browser Drop-in receives the full processor response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Monetary amount in minor units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// ISO 4217 currency code
    pub currency: String,
    /// Value in minor units (cents)
    pub value: i64,
}

impl Amount {
    pub fn new(currency: impl Into<String>, value: i64) -> Self {
        Self {
            currency: currency.into(),
            value,
        }
    }
}

/// Sales channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Web,
    #[serde(rename = "iOS")]
    Ios,
    Android,
}

/// How the shopper interacts with the merchant for this payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShopperInteraction {
    /// Shopper is present online
    Ecommerce,
    /// Continued authorisation with a stored token
    ContAuth,
    Moto,
    #[serde(rename = "POS")]
    Pos,
}

/// Recurring processing model for tokenized payments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurringProcessingModel {
    Subscription,
    CardOnFile,
    UnscheduledCardOnFile,
}

/// 3-D Secure attempt policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptAuthentication {
    Always,
    Never,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_authentication: Option<AttemptAuthentication>,
}

/// Billing address sent with card payments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingAddress {
    pub city: String,
    pub country: String,
    pub house_number_or_name: String,
    pub postal_code: String,
    pub street: String,
}

/// `/payments` request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: Amount,

    pub merchant_account: String,

    /// Merchant order reference
    pub reference: String,

    /// Payment method details as produced by the Drop-in, or a stored method
    pub payment_method: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_data: Option<AuthenticationData>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_info: Option<Value>,

    #[serde(rename = "shopperIP", skip_serializing_if = "Option::is_none")]
    pub shopper_ip: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopper_interaction: Option<ShopperInteraction>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<BillingAddress>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopper_reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_processing_model: Option<RecurringProcessingModel>,
}

impl PaymentRequest {
    pub fn new(
        amount: Amount,
        merchant_account: impl Into<String>,
        reference: impl Into<String>,
        payment_method: Value,
    ) -> Self {
        Self {
            amount,
            merchant_account: merchant_account.into(),
            reference: reference.into(),
            payment_method,
            channel: None,
            return_url: None,
            authentication_data: None,
            origin: None,
            browser_info: None,
            shopper_ip: None,
            shopper_interaction: None,
            billing_address: None,
            shopper_reference: None,
            recurring_processing_model: None,
        }
    }
}

/// Payment method object referencing a stored token
pub fn stored_payment_method(stored_payment_method_id: &str) -> Value {
    serde_json::json!({
        "type": "scheme",
        "storedPaymentMethodId": stored_payment_method_id,
    })
}

/// Processor result codes
///
/// Codes this crate does not know are kept verbatim in `Unknown` so the
/// Drop-in receives exactly what the processor sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResultCode {
    Authorised,
    PartiallyAuthorised,
    Success,
    Pending,
    Received,
    Refused,
    Cancelled,
    Error,
    RedirectShopper,
    IdentifyShopper,
    ChallengeShopper,
    PresentToShopper,
    AuthenticationFinished,
    AuthenticationNotRequired,
    Unknown(String),
}

impl ResultCode {
    pub fn as_str(&self) -> &str {
        match self {
            ResultCode::Authorised => "Authorised",
            ResultCode::PartiallyAuthorised => "PartiallyAuthorised",
            ResultCode::Success => "Success",
            ResultCode::Pending => "Pending",
            ResultCode::Received => "Received",
            ResultCode::Refused => "Refused",
            ResultCode::Cancelled => "Cancelled",
            ResultCode::Error => "Error",
            ResultCode::RedirectShopper => "RedirectShopper",
            ResultCode::IdentifyShopper => "IdentifyShopper",
            ResultCode::ChallengeShopper => "ChallengeShopper",
            ResultCode::PresentToShopper => "PresentToShopper",
            ResultCode::AuthenticationFinished => "AuthenticationFinished",
            ResultCode::AuthenticationNotRequired => "AuthenticationNotRequired",
            ResultCode::Unknown(code) => code,
        }
    }

    /// Whether the code is one of the known processor codes
    pub fn is_known(&self) -> bool {
        !matches!(self, ResultCode::Unknown(_))
    }

    /// Result page bucket the shopper is redirected to
    pub fn outcome(&self) -> PaymentOutcome {
        match self {
            ResultCode::Authorised => PaymentOutcome::Success,
            ResultCode::Pending | ResultCode::Received => PaymentOutcome::Pending,
            ResultCode::Refused => PaymentOutcome::Failed,
            _ => PaymentOutcome::Error,
        }
    }
}

impl From<String> for ResultCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "Authorised" => ResultCode::Authorised,
            "PartiallyAuthorised" => ResultCode::PartiallyAuthorised,
            "Success" => ResultCode::Success,
            "Pending" => ResultCode::Pending,
            "Received" => ResultCode::Received,
            "Refused" => ResultCode::Refused,
            "Cancelled" => ResultCode::Cancelled,
            "Error" => ResultCode::Error,
            "RedirectShopper" => ResultCode::RedirectShopper,
            "IdentifyShopper" => ResultCode::IdentifyShopper,
            "ChallengeShopper" => ResultCode::ChallengeShopper,
            "PresentToShopper" => ResultCode::PresentToShopper,
            "AuthenticationFinished" => ResultCode::AuthenticationFinished,
            "AuthenticationNotRequired" => ResultCode::AuthenticationNotRequired,
            _ => ResultCode::Unknown(code),
        }
    }
}

impl From<ResultCode> for String {
    fn from(code: ResultCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse payment outcome shown to the shopper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
    Success,
    Pending,
    Failed,
    Error,
}

impl PaymentOutcome {
    pub fn from_result_code(code: Option<&ResultCode>) -> Self {
        code.map(ResultCode::outcome).unwrap_or(PaymentOutcome::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentOutcome::Success => "success",
            PaymentOutcome::Pending => "pending",
            PaymentOutcome::Failed => "failed",
            PaymentOutcome::Error => "error",
        }
    }
}

/// `/payments` and `/payments/details` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_code: Option<ResultCode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psp_reference: Option<String>,

    /// Follow-up action for the Drop-in (redirect, 3DS2 challenge, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal_reason: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentResponse {
    pub fn is_authorised(&self) -> bool {
        self.result_code == Some(ResultCode::Authorised)
    }
}

/// `/payments/details` request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetailsRequest {
    #[serde(default)]
    pub details: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_data: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentDetailsRequest {
    /// Details request completing a redirect-based 3DS2 challenge
    pub fn from_redirect_result(redirect_result: impl Into<String>) -> Self {
        Self::with_detail("redirectResult", redirect_result.into())
    }

    /// Details request carrying a legacy `payload` parameter
    pub fn from_payload(payload: impl Into<String>) -> Self {
        Self::with_detail("payload", payload.into())
    }

    fn with_detail(key: &str, value: String) -> Self {
        let mut details = Map::new();
        details.insert(key.to_string(), Value::String(value));
        Self {
            details,
            ..Self::default()
        }
    }
}

/// `/paymentMethods` request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodsRequest {
    pub merchant_account: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
}

impl PaymentMethodsRequest {
    pub fn new(merchant_account: impl Into<String>) -> Self {
        Self {
            merchant_account: merchant_account.into(),
            country_code: None,
            channel: None,
            amount: None,
        }
    }
}

/// `/paymentMethods` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodsResponse {
    #[serde(default)]
    pub payment_methods: Vec<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stored_payment_methods: Vec<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
