//! # Notification Types
//!
//! Webhook notification envelope as delivered by the processor, plus the
//! `SignatureValidator` seam used to authenticate individual items.
//!
//! Wire format:
//!
//! ```json
//! {
//!   "live": "false",
//!   "notificationItems": [
//!     { "NotificationRequestItem": { "eventCode": "AUTHORISATION", "success": "true", ... } }
//!   ]
//! }
//! ```

use crate::error::{WorkshopError, WorkshopResult};
use crate::payment::Amount;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// `additionalData` key carrying the item's HMAC signature
pub const HMAC_SIGNATURE_KEY: &str = "hmacSignature";

/// `additionalData` key carrying the shopper reference of a recurring contract
pub const SHOPPER_REFERENCE_KEY: &str = "recurring.shopperReference";

/// `additionalData` key carrying the recurring detail reference (the token)
pub const RECURRING_DETAIL_REFERENCE_KEY: &str = "recurring.recurringDetailReference";

/// Top-level notification envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    /// Whether the notification originates from the live platform
    #[serde(default, with = "flexible_bool")]
    pub live: bool,

    /// Notification items; only the first one is processed
    #[serde(default)]
    pub notification_items: Vec<NotificationItemContainer>,
}

impl NotificationRequest {
    /// Parse a raw webhook body
    pub fn from_json(payload: &[u8]) -> WorkshopResult<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| WorkshopError::MalformedPayload(e.to_string()))
    }

    /// First notification item, if any
    pub fn first_item(&self) -> Option<&NotificationRequestItem> {
        self.notification_items.first().map(|c| &c.item)
    }
}

/// Wrapper object around each item in `notificationItems`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationItemContainer {
    #[serde(rename = "NotificationRequestItem")]
    pub item: NotificationRequestItem,
}

/// A single notification event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequestItem {
    /// String values only; see `check_additional_data`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,

    pub event_code: EventCode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_account_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psp_reference: Option<String>,

    /// Failure reason (present when `success` is false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, with = "flexible_bool")]
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<String>,
}

impl NotificationRequestItem {
    /// Look up a string value in `additionalData`
    pub fn additional(&self, key: &str) -> Option<&str> {
        self.additional_data
            .as_ref()
            .and_then(|data| data.get(key))
            .and_then(Value::as_str)
    }

    /// Ensure every `additionalData` value is a string.
    ///
    /// # Errors
    /// `Internal` naming the first offending key.
    pub fn check_additional_data(&self) -> WorkshopResult<()> {
        let Some(data) = &self.additional_data else {
            return Ok(());
        };

        match data.iter().find(|(_, value)| !value.is_string()) {
            Some((key, value)) => Err(WorkshopError::Internal(format!(
                "malformed additionalData: {} is not a string ({})",
                key, value
            ))),
            None => Ok(()),
        }
    }

    pub fn hmac_signature(&self) -> Option<&str> {
        self.additional(HMAC_SIGNATURE_KEY)
    }

    pub fn shopper_reference(&self) -> Option<&str> {
        self.additional(SHOPPER_REFERENCE_KEY)
    }

    pub fn recurring_detail_reference(&self) -> Option<&str> {
        self.additional(RECURRING_DETAIL_REFERENCE_KEY)
    }
}

/// Notification event codes we branch on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventCode {
    /// Payment authorisation result
    Authorisation,
    /// Recurring token created for a shopper
    RecurringContract,
    /// Anything else (passthrough)
    Other(String),
}

impl EventCode {
    pub fn as_str(&self) -> &str {
        match self {
            EventCode::Authorisation => "AUTHORISATION",
            EventCode::RecurringContract => "RECURRING_CONTRACT",
            EventCode::Other(code) => code,
        }
    }
}

impl From<String> for EventCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "AUTHORISATION" => EventCode::Authorisation,
            "RECURRING_CONTRACT" => EventCode::RecurringContract,
            _ => EventCode::Other(code),
        }
    }
}

impl From<EventCode> for String {
    fn from(code: EventCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verifies the signature embedded in a notification item.
///
/// The canonical field order and encoding belong to the processor; this
/// trait only exposes the verdict.
pub trait SignatureValidator: Send + Sync {
    /// `Ok(true)` if the signature matches, `Ok(false)` if it does not or is
    /// missing, `Err` if the validator itself cannot run.
    fn validate(&self, item: &NotificationRequestItem) -> WorkshopResult<bool>;
}

/// Booleans arrive either as JSON booleans or as `"true"`/`"false"` strings.
mod flexible_bool {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match BoolOrString::deserialize(deserializer)? {
            BoolOrString::Bool(b) => Ok(b),
            BoolOrString::Str(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            BoolOrString::Str(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            BoolOrString::Str(other) => Err(de::Error::custom(format!(
                "expected boolean, got {:?}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_envelope() {
        let payload = json!({
            "live": "false",
            "notificationItems": [{
                "NotificationRequestItem": {
                    "additionalData": {
                        "hmacSignature": "sig==",
                        "recurring.shopperReference": "shopper_a",
                        "recurring.recurringDetailReference": "tok_1"
                    },
                    "amount": { "currency": "EUR", "value": 0 },
                    "eventCode": "RECURRING_CONTRACT",
                    "merchantAccountCode": "WorkshopECOM",
                    "pspReference": "PSP123",
                    "paymentMethod": "visa",
                    "success": "true"
                }
            }]
        });

        let request = NotificationRequest::from_json(payload.to_string().as_bytes()).unwrap();
        assert!(!request.live);

        let item = request.first_item().unwrap();
        assert_eq!(item.event_code, EventCode::RecurringContract);
        assert!(item.success);
        assert_eq!(item.hmac_signature(), Some("sig=="));
        assert_eq!(item.shopper_reference(), Some("shopper_a"));
        assert_eq!(item.recurring_detail_reference(), Some("tok_1"));
        assert_eq!(item.amount.as_ref().map(|a| a.value), Some(0));
    }

    #[test]
    fn test_success_accepts_json_bool() {
        let payload = json!({
            "notificationItems": [{
                "NotificationRequestItem": { "eventCode": "AUTHORISATION", "success": false }
            }]
        });
        let request = NotificationRequest::from_json(payload.to_string().as_bytes()).unwrap();
        assert!(!request.first_item().unwrap().success);
    }

    #[test]
    fn test_empty_envelope_has_no_item() {
        let request = NotificationRequest::from_json(br#"{"notificationItems": []}"#).unwrap();
        assert!(request.first_item().is_none());
    }

    #[test]
    fn test_malformed_payload() {
        let err = NotificationRequest::from_json(b"not json").unwrap_err();
        assert!(matches!(err, WorkshopError::MalformedPayload(_)));
    }

    #[test]
    fn test_invalid_success_string_is_malformed() {
        let payload = br#"{"notificationItems":[{"NotificationRequestItem":{"eventCode":"AUTHORISATION","success":"maybe"}}]}"#;
        assert!(NotificationRequest::from_json(payload).is_err());
    }

    #[test]
    fn test_non_string_additional_data_parses_but_fails_check() {
        let payload = json!({
            "notificationItems": [{
                "NotificationRequestItem": {
                    "additionalData": { "hmacSignature": "x", "n": 1 },
                    "eventCode": "AUTHORISATION",
                    "success": "true"
                }
            }]
        });

        let request = NotificationRequest::from_json(payload.to_string().as_bytes()).unwrap();
        let item = request.first_item().unwrap();
        assert_eq!(item.hmac_signature(), Some("x"));

        let err = item.check_additional_data().unwrap_err();
        assert!(matches!(err, WorkshopError::Internal(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_string_additional_data_passes_check() {
        let item: NotificationRequestItem = serde_json::from_value(json!({
            "additionalData": { "hmacSignature": "x", "recurring.shopperReference": "s" },
            "eventCode": "AUTHORISATION"
        }))
        .unwrap();
        assert!(item.check_additional_data().is_ok());

        let bare: NotificationRequestItem =
            serde_json::from_value(json!({ "eventCode": "AUTHORISATION" })).unwrap();
        assert!(bare.check_additional_data().is_ok());
    }

    #[test]
    fn test_unknown_event_code() {
        let code = EventCode::from("REFUND".to_string());
        assert_eq!(code, EventCode::Other("REFUND".to_string()));
        assert_eq!(code.to_string(), "REFUND");
    }
}
