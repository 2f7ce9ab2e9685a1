//! # Notification HMAC Validation
//!
//! Adyen signs each notification item with HMAC-SHA256 over a colon-joined
//! list of item fields:
//!
//! ```text
//! pspReference:originalReference:merchantAccountCode:merchantReference:value:currency:eventCode:success
//! ```
//!
//! The key is the hex-encoded HMAC key from the Customer Area; the
//! signature travels base64-encoded in `additionalData.hmacSignature`.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use workshop_core::{NotificationRequestItem, SignatureValidator, WorkshopError, WorkshopResult};

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 validator for notification items
#[derive(Clone)]
pub struct HmacValidator {
    hmac_key: String,
}

impl HmacValidator {
    pub fn new(hmac_key: impl Into<String>) -> Self {
        Self {
            hmac_key: hmac_key.into(),
        }
    }

    /// Compute the base64 signature for an item
    pub fn calculate(&self, item: &NotificationRequestItem) -> WorkshopResult<String> {
        let key = hex::decode(&self.hmac_key).map_err(|e| {
            WorkshopError::SignatureValidation(format!("HMAC key is not valid hex: {}", e))
        })?;

        let mut mac = HmacSha256::new_from_slice(&key)
            .map_err(|e| WorkshopError::SignatureValidation(e.to_string()))?;
        mac.update(data_to_sign(item).as_bytes());

        Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for HmacValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacValidator").finish_non_exhaustive()
    }
}

impl SignatureValidator for HmacValidator {
    fn validate(&self, item: &NotificationRequestItem) -> WorkshopResult<bool> {
        let Some(received) = item.hmac_signature() else {
            debug!("Notification item carries no hmacSignature");
            return Ok(false);
        };

        let expected = self.calculate(item)?;
        Ok(constant_time_compare(received, &expected))
    }
}

/// Canonical signing string for a notification item
pub fn data_to_sign(item: &NotificationRequestItem) -> String {
    let value = item
        .amount
        .as_ref()
        .map(|a| a.value.to_string())
        .unwrap_or_default();
    let currency = item
        .amount
        .as_ref()
        .map(|a| a.currency.as_str())
        .unwrap_or_default();

    [
        item.psp_reference.as_deref().unwrap_or_default(),
        item.original_reference.as_deref().unwrap_or_default(),
        item.merchant_account_code.as_deref().unwrap_or_default(),
        item.merchant_reference.as_deref().unwrap_or_default(),
        value.as_str(),
        currency,
        item.event_code.as_str(),
        if item.success { "true" } else { "false" },
    ]
    .join(":")
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}
