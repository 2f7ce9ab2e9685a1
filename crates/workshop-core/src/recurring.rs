//! # Recurring Types
//!
//! Disabling stored tokens through the processor's Recurring API.

use serde::{Deserialize, Serialize};

/// `/disable` request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableRequest {
    pub merchant_account: String,
    pub shopper_reference: String,
    pub recurring_detail_reference: String,
}

impl DisableRequest {
    pub fn new(
        merchant_account: impl Into<String>,
        shopper_reference: impl Into<String>,
        recurring_detail_reference: impl Into<String>,
    ) -> Self {
        Self {
            merchant_account: merchant_account.into(),
            shopper_reference: shopper_reference.into(),
            recurring_detail_reference: recurring_detail_reference.into(),
        }
    }
}

/// `/disable` response, e.g. `{"response": "[detail-successfully-disabled]"}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisableResult {
    #[serde(default)]
    pub response: String,
}

impl DisableResult {
    pub fn is_disabled(&self) -> bool {
        self.response.contains("successfully-disabled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disable_result() {
        let result: DisableResult =
            serde_json::from_str(r#"{"response":"[detail-successfully-disabled]"}"#).unwrap();
        assert!(result.is_disabled());
        assert!(!DisableResult::default().is_disabled());
    }
}
