//! # Notification Webhook Handling
//!
//! Receives notification envelopes, authenticates the first item and
//! dispatches it to a `NotificationHandler`.
//!
//! ```text
//! Received → Parsed → { Verified | Rejected } → { Applied | Ignored | Logged }
//! ```
//!
//! Nothing is mutated unless the item's signature verified. Delivery retries
//! are the sender's concern; the receiver only acknowledges.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use workshop_core::{
    EventCode, NotificationRequest, NotificationRequestItem, SharedTokenStore, SignatureValidator,
    StoredToken, WorkshopError, WorkshopResult,
};

/// What happened to an acknowledged notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Envelope carried no items
    NoItems,
    /// A recurring token was stored
    TokenStored(StoredToken),
    /// Payment authorisation acknowledged
    Authorised { psp_reference: Option<String> },
    /// Event code (or shape) we do not act on
    Unexpected { event_code: String },
    /// The processor reported the operation as failed
    Failed { reason: Option<String> },
}

/// Notification event handler trait
///
/// Implement this trait to react to verified notification items. The
/// defaults only log.
#[allow(unused_variables)]
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    /// Called for a successful `RECURRING_CONTRACT` carrying both references
    async fn on_recurring_contract(
        &self,
        item: &NotificationRequestItem,
        token: &StoredToken,
    ) -> WorkshopResult<()> {
        info!(
            "Recurring authorized - recurringDetailReference {}",
            token.token_id
        );
        Ok(())
    }

    /// Called for a successful `AUTHORISATION`
    async fn on_authorisation(&self, item: &NotificationRequestItem) -> WorkshopResult<()> {
        info!("Payment authorized - pspReference {:?}", item.psp_reference);
        Ok(())
    }

    /// Called for any other successful event
    async fn on_unexpected_event(&self, item: &NotificationRequestItem) -> WorkshopResult<()> {
        warn!("Unexpected eventCode: {}", item.event_code);
        Ok(())
    }

    /// Called when `success` is false
    async fn on_failure(&self, item: &NotificationRequestItem) -> WorkshopResult<()> {
        info!("Operation has failed: {:?}", item.reason);
        Ok(())
    }
}

/// Default no-op notification handler (just logs events)
pub struct LoggingNotificationHandler;

impl NotificationHandler for LoggingNotificationHandler {}

/// Handler that persists recurring tokens to a `TokenStore`
pub struct TokenRegistrar {
    store: SharedTokenStore,
}

impl TokenRegistrar {
    pub fn new(store: SharedTokenStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NotificationHandler for TokenRegistrar {
    async fn on_recurring_contract(
        &self,
        _item: &NotificationRequestItem,
        token: &StoredToken,
    ) -> WorkshopResult<()> {
        info!(
            "Saving token {} ({}) for shopper {}",
            token.token_id, token.payment_method, token.shopper_reference
        );
        self.store.add(token.clone()).await
    }
}

/// Dispatch a verified notification item to the appropriate handler method
pub async fn dispatch_notification(
    handler: &dyn NotificationHandler,
    item: &NotificationRequestItem,
) -> WorkshopResult<WebhookOutcome> {
    if !item.success {
        handler.on_failure(item).await?;
        return Ok(WebhookOutcome::Failed {
            reason: item.reason.clone(),
        });
    }

    match &item.event_code {
        EventCode::RecurringContract => {
            match (item.recurring_detail_reference(), item.shopper_reference()) {
                (Some(detail), Some(shopper)) => {
                    let token = StoredToken::new(
                        detail,
                        item.payment_method.clone().unwrap_or_default(),
                        shopper,
                    );
                    handler.on_recurring_contract(item, &token).await?;
                    Ok(WebhookOutcome::TokenStored(token))
                }
                _ => {
                    debug!("RECURRING_CONTRACT without recurring references");
                    handler.on_unexpected_event(item).await?;
                    Ok(WebhookOutcome::Unexpected {
                        event_code: item.event_code.to_string(),
                    })
                }
            }
        }
        EventCode::Authorisation => {
            handler.on_authorisation(item).await?;
            Ok(WebhookOutcome::Authorised {
                psp_reference: item.psp_reference.clone(),
            })
        }
        EventCode::Other(code) => {
            handler.on_unexpected_event(item).await?;
            Ok(WebhookOutcome::Unexpected {
                event_code: code.clone(),
            })
        }
    }
}

/// Parses, verifies and dispatches notification envelopes
#[derive(Clone)]
pub struct WebhookReceiver {
    validator: Arc<dyn SignatureValidator>,
    handler: Arc<dyn NotificationHandler>,
}

impl WebhookReceiver {
    pub fn new(
        validator: Arc<dyn SignatureValidator>,
        handler: Arc<dyn NotificationHandler>,
    ) -> Self {
        Self { validator, handler }
    }

    /// Process a raw webhook body.
    ///
    /// # Errors
    /// * `MalformedPayload` - the body is not a notification envelope
    /// * `Internal` - the first item's `additionalData` holds non-string values
    /// * `SignatureInvalid` - the first item failed HMAC verification
    /// * anything the validator or handler raises
    pub async fn receive(&self, payload: &[u8]) -> WorkshopResult<WebhookOutcome> {
        let request = NotificationRequest::from_json(payload)?;

        let Some(item) = request.first_item() else {
            debug!("Notification envelope has no items");
            return Ok(WebhookOutcome::NoItems);
        };

        item.check_additional_data().map_err(|e| {
            error!("Rejecting webhook item: {}", e);
            e
        })?;

        let verified = self.validator.validate(item).map_err(|e| {
            error!("Error while validating HMAC Key: {}", e);
            e
        })?;

        if !verified {
            warn!(
                "Could not validate HMAC signature for incoming webhook message: eventCode={}, pspReference={:?}",
                item.event_code, item.psp_reference
            );
            return Err(WorkshopError::SignatureInvalid(format!(
                "HMAC mismatch for pspReference {}",
                item.psp_reference.as_deref().unwrap_or("unknown")
            )));
        }

        info!(
            "Received webhook success:{} eventCode:{}",
            item.success, item.event_code
        );

        dispatch_notification(self.handler.as_ref(), item).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::HmacValidator;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, Ordering};
    use workshop_core::{InMemoryTokenStore, TokenStore};

    const KEY: &str = "44782DEF547AAA06C910C43932B1EB0C71FC68D9D0C057550C48EC2ACF6BA056";

    fn setup() -> (WebhookReceiver, Arc<InMemoryTokenStore>) {
        let store = Arc::new(InMemoryTokenStore::new());
        let receiver = WebhookReceiver::new(
            Arc::new(HmacValidator::new(KEY)),
            Arc::new(TokenRegistrar::new(store.clone())),
        );
        (receiver, store)
    }

    /// Builds an envelope whose single item is signed with `KEY`
    fn signed_envelope(mut item: Value) -> Vec<u8> {
        let parsed: NotificationRequestItem = serde_json::from_value(item.clone()).unwrap();
        let signature = HmacValidator::new(KEY).calculate(&parsed).unwrap();
        if item.get("additionalData").is_none() {
            item["additionalData"] = json!({});
        }
        item["additionalData"]["hmacSignature"] = json!(signature);
        envelope(item)
    }

    fn envelope(item: Value) -> Vec<u8> {
        json!({
            "live": "false",
            "notificationItems": [{ "NotificationRequestItem": item }]
        })
        .to_string()
        .into_bytes()
    }

    fn recurring_contract() -> Value {
        json!({
            "additionalData": {
                "recurring.shopperReference": "shopper_a",
                "recurring.recurringDetailReference": "tok_1"
            },
            "amount": { "currency": "EUR", "value": 0 },
            "eventCode": "RECURRING_CONTRACT",
            "merchantAccountCode": "WorkshopECOM",
            "merchantReference": "order-1",
            "pspReference": "PSP1",
            "paymentMethod": "visa",
            "success": "true"
        })
    }

    #[tokio::test]
    async fn test_empty_envelope_is_noop() {
        let (receiver, store) = setup();
        let outcome = receiver
            .receive(br#"{"live":"false","notificationItems":[]}"#)
            .await
            .unwrap();

        assert_eq!(outcome, WebhookOutcome::NoItems);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recurring_contract_stores_token() {
        let (receiver, store) = setup();
        let outcome = receiver
            .receive(&signed_envelope(recurring_contract()))
            .await
            .unwrap();

        let tokens = store.list().await.unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_id, "tok_1");
        assert_eq!(tokens[0].payment_method, "visa");
        assert_eq!(tokens[0].shopper_reference, "shopper_a");
        assert_eq!(outcome, WebhookOutcome::TokenStored(tokens[0].clone()));
    }

    #[tokio::test]
    async fn test_tampered_signature_is_rejected_without_mutation() {
        let (receiver, store) = setup();

        let mut payload: Value = serde_json::from_slice(&signed_envelope(recurring_contract())).unwrap();
        payload["notificationItems"][0]["NotificationRequestItem"]["pspReference"] = json!("PSP2");

        let err = receiver
            .receive(payload.to_string().as_bytes())
            .await
            .unwrap_err();

        assert!(matches!(err, WorkshopError::SignatureInvalid(_)));
        assert_eq!(err.status_code(), 422);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsigned_item_is_rejected() {
        let (receiver, store) = setup();
        let err = receiver
            .receive(&envelope(recurring_contract()))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkshopError::SignatureInvalid(_)));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_authorisation_does_not_mutate() {
        let (receiver, store) = setup();
        let outcome = receiver
            .receive(&signed_envelope(json!({
                "amount": { "currency": "EUR", "value": 9998 },
                "eventCode": "AUTHORISATION",
                "merchantAccountCode": "WorkshopECOM",
                "merchantReference": "order-2",
                "pspReference": "PSP2",
                "success": "true"
            })))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Authorised {
                psp_reference: Some("PSP2".to_string())
            }
        );
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_operation_is_logged_only() {
        let (receiver, store) = setup();
        let mut item = recurring_contract();
        item["success"] = json!("false");
        item["reason"] = json!("Refused");

        let outcome = receiver.receive(&signed_envelope(item)).await.unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Failed {
                reason: Some("Refused".to_string())
            }
        );
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unexpected_event_code() {
        let (receiver, store) = setup();
        let mut item = recurring_contract();
        item["eventCode"] = json!("REFUND");

        let outcome = receiver.receive(&signed_envelope(item)).await.unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Unexpected {
                event_code: "REFUND".to_string()
            }
        );
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recurring_contract_without_references() {
        let (receiver, store) = setup();
        let mut item = recurring_contract();
        item["additionalData"] = json!({ "recurring.shopperReference": "shopper_a" });

        let outcome = receiver.receive(&signed_envelope(item)).await.unwrap();

        assert!(matches!(outcome, WebhookOutcome::Unexpected { .. }));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let (receiver, _store) = setup();
        let err = receiver.receive(b"{\"notificationItems\": 42}").await.unwrap_err();
        assert!(matches!(err, WorkshopError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_non_string_additional_data_is_internal() {
        let (receiver, store) = setup();
        let mut item = recurring_contract();
        item["additionalData"]["recurring.recurringDetailReference"] = json!(42);
        item["additionalData"]["hmacSignature"] = json!("c2lnbmF0dXJl");

        let err = receiver.receive(&envelope(item)).await.unwrap_err();

        assert!(matches!(err, WorkshopError::Internal(_)));
        assert_eq!(err.status_code(), 500);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validator_error_is_internal() {
        let store = Arc::new(InMemoryTokenStore::new());
        let receiver = WebhookReceiver::new(
            Arc::new(HmacValidator::new("not-hex")),
            Arc::new(TokenRegistrar::new(store.clone())),
        );

        let mut item = recurring_contract();
        item["additionalData"]["hmacSignature"] = json!("c2lnbmF0dXJl");
        let err = receiver.receive(&envelope(item)).await.unwrap_err();

        assert_eq!(err.status_code(), 500);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_only_first_item_is_processed() {
        let (receiver, store) = setup();

        let first: Value = serde_json::from_slice(&signed_envelope(json!({
            "eventCode": "AUTHORISATION",
            "pspReference": "PSP3",
            "success": "true"
        })))
        .unwrap();
        let second: Value = serde_json::from_slice(&signed_envelope(recurring_contract())).unwrap();

        let payload = json!({
            "live": "false",
            "notificationItems": [
                first["notificationItems"][0].clone(),
                second["notificationItems"][0].clone()
            ]
        });

        let outcome = receiver.receive(payload.to_string().as_bytes()).await.unwrap();
        assert!(matches!(outcome, WebhookOutcome::Authorised { .. }));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_notification() {
        struct TestHandler {
            called: AtomicBool,
        }

        #[async_trait]
        impl NotificationHandler for TestHandler {
            async fn on_authorisation(&self, _item: &NotificationRequestItem) -> WorkshopResult<()> {
                self.called.store(true, Ordering::SeqCst);
                Ok(())
            }
        }

        let handler = TestHandler {
            called: AtomicBool::new(false),
        };

        let item: NotificationRequestItem = serde_json::from_value(json!({
            "eventCode": "AUTHORISATION",
            "success": true
        }))
        .unwrap();

        dispatch_notification(&handler, &item).await.unwrap();
        assert!(handler.called.load(Ordering::SeqCst));

        let outcome = dispatch_notification(&LoggingNotificationHandler, &item)
            .await
            .unwrap();
        assert!(matches!(outcome, WebhookOutcome::Authorised { .. }));
    }
}
