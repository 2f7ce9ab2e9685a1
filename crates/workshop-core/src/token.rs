//! # Stored Tokens
//!
//! Recurring payment tokens created by `RECURRING_CONTRACT` notifications
//! and removed again by the admin disable flow.
//!
//! The store sits behind the `TokenStore` trait so a database-backed
//! implementation can replace the in-memory one without touching handlers.

use crate::error::{WorkshopError, WorkshopResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A stored recurring token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredToken {
    /// Recurring detail reference issued by the processor
    pub token_id: String,

    /// Payment method label (e.g. "visa", "mc")
    pub payment_method: String,

    /// Shopper reference the token belongs to
    pub shopper_reference: String,

    /// When the token was stored
    pub created_at: DateTime<Utc>,
}

impl StoredToken {
    pub fn new(
        token_id: impl Into<String>,
        payment_method: impl Into<String>,
        shopper_reference: impl Into<String>,
    ) -> Self {
        Self {
            token_id: token_id.into(),
            payment_method: payment_method.into(),
            shopper_reference: shopper_reference.into(),
            created_at: Utc::now(),
        }
    }
}

/// Capability interface over token persistence.
///
/// `add` and `remove` must each be atomic with respect to each other.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Insert a token, replacing any existing entry with the same token id.
    async fn add(&self, token: StoredToken) -> WorkshopResult<()>;

    /// Remove the token owned by `shopper_reference`.
    ///
    /// Returns `WorkshopError::TokenNotFound` if no such entry exists.
    async fn remove(&self, token_id: &str, shopper_reference: &str) -> WorkshopResult<StoredToken>;

    /// All stored tokens, ordered by token id.
    async fn list(&self) -> WorkshopResult<Vec<StoredToken>>;
}

/// Shared handle to a token store
pub type SharedTokenStore = Arc<dyn TokenStore>;

/// In-memory token store
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<BTreeMap<String, StoredToken>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn add(&self, token: StoredToken) -> WorkshopResult<()> {
        let mut tokens = self.tokens.write().await;
        if tokens.insert(token.token_id.clone(), token).is_some() {
            debug!("Replaced existing token entry");
        }
        Ok(())
    }

    async fn remove(&self, token_id: &str, shopper_reference: &str) -> WorkshopResult<StoredToken> {
        let mut tokens = self.tokens.write().await;
        match tokens.get(token_id) {
            Some(existing) if existing.shopper_reference == shopper_reference => {}
            _ => {
                return Err(WorkshopError::TokenNotFound {
                    token_id: token_id.to_string(),
                })
            }
        }
        tokens
            .remove(token_id)
            .ok_or_else(|| WorkshopError::Internal("token vanished under write lock".to_string()))
    }

    async fn list(&self) -> WorkshopResult<Vec<StoredToken>> {
        Ok(self.tokens.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_and_list() {
        let store = InMemoryTokenStore::new();
        store
            .add(StoredToken::new("tok_1", "visa", "shopper_a"))
            .await
            .unwrap();
        store
            .add(StoredToken::new("tok_2", "mc", "shopper_a"))
            .await
            .unwrap();

        let tokens = store.list().await.unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token_id, "tok_1");
        assert_eq!(tokens[1].payment_method, "mc");
    }

    #[tokio::test]
    async fn test_add_upserts_by_token_id() {
        let store = InMemoryTokenStore::new();
        store
            .add(StoredToken::new("tok_1", "visa", "shopper_a"))
            .await
            .unwrap();
        store
            .add(StoredToken::new("tok_1", "mc", "shopper_a"))
            .await
            .unwrap();

        let tokens = store.list().await.unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].payment_method, "mc");
    }

    #[tokio::test]
    async fn test_remove() {
        let store = InMemoryTokenStore::new();
        store
            .add(StoredToken::new("tok_1", "visa", "shopper_a"))
            .await
            .unwrap();

        let removed = store.remove("tok_1", "shopper_a").await.unwrap();
        assert_eq!(removed.token_id, "tok_1");
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_token() {
        let store = InMemoryTokenStore::new();
        let err = store.remove("tok_missing", "shopper_a").await.unwrap_err();
        assert!(matches!(err, WorkshopError::TokenNotFound { .. }));
    }

    #[tokio::test]
    async fn test_remove_requires_matching_shopper() {
        let store = InMemoryTokenStore::new();
        store
            .add(StoredToken::new("tok_1", "visa", "shopper_a"))
            .await
            .unwrap();

        assert!(store.remove("tok_1", "shopper_b").await.is_err());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
