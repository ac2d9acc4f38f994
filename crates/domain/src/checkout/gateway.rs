//! The order gateway: where drafts are submitted and history is read.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{OrderDraft, OrderProgress};

/// Errors reported by an order gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with an error status.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The server requires a logged-in user.
    #[error("Not authenticated")]
    Unauthorized,
}

/// What the server returns for an accepted order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub progress: OrderProgress,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A product or package as embedded in a history line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedEntity {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
}

/// One line of a past order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<OrderedEntity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<OrderedEntity>,

    pub quantity: u32,
}

impl OrderedLine {
    /// Returns the ordered product or package.
    pub fn entity(&self) -> Option<&OrderedEntity> {
        self.product.as_ref().or(self.package.as_ref())
    }
}

/// An order from the user's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub items: Vec<OrderedLine>,

    #[serde(default)]
    pub phone_number: String,

    #[serde(default)]
    pub where_to_send: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Money>,

    pub progress: OrderProgress,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<DateTime<Utc>>,
}

/// Trait for the order-submission boundary.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submits an order draft.
    async fn submit_order(&self, draft: &OrderDraft) -> Result<OrderConfirmation, GatewayError>;

    /// Returns the user's orders, most recent first.
    async fn order_history(&self) -> Result<Vec<OrderRecord>, GatewayError>;
}

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    history: Vec<OrderRecord>,
    submitted: Vec<OrderDraft>,
    next_id: u32,
    fail_on_submit: bool,
}

/// In-memory order gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryOrderGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to reject submissions.
    pub fn set_fail_on_submit(&self, fail: bool) {
        if let Ok(mut state) = self.state.write() {
            state.fail_on_submit = fail;
        }
    }

    /// Changes the progress of a recorded order, as the shop would.
    pub fn set_progress(&self, order_id: &str, progress: OrderProgress) {
        if let Ok(mut state) = self.state.write()
            && let Some(order) = state.history.iter_mut().find(|o| o.id == order_id)
        {
            order.progress = progress;
        }
    }

    /// Returns every draft that was accepted.
    pub fn submitted(&self) -> Vec<OrderDraft> {
        self.state
            .read()
            .map(|state| state.submitted.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl OrderGateway for InMemoryOrderGateway {
    async fn submit_order(&self, draft: &OrderDraft) -> Result<OrderConfirmation, GatewayError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| GatewayError::Transport("gateway state poisoned".to_string()))?;

        if state.fail_on_submit {
            return Err(GatewayError::Rejected {
                status: 400,
                message: "Failed to place order.".to_string(),
            });
        }

        state.next_id += 1;
        let id = format!("ORD-{:04}", state.next_id);

        let record = OrderRecord {
            id: id.clone(),
            items: Vec::new(),
            phone_number: draft.phone_number.clone(),
            where_to_send: draft.where_to_send.clone(),
            total_amount: None,
            progress: draft.progress,
            order_date: Some(Utc::now()),
        };
        state.history.insert(0, record);
        state.submitted.push(draft.clone());

        Ok(OrderConfirmation {
            id: Some(id),
            progress: draft.progress,
            message: None,
        })
    }

    async fn order_history(&self) -> Result<Vec<OrderRecord>, GatewayError> {
        let state = self
            .state
            .read()
            .map_err(|_| GatewayError::Transport("gateway state poisoned".to_string()))?;
        Ok(state.history.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_record_parses_populated_lines() {
        let raw = r#"{
            "_id": "o1",
            "items": [
                {"_id": "l1", "product": {"_id": "p1", "name": "Soup", "price": 4}, "quantity": 2},
                {"_id": "l2", "package": {"_id": "k1", "name": "Box", "price": 12.5}, "quantity": 1}
            ],
            "phoneNumber": "0123",
            "whereToSend": "Main St",
            "totalAmount": 20.5,
            "progress": "accepted",
            "orderDate": "2024-05-01T10:00:00Z"
        }"#;

        let record: OrderRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.progress, OrderProgress::Accepted);
        assert_eq!(record.items[0].entity().unwrap().name, "Soup");
        assert_eq!(record.items[1].entity().unwrap().price, Some(Money::from_cents(1250)));
        assert_eq!(record.total_amount, Some(Money::from_cents(2050)));
        assert!(record.order_date.is_some());
    }

    #[tokio::test]
    async fn in_memory_gateway_records_latest_first() {
        let gateway = InMemoryOrderGateway::new();
        let draft = OrderDraft::default();

        let first = gateway.submit_order(&draft).await.unwrap();
        let second = gateway.submit_order(&draft).await.unwrap();

        let history = gateway.order_history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(Some(history[0].id.clone()), second.id);
        assert_eq!(Some(history[1].id.clone()), first.id);
    }

    #[tokio::test]
    async fn in_memory_gateway_can_fail() {
        let gateway = InMemoryOrderGateway::new();
        gateway.set_fail_on_submit(true);

        let result = gateway.submit_order(&OrderDraft::default()).await;
        assert!(matches!(result, Err(GatewayError::Rejected { status: 400, .. })));
        assert!(gateway.submitted().is_empty());
    }
}
