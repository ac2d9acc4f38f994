//! Order drafts: the cart transformed into the submission payload.

use common::ItemId;
use serde::{Deserialize, Serialize};

use super::item::LineKind;

/// Progress of an order as tracked by the server.
///
/// ```text
/// pending ──┬──► accepted ──► done
///           └──► declined
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderProgress {
    /// Submitted and waiting for the shop. Every draft starts here.
    #[default]
    Pending,

    Accepted,

    Declined,

    /// Delivered (terminal state).
    Done,
}

impl OrderProgress {
    /// Returns true while the order is still being handled, which blocks
    /// placing another one.
    pub fn blocks_new_order(&self) -> bool {
        matches!(self, OrderProgress::Pending | OrderProgress::Accepted)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderProgress::Declined | OrderProgress::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderProgress::Pending => "pending",
            OrderProgress::Accepted => "accepted",
            OrderProgress::Declined => "declined",
            OrderProgress::Done => "done",
        }
    }
}

impl std::fmt::Display for OrderProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to one cart line inside an order draft.
///
/// Serialized the way the order API expects it: `{"product": id, "quantity": n}`
/// or `{"package": id, "quantity": n}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "OrderLineRepr", from = "OrderLineRepr")]
pub struct OrderLine {
    pub reference: ItemId,
    pub kind: LineKind,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(reference: impl Into<ItemId>, kind: LineKind, quantity: u32) -> Self {
        Self {
            reference: reference.into(),
            kind,
            quantity,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum OrderLineRepr {
    Product { product: ItemId, quantity: u32 },
    Package { package: ItemId, quantity: u32 },
}

impl From<OrderLine> for OrderLineRepr {
    fn from(line: OrderLine) -> Self {
        match line.kind {
            LineKind::Product => OrderLineRepr::Product {
                product: line.reference,
                quantity: line.quantity,
            },
            LineKind::Package => OrderLineRepr::Package {
                package: line.reference,
                quantity: line.quantity,
            },
        }
    }
}

impl From<OrderLineRepr> for OrderLine {
    fn from(repr: OrderLineRepr) -> Self {
        match repr {
            OrderLineRepr::Product { product, quantity } => {
                OrderLine::new(product, LineKind::Product, quantity)
            }
            OrderLineRepr::Package { package, quantity } => {
                OrderLine::new(package, LineKind::Package, quantity)
            }
        }
    }
}

/// The order submission payload staged from the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub items: Vec<OrderLine>,
    pub phone_number: String,
    pub where_to_send: String,
    pub progress: OrderProgress,
}

impl OrderDraft {
    /// Returns true for the empty initial draft.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.phone_number.is_empty() && self.where_to_send.is_empty()
    }
}
