//! Cart state and its transitions.

use common::{ItemId, Money};
use serde::{Deserialize, Serialize};

use crate::store::PersistedState;

use super::draft::{OrderDraft, OrderLine, OrderProgress};
use super::item::{CartLineItem, CatalogEntity};

/// Cart contents plus the staged order draft.
///
/// Every transition takes `&self` and returns the next snapshot; nothing is
/// mutated in place. Unknown ids are no-ops, never errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    items: Vec<CartLineItem>,

    #[serde(default)]
    place_order: OrderDraft,
}

impl PersistedState for Cart {
    fn storage_key() -> &'static str {
        "data-storage"
    }

    fn schema_version() -> u32 {
        1
    }

    fn rehydrated(self) -> Self {
        Self {
            items: self
                .items
                .into_iter()
                .filter(|item| item.quantity > 0)
                .collect(),
            place_order: self.place_order,
        }
    }
}

// Query methods
impl Cart {
    /// Creates a cart holding the given line items.
    pub fn with_items(items: Vec<CartLineItem>) -> Self {
        Self {
            items,
            place_order: OrderDraft::default(),
        }
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Returns the staged order draft.
    pub fn place_order(&self) -> &OrderDraft {
        &self.place_order
    }

    /// Returns the first line item with the given id.
    pub fn get_item(&self, id: &ItemId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Returns true if any line item has the given id.
    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }

    /// Returns the number of line items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity across all line items.
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of price * quantity over all line items, recomputed on every call.
    pub fn total_amount(&self) -> Money {
        self.items.iter().map(CartLineItem::total_price).sum()
    }
}

// Transitions (return the next snapshot)
impl Cart {
    /// Appends a line item with quantity 1.
    ///
    /// No duplicate check is made; use [`Cart::toggle`] or [`Cart::contains`]
    /// to decide between adding and removing.
    #[must_use]
    pub fn add_item(&self, entity: &CatalogEntity) -> Self {
        let mut items = self.items.clone();
        items.push(CartLineItem::from_entity(entity));
        self.with_new_items(items)
    }

    /// Removes every line item with the given id.
    #[must_use]
    pub fn remove_item(&self, id: &ItemId) -> Self {
        let items = self
            .items
            .iter()
            .filter(|item| &item.id != id)
            .cloned()
            .collect();
        self.with_new_items(items)
    }

    /// Removes the entity if it is in the cart, adds it otherwise.
    #[must_use]
    pub fn toggle(&self, entity: &CatalogEntity) -> Self {
        if self.contains(&entity.id) {
            self.remove_item(&entity.id)
        } else {
            self.add_item(entity)
        }
    }

    /// Increments the quantity of matching line items by one.
    #[must_use]
    pub fn increase_quantity(&self, id: &ItemId) -> Self {
        let items = self
            .items
            .iter()
            .map(|item| {
                if &item.id == id {
                    CartLineItem {
                        quantity: item.quantity.saturating_add(1),
                        ..item.clone()
                    }
                } else {
                    item.clone()
                }
            })
            .collect();
        self.with_new_items(items)
    }

    /// Decrements the quantity of matching line items by one, dropping
    /// those that reach zero.
    #[must_use]
    pub fn decrease_quantity(&self, id: &ItemId) -> Self {
        let items = self
            .items
            .iter()
            .filter_map(|item| {
                if &item.id != id {
                    return Some(item.clone());
                }
                let quantity = item.quantity.saturating_sub(1);
                (quantity > 0).then(|| CartLineItem {
                    quantity,
                    ..item.clone()
                })
            })
            .collect();
        self.with_new_items(items)
    }

    /// Stages an order draft from the current line items.
    #[must_use]
    pub fn generate_place_order(
        &self,
        phone_number: impl Into<String>,
        where_to_send: impl Into<String>,
    ) -> Self {
        let lines = self
            .items
            .iter()
            .map(|item| OrderLine::new(item.id.clone(), item.kind.line_kind(), item.quantity))
            .collect();

        Self {
            items: self.items.clone(),
            place_order: OrderDraft {
                items: lines,
                phone_number: phone_number.into(),
                where_to_send: where_to_send.into(),
                progress: OrderProgress::Pending,
            },
        }
    }

    /// Empties the line items. The staged draft is kept.
    #[must_use]
    pub fn clear_cart(&self) -> Self {
        self.with_new_items(Vec::new())
    }

    /// Resets the staged draft to its empty shape.
    #[must_use]
    pub fn reset_place_order(&self) -> Self {
        Self {
            items: self.items.clone(),
            place_order: OrderDraft::default(),
        }
    }

    fn with_new_items(&self, items: Vec<CartLineItem>) -> Self {
        Self {
            items,
            place_order: self.place_order.clone(),
        }
    }
}
