//! The persisted cart store.

use common::{ItemId, Money};
use storage::StateStorage;

use crate::error::DomainError;
use crate::store::Store;

use super::{Cart, CartLineItem, CatalogEntity, OrderDraft};

/// Cart state bound to a storage backend.
pub type CartStore<S> = Store<Cart, S>;

fn record_mutation(op: &'static str) {
    metrics::counter!("cart_mutations_total", "op" => op).increment(1);
}

impl<S: StateStorage> Store<Cart, S> {
    pub fn items(&self) -> &[CartLineItem] {
        self.state().items()
    }

    /// Returns the staged order draft.
    pub fn place_order(&self) -> &OrderDraft {
        self.state().place_order()
    }

    /// Returns the current cart total.
    pub fn total_amount(&self) -> Money {
        self.state().total_amount()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.state().contains(id)
    }

    /// Adds a catalog entity with quantity 1.
    #[tracing::instrument(skip(self, entity), fields(item_id = %entity.id))]
    pub fn add_item(&mut self, entity: &CatalogEntity) -> Result<&Cart, DomainError> {
        record_mutation("add_item");
        self.commit(|cart| cart.add_item(entity))
    }

    /// Removes every line item with the given id.
    #[tracing::instrument(skip(self, id), fields(item_id = %id))]
    pub fn remove_item(&mut self, id: &ItemId) -> Result<&Cart, DomainError> {
        record_mutation("remove_item");
        self.commit(|cart| cart.remove_item(id))
    }

    /// Adds the entity when absent, removes it when present.
    #[tracing::instrument(skip(self, entity), fields(item_id = %entity.id))]
    pub fn toggle(&mut self, entity: &CatalogEntity) -> Result<&Cart, DomainError> {
        record_mutation("toggle");
        self.commit(|cart| cart.toggle(entity))
    }

    #[tracing::instrument(skip(self, id), fields(item_id = %id))]
    pub fn increase_quantity(&mut self, id: &ItemId) -> Result<&Cart, DomainError> {
        record_mutation("increase_quantity");
        self.commit(|cart| cart.increase_quantity(id))
    }

    /// Decrements the quantity, removing the line when it reaches zero.
    #[tracing::instrument(skip(self, id), fields(item_id = %id))]
    pub fn decrease_quantity(&mut self, id: &ItemId) -> Result<&Cart, DomainError> {
        record_mutation("decrease_quantity");
        self.commit(|cart| cart.decrease_quantity(id))
    }

    /// Stages the order draft so it can be read back for submission.
    #[tracing::instrument(skip(self, phone_number, where_to_send))]
    pub fn generate_place_order(
        &mut self,
        phone_number: &str,
        where_to_send: &str,
    ) -> Result<&OrderDraft, DomainError> {
        record_mutation("generate_place_order");
        let cart = self.commit(|cart| cart.generate_place_order(phone_number, where_to_send))?;
        Ok(cart.place_order())
    }

    #[tracing::instrument(skip(self))]
    pub fn clear_cart(&mut self) -> Result<&Cart, DomainError> {
        record_mutation("clear_cart");
        self.commit(Cart::clear_cart)
    }

    #[tracing::instrument(skip(self))]
    pub fn reset_place_order(&mut self) -> Result<&Cart, DomainError> {
        record_mutation("reset_place_order");
        self.commit(Cart::reset_place_order)
    }
}
