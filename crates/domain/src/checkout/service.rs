//! Placing an order from the cart.

use storage::StateStorage;
use thiserror::Error;

use crate::cart::{CartStore, OrderProgress};
use crate::error::DomainError;
use crate::validation::{DeliveryDetails, ValidationErrors};

use super::{GatewayError, OrderConfirmation, OrderGateway};

/// Errors that stop an order from being placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing in the cart to order.
    #[error("Cart is empty")]
    EmptyCart,

    /// The user's latest order is still being handled.
    #[error("An order is already {progress}; wait before placing a new one")]
    OrderInProgress { progress: OrderProgress },

    /// Delivery details are incomplete.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The gateway failed or rejected the order.
    #[error("Order submission failed: {0}")]
    Gateway(#[from] GatewayError),

    /// The cart could not be persisted.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Service that turns the cart into a submitted order.
pub struct CheckoutService<G: OrderGateway> {
    gateway: G,
}

impl<G: OrderGateway> CheckoutService<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Returns the progress of the user's most recent order, if any.
    pub async fn latest_order_progress(&self) -> Result<Option<OrderProgress>, GatewayError> {
        let history = self.gateway.order_history().await?;
        Ok(history.first().map(|order| order.progress))
    }

    /// Checks whether a new order may be placed right now.
    ///
    /// Fails while the latest order is pending or accepted.
    pub async fn ensure_can_order(&self) -> Result<(), CheckoutError> {
        match self.latest_order_progress().await? {
            Some(progress) if progress.blocks_new_order() => {
                metrics::counter!("orders_rejected_total", "reason" => "in_progress").increment(1);
                Err(CheckoutError::OrderInProgress { progress })
            }
            _ => Ok(()),
        }
    }

    /// Stages the draft from the cart and submits it.
    ///
    /// On success the cart is cleared and the draft reset. On failure the
    /// cart is left as it was; the staged draft is kept so the caller can
    /// retry.
    #[tracing::instrument(skip(self, cart, details), fields(lines = cart.items().len()))]
    pub async fn place_order<S: StateStorage>(
        &self,
        cart: &mut CartStore<S>,
        details: &DeliveryDetails,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if cart.items().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        self.ensure_can_order().await?;
        details.validate()?;

        let draft = cart
            .generate_place_order(&details.phone_number, &details.where_to_send)?
            .clone();

        let confirmation = match self.gateway.submit_order(&draft).await {
            Ok(confirmation) => confirmation,
            Err(e) => {
                metrics::counter!("orders_rejected_total", "reason" => "gateway").increment(1);
                tracing::warn!(error = %e, "order submission failed");
                return Err(e.into());
            }
        };

        metrics::counter!("orders_submitted_total").increment(1);
        tracing::info!(order_id = ?confirmation.id, total = %cart.total_amount(), "order placed");

        cart.clear_cart()?;
        cart.reset_place_order()?;

        Ok(confirmation)
    }
}

#[cfg(test)]
mod tests {
    use common::Money;
    use storage::InMemoryStorage;

    use super::*;
    use crate::cart::CatalogEntity;
    use crate::checkout::InMemoryOrderGateway;

    fn cart_with_soup() -> CartStore<InMemoryStorage> {
        let mut cart = CartStore::open(InMemoryStorage::new()).unwrap();
        cart.add_item(&CatalogEntity::product("p1", "Soup", Money::from_dollars(4)))
            .unwrap();
        cart
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let service = CheckoutService::new(InMemoryOrderGateway::new());
        let mut cart = CartStore::open(InMemoryStorage::new()).unwrap();

        let result = service
            .place_order(&mut cart, &DeliveryDetails::new("1", "A"))
            .await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[tokio::test]
    async fn missing_details_are_rejected_before_staging() {
        let service = CheckoutService::new(InMemoryOrderGateway::new());
        let mut cart = cart_with_soup();

        let result = service
            .place_order(&mut cart, &DeliveryDetails::new("", "Main St"))
            .await;

        let Err(CheckoutError::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert!(errors.get("phoneNumber").is_some());
        assert!(cart.place_order().is_empty());
        assert!(service.gateway().submitted().is_empty());
    }

    #[tokio::test]
    async fn success_clears_cart_and_draft() {
        let service = CheckoutService::new(InMemoryOrderGateway::new());
        let mut cart = cart_with_soup();

        let confirmation = service
            .place_order(&mut cart, &DeliveryDetails::new("0123", "Main St"))
            .await
            .unwrap();

        assert!(confirmation.id.is_some());
        assert_eq!(confirmation.progress, OrderProgress::Pending);
        assert!(cart.items().is_empty());
        assert!(cart.place_order().is_empty());

        let submitted = service.gateway().submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].items.len(), 1);
        assert_eq!(submitted[0].where_to_send, "Main St");
    }

    #[tokio::test]
    async fn gateway_failure_keeps_cart() {
        let gateway = InMemoryOrderGateway::new();
        gateway.set_fail_on_submit(true);
        let service = CheckoutService::new(gateway);
        let mut cart = cart_with_soup();

        let result = service
            .place_order(&mut cart, &DeliveryDetails::new("0123", "Main St"))
            .await;

        assert!(matches!(result, Err(CheckoutError::Gateway(_))));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.place_order().phone_number, "0123");
    }

    #[tokio::test]
    async fn pending_order_blocks_new_one() {
        let service = CheckoutService::new(InMemoryOrderGateway::new());
        let mut cart = cart_with_soup();
        service
            .place_order(&mut cart, &DeliveryDetails::new("0123", "Main St"))
            .await
            .unwrap();

        let mut cart = cart_with_soup();
        let result = service
            .place_order(&mut cart, &DeliveryDetails::new("0123", "Main St"))
            .await;

        assert!(matches!(
            result,
            Err(CheckoutError::OrderInProgress {
                progress: OrderProgress::Pending
            })
        ));
        assert_eq!(cart.items().len(), 1);
    }

    #[tokio::test]
    async fn finished_order_allows_new_one() {
        let service = CheckoutService::new(InMemoryOrderGateway::new());
        let mut cart = cart_with_soup();
        let first = service
            .place_order(&mut cart, &DeliveryDetails::new("0123", "Main St"))
            .await
            .unwrap();

        let first_id = first.id.unwrap();
        service
            .gateway()
            .set_progress(&first_id, OrderProgress::Done);

        let mut cart = cart_with_soup();
        assert!(
            service
                .place_order(&mut cart, &DeliveryDetails::new("0123", "Main St"))
                .await
                .is_ok()
        );
    }
}
