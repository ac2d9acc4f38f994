//! Order placement through an [`OrderGateway`].

mod gateway;
mod service;

pub use gateway::{
    GatewayError, InMemoryOrderGateway, OrderConfirmation, OrderGateway, OrderRecord,
    OrderedEntity, OrderedLine,
};
pub use service::{CheckoutError, CheckoutService};
