//! Client-side domain layer for the ordering application.
//!
//! This crate provides:
//! - A generic persisted [`Store`] that commits pure state transitions and
//!   writes every snapshot to storage
//! - The cart state with its order draft
//! - The session state
//! - Form validation and the checkout flow

pub mod cart;
pub mod checkout;
pub mod error;
pub mod session;
pub mod store;
pub mod validation;

pub use cart::{
    Cart, CartLineItem, CartStore, CatalogEntity, IncludedItem, ItemKind, LineKind, OrderDraft,
    OrderLine, OrderProgress,
};
pub use checkout::{
    CheckoutError, CheckoutService, GatewayError, InMemoryOrderGateway, OrderConfirmation,
    OrderGateway, OrderRecord, OrderedEntity, OrderedLine,
};
pub use common::{ItemId, Money};
pub use error::DomainError;
pub use session::{LoginResponse, Session, SessionStatus, SessionStore, UserProfile};
pub use store::{Listener, PersistedState, Store};
pub use validation::{
    DeliveryDetails, LoginForm, OtpCode, PackageForm, ProductForm, SignupForm, ValidationErrors,
};
