//! Cart contents and the order draft staged from them.

mod draft;
mod item;
mod state;
mod store;

pub use draft::{OrderDraft, OrderLine, OrderProgress};
pub use item::{CartLineItem, CatalogEntity, IncludedItem, ItemKind, LineKind};
pub use state::Cart;
pub use store::CartStore;
