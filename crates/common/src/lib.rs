//! Shared value types used across the ordering client crates.

pub mod id;
pub mod money;

pub use id::ItemId;
pub use money::Money;
