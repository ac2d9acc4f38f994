//! Durable storage for persisted client state.
//!
//! Each state container is written as one named record, the way a browser
//! client would use `localStorage`: a string key mapping to a JSON document.

pub mod error;
pub mod file;
pub mod memory;
pub mod record;
pub mod storage;

pub use error::{Result, StorageError};
pub use file::FileStorage;
pub use memory::InMemoryStorage;
pub use record::PersistedRecord;
pub use storage::{StateStorage, StateStorageExt, validate_key};
