//! Persisted state containers.

use serde::{Serialize, de::DeserializeOwned};
use storage::{PersistedRecord, StateStorage, StateStorageExt, StorageError};

use crate::error::DomainError;

/// Trait for state that is held by a [`Store`] and persisted after every change.
///
/// State transitions are plain functions from the current snapshot to the
/// next one. The store owns the side effects: writing the record and
/// notifying subscribers.
pub trait PersistedState:
    Default + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The key the state is persisted under.
    fn storage_key() -> &'static str;

    /// Schema version written alongside the state.
    ///
    /// A stored record with a different version is discarded on startup.
    fn schema_version() -> u32 {
        0
    }

    /// Repairs a freshly loaded snapshot.
    ///
    /// Called once when the store is opened. The default keeps the snapshot as-is.
    fn rehydrated(self) -> Self {
        self
    }
}

/// Callback invoked with every committed snapshot.
pub type Listener<T> = Box<dyn Fn(&T) + Send + Sync>;

/// A state container bound to a storage backend.
///
/// The store is the single source of truth for its state. It is rehydrated
/// from storage when opened and written back after every committed
/// transition.
pub struct Store<T: PersistedState, S: StateStorage> {
    state: T,
    storage: S,
    listeners: Vec<Listener<T>>,
}

impl<T: PersistedState, S: StateStorage> Store<T, S> {
    /// Opens a store, restoring the last persisted snapshot.
    ///
    /// Falls back to the default state when nothing is stored, when the
    /// stored record has a different schema version, or when it cannot be
    /// parsed. Storage access failures are returned.
    #[tracing::instrument(skip(storage), fields(key = T::storage_key()))]
    pub fn open(storage: S) -> Result<Self, DomainError> {
        let state = match storage.load_record::<T>(T::storage_key()) {
            Ok(Some(record)) if record.version == T::schema_version() => {
                tracing::debug!("restored persisted state");
                record.into_state().rehydrated()
            }
            Ok(Some(record)) => {
                tracing::warn!(
                    found = record.version,
                    expected = T::schema_version(),
                    "discarding persisted state with a different schema version"
                );
                T::default()
            }
            Ok(None) => T::default(),
            Err(StorageError::Serialization(e)) => {
                tracing::warn!(error = %e, "discarding unreadable persisted state");
                T::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            state,
            storage,
            listeners: Vec::new(),
        })
    }

    /// Returns the current snapshot.
    pub fn state(&self) -> &T {
        &self.state
    }

    /// Returns the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Registers a callback invoked after every committed transition.
    pub fn subscribe(&mut self, listener: impl Fn(&T) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Applies a transition, persists the result and notifies subscribers.
    ///
    /// The new snapshot is committed in memory even when persisting fails;
    /// the storage error is returned so the caller can report it.
    pub fn commit(&mut self, transition: impl FnOnce(&T) -> T) -> Result<&T, DomainError> {
        self.state = transition(&self.state);

        let persisted = self.persist();
        if let Err(e) = &persisted {
            metrics::counter!("store_persist_failures_total", "key" => T::storage_key())
                .increment(1);
            tracing::error!(key = T::storage_key(), error = %e, "failed to persist state");
        }

        for listener in &self.listeners {
            listener(&self.state);
        }

        persisted.map(|()| &self.state)
    }

    /// Writes the current snapshot to storage.
    pub fn persist(&self) -> Result<(), DomainError> {
        let record = PersistedRecord::new(&self.state, T::schema_version());
        self.storage.save_record(T::storage_key(), &record)?;
        Ok(())
    }
}

impl<T: PersistedState + std::fmt::Debug, S: StateStorage> std::fmt::Debug for Store<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("key", &T::storage_key())
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
