//! The persisted session store.

use storage::StateStorage;

use crate::error::DomainError;
use crate::store::Store;

use super::{LoginResponse, Session, SessionStatus, UserProfile};

/// Session state bound to a storage backend.
pub type SessionStore<S> = Store<Session, S>;

impl<S: StateStorage> Store<Session, S> {
    /// Synchronous authentication check against the rehydrated session.
    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state().is_admin()
    }

    pub fn status(&self) -> SessionStatus {
        self.state().status()
    }

    pub fn user_data(&self) -> Option<&UserProfile> {
        self.state().user_data()
    }

    pub fn user_token(&self) -> Option<&str> {
        self.state().user_token()
    }

    /// Records a successful login.
    #[tracing::instrument(skip(self, response))]
    pub fn set_user_data(&mut self, response: &LoginResponse) -> Result<&Session, DomainError> {
        let session = self.commit(|session| session.set_user_data(response))?;
        tracing::info!(status = ?session.status(), "session updated");
        Ok(session)
    }

    /// Logs out.
    #[tracing::instrument(skip(self))]
    pub fn clear_user_data(&mut self) -> Result<&Session, DomainError> {
        let session = self.commit(Session::clear_user_data)?;
        tracing::info!("session cleared");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use storage::InMemoryStorage;

    use super::*;

    #[test]
    fn authentication_survives_restart() {
        let storage = InMemoryStorage::new();
        {
            let mut store = SessionStore::open(storage.clone()).unwrap();
            store
                .set_user_data(&LoginResponse {
                    data: UserProfile::with_email("me@example.com"),
                    token: Some("jwt".to_string()),
                })
                .unwrap();
        }

        let store = SessionStore::open(storage.clone()).unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.user_token(), Some("jwt"));

        let mut store = store;
        store.clear_user_data().unwrap();
        let store = SessionStore::open(storage).unwrap();
        assert!(!store.is_authenticated());
        assert!(store.user_data().is_none());
    }
}
