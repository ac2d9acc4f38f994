//! Session/identity state.

mod state;
mod store;

pub use state::{LoginResponse, Session, SessionStatus, UserProfile};
pub use store::SessionStore;
