//! Client error types.

use domain::{CheckoutError, DomainError, GatewayError, ValidationErrors};
use storage::StorageError;
use thiserror::Error;

/// Errors surfaced to the front end.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The command needs a logged-in user.
    #[error("Not logged in")]
    NotAuthenticated,

    /// The logged-in user lacks the `admin` role.
    #[error("Admin access required")]
    Forbidden,

    /// A successful response had an unexpected shape.
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The configuration cannot be used.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns the message to show the user.
    ///
    /// API rejections carry the server's own message; everything else uses
    /// the error's display text.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Checkout(CheckoutError::Gateway(GatewayError::Rejected {
                message, ..
            })) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<ClientError> for GatewayError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { status: 401, .. } | ClientError::NotAuthenticated => {
                GatewayError::Unauthorized
            }
            ClientError::Api { status, message } => GatewayError::Rejected { status, message },
            ClientError::Forbidden => GatewayError::Rejected {
                status: 403,
                message: ClientError::Forbidden.to_string(),
            },
            other => GatewayError::Transport(other.to_string()),
        }
    }
}
