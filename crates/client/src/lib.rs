//! Client for the ordering application.
//!
//! Provides the HTTP [`ApiClient`], the [`App`] root that owns the persisted
//! cart and session stores, and configuration loaded from the environment.

pub mod api;
pub mod app;
pub mod config;
pub mod error;

pub use api::{ApiClient, CatalogPage, Envelope, OrderPage, TableInfo};
pub use app::App;
pub use config::Config;
pub use error::ClientError;
