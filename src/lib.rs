// Library root - exports for the binary and tests

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod utils;

pub use config::Config;
pub use database::{DocumentStore, InMemoryStore, SharedStore, StoreError};
pub use error::ApiError;
pub use router::build_router;

/// Shared handler state. The store is built once at startup and injected here.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}
