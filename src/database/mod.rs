//! Document store seam. Handlers only ever talk to `dyn DocumentStore`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, StoreBackend};
use crate::models::{Document, Fields};
use crate::services::credentials::{ServiceAccount, TokenProvider};
use crate::services::firestore::FirestoreClient;

pub mod memory;

pub use memory::InMemoryStore;

/// Collection holding the events.
pub const COLLECTION: &str = "eventos";

pub type SharedStore = Arc<dyn DocumentStore>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document {0} not found")]
    NotFound(String),
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed store response: {0}")]
    Decode(String),
    #[error("store authentication failed: {0}")]
    Auth(String),
}

/// Per-collection operations of a schema-less document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of the collection, in the store's default order.
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// A single document, or `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Insert a new document and return the identifier the store assigned.
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Merge `fields` into an existing document. Keys not present are left untouched.
    /// Fails with `StoreError::NotFound` if the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Remove a document. Fails with `StoreError::NotFound` if it does not exist.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

/// Build the store selected by the configuration.
pub async fn new_store(config: &Config) -> anyhow::Result<SharedStore> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store; data is lost on shutdown");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreBackend::Firestore => {
            if let Some(emulator_host) = &config.emulator_host {
                let project_id = config
                    .project_id
                    .clone()
                    .unwrap_or_else(|| "demo-eventos".to_string());
                tracing::info!("Connecting to Firestore emulator at {}", emulator_host);
                let client = FirestoreClient::emulator(
                    emulator_host,
                    &project_id,
                    &config.database_id,
                    config.store_timeout_secs,
                )?;
                return Ok(Arc::new(client));
            }

            let account = ServiceAccount::from_file(&config.credentials_path)?;
            let project_id = config
                .project_id
                .clone()
                .unwrap_or_else(|| account.project_id.clone());
            tracing::info!(
                "Loaded service account {} for project {}",
                account.client_email,
                project_id
            );

            let client = FirestoreClient::new(
                &project_id,
                &config.database_id,
                TokenProvider::new(account),
                config.store_timeout_secs,
            )?;
            Ok(Arc::new(client))
        }
    }
}
