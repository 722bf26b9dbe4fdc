//! Document index abstraction.
//!
//! Defines [`DocumentIndex`], the search-side backend: one index per entity
//! kind, one document per entity instance, keyed by the relational
//! identifier. Implementations: in-memory (tests, development) and an
//! Elasticsearch-style HTTP service. The synchronizer exclusively owns
//! document lifecycle; entities never address the index directly.

mod elastic;
mod memory;

pub use elastic::{ElasticConnector, ElasticIndex};
pub use memory::MemoryIndex;

use async_trait::async_trait;
use metacat_core::EntityHash;

use crate::error::IndexError;

/// Pluggable document index backend.
///
/// Used as `Arc<dyn DocumentIndex>`. Documents are default-depth entity
/// hashes; the document identifier is the entity's relational identifier.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Checks the service is reachable (startup handshake).
    async fn ping(&self) -> Result<(), IndexError>;

    /// Whether the index for an entity kind exists.
    async fn index_exists(&self, kind: &str) -> Result<bool, IndexError>;

    /// Creates the index for an entity kind with the given mapping document.
    /// Creating an index that already exists is not an error.
    async fn create_index(
        &self,
        kind: &str,
        mapping: &serde_json::Value,
    ) -> Result<(), IndexError>;

    /// Upserts the document for one entity.
    async fn put_document(
        &self,
        kind: &str,
        id: i64,
        document: &EntityHash,
    ) -> Result<(), IndexError>;

    /// Removes the document for one entity. Deleting an absent document is
    /// not an error.
    async fn delete_document(&self, kind: &str, id: i64) -> Result<(), IndexError>;
}
