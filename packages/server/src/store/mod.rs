//! Relational store abstraction.
//!
//! Defines [`RelationalStore`], the pluggable persistence backend for
//! entity rows. Implementations: in-memory (tests, development) and
//! `PostgreSQL` behind the `postgres` feature. Rows travel as canonical
//! [`EntityHash`]es; identifiers are assigned by the store on insert.

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::{PostgresConnector, PostgresStore};

use async_trait::async_trait;
use metacat_core::{EntityDescriptor, EntityHash, Predicate};

use crate::error::StoreError;

/// Bookkeeping column stamped once at insert (millis since epoch).
pub const CREATED_FIELD: &str = "created";
/// Bookkeeping column stamped on every mutation (millis since epoch).
pub const UPDATED_FIELD: &str = "updated";

/// Pluggable relational persistence backend.
///
/// Used as `Arc<dyn RelationalStore>`. All row values are canonical hashes;
/// the catalog layer owns coercion and bookkeeping stamps, the store owns
/// identifier assignment and predicate filtering.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// Creates the table for an entity kind if it does not exist.
    /// Idempotent: succeeding on an existing table is required.
    async fn ensure_table(&self, descriptor: &EntityDescriptor) -> Result<(), StoreError>;

    /// Inserts a row, returning the store-assigned identifier.
    async fn insert(
        &self,
        descriptor: &EntityDescriptor,
        row: &EntityHash,
    ) -> Result<i64, StoreError>;

    /// Loads a row by identifier, or `None` if absent.
    async fn fetch(
        &self,
        descriptor: &EntityDescriptor,
        id: i64,
    ) -> Result<Option<EntityHash>, StoreError>;

    /// Loads every row matching the predicate, in identifier order.
    async fn select(
        &self,
        descriptor: &EntityDescriptor,
        predicate: &Predicate,
    ) -> Result<Vec<EntityHash>, StoreError>;

    /// Overwrites an existing row. Fails with [`StoreError::Missing`] if the
    /// identifier does not exist.
    async fn update(
        &self,
        descriptor: &EntityDescriptor,
        id: i64,
        row: &EntityHash,
    ) -> Result<(), StoreError>;

    /// Deletes a row. Returns whether a row was actually removed; deleting
    /// an absent identifier is not an error.
    async fn delete(&self, descriptor: &EntityDescriptor, id: i64) -> Result<bool, StoreError>;

    /// Releases resources and closes connections.
    async fn close(&self) -> Result<(), StoreError>;
}
