//! Server-side error taxonomy.
//!
//! The split matters operationally: `StoreError` and `IndexError` are
//! backend faults; `SyncError` is an index fault that happened *after* a
//! successful relational commit (non-fatal, the store stays authoritative);
//! `ConnectError` is an exhausted startup retry budget (fatal).

use metacat_core::{QueryError, ValidationError};
use thiserror::Error;

/// Relational backend failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No row with the given identifier.
    #[error("no row {id} in `{kind}`")]
    Missing {
        /// Entity kind (table) name.
        kind: String,
        /// Row identifier.
        id: i64,
    },

    /// The backend itself failed (connection, SQL, corruption).
    #[error("relational backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Wraps a backend-specific error.
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Document index failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The request never produced a response (network, timeout).
    #[error("index request failed: {0}")]
    Request(String),

    /// The index service answered with an unexpected status.
    #[error("index `{index}` returned status {status}")]
    Status {
        /// Index name the request addressed.
        index: String,
        /// HTTP-style status code.
        status: u16,
    },
}

impl IndexError {
    /// Wraps a transport-level error.
    pub fn request(err: impl std::fmt::Display) -> Self {
        Self::Request(err.to_string())
    }
}

/// An index write or delete failed after the relational commit succeeded.
///
/// Non-fatal by policy: the relational store is the system of record and
/// the index is eventually consistent. Carries enough context for an
/// external repair pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("index out of sync for {kind}/{id}: {source}")]
pub struct SyncError {
    /// Entity kind whose document is stale.
    pub kind: String,
    /// Entity identifier.
    pub id: i64,
    /// The underlying index failure.
    #[source]
    pub source: IndexError,
}

/// Exhausted the retry budget connecting to a backend at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not connect to {resource} after {attempts} attempt(s): {message}")]
pub struct ConnectError {
    /// Human name of the backend ("relational store", "document index").
    pub resource: String,
    /// How many attempts were made.
    pub attempts: u32,
    /// Message from the last failed attempt.
    pub message: String,
}

/// Errors surfaced by catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Input hash failed type coercion (bad request).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Query parameters named an unknown operator (bad request).
    #[error(transparent)]
    Query(#[from] QueryError),

    /// No entity with the given identifier.
    #[error("no {kind} record with id {id}")]
    NotFound {
        /// Entity kind name.
        kind: &'static str,
        /// Requested identifier.
        id: i64,
    },

    /// Relational backend fault.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Index fell out of sync after a committed mutation. The relational
    /// write stands.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Startup bootstrap could not guarantee a table or index.
    #[error("bootstrap failed for `{kind}`: {message}")]
    Bootstrap {
        /// Entity kind being bootstrapped.
        kind: String,
        /// Underlying failure.
        message: String,
    },
}
