//! In-memory [`DocumentIndex`] implementation for tests and development.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use metacat_core::EntityHash;
use parking_lot::RwLock;

use super::DocumentIndex;
use crate::error::IndexError;

#[derive(Default)]
struct IndexState {
    mapping: serde_json::Value,
    documents: BTreeMap<i64, EntityHash>,
}

/// In-memory document index.
#[derive(Default)]
pub struct MemoryIndex {
    indices: RwLock<HashMap<String, IndexState>>,
}

impl MemoryIndex {
    /// Creates a new, empty index service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored document for an entity, if indexed.
    #[must_use]
    pub fn document(&self, kind: &str, id: i64) -> Option<EntityHash> {
        self.indices
            .read()
            .get(kind)
            .and_then(|state| state.documents.get(&id).cloned())
    }

    /// Returns the mapping the index was created with.
    #[must_use]
    pub fn mapping(&self, kind: &str) -> Option<serde_json::Value> {
        self.indices.read().get(kind).map(|state| state.mapping.clone())
    }

    /// Number of documents indexed for a kind.
    #[must_use]
    pub fn document_count(&self, kind: &str) -> usize {
        self.indices
            .read()
            .get(kind)
            .map_or(0, |state| state.documents.len())
    }
}

#[async_trait]
impl DocumentIndex for MemoryIndex {
    async fn ping(&self) -> Result<(), IndexError> {
        Ok(())
    }

    async fn index_exists(&self, kind: &str) -> Result<bool, IndexError> {
        Ok(self.indices.read().contains_key(kind))
    }

    async fn create_index(
        &self,
        kind: &str,
        mapping: &serde_json::Value,
    ) -> Result<(), IndexError> {
        let mut indices = self.indices.write();
        // Existing index keeps its mapping and documents.
        indices.entry(kind.to_string()).or_insert_with(|| IndexState {
            mapping: mapping.clone(),
            documents: BTreeMap::new(),
        });
        Ok(())
    }

    async fn put_document(
        &self,
        kind: &str,
        id: i64,
        document: &EntityHash,
    ) -> Result<(), IndexError> {
        let mut indices = self.indices.write();
        let state = indices.entry(kind.to_string()).or_default();
        state.documents.insert(id, document.clone());
        Ok(())
    }

    async fn delete_document(&self, kind: &str, id: i64) -> Result<(), IndexError> {
        if let Some(state) = self.indices.write().get_mut(kind) {
            state.documents.remove(&id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> EntityHash {
        let mut hash = EntityHash::new();
        hash.insert("name", name);
        hash
    }

    #[tokio::test]
    async fn create_index_is_idempotent() {
        let index = MemoryIndex::new();
        let mapping = serde_json::json!({"mappings": {}});

        index.create_index("institutions", &mapping).await.unwrap();
        index.put_document("institutions", 1, &doc("kept")).await.unwrap();
        index.create_index("institutions", &mapping).await.unwrap();

        assert!(index.index_exists("institutions").await.unwrap());
        assert_eq!(index.document_count("institutions"), 1);
    }

    #[tokio::test]
    async fn put_overwrites_and_delete_is_idempotent() {
        let index = MemoryIndex::new();
        index.put_document("users", 7, &doc("first")).await.unwrap();
        index.put_document("users", 7, &doc("second")).await.unwrap();
        assert_eq!(index.document("users", 7).unwrap(), doc("second"));

        index.delete_document("users", 7).await.unwrap();
        index.delete_document("users", 7).await.unwrap();
        assert!(index.document("users", 7).is_none());
    }
}
