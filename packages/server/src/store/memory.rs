//! In-memory [`RelationalStore`] implementation.
//!
//! Per-kind row maps behind a single `parking_lot` lock, with a per-kind
//! identifier sequence. Suitable for tests and development; predicate
//! filtering goes through [`Predicate::matches`] so the semantics line up
//! with what SQL backends render into `WHERE` clauses.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use metacat_core::{EntityDescriptor, EntityHash, Predicate, Scalar, ID_FIELD};
use parking_lot::RwLock;

use super::RelationalStore;
use crate::error::StoreError;

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, EntityHash>,
}

impl Table {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory relational store.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently stored for a kind.
    #[must_use]
    pub fn row_count(&self, kind: &str) -> usize {
        self.tables
            .read()
            .get(kind)
            .map_or(0, |table| table.rows.len())
    }
}

#[async_trait]
impl RelationalStore for MemoryStore {
    async fn ensure_table(&self, descriptor: &EntityDescriptor) -> Result<(), StoreError> {
        self.tables
            .write()
            .entry(descriptor.kind.to_string())
            .or_default();
        Ok(())
    }

    async fn insert(
        &self,
        descriptor: &EntityDescriptor,
        row: &EntityHash,
    ) -> Result<i64, StoreError> {
        let mut tables = self.tables.write();
        let table = tables.entry(descriptor.kind.to_string()).or_default();
        let id = table.allocate_id();

        let mut stored = row.clone();
        stored.insert(ID_FIELD, Scalar::Int(id));
        table.rows.insert(id, stored);
        Ok(id)
    }

    async fn fetch(
        &self,
        descriptor: &EntityDescriptor,
        id: i64,
    ) -> Result<Option<EntityHash>, StoreError> {
        Ok(self
            .tables
            .read()
            .get(descriptor.kind)
            .and_then(|table| table.rows.get(&id).cloned()))
    }

    async fn select(
        &self,
        descriptor: &EntityDescriptor,
        predicate: &Predicate,
    ) -> Result<Vec<EntityHash>, StoreError> {
        Ok(self.tables.read().get(descriptor.kind).map_or_else(
            Vec::new,
            |table| {
                table
                    .rows
                    .values()
                    .filter(|row| predicate.matches(row))
                    .cloned()
                    .collect()
            },
        ))
    }

    async fn update(
        &self,
        descriptor: &EntityDescriptor,
        id: i64,
        row: &EntityHash,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let slot = tables
            .get_mut(descriptor.kind)
            .and_then(|table| table.rows.get_mut(&id))
            .ok_or_else(|| StoreError::Missing {
                kind: descriptor.kind.to_string(),
                id,
            })?;

        let mut stored = row.clone();
        stored.insert(ID_FIELD, Scalar::Int(id));
        *slot = stored;
        Ok(())
    }

    async fn delete(&self, descriptor: &EntityDescriptor, id: i64) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .write()
            .get_mut(descriptor.kind)
            .is_some_and(|table| table.rows.remove(&id).is_some()))
    }

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use metacat_core::entities::Institution;
    use metacat_core::{Comparison, Entity, Operator};

    use super::*;

    fn row(name: &str, foreign: bool) -> EntityHash {
        let mut hash = EntityHash::new();
        hash.insert("name", name);
        hash.insert("is_foreign", foreign);
        hash
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let descriptor = Institution::descriptor();

        let first = store.insert(descriptor, &row("a", false)).await.unwrap();
        let second = store.insert(descriptor, &row("b", false)).await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);

        let fetched = store.fetch(descriptor, first).await.unwrap().unwrap();
        assert_eq!(fetched.id(), Some(first));
        assert_eq!(fetched.get_scalar("name"), Some(&Scalar::from("a")));
    }

    #[tokio::test]
    async fn ensure_table_is_idempotent_and_preserves_rows() {
        let store = MemoryStore::new();
        let descriptor = Institution::descriptor();

        store.ensure_table(descriptor).await.unwrap();
        store.insert(descriptor, &row("kept", false)).await.unwrap();
        store.ensure_table(descriptor).await.unwrap();

        assert_eq!(store.row_count(descriptor.kind), 1);
    }

    #[tokio::test]
    async fn select_filters_with_the_predicate() {
        let store = MemoryStore::new();
        let descriptor = Institution::descriptor();
        store.insert(descriptor, &row("domestic", false)).await.unwrap();
        store.insert(descriptor, &row("overseas", true)).await.unwrap();

        let predicate =
            Predicate::always_true().and(Comparison::new("is_foreign", Operator::Eq, true));
        let rows = store.select(descriptor, &predicate).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_scalar("name"), Some(&Scalar::from("overseas")));

        let all = store
            .select(descriptor, &Predicate::always_true())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn select_results_are_in_identifier_order() {
        let store = MemoryStore::new();
        let descriptor = Institution::descriptor();
        for name in ["x", "y", "z"] {
            store.insert(descriptor, &row(name, false)).await.unwrap();
        }

        let rows = store
            .select(descriptor, &Predicate::always_true())
            .await
            .unwrap();
        let ids: Vec<i64> = rows.iter().filter_map(EntityHash::id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn update_requires_an_existing_row() {
        let store = MemoryStore::new();
        let descriptor = Institution::descriptor();

        let err = store
            .update(descriptor, 99, &row("nobody", false))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Missing { kind: "institutions".to_string(), id: 99 }
        );

        let id = store.insert(descriptor, &row("before", false)).await.unwrap();
        store.update(descriptor, id, &row("after", true)).await.unwrap();
        let fetched = store.fetch(descriptor, id).await.unwrap().unwrap();
        assert_eq!(fetched.get_scalar("name"), Some(&Scalar::from("after")));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        let descriptor = Institution::descriptor();
        let id = store.insert(descriptor, &row("gone", false)).await.unwrap();

        assert!(store.delete(descriptor, id).await.unwrap());
        assert!(!store.delete(descriptor, id).await.unwrap());
        assert!(store.fetch(descriptor, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn kinds_are_isolated() {
        let store = MemoryStore::new();
        let institutions = Institution::descriptor();
        let users = metacat_core::entities::User::descriptor();

        store.insert(institutions, &row("only here", false)).await.unwrap();
        assert_eq!(store.row_count(institutions.kind), 1);
        assert_eq!(store.row_count(users.kind), 0);
    }
}
