//! The catalog: entity lifecycle over a relational store with a mirrored
//! document index.
//!
//! Every mutation commits to the relational store first and is then fanned
//! out to the registered mutation observers (the index synchronizer among
//! them). The relational store is the system of record: an observer failure
//! surfaces as an error, but the committed row stands.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use metacat_core::{
    build_mapping, build_predicate, decode, descriptor_for, encode, Entity, EntityDescriptor,
    EntityHash, FieldKind, Predicate, QueryParams, Scalar, ID_FIELD,
};
use tracing::info;

use crate::error::CatalogError;
use crate::index::DocumentIndex;
use crate::store::{RelationalStore, CREATED_FIELD, UPDATED_FIELD};
use crate::sync::{CompositeMutationObserver, IndexSynchronizer, MutationObserver};

/// Orchestrates entity reads and writes across both backends.
pub struct Catalog {
    store: Arc<dyn RelationalStore>,
    index: Arc<dyn DocumentIndex>,
    observer: CompositeMutationObserver,
}

impl Catalog {
    /// Creates a catalog over the given backends.
    ///
    /// The index synchronizer is registered automatically; additional
    /// observers can be attached with [`Catalog::add_observer`].
    #[must_use]
    pub fn new(store: Arc<dyn RelationalStore>, index: Arc<dyn DocumentIndex>) -> Self {
        let mut observer = CompositeMutationObserver::default();
        observer.add(Arc::new(IndexSynchronizer::new(Arc::clone(&index))));
        Self {
            store,
            index,
            observer,
        }
    }

    /// Attaches another mutation observer.
    pub fn add_observer(&mut self, observer: Arc<dyn MutationObserver>) {
        self.observer.add(observer);
    }

    /// Ensures every registered entity kind has its table and its index.
    ///
    /// Idempotent: rerunning against an already-provisioned deployment is a
    /// no-op, and existing indices keep their mapping and documents.
    pub async fn bootstrap(&self) -> Result<(), CatalogError> {
        for descriptor in metacat_core::descriptors() {
            self.store
                .ensure_table(descriptor)
                .await
                .map_err(|err| CatalogError::Bootstrap {
                    kind: descriptor.kind.to_string(),
                    message: err.to_string(),
                })?;

            let exists = self
                .index
                .index_exists(descriptor.kind)
                .await
                .map_err(|err| CatalogError::Bootstrap {
                    kind: descriptor.kind.to_string(),
                    message: err.to_string(),
                })?;
            if !exists {
                self.index
                    .create_index(descriptor.kind, &build_mapping(descriptor))
                    .await
                    .map_err(|err| CatalogError::Bootstrap {
                        kind: descriptor.kind.to_string(),
                        message: err.to_string(),
                    })?;
            }
            info!(kind = descriptor.kind, "bootstrapped");
        }
        Ok(())
    }

    /// Creates a new entity from an input hash.
    ///
    /// The input is decoded through the entity's coercion rules (a caller
    /// supplied identifier is discarded; the store assigns one), stamped
    /// with bookkeeping times, committed, and mirrored to the index. Returns
    /// the stored row including the assigned identifier.
    pub async fn create<E: Entity>(&self, input: &EntityHash) -> Result<EntityHash, CatalogError> {
        let descriptor = E::descriptor();

        let mut entity = E::default();
        decode(input, &mut entity)?;

        let mut row = encode(&entity);
        row.remove(ID_FIELD);
        let now = now_millis();
        row.insert(CREATED_FIELD, now);
        row.insert(UPDATED_FIELD, now);

        let id = self.store.insert(descriptor, &row).await?;
        row.insert(ID_FIELD, id);

        self.observer.on_create(descriptor.kind, id, &row).await?;
        Ok(row)
    }

    /// Loads one entity by identifier, expanding foreign keys `depth`
    /// levels deep.
    ///
    /// At depth zero the row is returned flat, foreign keys as bare
    /// identifiers. At greater depths each assigned foreign key is replaced
    /// by the referenced entity's hash, itself expanded one level shallower.
    /// A foreign key whose referenced row is gone stays a bare identifier.
    pub async fn get<E: Entity>(&self, id: i64, depth: u32) -> Result<EntityHash, CatalogError> {
        let descriptor = E::descriptor();
        let row = self
            .store
            .fetch(descriptor, id)
            .await?
            .ok_or(CatalogError::NotFound {
                kind: descriptor.kind,
                id,
            })?;
        self.expand(descriptor, row, depth).await
    }

    /// Applies a partial update to an existing entity.
    ///
    /// The stored row is decoded, the input merged field-by-field on top
    /// (absent fields keep their stored values), and the result committed
    /// and mirrored. The creation stamp is preserved; the update stamp is
    /// refreshed. Returns the stored row.
    pub async fn update<E: Entity>(
        &self,
        id: i64,
        input: &EntityHash,
    ) -> Result<EntityHash, CatalogError> {
        let descriptor = E::descriptor();
        let stored = self
            .store
            .fetch(descriptor, id)
            .await?
            .ok_or(CatalogError::NotFound {
                kind: descriptor.kind,
                id,
            })?;

        let mut entity = E::default();
        decode(&stored, &mut entity)?;
        decode(input, &mut entity)?;

        let mut row = encode(&entity);
        // The identifier is immutable; whatever the input carried loses.
        row.insert(ID_FIELD, id);
        if let Some(created) = stored.get(CREATED_FIELD) {
            row.insert(CREATED_FIELD, created.clone());
        }
        row.insert(UPDATED_FIELD, now_millis());

        self.store.update(descriptor, id, &row).await?;
        self.observer.on_update(descriptor.kind, id, &row).await?;
        Ok(row)
    }

    /// Deletes an entity, removing its index document as well.
    ///
    /// Returns whether a row was actually removed; deleting an absent
    /// identifier is a no-op, not an error.
    pub async fn delete<E: Entity>(&self, id: i64) -> Result<bool, CatalogError> {
        let descriptor = E::descriptor();
        let removed = self.store.delete(descriptor, id).await?;
        if removed {
            self.observer.on_delete(descriptor.kind, id).await?;
        }
        Ok(removed)
    }

    /// Searches one entity kind with caller-supplied parameters.
    ///
    /// Parameters follow the `<field>` / `<field>_operator` convention;
    /// matching rows come back flat, in identifier order.
    pub async fn search<E: Entity>(
        &self,
        params: &QueryParams,
    ) -> Result<Vec<EntityHash>, CatalogError> {
        let descriptor = E::descriptor();
        let predicate = build_predicate(Predicate::always_true(), params, descriptor)?;
        Ok(self.store.select(descriptor, &predicate).await?)
    }

    fn expand<'a>(
        &'a self,
        descriptor: &'static EntityDescriptor,
        mut row: EntityHash,
        depth: u32,
    ) -> Pin<Box<dyn Future<Output = Result<EntityHash, CatalogError>> + Send + 'a>> {
        Box::pin(async move {
            if depth == 0 {
                return Ok(row);
            }
            for field in descriptor.fields {
                let FieldKind::ForeignKey { references } = field.kind else {
                    continue;
                };
                let Some(target) = descriptor_for(references) else {
                    continue;
                };
                let Some(ref_id) = row.get_scalar(field.name).and_then(Scalar::coerce_int) else {
                    continue;
                };
                if let Some(referenced) = self.store.fetch(target, ref_id).await? {
                    let nested = self.expand(target, referenced, depth - 1).await?;
                    row.insert(field.name, nested);
                }
            }
            Ok(row)
        })
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}
