//! Generic entity-to-hash codec.
//!
//! [`encode`] and [`decode`] work for any [`Entity`] purely through its
//! descriptor table, replacing per-kind hand-written conversions. Decode is
//! atomic: every present field is coerced before any assignment happens, so
//! a failing field leaves the target entity untouched.

use crate::descriptor::EntityDescriptor;
use crate::error::ValidationError;
use crate::value::{EntityHash, HashValue, Scalar, ID_FIELD};

/// Capability set every entity kind implements: field access driven by its
/// descriptor table.
///
/// Implementations are thin declarations — a struct, a descriptor, and a
/// `match` per field. Everything else (codec, predicates, mappings, DDL) is
/// generic over this trait.
pub trait Entity: Default + Send + Sync {
    /// The entity kind's field table.
    fn descriptor() -> &'static EntityDescriptor
    where
        Self: Sized;

    /// The relational identifier, if assigned.
    fn id(&self) -> Option<i64>;

    /// Assigns the relational identifier.
    fn set_id(&mut self, id: i64);

    /// Reads one declared field as its canonical scalar.
    ///
    /// Returns `None` for names not in the descriptor table.
    fn field(&self, name: &str) -> Option<Scalar>;

    /// Writes one declared field from an already-coerced scalar.
    fn apply(&mut self, name: &str, value: Scalar) -> Result<(), ValidationError>;
}

/// Encodes an entity into its canonical hash.
///
/// Emits [`ID_FIELD`] when the identifier is assigned, then every declared
/// field as its canonical scalar. Foreign keys emit the referenced
/// identifier (or null); recursive expansion into nested hashes is a
/// catalog-level concern on top of this flat form.
pub fn encode<E: Entity>(entity: &E) -> EntityHash {
    let mut hash = EntityHash::new();
    if let Some(id) = entity.id() {
        hash.insert(ID_FIELD, Scalar::Int(id));
    }
    for field in E::descriptor().fields {
        if let Some(value) = entity.field(field.name) {
            hash.insert(field.name, value);
        }
    }
    hash
}

/// Decodes a hash into an entity, field by field.
///
/// Set-only-if-present: declared fields absent from the hash keep their
/// current values. Keys that are not declared fields are ignored. All
/// present fields are coerced up front; the first coercion failure aborts
/// with a [`ValidationError`] before any mutation.
pub fn decode<E: Entity>(hash: &EntityHash, entity: &mut E) -> Result<(), ValidationError> {
    let descriptor = E::descriptor();

    let staged_id = match hash.get(ID_FIELD) {
        Some(value) => Some(
            scalar_of(ID_FIELD, value)?
                .coerce_int()
                .ok_or_else(|| ValidationError::new(ID_FIELD, "expected an integer identifier"))?,
        ),
        None => None,
    };

    let mut staged: Vec<(&str, Scalar)> = Vec::new();
    for field in descriptor.fields {
        let Some(value) = hash.get(field.name) else {
            continue;
        };
        let scalar = scalar_of(field.name, value)?;
        let coerced = field.kind.coerce(scalar).ok_or_else(|| {
            ValidationError::new(
                field.name,
                format!(
                    "cannot coerce {} value into {}",
                    scalar.type_name(),
                    field.kind.type_name()
                ),
            )
        })?;
        staged.push((field.name, coerced));
    }

    if let Some(id) = staged_id {
        entity.set_id(id);
    }
    for (name, value) in staged {
        entity.apply(name, value)?;
    }
    Ok(())
}

fn scalar_of<'a>(field: &str, value: &'a HashValue) -> Result<&'a Scalar, ValidationError> {
    value
        .as_scalar()
        .ok_or_else(|| ValidationError::new(field, "expected a scalar value, found a nested hash"))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::entities::Institution;

    fn sample_hash() -> EntityHash {
        let mut hash = EntityHash::new();
        hash.insert(ID_FIELD, 127_i64);
        hash.insert("name", "Pacific Northwest National Laboratory");
        hash.insert("association_cd", "UNK");
        hash.insert("is_foreign", false);
        hash.insert("encoding", "UTF8");
        hash
    }

    #[test]
    fn decode_then_encode_round_trips_every_present_field() {
        let hash = sample_hash();
        let mut institution = Institution::default();
        decode(&hash, &mut institution).unwrap();

        let encoded = encode(&institution);
        for (key, value) in hash.iter() {
            assert_eq!(encoded.get(key), Some(value), "field {key} did not round-trip");
        }
    }

    #[test]
    fn decode_merges_only_present_fields() {
        let mut institution = Institution {
            name: "A".to_string(),
            is_foreign: true,
            ..Institution::default()
        };

        let mut partial = EntityHash::new();
        partial.insert("name", "X");
        decode(&partial, &mut institution).unwrap();

        assert_eq!(institution.name, "X");
        assert!(institution.is_foreign, "absent field must keep its value");
        assert_eq!(institution.encoding, "UTF8");
    }

    #[test]
    fn decode_ignores_unknown_keys() {
        let mut hash = sample_hash();
        hash.insert("unrelated_key", "whatever");

        let mut institution = Institution::default();
        decode(&hash, &mut institution).unwrap();
        assert_eq!(institution.id, Some(127));
    }

    #[test]
    fn decode_coerces_booleans_and_textual_identifiers() {
        let mut hash = EntityHash::new();
        hash.insert(ID_FIELD, "42");
        hash.insert("is_foreign", "TRUE");

        let mut institution = Institution::default();
        decode(&hash, &mut institution).unwrap();
        assert_eq!(institution.id, Some(42));
        assert!(institution.is_foreign);

        hash.insert("is_foreign", 0_i64);
        decode(&hash, &mut institution).unwrap();
        assert!(!institution.is_foreign);
    }

    #[test]
    fn decode_rejects_unparseable_booleans() {
        let mut hash = EntityHash::new();
        hash.insert("is_foreign", "maybe");

        let mut institution = Institution::default();
        let err = decode(&hash, &mut institution).unwrap_err();
        assert_eq!(err.field, "is_foreign");
    }

    #[test]
    fn failed_decode_leaves_the_entity_untouched() {
        let mut institution = Institution {
            name: "before".to_string(),
            ..Institution::default()
        };

        // "name" alone would be applied, but the bad boolean must abort the
        // whole decode before any assignment.
        let mut hash = EntityHash::new();
        hash.insert("name", "after");
        hash.insert("is_foreign", "maybe");

        assert!(decode(&hash, &mut institution).is_err());
        assert_eq!(institution.name, "before");
    }

    #[test]
    fn decode_rejects_nested_values_for_scalar_fields() {
        let mut hash = EntityHash::new();
        hash.insert("name", EntityHash::new());

        let mut institution = Institution::default();
        let err = decode(&hash, &mut institution).unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn encode_emits_every_declared_field() {
        let institution = Institution::default();
        let encoded = encode(&institution);

        assert!(!encoded.contains_key(ID_FIELD), "no id before insert");
        for field in Institution::descriptor().fields {
            assert!(encoded.contains_key(field.name), "missing {}", field.name);
        }
    }

    proptest! {
        #[test]
        fn round_trip_is_lossless_for_arbitrary_institutions(
            name in ".{0,64}",
            association_cd in "[A-Z]{1,8}",
            is_foreign in any::<bool>(),
            id in 1_i64..1_000_000,
        ) {
            let mut hash = EntityHash::new();
            hash.insert(ID_FIELD, id);
            hash.insert("name", name);
            hash.insert("association_cd", association_cd);
            hash.insert("is_foreign", is_foreign);

            let mut institution = Institution::default();
            decode(&hash, &mut institution).unwrap();
            let encoded = encode(&institution);

            for (key, value) in hash.iter() {
                prop_assert_eq!(encoded.get(key), Some(value));
            }
        }
    }
}
