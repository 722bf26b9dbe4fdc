//! Canonical scalar and hash types — the wire and index representation.
//!
//! Every entity serializes to an [`EntityHash`]: a flat, order-deterministic
//! mapping from field name to a JSON-safe [`Scalar`]. Nested hashes appear
//! only in encode output when a caller explicitly requests recursive
//! expansion of foreign keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reserved hash key holding the entity's relational identifier.
pub const ID_FIELD: &str = "_id";

/// A JSON-safe scalar value.
///
/// Serializes untagged, so a hash round-trips as a plain JSON object of
/// primitives. Uses `BTreeMap`-backed hashes for deterministic order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// JSON null (unset foreign key).
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON integer (signed 64-bit).
    Int(i64),
    /// JSON string (UTF-8).
    Text(String),
}

impl Scalar {
    /// Short name of the value's type, for error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Text(_) => "text",
        }
    }

    /// Whether this is the null scalar.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Coerces to a boolean.
    ///
    /// Accepts an actual boolean, the strings `"true"` / `"false"`
    /// (case-insensitive), and the integers `1` / `0`. Anything else is
    /// `None`.
    #[must_use]
    pub fn coerce_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::Int(1) => Some(true),
            Self::Int(0) => Some(false),
            Self::Text(text) => match text.to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Coerces to an integer: an actual integer or numeric text.
    #[must_use]
    pub fn coerce_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Coerces to text: an actual string, or an integer rendered in decimal.
    #[must_use]
    pub fn coerce_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Int(value) => Some(value.to_string()),
            _ => None,
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A value stored under a hash key: a scalar, or a nested hash produced by
/// recursive foreign-key expansion.
///
/// Decode rejects nested values for scalar fields; they exist only on the
/// output side at recursion depth greater than zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HashValue {
    /// A plain scalar value.
    Scalar(Scalar),
    /// A nested entity hash (expanded foreign key).
    Nested(EntityHash),
}

impl HashValue {
    /// Returns the scalar value, or `None` for nested hashes.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            Self::Nested(_) => None,
        }
    }

    /// Returns the nested hash, or `None` for scalars.
    #[must_use]
    pub const fn as_nested(&self) -> Option<&EntityHash> {
        match self {
            Self::Scalar(_) => None,
            Self::Nested(hash) => Some(hash),
        }
    }
}

impl From<Scalar> for HashValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<bool> for HashValue {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for HashValue {
    fn from(value: i64) -> Self {
        Self::Scalar(Scalar::Int(value))
    }
}

impl From<&str> for HashValue {
    fn from(value: &str) -> Self {
        Self::Scalar(Scalar::from(value))
    }
}

impl From<String> for HashValue {
    fn from(value: String) -> Self {
        Self::Scalar(Scalar::Text(value))
    }
}

impl From<EntityHash> for HashValue {
    fn from(value: EntityHash) -> Self {
        Self::Nested(value)
    }
}

/// Canonical flat field-to-scalar mapping for one entity.
///
/// Backed by a `BTreeMap` so iteration and serialization order are
/// deterministic regardless of insertion order. The reserved [`ID_FIELD`]
/// key holds the relational identifier once assigned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityHash(BTreeMap<String, HashValue>);

impl EntityHash {
    /// Creates an empty hash.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&HashValue> {
        self.0.get(key)
    }

    /// Returns the scalar value for a key, or `None` if absent or nested.
    #[must_use]
    pub fn get_scalar(&self, key: &str) -> Option<&Scalar> {
        self.0.get(key).and_then(HashValue::as_scalar)
    }

    /// Inserts a value, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<HashValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Removes a key, returning its value if present.
    pub fn remove(&mut self, key: &str) -> Option<HashValue> {
        self.0.remove(key)
    }

    /// Whether the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the hash has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &HashValue)> {
        self.0.iter()
    }

    /// The entity identifier under [`ID_FIELD`], coerced to an integer.
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        self.get_scalar(ID_FIELD).and_then(Scalar::coerce_int)
    }
}

impl FromIterator<(String, HashValue)> for EntityHash {
    fn from_iter<I: IntoIterator<Item = (String, HashValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_coercion_table() {
        assert_eq!(Scalar::Bool(true).coerce_bool(), Some(true));
        assert_eq!(Scalar::Bool(false).coerce_bool(), Some(false));
        assert_eq!(Scalar::Int(1).coerce_bool(), Some(true));
        assert_eq!(Scalar::Int(0).coerce_bool(), Some(false));
        assert_eq!(Scalar::from("true").coerce_bool(), Some(true));
        assert_eq!(Scalar::from("FALSE").coerce_bool(), Some(false));
        assert_eq!(Scalar::from("True").coerce_bool(), Some(true));

        assert_eq!(Scalar::from("maybe").coerce_bool(), None);
        assert_eq!(Scalar::Int(2).coerce_bool(), None);
        assert_eq!(Scalar::Null.coerce_bool(), None);
    }

    #[test]
    fn int_coercion_accepts_numeric_text() {
        assert_eq!(Scalar::Int(42).coerce_int(), Some(42));
        assert_eq!(Scalar::from("42").coerce_int(), Some(42));
        assert_eq!(Scalar::from(" -7 ").coerce_int(), Some(-7));
        assert_eq!(Scalar::from("forty-two").coerce_int(), None);
        assert_eq!(Scalar::Bool(true).coerce_int(), None);
    }

    #[test]
    fn text_coercion_renders_integers() {
        assert_eq!(Scalar::from("abc").coerce_text(), Some("abc".to_string()));
        assert_eq!(Scalar::Int(17).coerce_text(), Some("17".to_string()));
        assert_eq!(Scalar::Bool(true).coerce_text(), None);
    }

    #[test]
    fn hash_serializes_as_flat_json_object() {
        let mut hash = EntityHash::new();
        hash.insert(ID_FIELD, 4_i64);
        hash.insert("name", "Acme");
        hash.insert("is_foreign", false);
        hash.insert("parent", Scalar::Null);

        let json = serde_json::to_value(&hash).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "_id": 4,
                "is_foreign": false,
                "name": "Acme",
                "parent": null,
            })
        );

        let back: EntityHash = serde_json::from_value(json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn nested_hash_round_trips_through_json() {
        let mut inner = EntityHash::new();
        inner.insert(ID_FIELD, 2_i64);
        inner.insert("name", "inner");

        let mut outer = EntityHash::new();
        outer.insert(ID_FIELD, 1_i64);
        outer.insert("child", inner.clone());

        let json = serde_json::to_value(&outer).unwrap();
        let back: EntityHash = serde_json::from_value(json).unwrap();
        assert_eq!(back.get("child").unwrap().as_nested(), Some(&inner));
    }

    #[test]
    fn id_helper_coerces_text_identifiers() {
        let mut hash = EntityHash::new();
        assert_eq!(hash.id(), None);

        hash.insert(ID_FIELD, "12");
        assert_eq!(hash.id(), Some(12));

        hash.insert(ID_FIELD, 7_i64);
        assert_eq!(hash.id(), Some(7));
    }

    #[test]
    fn iteration_order_is_key_order() {
        let mut hash = EntityHash::new();
        hash.insert("zeta", 1_i64);
        hash.insert("alpha", 2_i64);
        hash.insert("mid", 3_i64);

        let keys: Vec<&str> = hash.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }
}
