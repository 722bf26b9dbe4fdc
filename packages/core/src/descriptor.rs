//! Entity field metadata tables.
//!
//! Each entity kind declares an [`EntityDescriptor`]: its kind name plus an
//! ordered table of [`FieldDescriptor`]s. The codec, the predicate builder,
//! the mapping builder, and the relational DDL all derive their behavior
//! from this one table, so an entity module is nothing more than a struct
//! and its descriptor.

use crate::value::Scalar;

/// The declared type of an entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-form analyzed text (names, titles, abstracts).
    Text,
    /// Short machine-parsable code (association codes, encodings, DOIs).
    Code,
    /// Boolean flag.
    Bool,
    /// Plain integer.
    Int,
    /// Reference to another entity kind's identifier.
    ForeignKey {
        /// Kind name of the referenced entity.
        references: &'static str,
    },
}

impl FieldKind {
    /// Short name of the kind, for error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Code => "code",
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::ForeignKey { .. } => "foreign key",
        }
    }

    /// Coerces a hash value to this kind's canonical scalar.
    ///
    /// Returns `None` when the value cannot represent the declared type:
    /// - `Text` / `Code` accept text, or an integer rendered to decimal;
    /// - `Bool` accepts the boolean coercion table (bool, `"true"`/`"false"`
    ///   case-insensitive, `1`/`0`);
    /// - `Int` accepts an integer or numeric text;
    /// - `ForeignKey` accepts the same as `Int`, plus null (unset).
    #[must_use]
    pub fn coerce(&self, value: &Scalar) -> Option<Scalar> {
        match self {
            Self::Text | Self::Code => value.coerce_text().map(Scalar::Text),
            Self::Bool => value.coerce_bool().map(Scalar::Bool),
            Self::Int => value.coerce_int().map(Scalar::Int),
            Self::ForeignKey { .. } => {
                if value.is_null() {
                    Some(Scalar::Null)
                } else {
                    value.coerce_int().map(Scalar::Int)
                }
            }
        }
    }
}

/// One declared field of an entity kind.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Field name as it appears in hashes, query parameters, and columns.
    pub name: &'static str,
    /// Declared type driving coercion, mapping, and DDL.
    pub kind: FieldKind,
}

/// Field table for one entity kind.
///
/// The order of `fields` is load-bearing: it is the predicate builder's
/// allow-list order (deterministic conjunction order) and the relational
/// column order.
#[derive(Debug)]
pub struct EntityDescriptor {
    /// Kind name, doubling as table and index name.
    pub kind: &'static str,
    /// Ordered declared fields.
    pub fields: &'static [FieldDescriptor],
}

impl EntityDescriptor {
    /// Looks up a declared field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_coercion_accepts_text_and_integers() {
        assert_eq!(
            FieldKind::Text.coerce(&Scalar::from("hello")),
            Some(Scalar::from("hello"))
        );
        assert_eq!(FieldKind::Code.coerce(&Scalar::Int(8)), Some(Scalar::from("8")));
        assert_eq!(FieldKind::Text.coerce(&Scalar::Bool(true)), None);
    }

    #[test]
    fn bool_coercion_goes_through_the_shared_table() {
        assert_eq!(
            FieldKind::Bool.coerce(&Scalar::from("TRUE")),
            Some(Scalar::Bool(true))
        );
        assert_eq!(FieldKind::Bool.coerce(&Scalar::Int(0)), Some(Scalar::Bool(false)));
        assert_eq!(FieldKind::Bool.coerce(&Scalar::from("maybe")), None);
    }

    #[test]
    fn foreign_keys_accept_null_and_numeric_text() {
        let kind = FieldKind::ForeignKey { references: "users" };
        assert_eq!(kind.coerce(&Scalar::Null), Some(Scalar::Null));
        assert_eq!(kind.coerce(&Scalar::from("31")), Some(Scalar::Int(31)));
        assert_eq!(kind.coerce(&Scalar::Bool(false)), None);
    }

    #[test]
    fn field_lookup_by_name() {
        static FIELDS: [FieldDescriptor; 2] = [
            FieldDescriptor { name: "name", kind: FieldKind::Text },
            FieldDescriptor { name: "active", kind: FieldKind::Bool },
        ];
        let descriptor = EntityDescriptor { kind: "widgets", fields: &FIELDS };

        assert_eq!(descriptor.field("active").unwrap().name, "active");
        assert!(descriptor.field("missing").is_none());
    }
}
