//! Error types shared by the codec and the predicate builder.

use thiserror::Error;

/// A hash or query parameter value failed type coercion.
///
/// Local to one field; a decode that hits one aborts without mutating the
/// target entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for field `{field}`: {message}")]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: String,
    /// What went wrong with the value.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error for the given field.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors from translating query parameters into a predicate.
///
/// Unknown *fields* are ignored by design (permissive filtering); unknown
/// *operators* indicate a caller defect and are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// An `<field>_operator` parameter named an operator outside the fixed
    /// vocabulary.
    #[error("unknown operator `{name}` for field `{field}`")]
    UnknownOperator {
        /// Field the operator was supplied for.
        field: String,
        /// The unrecognized operator name.
        name: String,
    },

    /// A parameter value failed coercion (e.g. a non-boolean value supplied
    /// for a boolean field).
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
