//! Dynamic query predicate construction.
//!
//! Callers supply a flat mapping of `<field>` values with optional
//! `<field>_operator` selectors; [`build_predicate`] turns those into a
//! conjunction of typed comparisons, restricted to the entity's declared
//! fields. Operator names outside the closed vocabulary are rejected;
//! unknown fields are ignored so forward-compatible clients keep working.

use std::collections::BTreeMap;

use regex::Regex;

use crate::descriptor::{EntityDescriptor, FieldKind};
use crate::error::{QueryError, ValidationError};
use crate::value::{EntityHash, Scalar, ID_FIELD};

/// Untyped caller-supplied search parameters.
pub type QueryParams = BTreeMap<String, Scalar>;

/// Comparison operator vocabulary.
///
/// Closed set: every operator is an explicit variant, and name resolution
/// goes through [`Operator::parse`] — never dynamic attribute lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// SQL `LIKE` with `%` / `_` wildcards.
    Like,
}

impl Operator {
    /// Resolves an operator name, case-insensitively.
    ///
    /// Accepts both the long forms (`equals`, `not_equals`, `less_than`,
    /// `less_or_equal`, `greater_than`, `greater_or_equal`, `contains`) and
    /// the short SQL-ish forms (`eq`, `ne`, `lt`, `lte`, `gt`, `gte`,
    /// `like`).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "eq" | "equals" => Some(Self::Eq),
            "ne" | "not_equals" => Some(Self::Ne),
            "lt" | "less_than" => Some(Self::Lt),
            "le" | "lte" | "less_or_equal" => Some(Self::Le),
            "gt" | "greater_than" => Some(Self::Gt),
            "ge" | "gte" | "greater_or_equal" => Some(Self::Ge),
            "like" | "contains" => Some(Self::Like),
            _ => None,
        }
    }

    /// SQL rendering of the operator.
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Like => "LIKE",
        }
    }
}

/// One field comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Field name ([`ID_FIELD`] for the identifier).
    pub field: String,
    /// Comparison operator.
    pub op: Operator,
    /// Right-hand value, already normalized for the field's type.
    pub value: Scalar,
}

impl Comparison {
    /// Creates a comparison.
    #[must_use]
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<Scalar>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    fn matches(&self, row: &EntityHash) -> bool {
        let Some(actual) = row.get_scalar(&self.field) else {
            return false;
        };
        match self.op {
            Operator::Eq => scalar_eq(actual, &self.value),
            Operator::Ne => !scalar_eq(actual, &self.value),
            Operator::Lt => scalar_cmp(actual, &self.value) == Some(std::cmp::Ordering::Less),
            Operator::Le => matches!(
                scalar_cmp(actual, &self.value),
                Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
            ),
            Operator::Gt => scalar_cmp(actual, &self.value) == Some(std::cmp::Ordering::Greater),
            Operator::Ge => matches!(
                scalar_cmp(actual, &self.value),
                Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
            ),
            Operator::Like => match (actual, &self.value) {
                (Scalar::Text(text), Scalar::Text(pattern)) => like_match(text, pattern),
                _ => false,
            },
        }
    }
}

/// A conjunction of field comparisons; empty means always-true.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Predicate {
    comparisons: Vec<Comparison>,
}

impl Predicate {
    /// The always-true predicate.
    #[must_use]
    pub fn always_true() -> Self {
        Self::default()
    }

    /// Conjoins one more comparison onto the predicate.
    #[must_use]
    pub fn and(mut self, comparison: Comparison) -> Self {
        self.comparisons.push(comparison);
        self
    }

    /// The comparisons in conjunction order.
    #[must_use]
    pub fn comparisons(&self) -> &[Comparison] {
        &self.comparisons
    }

    /// Whether this predicate matches every row.
    #[must_use]
    pub fn is_always_true(&self) -> bool {
        self.comparisons.is_empty()
    }

    /// Evaluates the predicate against a row hash.
    ///
    /// This is the in-memory store's filter; SQL backends render the same
    /// comparisons into a `WHERE` clause instead.
    #[must_use]
    pub fn matches(&self, row: &EntityHash) -> bool {
        self.comparisons.iter().all(|comparison| comparison.matches(row))
    }
}

/// Builds a predicate from caller-supplied parameters.
///
/// Starts from `existing` (so callers can compose with base filters). An
/// `_id` parameter always becomes an identifier equality and is applied
/// first; then each declared field present in `params`, in descriptor
/// order, becomes one comparison. The operator defaults to equals and can
/// be overridden per field with `<field>_operator`. Boolean fields
/// normalize the parameter value through the shared boolean coercion.
///
/// Unknown parameter keys are ignored; unknown operator names fail with
/// [`QueryError::UnknownOperator`]; an operator key without its field key
/// is ignored.
pub fn build_predicate(
    existing: Predicate,
    params: &QueryParams,
    descriptor: &EntityDescriptor,
) -> Result<Predicate, QueryError> {
    let mut predicate = existing;

    if let Some(value) = params.get(ID_FIELD) {
        let id = value
            .coerce_int()
            .ok_or_else(|| ValidationError::new(ID_FIELD, "expected an integer identifier"))?;
        predicate = predicate.and(Comparison::new(ID_FIELD, Operator::Eq, id));
    }

    for field in descriptor.fields {
        let Some(value) = params.get(field.name) else {
            continue;
        };

        let op = match params.get(&format!("{}_operator", field.name)) {
            None => Operator::Eq,
            Some(Scalar::Text(name)) => {
                Operator::parse(name).ok_or_else(|| QueryError::UnknownOperator {
                    field: field.name.to_string(),
                    name: name.clone(),
                })?
            }
            Some(other) => {
                return Err(QueryError::UnknownOperator {
                    field: field.name.to_string(),
                    name: other.type_name().to_string(),
                })
            }
        };

        let value = if field.kind == FieldKind::Bool {
            Scalar::Bool(value.coerce_bool().ok_or_else(|| {
                ValidationError::new(field.name, "expected a boolean parameter value")
            })?)
        } else {
            value.clone()
        };

        predicate = predicate.and(Comparison::new(field.name, op, value));
    }

    Ok(predicate)
}

fn scalar_eq(left: &Scalar, right: &Scalar) -> bool {
    match left {
        Scalar::Null => right.is_null(),
        Scalar::Bool(value) => right.coerce_bool() == Some(*value),
        Scalar::Int(value) => right.coerce_int() == Some(*value),
        Scalar::Text(value) => right.coerce_text().as_deref() == Some(value.as_str()),
    }
}

/// Orders two scalars: numerically when both coerce to integers, otherwise
/// lexicographically when both coerce to text. Mismatched types never order.
fn scalar_cmp(left: &Scalar, right: &Scalar) -> Option<std::cmp::Ordering> {
    if let (Some(a), Some(b)) = (left.coerce_int(), right.coerce_int()) {
        return Some(a.cmp(&b));
    }
    match (left, right) {
        (Scalar::Text(a), Scalar::Text(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// SQL `LIKE` semantics: `%` matches any run, `_` matches one character,
/// everything else is literal. A pattern without wildcards is an exact match.
fn like_match(text: &str, pattern: &str) -> bool {
    let mut source = String::with_capacity(pattern.len() + 2);
    source.push('^');
    for ch in pattern.chars() {
        match ch {
            '%' => source.push_str(".*"),
            '_' => source.push('.'),
            _ => source.push_str(&regex::escape(&ch.to_string())),
        }
    }
    source.push('$');
    Regex::new(&source).is_ok_and(|re| re.is_match(text))
}
