//! Instrument records: the machines that generate data.

use crate::codec::Entity;
use crate::descriptor::{EntityDescriptor, FieldDescriptor, FieldKind};
use crate::error::ValidationError;
use crate::value::Scalar;

pub(super) static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    kind: "instruments",
    fields: &[
        FieldDescriptor { name: "display_name", kind: FieldKind::Text },
        FieldDescriptor { name: "name", kind: FieldKind::Text },
        FieldDescriptor { name: "name_short", kind: FieldKind::Text },
        FieldDescriptor { name: "active", kind: FieldKind::Bool },
        FieldDescriptor { name: "encoding", kind: FieldKind::Code },
    ],
};

/// An instrument and its display names.
///
/// | Field          | Description                         |
/// |----------------|-------------------------------------|
/// | `display_name` | Long display string for web sites   |
/// | `name`         | Machine-parsable display name       |
/// | `name_short`   | Short version used in lists         |
/// | `active`       | Whether the instrument is active    |
/// | `encoding`     | Encoding for the name attributes    |
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    /// Relational identifier, assigned on insert.
    pub id: Option<i64>,
    pub display_name: String,
    pub name: String,
    pub name_short: String,
    pub active: bool,
    pub encoding: String,
}

impl Default for Instrument {
    fn default() -> Self {
        Self {
            id: None,
            display_name: String::new(),
            name: String::new(),
            name_short: String::new(),
            active: false,
            encoding: "UTF8".to_string(),
        }
    }
}

impl Entity for Instrument {
    fn descriptor() -> &'static EntityDescriptor {
        &DESCRIPTOR
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn field(&self, name: &str) -> Option<Scalar> {
        match name {
            "display_name" => Some(Scalar::Text(self.display_name.clone())),
            "name" => Some(Scalar::Text(self.name.clone())),
            "name_short" => Some(Scalar::Text(self.name_short.clone())),
            "active" => Some(Scalar::Bool(self.active)),
            "encoding" => Some(Scalar::Text(self.encoding.clone())),
            _ => None,
        }
    }

    fn apply(&mut self, name: &str, value: Scalar) -> Result<(), ValidationError> {
        match (name, value) {
            ("display_name", Scalar::Text(v)) => self.display_name = v,
            ("name", Scalar::Text(v)) => self.name = v,
            ("name_short", Scalar::Text(v)) => self.name_short = v,
            ("active", Scalar::Bool(v)) => self.active = v,
            ("encoding", Scalar::Text(v)) => self.encoding = v,
            (name, value) => {
                return Err(ValidationError::new(
                    name,
                    format!("unexpected {} value", value.type_name()),
                ))
            }
        }
        Ok(())
    }
}
