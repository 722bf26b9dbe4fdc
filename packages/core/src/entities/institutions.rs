//! Institution records: organizations users are affiliated with.

use crate::codec::Entity;
use crate::descriptor::{EntityDescriptor, FieldDescriptor, FieldKind};
use crate::error::ValidationError;
use crate::value::Scalar;

pub(super) static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    kind: "institutions",
    fields: &[
        FieldDescriptor { name: "name", kind: FieldKind::Text },
        FieldDescriptor { name: "association_cd", kind: FieldKind::Code },
        FieldDescriptor { name: "is_foreign", kind: FieldKind::Bool },
        FieldDescriptor { name: "encoding", kind: FieldKind::Code },
    ],
};

/// An institution and its attributes.
///
/// | Field            | Description                        |
/// |------------------|------------------------------------|
/// | `name`           | Name of the institution            |
/// | `association_cd` | Type of institution                |
/// | `is_foreign`     | Whether the institution is foreign |
/// | `encoding`       | Character encoding for the name    |
#[derive(Debug, Clone, PartialEq)]
pub struct Institution {
    /// Relational identifier, assigned on insert.
    pub id: Option<i64>,
    pub name: String,
    pub association_cd: String,
    pub is_foreign: bool,
    pub encoding: String,
}

impl Default for Institution {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            association_cd: "UNK".to_string(),
            is_foreign: false,
            encoding: "UTF8".to_string(),
        }
    }
}

impl Entity for Institution {
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
            "name" => Some(Scalar::Text(self.name.clone())),
            "association_cd" => Some(Scalar::Text(self.association_cd.clone())),
            "is_foreign" => Some(Scalar::Bool(self.is_foreign)),
            "encoding" => Some(Scalar::Text(self.encoding.clone())),
            _ => None,
        }
    }

    fn apply(&mut self, name: &str, value: Scalar) -> Result<(), ValidationError> {
        match (name, value) {
            ("name", Scalar::Text(v)) => self.name = v,
            ("association_cd", Scalar::Text(v)) => self.association_cd = v,
            ("is_foreign", Scalar::Bool(v)) => self.is_foreign = v,
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
