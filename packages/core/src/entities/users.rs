//! User records.

use crate::codec::Entity;
use crate::descriptor::{EntityDescriptor, FieldDescriptor, FieldKind};
use crate::error::ValidationError;
use crate::value::Scalar;

pub(super) static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    kind: "users",
    fields: &[
        FieldDescriptor { name: "first_name", kind: FieldKind::Text },
        FieldDescriptor { name: "last_name", kind: FieldKind::Text },
        FieldDescriptor { name: "network_id", kind: FieldKind::Code },
        FieldDescriptor { name: "email_address", kind: FieldKind::Text },
        FieldDescriptor { name: "encoding", kind: FieldKind::Code },
    ],
};

/// A person who can participate in proposals.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Relational identifier, assigned on insert.
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    /// Site login name; lowercase by convention.
    pub network_id: String,
    pub email_address: String,
    pub encoding: String,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: None,
            first_name: String::new(),
            last_name: String::new(),
            network_id: String::new(),
            email_address: String::new(),
            encoding: "UTF8".to_string(),
        }
    }
}

impl Entity for User {
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
            "first_name" => Some(Scalar::Text(self.first_name.clone())),
            "last_name" => Some(Scalar::Text(self.last_name.clone())),
            "network_id" => Some(Scalar::Text(self.network_id.clone())),
            "email_address" => Some(Scalar::Text(self.email_address.clone())),
            "encoding" => Some(Scalar::Text(self.encoding.clone())),
            _ => None,
        }
    }

    fn apply(&mut self, name: &str, value: Scalar) -> Result<(), ValidationError> {
        match (name, value) {
            ("first_name", Scalar::Text(v)) => self.first_name = v,
            ("last_name", Scalar::Text(v)) => self.last_name = v,
            ("network_id", Scalar::Text(v)) => self.network_id = v,
            ("email_address", Scalar::Text(v)) => self.email_address = v,
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
