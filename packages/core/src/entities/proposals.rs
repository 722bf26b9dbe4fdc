//! Proposal records: approved units of work on instruments.

use crate::codec::Entity;
use crate::descriptor::{EntityDescriptor, FieldDescriptor, FieldKind};
use crate::error::ValidationError;
use crate::value::Scalar;

pub(super) static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    kind: "proposals",
    fields: &[
        FieldDescriptor { name: "title", kind: FieldKind::Text },
        FieldDescriptor { name: "abstract", kind: FieldKind::Text },
        FieldDescriptor { name: "science_theme", kind: FieldKind::Text },
        FieldDescriptor { name: "accepted_date", kind: FieldKind::Code },
        FieldDescriptor { name: "encoding", kind: FieldKind::Code },
    ],
};

/// A proposal and its descriptive text.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    /// Relational identifier, assigned on insert.
    pub id: Option<i64>,
    pub title: String,
    /// Long-form abstract. The field name `abstract` is a Rust keyword, so
    /// the struct field differs from the declared name.
    pub abstract_text: String,
    pub science_theme: String,
    /// ISO-8601 date the proposal was accepted, empty until acceptance.
    pub accepted_date: String,
    pub encoding: String,
}

impl Default for Proposal {
    fn default() -> Self {
        Self {
            id: None,
            title: String::new(),
            abstract_text: String::new(),
            science_theme: String::new(),
            accepted_date: String::new(),
            encoding: "UTF8".to_string(),
        }
    }
}

impl Entity for Proposal {
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
            "title" => Some(Scalar::Text(self.title.clone())),
            "abstract" => Some(Scalar::Text(self.abstract_text.clone())),
            "science_theme" => Some(Scalar::Text(self.science_theme.clone())),
            "accepted_date" => Some(Scalar::Text(self.accepted_date.clone())),
            "encoding" => Some(Scalar::Text(self.encoding.clone())),
            _ => None,
        }
    }

    fn apply(&mut self, name: &str, value: Scalar) -> Result<(), ValidationError> {
        match (name, value) {
            ("title", Scalar::Text(v)) => self.title = v,
            ("abstract", Scalar::Text(v)) => self.abstract_text = v,
            ("science_theme", Scalar::Text(v)) => self.science_theme = v,
            ("accepted_date", Scalar::Text(v)) => self.accepted_date = v,
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
