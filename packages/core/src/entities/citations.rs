//! Citation records: published articles referencing proposals.

use crate::codec::Entity;
use crate::descriptor::{EntityDescriptor, FieldDescriptor, FieldKind};
use crate::error::ValidationError;
use crate::value::Scalar;

pub(super) static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    kind: "citations",
    fields: &[
        FieldDescriptor { name: "article_title", kind: FieldKind::Text },
        FieldDescriptor { name: "journal_name", kind: FieldKind::Text },
        FieldDescriptor { name: "doi_reference", kind: FieldKind::Code },
        FieldDescriptor { name: "release_year", kind: FieldKind::Int },
        FieldDescriptor { name: "encoding", kind: FieldKind::Code },
    ],
};

/// A published citation.
#[derive(Debug, Clone, PartialEq)]
pub struct Citation {
    /// Relational identifier, assigned on insert.
    pub id: Option<i64>,
    pub article_title: String,
    pub journal_name: String,
    /// DOI, e.g. `10.1000/182`. Empty when unregistered.
    pub doi_reference: String,
    pub release_year: i64,
    pub encoding: String,
}

impl Default for Citation {
    fn default() -> Self {
        Self {
            id: None,
            article_title: String::new(),
            journal_name: String::new(),
            doi_reference: String::new(),
            release_year: 0,
            encoding: "UTF8".to_string(),
        }
    }
}

impl Entity for Citation {
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
            "article_title" => Some(Scalar::Text(self.article_title.clone())),
            "journal_name" => Some(Scalar::Text(self.journal_name.clone())),
            "doi_reference" => Some(Scalar::Text(self.doi_reference.clone())),
            "release_year" => Some(Scalar::Int(self.release_year)),
            "encoding" => Some(Scalar::Text(self.encoding.clone())),
            _ => None,
        }
    }

    fn apply(&mut self, name: &str, value: Scalar) -> Result<(), ValidationError> {
        match (name, value) {
            ("article_title", Scalar::Text(v)) => self.article_title = v,
            ("journal_name", Scalar::Text(v)) => self.journal_name = v,
            ("doi_reference", Scalar::Text(v)) => self.doi_reference = v,
            ("release_year", Scalar::Int(v)) => self.release_year = v,
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
