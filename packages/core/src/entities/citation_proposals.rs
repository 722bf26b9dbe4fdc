//! Link kind joining citations to the proposals they credit.

use crate::codec::Entity;
use crate::descriptor::{EntityDescriptor, FieldDescriptor, FieldKind};
use crate::error::ValidationError;
use crate::value::Scalar;

pub(super) static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    kind: "citation_proposal",
    fields: &[
        FieldDescriptor {
            name: "citation_id",
            kind: FieldKind::ForeignKey { references: "citations" },
        },
        FieldDescriptor {
            name: "proposal_id",
            kind: FieldKind::ForeignKey { references: "proposals" },
        },
    ],
};

/// Many-to-many link between a citation and a proposal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CitationProposal {
    /// Relational identifier, assigned on insert.
    pub id: Option<i64>,
    pub citation_id: Option<i64>,
    pub proposal_id: Option<i64>,
}

impl Entity for CitationProposal {
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
            "citation_id" => Some(self.citation_id.map_or(Scalar::Null, Scalar::Int)),
            "proposal_id" => Some(self.proposal_id.map_or(Scalar::Null, Scalar::Int)),
            _ => None,
        }
    }

    fn apply(&mut self, name: &str, value: Scalar) -> Result<(), ValidationError> {
        match (name, value) {
            ("citation_id", Scalar::Int(v)) => self.citation_id = Some(v),
            ("citation_id", Scalar::Null) => self.citation_id = None,
            ("proposal_id", Scalar::Int(v)) => self.proposal_id = Some(v),
            ("proposal_id", Scalar::Null) => self.proposal_id = None,
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
