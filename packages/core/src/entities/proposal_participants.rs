//! Link kind joining users to the proposals they participate in.

use crate::codec::Entity;
use crate::descriptor::{EntityDescriptor, FieldDescriptor, FieldKind};
use crate::error::ValidationError;
use crate::value::Scalar;

pub(super) static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    kind: "proposal_participant",
    fields: &[
        FieldDescriptor {
            name: "proposal_id",
            kind: FieldKind::ForeignKey { references: "proposals" },
        },
        FieldDescriptor {
            name: "person_id",
            kind: FieldKind::ForeignKey { references: "users" },
        },
    ],
};

/// Many-to-many link between a proposal and a participating user.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProposalParticipant {
    /// Relational identifier, assigned on insert.
    pub id: Option<i64>,
    pub proposal_id: Option<i64>,
    pub person_id: Option<i64>,
}

impl Entity for ProposalParticipant {
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
            "proposal_id" => Some(self.proposal_id.map_or(Scalar::Null, Scalar::Int)),
            "person_id" => Some(self.person_id.map_or(Scalar::Null, Scalar::Int)),
            _ => None,
        }
    }

    fn apply(&mut self, name: &str, value: Scalar) -> Result<(), ValidationError> {
        match (name, value) {
            ("proposal_id", Scalar::Int(v)) => self.proposal_id = Some(v),
            ("proposal_id", Scalar::Null) => self.proposal_id = None,
            ("person_id", Scalar::Int(v)) => self.person_id = Some(v),
            ("person_id", Scalar::Null) => self.person_id = None,
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
