//! Concrete entity kinds and the bootstrap registry.
//!
//! Each module is a thin declaration: a struct with defaults, a descriptor
//! table, and the field `match`es the [`Entity`](crate::codec::Entity)
//! trait needs. All real behavior lives in the generic codec, predicate,
//! and mapping layers.

mod citation_proposals;
mod citations;
mod institutions;
mod instruments;
mod proposal_participants;
mod proposals;
mod users;

pub use citation_proposals::CitationProposal;
pub use citations::Citation;
pub use institutions::Institution;
pub use instruments::Instrument;
pub use proposal_participants::ProposalParticipant;
pub use proposals::Proposal;
pub use users::User;

use crate::descriptor::EntityDescriptor;

/// Every registered entity kind, in bootstrap order.
///
/// Referenced kinds come before the link kinds that point at them, so
/// loading test data in this order never dangles a foreign key.
static DESCRIPTORS: [&EntityDescriptor; 7] = [
    &citations::DESCRIPTOR,
    &institutions::DESCRIPTOR,
    &users::DESCRIPTOR,
    &proposals::DESCRIPTOR,
    &instruments::DESCRIPTOR,
    &citation_proposals::DESCRIPTOR,
    &proposal_participants::DESCRIPTOR,
];

/// All registered descriptors in fixed declared order.
#[must_use]
pub fn descriptors() -> &'static [&'static EntityDescriptor] {
    &DESCRIPTORS
}

/// Looks up a registered descriptor by kind name.
#[must_use]
pub fn descriptor_for(kind: &str) -> Option<&'static EntityDescriptor> {
    DESCRIPTORS
        .iter()
        .find(|descriptor| descriptor.kind == kind)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldKind;

    #[test]
    fn registry_order_is_stable() {
        let kinds: Vec<&str> = descriptors().iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                "citations",
                "institutions",
                "users",
                "proposals",
                "instruments",
                "citation_proposal",
                "proposal_participant",
            ]
        );
    }

    #[test]
    fn lookup_by_kind_name() {
        assert_eq!(descriptor_for("users").unwrap().kind, "users");
        assert!(descriptor_for("nonexistent").is_none());
    }

    #[test]
    fn link_kinds_reference_registered_kinds() {
        for descriptor in descriptors() {
            for field in descriptor.fields {
                if let FieldKind::ForeignKey { references } = field.kind {
                    assert!(
                        descriptor_for(references).is_some(),
                        "{}.{} references unregistered kind {references}",
                        descriptor.kind,
                        field.name
                    );
                }
            }
        }
    }
}
