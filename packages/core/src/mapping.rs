//! Search-index mapping documents.
//!
//! [`build_mapping`] derives the per-kind index mapping from the entity's
//! descriptor table: a base mapping shared by every kind (identifier and
//! bookkeeping timestamps), then one property per declared field. The
//! output is deterministic, so repeated calls yield byte-identical
//! documents and index creation stays idempotent.

use serde_json::{json, Map, Value};

use crate::descriptor::{EntityDescriptor, FieldKind};
use crate::value::ID_FIELD;

/// Maximum keyword sub-field length for text properties.
const KEYWORD_IGNORE_ABOVE: u32 = 256;

/// Builds the index mapping document for an entity kind.
///
/// Text and code fields map to analyzed `text` with an unanalyzed `keyword`
/// sibling for exact match and sorting; booleans map to `boolean`; integer
/// and foreign-key fields map to `long`. The document is the full
/// index-creation body (`{"mappings": {"properties": ...}}`).
#[must_use]
pub fn build_mapping(descriptor: &EntityDescriptor) -> Value {
    let mut properties = Map::new();
    properties.insert(ID_FIELD.to_string(), json!({ "type": "long" }));
    properties.insert("created".to_string(), json!({ "type": "date" }));
    properties.insert("updated".to_string(), json!({ "type": "date" }));

    for field in descriptor.fields {
        properties.insert(field.name.to_string(), field_mapping(field.kind));
    }

    json!({ "mappings": { "properties": Value::Object(properties) } })
}

fn field_mapping(kind: FieldKind) -> Value {
    match kind {
        FieldKind::Text | FieldKind::Code => json!({
            "type": "text",
            "fields": {
                "keyword": { "type": "keyword", "ignore_above": KEYWORD_IGNORE_ABOVE }
            }
        }),
        FieldKind::Bool => json!({ "type": "boolean" }),
        FieldKind::Int | FieldKind::ForeignKey { .. } => json!({ "type": "long" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Entity;
    use crate::entities::{CitationProposal, Institution};

    #[test]
    fn mapping_is_idempotent_and_byte_identical() {
        let first = build_mapping(Institution::descriptor());
        let second = build_mapping(Institution::descriptor());
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn base_mapping_is_present_for_every_kind() {
        let mapping = build_mapping(CitationProposal::descriptor());
        let properties = &mapping["mappings"]["properties"];
        assert_eq!(properties[ID_FIELD]["type"], "long");
        assert_eq!(properties["created"]["type"], "date");
        assert_eq!(properties["updated"]["type"], "date");
    }

    #[test]
    fn field_kinds_map_to_index_types() {
        let mapping = build_mapping(Institution::descriptor());
        let properties = &mapping["mappings"]["properties"];

        assert_eq!(properties["name"]["type"], "text");
        assert_eq!(
            properties["name"]["fields"]["keyword"]["ignore_above"],
            KEYWORD_IGNORE_ABOVE
        );
        assert_eq!(properties["is_foreign"]["type"], "boolean");

        let link = build_mapping(CitationProposal::descriptor());
        assert_eq!(link["mappings"]["properties"]["citation_id"]["type"], "long");
    }
}
