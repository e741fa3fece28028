//! Composition Sequence Resolver
//!
//! Ordered lists (`oneOf`, `allOf`, nested array items) are serialized in the
//! graph as indexed predicate families: `oneOfRef_0`, `oneOfRef_1`, ... for
//! named members and `hasInlineSchema_oneOf_inline_0`, ... for inline ones.
//!
//! Resolution reads index 0, 1, 2, ... and stops at the first index where no
//! family member exists. Indices are expected to be dense; a gap truncates the
//! sequence, and anything after the gap is ignored.

use super::{SchemaKind, SchemaNode, SchemaRef};
use crate::store::{Node, TripleStore};
use crate::vocab;

/// One indexed predicate family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceFamily {
    /// Literal naming a component schema: `<ref_prefix><i>`
    pub ref_prefix: &'static str,
    /// Relation to an inline schema node: `<inline_prefix><i>`
    pub inline_prefix: &'static str,
    /// Literal type tag, only used by the item chain
    pub type_prefix: Option<&'static str>,
}

impl SequenceFamily {
    pub const ONE_OF: SequenceFamily = SequenceFamily {
        ref_prefix: vocab::ONE_OF_REF_PREFIX,
        inline_prefix: vocab::ONE_OF_INLINE_PREFIX,
        type_prefix: None,
    };

    pub const ALL_OF: SequenceFamily = SequenceFamily {
        ref_prefix: vocab::ALL_OF_REF_PREFIX,
        inline_prefix: vocab::ALL_OF_INLINE_PREFIX,
        type_prefix: None,
    };

    /// Array item chain: level `i` is the item type at nesting depth `i`
    pub const ITEMS: SequenceFamily = SequenceFamily {
        ref_prefix: vocab::ITEMS_REF_PREFIX,
        inline_prefix: vocab::ITEMS_INLINE_PREFIX,
        type_prefix: Some(vocab::ITEMS_TYPE_PREFIX),
    };

    /// Whether `node` carries a member at index 0
    pub fn starts_on(&self, store: &TripleStore, node: &Node) -> bool {
        store.has(node, &vocab::indexed(self.ref_prefix, 0))
            || store.has(node, &vocab::indexed(self.inline_prefix, 0))
            || self
                .type_prefix
                .is_some_and(|prefix| store.has(node, &vocab::indexed(prefix, 0)))
    }
}

/// Read the family on `node` in index order, stopping at the first missing index
pub fn resolve_sequence<F>(
    store: &TripleStore,
    node: &Node,
    family: &SequenceFamily,
    mut build_inline: F,
) -> Vec<SchemaRef>
where
    F: FnMut(&Node) -> SchemaNode,
{
    let mut members = Vec::new();

    for index in 0.. {
        if let Some(name) = store.literal(node, &vocab::indexed(family.ref_prefix, index)) {
            members.push(SchemaRef::named(name.trim()));
            continue;
        }

        if let Some(target) = store.object(node, &vocab::indexed(family.inline_prefix, index)) {
            members.push(SchemaRef::inline(build_inline(target)));
            continue;
        }

        if let Some(prefix) = family.type_prefix {
            if let Some(type_tag) = store.literal(node, &vocab::indexed(prefix, index)) {
                members.push(SchemaRef::inline(SchemaNode::of_type(type_tag.trim())));
                continue;
            }
        }

        break;
    }

    members
}

/// Fold an item chain into nested arrays.
///
/// Level `k + 1` nests inside level `k` only when level `k` is an inline array
/// without items; the first level that is not ends the chain. An item-less
/// array left at the bottom gets an empty object schema as its items.
pub fn fold_item_chain(levels: Vec<SchemaRef>) -> Option<SchemaRef> {
    let mut levels = levels.into_iter();
    let mut root = levels.next()?;
    attach_levels(&mut root, &mut levels);

    let leftover = levels.count();
    if leftover > 0 {
        tracing::warn!(leftover, "item chain continues below a non-array level, ignoring the rest");
    }
    Some(root)
}

fn attach_levels(current: &mut SchemaRef, rest: &mut impl Iterator<Item = SchemaRef>) {
    let SchemaRef::Inline(node) = current else {
        return;
    };
    if node.kind != SchemaKind::Array || node.items.is_some() {
        return;
    }

    let next = rest
        .next()
        .unwrap_or_else(|| SchemaRef::inline(SchemaNode::object()));
    let slot = node.items.insert(Box::new(next));
    attach_levels(slot.as_mut(), rest);
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "@prefix : <http://example.org/api#> .\n";

    fn store(body: &str) -> TripleStore {
        TripleStore::from_turtle(&format!("{}{}", PREFIX, body)).unwrap()
    }

    fn pet() -> Node {
        Node::named("http://example.org/api#Pet")
    }

    #[test]
    fn test_stops_at_first_gap() {
        let store = store(
            r#":Pet :oneOfRef_0 "Cat" ; :oneOfRef_1 "Dog" ; :oneOfRef_2 "Bird" ; :oneOfRef_4 "Fish" ."#,
        );
        let members = resolve_sequence(&store, &pet(), &SequenceFamily::ONE_OF, |_| SchemaNode::object());
        let names: Vec<_> = members.iter().filter_map(SchemaRef::as_named).collect();
        assert_eq!(names, vec!["Cat", "Dog", "Bird"]);
    }

    #[test]
    fn test_mixes_named_and_inline_in_index_order() {
        let store = store(
            r#"
            :Pet :oneOfRef_0 "Cat" ;
                 :hasInlineSchema_oneOf_inline_1 [ :schemaType "string" ] ;
                 :oneOfRef_2 "Dog" .
            "#,
        );
        let members = resolve_sequence(&store, &pet(), &SequenceFamily::ONE_OF, |_| {
            SchemaNode::primitive("string")
        });
        assert_eq!(members.len(), 3);
        assert_eq!(members[0].as_named(), Some("Cat"));
        assert_eq!(members[1].as_inline().and_then(|n| n.schema_type.as_deref()), Some("string"));
        assert_eq!(members[2].as_named(), Some("Dog"));
    }

    #[test]
    fn test_missing_index_zero_is_empty() {
        let store = store(r#":Pet :allOfRef_1 "Base" ."#);
        let members = resolve_sequence(&store, &pet(), &SequenceFamily::ALL_OF, |_| SchemaNode::object());
        assert!(members.is_empty());
        assert!(!SequenceFamily::ALL_OF.starts_on(&store, &pet()));
    }

    #[test]
    fn test_item_chain_folds_into_nested_arrays() {
        let store = store(r#":Pet :itemsType_0 "array" ; :itemsType_1 "array" ; :itemsRef_2 "Tag" ."#);
        let levels = resolve_sequence(&store, &pet(), &SequenceFamily::ITEMS, |_| SchemaNode::object());
        let folded = fold_item_chain(levels).unwrap();

        let value = serde_json::to_value(&folded).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "array",
                "items": {"type": "array", "items": {"$ref": "#/components/schemas/Tag"}}
            })
        );
    }

    #[test]
    fn test_item_chain_stops_below_non_array() {
        let levels = vec![
            SchemaRef::inline(SchemaNode::primitive("string")),
            SchemaRef::inline(SchemaNode::primitive("integer")),
        ];
        let folded = fold_item_chain(levels).unwrap();
        assert_eq!(folded, SchemaRef::inline(SchemaNode::primitive("string")));
    }

    #[test]
    fn test_item_chain_bottom_array_gets_object_items() {
        let folded = fold_item_chain(vec![SchemaRef::inline(SchemaNode::array_without_items())]).unwrap();
        let node = folded.as_inline().unwrap();
        assert_eq!(node.items.as_deref(), Some(&SchemaRef::inline(SchemaNode::object())));
    }

    #[test]
    fn test_empty_chain() {
        assert!(fold_item_chain(Vec::new()).is_none());
    }
}
