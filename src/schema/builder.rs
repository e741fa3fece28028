//! Schema Node Builder
//!
//! Reads the annotation facts attached to one graph node and produces a
//! [`SchemaNode`]. Two vocabularies exist side by side behind the
//! [`SchemaBuilder`] trait; a run picks one and never mixes them.
//!
//! Builders never fail. A node without recognized annotations becomes an empty
//! object schema, and malformed pieces fall back to defaults.

use serde::Serialize;

use super::relations::map_relation;
use super::sequence::{SequenceFamily, fold_item_chain, resolve_sequence};
use super::{SchemaKind, SchemaNode, SchemaRef};
use crate::store::{Node, TripleStore};
use crate::vocab;

/// Annotation vocabulary used by a conversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Convention {
    /// Comma-separated field lists, references inlined after the build
    Coarse,
    /// One predicate per attribute, references preserved
    Fine,
}

impl std::fmt::Display for Convention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Convention::Coarse => write!(f, "coarse"),
            Convention::Fine => write!(f, "fine"),
        }
    }
}

/// Capability shared by both vocabularies
pub trait SchemaBuilder {
    fn convention(&self) -> Convention;

    /// Build the schema described by `node`
    fn build_schema(&self, node: &Node) -> SchemaNode;

    /// Whether `node` describes a schema in this vocabulary
    fn recognizes(&self, node: &Node) -> bool;

    /// Named schemas that `node` points at through relations and that must
    /// therefore exist in the component table
    fn referenced_schemas(&self, node: &Node) -> Vec<Node>;

    /// Reference for a relation target: named nodes stay names, blank nodes are built inline
    fn schema_ref(&self, node: &Node) -> SchemaRef {
        match node {
            Node::Named(_) => SchemaRef::Named(node.stable_name()),
            Node::Blank(_) => SchemaRef::inline(self.build_schema(node)),
        }
    }
}

fn literal_string(store: &TripleStore, node: &Node, predicate: &str) -> Option<String> {
    store.literal(node, predicate).map(str::to_string)
}

fn drop_unknown_required(schema: &mut SchemaNode, node: &Node) {
    let dropped = schema.retain_known_required();
    if !dropped.is_empty() {
        tracing::debug!(node = %node, ?dropped, "required names without a matching property");
    }
}

// =============================================================================
// Coarse convention
// =============================================================================

/// Primitive field lists of the coarse vocabulary and the type each produces
const SIMPLE_FIELDS: &[(&str, &str)] = &[
    (vocab::FIELD_STRING, "string"),
    (vocab::FIELD_INTEGER, "integer"),
    (vocab::FIELD_NUMBER, "number"),
    (vocab::FIELD_BOOLEAN, "boolean"),
];

/// Builder for `field_*` annotations and `has*` relations
pub struct CoarseBuilder<'a> {
    store: &'a TripleStore,
}

impl<'a> CoarseBuilder<'a> {
    pub fn new(store: &'a TripleStore) -> Self {
        Self { store }
    }

    fn build_node(&self, node: &Node, path: &mut Vec<Node>) -> SchemaNode {
        let store = self.store;
        let mut schema = SchemaNode::object();
        schema.title = store
            .first_literal(node, &[vocab::TITLE, vocab::RDFS_LABEL])
            .map(str::to_string);
        schema.description = store
            .first_literal(node, &[vocab::DESCRIPTION, vocab::RDFS_COMMENT])
            .map(str::to_string);

        for (predicate, schema_type) in SIMPLE_FIELDS {
            if let Some(list) = store.literal(node, predicate) {
                for name in vocab::comma_list(list) {
                    schema.set_property(name, SchemaRef::inline(SchemaNode::primitive(schema_type)));
                }
            }
        }

        if let Some(list) = store.literal(node, vocab::FIELD_STRING_ARRAY) {
            for name in vocab::comma_list(list) {
                let items = SchemaRef::inline(SchemaNode::primitive("string"));
                schema.set_property(name, SchemaRef::inline(SchemaNode::array(items)));
            }
        }

        let declared_arrays = store
            .literal(node, vocab::FIELD_OBJECT_ARRAY)
            .map(vocab::comma_list)
            .unwrap_or_default();

        path.push(node.clone());
        for (predicate, target) in store.relations(node) {
            if !predicate.starts_with(vocab::RELATION_PREFIX) {
                continue;
            }

            let target_ref = match target {
                Node::Named(_) => SchemaRef::Named(target.stable_name()),
                Node::Blank(_) if path.contains(target) => {
                    tracing::warn!(node = %target, "blank schema node reaches itself, using empty object");
                    SchemaRef::inline(SchemaNode::object())
                }
                Node::Blank(_) => SchemaRef::inline(self.build_node(target, path)),
            };

            let mapping = map_relation(&target.stable_name(), target_ref, &declared_arrays);
            tracing::debug!(predicate, key = %mapping.key, "mapped relation to property");
            schema.set_property(mapping.key, mapping.schema);
        }
        path.pop();

        if let Some(list) = store.literal(node, vocab::FIELD_REQUIRED) {
            schema.required.extend(vocab::comma_list(list));
        }
        drop_unknown_required(&mut schema, node);

        schema
    }

    /// Named `has*` targets of `node`, descending through blank inline targets
    fn collect_referenced(&self, node: &Node, visited: &mut Vec<Node>, found: &mut Vec<Node>) {
        for (predicate, target) in self.store.relations(node) {
            if !predicate.starts_with(vocab::RELATION_PREFIX) {
                continue;
            }
            match target {
                Node::Named(_) => {
                    if !found.contains(target) {
                        found.push(target.clone());
                    }
                }
                Node::Blank(_) if visited.contains(target) => {}
                Node::Blank(_) => {
                    visited.push(target.clone());
                    self.collect_referenced(target, visited, found);
                }
            }
        }
    }
}

impl SchemaBuilder for CoarseBuilder<'_> {
    fn convention(&self) -> Convention {
        Convention::Coarse
    }

    fn build_schema(&self, node: &Node) -> SchemaNode {
        self.build_node(node, &mut Vec::new())
    }

    fn recognizes(&self, node: &Node) -> bool {
        self.store.is_a(node, vocab::SCHEMA_CLASS)
            || vocab::COARSE_SCHEMA_MARKERS
                .iter()
                .any(|predicate| self.store.has(node, predicate))
    }

    fn referenced_schemas(&self, node: &Node) -> Vec<Node> {
        let mut found = Vec::new();
        self.collect_referenced(node, &mut vec![node.clone()], &mut found);
        found
    }
}

// =============================================================================
// Fine convention
// =============================================================================

/// Builder for per-attribute predicates, property nodes and indexed families
pub struct FineBuilder<'a> {
    store: &'a TripleStore,
}

impl<'a> FineBuilder<'a> {
    pub fn new(store: &'a TripleStore) -> Self {
        Self { store }
    }

    fn build_node(&self, node: &Node, path: &mut Vec<Node>) -> SchemaNode {
        if path.contains(node) {
            tracing::warn!(node = %node, "inline schema reaches itself, using empty object");
            return SchemaNode::object();
        }

        let store = self.store;
        path.push(node.clone());

        let one_of = resolve_sequence(store, node, &SequenceFamily::ONE_OF, |n| self.build_node(n, path));
        let all_of = resolve_sequence(store, node, &SequenceFamily::ALL_OF, |n| self.build_node(n, path));

        let mut schema = match store.literal(node, vocab::SCHEMA_TYPE).map(str::trim) {
            Some(schema_type) => SchemaNode::of_type(schema_type),
            None if !one_of.is_empty() || !all_of.is_empty() => SchemaNode::composed(),
            None => SchemaNode::object(),
        };

        schema.format = literal_string(store, node, vocab::SCHEMA_FORMAT);
        schema.title = literal_string(store, node, vocab::SCHEMA_TITLE);
        schema.description = literal_string(store, node, vocab::SCHEMA_DESCRIPTION);
        if let Some(values) = store.literal(node, vocab::SCHEMA_ENUM) {
            schema.enum_values = vocab::semicolon_list(values);
        }
        schema.one_of = one_of;
        schema.all_of = all_of;

        if schema.kind == SchemaKind::Array {
            let levels = resolve_sequence(store, node, &SequenceFamily::ITEMS, |n| self.build_node(n, path));
            let items = fold_item_chain(levels).unwrap_or_else(|| SchemaRef::inline(SchemaNode::object()));
            schema.items = Some(Box::new(items));
        }

        for property in store.objects(node, vocab::HAS_SCHEMA_PROPERTY) {
            let (name, property_schema) = self.build_property(property, path);
            schema.set_property(name, property_schema);
        }

        if let Some(list) = store.literal(node, vocab::SCHEMA_REQUIRED_FIELDS) {
            schema.required.extend(vocab::comma_list(list));
        }
        drop_unknown_required(&mut schema, node);

        path.pop();
        schema
    }

    /// Property node -> (property name, schema)
    fn build_property(&self, property: &Node, path: &mut Vec<Node>) -> (String, SchemaRef) {
        let store = self.store;
        let name = literal_string(store, property, vocab::PROPERTY_NAME)
            .unwrap_or_else(|| property.stable_name());
        let property_type = store.literal(property, vocab::PROPERTY_TYPE).map(str::trim);
        let reference = store.literal(property, vocab::PROPERTY_REF).map(str::trim);
        let description = store.literal(property, vocab::PROPERTY_DESCRIPTION);

        let schema = if property_type == Some("array") {
            let levels = resolve_sequence(store, property, &SequenceFamily::ITEMS, |n| self.build_node(n, path));
            let items = fold_item_chain(levels)
                .or_else(|| reference.map(SchemaRef::named))
                .unwrap_or_else(|| SchemaRef::inline(SchemaNode::object()));
            SchemaRef::inline(SchemaNode::array(items).with_description(description))
        } else if let Some(reference) = reference {
            SchemaRef::named(reference)
        } else if let Some(target) = store.object(property, vocab::HAS_INLINE_SCHEMA) {
            let mut nested = self.build_node(target, path);
            if nested.description.is_none() {
                nested.description = description.map(str::to_string);
            }
            SchemaRef::inline(nested)
        } else {
            let node = SchemaNode::of_type(property_type.unwrap_or("string"))
                .with_format(store.literal(property, vocab::PROPERTY_FORMAT))
                .with_description(description);
            let node = match store.literal(property, vocab::PROPERTY_ENUM) {
                Some(values) => node.with_enum(vocab::semicolon_list(values)),
                None => node,
            };
            SchemaRef::inline(node)
        };

        (name, schema)
    }
}

impl SchemaBuilder for FineBuilder<'_> {
    fn convention(&self) -> Convention {
        Convention::Fine
    }

    fn build_schema(&self, node: &Node) -> SchemaNode {
        self.build_node(node, &mut Vec::new())
    }

    fn recognizes(&self, node: &Node) -> bool {
        let store = self.store;
        store.is_a(node, vocab::SCHEMA_CLASS)
            || store.has(node, vocab::SCHEMA_TYPE)
            || store.has(node, vocab::HAS_SCHEMA_PROPERTY)
            || SequenceFamily::ONE_OF.starts_on(store, node)
            || SequenceFamily::ALL_OF.starts_on(store, node)
    }

    fn referenced_schemas(&self, _node: &Node) -> Vec<Node> {
        // references are literal names, resolved through the component table
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PREFIX: &str = "@prefix : <http://example.org/api#> .\n";

    fn store(body: &str) -> TripleStore {
        TripleStore::from_turtle(&format!("{}{}", PREFIX, body)).unwrap()
    }

    fn node(name: &str) -> Node {
        Node::named(format!("http://example.org/api#{}", name))
    }

    // =========================================================================
    // Coarse
    // =========================================================================

    #[test]
    fn test_coarse_fields_and_required() {
        let store = store(r#":User :field_string "name,age" ; :field_required "name" ."#);
        let schema = CoarseBuilder::new(&store).build_schema(&node("User"));

        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "type": "object",
                "properties": {"name": {"type": "string"}, "age": {"type": "string"}},
                "required": ["name"]
            })
        );
    }

    #[test]
    fn test_coarse_required_is_subset_of_properties() {
        let store = store(
            r#":User :field_string "name" ; :field_stringArray "roles" ; :field_required "name,roles,ghost" ."#,
        );
        let schema = CoarseBuilder::new(&store).build_schema(&node("User"));

        assert_eq!(schema.required.len(), 2);
        for name in &schema.required {
            assert!(schema.properties.contains_key(name));
        }
    }

    #[test]
    fn test_coarse_string_array_field() {
        let store = store(r#":User :field_stringArray "roles" ."#);
        let schema = CoarseBuilder::new(&store).build_schema(&node("User"));
        assert_eq!(
            serde_json::to_value(&schema.properties["roles"]).unwrap(),
            json!({"type": "array", "items": {"type": "string"}})
        );
    }

    #[test]
    fn test_coarse_relations_use_mapper() {
        let store = store(
            r#"
            :Page :hasItems :Item_data ;
                  :hasSearch :Search_results ;
                  :hasAddress :Address ;
                  :hasTag :Tag ;
                  :field_objectArray "tag" ;
                  :owner :Someone .
            "#,
        );
        let schema = CoarseBuilder::new(&store).build_schema(&node("Page"));

        let keys: Vec<_> = schema.properties.keys().cloned().collect();
        assert_eq!(keys, vec!["data", "results", "Address", "Tag"]);
        assert_eq!(schema.properties["Address"], SchemaRef::named("Address"));
        assert_eq!(
            schema.properties["Tag"],
            SchemaRef::inline(SchemaNode::array(SchemaRef::named("Tag")))
        );
    }

    #[test]
    fn test_coarse_empty_node_is_empty_object() {
        let store = store(r#":Other :path "/x" ."#);
        let schema = CoarseBuilder::new(&store).build_schema(&node("Nothing"));
        assert_eq!(schema, SchemaNode::object());
    }

    #[test]
    fn test_coarse_blank_target_is_inline() {
        let store = store(r#":User :hasProfile [ :field_string "bio" ] ."#);
        let schema = CoarseBuilder::new(&store).build_schema(&node("User"));
        let (key, value) = schema.properties.first().unwrap();
        assert!(key.starts_with("anon_"));
        let inline = value.as_inline().unwrap();
        assert!(inline.properties.contains_key("bio"));
    }

    #[test]
    fn test_coarse_recognizes_and_references() {
        let store = store(
            r#"
            @prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
            :User :field_string "name" ; :hasAddress :Address .
            :Typed rdf:type :Schema .
            :Plain :path "/x" .
            "#,
        );
        let builder = CoarseBuilder::new(&store);
        assert!(builder.recognizes(&node("User")));
        assert!(builder.recognizes(&node("Typed")));
        assert!(!builder.recognizes(&node("Plain")));
        assert_eq!(builder.referenced_schemas(&node("User")), vec![node("Address")]);
    }

    #[test]
    fn test_coarse_references_reached_through_blank_targets() {
        let store = store(
            r#"
            :User :field_string "id" ; :hasAddress :Address ;
                :hasProfile [ :field_string "bio" ; :hasAvatar :Avatar ; :hasAddress :Address ] .
            "#,
        );
        let builder = CoarseBuilder::new(&store);
        assert_eq!(
            builder.referenced_schemas(&node("User")),
            vec![node("Address"), node("Avatar")]
        );
    }

    #[test]
    fn test_coarse_self_reaching_blank_node_terminates() {
        let store = store(
            r#"
            :User :hasFirst _:a .
            _:a :field_string "x" ; :hasNext _:b .
            _:b :field_string "y" ; :hasBack _:a ; :hasTarget :Target .
            "#,
        );
        let builder = CoarseBuilder::new(&store);
        let schema = builder.build_schema(&node("User"));

        let first = schema.properties[0].as_inline().unwrap();
        assert!(first.properties.contains_key("x"));
        let next = first.properties[1].as_inline().unwrap();
        assert!(next.properties.contains_key("y"));
        let back = next.properties[1].as_inline().unwrap();
        assert_eq!(back, &SchemaNode::object());

        assert_eq!(builder.referenced_schemas(&node("User")), vec![node("Target")]);
    }

    // =========================================================================
    // Fine
    // =========================================================================

    #[test]
    fn test_fine_object_with_properties() {
        let store = store(
            r#"
            :User :schemaType "object" ;
                  :schemaRequiredFields "id,email" ;
                  :hasSchemaProperty :User_id, :User_email, :User_address .
            :User_id :propertyName "id" ; :propertyType "integer" ; :propertyFormat "int64" .
            :User_email :propertyName "email" ; :propertyType "string" ; :propertyFormat "email" ;
                        :propertyDescription "Contact address" .
            :User_address :propertyName "address" ; :propertyRef "Address" .
            "#,
        );
        let schema = FineBuilder::new(&store).build_schema(&node("User"));

        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "integer", "format": "int64"},
                    "email": {"type": "string", "format": "email", "description": "Contact address"},
                    "address": {"$ref": "#/components/schemas/Address"}
                },
                "required": ["id", "email"]
            })
        );
    }

    #[test]
    fn test_fine_enum_and_primitive_schema() {
        let store = store(r#":Status :schemaType "string" ; :schemaEnum "active;inactive;banned" ."#);
        let schema = FineBuilder::new(&store).build_schema(&node("Status"));
        assert_eq!(schema.kind, SchemaKind::Primitive);
        assert_eq!(schema.enum_values, vec!["active", "inactive", "banned"]);
    }

    #[test]
    fn test_fine_composition_without_type_is_composed() {
        let store = store(
            r#"
            :Pet :oneOfRef_0 "Cat" ;
                 :hasInlineSchema_oneOf_inline_1 [ :schemaType "object" ;
                     :hasSchemaProperty [ :propertyName "bark" ; :propertyType "boolean" ] ] .
            "#,
        );
        let schema = FineBuilder::new(&store).build_schema(&node("Pet"));

        assert_eq!(schema.kind, SchemaKind::Composed);
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "oneOf": [
                    {"$ref": "#/components/schemas/Cat"},
                    {"type": "object", "properties": {"bark": {"type": "boolean"}}}
                ]
            })
        );
    }

    #[test]
    fn test_fine_nested_inline_objects() {
        let store = store(
            r#"
            :Order :schemaType "object" ;
                :hasSchemaProperty [ :propertyName "shipping" ;
                    :hasInlineSchema [ :schemaType "object" ;
                        :hasSchemaProperty [ :propertyName "geo" ;
                            :hasInlineSchema [ :schemaType "object" ;
                                :hasSchemaProperty [ :propertyName "lat" ; :propertyType "number" ] ] ] ] ] .
            "#,
        );
        let schema = FineBuilder::new(&store).build_schema(&node("Order"));
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            value["properties"]["shipping"]["properties"]["geo"]["properties"]["lat"],
            json!({"type": "number"})
        );
    }

    #[test]
    fn test_fine_array_property_variants() {
        let store = store(
            r#"
            :Team :schemaType "object" ;
                :hasSchemaProperty
                    [ :propertyName "members" ; :propertyType "array" ; :propertyRef "User" ] ,
                    [ :propertyName "grid" ; :propertyType "array" ; :itemsType_0 "array" ; :itemsType_1 "integer" ] ,
                    [ :propertyName "loose" ; :propertyType "array" ] .
            "#,
        );
        let schema = FineBuilder::new(&store).build_schema(&node("Team"));
        let value = serde_json::to_value(&schema).unwrap();

        assert_eq!(
            value["properties"]["members"],
            json!({"type": "array", "items": {"$ref": "#/components/schemas/User"}})
        );
        assert_eq!(
            value["properties"]["grid"],
            json!({"type": "array", "items": {"type": "array", "items": {"type": "integer"}}})
        );
        assert_eq!(
            value["properties"]["loose"],
            json!({"type": "array", "items": {"type": "object"}})
        );
    }

    #[test]
    fn test_fine_array_schema_items() {
        let store = store(r#":Tags :schemaType "array" ; :itemsRef_0 "Tag" ."#);
        let schema = FineBuilder::new(&store).build_schema(&node("Tags"));
        assert_eq!(schema.items.as_deref(), Some(&SchemaRef::named("Tag")));
    }

    #[test]
    fn test_fine_property_name_falls_back_to_stable_name() {
        let store = store(
            r#":User :schemaType "object" ; :hasSchemaProperty :nickname .
               :nickname :propertyType "string" ."#,
        );
        let schema = FineBuilder::new(&store).build_schema(&node("User"));
        assert!(schema.properties.contains_key("nickname"));
    }

    #[test]
    fn test_fine_self_reaching_blank_node_terminates() {
        let store = store(
            r#"
            :Loop :schemaType "object" ; :hasSchemaProperty _:p .
            _:p :propertyName "inner" ; :hasInlineSchema _:s .
            _:s :schemaType "object" ; :hasSchemaProperty _:q .
            _:q :propertyName "again" ; :hasInlineSchema _:s .
            "#,
        );
        let schema = FineBuilder::new(&store).build_schema(&node("Loop"));
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            value["properties"]["inner"]["properties"]["again"],
            json!({"type": "object"})
        );
    }

    #[test]
    fn test_fine_recognizes() {
        let store = store(
            r#"
            :A :schemaType "object" .
            :B :oneOfRef_0 "A" .
            :C :hasSchemaProperty [ :propertyName "x" ] .
            :D :propertyName "x" .
            "#,
        );
        let builder = FineBuilder::new(&store);
        assert!(builder.recognizes(&node("A")));
        assert!(builder.recognizes(&node("B")));
        assert!(builder.recognizes(&node("C")));
        assert!(!builder.recognizes(&node("D")));
    }
}
