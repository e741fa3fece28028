//! Schema Node Model
//!
//! Typed, language-neutral representation of the schemas reconstructed from
//! the graph, plus the run-scoped component table that owns every named one.
//!
//! References between schemas are names into the [`ComponentTable`] rather
//! than pointers, so cyclic schema graphs need no special structure and the
//! inliner can track the names on its current expansion path.

pub mod analysis;
pub mod builder;
pub mod inline;
pub mod relations;
pub mod sequence;

pub use analysis::{
    CycleGroup, DanglingRef, RefAnalysis, RefPath, RefSlot, analyze_refs, collect_refs, format_ref_path,
};
pub use builder::{CoarseBuilder, Convention, FineBuilder, SchemaBuilder};
pub use inline::{DEFAULT_EXPANSION_BUDGET, Inliner};
pub use relations::{PropertyMapping, map_relation};
pub use sequence::{SequenceFamily, fold_item_chain, resolve_sequence};

use indexmap::{IndexMap, IndexSet};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Prefix of a `$ref` into the component table
pub const COMPONENT_REF_PREFIX: &str = "#/components/schemas/";

/// Structural kind of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Primitive,
    Array,
    Object,
    /// `oneOf` / `allOf` without a type of its own
    Composed,
}

/// Reference to a schema: a name in the component table or an embedded node
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaRef {
    Named(String),
    Inline(Box<SchemaNode>),
}

impl SchemaRef {
    pub fn named(name: impl Into<String>) -> Self {
        SchemaRef::Named(name.into())
    }

    pub fn inline(node: SchemaNode) -> Self {
        SchemaRef::Inline(Box::new(node))
    }

    pub fn as_named(&self) -> Option<&str> {
        match self {
            SchemaRef::Named(name) => Some(name),
            SchemaRef::Inline(_) => None,
        }
    }

    pub fn as_inline(&self) -> Option<&SchemaNode> {
        match self {
            SchemaRef::Inline(node) => Some(node),
            SchemaRef::Named(_) => None,
        }
    }

    /// Whether this reference or anything nested below it is a named reference
    pub fn contains_named(&self) -> bool {
        match self {
            SchemaRef::Named(_) => true,
            SchemaRef::Inline(node) => node.contains_named(),
        }
    }
}

impl Serialize for SchemaRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SchemaRef::Named(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$ref", &format!("{}{}", COMPONENT_REF_PREFIX, name))?;
                map.end()
            }
            SchemaRef::Inline(node) => node.serialize(serializer),
        }
    }
}

/// A reconstructed schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaNode {
    #[serde(skip)]
    pub kind: SchemaKind,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,

    /// Property name -> schema, in insertion order
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaRef>,

    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub required: IndexSet<String>,

    /// Present iff `kind == Array` once fully built
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaRef>>,

    #[serde(rename = "oneOf", skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaRef>,

    #[serde(rename = "allOf", skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaRef>,
}

impl SchemaNode {
    fn with_kind(kind: SchemaKind, schema_type: Option<&str>) -> Self {
        Self {
            kind,
            schema_type: schema_type.map(str::to_string),
            format: None,
            title: None,
            description: None,
            enum_values: Vec::new(),
            properties: IndexMap::new(),
            required: IndexSet::new(),
            items: None,
            one_of: Vec::new(),
            all_of: Vec::new(),
        }
    }

    /// Empty object schema, the result of a node with no recognized annotations
    pub fn object() -> Self {
        Self::with_kind(SchemaKind::Object, Some("object"))
    }

    /// Primitive of the given type tag ("string", "integer", ...)
    pub fn primitive(schema_type: &str) -> Self {
        Self::with_kind(SchemaKind::Primitive, Some(schema_type))
    }

    /// Array over `items`
    pub fn array(items: SchemaRef) -> Self {
        let mut node = Self::with_kind(SchemaKind::Array, Some("array"));
        node.items = Some(Box::new(items));
        node
    }

    /// Array whose items are not known yet
    pub fn array_without_items() -> Self {
        Self::with_kind(SchemaKind::Array, Some("array"))
    }

    /// Composition without a type of its own
    pub fn composed() -> Self {
        Self::with_kind(SchemaKind::Composed, None)
    }

    /// Node for a declared type tag
    pub fn of_type(schema_type: &str) -> Self {
        match schema_type {
            "array" => Self::array_without_items(),
            "object" => Self::object(),
            other => Self::primitive(other),
        }
    }

    pub fn with_format(mut self, format: Option<&str>) -> Self {
        self.format = format.map(str::to_string);
        self
    }

    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(str::to_string);
        self
    }

    pub fn with_enum(mut self, values: Vec<String>) -> Self {
        self.enum_values = values;
        self
    }

    /// Add or replace a property; a repeated name keeps its original position
    pub fn set_property(&mut self, name: impl Into<String>, schema: SchemaRef) {
        self.properties.insert(name.into(), schema);
    }

    /// Drop required names that are not recorded properties, returning the dropped ones
    pub fn retain_known_required(&mut self) -> Vec<String> {
        let dropped: Vec<String> = self
            .required
            .iter()
            .filter(|name| !self.properties.contains_key(name.as_str()))
            .cloned()
            .collect();
        let properties = &self.properties;
        self.required.retain(|name| properties.contains_key(name.as_str()));
        dropped
    }

    /// Whether any slot below this node holds a named reference
    pub fn contains_named(&self) -> bool {
        self.children().any(SchemaRef::contains_named)
    }

    /// Every direct child reference: properties, items, oneOf, allOf
    pub fn children(&self) -> impl Iterator<Item = &SchemaRef> {
        self.properties
            .values()
            .chain(self.items.as_deref())
            .chain(self.one_of.iter())
            .chain(self.all_of.iter())
    }
}

/// Run-scoped mapping from stable schema name to its canonical node
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ComponentTable {
    schemas: IndexMap<String, SchemaNode>,
}

impl ComponentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a schema; names are unique, so an existing name is left untouched
    pub fn insert(&mut self, name: impl Into<String>, schema: SchemaNode) -> bool {
        let name = name.into();
        if self.schemas.contains_key(&name) {
            tracing::debug!(name = %name, "component already present, keeping first");
            return false;
        }
        self.schemas.insert(name, schema);
        true
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.schemas.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SchemaNode)> {
        self.schemas.iter()
    }
}

impl FromIterator<(String, SchemaNode)> for ComponentTable {
    fn from_iter<I: IntoIterator<Item = (String, SchemaNode)>>(iter: I) -> Self {
        let mut table = ComponentTable::new();
        for (name, schema) in iter {
            table.insert(name, schema);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_named_ref_serializes_as_component_ref() {
        let value = serde_json::to_value(SchemaRef::named("User")).unwrap();
        assert_eq!(value, json!({"$ref": "#/components/schemas/User"}));
    }

    #[test]
    fn test_object_serialization_omits_empty_slots() {
        let mut node = SchemaNode::object();
        node.set_property("name", SchemaRef::inline(SchemaNode::primitive("string")));
        node.set_property(
            "tags",
            SchemaRef::inline(SchemaNode::array(SchemaRef::inline(SchemaNode::primitive("string")))),
        );
        node.required.insert("name".to_string());

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "tags": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["name"]
            })
        );
    }

    #[test]
    fn test_composed_has_no_type() {
        let mut node = SchemaNode::composed();
        node.one_of.push(SchemaRef::named("Cat"));
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value, json!({"oneOf": [{"$ref": "#/components/schemas/Cat"}]}));
    }

    #[test]
    fn test_retain_known_required() {
        let mut node = SchemaNode::object();
        node.set_property("name", SchemaRef::inline(SchemaNode::primitive("string")));
        node.required.insert("name".to_string());
        node.required.insert("ghost".to_string());

        let dropped = node.retain_known_required();
        assert_eq!(dropped, vec!["ghost".to_string()]);
        assert_eq!(node.required.len(), 1);
        assert!(node.required.contains("name"));
    }

    #[test]
    fn test_table_is_append_only() {
        let mut table = ComponentTable::new();
        assert!(table.insert("User", SchemaNode::object()));
        assert!(!table.insert("User", SchemaNode::primitive("string")));
        assert_eq!(table.get("User").unwrap().kind, SchemaKind::Object);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_contains_named() {
        let inline_only = SchemaNode::array(SchemaRef::inline(SchemaNode::primitive("string")));
        assert!(!inline_only.contains_named());

        let mut nested = SchemaNode::object();
        nested.set_property(
            "owner",
            SchemaRef::inline(SchemaNode::array(SchemaRef::named("User"))),
        );
        assert!(nested.contains_named());
    }
}
