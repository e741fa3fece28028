//! Annotation Vocabulary
//!
//! Predicate local names recognized on graph nodes, and the literal shapes they
//! carry. This is the wire contract with whatever produced the ontology, so
//! names are matched exactly and case-sensitively.

// =============================================================================
// Coarse convention
// =============================================================================

pub const FIELD_STRING: &str = "field_string";
pub const FIELD_STRING_ARRAY: &str = "field_stringArray";
pub const FIELD_INTEGER: &str = "field_integer";
pub const FIELD_BOOLEAN: &str = "field_boolean";
pub const FIELD_NUMBER: &str = "field_number";
pub const FIELD_REQUIRED: &str = "field_required";
/// Relation-derived property names that should be wrapped as arrays
pub const FIELD_OBJECT_ARRAY: &str = "field_objectArray";

pub const HEADER_STRING: &str = "header_string";
pub const HEADER_BOOLEAN: &str = "header_boolean";
pub const HEADER_INTEGER: &str = "header_integer";
pub const HEADER_REQUIRED: &str = "header_required";

/// Prefix of predicates that relate a schema to another node
pub const RELATION_PREFIX: &str = "has";

// =============================================================================
// Fine convention: schema nodes
// =============================================================================

pub const SCHEMA_TYPE: &str = "schemaType";
pub const SCHEMA_FORMAT: &str = "schemaFormat";
pub const SCHEMA_TITLE: &str = "schemaTitle";
pub const SCHEMA_DESCRIPTION: &str = "schemaDescription";
pub const SCHEMA_ENUM: &str = "schemaEnum";
pub const SCHEMA_REQUIRED_FIELDS: &str = "schemaRequiredFields";
pub const HAS_SCHEMA_PROPERTY: &str = "hasSchemaProperty";

// =============================================================================
// Fine convention: property nodes
// =============================================================================

pub const PROPERTY_NAME: &str = "propertyName";
pub const PROPERTY_TYPE: &str = "propertyType";
pub const PROPERTY_FORMAT: &str = "propertyFormat";
pub const PROPERTY_REF: &str = "propertyRef";
pub const PROPERTY_DESCRIPTION: &str = "propertyDescription";
pub const PROPERTY_ENUM: &str = "propertyEnum";
pub const HAS_INLINE_SCHEMA: &str = "hasInlineSchema";

// =============================================================================
// Indexed families
// =============================================================================

pub const ONE_OF_REF_PREFIX: &str = "oneOfRef_";
pub const ONE_OF_INLINE_PREFIX: &str = "hasInlineSchema_oneOf_inline_";
pub const ALL_OF_REF_PREFIX: &str = "allOfRef_";
pub const ALL_OF_INLINE_PREFIX: &str = "hasInlineSchema_allOf_inline_";
pub const ITEMS_REF_PREFIX: &str = "itemsRef_";
pub const ITEMS_INLINE_PREFIX: &str = "hasInlineSchema_items_inline_";
pub const ITEMS_TYPE_PREFIX: &str = "itemsType_";

// =============================================================================
// Operations
// =============================================================================

pub const PATH: &str = "path";
pub const METHOD: &str = "method";
pub const SUMMARY: &str = "summary";
pub const DESCRIPTION: &str = "description";
pub const TITLE: &str = "title";
pub const OPERATION_ID: &str = "operationId";
pub const TAGS: &str = "tags";
pub const DEPRECATED: &str = "deprecated";

pub const HAS_REQUEST_BODY: &str = "hasRequestBody";
pub const HAS_RESPONSE: &str = "hasResponse";
pub const HAS_ERROR: &str = "hasError";
pub const HAS_PARAMETER: &str = "hasParameter";

pub const PARAMETER_NAME: &str = "parameterName";
pub const PARAMETER_IN: &str = "parameterIn";
pub const PARAMETER_REQUIRED: &str = "parameterRequired";
pub const PARAMETER_TYPE: &str = "parameterType";
pub const PARAMETER_FORMAT: &str = "parameterFormat";
pub const PARAMETER_ENUM: &str = "parameterEnum";
pub const PARAMETER_DESCRIPTION: &str = "parameterDescription";

pub const REQUEST_BODY_REF: &str = "requestBodyRef";
pub const REQUEST_BODY_REQUIRED: &str = "requestBodyRequired";
pub const REQUEST_BODY_DESCRIPTION: &str = "requestBodyDescription";
pub const CONTENT_TYPE: &str = "contentType";

pub const STATUS_CODE: &str = "statusCode";
pub const RESPONSE_DESCRIPTION: &str = "responseDescription";
pub const RESPONSE_REF: &str = "responseRef";

// =============================================================================
// Document metadata
// =============================================================================

pub const API_TITLE: &str = "apiTitle";
pub const API_VERSION: &str = "apiVersion";
pub const API_DESCRIPTION: &str = "apiDescription";
pub const SERVER_URL: &str = "serverUrl";

// =============================================================================
// RDF / RDFS
// =============================================================================

pub const RDF_TYPE: &str = "type";
pub const RDFS_LABEL: &str = "label";
pub const RDFS_COMMENT: &str = "comment";
/// Class local name marking a node as a schema
pub const SCHEMA_CLASS: &str = "Schema";

/// Predicates whose presence anywhere in a graph marks the fine convention
pub const FINE_MARKERS: &[&str] = &[
    SCHEMA_TYPE,
    HAS_SCHEMA_PROPERTY,
    PROPERTY_NAME,
    STATUS_CODE,
    PARAMETER_IN,
];

/// Coarse annotations whose presence makes a node a schema
pub const COARSE_SCHEMA_MARKERS: &[&str] = &[
    FIELD_STRING,
    FIELD_STRING_ARRAY,
    FIELD_INTEGER,
    FIELD_BOOLEAN,
    FIELD_NUMBER,
    FIELD_REQUIRED,
    FIELD_OBJECT_ARRAY,
];

// =============================================================================
// Literal shapes
// =============================================================================

/// Split a comma-separated list, trimming items and dropping empties and duplicates
pub fn comma_list(value: &str) -> Vec<String> {
    split_list(value, ',')
}

/// Split a semicolon-separated list (enum values)
pub fn semicolon_list(value: &str) -> Vec<String> {
    split_list(value, ';')
}

fn split_list(value: &str, separator: char) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in value.split(separator).map(str::trim).filter(|s| !s.is_empty()) {
        if !items.iter().any(|existing| existing == item) {
            items.push(item.to_string());
        }
    }
    items
}

/// Boolean-like literal: "true" in any case is true, anything else is false
pub fn is_truthy(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Name of the `index`-th member of an indexed predicate family
pub fn indexed(prefix: &str, index: usize) -> String {
    format!("{}{}", prefix, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_list_trims_and_dedups() {
        assert_eq!(comma_list(" name, age ,,name"), vec!["name", "age"]);
        assert!(comma_list("").is_empty());
    }

    #[test]
    fn test_semicolon_list() {
        assert_eq!(semicolon_list("a;b; c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_truthy_is_case_insensitive() {
        assert!(is_truthy("True"));
        assert!(is_truthy("TRUE"));
        assert!(!is_truthy("yes"));
        assert!(!is_truthy("1"));
    }

    #[test]
    fn test_indexed_name() {
        assert_eq!(indexed(ONE_OF_REF_PREFIX, 3), "oneOfRef_3");
    }
}
