//! Property / Relation Mapper
//!
//! Decides how the target of a `has*` relation becomes a property of the
//! schema that owns the relation. The rules form a closed, ordered table:
//!
//! | Target stable name            | Property key | Shape                    |
//! |-------------------------------|--------------|--------------------------|
//! | ends with `_data`             | `data`       | array of refs to target  |
//! | ends with `_results`          | `results`    | array of refs to target  |
//! | listed in `field_objectArray` | name         | array of refs to target  |
//! | anything else                 | name         | single ref to target     |
//!
//! The relation predicate itself never influences the outcome.

use super::{SchemaNode, SchemaRef};

const DATA_SUFFIX: &str = "_data";
const RESULTS_SUFFIX: &str = "_results";

/// Where a relation target lands in the owning schema
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMapping {
    pub key: String,
    pub schema: SchemaRef,
}

/// Map a relation target named `target_name` onto a property.
///
/// `target` is the reference to embed (named or inline); `declared_arrays` are
/// the names from the owning schema's array declaration, compared
/// case-insensitively.
pub fn map_relation(target_name: &str, target: SchemaRef, declared_arrays: &[String]) -> PropertyMapping {
    if target_name.ends_with(DATA_SUFFIX) {
        return PropertyMapping {
            key: "data".to_string(),
            schema: SchemaRef::inline(SchemaNode::array(target)),
        };
    }

    if target_name.ends_with(RESULTS_SUFFIX) {
        return PropertyMapping {
            key: "results".to_string(),
            schema: SchemaRef::inline(SchemaNode::array(target)),
        };
    }

    let declared = declared_arrays
        .iter()
        .any(|name| name.eq_ignore_ascii_case(target_name));

    let schema = if declared {
        SchemaRef::inline(SchemaNode::array(target))
    } else {
        target
    };

    PropertyMapping {
        key: target_name.to_string(),
        schema,
    }
}
