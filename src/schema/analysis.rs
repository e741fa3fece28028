//! Reference Graph Analysis
//!
//! Treats the component table as a directed graph (schema -> schemas it names)
//! and reports the strongly connected components that form reference cycles,
//! plus references to names the table does not contain.
//!
//! The inliner terminates on cycles by itself; this analysis only tells the
//! caller where `$ref`s will remain in the output and why.

use petgraph::Direction;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashMap;

use super::{ComponentTable, SchemaNode, SchemaRef};

// =============================================================================
// Reference Path
// =============================================================================

/// A step from a schema root towards a named reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum RefSlot {
    /// A named property of an object
    Property(String),
    /// Array items
    Items,
    /// A oneOf member (index into oneOf)
    OneOf(usize),
    /// An allOf member (index into allOf)
    AllOf(usize),
}

impl std::fmt::Display for RefSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Property(name) => write!(f, ".{}", name),
            Self::Items => write!(f, "[]"),
            Self::OneOf(i) => write!(f, "<oneOf:{}>", i),
            Self::AllOf(i) => write!(f, "<allOf:{}>", i),
        }
    }
}

/// Path from a schema root to a reference
pub type RefPath = Vec<RefSlot>;

pub fn format_ref_path(path: &RefPath) -> String {
    if path.is_empty() {
        return String::from("<root>");
    }
    path.iter().map(|s| s.to_string()).collect::<String>()
}

// =============================================================================
// Results
// =============================================================================

/// Schemas that reach each other through named references
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleGroup {
    /// Members in table order
    pub members: Vec<String>,
    /// Single schema referring to itself
    pub is_self_referential: bool,
}

/// A named reference with no matching table entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DanglingRef {
    pub owner: String,
    pub path: RefPath,
    pub target: String,
}

impl std::fmt::Display for DanglingRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{} -> {}", self.owner, format_ref_path(&self.path), self.target)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefAnalysis {
    pub cycle_groups: Vec<CycleGroup>,
    pub dangling: Vec<DanglingRef>,
}

impl RefAnalysis {
    /// Whether `name` takes part in any reference cycle
    pub fn is_cyclic(&self, name: &str) -> bool {
        self.cycle_groups
            .iter()
            .any(|group| group.members.iter().any(|m| m == name))
    }
}

// =============================================================================
// Analysis
// =============================================================================

/// Every named reference below `node`, with the path leading to it
pub fn collect_refs(node: &SchemaNode) -> Vec<(RefPath, String)> {
    let mut found = Vec::new();
    walk_node(node, &mut Vec::new(), &mut found);
    found
}

fn walk_node(node: &SchemaNode, path: &mut RefPath, found: &mut Vec<(RefPath, String)>) {
    for (name, value) in &node.properties {
        path.push(RefSlot::Property(name.clone()));
        walk_ref(value, path, found);
        path.pop();
    }
    if let Some(items) = node.items.as_deref() {
        path.push(RefSlot::Items);
        walk_ref(items, path, found);
        path.pop();
    }
    for (i, member) in node.one_of.iter().enumerate() {
        path.push(RefSlot::OneOf(i));
        walk_ref(member, path, found);
        path.pop();
    }
    for (i, member) in node.all_of.iter().enumerate() {
        path.push(RefSlot::AllOf(i));
        walk_ref(member, path, found);
        path.pop();
    }
}

fn walk_ref(schema_ref: &SchemaRef, path: &mut RefPath, found: &mut Vec<(RefPath, String)>) {
    match schema_ref {
        SchemaRef::Named(target) => found.push((path.clone(), target.clone())),
        SchemaRef::Inline(node) => walk_node(node, path, found),
    }
}

/// Compute cycle groups and dangling references for a component table
pub fn analyze_refs(table: &ComponentTable) -> RefAnalysis {
    let mut graph: DiGraph<String, RefPath> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();

    for name in table.names() {
        index.insert(name.as_str(), graph.add_node(name.clone()));
    }

    let mut dangling = Vec::new();
    for (owner, node) in table.iter() {
        let from = index[owner.as_str()];
        for (path, target) in collect_refs(node) {
            match index.get(target.as_str()) {
                Some(&to) => {
                    graph.add_edge(from, to, path);
                }
                None => dangling.push(DanglingRef {
                    owner: owner.clone(),
                    path,
                    target,
                }),
            }
        }
    }

    let mut cycle_groups = Vec::new();
    for scc in kosaraju_scc(&graph) {
        if scc.len() == 1 {
            let idx = scc[0];
            let self_ref = graph
                .edges_directed(idx, Direction::Outgoing)
                .any(|e| e.target() == idx);
            if self_ref {
                cycle_groups.push(CycleGroup {
                    members: vec![graph[idx].clone()],
                    is_self_referential: true,
                });
            }
        } else {
            let mut members: Vec<NodeIndex> = scc;
            members.sort();
            cycle_groups.push(CycleGroup {
                members: members.into_iter().map(|idx| graph[idx].clone()).collect(),
                is_self_referential: false,
            });
        }
    }

    // deterministic order: by first member's position in the table
    cycle_groups.sort_by_key(|group| {
        group
            .members
            .first()
            .and_then(|name| index.get(name.as_str()))
            .map(|idx| idx.index())
    });

    RefAnalysis { cycle_groups, dangling }
}
