//! Reference Inliner
//!
//! Replaces named references with copies of the referenced schema, recursively.
//! Each expansion path keeps a stack of the names currently being expanded; a
//! reference to a name already on the stack is left as a `$ref`, which is what
//! terminates self and mutual recursion. Names missing from the table are also
//! left as references.
//!
//! The stack bounds depth but not breadth: a densely connected group of
//! schemas fans out along every path through it. Each root expansion therefore
//! carries a budget of named expansions; once it is spent, further references
//! below that root stay `$ref`.
//!
//! The inliner never mutates the table it reads. A tree without named
//! references comes back unchanged.

use super::{ComponentTable, SchemaNode, SchemaRef};

/// Named expansions allowed below one root before references are kept
pub const DEFAULT_EXPANSION_BUDGET: usize = 1024;

pub struct Inliner<'a> {
    table: &'a ComponentTable,
    budget: usize,
}

/// State of one root expansion
struct Expansion {
    stack: Vec<String>,
    remaining: usize,
    exhausted: bool,
}

impl Expansion {
    fn new(budget: usize, root: Option<&str>) -> Self {
        Self {
            stack: root.map(str::to_string).into_iter().collect(),
            remaining: budget,
            exhausted: false,
        }
    }
}

impl<'a> Inliner<'a> {
    pub fn new(table: &'a ComponentTable) -> Self {
        Self::with_budget(table, DEFAULT_EXPANSION_BUDGET)
    }

    pub fn with_budget(table: &'a ComponentTable, budget: usize) -> Self {
        Self { table, budget }
    }

    /// Inline every reference reachable from `schema_ref`
    pub fn inline_ref(&self, schema_ref: &SchemaRef) -> SchemaRef {
        let mut expansion = Expansion::new(self.budget, None);
        let expanded = self.expand_ref(schema_ref, &mut expansion);
        self.report_exhausted("<inline>", &expansion);
        expanded
    }

    /// Inline every reference below `node`
    pub fn inline_node(&self, node: &SchemaNode) -> SchemaNode {
        let mut expansion = Expansion::new(self.budget, None);
        let expanded = self.expand_node(node, &mut expansion);
        self.report_exhausted("<inline>", &expansion);
        expanded
    }

    /// New table where each entry is inlined with its own name on the stack
    pub fn inline_table(&self) -> ComponentTable {
        self.table
            .iter()
            .map(|(name, node)| {
                let mut expansion = Expansion::new(self.budget, Some(name));
                let expanded = self.expand_node(node, &mut expansion);
                self.report_exhausted(name, &expansion);
                (name.clone(), expanded)
            })
            .collect()
    }

    fn report_exhausted(&self, root: &str, expansion: &Expansion) {
        if expansion.exhausted {
            tracing::warn!(
                root,
                budget = self.budget,
                "inline expansion budget spent, remaining references kept as $ref"
            );
        }
    }

    fn expand_ref(&self, schema_ref: &SchemaRef, expansion: &mut Expansion) -> SchemaRef {
        match schema_ref {
            SchemaRef::Named(name) => {
                if expansion.stack.iter().any(|on_path| on_path == name) {
                    tracing::debug!(name = %name, "reference back into current path, keeping $ref");
                    return schema_ref.clone();
                }
                let Some(target) = self.table.get(name) else {
                    tracing::debug!(name = %name, "reference to unknown component, keeping $ref");
                    return schema_ref.clone();
                };
                if expansion.remaining == 0 {
                    expansion.exhausted = true;
                    return schema_ref.clone();
                }

                expansion.remaining -= 1;
                expansion.stack.push(name.clone());
                let expanded = self.expand_node(target, expansion);
                expansion.stack.pop();
                SchemaRef::inline(expanded)
            }
            SchemaRef::Inline(node) => SchemaRef::inline(self.expand_node(node, expansion)),
        }
    }

    fn expand_node(&self, node: &SchemaNode, expansion: &mut Expansion) -> SchemaNode {
        let mut expanded = node.clone();

        for value in expanded.properties.values_mut() {
            *value = self.expand_ref(value, expansion);
        }
        if let Some(items) = expanded.items.as_mut() {
            **items = self.expand_ref(items, expansion);
        }
        for member in expanded.one_of.iter_mut().chain(expanded.all_of.iter_mut()) {
            *member = self.expand_ref(member, expansion);
        }

        expanded
    }
}
