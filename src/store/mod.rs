//! Triple Store Facade
//!
//! Read-only, indexed view over an RDF graph. Queries are keyed by predicate
//! *local name* (the segment after the last `#` or `/`), so the engine does not
//! care which namespace the producer used for its annotation vocabulary.
//!
//! The store is built once per conversion run and never mutated afterwards.

pub mod loader;

pub use loader::{GraphFormat, load_file, load_file_as};

use indexmap::IndexSet;
use std::collections::HashMap;
use std::fmt;

use crate::vocab;

/// A subject or node-valued object in the graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    /// IRI-identified node with a stable identity
    Named(String),
    /// Blank node, labelled by load order (`0`, `1`, ...) within one load
    Blank(String),
}

impl Node {
    pub fn named(iri: impl Into<String>) -> Self {
        Node::Named(iri.into())
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Node::Blank(id.into())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Node::Blank(_))
    }

    /// Stable name: trailing path/fragment segment for IRIs, `anon_<ordinal>` for blank nodes
    pub fn stable_name(&self) -> String {
        match self {
            Node::Named(iri) => local_name(iri).to_string(),
            Node::Blank(id) => format!("anon_{}", id),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Named(iri) => write!(f, "<{}>", iri),
            Node::Blank(id) => write!(f, "_:{}", id),
        }
    }
}

/// Object position of a statement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Object {
    Node(Node),
    /// Lexical value of a literal; datatype and language tag are not kept
    Literal(String),
}

impl Object {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Object::Node(node) => Some(node),
            Object::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Object::Literal(value) => Some(value),
            Object::Node(_) => None,
        }
    }
}

/// One indexed triple
#[derive(Debug, Clone)]
pub struct Statement {
    pub subject: Node,
    /// Full predicate IRI
    pub predicate_iri: String,
    /// Local name of the predicate, used for matching
    pub predicate: String,
    pub object: Object,
}

/// Trailing path or fragment segment of an IRI; URNs split on their last `:`
pub fn local_name(iri: &str) -> &str {
    let trimmed = iri.trim_end_matches(['/', '#', ':']);
    match trimmed.rfind(['#', '/']).or_else(|| trimmed.rfind(':')) {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    }
}

/// Statistics about a loaded store
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub statements: usize,
    pub subjects: usize,
    pub predicates: usize,
}

/// Indexed triple store
#[derive(Debug, Clone, Default)]
pub struct TripleStore {
    /// All statements in load order
    statements: Vec<Statement>,

    /// Index: subject -> statement positions
    by_subject: HashMap<Node, Vec<usize>>,

    /// Index: predicate local name -> statement positions
    by_predicate: HashMap<String, Vec<usize>>,

    /// Subjects in first-seen order
    subjects: IndexSet<Node>,
}

impl TripleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse Turtle text into a new store
    pub fn from_turtle(data: &str) -> crate::Result<Self> {
        loader::parse_str(data, GraphFormat::Turtle, "<inline>")
    }

    /// Parse N-Triples text into a new store
    pub fn from_ntriples(data: &str) -> crate::Result<Self> {
        loader::parse_str(data, GraphFormat::NTriples, "<inline>")
    }

    /// Add one statement, keeping every index current
    pub fn insert(&mut self, subject: Node, predicate_iri: impl Into<String>, object: Object) {
        let predicate_iri = predicate_iri.into();
        let predicate = local_name(&predicate_iri).to_string();
        let position = self.statements.len();

        self.subjects.insert(subject.clone());
        self.by_subject.entry(subject.clone()).or_default().push(position);
        self.by_predicate.entry(predicate.clone()).or_default().push(position);
        self.statements.push(Statement {
            subject,
            predicate_iri,
            predicate,
            object,
        });
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            statements: self.statements.len(),
            subjects: self.subjects.len(),
            predicates: self.by_predicate.len(),
        }
    }

    /// All statements about a subject, in load order
    pub fn statements_about<'a>(&'a self, subject: &Node) -> impl Iterator<Item = &'a Statement> + 'a {
        self.by_subject
            .get(subject)
            .into_iter()
            .flatten()
            .map(move |&i| &self.statements[i])
    }

    /// The single literal object for (subject, predicate); first in load order wins
    pub fn literal(&self, subject: &Node, predicate: &str) -> Option<&str> {
        self.statements_about(subject)
            .filter(|s| s.predicate == predicate)
            .find_map(|s| s.object.as_literal())
    }

    /// Literal for the first predicate in `predicates` that is present
    pub fn first_literal(&self, subject: &Node, predicates: &[&str]) -> Option<&str> {
        predicates.iter().find_map(|p| self.literal(subject, p))
    }

    /// Node-valued objects for (subject, predicate)
    pub fn objects(&self, subject: &Node, predicate: &str) -> Vec<&Node> {
        self.statements_about(subject)
            .filter(|s| s.predicate == predicate)
            .filter_map(|s| s.object.as_node())
            .collect()
    }

    /// First node-valued object for (subject, predicate)
    pub fn object(&self, subject: &Node, predicate: &str) -> Option<&Node> {
        self.statements_about(subject)
            .filter(|s| s.predicate == predicate)
            .find_map(|s| s.object.as_node())
    }

    /// Every node-valued statement of a subject as (predicate local name, target)
    pub fn relations(&self, subject: &Node) -> Vec<(&str, &Node)> {
        self.statements_about(subject)
            .filter_map(|s| s.object.as_node().map(|node| (s.predicate.as_str(), node)))
            .collect()
    }

    /// Subjects of every statement matching (predicate, object)
    pub fn subjects_for(&self, predicate: &str, object: &Object) -> Vec<&Node> {
        let mut seen = IndexSet::new();
        for s in self.predicate_statements(predicate) {
            if &s.object == object {
                seen.insert(&s.subject);
            }
        }
        seen.into_iter().collect()
    }

    /// Subjects carrying `predicate`, in first-seen order
    pub fn subjects_with(&self, predicate: &str) -> Vec<&Node> {
        let mut seen = IndexSet::new();
        for s in self.predicate_statements(predicate) {
            seen.insert(&s.subject);
        }
        seen.into_iter().collect()
    }

    /// All subjects in first-seen order
    pub fn subjects(&self) -> impl Iterator<Item = &Node> {
        self.subjects.iter()
    }

    pub fn has_predicate(&self, predicate: &str) -> bool {
        self.by_predicate.contains_key(predicate)
    }

    /// Whether the subject carries the predicate with any object
    pub fn has(&self, subject: &Node, predicate: &str) -> bool {
        self.statements_about(subject).any(|s| s.predicate == predicate)
    }

    /// `rdf:type` check by class local name
    pub fn is_a(&self, subject: &Node, class: &str) -> bool {
        self.objects(subject, vocab::RDF_TYPE)
            .into_iter()
            .any(|node| node.stable_name() == class)
    }

    fn predicate_statements<'a>(&'a self, predicate: &str) -> impl Iterator<Item = &'a Statement> + 'a {
        self.by_predicate
            .get(predicate)
            .into_iter()
            .flatten()
            .map(move |&i| &self.statements[i])
    }
}
