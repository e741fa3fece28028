//! Graph Loading
//!
//! Parses Turtle or N-Triples with oxttl and copies the triples into an owned
//! [`TripleStore`]. Loading is the only fatal step of a conversion run.

use oxrdf::{NamedOrBlankNode, Term, Triple};
use oxttl::{NTriplesParser, TurtleParser};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::{Node, Object, TripleStore};
use crate::error::{ConvertError, Result};

/// Serialized graph formats the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Turtle,
    NTriples,
}

impl GraphFormat {
    /// Pick a format from a file extension; unknown extensions are parsed as Turtle
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("nt") => GraphFormat::NTriples,
            _ => GraphFormat::Turtle,
        }
    }

    /// Whether a file looks like a graph this loader accepts (used by batch mode)
    pub fn is_graph_file(path: &Path) -> bool {
        matches!(
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase())
                .as_deref(),
            Some("ttl") | Some("turtle") | Some("nt")
        )
    }
}

impl std::str::FromStr for GraphFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "turtle" | "ttl" => Ok(GraphFormat::Turtle),
            "ntriples" | "n-triples" | "nt" => Ok(GraphFormat::NTriples),
            other => Err(ConvertError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Load a graph file into a new store, picking the format from its extension
pub fn load_file(path: &Path) -> Result<TripleStore> {
    load_file_as(path, None)
}

/// Load a graph file, with an explicit format taking precedence over the extension
pub fn load_file_as(path: &Path, format: Option<GraphFormat>) -> Result<TripleStore> {
    if !path.is_file() {
        return Err(ConvertError::InputNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let format = format.unwrap_or_else(|| GraphFormat::from_path(path));
    let store = parse_str(&content, format, &path.display().to_string())?;

    tracing::debug!(
        path = %path.display(),
        statements = store.len(),
        "loaded graph"
    );
    Ok(store)
}

/// Parse serialized graph text
pub fn parse_str(data: &str, format: GraphFormat, source: &str) -> Result<TripleStore> {
    let mut store = TripleStore::new();
    let mut blanks = BlankLabels::default();

    match format {
        GraphFormat::Turtle => {
            for result in TurtleParser::new().for_slice(data.as_bytes()) {
                let triple = result.map_err(|e| ConvertError::load(source, e))?;
                insert_triple(&mut store, &mut blanks, triple);
            }
        }
        GraphFormat::NTriples => {
            for result in NTriplesParser::new().for_slice(data.as_bytes()) {
                let triple = result.map_err(|e| ConvertError::load(source, e))?;
                insert_triple(&mut store, &mut blanks, triple);
            }
        }
    }

    Ok(store)
}

/// Parser blank node ids (random for `[ ]`) -> ordinals in first-seen order
#[derive(Default)]
struct BlankLabels {
    ordinals: HashMap<String, usize>,
}

impl BlankLabels {
    fn node(&mut self, id: String) -> Node {
        let next = self.ordinals.len();
        let ordinal = *self.ordinals.entry(id).or_insert(next);
        Node::Blank(ordinal.to_string())
    }
}

fn insert_triple(store: &mut TripleStore, blanks: &mut BlankLabels, triple: Triple) {
    let subject = match triple.subject {
        NamedOrBlankNode::NamedNode(n) => Node::Named(n.into_string()),
        NamedOrBlankNode::BlankNode(b) => blanks.node(b.into_string()),
    };

    let object = match triple.object {
        Term::NamedNode(n) => Object::Node(Node::Named(n.into_string())),
        Term::BlankNode(b) => Object::Node(blanks.node(b.into_string())),
        Term::Literal(l) => Object::Literal(l.value().to_string()),
        #[allow(unreachable_patterns)]
        _ => {
            tracing::debug!("skipping quoted triple object");
            return;
        }
    };

    store.insert(subject, triple.predicate.into_string(), object);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_turtle() {
        let store = TripleStore::from_turtle(
            r#"
            @prefix : <http://example.org/api#> .
            :User :field_string "name,age" ;
                  :hasAddress [ :field_string "street" ] .
            "#,
        )
        .unwrap();

        assert_eq!(store.len(), 3);
        let user = Node::named("http://example.org/api#User");
        assert_eq!(store.literal(&user, "field_string"), Some("name,age"));
        let address = store.object(&user, "hasAddress").unwrap();
        assert!(address.is_blank());
        assert_eq!(store.literal(address, "field_string"), Some("street"));
    }

    #[test]
    fn test_parse_ntriples() {
        let store = TripleStore::from_ntriples(
            "<http://example.org/a> <http://example.org/p#path> \"/users\" .\n",
        )
        .unwrap();
        assert_eq!(store.subjects_with("path").len(), 1);
    }

    #[test]
    fn test_syntax_error_is_load_error() {
        let err = TripleStore::from_turtle(":broken :triple").unwrap_err();
        assert!(matches!(err, ConvertError::Load { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_file(Path::new("/definitely/not/here.ttl")).unwrap_err();
        assert!(matches!(err, ConvertError::InputNotFound(_)));
    }

    #[test]
    fn test_blank_nodes_get_load_order_labels() {
        let data = r#"
            @prefix : <http://example.org/api#> .
            :User :hasProfile [ :hasAvatar [ :field_string "url" ] ] ;
                  :hasAddress _:home .
            _:home :field_string "street" .
        "#;
        let first = TripleStore::from_turtle(data).unwrap();
        let second = TripleStore::from_turtle(data).unwrap();

        let user = Node::named("http://example.org/api#User");
        let names = |store: &TripleStore| -> Vec<String> {
            store.relations(&user).iter().map(|(_, n)| n.stable_name()).collect()
        };
        assert_eq!(names(&first), names(&second));
        assert_eq!(
            first.subjects().map(Node::stable_name).collect::<Vec<_>>(),
            second.subjects().map(Node::stable_name).collect::<Vec<_>>()
        );
        assert!(names(&first).iter().all(|name| name.starts_with("anon_")));
    }

    #[test]
    fn test_explicit_format_overrides_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.txt");
        fs::write(&path, "<http://example.org/a> <http://example.org/p#path> \"/users\" .\n").unwrap();

        let store = load_file_as(&path, Some(GraphFormat::NTriples)).unwrap();
        assert_eq!(store.subjects_with("path").len(), 1);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("TTL".parse::<GraphFormat>().unwrap(), GraphFormat::Turtle);
        assert_eq!("n-triples".parse::<GraphFormat>().unwrap(), GraphFormat::NTriples);
        let err = "rdfxml".parse::<GraphFormat>().unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFormat(ref f) if f == "rdfxml"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(GraphFormat::from_path(&PathBuf::from("a.nt")), GraphFormat::NTriples);
        assert_eq!(GraphFormat::from_path(&PathBuf::from("a.ttl")), GraphFormat::Turtle);
        assert_eq!(GraphFormat::from_path(&PathBuf::from("a.owl")), GraphFormat::Turtle);
        assert!(GraphFormat::is_graph_file(&PathBuf::from("x.TTL")));
        assert!(!GraphFormat::is_graph_file(&PathBuf::from("x.json")));
    }
}
