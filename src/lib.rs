//! Ontology to OpenAPI Converter
//!
//! Reconstructs an OpenAPI 3.0 document (info, servers, paths, component
//! schemas) from an RDF graph that describes an HTTP API.
//!
//! ## Features
//!
//! - **Two Annotation Conventions**: coarse comma-separated field lists with
//!   `has*` relations, or fine per-attribute predicates with property nodes
//! - **Composition Recovery**: `oneOf` / `allOf` and nested array items from
//!   indexed predicate families
//! - **Reference Inlining**: named references expanded recursively with a
//!   per-path cycle guard
//! - **Reference Diagnostics**: cycle groups and dangling references reported
//!   for every run
//!
//! ## Architecture
//!
//! ```text
//! store      graph loading (Turtle / N-Triples) and indexed lookups
//!   │
//! schema     builder ─► sequence / relations ─► component table ─► inline
//!   │
//! document   operation assembler ─► Document ─► JSON
//!   │
//! convert    one ConversionRun per graph, report
//! ```

pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod schema;
pub mod store;
pub mod vocab;

pub use config::{ConventionChoice, ConverterConfig, OutputFormat};
pub use convert::{Conversion, ConversionReport, Converter, detect_convention};
pub use document::{Document, HttpMethod, Operation, infer_status_code};
pub use error::{ConvertError, Result};
pub use schema::{
    CoarseBuilder, ComponentTable, Convention, FineBuilder, Inliner, SchemaBuilder, SchemaKind,
    SchemaNode, SchemaRef,
};
pub use store::{Node, TripleStore};
