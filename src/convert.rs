//! Conversion Runs
//!
//! A [`Converter`] holds configuration; each call to [`Converter::convert`]
//! starts a fresh [`ConversionRun`] that owns its own component table, picks a
//! single builder for the whole graph, discovers and builds every named schema,
//! assembles operations, and (coarse convention only) inlines references.

use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

use crate::config::{ConventionChoice, ConverterConfig};
use crate::document::{Document, Info, OperationAssembler, Server};
use crate::error::Result;
use crate::schema::{
    CoarseBuilder, ComponentTable, Convention, CycleGroup, DanglingRef, FineBuilder, Inliner,
    SchemaBuilder, SchemaRef, analyze_refs, collect_refs,
};
use crate::store::{self, GraphFormat, Node, TripleStore};
use crate::vocab;

/// Result of one run: the document plus what happened while building it
#[derive(Debug, Clone)]
pub struct Conversion {
    pub document: Document,
    pub report: ConversionReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    pub convention: Convention,
    pub schema_count: usize,
    pub operation_count: usize,
    /// Whether the reference inlining post-pass ran
    pub inlined: bool,
    pub cycle_groups: Vec<CycleGroup>,
    pub dangling_refs: Vec<DanglingRef>,
}

/// Pick the fine convention when any of its marker predicates occurs in the graph
pub fn detect_convention(store: &TripleStore) -> Convention {
    if vocab::FINE_MARKERS.iter().any(|p| store.has_predicate(p)) {
        Convention::Fine
    } else {
        Convention::Coarse
    }
}

pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convention a run over `store` will use
    pub fn select_convention(&self, store: &TripleStore) -> Convention {
        match self.config.conversion.convention {
            ConventionChoice::Auto => detect_convention(store),
            ConventionChoice::Coarse => Convention::Coarse,
            ConventionChoice::Fine => Convention::Fine,
        }
    }

    /// Convert an already loaded graph
    pub fn convert(&self, store: &TripleStore) -> Result<Conversion> {
        let convention = self.select_convention(store);
        let conversion = match convention {
            Convention::Coarse => ConversionRun::new(store, &self.config, CoarseBuilder::new(store)).execute(),
            Convention::Fine => ConversionRun::new(store, &self.config, FineBuilder::new(store)).execute(),
        };
        Ok(conversion)
    }

    /// Load a graph file and convert it
    pub fn convert_file(&self, path: &Path) -> Result<Conversion> {
        self.convert_file_as(path, None)
    }

    /// Load a graph file in an explicit format (or by extension) and convert it
    pub fn convert_file_as(&self, path: &Path, format: Option<GraphFormat>) -> Result<Conversion> {
        let store = store::load_file_as(path, format)?;
        tracing::info!(
            path = %path.display(),
            statements = store.len(),
            subjects = store.stats().subjects,
            "converting graph"
        );
        self.convert(&store)
    }
}

// =============================================================================
// Conversion Run
// =============================================================================

/// State of exactly one conversion; dropped when the run finishes
pub struct ConversionRun<'a, B: SchemaBuilder> {
    store: &'a TripleStore,
    config: &'a ConverterConfig,
    builder: B,
    table: ComponentTable,
    /// Which node each table name was built from
    origins: IndexMap<String, Node>,
}

impl<'a, B: SchemaBuilder> ConversionRun<'a, B> {
    pub fn new(store: &'a TripleStore, config: &'a ConverterConfig, builder: B) -> Self {
        Self {
            store,
            config,
            builder,
            table: ComponentTable::new(),
            origins: IndexMap::new(),
        }
    }

    pub fn execute(mut self) -> Conversion {
        let convention = self.builder.convention();
        tracing::debug!(%convention, "starting conversion run");

        self.build_components();

        let doc_config = &self.config.document;
        let mut document = Document::new(&doc_config.openapi_version, Info::from_store(self.store, doc_config));
        document.servers = Server::from_store(self.store);
        OperationAssembler::new(self.store, &self.builder, doc_config).assemble_into(&mut document);

        let analysis = analyze_refs(&self.table);
        let mut dangling_refs = analysis.dangling;
        dangling_refs.extend(self.dangling_in_operations(&document));

        for group in &analysis.cycle_groups {
            tracing::warn!(members = ?group.members, "reference cycle, $ref kept at the repeat point");
        }
        for dangling in &dangling_refs {
            tracing::warn!(reference = %dangling, "reference to a schema that was never built");
        }

        let inlined = convention == Convention::Coarse && self.config.conversion.inline_references;
        document.components.schemas = if inlined {
            Inliner::new(&self.table).inline_table()
        } else {
            self.table
        };

        let report = ConversionReport {
            convention,
            schema_count: document.components.schemas.len(),
            operation_count: document.operation_count(),
            inlined,
            cycle_groups: analysis.cycle_groups,
            dangling_refs,
        };

        tracing::info!(
            convention = %report.convention,
            schemas = report.schema_count,
            operations = report.operation_count,
            cycles = report.cycle_groups.len(),
            dangling = report.dangling_refs.len(),
            "conversion finished"
        );

        Conversion { document, report }
    }

    /// Discover named schema nodes and build each exactly once
    fn build_components(&mut self) {
        let store = self.store;
        let mut worklist: Vec<Node> = store
            .subjects()
            .filter(|node| !node.is_blank() && self.builder.recognizes(node))
            .cloned()
            .collect();

        if self.builder.convention() == Convention::Coarse {
            worklist.extend(self.operation_targets());
        }
        worklist.reverse();

        while let Some(node) = worklist.pop() {
            if node.is_blank() {
                continue;
            }

            let name = node.stable_name();
            if let Some(origin) = self.origins.get(&name) {
                if *origin != node {
                    tracing::warn!(name = %name, kept = %origin, ignored = %node, "two nodes share a schema name");
                }
                continue;
            }

            let schema = self.builder.build_schema(&node);
            tracing::debug!(name = %name, properties = schema.properties.len(), "built schema");

            // depth-first in relation order
            let mut referenced = self.builder.referenced_schemas(&node);
            referenced.reverse();

            self.table.insert(name.clone(), schema);
            self.origins.insert(name, node);
            worklist.extend(referenced);
        }
    }

    /// Named targets of operation relations (request bodies, responses, errors),
    /// including named schemas reached through blank inline bodies
    fn operation_targets(&self) -> Vec<Node> {
        let store = self.store;
        store
            .subjects_with(vocab::PATH)
            .into_iter()
            .flat_map(|op| {
                [vocab::HAS_REQUEST_BODY, vocab::HAS_RESPONSE, vocab::HAS_ERROR]
                    .into_iter()
                    .flat_map(move |predicate| store.objects(op, predicate))
            })
            .flat_map(|node| match node {
                Node::Named(_) => vec![node.clone()],
                Node::Blank(_) => self.builder.referenced_schemas(node),
            })
            .collect()
    }

    fn dangling_in_operations(&self, document: &Document) -> Vec<DanglingRef> {
        let mut dangling = Vec::new();
        for (path, method, operation) in document.operations() {
            for (label, schema) in operation.schemas() {
                let owner = format!("{} {} {}", method, path, label);
                match schema {
                    SchemaRef::Named(target) => {
                        if !self.table.contains(target) {
                            dangling.push(DanglingRef {
                                owner,
                                path: Vec::new(),
                                target: target.clone(),
                            });
                        }
                    }
                    SchemaRef::Inline(node) => {
                        for (ref_path, target) in collect_refs(node) {
                            if !self.table.contains(&target) {
                                dangling.push(DanglingRef {
                                    owner: owner.clone(),
                                    path: ref_path,
                                    target,
                                });
                            }
                        }
                    }
                }
            }
        }
        dangling
    }
}
