//! Operation Assembler
//!
//! Turns every node carrying a `path` literal into an operation and registers
//! it in the document under (path, method). Parameters, request bodies and
//! responses are read in the vocabulary of the run's builder; schemas they
//! carry are built with that same builder, so a run never mixes conventions.

use indexmap::IndexMap;

use super::{
    Document, HttpMethod, Operation, Parameter, ParameterLocation, RequestBody, Response, content_of,
};
use crate::config::DocumentConfig;
use crate::schema::{Convention, SchemaBuilder, SchemaNode, SchemaRef};
use crate::store::{Node, TripleStore};
use crate::vocab;

/// Status code for an error node, from digits embedded in its name.
///
/// Checks `401`, `403`, `404`, `500` in that order and falls back to `400`.
/// A name containing several codes resolves to the first in that order.
pub fn infer_status_code(name: &str) -> &'static str {
    const KNOWN: [&str; 4] = ["401", "403", "404", "500"];
    KNOWN
        .into_iter()
        .find(|code| name.contains(code))
        .unwrap_or("400")
}

/// Status for an error target; only named nodes carry a meaningful name
fn error_status(target: &Node) -> &'static str {
    match target {
        Node::Named(_) => infer_status_code(&target.stable_name()),
        Node::Blank(_) => "400",
    }
}

/// Coarse header annotations and the schema type each produces
const HEADER_FIELDS: &[(&str, &str)] = &[
    (vocab::HEADER_STRING, "string"),
    (vocab::HEADER_BOOLEAN, "boolean"),
    (vocab::HEADER_INTEGER, "integer"),
];

pub struct OperationAssembler<'a> {
    store: &'a TripleStore,
    builder: &'a dyn SchemaBuilder,
    config: &'a DocumentConfig,
}

impl<'a> OperationAssembler<'a> {
    pub fn new(store: &'a TripleStore, builder: &'a dyn SchemaBuilder, config: &'a DocumentConfig) -> Self {
        Self { store, builder, config }
    }

    /// Nodes describing operations, in first-seen order
    pub fn operation_nodes(&self) -> Vec<&'a Node> {
        self.store.subjects_with(vocab::PATH)
    }

    /// Register every operation in the graph on `document`
    pub fn assemble_into(&self, document: &mut Document) {
        for node in self.operation_nodes() {
            let Some(path) = self.store.literal(node, vocab::PATH).map(str::trim) else {
                continue;
            };
            let method = self
                .store
                .literal(node, vocab::METHOD)
                .map(HttpMethod::parse)
                .unwrap_or(HttpMethod::Get);

            let operation = self.build_operation(node);
            tracing::debug!(path, %method, responses = operation.responses.len(), "assembled operation");
            document.set_operation(path, method, operation);
        }
    }

    /// Build the operation described by `node`
    pub fn build_operation(&self, node: &Node) -> Operation {
        let store = self.store;
        let mut operation = Operation {
            tags: store.literal(node, vocab::TAGS).map(vocab::comma_list).unwrap_or_default(),
            summary: store.literal(node, vocab::SUMMARY).map(str::to_string),
            description: store.literal(node, vocab::DESCRIPTION).map(str::to_string),
            operation_id: store.literal(node, vocab::OPERATION_ID).map(str::to_string),
            deprecated: store.literal(node, vocab::DEPRECATED).is_some_and(vocab::is_truthy),
            ..Default::default()
        };

        match self.builder.convention() {
            Convention::Coarse => self.fill_coarse(node, &mut operation),
            Convention::Fine => self.fill_fine(node, &mut operation),
        }

        if !operation.has_success_response() {
            operation.responses.insert(
                "200".to_string(),
                Response::without_content(self.config.success_description.clone()),
            );
            // keep the success response first
            operation.responses.move_index(operation.responses.len() - 1, 0);
        }

        operation
    }

    // =========================================================================
    // Coarse convention
    // =========================================================================

    fn fill_coarse(&self, node: &Node, operation: &mut Operation) {
        let store = self.store;

        let required_headers = store
            .literal(node, vocab::HEADER_REQUIRED)
            .map(vocab::comma_list)
            .unwrap_or_default();

        for (predicate, schema_type) in HEADER_FIELDS {
            let Some(list) = store.literal(node, predicate) else {
                continue;
            };
            for name in vocab::comma_list(list) {
                operation.parameters.push(Parameter {
                    required: required_headers.contains(&name),
                    name,
                    location: ParameterLocation::Header,
                    description: None,
                    schema: SchemaRef::inline(SchemaNode::primitive(schema_type)),
                });
            }
        }

        if let Some(target) = store.object(node, vocab::HAS_REQUEST_BODY) {
            operation.request_body = Some(RequestBody {
                description: None,
                required: true,
                content: content_of(&self.config.content_type, self.builder.schema_ref(target)),
            });
        }

        if let Some(target) = store.object(node, vocab::HAS_RESPONSE) {
            operation.responses.insert(
                "200".to_string(),
                Response {
                    description: self.config.success_description.clone(),
                    content: content_of(&self.config.content_type, self.builder.schema_ref(target)),
                },
            );
        }

        for target in store.objects(node, vocab::HAS_ERROR) {
            let code = error_status(target);
            let description = store
                .literal(target, vocab::DESCRIPTION)
                .map(str::to_string)
                .unwrap_or_else(|| self.config.error_description.clone());
            operation.responses.insert(
                code.to_string(),
                Response {
                    description,
                    content: content_of(&self.config.content_type, self.builder.schema_ref(target)),
                },
            );
        }
    }

    // =========================================================================
    // Fine convention
    // =========================================================================

    fn fill_fine(&self, node: &Node, operation: &mut Operation) {
        let store = self.store;

        for parameter in store.objects(node, vocab::HAS_PARAMETER) {
            operation.parameters.push(self.fine_parameter(parameter));
        }

        if let Some(target) = store.object(node, vocab::HAS_REQUEST_BODY) {
            operation.request_body = Some(self.fine_request_body(target));
        }

        let mut responses: IndexMap<String, Response> = IndexMap::new();
        for target in store.objects(node, vocab::HAS_RESPONSE) {
            let code = store
                .literal(target, vocab::STATUS_CODE)
                .map(|c| c.trim().to_string())
                .unwrap_or_else(|| "200".to_string());
            responses.insert(code, self.fine_response(target, &self.config.success_description));
        }
        for target in store.objects(node, vocab::HAS_ERROR) {
            let code = store
                .literal(target, vocab::STATUS_CODE)
                .map(|c| c.trim().to_string())
                .unwrap_or_else(|| error_status(target).to_string());
            responses.insert(code, self.fine_response(target, &self.config.error_description));
        }
        operation.responses.extend(responses);
    }

    fn fine_parameter(&self, node: &Node) -> Parameter {
        let store = self.store;
        let schema = SchemaNode::of_type(
            store
                .literal(node, vocab::PARAMETER_TYPE)
                .map(str::trim)
                .unwrap_or("string"),
        )
        .with_format(store.literal(node, vocab::PARAMETER_FORMAT))
        .with_enum(
            store
                .literal(node, vocab::PARAMETER_ENUM)
                .map(vocab::semicolon_list)
                .unwrap_or_default(),
        );

        Parameter {
            name: store
                .literal(node, vocab::PARAMETER_NAME)
                .map(str::to_string)
                .unwrap_or_else(|| node.stable_name()),
            location: store
                .literal(node, vocab::PARAMETER_IN)
                .map(ParameterLocation::parse)
                .unwrap_or(ParameterLocation::Query),
            required: store
                .literal(node, vocab::PARAMETER_REQUIRED)
                .is_some_and(vocab::is_truthy),
            description: store.literal(node, vocab::PARAMETER_DESCRIPTION).map(str::to_string),
            schema: SchemaRef::inline(schema),
        }
    }

    fn fine_request_body(&self, node: &Node) -> RequestBody {
        let store = self.store;
        let schema = self
            .referenced_schema(node, vocab::REQUEST_BODY_REF)
            .unwrap_or_else(|| self.builder.schema_ref(node));
        let content_type = store
            .literal(node, vocab::CONTENT_TYPE)
            .unwrap_or(&self.config.content_type);

        RequestBody {
            description: store.literal(node, vocab::REQUEST_BODY_DESCRIPTION).map(str::to_string),
            required: store
                .literal(node, vocab::REQUEST_BODY_REQUIRED)
                .map_or(true, vocab::is_truthy),
            content: content_of(content_type, schema),
        }
    }

    fn fine_response(&self, node: &Node, default_description: &str) -> Response {
        let store = self.store;
        let description = store
            .literal(node, vocab::RESPONSE_DESCRIPTION)
            .unwrap_or(default_description)
            .to_string();

        let schema = self.referenced_schema(node, vocab::RESPONSE_REF).or_else(|| {
            (!node.is_blank() && self.builder.recognizes(node)).then(|| self.builder.schema_ref(node))
        });

        match schema {
            Some(schema) => {
                let content_type = store
                    .literal(node, vocab::CONTENT_TYPE)
                    .unwrap_or(&self.config.content_type);
                Response {
                    description,
                    content: content_of(content_type, schema),
                }
            }
            None => Response::without_content(description),
        }
    }

    /// Schema named by `ref_predicate` or attached through `hasInlineSchema`
    fn referenced_schema(&self, node: &Node, ref_predicate: &str) -> Option<SchemaRef> {
        if let Some(name) = self.store.literal(node, ref_predicate) {
            return Some(SchemaRef::named(name.trim()));
        }
        self.store
            .object(node, vocab::HAS_INLINE_SCHEMA)
            .map(|target| self.builder.schema_ref(target))
    }
}
