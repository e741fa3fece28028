//! API Document Model
//!
//! OpenAPI 3.0 shaped object model the conversion produces, and its JSON
//! rendering. Maps are insertion-ordered so the same graph always renders to
//! the same bytes.

pub mod operations;

pub use operations::{OperationAssembler, infer_status_code};

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{DocumentConfig, OutputFormat};
use crate::error::Result;
use crate::schema::{ComponentTable, SchemaRef};
use crate::store::TripleStore;
use crate::vocab;

// =============================================================================
// Document
// =============================================================================

/// Root of a generated API description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub openapi: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    pub paths: IndexMap<String, PathItem>,
    pub components: Components,
}

impl Document {
    pub fn new(openapi: impl Into<String>, info: Info) -> Self {
        Self {
            openapi: openapi.into(),
            info,
            servers: Vec::new(),
            paths: IndexMap::new(),
            components: Components::default(),
        }
    }

    /// Store an operation; an existing (path, method) entry is replaced
    pub fn set_operation(&mut self, path: &str, method: HttpMethod, operation: Operation) {
        let item = self.paths.entry(path.to_string()).or_default();
        if item.operations.insert(method, operation).is_some() {
            tracing::debug!(path, %method, "operation redefined, keeping the later one");
        }
    }

    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path)?.operations.get(&method)
    }

    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|item| item.operations.len()).sum()
    }

    /// Every operation as (path, method, operation), in document order
    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpMethod, &Operation)> {
        self.paths.iter().flat_map(|(path, item)| {
            item.operations
                .iter()
                .map(move |(method, op)| (path.as_str(), *method, op))
        })
    }

    pub fn to_json(&self, format: OutputFormat) -> Result<String> {
        let json = match format {
            OutputFormat::Pretty => serde_json::to_string_pretty(self)?,
            OutputFormat::Compact => serde_json::to_string(self)?,
        };
        Ok(json)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Components {
    pub schemas: ComponentTable,
}

// =============================================================================
// Metadata
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Info {
    /// Read title, version and description from the node carrying `apiTitle`
    /// or `apiVersion`, falling back to configured defaults
    pub fn from_store(store: &TripleStore, defaults: &DocumentConfig) -> Self {
        let subject = store
            .subjects_with(vocab::API_TITLE)
            .into_iter()
            .chain(store.subjects_with(vocab::API_VERSION))
            .next();

        let read = |predicate: &str| subject.and_then(|s| store.literal(s, predicate)).map(str::to_string);

        Self {
            title: read(vocab::API_TITLE).unwrap_or_else(|| defaults.default_title.clone()),
            version: read(vocab::API_VERSION).unwrap_or_else(|| defaults.default_version.clone()),
            description: read(vocab::API_DESCRIPTION),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Server {
    pub url: String,
}

impl Server {
    /// Every `serverUrl` literal in the graph, each a comma list, deduplicated
    pub fn from_store(store: &TripleStore) -> Vec<Server> {
        let mut urls: Vec<String> = Vec::new();
        for subject in store.subjects_with(vocab::SERVER_URL) {
            if let Some(list) = store.literal(subject, vocab::SERVER_URL) {
                for url in vocab::comma_list(list) {
                    if !urls.contains(&url) {
                        urls.push(url);
                    }
                }
            }
        }
        urls.into_iter().map(|url| Server { url }).collect()
    }
}

// =============================================================================
// Operations
// =============================================================================

/// HTTP methods an operation can be registered under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Case-insensitive parse; anything unrecognized is GET
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "get" => HttpMethod::Get,
            "put" => HttpMethod::Put,
            "post" => HttpMethod::Post,
            "delete" => HttpMethod::Delete,
            "options" => HttpMethod::Options,
            "head" => HttpMethod::Head,
            "patch" => HttpMethod::Patch,
            "trace" => HttpMethod::Trace,
            other => {
                tracing::warn!(method = other, "unknown HTTP method, using get");
                HttpMethod::Get
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations sharing one path
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PathItem {
    pub operations: IndexMap<HttpMethod, Operation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,

    /// Status code -> response, in insertion order
    pub responses: IndexMap<String, Response>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

impl Operation {
    pub fn has_success_response(&self) -> bool {
        self.responses.keys().any(|code| code.starts_with('2'))
    }

    /// Every schema attached to this operation with a label for diagnostics
    pub fn schemas(&self) -> Vec<(String, &SchemaRef)> {
        let mut schemas = Vec::new();
        for parameter in &self.parameters {
            schemas.push((format!("parameter {}", parameter.name), &parameter.schema));
        }
        if let Some(body) = &self.request_body {
            for media in body.content.values() {
                schemas.push(("requestBody".to_string(), &media.schema));
            }
        }
        for (code, response) in &self.responses {
            for media in response.content.values() {
                schemas.push((format!("response {}", code), &media.schema));
            }
        }
        schemas
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Header,
    Query,
    Path,
    Cookie,
}

impl ParameterLocation {
    /// Case-insensitive parse; anything unrecognized is a query parameter
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "header" => ParameterLocation::Header,
            "path" => ParameterLocation::Path,
            "cookie" => ParameterLocation::Cookie,
            "query" => ParameterLocation::Query,
            other => {
                tracing::warn!(location = other, "unknown parameter location, using query");
                ParameterLocation::Query
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: SchemaRef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaType {
    pub schema: SchemaRef,
}

/// Content type -> media type
pub type Content = IndexMap<String, MediaType>;

pub fn content_of(content_type: &str, schema: SchemaRef) -> Content {
    let mut content = Content::new();
    content.insert(content_type.to_string(), MediaType { schema });
    content
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    pub content: Content,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub content: Content,
}

impl Response {
    pub fn without_content(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            content: Content::new(),
        }
    }
}
