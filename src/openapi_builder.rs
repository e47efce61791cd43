use crate::config::CollisionPolicy;
use crate::error::{Diagnostic, Error, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// OpenAPI version emitted in every generated document
pub const OPENAPI_VERSION: &str = "3.0.0";

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// API paths (URL path -> PathItem)
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    pub description: String,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    pub description: String,
}

/// OpenAPI Tag object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub description: String,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    /// The operation slot for `method`
    pub fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
        }
    }

    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
        }
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub summary: String,
    pub description: String,
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Header parameters, possibly empty
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Status code -> response
    pub responses: BTreeMap<String, Response>,
    /// Omitted entirely when no declared tag survives validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Parameter location; always `header` for generated parameters
    #[serde(rename = "in")]
    pub location: String,
    pub description: String,
    pub required: bool,
    /// Passed through from the components registry unchanged
    pub schema: serde_json::Value,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
}

/// HTTP methods that map onto OpenAPI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    /// Parses a method name case-insensitively. Returns `None` for methods
    /// OpenAPI has no operation for (such as serverless' `any`).
    pub fn parse(method: &str) -> Option<Self> {
        match method.trim().to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            _ => None,
        }
    }

    /// Lower-case name, as used for PathItem keys
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-path, single-method slice of a document: `{path -> {method -> operation}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathFragment {
    pub path: String,
    pub method: HttpMethod,
    pub operation: Operation,
}

impl PathFragment {
    /// The fragment as a partial document, `{"paths": {path: {method: operation}}}`,
    /// ready to be merge-written.
    pub fn to_document_value(&self) -> Result<serde_json::Value> {
        let mut item = PathItem::default();
        *item.slot(self.method) = Some(self.operation.clone());
        let mut paths = BTreeMap::new();
        paths.insert(self.path.clone(), item);
        Ok(serde_json::json!({ "paths": serde_json::to_value(paths)? }))
    }
}

/// In-memory accumulator for the document of one run.
///
/// Starts from the metadata skeleton and merges path fragments into it
/// path -> method -> operation, applying the configured collision policy when
/// a path and method pair is documented twice.
pub struct OpenApiBuilder {
    document: OpenApiDocument,
    collision_policy: CollisionPolicy,
}

impl OpenApiBuilder {
    pub fn new(skeleton: OpenApiDocument, collision_policy: CollisionPolicy) -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            document: skeleton,
            collision_policy,
        }
    }

    /// Merges one path fragment into the document.
    ///
    /// Returns a [`Diagnostic::DuplicateOperation`] when an existing operation
    /// was replaced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateOperation`] on a collision when the policy is
    /// [`CollisionPolicy::Fail`]; the document is left unchanged.
    pub fn add_path(&mut self, fragment: PathFragment) -> Result<Option<Diagnostic>> {
        debug!("Adding path: {} {}", fragment.method, fragment.path);

        let item = self.document.paths.entry(fragment.path.clone()).or_default();
        let slot = item.slot(fragment.method);

        let diagnostic = if slot.is_some() {
            if self.collision_policy == CollisionPolicy::Fail {
                return Err(Error::DuplicateOperation {
                    path: fragment.path,
                    method: fragment.method.to_string(),
                });
            }
            let diagnostic = Diagnostic::DuplicateOperation {
                path: fragment.path.clone(),
                method: fragment.method.to_string(),
            };
            warn!("{}", diagnostic);
            Some(diagnostic)
        } else {
            None
        };

        *slot = Some(fragment.operation);
        Ok(diagnostic)
    }

    pub fn document(&self) -> &OpenApiDocument {
        &self.document
    }

    /// Build the final OpenAPI document
    pub fn build(self) -> OpenApiDocument {
        debug!(
            "Building final OpenAPI document with {} paths",
            self.document.paths.len()
        );
        self.document
    }
}
