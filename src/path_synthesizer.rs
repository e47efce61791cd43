//! Turns documented HTTP triggers into OpenAPI path fragments.
//!
//! Missing optional data never fails synthesis: absent fields take fixed
//! defaults, unknown header components become generic string headers and
//! undeclared tags are dropped. Each of those fallbacks is logged and reported
//! as a [`Diagnostic`].

use crate::config::{ComponentsRegistry, RouteDocumentation, TagRegistry};
use crate::discovery::{HttpTrigger, Route};
use crate::error::Diagnostic;
use crate::metadata::or_default;
use crate::openapi_builder::{HttpMethod, Operation, Parameter, PathFragment, Response};
use log::{debug, info, warn};
use serde_json::json;
use std::collections::BTreeMap;

pub const DEFAULT_SUMMARY: &str = "No summary provided";
pub const DEFAULT_DESCRIPTION: &str = "No description provided";

const HEADER_LOCATION: &str = "header";

/// Fragments produced for a trigger or route, plus the fallbacks taken.
#[derive(Debug, Default)]
pub struct PathSynthesis {
    pub fragments: Vec<PathFragment>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds path fragments against the run's read-only registries.
pub struct PathSynthesizer<'a> {
    components: &'a ComponentsRegistry,
    tags: &'a TagRegistry,
}

impl<'a> PathSynthesizer<'a> {
    pub fn new(components: &'a ComponentsRegistry, tags: &'a TagRegistry) -> Self {
        Self { components, tags }
    }

    /// Synthesizes one fragment per documented HTTP trigger of `route`, in
    /// event order.
    pub fn synthesize_route(&self, route: &Route) -> PathSynthesis {
        debug!("Synthesizing paths for function: {}", route.name);
        let mut synthesis = PathSynthesis::default();
        for trigger in route.documented_triggers() {
            let PathSynthesis {
                fragments,
                diagnostics,
            } = self.synthesize_path(trigger);
            synthesis.fragments.extend(fragments);
            synthesis.diagnostics.extend(diagnostics);
        }
        synthesis
    }

    /// Synthesizes the fragment for a single trigger.
    ///
    /// Yields no fragment when the trigger has no documentation or its method
    /// has no OpenAPI operation.
    pub fn synthesize_path(&self, trigger: &HttpTrigger) -> PathSynthesis {
        let mut synthesis = PathSynthesis::default();
        let Some(documentation) = &trigger.documentation else {
            return synthesis;
        };

        let path = normalize_path(&trigger.path);
        let Some(method) = HttpMethod::parse(&trigger.method) else {
            let diagnostic = Diagnostic::UnsupportedMethod {
                path,
                method: trigger.method.clone(),
            };
            warn!("{}", diagnostic);
            synthesis.diagnostics.push(diagnostic);
            return synthesis;
        };

        let operation = Operation {
            summary: or_default(documentation.summary.as_deref(), DEFAULT_SUMMARY),
            description: or_default(documentation.description.as_deref(), DEFAULT_DESCRIPTION),
            // The path as declared; may repeat across methods of one path.
            operation_id: or_default(documentation.operation_id.as_deref(), &trigger.path),
            parameters: self.header_parameters(documentation, &mut synthesis.diagnostics),
            responses: default_responses(),
            tags: self.valid_tags(documentation, &mut synthesis.diagnostics),
        };

        debug!("Synthesized {} {}", method, path);
        synthesis.fragments.push(PathFragment {
            path,
            method,
            operation,
        });
        synthesis
    }

    fn header_parameters(
        &self,
        documentation: &RouteDocumentation,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<Parameter> {
        documentation
            .request_headers
            .iter()
            .map(|name| {
                let fallback_description = format!("Header parameter {}", name);
                match self.components.header(name) {
                    Some(component) => Parameter {
                        name: name.clone(),
                        location: HEADER_LOCATION.to_string(),
                        description: or_default(
                            component.description.as_deref(),
                            &fallback_description,
                        ),
                        required: component.required.unwrap_or(false),
                        schema: component.schema.clone().unwrap_or_else(string_schema),
                    },
                    None => {
                        let diagnostic = Diagnostic::MissingComponent {
                            header: name.clone(),
                        };
                        info!("{}", diagnostic);
                        diagnostics.push(diagnostic);
                        Parameter {
                            name: name.clone(),
                            location: HEADER_LOCATION.to_string(),
                            description: fallback_description,
                            required: false,
                            schema: string_schema(),
                        }
                    }
                }
            })
            .collect()
    }

    fn valid_tags(
        &self,
        documentation: &RouteDocumentation,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Vec<String>> {
        let mut valid = Vec::with_capacity(documentation.tags.len());
        for tag in &documentation.tags {
            if self.tags.contains(tag) {
                valid.push(tag.clone());
            } else {
                let diagnostic = Diagnostic::UnknownTag { tag: tag.clone() };
                warn!("{}", diagnostic);
                diagnostics.push(diagnostic);
            }
        }
        if valid.is_empty() {
            None
        } else {
            Some(valid)
        }
    }
}

/// Serverless paths are usually written without a leading slash.
fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

fn string_schema() -> serde_json::Value {
    json!({ "type": "string" })
}

/// The fixed response set; custom responses cannot be declared.
fn default_responses() -> BTreeMap<String, Response> {
    [
        ("200", "Success"),
        ("400", "Bad Request"),
        ("500", "Internal Server Error"),
    ]
    .into_iter()
    .map(|(code, description)| {
        (
            code.to_string(),
            Response {
                description: description.to_string(),
            },
        )
    })
    .collect()
}
