use crate::config::{GeneratorConfig, RootDescriptor, RouteDocumentation};
use crate::error::{Diagnostic, Error, Result};
use crate::reader::{self, scalar_text};
use log::{debug, info, warn};
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Locates documentable routes across the fragments referenced by the root
/// descriptor's `functions` list.
///
/// References are resolved relative to `base_dir`, normally the directory the
/// tool was invoked from. A reference to a file that does not exist is
/// skipped with a warning; a fragment that exists but cannot be parsed aborts
/// discovery.
///
/// # Example
///
/// ```no_run
/// use openapi_from_serverless::discovery::RouteDiscovery;
/// use std::path::PathBuf;
///
/// let discovery = RouteDiscovery::new(PathBuf::from("."));
/// let result = discovery
///     .discover(&["${file(functions/widgets.yml)}".to_string()])
///     .unwrap();
/// println!("Found {} fragments", result.fragments.len());
/// ```
pub struct RouteDiscovery {
    base_dir: PathBuf,
}

/// Result of a discovery pass.
#[derive(Debug, Default)]
pub struct DiscoveryResult {
    /// Fragments with at least one documentable route, in reference order
    pub fragments: Vec<DiscoveredFragment>,
    /// Non-fatal conditions, e.g. references to missing files
    pub diagnostics: Vec<Diagnostic>,
}

impl DiscoveryResult {
    pub fn route_count(&self) -> usize {
        self.fragments.iter().map(|f| f.routes.len()).sum()
    }
}

/// A fragment file and its documentable routes, in declaration order.
#[derive(Debug, Clone)]
pub struct DiscoveredFragment {
    /// Path as written in the reference, with the template wrapper removed
    pub path: PathBuf,
    /// Path the fragment was read from
    pub resolved_path: PathBuf,
    pub routes: Vec<Route>,
}

impl DiscoveredFragment {
    pub fn route_names(&self) -> Vec<&str> {
        self.routes.iter().map(|route| route.name.as_str()).collect()
    }
}

/// A named function definition and its trigger events.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub name: String,
    pub events: Vec<RouteEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteEvent {
    Http(HttpTrigger),
    /// Any non-HTTP trigger (sqs, schedule, s3, ...)
    Other,
}

/// An `http` event, from either the detailed mapping or the `"GET path"` shorthand.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpTrigger {
    pub path: String,
    pub method: String,
    /// Present only when the event carries a non-empty `documentation` mapping
    pub documentation: Option<RouteDocumentation>,
}

impl Route {
    fn from_value(name: String, definition: &Value, source: &Path) -> Result<Self> {
        let events = match definition.get("events") {
            Some(Value::Sequence(events)) => events
                .iter()
                .map(|event| RouteEvent::from_value(event, source))
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };
        Ok(Route { name, events })
    }

    /// HTTP triggers that carry documentation.
    pub fn documented_triggers(&self) -> impl Iterator<Item = &HttpTrigger> {
        self.events.iter().filter_map(|event| match event {
            RouteEvent::Http(trigger) if trigger.documentation.is_some() => Some(trigger),
            _ => None,
        })
    }

    /// A route is documentable when at least one HTTP trigger carries documentation.
    pub fn is_documentable(&self) -> bool {
        self.documented_triggers().next().is_some()
    }
}

impl RouteEvent {
    fn from_value(event: &Value, source: &Path) -> Result<Self> {
        match event.get("http") {
            Some(Value::String(shorthand)) => {
                let shorthand = shorthand.trim();
                let (method, path) = shorthand
                    .split_once(char::is_whitespace)
                    .unwrap_or((shorthand, ""));
                Ok(RouteEvent::Http(HttpTrigger {
                    path: path.trim().to_string(),
                    method: method.to_string(),
                    documentation: None,
                }))
            }
            Some(http @ Value::Mapping(_)) => Ok(RouteEvent::Http(HttpTrigger::from_value(http, source)?)),
            _ => Ok(RouteEvent::Other),
        }
    }
}

impl HttpTrigger {
    fn from_value(http: &Value, source: &Path) -> Result<Self> {
        let text = |key: &str| http.get(key).and_then(scalar_text).unwrap_or_default();
        let documentation = match http.get("documentation") {
            Some(Value::Mapping(block)) if !block.is_empty() => Some(
                serde_yaml::from_value(Value::Mapping(block.clone()))
                    .map_err(|e| Error::parse(source, format!("http.documentation: {}", e)))?,
            ),
            _ => None,
        };
        Ok(HttpTrigger {
            path: text("path"),
            method: text("method"),
            documentation,
        })
    }
}

/// Strips the `${file(...)}` wrapper from a function reference.
///
/// A plain path without any `${` is accepted as is. Any other variable
/// syntax, including selectors such as `${file(a.yml):key}`, is rejected.
pub fn strip_file_reference(reference: &str) -> Result<String> {
    let malformed = || Error::MalformedReference {
        reference: reference.to_string(),
    };
    let trimmed = reference.trim();

    if let Some(inner) = trimmed.strip_prefix("${file(") {
        let path = inner.strip_suffix(")}").ok_or_else(malformed)?.trim();
        if path.is_empty() || path.contains("${") || path.contains(')') {
            return Err(malformed());
        }
        return Ok(path.to_string());
    }

    if trimmed.is_empty() || trimmed.contains("${") {
        return Err(malformed());
    }
    Ok(trimmed.to_string())
}

/// Parses a fragment file into its routes, in declaration order.
pub fn load_fragment(path: &Path) -> Result<Vec<Route>> {
    match reader::parse_file(path)? {
        Value::Null => Ok(Vec::new()),
        Value::Mapping(definitions) => definitions
            .iter()
            .map(|(name, definition)| {
                let name = scalar_text(name).unwrap_or_default();
                Route::from_value(name, definition, path)
            })
            .collect(),
        _ => Err(Error::parse(path, "a function fragment must be a mapping of function names")),
    }
}

impl RouteDiscovery {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Resolves each reference and collects the documentable routes of every
    /// fragment that has any.
    ///
    /// # Errors
    ///
    /// Returns an error if a reference is malformed or an existing fragment
    /// cannot be read or parsed.
    pub fn discover(&self, references: &[String]) -> Result<DiscoveryResult> {
        let mut result = DiscoveryResult::default();

        for reference in references {
            let path = PathBuf::from(strip_file_reference(reference)?);
            let resolved_path = self.base_dir.join(&path);

            if !resolved_path.is_file() {
                let diagnostic = Diagnostic::MissingFragment {
                    path: resolved_path,
                };
                warn!("{}", diagnostic);
                result.diagnostics.push(diagnostic);
                continue;
            }

            info!("Processing file: {}", resolved_path.display());
            let routes: Vec<Route> = load_fragment(&resolved_path)?
                .into_iter()
                .filter(|route| {
                    let documentable = route.is_documentable();
                    if !documentable {
                        debug!("Skipping undocumented function: {}", route.name);
                    }
                    documentable
                })
                .collect();

            if routes.is_empty() {
                debug!("No documented routes in {}", resolved_path.display());
                continue;
            }

            debug!(
                "Found {} documented routes in {}",
                routes.len(),
                resolved_path.display()
            );
            result.fragments.push(DiscoveredFragment {
                path,
                resolved_path,
                routes,
            });
        }

        Ok(result)
    }
}

/// Loads the root descriptor named by `config` and discovers its routes.
///
/// # Errors
///
/// Returns [`Error::ConfigNotFound`] if the root descriptor does not exist.
pub fn discover(config: &GeneratorConfig) -> Result<DiscoveryResult> {
    let root = RootDescriptor::load(&config.root_config)?;
    RouteDiscovery::new(config.base_dir.clone()).discover(&root.function_references)
}
