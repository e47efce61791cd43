//! Configuration model: the run settings, the root deployment descriptor and
//! the documentation blocks it carries.
//!
//! Documentation blocks are written by hand in YAML, so every field is
//! optional and deserialized leniently: scalars of any type are accepted
//! where a string is expected, and malformed lists degrade to empty ones.
//! Defaults are applied later by the synthesizers, never here.

use crate::error::{Error, Result};
use crate::reader::{self, scalar_text};
use log::{debug, warn};
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default name of the root deployment descriptor
pub const DEFAULT_ROOT_CONFIG: &str = "serverless.yml";
/// Default output document
pub const DEFAULT_OUTPUT_FILE: &str = "swagger.yaml";

/// How path fragments reach the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteStrategy {
    /// Accumulate every fragment in memory and write the document once
    #[default]
    InMemory,
    /// Write the skeleton, then merge-write each fragment into the persisted file
    Incremental,
}

/// What happens when two routes document the same path and method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Keep the later operation and report a diagnostic
    #[default]
    LastWriteWins,
    /// Abort the run
    Fail,
}

/// Settings for one generation run, threaded explicitly through every stage.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Root deployment descriptor
    pub root_config: PathBuf,
    /// Output document; the extension selects the format
    pub output_file: PathBuf,
    /// Directory that fragment references are resolved against
    pub base_dir: PathBuf,
    pub strategy: WriteStrategy,
    pub collision_policy: CollisionPolicy,
}

impl GeneratorConfig {
    pub fn new(root_config: impl Into<PathBuf>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            root_config: root_config.into(),
            output_file: output_file.into(),
            base_dir: PathBuf::from("."),
            strategy: WriteStrategy::default(),
            collision_policy: CollisionPolicy::default(),
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_strategy(mut self, strategy: WriteStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_CONFIG, DEFAULT_OUTPUT_FILE)
    }
}

/// The parts of the root deployment descriptor this tool reads.
#[derive(Debug, Clone)]
pub struct RootDescriptor {
    /// Entries of the `functions` list, still wrapped in `${file(...)}`
    pub function_references: Vec<String>,
    /// `custom.documentation`, if present
    pub documentation: Option<DocumentationConfig>,
}

impl RootDescriptor {
    /// Loads and parses the root descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if `path` does not exist, and
    /// [`Error::ParseError`] if it is not valid YAML or its `functions` entry
    /// is not a list of strings.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let root = reader::parse_file(path)?;
        Self::from_value(&root, path)
    }

    fn from_value(root: &Value, source: &Path) -> Result<Self> {
        let function_references = match root.get("functions") {
            None | Some(Value::Null) => {
                debug!("No functions declared in {}", source.display());
                Vec::new()
            }
            Some(Value::Sequence(entries)) => entries
                .iter()
                .map(|entry| {
                    entry.as_str().map(str::to_string).ok_or_else(|| {
                        Error::parse(source, "every functions entry must be a file reference string")
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            Some(_) => {
                return Err(Error::parse(
                    source,
                    "functions must be a list of file references",
                ))
            }
        };

        let documentation = match root.get("custom").and_then(|custom| custom.get("documentation")) {
            None | Some(Value::Null) => None,
            Some(block) => Some(DocumentationConfig::from_value(block.clone(), source)?),
        };

        Ok(Self {
            function_references,
            documentation,
        })
    }
}

/// `custom.documentation`: API metadata plus the components registry.
#[derive(Debug, Clone, Default)]
pub struct DocumentationConfig {
    pub api: Option<ApiSection>,
    pub components: ComponentsRegistry,
}

#[derive(Deserialize)]
struct RawDocumentation {
    #[serde(default, deserialize_with = "lenient_section")]
    api: Option<ApiSection>,
    #[serde(default)]
    components: Option<Value>,
}

impl DocumentationConfig {
    /// Builds the documentation block from a parsed YAML value.
    pub fn from_value(value: Value, source: &Path) -> Result<Self> {
        let raw: RawDocumentation = serde_yaml::from_value(value)
            .map_err(|e| Error::parse(source, format!("custom.documentation: {}", e)))?;
        Ok(Self {
            api: raw.api,
            components: ComponentsRegistry::from_value(raw.components, source)?,
        })
    }

    /// Parses a documentation block from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let value = reader::parse(text)?;
        Self::from_value(value, Path::new("<inline>"))
    }

    /// The tag registry declared in `api.tags`.
    pub fn tag_registry(&self) -> TagRegistry {
        self.api
            .as_ref()
            .map(|api| TagRegistry::from_entries(&api.tags))
            .unwrap_or_default()
    }
}

/// `api`: document-level metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiSection {
    #[serde(default, deserialize_with = "lenient_section")]
    pub info: Option<InfoSection>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub servers: Vec<ServerEntry>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub tags: Vec<TagEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InfoSection {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
}

/// `documentation` under an HTTP event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RouteDocumentation {
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(rename = "operationId", default, deserialize_with = "lenient_string")]
    pub operation_id: Option<String>,
    #[serde(rename = "requestHeaders", default, deserialize_with = "lenient_strings")]
    pub request_headers: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub tags: Vec<String>,
}

/// A reusable parameter definition from `components`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParameterComponent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub required: Option<bool>,
    #[serde(default)]
    pub schema: Option<serde_json::Value>,
}

/// Named parameter components, keyed by category (e.g. `headers`) then name.
#[derive(Debug, Clone, Default)]
pub struct ComponentsRegistry {
    categories: HashMap<String, HashMap<String, ParameterComponent>>,
}

impl ComponentsRegistry {
    pub const HEADERS: &'static str = "headers";

    /// Builds the registry from the raw `components` value.
    ///
    /// A category or component given as a string is parsed as nested YAML
    /// before use.
    pub fn from_value(value: Option<Value>, source: &Path) -> Result<Self> {
        let mut registry = Self::default();
        let categories = match value {
            None | Some(Value::Null) => return Ok(registry),
            Some(value) => structured(value, source, "components")?,
        };
        let Value::Mapping(categories) = categories else {
            warn!("custom.documentation.components is not a mapping, ignoring it");
            return Ok(registry);
        };

        for (category, entries) in categories {
            let category = scalar_text(&category).unwrap_or_default();
            let context = format!("components.{}", category);
            let Value::Mapping(entries) = structured(entries, source, &context)? else {
                warn!("{} is not a mapping, ignoring it", context);
                continue;
            };

            let mut components = HashMap::with_capacity(entries.len());
            for (name, spec) in entries {
                let name = scalar_text(&name).unwrap_or_default();
                let context = format!("{}.{}", context, name);
                let spec = structured(spec, source, &context)?;
                let component: ParameterComponent = serde_yaml::from_value(spec)
                    .map_err(|e| Error::parse(source, format!("{}: {}", context, e)))?;
                components.insert(name, component);
            }
            debug!("Registered {} components under {}", components.len(), category);
            registry.categories.insert(category, components);
        }

        Ok(registry)
    }

    pub fn get(&self, category: &str, name: &str) -> Option<&ParameterComponent> {
        self.categories.get(category)?.get(name)
    }

    pub fn header(&self, name: &str) -> Option<&ParameterComponent> {
        self.get(Self::HEADERS, name)
    }

    pub fn insert(&mut self, category: &str, name: &str, component: ParameterComponent) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(name.to_string(), component);
    }
}

/// The tag names declared in `api.tags`, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRegistry {
    names: Vec<String>,
}

impl TagRegistry {
    pub fn from_entries(entries: &[TagEntry]) -> Self {
        Self {
            names: entries.iter().filter_map(|tag| tag.name.clone()).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|declared| declared == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Parses string values as nested YAML; passes everything else through.
fn structured(value: Value, source: &Path, context: &str) -> Result<Value> {
    match value {
        Value::String(text) => reader::parse(&text).map_err(|e| match e {
            Error::ParseError { message, .. } => {
                Error::parse(source, format!("{}: {}", context, message))
            }
            other => other,
        }),
        other => Ok(other),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(value) => scalar_text(&value),
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

fn lenient_strings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Sequence(items) => items.iter().filter_map(scalar_text).collect(),
        _ => Vec::new(),
    })
}

/// A section given as anything but a mapping is treated as absent.
fn lenient_section<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(section @ Value::Mapping(_)) => serde_yaml::from_value(section)
            .map(Some)
            .map_err(D::Error::custom),
        None | Some(Value::Null) => Ok(None),
        Some(_) => {
            warn!("Ignoring documentation section that is not a mapping");
            Ok(None)
        }
    }
}

fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Mapping(_) => serde_yaml::from_value(item).map_err(D::Error::custom),
                _ => Ok(T::default()),
            })
            .collect(),
        _ => Ok(Vec::new()),
    }
}
