//! Serialization module for writing OpenAPI documents as YAML or JSON.
//!
//! The output format follows the file extension. Writes are staged in a
//! temporary file next to the target and renamed into place, so readers never
//! observe a half-written document. In [`WriteMode::Merge`] the persisted
//! document is read back and the new fragment is merged into it structurally.

use crate::error::{Error, Result};
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Output format, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

impl OutputFormat {
    /// `.json` selects JSON; any other or missing extension selects YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Yaml,
        }
    }
}

/// How a write treats existing content at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate and write the document as the whole file
    Replace,
    /// Merge the document into the persisted one
    Merge,
}

/// The file actually written for `output_file`: a path without an extension
/// gets `.yaml` appended.
pub fn resolve_output_path(output_file: &Path) -> PathBuf {
    if output_file.extension().is_some() {
        output_file.to_path_buf()
    } else {
        output_file.with_extension("yaml")
    }
}

/// Serializes a document to YAML in block style.
///
/// # Example
///
/// ```
/// use openapi_from_serverless::config::DocumentationConfig;
/// use openapi_from_serverless::metadata;
/// use openapi_from_serverless::serializer::serialize_yaml;
///
/// let doc = metadata::synthesize(&DocumentationConfig::default());
/// let yaml = serialize_yaml(&doc).unwrap();
/// assert!(yaml.starts_with("openapi:"));
/// ```
pub fn serialize_yaml<T: Serialize + ?Sized>(doc: &T) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    Ok(serde_yaml::to_string(doc)?)
}

/// Serializes a document to JSON with 2-space indentation.
pub fn serialize_json<T: Serialize + ?Sized>(doc: &T) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    Ok(serde_json::to_string_pretty(doc)?)
}

pub fn serialize<T: Serialize + ?Sized>(doc: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serialize_yaml(doc),
        OutputFormat::Json => serialize_json(doc),
    }
}

/// Writes `document` to `output_file` in the format its extension selects.
///
/// Parent directories are created as needed. Returns the path written, which
/// differs from `output_file` only when an extension had to be appended.
///
/// # Errors
///
/// Returns [`Error::IoError`] if the file or its directories cannot be
/// written, and [`Error::ParseError`] if a merge finds unreadable content in
/// the existing file.
pub fn write_document<T: Serialize + ?Sized>(
    output_file: &Path,
    document: &T,
    mode: WriteMode,
) -> Result<PathBuf> {
    let path = resolve_output_path(output_file);
    let format = OutputFormat::from_path(&path);

    let content = match mode {
        WriteMode::Replace => serialize(document, format)?,
        WriteMode::Merge => {
            let fragment = serde_json::to_value(document)?;
            let merged = match read_existing(&path, format)? {
                Some(mut existing) => {
                    merge_values(&mut existing, fragment);
                    existing
                }
                None => fragment,
            };
            serialize(&merged, format)?
        }
    };

    write_to_file(&content, &path)?;
    info!("File saved successfully at {}", path.display());
    Ok(path)
}

/// Merges `fragment` into `base`: mappings merge key by key, recursively;
/// any other value in `fragment` replaces the one in `base`.
pub fn merge_values(base: &mut Value, fragment: Value) {
    match (base, fragment) {
        (Value::Object(base), Value::Object(fragment)) => {
            for (key, value) in fragment {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, fragment) => *base = fragment,
    }
}

fn read_existing(path: &Path, format: OutputFormat) -> Result<Option<Value>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(path, e)),
    };
    if content.trim().is_empty() {
        return Ok(None);
    }

    let value: Value = match format {
        OutputFormat::Json => serde_json::from_str(&content).map_err(|e| Error::parse(path, e))?,
        OutputFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| Error::parse(path, e))?,
    };
    Ok(Some(value))
}

/// Writes string content to a file, replacing it atomically.
///
/// Creates parent directories if they don't exist.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;

    // Same mode as a plain create: 0666 minus the umask.
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut staged = builder.tempfile_in(parent).map_err(|e| Error::io(parent, e))?;
    staged
        .write_all(content.as_bytes())
        .map_err(|e| Error::io(path, e))?;
    if let Ok(existing) = fs::metadata(path) {
        staged
            .as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| Error::io(path, e))?;
    }
    staged.persist(path).map_err(|e| Error::io(path, e.error))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
