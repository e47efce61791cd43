//! Tagged YAML reader for serverless configuration files.
//!
//! Deployment descriptors routinely embed CloudFormation intrinsic functions
//! (`!Ref`, `!Sub`, `!GetAtt`). A plain YAML load either rejects them or
//! carries them around as tagged nodes that neither serializer understands.
//! This reader turns each of them into an opaque marker string
//! (`REF:<value>`, `SUB:<value>`, `GETATT:<value>`) so they pass through the
//! rest of the pipeline verbatim and stay readable in the generated document.

use crate::error::{Error, Result};
use log::debug;
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::fs;
use std::path::Path;

/// The kind of infrastructure reference carried by a custom tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// `!Ref`
    Ref,
    /// `!Sub`
    Sub,
    /// `!GetAtt`
    GetAtt,
}

impl RefKind {
    const ALL: [RefKind; 3] = [RefKind::Ref, RefKind::Sub, RefKind::GetAtt];

    fn tag_name(self) -> &'static str {
        match self {
            RefKind::Ref => "Ref",
            RefKind::Sub => "Sub",
            RefKind::GetAtt => "GetAtt",
        }
    }

    fn marker_prefix(self) -> &'static str {
        match self {
            RefKind::Ref => "REF",
            RefKind::Sub => "SUB",
            RefKind::GetAtt => "GETATT",
        }
    }

    fn from_tag(tag: &Tag) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| *tag == kind.tag_name())
    }
}

/// An unresolved infrastructure reference.
///
/// Displays as its marker string, e.g. `REF:UsersTable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfraRef {
    pub kind: RefKind,
    pub raw: String,
}

impl InfraRef {
    /// Recognizes a marker string produced by the reader.
    pub fn from_marker(marker: &str) -> Option<Self> {
        let (prefix, raw) = marker.split_once(':')?;
        RefKind::ALL
            .into_iter()
            .find(|kind| kind.marker_prefix() == prefix)
            .map(|kind| InfraRef {
                kind,
                raw: raw.to_string(),
            })
    }
}

impl fmt::Display for InfraRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.kind.marker_prefix(), self.raw)
    }
}

const INLINE_SOURCE: &str = "<inline>";

/// Parses YAML text, replacing infrastructure tags with marker strings.
///
/// # Errors
///
/// Returns [`Error::ParseError`] if the text is not valid YAML, or if it uses a
/// tag other than the three infrastructure tags, or applies one of them to a
/// sequence or mapping.
pub fn parse(text: &str) -> Result<Value> {
    parse_with_source(text, Path::new(INLINE_SOURCE))
}

/// Reads and parses a YAML file from disk.
pub fn parse_file(path: &Path) -> Result<Value> {
    debug!("Reading configuration file: {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_with_source(&content, path)
}

fn parse_with_source(text: &str, source: &Path) -> Result<Value> {
    let value: Value = serde_yaml::from_str(text).map_err(|e| Error::parse(source, e))?;
    resolve_tags(value, source)
}

fn resolve_tags(value: Value, source: &Path) -> Result<Value> {
    match value {
        Value::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            let kind = RefKind::from_tag(&tag).ok_or_else(|| {
                Error::parse(source, format!("unknown tag {}", tag))
            })?;
            let raw = scalar_text(&value).ok_or_else(|| {
                Error::parse(source, format!("tag {} must be applied to a scalar", tag))
            })?;
            Ok(Value::String(InfraRef { kind, raw }.to_string()))
        }
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| resolve_tags(item, source))
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        Value::Mapping(entries) => {
            let mut resolved = Mapping::with_capacity(entries.len());
            for (key, value) in entries {
                resolved.insert(resolve_tags(key, source)?, resolve_tags(value, source)?);
            }
            Ok(Value::Mapping(resolved))
        }
        scalar => Ok(scalar),
    }
}

/// Stringifies a YAML scalar. Returns `None` for sequences, mappings and tagged nodes.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
