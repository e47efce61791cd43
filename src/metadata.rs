//! Document-level metadata: the `openapi`, `info`, `servers` and `tags`
//! sections, built from `custom.documentation.api`.

use crate::config::{DocumentationConfig, InfoSection, ServerEntry, TagEntry};
use crate::openapi_builder::{Info, OpenApiDocument, Server, Tag, OPENAPI_VERSION};
use log::debug;
use std::collections::BTreeMap;

pub const DEFAULT_TITLE: &str = "OpenAPI Swagger Documentation";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_DESCRIPTION: &str =
    "Automatically generated API documentation via serverless-docs-only plugins";
pub const DEFAULT_SERVER_URL: &str = "https://default.example.com";
pub const DEFAULT_SERVER_DESCRIPTION: &str = "Default server";
pub const DEFAULT_TAG_NAME: &str = "default";
pub const DEFAULT_TAG_DESCRIPTION: &str = "Default tag description";

/// Builds the document skeleton (no paths yet).
///
/// Every missing or empty field falls back to its default independently, so a
/// partially filled `api` block still yields a complete skeleton.
pub fn synthesize(documentation: &DocumentationConfig) -> OpenApiDocument {
    let Some(api) = &documentation.api else {
        debug!("No api section, using default metadata");
        return OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: synthesize_info(None),
            servers: Vec::new(),
            tags: Vec::new(),
            paths: BTreeMap::new(),
        };
    };

    OpenApiDocument {
        openapi: OPENAPI_VERSION.to_string(),
        info: synthesize_info(api.info.as_ref()),
        servers: api.servers.iter().map(synthesize_server).collect(),
        tags: api.tags.iter().map(synthesize_tag).collect(),
        paths: BTreeMap::new(),
    }
}

fn synthesize_info(info: Option<&InfoSection>) -> Info {
    let info = info.cloned().unwrap_or_default();
    Info {
        title: or_default(info.title.as_deref(), DEFAULT_TITLE),
        version: or_default(info.version.as_deref(), DEFAULT_VERSION),
        description: or_default(info.description.as_deref(), DEFAULT_DESCRIPTION),
    }
}

fn synthesize_server(server: &ServerEntry) -> Server {
    Server {
        url: or_default(server.url.as_deref(), DEFAULT_SERVER_URL),
        description: or_default(server.description.as_deref(), DEFAULT_SERVER_DESCRIPTION),
    }
}

fn synthesize_tag(tag: &TagEntry) -> Tag {
    Tag {
        name: or_default(tag.name.as_deref(), DEFAULT_TAG_NAME),
        description: or_default(tag.description.as_deref(), DEFAULT_TAG_DESCRIPTION),
    }
}

/// The declared value when present and non-empty, otherwise `default`.
pub(crate) fn or_default(value: Option<&str>, default: &str) -> String {
    match value {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}
