//! The generation pipeline: metadata, discovery, path synthesis, write.

use crate::config::{DocumentationConfig, GeneratorConfig, RootDescriptor, WriteStrategy};
use crate::discovery::RouteDiscovery;
use crate::error::{Diagnostic, Result};
use crate::metadata;
use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use crate::path_synthesizer::PathSynthesizer;
use crate::serializer::{resolve_output_path, write_document, WriteMode};
use log::{debug, info};
use std::path::PathBuf;

/// Outcome of a generation run.
#[derive(Debug)]
pub struct GenerationReport {
    /// The file written
    pub output_path: PathBuf,
    /// The generated document, as written
    pub document: OpenApiDocument,
    /// Fragments with documented routes
    pub fragments: usize,
    /// Documented routes
    pub routes: usize,
    /// Operations merged into the document
    pub operations: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Loads the root descriptor and generates the document it describes.
///
/// Returns `Ok(None)` without writing anything when the descriptor has no
/// `custom.documentation` block.
///
/// # Errors
///
/// Returns [`crate::error::Error::ConfigNotFound`] if the root descriptor is
/// missing, and any fatal error raised by discovery, synthesis or writing.
pub fn run(config: &GeneratorConfig) -> Result<Option<GenerationReport>> {
    info!("Loading root configuration: {}", config.root_config.display());
    let root = RootDescriptor::load(&config.root_config)?;

    let Some(documentation) = &root.documentation else {
        info!("No documentation key in {}", config.root_config.display());
        return Ok(None);
    };

    info!("Documentation key found");
    generate_from_references(config, documentation, &root.function_references).map(Some)
}

/// Generates the document for an already parsed documentation block.
///
/// The function references are read from `config.root_config`.
pub fn generate(
    config: &GeneratorConfig,
    documentation: &DocumentationConfig,
) -> Result<GenerationReport> {
    let root = RootDescriptor::load(&config.root_config)?;
    generate_from_references(config, documentation, &root.function_references)
}

fn generate_from_references(
    config: &GeneratorConfig,
    documentation: &DocumentationConfig,
    references: &[String],
) -> Result<GenerationReport> {
    let incremental = config.strategy == WriteStrategy::Incremental;

    // Step 1: Document skeleton
    let skeleton = metadata::synthesize(documentation);
    let mut builder = OpenApiBuilder::new(skeleton.clone(), config.collision_policy);

    // Step 2: Discover documented routes
    info!("Discovering documented routes...");
    let discovery = RouteDiscovery::new(config.base_dir.clone()).discover(references)?;
    info!(
        "Found {} documented routes in {} files",
        discovery.route_count(),
        discovery.fragments.len()
    );

    let mut report = GenerationReport {
        output_path: resolve_output_path(&config.output_file),
        document: skeleton.clone(),
        fragments: discovery.fragments.len(),
        routes: discovery.route_count(),
        operations: 0,
        diagnostics: discovery.diagnostics,
    };

    // Step 3: Synthesize and merge path items, in discovery order.
    // Collisions are settled here, before anything reaches the output file.
    let tags = documentation.tag_registry();
    let synthesizer = PathSynthesizer::new(&documentation.components, &tags);
    let mut pending_writes = Vec::new();

    for fragment in &discovery.fragments {
        debug!("Synthesizing routes from {}", fragment.resolved_path.display());
        for route in &fragment.routes {
            let synthesis = synthesizer.synthesize_route(route);
            report.diagnostics.extend(synthesis.diagnostics);

            for path_fragment in synthesis.fragments {
                let fragment_value = if incremental {
                    Some(path_fragment.to_document_value()?)
                } else {
                    None
                };

                let collision = builder.add_path(path_fragment)?;
                let replaced = collision.is_some();
                report.diagnostics.extend(collision);
                report.operations += 1;

                if let Some(value) = fragment_value {
                    pending_writes.push((value, replaced));
                }
            }
        }
    }

    // Step 4: Write the document
    let document = builder.build();
    if incremental {
        write_document(&config.output_file, &skeleton, WriteMode::Replace)?;
        for (value, replaced) in &pending_writes {
            if *replaced {
                // A merge would keep fields of the replaced operation. The
                // full document already holds every remaining fragment.
                write_document(&config.output_file, &document, WriteMode::Replace)?;
                break;
            }
            write_document(&config.output_file, value, WriteMode::Merge)?;
        }
    } else {
        report.output_path = write_document(&config.output_file, &document, WriteMode::Replace)?;
    }
    report.document = document;

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files with documented routes: {}", report.fragments);
    info!("  - Routes documented: {}", report.routes);
    info!("  - Operations written: {}", report.operations);
    info!("  - Warnings: {}", report.diagnostics.len());

    Ok(report)
}
