//! OpenAPI from Serverless - OpenAPI documents from serverless function definitions.
//!
//! This library builds an OpenAPI 3.0 document from a serverless deployment
//! descriptor. API-level metadata comes from `custom.documentation.api`,
//! reusable header parameters from `custom.documentation.components`, and one
//! operation is generated for every HTTP event that carries a `documentation`
//! block in the function fragments listed under `functions`.
//!
//! # Architecture
//!
//! 1. [`reader`] - Parses YAML, keeping `!Ref`/`!Sub`/`!GetAtt` as opaque markers
//! 2. [`config`] - Run settings, root descriptor and documentation blocks
//! 3. [`metadata`] - Builds the `info`, `servers` and `tags` skeleton
//! 4. [`discovery`] - Finds documented routes across function fragments
//! 5. [`path_synthesizer`] - Turns each documented route into a path item
//! 6. [`openapi_builder`] - The document model and its in-memory accumulator
//! 7. [`serializer`] - Writes the document as YAML or JSON
//! 8. [`generator`] - Runs the whole pipeline
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_serverless::config::GeneratorConfig;
//! use openapi_from_serverless::generator;
//!
//! let config = GeneratorConfig::new("serverless.yml", "swagger.yaml");
//! if let Some(report) = generator::run(&config).unwrap() {
//!     println!("Wrote {} operations", report.operations);
//! }
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod generator;
pub mod metadata;
pub mod openapi_builder;
pub mod path_synthesizer;
pub mod reader;
pub mod serializer;
