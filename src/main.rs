//! OpenAPI from Serverless - Command-line tool for generating OpenAPI documentation.
//!
//! Reads a serverless deployment descriptor, follows its `functions` file
//! references and writes an OpenAPI 3.0 document for every HTTP event that
//! carries a `documentation` block.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-serverless [OPTIONS]
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation next to `serverless.yml`:
//! ```bash
//! openapi-from-serverless
//! ```
//!
//! Generate JSON documentation into a docs directory:
//! ```bash
//! openapi-from-serverless -c serverless.yml -o docs/openapi.json
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-from-serverless -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_serverless::cli;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI from Serverless starting...");

    let config = cli::parse_args_from_parsed(args)?;
    cli::run(&config)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
