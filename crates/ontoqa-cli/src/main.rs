//! ontoqa CLI
//!
//! Ontology-driven quality checks for tool annotations:
//! - auditing annotated tool inputs/outputs against format → type dependencies
//! - dumping object-property dependency maps
//! - summarizing reconstructed taxonomies

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod audit;
mod config;
mod inspect;

use ontoqa_core::iri::EDAM_PREFIX;

#[derive(Parser)]
#[command(name = "ontoqa")]
#[command(
    author,
    version,
    about = "ontoqa: ontology-driven quality checks for tool annotations"
)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest more specific data types for annotated tool inputs/outputs.
    ///
    /// Builds the data taxonomies and the format → type dependency map from
    /// the ontology, then compares every annotated type with the type implied
    /// by the annotated format.
    Audit {
        /// APE-style run configuration (JSON).
        #[arg(short, long)]
        config: PathBuf,
        /// Force strict tool annotations (plain variants of abstract concepts).
        #[arg(long)]
        strict: bool,
        /// Output report path (defaults to stdout).
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Output format: tsv|csv|json
        #[arg(long, default_value = "tsv")]
        format: String,
    },

    /// Print the inherited dependency map of an object property.
    Deps {
        /// Ontology document (.owl/.rdf/.xml, .ttl, .nt).
        #[arg(long)]
        ontology: PathBuf,
        /// Dimension root to walk (IRI or id relative to --prefix).
        #[arg(long)]
        root: String,
        /// Object property (IRI or id relative to --prefix).
        #[arg(long)]
        property: String,
        /// Prefix IRI for short ids.
        #[arg(long, default_value = EDAM_PREFIX)]
        prefix: String,
        /// Output format: text|json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Summarize the taxonomy reconstructed below a root.
    Taxonomy {
        /// Ontology document (.owl/.rdf/.xml, .ttl, .nt).
        #[arg(long)]
        ontology: PathBuf,
        /// Dimension root (IRI or id relative to --prefix).
        #[arg(long)]
        root: String,
        /// Prefix IRI for short ids.
        #[arg(long, default_value = EDAM_PREFIX)]
        prefix: String,
        /// Synthesize plain-variant leaves.
        #[arg(long)]
        strict: bool,
        /// Output format: text|json
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::{fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Audit {
            config,
            strict,
            out,
            format,
        } => audit::cmd_audit(&config, strict, out.as_ref(), &format),
        Commands::Deps {
            ontology,
            root,
            property,
            prefix,
            format,
        } => inspect::cmd_deps(&ontology, &root, &property, &prefix, &format),
        Commands::Taxonomy {
            ontology,
            root,
            prefix,
            strict,
            format,
        } => inspect::cmd_taxonomy(&ontology, &root, &prefix, strict, &format),
    };

    if let Err(err) = &result {
        tracing::error!(error = %format!("{err:#}"), "command failed");
    }
    result
}
