use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

use ontoqa_core::{
    render_suggestions, AnnotationAuditor, Delimiter, DependencyMapBuilder, ImprovementSuggestion,
    ModuleRegistry, Taxonomy, TaxonomyBuilder,
};
use ontoqa_ingest_json::{load_tool_annotations, AnnotationContext};
use ontoqa_ingest_owl::{OntologyDocument, StructuralReasoner};

use crate::config::AuditConfig;

/// Everything one audit run produced, kept together for rendering.
pub struct AuditOutcome {
    pub modules: ModuleRegistry,
    pub taxonomy: Taxonomy,
    pub suggestions: Vec<ImprovementSuggestion>,
}

pub fn cmd_audit(
    config_path: &Path,
    strict: bool,
    out: Option<&PathBuf>,
    format: &str,
) -> Result<()> {
    let format = format.trim().to_ascii_lowercase();
    if !matches!(format.as_str(), "tsv" | "csv" | "json") {
        return Err(anyhow!(
            "unknown --format `{format}` (expected tsv|csv|json)"
        ));
    }

    let mut config = AuditConfig::load(config_path)?;
    config.strict |= strict;
    let outcome = run_audit(&config)?;

    let rendered = match format.as_str() {
        "json" => serde_json::to_string_pretty(&outcome.suggestions)?,
        "csv" => render_suggestions(
            &outcome.suggestions,
            &outcome.modules,
            &outcome.taxonomy,
            Delimiter::Comma,
        ),
        _ => render_suggestions(
            &outcome.suggestions,
            &outcome.modules,
            &outcome.taxonomy,
            Delimiter::Tab,
        ),
    };

    match out {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write report {}", path.display()))?;
            println!(
                "wrote {} suggestion(s) to {}",
                outcome.suggestions.len(),
                path.display()
            );
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Load the ontology and annotations named by `config` and audit them.
pub fn run_audit(config: &AuditConfig) -> Result<AuditOutcome> {
    let document = OntologyDocument::load(&config.ontology_path)
        .with_context(|| format!("failed to load ontology {}", config.ontology_path.display()))?;
    let reasoner = StructuralReasoner::new(&document);
    let dimensions = config.dimensions();

    let builder = TaxonomyBuilder::new(&reasoner, &dimensions).strict(config.strict);
    let mut taxonomy = Taxonomy::new();
    for root in &config.data_roots {
        builder
            .build_dimension(&mut taxonomy, root)
            .context("failed to build data taxonomy")?;
    }

    let mut dependencies = DependencyMapBuilder::new(&reasoner, &document)
        .build(&config.format_root, &config.format_type_property)
        .context("failed to build format dependencies")?;
    tracing::info!(
        property = config.format_type_property.as_str(),
        formats_annotated = dependencies.len(),
        "format dependencies extracted"
    );

    let ctx = config
        .data_roots
        .iter()
        .fold(AnnotationContext::new(config.prefix.as_str()), |ctx, root| {
            ctx.with_dimension(root)
        });
    let mut modules = load_tool_annotations(&config.tool_annotations_path, &ctx).with_context(|| {
        format!(
            "failed to load tool annotations {}",
            config.tool_annotations_path.display()
        )
    })?;

    if config.strict {
        dependencies.extend_to_plain_variants(&taxonomy);
        let routed = modules.route_to_plain(&taxonomy);
        tracing::info!(routed, "strict annotations routed to plain variants");
    }

    let suggestions =
        AnnotationAuditor::new(&config.format_root, &config.type_root, &dependencies, &taxonomy)
            .audit(&modules);

    Ok(AuditOutcome {
        modules,
        taxonomy,
        suggestions,
    })
}
