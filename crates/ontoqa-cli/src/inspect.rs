//! `deps` and `taxonomy`: read-only views of what the builders reconstruct.

use anyhow::{anyhow, Context, Result};
use std::path::Path;

use ontoqa_core::iri::expand_iri;
use ontoqa_core::{
    nodes_by_dimension, DependencyMap, DependencyMapBuilder, DimensionRegistry, Taxonomy,
    TaxonomyBuilder,
};
use ontoqa_ingest_owl::{OntologyDocument, StructuralReasoner};

fn check_format(format: &str) -> Result<String> {
    let format = format.trim().to_ascii_lowercase();
    if !matches!(format.as_str(), "text" | "json") {
        return Err(anyhow!("unknown --format `{format}` (expected text|json)"));
    }
    Ok(format)
}

fn load_document(path: &Path) -> Result<OntologyDocument> {
    OntologyDocument::load(path).with_context(|| format!("failed to load ontology {}", path.display()))
}

pub fn cmd_deps(
    ontology: &Path,
    root: &str,
    property: &str,
    prefix: &str,
    format: &str,
) -> Result<()> {
    let format = check_format(format)?;
    let document = load_document(ontology)?;
    let reasoner = StructuralReasoner::new(&document);

    let root = expand_iri(prefix, root);
    let property = expand_iri(prefix, property);
    let map = DependencyMapBuilder::new(&reasoner, &document)
        .build(&root, &property)
        .with_context(|| format!("failed to build dependency map for {property}"))?;

    let rendered = match format.as_str() {
        "json" => serde_json::to_string_pretty(&map)?,
        _ => render_dependency_map_text(&map, &document),
    };
    println!("{rendered}");
    Ok(())
}

pub fn render_dependency_map_text(map: &DependencyMap, document: &OntologyDocument) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} via {}\n",
        document.display_label(map.root()),
        map.property()
    ));
    for (source, targets) in map.iter() {
        let targets: Vec<String> = targets
            .iter()
            .map(|target| document.display_label(target))
            .collect();
        out.push_str(&format!(
            "  {} -> {}\n",
            document.display_label(source),
            targets.join(", ")
        ));
    }
    out.push_str(&format!("sources: {}", map.len()));
    out
}

pub fn cmd_taxonomy(
    ontology: &Path,
    root: &str,
    prefix: &str,
    strict: bool,
    format: &str,
) -> Result<()> {
    let format = check_format(format)?;
    let document = load_document(ontology)?;
    let reasoner = StructuralReasoner::new(&document);

    let root = expand_iri(prefix, root);
    let dimensions = DimensionRegistry::new().with_dimension("root", root.clone());
    let taxonomy = TaxonomyBuilder::new(&reasoner, &dimensions)
        .strict(strict)
        .build(&root)
        .with_context(|| format!("failed to build taxonomy below {root}"))?;

    let rendered = match format.as_str() {
        "json" => serde_json::to_string_pretty(&taxonomy.summary())?,
        _ => render_taxonomy_text(&taxonomy),
    };
    println!("{rendered}");
    Ok(())
}

pub fn render_taxonomy_text(taxonomy: &Taxonomy) -> String {
    let summary = taxonomy.summary();
    let mut out = String::new();
    out.push_str(&format!("nodes: {}\n", summary.nodes));
    out.push_str(&format!("roots: {}\n", summary.roots));
    out.push_str(&format!("abstract: {}\n", summary.abstract_nodes));
    out.push_str(&format!("leaves: {}\n", summary.leaves));
    out.push_str(&format!("artificial leaves: {}\n", summary.artificial_leaves));
    out.push_str(&format!("max depth: {}", summary.max_depth));

    let by_dimension = nodes_by_dimension(taxonomy);
    if by_dimension.len() > 1 {
        for (root, nodes) in by_dimension {
            let label = taxonomy.label(root).unwrap_or(root);
            out.push_str(&format!("\n  {label}: {} node(s)", nodes.len()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontoqa_core::InMemoryOntology;
    use ontoqa_ingest_owl::RdfFormat;

    #[test]
    fn dependency_text_uses_labels() {
        let ttl = r#"
@prefix : <http://example.org/onto#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
:Format a owl:Class .
:FASTA rdfs:label "FASTA" ; rdfs:subClassOf :Format ,
    [ a owl:Restriction ; owl:onProperty :is_format_of ; owl:someValuesFrom :Sequence ] .
"#;
        let document = OntologyDocument::from_bytes(ttl.as_bytes(), RdfFormat::Turtle).unwrap();
        let reasoner = StructuralReasoner::new(&document);
        let map = DependencyMapBuilder::new(&reasoner, &document)
            .build(
                "http://example.org/onto#Format",
                "http://example.org/onto#is_format_of",
            )
            .unwrap();

        let text = render_dependency_map_text(&map, &document);
        assert!(text.starts_with("Format via http://example.org/onto#is_format_of"));
        assert!(text.contains("  FASTA -> Sequence\n"));
        assert!(text.ends_with("sources: 1"));
    }

    #[test]
    fn taxonomy_text_lists_nested_dimensions() {
        let onto = InMemoryOntology::new()
            .with_subclass("Format", "Data")
            .with_subclass("FASTA", "Format")
            .with_subclass("Sequence", "Data");
        let dims = DimensionRegistry::new()
            .with_dimension("data", "Data")
            .with_dimension("format", "Format");
        let taxonomy = TaxonomyBuilder::new(&onto, &dims).build("Data").unwrap();

        let text = render_taxonomy_text(&taxonomy);
        assert!(text.starts_with("nodes: 4\nroots: 2\n"));
        assert!(text.contains("max depth: 2"));
        assert!(text.contains("\n  Format: 2 node(s)"));
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(check_format("yaml").is_err());
        assert_eq!(check_format(" JSON ").unwrap(), "json");
    }
}
