//! Run configuration in the shape of an APE core configuration file.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use ontoqa_core::iri::{expand_iri, local_name, EDAM_PREFIX};
use ontoqa_core::DimensionRegistry;

const DEFAULT_TOOLS_ROOT: &str = "operation_0004";
const DEFAULT_TYPE_ROOT: &str = "data_0006";
const DEFAULT_FORMAT_ROOT: &str = "format_1915";
const DEFAULT_FORMAT_TYPE_PROPERTY: &str = "is_format_of";

fn default_prefix() -> String {
    EDAM_PREFIX.to_string()
}

fn default_tools_root() -> String {
    DEFAULT_TOOLS_ROOT.to_string()
}

/// APE writes booleans both as JSON booleans and as strings.
fn bool_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected true or false, got `{other}`"
            ))),
        },
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    ontology_path: PathBuf,
    tool_annotations_path: PathBuf,
    #[serde(rename = "ontologyPrefixIRI", default = "default_prefix")]
    ontology_prefix_iri: String,
    #[serde(rename = "toolsTaxonomyRoot", default = "default_tools_root")]
    tools_taxonomy_root: String,
    #[serde(rename = "dataDimensionsTaxonomyRoots", default)]
    data_dimensions_taxonomy_roots: Vec<String>,
    #[serde(default, deserialize_with = "bool_or_string")]
    strict_tool_annotations: bool,
    #[serde(default)]
    format_root: Option<String>,
    #[serde(default)]
    type_root: Option<String>,
    #[serde(default)]
    format_type_property: Option<String>,
}

/// Resolved configuration: paths are absolute or relative to the working
/// directory, identifiers are full IRIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    pub ontology_path: PathBuf,
    pub tool_annotations_path: PathBuf,
    pub prefix: String,
    pub tools_root: String,
    pub data_roots: Vec<String>,
    pub strict: bool,
    pub format_root: String,
    pub type_root: String,
    pub format_type_property: String,
}

impl AuditConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_json_str(&text, base_dir)
            .with_context(|| format!("invalid configuration {}", path.display()))
    }

    /// Relative paths in `text` are resolved against `base_dir`.
    pub fn from_json_str(text: &str, base_dir: &Path) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(text)?;
        let prefix = raw.ontology_prefix_iri;
        let expand = |id: &str| expand_iri(&prefix, id);

        let mut data_roots: Vec<String> = Vec::new();
        let configured = if raw.data_dimensions_taxonomy_roots.is_empty() {
            vec![DEFAULT_TYPE_ROOT.to_string(), DEFAULT_FORMAT_ROOT.to_string()]
        } else {
            raw.data_dimensions_taxonomy_roots
        };
        for root in configured {
            let root = expand(&root);
            if !data_roots.contains(&root) {
                data_roots.push(root);
            }
        }

        let format_root = expand(raw.format_root.as_deref().unwrap_or(DEFAULT_FORMAT_ROOT));
        let type_root = expand(raw.type_root.as_deref().unwrap_or(DEFAULT_TYPE_ROOT));
        for (what, root) in [("format", &format_root), ("type", &type_root)] {
            if !data_roots.contains(root) {
                return Err(anyhow!(
                    "{what} root `{root}` is not one of dataDimensionsTaxonomyRoots"
                ));
            }
        }

        Ok(Self {
            ontology_path: resolve(base_dir, raw.ontology_path),
            tool_annotations_path: resolve(base_dir, raw.tool_annotations_path),
            tools_root: expand(&raw.tools_taxonomy_root),
            format_type_property: expand(
                raw.format_type_property
                    .as_deref()
                    .unwrap_or(DEFAULT_FORMAT_TYPE_PROPERTY),
            ),
            data_roots,
            strict: raw.strict_tool_annotations,
            format_root,
            type_root,
            prefix,
        })
    }

    /// Every configured root, operations included, named by its local name
    /// (the full IRI when two local names clash).
    pub fn dimensions(&self) -> DimensionRegistry {
        let mut dims = DimensionRegistry::new();
        for root in std::iter::once(&self.tools_root).chain(&self.data_roots) {
            let name = match dims.root_of(local_name(root)) {
                Some(_) => root.as_str(),
                None => local_name(root),
            };
            dims.register(name, root.clone());
        }
        dims
    }
}

fn resolve(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}
