//! Tool annotation loading.
//!
//! Reads APE-style tool annotations into a [`ModuleRegistry`]:
//!
//! ```json
//! { "functions": [ {
//!     "id": "comet", "label": "Comet",
//!     "taxonomyOperations": ["operation_3646"],
//!     "inputs":  [ { "data_0006": ["data_2976"], "format_1915": ["format_1929"] } ],
//!     "outputs": [ { "data_0006": ["data_0945"] } ]
//! } ] }
//! ```
//!
//! Each parameter gets one predicate per configured data dimension. A single
//! id becomes a concrete predicate, several ids an unresolved aggregate, and
//! a missing dimension defaults to the dimension root.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use ontoqa_core::iri::expand_iri;
use ontoqa_core::{DimensionRegistry, Module, ModuleParameter, ModuleRegistry, Predicate};

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("failed to read tool annotations: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid tool annotation JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tool annotations must be an object with a `functions` array")]
    MissingFunctions,

    #[error("tool #{index} has no `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("tool `{tool}` is annotated with unknown dimension `{dimension}`")]
    UnknownDimension { tool: String, dimension: String },

    #[error("tool `{tool}`: {message}")]
    InvalidValue { tool: String, message: String },
}

/// How short ids are expanded and which data dimensions a parameter has.
#[derive(Debug, Clone)]
pub struct AnnotationContext {
    prefix: String,
    dimension_roots: Vec<String>,
}

impl AnnotationContext {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            dimension_roots: Vec::new(),
        }
    }

    /// Registers a data dimension; `root_id` may be short (`format_1915`).
    pub fn with_dimension(mut self, root_id: &str) -> Self {
        let root = self.expand(root_id);
        if !self.dimension_roots.contains(&root) {
            self.dimension_roots.push(root);
        }
        self
    }

    pub fn from_registry(prefix: impl Into<String>, dimensions: &DimensionRegistry) -> Self {
        dimensions
            .roots()
            .fold(Self::new(prefix), |ctx, root| ctx.with_dimension(root))
    }

    pub fn expand(&self, id: &str) -> String {
        expand_iri(&self.prefix, id)
    }

    pub fn dimension_roots(&self) -> &[String] {
        &self.dimension_roots
    }
}

/// Read and parse the tool annotation file at `path`.
pub fn load_tool_annotations(
    path: &Path,
    ctx: &AnnotationContext,
) -> Result<ModuleRegistry, AnnotationError> {
    let text = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)?;
    let modules = parse_tool_annotations(&value, ctx)?;
    tracing::info!(
        path = %path.display(),
        modules = modules.len(),
        "tool annotations loaded"
    );
    Ok(modules)
}

/// Build a registry from an already parsed annotation document.
///
/// Tools that cannot be read are logged and skipped; only a document without
/// a `functions` array is an error.
pub fn parse_tool_annotations(
    value: &Value,
    ctx: &AnnotationContext,
) -> Result<ModuleRegistry, AnnotationError> {
    let functions = value
        .get("functions")
        .and_then(Value::as_array)
        .ok_or(AnnotationError::MissingFunctions)?;

    let mut modules = ModuleRegistry::new();
    let mut skipped = 0usize;
    for (index, function) in functions.iter().enumerate() {
        match parse_module(index, function, ctx) {
            Ok(module) => modules.push(module),
            Err(err) => {
                skipped += 1;
                tracing::warn!(index, error = %err, "tool annotation skipped");
            }
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, kept = modules.len(), "some tool annotations were skipped");
    }
    Ok(modules)
}

fn parse_module(
    index: usize,
    value: &Value,
    ctx: &AnnotationContext,
) -> Result<Module, AnnotationError> {
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
        .ok_or(AnnotationError::MissingField { index, field: "id" })?;
    let label = value.get("label").and_then(Value::as_str).unwrap_or(id);

    let mut module = Module::new(id, label);
    if let Some(operations) = value.get("taxonomyOperations") {
        module.operations = id_list(id, "taxonomyOperations", operations)?
            .iter()
            .map(|op| ctx.expand(op))
            .collect();
    }
    module.inputs = parameters(id, "inputs", value.get("inputs"), ctx)?;
    module.outputs = parameters(id, "outputs", value.get("outputs"), ctx)?;
    Ok(module)
}

fn parameters(
    tool: &str,
    field: &str,
    value: Option<&Value>,
    ctx: &AnnotationContext,
) -> Result<Vec<ModuleParameter>, AnnotationError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| parameter(tool, item, ctx))
            .collect(),
        Some(_) => Err(invalid(tool, format!("`{field}` must be an array"))),
    }
}

fn parameter(
    tool: &str,
    value: &Value,
    ctx: &AnnotationContext,
) -> Result<ModuleParameter, AnnotationError> {
    let Value::Object(fields) = value else {
        return Err(invalid(tool, "parameters must be objects".to_string()));
    };

    let mut annotated: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, ids) in fields {
        let root = ctx.expand(key);
        if !ctx.dimension_roots.contains(&root) {
            return Err(AnnotationError::UnknownDimension {
                tool: tool.to_string(),
                dimension: key.clone(),
            });
        }
        let mut members: Vec<String> = Vec::new();
        for id in id_list(tool, key, ids)? {
            let id = ctx.expand(&id);
            if !members.contains(&id) {
                members.push(id);
            }
        }
        annotated.insert(root, members);
    }

    let mut parameter = ModuleParameter::new();
    for root in &ctx.dimension_roots {
        let mut members = annotated.remove(root).unwrap_or_default();
        let predicate = match members.len() {
            0 => Predicate::concrete(root.clone()),
            1 => Predicate::concrete(members.remove(0)),
            _ => Predicate::Synthetic { members },
        };
        parameter.insert(root.clone(), predicate);
    }
    Ok(parameter)
}

/// A single id or an array of ids.
fn id_list(tool: &str, field: &str, value: &Value) -> Result<Vec<String>, AnnotationError> {
    match value {
        Value::String(id) => Ok(vec![id.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(tool, format!("`{field}` must only contain strings")))
            })
            .collect(),
        _ => Err(invalid(
            tool,
            format!("`{field}` must be a string or an array of strings"),
        )),
    }
}

fn invalid(tool: &str, message: String) -> AnnotationError {
    AnnotationError::InvalidValue {
        tool: tool.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontoqa_core::iri::EDAM_PREFIX;
    use serde_json::json;

    fn ctx() -> AnnotationContext {
        AnnotationContext::new(EDAM_PREFIX)
            .with_dimension("data_0006")
            .with_dimension("format_1915")
    }

    fn edam(id: &str) -> String {
        format!("{EDAM_PREFIX}{id}")
    }

    #[test]
    fn single_ids_become_concrete_predicates() {
        let doc = json!({ "functions": [ {
            "id": "comet",
            "label": "Comet",
            "taxonomyOperations": ["operation_3646"],
            "inputs": [ { "data_0006": ["data_2976"], "format_1915": "format_1929" } ]
        } ] });
        let modules = parse_tool_annotations(&doc, &ctx()).unwrap();
        let comet = modules.get("comet").unwrap();

        assert_eq!(comet.label, "Comet");
        assert_eq!(comet.operations, vec![edam("operation_3646")]);
        assert!(comet.outputs.is_empty());
        let input = &comet.inputs[0];
        assert_eq!(
            input.predicate(&edam("data_0006")),
            Some(&Predicate::concrete(edam("data_2976")))
        );
        assert_eq!(
            input.predicate(&edam("format_1915")),
            Some(&Predicate::concrete(edam("format_1929")))
        );
    }

    #[test]
    fn several_ids_become_an_unresolved_aggregate() {
        let doc = json!({ "functions": [ {
            "id": "t",
            "outputs": [ { "format_1915": ["format_1929", "format_1930", "format_1929"] } ]
        } ] });
        let modules = parse_tool_annotations(&doc, &ctx()).unwrap();
        let output = &modules.get("t").unwrap().outputs[0];
        assert_eq!(
            output.predicate(&edam("format_1915")),
            Some(&Predicate::Synthetic {
                members: vec![edam("format_1929"), edam("format_1930")]
            })
        );
    }

    #[test]
    fn missing_dimensions_default_to_the_root() {
        let doc = json!({ "functions": [ {
            "id": "t",
            "inputs": [ { "format_1915": [] }, {} ]
        } ] });
        let modules = parse_tool_annotations(&doc, &ctx()).unwrap();
        let module = modules.get("t").unwrap();
        assert_eq!(module.label, "t");
        for input in &module.inputs {
            assert_eq!(
                input.predicate(&edam("data_0006")),
                Some(&Predicate::concrete(edam("data_0006")))
            );
            assert_eq!(
                input.predicate(&edam("format_1915")),
                Some(&Predicate::concrete(edam("format_1915")))
            );
        }
    }

    #[test]
    fn unreadable_tools_are_skipped_and_order_is_kept() {
        let doc = json!({ "functions": [
            { "id": "first" },
            { "label": "no id" },
            { "id": "bad_dim", "inputs": [ { "topic_0003": ["topic_0121"] } ] },
            { "id": "bad_value", "inputs": [ { "data_0006": 42 } ] },
            { "id": "last" }
        ] });
        let modules = parse_tool_annotations(&doc, &ctx()).unwrap();
        let ids: Vec<&str> = modules.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "last"]);
    }

    #[test]
    fn per_tool_errors_name_the_problem() {
        let c = ctx();
        assert!(matches!(
            parse_module(1, &json!({ "label": "x" }), &c),
            Err(AnnotationError::MissingField { index: 1, field: "id" })
        ));
        assert!(matches!(
            parse_module(0, &json!({ "id": "t", "inputs": [ { "topic_0003": "x" } ] }), &c),
            Err(AnnotationError::UnknownDimension { dimension, .. }) if dimension == "topic_0003"
        ));
    }

    #[test]
    fn document_without_functions_is_rejected() {
        assert!(matches!(
            parse_tool_annotations(&json!({ "tools": [] }), &ctx()),
            Err(AnnotationError::MissingFunctions)
        ));
    }

    #[test]
    fn context_can_come_from_a_dimension_registry() {
        let dims = DimensionRegistry::new()
            .with_dimension("type", edam("data_0006"))
            .with_dimension("format", "format_1915");
        let ctx = AnnotationContext::from_registry(EDAM_PREFIX, &dims);
        assert_eq!(ctx.dimension_roots().len(), 2);
        assert!(ctx.dimension_roots().contains(&edam("format_1915")));
    }
}
