//! Auditing module annotations against format → type dependencies.
//!
//! For every input and output, the type implied by the annotated format is
//! compared with the annotated type. When the implied type is strictly more
//! specific, the annotation is reported as an over-generalization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::dependency::DependencyMap;
use crate::registry::{Module, ModuleParameter, ModuleRegistry, Predicate};
use crate::specificity::SpecificityEvaluator;
use crate::taxonomy::Taxonomy;

/// Which side of a module the audited parameter sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IoRole {
    #[serde(rename = "inputFromFormat")]
    InputFromFormat,
    #[serde(rename = "outputFromFormat")]
    OutputFromFormat,
}

impl IoRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InputFromFormat => "inputFromFormat",
            Self::OutputFromFormat => "outputFromFormat",
        }
    }
}

impl fmt::Display for IoRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementSuggestion {
    pub module_id: String,
    pub io_role: IoRole,
    pub existing_format_id: String,
    pub existing_type_id: String,
    pub suggested_type_ids: BTreeSet<String>,
}

pub struct AnnotationAuditor<'a> {
    format_root: &'a str,
    type_root: &'a str,
    dependencies: &'a DependencyMap,
    types: &'a Taxonomy,
}

impl<'a> AnnotationAuditor<'a> {
    /// `format_root` / `type_root` select the parameter predicates to compare;
    /// `types` must contain the type dimension.
    pub fn new(
        format_root: &'a str,
        type_root: &'a str,
        dependencies: &'a DependencyMap,
        types: &'a Taxonomy,
    ) -> Self {
        Self {
            format_root,
            type_root,
            dependencies,
            types,
        }
    }

    /// Suggestions in module order, inputs before outputs, parameters in
    /// annotation order.
    pub fn audit(&self, modules: &ModuleRegistry) -> Vec<ImprovementSuggestion> {
        let mut out = Vec::new();
        for module in modules.iter() {
            for input in &module.inputs {
                out.extend(self.evaluate(module, input, IoRole::InputFromFormat));
            }
            for output in &module.outputs {
                out.extend(self.evaluate(module, output, IoRole::OutputFromFormat));
            }
        }
        tracing::info!(
            modules = modules.len(),
            suggestions = out.len(),
            "annotation audit finished"
        );
        out
    }

    fn evaluate(
        &self,
        module: &Module,
        parameter: &ModuleParameter,
        io_role: IoRole,
    ) -> Option<ImprovementSuggestion> {
        let format_id = self.concrete(module, parameter, self.format_root)?;
        let expected = self.dependencies.get(format_id)?;
        let type_id = self.concrete(module, parameter, self.type_root)?;

        let Some(used) = self.types.id_of(type_id) else {
            tracing::debug!(
                module = module.id.as_str(),
                type_id,
                "annotated type not in taxonomy"
            );
            return None;
        };

        let evaluator = SpecificityEvaluator::new(self.types);
        let suggested_type_ids: BTreeSet<String> = expected
            .iter()
            .filter(|candidate| {
                self.types
                    .id_of(candidate)
                    .is_some_and(|candidate| evaluator.is_more_specific(candidate, used))
            })
            .cloned()
            .collect();

        if suggested_type_ids.is_empty() {
            return None;
        }
        Some(ImprovementSuggestion {
            module_id: module.id.clone(),
            io_role,
            existing_format_id: format_id.to_string(),
            existing_type_id: type_id.to_string(),
            suggested_type_ids,
        })
    }

    fn concrete<'p>(
        &self,
        module: &Module,
        parameter: &'p ModuleParameter,
        dimension_root: &str,
    ) -> Option<&'p str> {
        match parameter.predicate(dimension_root) {
            Some(Predicate::Concrete { id }) => Some(id.as_str()),
            Some(Predicate::Synthetic { .. }) => None,
            None => {
                tracing::debug!(
                    module = module.id.as_str(),
                    dimension = dimension_root,
                    "parameter has no predicate for dimension"
                );
                None
            }
        }
    }
}
