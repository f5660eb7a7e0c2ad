//! Dimension and module registries handed to the core by the ingestion layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::taxonomy::Taxonomy;

// ============================================================================
// Dimensions
// ============================================================================

/// Maps a dimension name (e.g. `data_0006`) to its root class id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRegistry {
    dimensions: BTreeMap<String, String>,
}

impl DimensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, root_id: impl Into<String>) {
        self.dimensions.insert(name.into(), root_id.into());
    }

    pub fn with_dimension(mut self, name: impl Into<String>, root_id: impl Into<String>) -> Self {
        self.register(name, root_id);
        self
    }

    pub fn root_of(&self, name: &str) -> Option<&str> {
        self.dimensions.get(name).map(String::as_str)
    }

    /// Whether `class_id` is the root of any registered dimension.
    pub fn is_root(&self, class_id: &str) -> bool {
        self.dimensions.values().any(|root| root == class_id)
    }

    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.dimensions.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }
}

// ============================================================================
// Modules
// ============================================================================

/// The annotation of one parameter along one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// A single taxonomy concept.
    Concrete { id: String },
    /// An aggregate of several concepts that does not resolve to one node.
    Synthetic { members: Vec<String> },
}

impl Predicate {
    pub fn concrete(id: impl Into<String>) -> Self {
        Self::Concrete { id: id.into() }
    }

    pub fn concrete_id(&self) -> Option<&str> {
        match self {
            Self::Concrete { id } => Some(id),
            Self::Synthetic { .. } => None,
        }
    }
}

/// One module input or output; carries at most one predicate per dimension root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleParameter {
    predicates: BTreeMap<String, Predicate>,
}

impl ModuleParameter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, dimension_root: impl Into<String>, predicate: Predicate) -> Self {
        self.predicates.insert(dimension_root.into(), predicate);
        self
    }

    pub fn insert(&mut self, dimension_root: impl Into<String>, predicate: Predicate) {
        self.predicates.insert(dimension_root.into(), predicate);
    }

    pub fn predicate(&self, dimension_root: &str) -> Option<&Predicate> {
        self.predicates.get(dimension_root)
    }

    pub fn predicates(&self) -> impl Iterator<Item = (&str, &Predicate)> {
        self.predicates.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// An annotated tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub operations: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<ModuleParameter>,
    #[serde(default)]
    pub outputs: Vec<ModuleParameter>,
}

impl Module {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            operations: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_input(mut self, parameter: ModuleParameter) -> Self {
        self.inputs.push(parameter);
        self
    }

    pub fn with_output(mut self, parameter: ModuleParameter) -> Self {
        self.outputs.push(parameter);
        self
    }
}

/// Modules in annotation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRegistry {
    modules: Vec<Module>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `module`, replacing an earlier module with the same id in place.
    pub fn push(&mut self, module: Module) {
        match self.modules.iter_mut().find(|m| m.id == module.id) {
            Some(existing) => *existing = module,
            None => self.modules.push(module),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Strict annotations: a concrete predicate naming a concept with a plain
    /// variant in `taxonomy` is rewritten to that variant. Dimension roots
    /// (unannotated dimensions) are left alone. Returns the number of
    /// rewritten predicates.
    pub fn route_to_plain(&mut self, taxonomy: &Taxonomy) -> usize {
        let mut routed = 0;
        for module in &mut self.modules {
            for parameter in module.inputs.iter_mut().chain(module.outputs.iter_mut()) {
                for (root, predicate) in parameter.predicates.iter_mut() {
                    let Predicate::Concrete { id } = predicate else {
                        continue;
                    };
                    if id.as_str() == root.as_str() {
                        continue;
                    }
                    let plain = taxonomy
                        .get(id)
                        .and_then(|node| node.plain_variant())
                        .map(|plain| taxonomy.node(plain).id().to_string());
                    if let Some(plain) = plain {
                        *id = plain;
                        routed += 1;
                    }
                }
            }
        }
        tracing::debug!(routed, "annotations routed to plain variants");
        routed
    }
}

impl FromIterator<Module> for ModuleRegistry {
    fn from_iter<I: IntoIterator<Item = Module>>(iter: I) -> Self {
        let mut registry = Self::new();
        for module in iter {
            registry.push(module);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_keeps_order_and_replaces_duplicates() {
        let registry: ModuleRegistry = [
            Module::new("b", "B"),
            Module::new("a", "A"),
            Module::new("b", "B2"),
        ]
        .into_iter()
        .collect();

        let ids: Vec<&str> = registry.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(registry.get("b").map(|m| m.label.as_str()), Some("B2"));
    }

    #[test]
    fn synthetic_predicate_has_no_concrete_id() {
        let p = Predicate::Synthetic {
            members: vec!["x".into(), "y".into()],
        };
        assert_eq!(p.concrete_id(), None);
        assert_eq!(Predicate::concrete("x").concrete_id(), Some("x"));
    }

    #[test]
    fn strict_routing_rewrites_abstract_concepts_only() {
        use crate::source::InMemoryOntology;
        use crate::taxonomy::TaxonomyBuilder;

        let onto = InMemoryOntology::new()
            .with_subclass("Sequence", "Data")
            .with_subclass("ProteinSequence", "Sequence");
        let dims = DimensionRegistry::new().with_dimension("data", "Data");
        let taxonomy = TaxonomyBuilder::new(&onto, &dims)
            .strict(true)
            .build("Data")
            .unwrap();

        let mut registry: ModuleRegistry = [Module::new("t", "Tool")
            .with_input(ModuleParameter::new().with("Data", Predicate::concrete("Sequence")))
            .with_input(ModuleParameter::new().with("Data", Predicate::concrete("ProteinSequence")))
            .with_output(ModuleParameter::new().with("Data", Predicate::concrete("Data")))
            .with_output(ModuleParameter::new().with(
                "Data",
                Predicate::Synthetic {
                    members: vec!["Sequence".into(), "ProteinSequence".into()],
                },
            ))]
        .into_iter()
        .collect();

        assert_eq!(registry.route_to_plain(&taxonomy), 1);
        let tool = registry.get("t").unwrap();
        assert_eq!(
            tool.inputs[0].predicate("Data"),
            Some(&Predicate::concrete("Sequence_plain"))
        );
        assert_eq!(
            tool.inputs[1].predicate("Data"),
            Some(&Predicate::concrete("ProteinSequence"))
        );
        assert_eq!(tool.outputs[0].predicate("Data"), Some(&Predicate::concrete("Data")));
        assert!(matches!(
            tool.outputs[1].predicate("Data"),
            Some(Predicate::Synthetic { .. })
        ));
    }

    #[test]
    fn dimension_roots_are_recognized() {
        let dims = DimensionRegistry::new()
            .with_dimension("data_0006", "http://edamontology.org/data_0006")
            .with_dimension("format_1915", "http://edamontology.org/format_1915");
        assert!(dims.is_root("http://edamontology.org/format_1915"));
        assert!(!dims.is_root("http://edamontology.org/format_1929"));
        assert_eq!(dims.root_of("data_0006"), Some("http://edamontology.org/data_0006"));
    }
}
