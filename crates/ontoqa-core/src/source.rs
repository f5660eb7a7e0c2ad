//! Seams between the core algorithms and an ontology backend.
//!
//! The builders never touch a parsed document directly. They ask a
//! [`TaxonomyReasoner`] for the class hierarchy and a [`RestrictionSource`]
//! for existential restrictions, so they can be exercised against the
//! [`InMemoryOntology`] fixture as easily as against a real OWL file.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::RestrictionError;
use crate::iri::{OWL_NOTHING, OWL_THING};

/// Subsumption queries over a class hierarchy.
///
/// Implementations must answer from current state (no buffered changes).
pub trait TaxonomyReasoner {
    /// Whether `class_id` is part of the ontology's class signature.
    fn contains_class(&self, class_id: &str) -> bool;

    /// Direct (non-transitive) subclasses of `class_id`, in a stable order.
    fn direct_subclasses(&self, class_id: &str) -> Vec<String>;

    fn is_satisfiable(&self, class_id: &str) -> bool;

    /// Human readable label annotation, if the ontology carries one.
    fn class_label(&self, _class_id: &str) -> Option<String> {
        None
    }
}

/// Existential (`someValuesFrom`) restrictions declared directly on a class.
pub trait RestrictionSource {
    /// Targets of every `property_id some T` restriction on `class_id`.
    ///
    /// An empty set means the class declares no such restriction.
    fn relation_targets(
        &self,
        class_id: &str,
        property_id: &str,
    ) -> Result<BTreeSet<String>, RestrictionError>;
}

// ============================================================================
// In-memory ontology
// ============================================================================

/// A hand-assembled ontology implementing both seams.
///
/// Handy for tests and for callers that already hold a class hierarchy in
/// memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOntology {
    classes: BTreeSet<String>,
    subclasses: BTreeMap<String, Vec<String>>,
    labels: BTreeMap<String, String>,
    unsatisfiable: BTreeSet<String>,
    restrictions: BTreeMap<(String, String), BTreeSet<String>>,
    malformed: BTreeSet<(String, String)>,
}

impl InMemoryOntology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class_id: &str) -> Self {
        self.add_class(class_id);
        self
    }

    pub fn with_subclass(mut self, sub: &str, sup: &str) -> Self {
        self.add_subclass(sub, sup);
        self
    }

    pub fn with_label(mut self, class_id: &str, label: &str) -> Self {
        self.add_class(class_id);
        self.labels.insert(class_id.to_string(), label.to_string());
        self
    }

    pub fn with_unsatisfiable(mut self, class_id: &str) -> Self {
        self.add_class(class_id);
        self.unsatisfiable.insert(class_id.to_string());
        self
    }

    pub fn with_restriction(mut self, class_id: &str, property_id: &str, target: &str) -> Self {
        self.add_class(class_id);
        self.restrictions
            .entry((class_id.to_string(), property_id.to_string()))
            .or_default()
            .insert(target.to_string());
        self
    }

    /// Mark the restrictions of `class_id` on `property_id` as unreadable.
    pub fn with_malformed_restriction(mut self, class_id: &str, property_id: &str) -> Self {
        self.add_class(class_id);
        self.malformed
            .insert((class_id.to_string(), property_id.to_string()));
        self
    }

    pub fn add_class(&mut self, class_id: &str) {
        self.classes.insert(class_id.to_string());
    }

    pub fn add_subclass(&mut self, sub: &str, sup: &str) {
        self.add_class(sub);
        self.add_class(sup);
        let children = self.subclasses.entry(sup.to_string()).or_default();
        if !children.iter().any(|c| c == sub) {
            children.push(sub.to_string());
        }
    }
}

impl TaxonomyReasoner for InMemoryOntology {
    fn contains_class(&self, class_id: &str) -> bool {
        class_id == OWL_THING || self.classes.contains(class_id)
    }

    fn direct_subclasses(&self, class_id: &str) -> Vec<String> {
        if class_id == OWL_THING {
            let with_parent: BTreeSet<&String> = self.subclasses.values().flatten().collect();
            return self
                .classes
                .iter()
                .filter(|c| !with_parent.contains(c))
                .cloned()
                .collect();
        }
        self.subclasses.get(class_id).cloned().unwrap_or_default()
    }

    fn is_satisfiable(&self, class_id: &str) -> bool {
        class_id != OWL_NOTHING && !self.unsatisfiable.contains(class_id)
    }

    fn class_label(&self, class_id: &str) -> Option<String> {
        self.labels.get(class_id).cloned()
    }
}

impl RestrictionSource for InMemoryOntology {
    fn relation_targets(
        &self,
        class_id: &str,
        property_id: &str,
    ) -> Result<BTreeSet<String>, RestrictionError> {
        let key = (class_id.to_string(), property_id.to_string());
        if self.malformed.contains(&key) {
            return Err(RestrictionError::Malformed {
                class_id: class_id.to_string(),
                property_id: property_id.to_string(),
                reason: "restriction marked unreadable".to_string(),
            });
        }
        Ok(self.restrictions.get(&key).cloned().unwrap_or_default())
    }
}
