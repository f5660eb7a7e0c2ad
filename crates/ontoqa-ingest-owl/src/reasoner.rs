//! Structural reasoning over asserted axioms.
//!
//! No inference beyond what is written down: subclasses are the asserted
//! `rdfs:subClassOf` edges, and a class is unsatisfiable only when it is
//! stated (directly, transitively or through `owl:equivalentClass`) to be a
//! subclass of `owl:Nothing`.

use std::collections::BTreeSet;

use ontoqa_core::iri::{OWL_NOTHING, OWL_THING};
use ontoqa_core::TaxonomyReasoner;

use crate::document::OntologyDocument;

/// Non-buffering reasoner over a loaded document.
///
/// The unsatisfiable closure is computed once on construction; the document
/// is immutable so answers never go stale.
#[derive(Debug, Clone)]
pub struct StructuralReasoner<'a> {
    document: &'a OntologyDocument,
    unsatisfiable: BTreeSet<String>,
}

impl<'a> StructuralReasoner<'a> {
    pub fn new(document: &'a OntologyDocument) -> Self {
        let unsatisfiable = unsatisfiable_closure(document);
        if unsatisfiable.len() > 1 {
            tracing::debug!(
                classes = unsatisfiable.len() - 1,
                "unsatisfiable classes will be pruned"
            );
        }
        Self {
            document,
            unsatisfiable,
        }
    }

    pub fn document(&self) -> &'a OntologyDocument {
        self.document
    }

    /// Unsatisfiable classes in IRI order, `owl:Nothing` included.
    pub fn unsatisfiable_classes(&self) -> impl Iterator<Item = &str> {
        self.unsatisfiable.iter().map(String::as_str)
    }
}

/// Everything below or equivalent to `owl:Nothing`.
fn unsatisfiable_closure(document: &OntologyDocument) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let mut queue = vec![OWL_NOTHING.to_string()];
    while let Some(class) = queue.pop() {
        if !out.insert(class.clone()) {
            continue;
        }
        queue.extend(document.asserted_subclasses(&class).iter().cloned());
        queue.extend(document.equivalent_classes(&class).iter().cloned());
    }
    out
}

impl TaxonomyReasoner for StructuralReasoner<'_> {
    fn contains_class(&self, class_id: &str) -> bool {
        class_id == OWL_THING || self.document.contains_class(class_id)
    }

    fn direct_subclasses(&self, class_id: &str) -> Vec<String> {
        if class_id == OWL_THING {
            return self
                .document
                .classes()
                .filter(|c| *c != OWL_THING)
                .filter(|c| {
                    self.document
                        .named_superclasses(c)
                        .iter()
                        .all(|sup| sup == OWL_THING)
                })
                .map(str::to_string)
                .collect();
        }
        self.document
            .asserted_subclasses(class_id)
            .iter()
            .filter(|sub| *sub != class_id)
            .cloned()
            .collect()
    }

    fn is_satisfiable(&self, class_id: &str) -> bool {
        !self.unsatisfiable.contains(class_id)
    }

    fn class_label(&self, class_id: &str) -> Option<String> {
        self.document.label(class_id).map(str::to_string)
    }
}
