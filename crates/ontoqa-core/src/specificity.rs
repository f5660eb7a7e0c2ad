//! "Is the expected concept strictly below the used one?"

use std::collections::HashSet;

use crate::taxonomy::{NodeId, Taxonomy};

pub struct SpecificityEvaluator<'a> {
    taxonomy: &'a Taxonomy,
}

impl<'a> SpecificityEvaluator<'a> {
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// `true` iff `expected` is a strict descendant of `used`, i.e. `used` is
    /// an over-generalization and a more specific concept is available.
    ///
    /// An exact match is not an improvement.
    pub fn is_more_specific(&self, expected: NodeId, used: NodeId) -> bool {
        if expected == used {
            return false;
        }
        self.found_below(expected, used, &mut HashSet::new())
    }

    /// Same as [`Self::is_more_specific`], addressed by class id.
    /// Unknown ids are never more specific.
    pub fn is_more_specific_id(&self, expected: &str, used: &str) -> bool {
        match (self.taxonomy.id_of(expected), self.taxonomy.id_of(used)) {
            (Some(expected), Some(used)) => self.is_more_specific(expected, used),
            _ => false,
        }
    }

    /// Each node is expanded at most once; shared descendants in a DAG are
    /// reached through many paths.
    fn found_below(
        &self,
        expected: NodeId,
        current: NodeId,
        seen: &mut HashSet<NodeId>,
    ) -> bool {
        if !seen.insert(current) {
            return false;
        }
        self.taxonomy
            .node(current)
            .children()
            .iter()
            .any(|&child| child == expected || self.found_below(expected, child, seen))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DimensionRegistry;
    use crate::source::InMemoryOntology;
    use crate::taxonomy::TaxonomyBuilder;

    fn types() -> Taxonomy {
        let onto = InMemoryOntology::new()
            .with_subclass("ProteinSequence", "Sequence")
            .with_subclass("AlignedProteinSequence", "ProteinSequence")
            .with_subclass("Alignment", "Data")
            .with_subclass("Sequence", "Data");
        let dims = DimensionRegistry::new().with_dimension("data", "Data");
        TaxonomyBuilder::new(&onto, &dims).build("Data").unwrap()
    }

    #[test]
    fn equal_concepts_are_not_more_specific() {
        let taxonomy = types();
        let eval = SpecificityEvaluator::new(&taxonomy);
        assert!(!eval.is_more_specific_id("Sequence", "Sequence"));
    }

    #[test]
    fn descendants_are_more_specific_ancestors_are_not() {
        let taxonomy = types();
        let eval = SpecificityEvaluator::new(&taxonomy);
        assert!(eval.is_more_specific_id("ProteinSequence", "Sequence"));
        assert!(eval.is_more_specific_id("AlignedProteinSequence", "Sequence"));
        assert!(eval.is_more_specific_id("AlignedProteinSequence", "Data"));
        assert!(!eval.is_more_specific_id("Sequence", "AlignedProteinSequence"));
    }

    #[test]
    fn unrelated_concepts_are_not_more_specific() {
        let taxonomy = types();
        let eval = SpecificityEvaluator::new(&taxonomy);
        assert!(!eval.is_more_specific_id("Alignment", "Sequence"));
        assert!(!eval.is_more_specific_id("Unknown", "Sequence"));
    }

    #[test]
    fn ladder_dag_is_searched_once_per_node() {
        // Every rung's L and R are both children of the previous L and R.
        let mut onto = InMemoryOntology::new()
            .with_subclass("L0", "Top")
            .with_subclass("R0", "Top");
        for level in 1..40 {
            for side in ["L", "R"] {
                let node = format!("{side}{level}");
                onto = onto
                    .with_subclass(&node, &format!("L{}", level - 1))
                    .with_subclass(&node, &format!("R{}", level - 1));
            }
        }
        onto = onto.with_class("Elsewhere");
        let dims = DimensionRegistry::new().with_dimension("top", "Top");
        let taxonomy = TaxonomyBuilder::new(&onto, &dims).build("Top").unwrap();
        assert_eq!(taxonomy.len(), 81);

        let eval = SpecificityEvaluator::new(&taxonomy);
        assert!(eval.is_more_specific_id("R39", "Top"));
        assert!(eval.is_more_specific_id("L39", "R0"));
        assert!(!eval.is_more_specific_id("L0", "R39"));
        assert!(!eval.is_more_specific_id("Elsewhere", "Top"));
    }
}
