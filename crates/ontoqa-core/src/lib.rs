//! Ontology-driven annotation quality checks.
//!
//! This crate holds the algorithmic core:
//! - reconstructing a dimension's class hierarchy into a [`taxonomy::Taxonomy`],
//! - extracting transitively inherited object-property dependencies
//!   ([`dependency::DependencyMap`]),
//! - deciding whether one concept is strictly more specific than another
//!   ([`specificity::SpecificityEvaluator`]),
//! - auditing tool annotations against those dependencies
//!   ([`audit::AnnotationAuditor`]).
//!
//! Reading ontology documents and tool annotation files happens elsewhere
//! (`ontoqa-ingest-owl`, `ontoqa-ingest-json`); this crate only sees them
//! through the narrow seams in [`source`] and the registries in [`registry`].

pub mod audit;
pub mod dependency;
pub mod error;
pub mod iri;
pub mod registry;
pub mod report;
pub mod source;
pub mod specificity;
pub mod taxonomy;

pub use audit::{AnnotationAuditor, ImprovementSuggestion, IoRole};
pub use dependency::{DependencyMap, DependencyMapBuilder};
pub use error::{RestrictionError, TaxonomyError};
pub use registry::{DimensionRegistry, Module, ModuleParameter, ModuleRegistry, Predicate};
pub use report::{render_suggestions, write_suggestions, Delimiter};
pub use source::{InMemoryOntology, RestrictionSource, TaxonomyReasoner};
pub use specificity::SpecificityEvaluator;
pub use taxonomy::{
    nodes_by_dimension, NodeId, NodeKind, Taxonomy, TaxonomyBuilder, TaxonomyNode, TaxonomySummary,
};
