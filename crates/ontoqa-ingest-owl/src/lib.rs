//! OWL ontology backend for ontoqa.
//!
//! Parses an ontology document once with **Sophia** and answers the two
//! questions the core builders ask:
//!
//! - [`StructuralReasoner`]: asserted class hierarchy, satisfiability and
//!   labels (`TaxonomyReasoner`).
//! - [`OntologyDocument`]: existential restrictions declared on a class
//!   (`RestrictionSource`).
//!
//! Supported serializations:
//! - RDF/XML (`.owl`, `.rdf`, `.xml`)
//! - Turtle (`.ttl`)
//! - N-Triples (`.nt`)

pub mod document;
pub mod reasoner;
pub mod restriction;

pub use document::{OntologyDocument, OntologyError, RdfFormat};
pub use reasoner::StructuralReasoner;
