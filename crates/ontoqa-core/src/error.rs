use thiserror::Error;

/// Failures while reconstructing a taxonomy or a dependency map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    /// The configured dimension root is not part of the ontology's class signature.
    #[error("dimension root `{0}` does not exist in the ontology")]
    UnknownDimensionRoot(String),

    /// A node with this id is already registered in the taxonomy.
    #[error("taxonomy node `{0}` is already registered")]
    DuplicateNode(String),
}

/// Failures while reading existential restrictions of a single class.
///
/// These never abort a traversal: callers log them and treat the class as
/// carrying no relations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestrictionError {
    #[error("malformed restriction on `{class_id}` for `{property_id}`: {reason}")]
    Malformed {
        class_id: String,
        property_id: String,
        reason: String,
    },
}
