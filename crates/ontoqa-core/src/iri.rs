//! Small helpers for ontology identifiers.

pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";
pub const OWL_NOTHING: &str = "http://www.w3.org/2002/07/owl#Nothing";

/// Prefix IRI used by EDAM identifiers.
pub const EDAM_PREFIX: &str = "http://edamontology.org/";

/// Returns `true` when `id` already carries a scheme (`http://...`, `urn:...`).
pub fn is_absolute(id: &str) -> bool {
    match id.split_once(':') {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Expand a short identifier (`format_1915`) against `prefix`.
pub fn expand_iri(prefix: &str, id: &str) -> String {
    let id = id.trim();
    if is_absolute(id) {
        id.to_string()
    } else {
        format!("{prefix}{id}")
    }
}

/// Last path or fragment segment of an IRI.
pub fn local_name(iri: &str) -> &str {
    iri.rsplit(['#', '/']).next().unwrap_or(iri)
}

/// Fallback label for a class without an `rdfs:label`: the fragment after `#`,
/// otherwise the identifier itself.
pub fn derive_label(class_id: &str) -> String {
    match class_id.split_once('#') {
        Some((_, fragment)) if !fragment.is_empty() => fragment.to_string(),
        _ => class_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_only_relative_ids() {
        assert_eq!(
            expand_iri(EDAM_PREFIX, "format_1915"),
            "http://edamontology.org/format_1915"
        );
        assert_eq!(
            expand_iri(EDAM_PREFIX, "http://example.org/X"),
            "http://example.org/X"
        );
    }

    #[test]
    fn label_falls_back_to_fragment_then_id() {
        assert_eq!(derive_label("http://example.org/onto#Sequence"), "Sequence");
        assert_eq!(
            derive_label("http://edamontology.org/data_0006"),
            "http://edamontology.org/data_0006"
        );
    }

    #[test]
    fn local_name_handles_both_separators() {
        assert_eq!(local_name("http://edamontology.org/data_0006"), "data_0006");
        assert_eq!(local_name("http://example.org/onto#FASTA"), "FASTA");
    }
}
