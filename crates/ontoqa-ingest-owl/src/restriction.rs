//! Existential restrictions declared on a class.

use std::collections::BTreeSet;

use ontoqa_core::{RestrictionError, RestrictionSource};

use crate::document::{Filler, OntologyDocument, OntologyError};

impl OntologyDocument {
    /// Targets of every `property_id some T` restriction asserted as a direct
    /// super-class of `class_id`.
    ///
    /// Restrictions on other properties are ignored, even when malformed.
    /// Unknown classes and classes without restrictions yield an empty set.
    pub fn restriction_targets(
        &self,
        class_id: &str,
        property_id: &str,
    ) -> Result<BTreeSet<String>, OntologyError> {
        let malformed = |reason: &str| OntologyError::MalformedRestriction {
            class_id: class_id.to_string(),
            property_id: property_id.to_string(),
            reason: reason.to_string(),
        };

        let mut targets = BTreeSet::new();
        for bnode in self.anonymous_superclasses(class_id) {
            let Some(parts) = self.restriction(bnode) else {
                continue;
            };
            if !parts.is_restriction() {
                continue;
            }
            match parts.on_property.as_deref() {
                None => {
                    tracing::debug!(
                        class = class_id,
                        restriction = bnode.as_str(),
                        "restriction without owl:onProperty skipped"
                    );
                }
                Some(property) if property == property_id => {
                    for filler in &parts.some_values_from {
                        match filler {
                            Filler::Named(target) => {
                                targets.insert(target.clone());
                            }
                            Filler::Anonymous => {
                                return Err(malformed("someValuesFrom is not a named class"));
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(targets)
    }
}

impl RestrictionSource for OntologyDocument {
    fn relation_targets(
        &self,
        class_id: &str,
        property_id: &str,
    ) -> Result<BTreeSet<String>, RestrictionError> {
        self.restriction_targets(class_id, property_id)
            .map_err(|err| match err {
                OntologyError::MalformedRestriction {
                    class_id,
                    property_id,
                    reason,
                } => RestrictionError::Malformed {
                    class_id,
                    property_id,
                    reason,
                },
                other => RestrictionError::Malformed {
                    class_id: class_id.to_string(),
                    property_id: property_id.to_string(),
                    reason: other.to_string(),
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RdfFormat;

    const PREFIXES: &str = r#"
@prefix : <http://example.org/onto#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
"#;

    fn doc(body: &str) -> OntologyDocument {
        let text = format!("{PREFIXES}{body}");
        OntologyDocument::from_bytes(text.as_bytes(), RdfFormat::Turtle).unwrap()
    }

    fn iri(local: &str) -> String {
        format!("http://example.org/onto#{local}")
    }

    #[test]
    fn collects_targets_across_matching_restrictions() {
        let d = doc(r#"
:FASTA a owl:Class ;
    rdfs:subClassOf
        [ a owl:Restriction ; owl:onProperty :is_format_of ; owl:someValuesFrom :Sequence ] ,
        [ a owl:Restriction ; owl:onProperty :is_format_of ; owl:someValuesFrom :Alignment ] ,
        [ a owl:Restriction ; owl:onProperty :has_topic ; owl:someValuesFrom :Genomics ] .
"#);
        let targets = d
            .restriction_targets(&iri("FASTA"), &iri("is_format_of"))
            .unwrap();
        assert_eq!(
            targets,
            BTreeSet::from([iri("Alignment"), iri("Sequence")])
        );
    }

    #[test]
    fn no_restrictions_is_empty() {
        let d = doc(":FASTQ a owl:Class .\n");
        assert!(d
            .restriction_targets(&iri("FASTQ"), &iri("is_format_of"))
            .unwrap()
            .is_empty());
        assert!(d
            .restriction_targets(&iri("Unknown"), &iri("is_format_of"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn inherited_restrictions_are_not_direct() {
        let d = doc(r#"
:FASTA rdfs:subClassOf
    [ a owl:Restriction ; owl:onProperty :is_format_of ; owl:someValuesFrom :Sequence ] .
:FASTA_aligned rdfs:subClassOf :FASTA .
"#);
        assert!(d
            .restriction_targets(&iri("FASTA_aligned"), &iri("is_format_of"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn anonymous_filler_on_requested_property_is_malformed() {
        let d = doc(r#"
:Broken rdfs:subClassOf
    [ a owl:Restriction ; owl:onProperty :is_format_of ;
      owl:someValuesFrom [ owl:unionOf ( :A :B ) ] ] .
"#);
        let err = d
            .restriction_targets(&iri("Broken"), &iri("is_format_of"))
            .unwrap_err();
        assert!(matches!(err, OntologyError::MalformedRestriction { .. }));

        // The same restriction is invisible to other properties.
        assert!(d
            .restriction_targets(&iri("Broken"), &iri("has_topic"))
            .unwrap()
            .is_empty());

        assert!(matches!(
            d.relation_targets(&iri("Broken"), &iri("is_format_of")),
            Err(RestrictionError::Malformed { .. })
        ));
    }

    #[test]
    fn restriction_without_property_is_skipped() {
        let d = doc(r#"
:Odd rdfs:subClassOf
    [ a owl:Restriction ; owl:someValuesFrom :Sequence ] ,
    [ a owl:Restriction ; owl:onProperty :is_format_of ; owl:someValuesFrom :Alignment ] .
"#);
        assert_eq!(
            d.restriction_targets(&iri("Odd"), &iri("is_format_of")).unwrap(),
            BTreeSet::from([iri("Alignment")])
        );
        assert!(d
            .restriction_targets(&iri("Odd"), &iri("has_topic"))
            .unwrap()
            .is_empty());
    }
}
