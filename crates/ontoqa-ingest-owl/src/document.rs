//! Ontology documents: parsing and indexing.
//!
//! The document is parsed once into the handful of indexes the reasoner and
//! the restriction extractor need. Everything else in the graph is dropped.

use sophia::api::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

use ontoqa_core::iri::derive_label;

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
pub const OWL_RESTRICTION: &str = "http://www.w3.org/2002/07/owl#Restriction";
pub const OWL_ON_PROPERTY: &str = "http://www.w3.org/2002/07/owl#onProperty";
pub const OWL_SOME_VALUES_FROM: &str = "http://www.w3.org/2002/07/owl#someValuesFrom";
pub const OWL_EQUIVALENT_CLASS: &str = "http://www.w3.org/2002/07/owl#equivalentClass";

#[derive(Debug, Error)]
pub enum OntologyError {
    #[error("ontology document `{0}` does not exist")]
    Missing(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to parse {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("unsupported ontology format: .{0}")]
    UnsupportedFormat(String),

    #[error("malformed restriction on `{class_id}` for `{property_id}`: {reason}")]
    MalformedRestriction {
        class_id: String,
        property_id: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    NTriples,
    Turtle,
    RdfXml,
}

impl RdfFormat {
    /// Pick the serialization from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, OntologyError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "nt" | "ntriples" => Ok(Self::NTriples),
            "ttl" | "turtle" => Ok(Self::Turtle),
            "rdf" | "owl" | "xml" => Ok(Self::RdfXml),
            other => Err(OntologyError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::NTriples => "N-Triples",
            Self::Turtle => "Turtle",
            Self::RdfXml => "RDF/XML",
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Iri(String),
    Blank(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Object {
    Node(Node),
    Literal(String),
}

#[derive(Debug, Clone)]
struct Statement {
    subject: Node,
    predicate: String,
    object: Object,
}

/// Raised from inside the parser callback when a term has an unexpected shape.
#[derive(Debug, Error)]
#[error("{0}")]
struct TermError(String);

fn unescape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Read a term back from its N-Triples display form. Only the lexical form of
/// literals is kept.
fn parse_term(term: &str) -> Result<Object, TermError> {
    let s = term.trim();
    if let Some(iri) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(Object::Node(Node::Iri(iri.to_string())));
    }
    if let Some(id) = s.strip_prefix("_:") {
        return Ok(Object::Node(Node::Blank(id.to_string())));
    }
    if s.starts_with('"') {
        let mut escaped = false;
        for (i, ch) in s.char_indices().skip(1) {
            match ch {
                '"' if !escaped => return Ok(Object::Literal(unescape_literal(&s[1..i]))),
                '\\' => escaped = !escaped,
                _ => escaped = false,
            }
        }
        return Err(TermError(format!("unterminated literal: {s}")));
    }
    Err(TermError(format!("unsupported term: {s}")))
}

fn parse_node(term: &str) -> Result<Node, TermError> {
    match parse_term(term)? {
        Object::Node(node) => Ok(node),
        Object::Literal(_) => Err(TermError(format!("expected IRI or blank node: {term}"))),
    }
}

fn record(out: &mut Vec<Statement>, s: &str, p: &str, o: &str) -> Result<(), TermError> {
    let subject = parse_node(s)?;
    let Node::Iri(predicate) = parse_node(p)? else {
        return Ok(());
    };
    let object = parse_term(o)?;
    out.push(Statement {
        subject,
        predicate,
        object,
    });
    Ok(())
}

fn parse_statements(bytes: &[u8], format: RdfFormat) -> Result<Vec<Statement>, OntologyError> {
    let reader = std::io::BufReader::new(std::io::Cursor::new(bytes));
    let parse_error = |message: String| OntologyError::Parse {
        format: format.name(),
        message,
    };

    let mut out = Vec::new();
    match format {
        RdfFormat::NTriples => {
            let mut parser = sophia::turtle::parser::nt::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| {
                    record(
                        &mut out,
                        &t.s().to_string(),
                        &t.p().to_string(),
                        &t.o().to_string(),
                    )
                })
                .map_err(|e| parse_error(e.to_string()))?;
        }
        RdfFormat::Turtle => {
            let mut parser = sophia::turtle::parser::turtle::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| {
                    record(
                        &mut out,
                        &t.s().to_string(),
                        &t.p().to_string(),
                        &t.o().to_string(),
                    )
                })
                .map_err(|e| parse_error(e.to_string()))?;
        }
        RdfFormat::RdfXml => {
            let mut parser = sophia::xml::parser::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| {
                    record(
                        &mut out,
                        &t.s().to_string(),
                        &t.p().to_string(),
                        &t.o().to_string(),
                    )
                })
                .map_err(|e| parse_error(e.to_string()))?;
        }
    }
    Ok(out)
}

// ============================================================================
// Indexed document
// ============================================================================

/// Filler of an `owl:someValuesFrom`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Filler {
    Named(String),
    /// Nested class expression (blank node).
    Anonymous,
}

/// The parts of one anonymous super-class we care about.
#[derive(Debug, Clone, Default)]
pub(crate) struct RestrictionParts {
    pub(crate) typed: bool,
    pub(crate) on_property: Option<String>,
    pub(crate) some_values_from: Vec<Filler>,
}

impl RestrictionParts {
    pub(crate) fn is_restriction(&self) -> bool {
        self.typed || self.on_property.is_some() || !self.some_values_from.is_empty()
    }
}

/// A parsed ontology, reduced to its class hierarchy, labels and existential
/// restrictions.
#[derive(Debug, Clone, Default)]
pub struct OntologyDocument {
    source: String,
    statements: usize,
    classes: BTreeSet<String>,
    supers: BTreeMap<String, Vec<String>>,
    subs: BTreeMap<String, Vec<String>>,
    equivalents: BTreeMap<String, Vec<String>>,
    labels: HashMap<String, String>,
    anonymous_supers: HashMap<String, Vec<String>>,
    restrictions: HashMap<String, RestrictionParts>,
}

impl OntologyDocument {
    /// Load and index the document at `path`; the serialization follows the
    /// file extension.
    pub fn load(path: &Path) -> Result<Self, OntologyError> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "provided ontology does not exist");
            return Err(OntologyError::Missing(path.to_path_buf()));
        }
        let format = RdfFormat::from_path(path)?;
        let bytes = std::fs::read(path)?;
        let mut document = Self::from_bytes(&bytes, format)?;
        document.source = path.display().to_string();

        tracing::info!(
            path = %path.display(),
            format = format.name(),
            statements = document.statements,
            classes = document.classes.len(),
            "ontology loaded"
        );
        Ok(document)
    }

    pub fn from_bytes(bytes: &[u8], format: RdfFormat) -> Result<Self, OntologyError> {
        let statements = parse_statements(bytes, format)?;
        let mut document = Self {
            source: "<memory>".to_string(),
            statements: statements.len(),
            ..Self::default()
        };
        for statement in statements {
            document.index(statement);
        }
        Ok(document)
    }

    fn index(&mut self, statement: Statement) {
        let Statement {
            subject,
            predicate,
            object,
        } = statement;

        match (predicate.as_str(), subject, object) {
            (RDF_TYPE, Node::Iri(class), Object::Node(Node::Iri(ty))) if ty == OWL_CLASS => {
                self.classes.insert(class);
            }
            (RDF_TYPE, Node::Blank(b), Object::Node(Node::Iri(ty))) if ty == OWL_RESTRICTION => {
                self.restriction_mut(b).typed = true;
            }
            (RDFS_SUB_CLASS_OF, Node::Iri(sub), Object::Node(Node::Iri(sup))) => {
                self.add_subclass(sub, sup);
            }
            (RDFS_SUB_CLASS_OF, Node::Iri(sub), Object::Node(Node::Blank(b))) => {
                self.classes.insert(sub.clone());
                self.anonymous_supers.entry(sub).or_default().push(b);
            }
            (OWL_EQUIVALENT_CLASS, Node::Iri(a), Object::Node(Node::Iri(b))) => {
                self.classes.insert(a.clone());
                self.classes.insert(b.clone());
                push_unique(self.equivalents.entry(a.clone()).or_default(), &b);
                push_unique(self.equivalents.entry(b).or_default(), &a);
            }
            (RDFS_LABEL, Node::Iri(class), Object::Literal(label)) => {
                // First label wins.
                self.labels.entry(class).or_insert(label);
            }
            (OWL_ON_PROPERTY, Node::Blank(b), Object::Node(Node::Iri(property))) => {
                self.restriction_mut(b).on_property = Some(property);
            }
            (OWL_SOME_VALUES_FROM, Node::Blank(b), Object::Node(filler)) => {
                let filler = match filler {
                    Node::Iri(class) => {
                        self.classes.insert(class.clone());
                        Filler::Named(class)
                    }
                    Node::Blank(_) => Filler::Anonymous,
                };
                self.restriction_mut(b).some_values_from.push(filler);
            }
            _ => {}
        }
    }

    fn add_subclass(&mut self, sub: String, sup: String) {
        self.classes.insert(sub.clone());
        self.classes.insert(sup.clone());
        push_unique(self.subs.entry(sup.clone()).or_default(), &sub);
        push_unique(self.supers.entry(sub).or_default(), &sup);
    }

    fn restriction_mut(&mut self, bnode: String) -> &mut RestrictionParts {
        self.restrictions.entry(bnode).or_default()
    }

    /// Where the document came from (a path, or `<memory>`).
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn statement_count(&self) -> usize {
        self.statements
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn contains_class(&self, class_id: &str) -> bool {
        self.classes.contains(class_id)
    }

    /// Class signature in IRI order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    /// First `rdfs:label` of the class.
    pub fn label(&self, class_id: &str) -> Option<&str> {
        self.labels.get(class_id).map(String::as_str)
    }

    /// Label for display: `rdfs:label`, else the IRI fragment, else the id.
    pub fn display_label(&self, class_id: &str) -> String {
        match self.label(class_id) {
            Some(label) => label.to_string(),
            None => derive_label(class_id),
        }
    }

    /// Asserted named super-classes, in document order.
    pub fn named_superclasses(&self, class_id: &str) -> &[String] {
        self.supers.get(class_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Asserted named subclasses, in document order.
    pub fn asserted_subclasses(&self, class_id: &str) -> &[String] {
        self.subs.get(class_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn equivalent_classes(&self, class_id: &str) -> &[String] {
        self.equivalents
            .get(class_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn anonymous_superclasses(&self, class_id: &str) -> &[String] {
        self.anonymous_supers
            .get(class_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn restriction(&self, bnode: &str) -> Option<&RestrictionParts> {
        self.restrictions.get(bnode)
    }
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TTL: &str = r#"
@prefix : <http://edamontology.org/> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

:format_1915 a owl:Class ; rdfs:label "Format" .
:format_1929 a owl:Class ;
    rdfs:label "FASTA" , "FASTA format" ;
    rdfs:subClassOf :format_1915 ,
        [ a owl:Restriction ; owl:onProperty :is_format_of ; owl:someValuesFrom :data_2044 ] .
:format_1984 rdfs:subClassOf :format_1929 .
"#;

    fn edam(id: &str) -> String {
        format!("http://edamontology.org/{id}")
    }

    #[test]
    fn indexes_classes_hierarchy_and_labels() {
        let doc = OntologyDocument::from_bytes(SAMPLE_TTL.as_bytes(), RdfFormat::Turtle).unwrap();

        assert!(doc.contains_class(&edam("format_1915")));
        assert!(doc.contains_class(&edam("format_1984")));
        // Restriction fillers are classes too.
        assert!(doc.contains_class(&edam("data_2044")));
        assert_eq!(doc.class_count(), 4);

        assert_eq!(
            doc.asserted_subclasses(&edam("format_1915")),
            &[edam("format_1929")]
        );
        assert_eq!(
            doc.named_superclasses(&edam("format_1984")),
            &[edam("format_1929")]
        );
        assert_eq!(doc.label(&edam("format_1929")), Some("FASTA"));
        assert_eq!(doc.display_label(&edam("format_1984")), edam("format_1984"));
        assert_eq!(doc.source(), "<memory>");
    }

    #[test]
    fn dispatches_on_extension() {
        assert_eq!(
            RdfFormat::from_path(Path::new("EDAM.owl")).unwrap(),
            RdfFormat::RdfXml
        );
        assert_eq!(
            RdfFormat::from_path(Path::new("edam.TTL")).unwrap(),
            RdfFormat::Turtle
        );
        assert_eq!(
            RdfFormat::from_path(Path::new("dump.nt")).unwrap(),
            RdfFormat::NTriples
        );
        assert!(matches!(
            RdfFormat::from_path(Path::new("edam.json")),
            Err(OntologyError::UnsupportedFormat(ext)) if ext == "json"
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = OntologyDocument::load(Path::new("/nonexistent/edam.owl")).unwrap_err();
        assert!(matches!(err, OntologyError::Missing(_)));
    }

    #[test]
    fn parse_errors_name_the_format() {
        let err = OntologyDocument::from_bytes(b"this is not turtle", RdfFormat::Turtle)
            .unwrap_err();
        match err {
            OntologyError::Parse { format, .. } => assert_eq!(format, "Turtle"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ntriples_are_supported() {
        let nt = format!(
            "<{}> <{RDFS_SUB_CLASS_OF}> <{}> .\n",
            edam("format_1929"),
            edam("format_1915")
        );
        let doc = OntologyDocument::from_bytes(nt.as_bytes(), RdfFormat::NTriples).unwrap();
        assert_eq!(doc.statement_count(), 1);
        assert_eq!(
            doc.asserted_subclasses(&edam("format_1915")),
            &[edam("format_1929")]
        );
    }
}
