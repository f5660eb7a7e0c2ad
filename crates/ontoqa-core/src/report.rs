//! Delimited rendering of improvement suggestions.

use std::io::{self, Write};

use crate::audit::ImprovementSuggestion;
use crate::registry::ModuleRegistry;
use crate::taxonomy::Taxonomy;

pub const REPORT_HEADER: [&str; 5] = [
    "Module",
    "IO_info",
    "Existing Format",
    "Existing Type",
    "New Types",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delimiter {
    #[default]
    Tab,
    Comma,
}

impl Delimiter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tab => "\t",
            Self::Comma => ",",
        }
    }
}

/// Commas would break the record structure in either encoding.
fn field(text: &str) -> String {
    text.replace(',', ";")
}

/// Header plus one record per suggestion, without line terminators.
///
/// Modules are rendered by label, concepts by their taxonomy label; anything
/// that cannot be resolved falls back to its id.
fn report_lines(
    suggestions: &[ImprovementSuggestion],
    modules: &ModuleRegistry,
    taxonomy: &Taxonomy,
    delimiter: Delimiter,
) -> Vec<String> {
    let sep = delimiter.as_str();
    let concept = |id: &str| field(taxonomy.label(id).unwrap_or(id));

    let mut lines = Vec::with_capacity(suggestions.len() + 1);
    lines.push(REPORT_HEADER.join(sep));
    for suggestion in suggestions {
        let module = modules
            .get(&suggestion.module_id)
            .map(|m| m.label.as_str())
            .unwrap_or(&suggestion.module_id);
        let new_types: Vec<String> = suggestion
            .suggested_type_ids
            .iter()
            .map(|id| concept(id))
            .collect();
        let record = [
            field(module),
            suggestion.io_role.to_string(),
            concept(&suggestion.existing_format_id),
            concept(&suggestion.existing_type_id),
            new_types.join(sep),
        ];
        lines.push(record.join(sep));
    }
    lines
}

/// Writes the header plus one record per suggestion.
pub fn write_suggestions<W: Write>(
    mut out: W,
    suggestions: &[ImprovementSuggestion],
    modules: &ModuleRegistry,
    taxonomy: &Taxonomy,
    delimiter: Delimiter,
) -> io::Result<()> {
    for line in report_lines(suggestions, modules, taxonomy, delimiter) {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

/// [`write_suggestions`] into a string.
pub fn render_suggestions(
    suggestions: &[ImprovementSuggestion],
    modules: &ModuleRegistry,
    taxonomy: &Taxonomy,
    delimiter: Delimiter,
) -> String {
    let mut out = String::new();
    for line in report_lines(suggestions, modules, taxonomy, delimiter) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
