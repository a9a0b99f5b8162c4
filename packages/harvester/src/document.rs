//! Assembly of section documents.
//!
//! Combines a flattened section, its rebuilt outline and the caller's
//! metadata into the document that is written to storage.

use serde_json::Value;

use crate::config::{section_url, HarvestConfig};
use crate::outline::{build_outline, OutlineError};
use crate::types::{DocumentMetadata, RawSection, SectionDocument};

/// Per-subpart values shared by every section document.
#[derive(Debug, Clone, Copy)]
pub struct DocumentContext<'a> {
    pub regulation_source: &'a str,
    pub subpart: &'a str,
    pub subpart_name: &'a str,
}

/// Build the document for one section.
///
/// # Errors
/// Returns the [`OutlineError`] raised while rebuilding the outline; no
/// partial document is produced.
pub fn build_document(
    section: &RawSection,
    context: &DocumentContext<'_>,
    description: String,
    metadata: DocumentMetadata,
) -> Result<SectionDocument, OutlineError> {
    let content = build_outline(&section.id, &section.paragraphs)?;

    Ok(SectionDocument {
        regulation_id: regulation_id(section),
        regulation_source: context.regulation_source.to_string(),
        code: section.id.clone(),
        title: crate::xml::section_title(&section.heading, &section.id),
        description,
        subpart: context.subpart.to_string(),
        subpart_name: context.subpart_name.to_string(),
        content,
        metadata,
    })
}

/// Metadata record for a section of the configured part.
#[must_use]
pub fn section_metadata(
    config: &HarvestConfig,
    version_date: &str,
    section_id: &str,
    extraction_date: &str,
) -> DocumentMetadata {
    DocumentMetadata {
        facility_type: config.facility_type.clone(),
        part_label: config.part_label(),
        title_number: config.title.to_string(),
        version: version_date.to_string(),
        effective_date: version_date.to_string(),
        federal_register_citation: config.federal_register_citation.clone(),
        extraction_date: extraction_date.to_string(),
        source_url: section_url(config.title, section_id),
    }
}

/// Identifier derived from the section citation.
///
/// Uses the `citation` entry of `hierarchy_metadata` (e.g. `42 CFR 482.1`
/// becomes `42_CFR_482_1`), falling back to the section id.
///
/// # Examples
/// ```
/// use ecfr_harvester::document::regulation_id;
/// use ecfr_harvester::types::RawSection;
///
/// let section = RawSection {
///     id: "482.1".to_string(),
///     heading: String::new(),
///     hierarchy_metadata: Some(r#"{"citation":"42 CFR 482.1"}"#.to_string()),
///     paragraphs: Vec::new(),
/// };
/// assert_eq!(regulation_id(&section), "42_CFR_482_1");
/// ```
#[must_use]
pub fn regulation_id(section: &RawSection) -> String {
    let citation = section
        .hierarchy_metadata
        .as_deref()
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .and_then(|value| value.get("citation")?.as_str().map(str::to_string));

    let citation = citation.unwrap_or_else(|| {
        if section.hierarchy_metadata.is_some() {
            tracing::debug!(section = %section.id, "No citation in hierarchy_metadata");
        }
        section.id.clone()
    });

    citation
        .trim()
        .chars()
        .filter(|c| *c != '"' && *c != '}')
        .map(|c| if c == ' ' || c == '.' { '_' } else { c })
        .collect()
}
