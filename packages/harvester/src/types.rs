//! Core data types for the harvester.
//!
//! These types describe CFR sections on both sides of the outline core:
//! the flat paragraph sequence produced from the source XML, and the
//! nested document written to storage.

use serde::{Deserialize, Serialize};

/// One paragraph of a section, in document order.
///
/// Produced by the XML flattening step and never mutated by the outline core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphNode {
    /// Raw paragraph text (direct text only for structured nodes).
    pub text: String,

    /// Inline emphasis text, e.g. `Standard: Compliance with Federal laws.`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Whether the source element carried child markup.
    ///
    /// Structured paragraphs only occur at the top letter level of a section.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub structured: bool,
}

impl ParagraphNode {
    /// Create a plain-text paragraph.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: None,
            structured: false,
        }
    }

    /// Create a structured paragraph with an optional emphasis label.
    #[must_use]
    pub fn structured(text: impl Into<String>, label: Option<String>) -> Self {
        Self {
            text: text.into(),
            label,
            structured: true,
        }
    }
}

/// A node of the reconstructed citation outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubRequirementNode {
    /// Fully-qualified citation, e.g. `482.12(a)(1)(i)`.
    pub code: String,

    /// Paragraph prose with all leading markers stripped.
    pub text: String,

    /// Nested nodes in document order.
    #[serde(
        rename = "sub_requirements",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<SubRequirementNode>,
}

impl SubRequirementNode {
    /// Total number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}

/// Top-level grouping of a section, one per lower-letter marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Section id plus the block's own leading marker, e.g. `482.1(a)`.
    pub standard_code: String,

    /// Summary sentence taken from the opening paragraph's emphasis, or empty.
    pub requirement: String,

    /// Direct children of the block.
    pub sub_requirements: Vec<SubRequirementNode>,
}

/// Caller-supplied metadata attached to every section document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub facility_type: String,
    pub part_label: String,
    pub title_number: String,
    pub version: String,
    pub effective_date: String,
    pub federal_register_citation: String,
    pub extraction_date: String,
    pub source_url: String,
}

/// Finished outline of one regulation section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDocument {
    /// Identifier derived from the section citation, e.g. `42_CFR_482_1`.
    pub regulation_id: String,
    pub regulation_source: String,
    /// Section id, e.g. `482.1`.
    pub code: String,
    pub title: String,
    pub description: String,
    pub subpart: String,
    pub subpart_name: String,
    pub content: Vec<ContentBlock>,
    pub metadata: DocumentMetadata,
}

/// A section as flattened from the source XML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSection {
    /// Section id from `DIV8@N`, e.g. `482.1`.
    pub id: String,

    /// Full heading, e.g. `§ 482.1 Basis and scope.`
    pub heading: String,

    /// Raw `hierarchy_metadata` attribute (JSON), if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hierarchy_metadata: Option<String>,

    /// Paragraphs in document order.
    pub paragraphs: Vec<ParagraphNode>,
}

/// A subpart and its sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subpart {
    /// Subpart label, e.g. `A`.
    pub label: String,

    /// Subpart name, e.g. `General Provisions`.
    pub name: String,

    /// Sections in document order.
    pub sections: Vec<RawSection>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_paragraph_constructors() {
        let plain = ParagraphNode::plain("(1) First.");
        assert!(!plain.structured);
        assert!(plain.label.is_none());

        let structured = ParagraphNode::structured("(a)  Text", Some("Basis".to_string()));
        assert!(structured.structured);
        assert_eq!(structured.label.as_deref(), Some("Basis"));
    }

    #[test]
    fn test_sub_requirement_serializes_children_as_sub_requirements() {
        let node = SubRequirementNode {
            code: "482.1(a)".to_string(),
            text: "General.".to_string(),
            children: vec![SubRequirementNode {
                code: "482.1(a)(1)".to_string(),
                text: "First.".to_string(),
                children: Vec::new(),
            }],
        };

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["sub_requirements"][0]["code"], "482.1(a)(1)");
        assert!(json["sub_requirements"][0].get("sub_requirements").is_none());
        assert_eq!(node.node_count(), 2);
    }

    #[test]
    fn test_plain_paragraph_omits_structured_flag() {
        let json = serde_json::to_string(&ParagraphNode::plain("x")).unwrap();
        assert_eq!(json, r#"{"text":"x"}"#);
    }
}
