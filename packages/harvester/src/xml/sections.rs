//! Flattening of a subpart document into sections and paragraphs.
//!
//! Layout of a versioner subpart:
//!
//! ```text
//! DIV6 (subpart)
//! ├── HEAD            "Subpart A—General Provisions"
//! ├── DIV8 (section)  N="482.1"
//! │   ├── HEAD        "§ 482.1 Basis and scope."
//! │   └── P*
//! └── DIV7 (subject group)
//!     └── DIV8 ...
//! ```

use roxmltree::{Document, Node};

use super::utils::{
    element_children, find_child, find_children, get_attribute, get_full_text, has_tag,
};
use crate::error::{HarvesterError, Result};
use crate::types::{ParagraphNode, RawSection, Subpart};

/// Parse subpart XML into its sections.
///
/// # Arguments
/// * `xml` - Versioner XML for one subpart
/// * `label` - Requested subpart label, used when the document carries none
pub fn parse_subpart(xml: &str, label: &str) -> Result<Subpart> {
    let doc = Document::parse(xml)?;
    parse_subpart_document(&doc, label)
}

/// Parse an already-parsed subpart document.
pub fn parse_subpart_document(doc: &Document<'_>, label: &str) -> Result<Subpart> {
    let root = doc.root_element();
    let div6 = if has_tag(root, "DIV6") {
        root
    } else {
        root.descendants()
            .find(|n| has_tag(*n, "DIV6"))
            .ok_or_else(|| HarvesterError::MissingElement {
                element: "DIV6".to_string(),
                context: format!("subpart {label}"),
            })?
    };

    let heading = find_child(div6, "HEAD")
        .map(get_full_text)
        .unwrap_or_default();

    let sections = div6
        .descendants()
        .filter(|n| has_tag(*n, "DIV8"))
        .filter_map(parse_section)
        .collect::<Vec<_>>();

    tracing::debug!(subpart = label, sections = sections.len(), "parsed subpart");

    Ok(Subpart {
        label: get_attribute(div6, "N").unwrap_or(label).to_string(),
        name: subpart_name(&heading),
        sections,
    })
}

/// Parse one `DIV8` section element.
///
/// Sections without an `N` attribute cannot be addressed and are skipped.
fn parse_section(div8: Node<'_, '_>) -> Option<RawSection> {
    let Some(id) = get_attribute(div8, "N") else {
        tracing::warn!("Skipping section without N attribute");
        return None;
    };

    let heading = find_child(div8, "HEAD")
        .map(get_full_text)
        .unwrap_or_default();

    let paragraphs = find_children(div8, "P")
        .filter_map(|p| {
            let paragraph = parse_paragraph(p);
            if paragraph.is_none() {
                tracing::debug!(section = id, "Skipping empty paragraph");
            }
            paragraph
        })
        .collect();

    Some(RawSection {
        id: id.to_string(),
        heading: normalize_whitespace(&heading),
        hierarchy_metadata: get_attribute(div8, "hierarchy_metadata").map(str::to_string),
        paragraphs,
    })
}

/// Convert a `P` element into a paragraph node.
///
/// A `P` with child elements becomes a structured node: its text is the
/// paragraph's own text without the children's text, and its label is the
/// text of the first `I` child. Returns `None` for paragraphs without own
/// text, including ones that hold nothing but an emphasis label.
fn parse_paragraph(p: Node<'_, '_>) -> Option<ParagraphNode> {
    if element_children(p).next().is_none() {
        let text = normalize_whitespace(&get_full_text(p));
        return (!text.is_empty()).then(|| ParagraphNode::plain(text));
    }

    let own_text: String = p
        .children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let label = find_child(p, "I")
        .map(get_full_text)
        .map(|l| normalize_whitespace(&l))
        .filter(|l| !l.is_empty());

    let text = normalize_whitespace(&own_text);
    if text.is_empty() {
        tracing::debug!(label = ?label, "skipping paragraph without own text");
        return None;
    }
    Some(ParagraphNode::structured(text, label))
}

/// Section title: the heading with the `§ <id>` prefix removed.
///
/// # Examples
/// ```
/// use ecfr_harvester::xml::section_title;
///
/// assert_eq!(section_title("§ 482.1   Basis and scope.", "482.1"), "Basis and scope.");
/// assert_eq!(section_title("Basis and scope.", "482.1"), "Basis and scope.");
/// ```
pub fn section_title(heading: &str, section_id: &str) -> String {
    heading
        .split_once(section_id)
        .map_or(heading, |(_, rest)| rest)
        .trim()
        .to_string()
}

/// Subpart name: the heading after the em dash.
///
/// # Examples
/// ```
/// use ecfr_harvester::xml::subpart_name;
///
/// assert_eq!(subpart_name("Subpart A—General Provisions"), "General Provisions");
/// assert_eq!(subpart_name("General Provisions"), "General Provisions");
/// ```
pub fn subpart_name(heading: &str) -> String {
    heading
        .split_once('\u{2014}')
        .map_or(heading, |(_, name)| name)
        .trim()
        .to_string()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SUBPART_XML: &str = r#"<DIV6 N="A" TYPE="SUBPART">
        <HEAD>Subpart A—General Provisions</HEAD>
        <DIV8 N="482.1" TYPE="SECTION" hierarchy_metadata="{&quot;section&quot;:&quot;482.1&quot;,&quot;citation&quot;:&quot;42 CFR 482.1&quot;}">
            <HEAD>§ 482.1   Basis and scope.</HEAD>
            <P>(a) <I>Statutory basis.</I> (1) Section 1861(e) of the Act provides that—</P>
            <P>(i) Hospitals participating in Medicare must meet certain requirements.</P>
            <P/>
            <CITA>[51 FR 22042, June 17, 1986]</CITA>
        </DIV8>
        <DIV7 TYPE="SUBJGRP">
            <HEAD>Definitions</HEAD>
            <DIV8 N="482.2" TYPE="SECTION">
                <HEAD>§ 482.2   Provision of emergency services.</HEAD>
                <P>(a) Applicability.</P>
            </DIV8>
        </DIV7>
    </DIV6>"#;

    #[test]
    fn test_parse_subpart() {
        let subpart = parse_subpart(SUBPART_XML, "A").unwrap();

        assert_eq!(subpart.label, "A");
        assert_eq!(subpart.name, "General Provisions");
        assert_eq!(subpart.sections.len(), 2);
        assert_eq!(subpart.sections[0].id, "482.1");
        assert_eq!(subpart.sections[0].heading, "§ 482.1 Basis and scope.");
        assert_eq!(subpart.sections[1].id, "482.2");
    }

    #[test]
    fn test_parse_structured_paragraph() {
        let subpart = parse_subpart(SUBPART_XML, "A").unwrap();
        let paragraphs = &subpart.sections[0].paragraphs;

        assert_eq!(paragraphs.len(), 2, "empty P is skipped");
        assert_eq!(
            paragraphs[0],
            ParagraphNode::structured(
                "(a) (1) Section 1861(e) of the Act provides that—",
                Some("Statutory basis.".to_string())
            )
        );
        assert_eq!(
            paragraphs[1],
            ParagraphNode::plain(
                "(i) Hospitals participating in Medicare must meet certain requirements."
            )
        );
    }

    #[test]
    fn test_label_only_paragraph_is_skipped() {
        let xml = r#"<DIV6 N="A">
            <HEAD>Subpart A—General Provisions</HEAD>
            <DIV8 N="482.2" TYPE="SECTION">
                <HEAD>§ 482.2   Definitions.</HEAD>
                <P>As used in this part:</P>
                <P><I>Hospital.</I></P>
                <P>(a) Means an institution.</P>
            </DIV8>
        </DIV6>"#;
        let subpart = parse_subpart(xml, "A").unwrap();
        let section = &subpart.sections[0];

        assert_eq!(
            section.paragraphs,
            vec![
                ParagraphNode::plain("As used in this part:"),
                ParagraphNode::plain("(a) Means an institution."),
            ]
        );

        let blocks = crate::outline::build_outline(&section.id, &section.paragraphs).unwrap();
        let codes: Vec<_> = blocks.iter().map(|b| b.standard_code.as_str()).collect();
        assert_eq!(codes, vec!["482.2", "482.2(a)"]);
    }

    #[test]
    fn test_hierarchy_metadata_is_kept() {
        let subpart = parse_subpart(SUBPART_XML, "A").unwrap();
        assert_eq!(
            subpart.sections[0].hierarchy_metadata.as_deref(),
            Some(r#"{"section":"482.1","citation":"42 CFR 482.1"}"#)
        );
        assert!(subpart.sections[1].hierarchy_metadata.is_none());
    }

    #[test]
    fn test_subpart_nested_in_wrapper() {
        let xml = r#"<ECFR><DIV5 N="482"><DIV6 N="B"><HEAD>Subpart B—Administration</HEAD></DIV6></DIV5></ECFR>"#;
        let subpart = parse_subpart(xml, "B").unwrap();
        assert_eq!(subpart.label, "B");
        assert_eq!(subpart.name, "Administration");
        assert!(subpart.sections.is_empty());
    }

    #[test]
    fn test_missing_subpart_element() {
        let err = parse_subpart("<DIV5/>", "C").unwrap_err();
        assert!(matches!(err, HarvesterError::MissingElement { element, .. } if element == "DIV6"));
    }

    #[test]
    fn test_invalid_xml() {
        assert!(matches!(
            parse_subpart("<DIV6>", "A"),
            Err(HarvesterError::XmlParse(_))
        ));
    }

    #[test]
    fn test_section_without_number_is_skipped() {
        let xml = r#"<DIV6 N="A"><DIV8><HEAD>Orphan</HEAD></DIV8></DIV6>"#;
        let subpart = parse_subpart(xml, "A").unwrap();
        assert!(subpart.sections.is_empty());
    }
}
