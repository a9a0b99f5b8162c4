//! Main harvester service that ties all components together.

use rayon::prelude::*;
use reqwest::blocking::Client;

use crate::catalog::{fetch_titles, version_date};
use crate::config::HarvestConfig;
use crate::content::download_subpart_xml;
use crate::document::{build_document, section_metadata, DocumentContext};
use crate::error::Result;
use crate::storage::{storage_key, DocumentSink};
use crate::summarize::Summarizer;
use crate::types::{RawSection, SectionDocument, Subpart};
use crate::xml::parse_subpart;

/// Values shared by every section of one run.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    pub config: &'a HarvestConfig,
    /// Version date of the title, from the catalog.
    pub version_date: &'a str,
    /// RFC 3339 timestamp written to every document.
    pub extraction_date: &'a str,
}

/// Result of processing one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionOutcome {
    pub section_id: String,
    /// Storage location on success, error message on failure.
    pub result: std::result::Result<String, String>,
}

/// Result of processing one subpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubpartOutcome {
    pub label: String,
    pub name: String,
    /// Set when the subpart could not be downloaded or parsed.
    pub error: Option<String>,
    pub sections: Vec<SectionOutcome>,
}

/// Summary of a harvest run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub version_date: String,
    pub subparts: Vec<SubpartOutcome>,
}

impl HarvestReport {
    /// Number of sections stored successfully.
    pub fn stored_count(&self) -> usize {
        self.section_outcomes().filter(|s| s.result.is_ok()).count()
    }

    /// Number of sections that failed.
    pub fn failed_count(&self) -> usize {
        self.section_outcomes().filter(|s| s.result.is_err()).count()
    }

    /// Subparts that could not be downloaded or parsed.
    pub fn failed_subparts(&self) -> impl Iterator<Item = &SubpartOutcome> {
        self.subparts.iter().filter(|s| s.error.is_some())
    }

    /// Every failure as `(location, message)`.
    pub fn failures(&self) -> Vec<(String, String)> {
        let mut failures = Vec::new();
        for subpart in &self.subparts {
            if let Some(error) = &subpart.error {
                failures.push((format!("Subpart {}", subpart.label), error.clone()));
            }
            for section in &subpart.sections {
                if let Err(error) = &section.result {
                    failures.push((format!("§ {}", section.section_id), error.clone()));
                }
            }
        }
        failures
    }

    fn section_outcomes(&self) -> impl Iterator<Item = &SectionOutcome> {
        self.subparts.iter().flat_map(|s| s.sections.iter())
    }
}

/// Current time formatted for the `extraction_date` metadata field.
pub fn extraction_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Harvest every configured subpart and store one document per section.
///
/// Failing subparts and sections are recorded in the report; only catalog
/// failures and invalid configuration abort the run.
///
/// # Arguments
/// * `config` - Title, part, subparts and document settings
/// * `client` - HTTP client for the eCFR API
/// * `summarizer` - Source of section descriptions, `None` leaves them empty
/// * `sink` - Destination for the documents
pub fn harvest(
    config: &HarvestConfig,
    client: &Client,
    summarizer: Option<&dyn Summarizer>,
    sink: &dyn DocumentSink,
) -> Result<HarvestReport> {
    config.validate()?;

    let titles = fetch_titles(client, &config.api_base_url)?;
    let version = version_date(&titles, config.title)?;
    let extraction_date = extraction_timestamp();

    tracing::info!(
        title = config.title,
        part = %config.part,
        version = %version,
        subparts = config.subparts.len(),
        "starting harvest"
    );

    let context = RunContext {
        config,
        version_date: &version,
        extraction_date: &extraction_date,
    };

    let mut report = HarvestReport {
        version_date: version.clone(),
        subparts: Vec::with_capacity(config.subparts.len()),
    };

    for label in &config.subparts {
        let subpart = download_subpart_xml(
            client,
            &config.api_base_url,
            &version,
            config.title,
            &config.part,
            label,
        )
        .and_then(|xml| parse_subpart(&xml, label));

        let outcome = match subpart {
            Ok(subpart) => SubpartOutcome {
                label: label.clone(),
                name: subpart.name.clone(),
                error: None,
                sections: process_subpart(&context, &subpart, summarizer, sink),
            },
            Err(e) => {
                tracing::error!(subpart = %label, error = %e, "failed to retrieve subpart");
                SubpartOutcome {
                    label: label.clone(),
                    name: String::new(),
                    error: Some(e.to_string()),
                    sections: Vec::new(),
                }
            }
        };
        report.subparts.push(outcome);
    }

    tracing::info!(
        stored = report.stored_count(),
        failed = report.failed_count(),
        "harvest finished"
    );
    Ok(report)
}

/// Build and store the documents of one subpart.
///
/// Sections are processed in parallel; outcomes keep document order.
pub fn process_subpart(
    context: &RunContext<'_>,
    subpart: &Subpart,
    summarizer: Option<&dyn Summarizer>,
    sink: &dyn DocumentSink,
) -> Vec<SectionOutcome> {
    subpart
        .sections
        .par_iter()
        .map(|section| {
            let result = section_document(context, subpart, section, summarizer).and_then(|doc| {
                let key = storage_key(
                    &context.config.key_prefix,
                    context.config.title,
                    &context.config.part,
                    &subpart.label,
                    &section.id,
                );
                sink.store(&key, &doc)
            });

            if let Err(e) = &result {
                tracing::error!(section = %section.id, error = %e, "failed to process section");
            }

            SectionOutcome {
                section_id: section.id.clone(),
                result: result.map_err(|e| e.to_string()),
            }
        })
        .collect()
}

/// Build the document of one section, asking the summarizer for a description.
pub fn section_document(
    context: &RunContext<'_>,
    subpart: &Subpart,
    section: &RawSection,
    summarizer: Option<&dyn Summarizer>,
) -> Result<SectionDocument> {
    let description = match summarizer {
        Some(summarizer) => summarizer.summarize(section)?,
        None => String::new(),
    };

    let metadata = section_metadata(
        context.config,
        context.version_date,
        &section.id,
        context.extraction_date,
    );
    let document_context = DocumentContext {
        regulation_source: &context.config.regulation_source,
        subpart: &subpart.label,
        subpart_name: &subpart.name,
    };

    let document = build_document(section, &document_context, description, metadata)?;
    tracing::debug!(
        section = %section.id,
        blocks = document.content.len(),
        "built section document"
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FilesystemSink;
    use crate::summarize::test_support::MockSummarizer;
    use crate::types::ParagraphNode;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn raw_section(id: &str, paragraphs: Vec<ParagraphNode>) -> RawSection {
        RawSection {
            id: id.to_string(),
            heading: format!("§ {id} Heading."),
            hierarchy_metadata: None,
            paragraphs,
        }
    }

    fn subpart() -> Subpart {
        Subpart {
            label: "A".to_string(),
            name: "General Provisions".to_string(),
            sections: vec![
                raw_section(
                    "482.1",
                    vec![
                        ParagraphNode::structured("(a)", Some("Basis.".to_string())),
                        ParagraphNode::plain("(1) First."),
                    ],
                ),
                raw_section("482.2", vec![ParagraphNode::plain("(A) Orphan.")]),
                raw_section("482.3", vec![ParagraphNode::plain("(a) Scope.")]),
            ],
        }
    }

    fn context(config: &HarvestConfig) -> RunContext<'_> {
        RunContext {
            config,
            version_date: "2025-09-29",
            extraction_date: "2025-11-05T02:48:03Z",
        }
    }

    #[test]
    fn test_process_subpart_isolates_failures() {
        let dir = tempdir().unwrap();
        let sink = FilesystemSink::new(dir.path());
        let config = HarvestConfig::default().with_key_prefix("out");

        let outcomes = process_subpart(&context(&config), &subpart(), None, &sink);

        let ids: Vec<_> = outcomes.iter().map(|o| o.section_id.as_str()).collect();
        assert_eq!(ids, vec!["482.1", "482.2", "482.3"]);
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1]
            .result
            .as_ref()
            .unwrap_err()
            .contains("upper-case letter marker has no parent"));
        assert!(outcomes[2].result.is_ok());

        assert!(dir
            .path()
            .join("out/title-42/part-482/subpart-A/482-1.json")
            .exists());
        assert!(!dir
            .path()
            .join("out/title-42/part-482/subpart-A/482-2.json")
            .exists());
    }

    #[test]
    fn test_missing_summary_fails_only_its_section() {
        let dir = tempdir().unwrap();
        let sink = FilesystemSink::new(dir.path());
        let config = HarvestConfig::default();
        let summarizer = MockSummarizer::new().with_summary("482.3", "Defines the scope.");

        let mut subpart = subpart();
        subpart.sections.remove(1);
        let outcomes = process_subpart(&context(&config), &subpart, Some(&summarizer), &sink);

        assert!(outcomes[0].result.is_err());
        assert!(outcomes[1].result.is_ok());
    }

    #[test]
    fn test_section_document_uses_summary() {
        let config = HarvestConfig::default();
        let summarizer = MockSummarizer::new().with_summary("482.1", "Sets out the basis.");
        let subpart = subpart();

        let doc = section_document(
            &context(&config),
            &subpart,
            &subpart.sections[0],
            Some(&summarizer),
        )
        .unwrap();

        assert_eq!(doc.description, "Sets out the basis.");
        assert_eq!(doc.subpart_name, "General Provisions");
        assert_eq!(doc.metadata.extraction_date, "2025-11-05T02:48:03Z");
        assert_eq!(doc.content[0].standard_code, "482.1(a)");
        assert_eq!(doc.content[0].requirement, "Basis");
        let opening = &doc.content[0].sub_requirements[0];
        assert_eq!(opening.code, "482.1(a)");
        assert_eq!(opening.children[0].code, "482.1(a)(1)");
        assert_eq!(opening.children[0].text, "First.");
    }

    #[test]
    fn test_report_counts() {
        let report = HarvestReport {
            version_date: "2025-09-29".to_string(),
            subparts: vec![
                SubpartOutcome {
                    label: "A".to_string(),
                    name: "General Provisions".to_string(),
                    error: None,
                    sections: vec![
                        SectionOutcome {
                            section_id: "482.1".to_string(),
                            result: Ok("a.json".to_string()),
                        },
                        SectionOutcome {
                            section_id: "482.2".to_string(),
                            result: Err("boom".to_string()),
                        },
                    ],
                },
                SubpartOutcome {
                    label: "B".to_string(),
                    name: String::new(),
                    error: Some("404".to_string()),
                    sections: Vec::new(),
                },
            ],
        };

        assert_eq!(report.stored_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.failed_subparts().count(), 1);
        assert_eq!(
            report.failures(),
            vec![
                ("§ 482.2".to_string(), "boom".to_string()),
                ("Subpart B".to_string(), "404".to_string()),
            ]
        );
    }

    #[test]
    fn test_extraction_timestamp_format() {
        let ts = extraction_timestamp();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
