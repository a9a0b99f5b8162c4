//! One-sentence section descriptions from a hosted text-generation API.
//!
//! The summary is an optional enrichment: the outline never depends on it,
//! and a failed summary fails only its own section.

mod client;
mod config;

pub use client::{LlmSummarizer, Summarizer};
pub use config::{SummarizerConfig, SummarizerConfigBuilder};

#[cfg(any(test, feature = "test-utils"))]
pub use client::test_support;

use crate::error::Result;
use crate::types::RawSection;

/// Build the summary prompt for a section.
///
/// The section is sent as JSON so the model sees headings and paragraph
/// markers as they appear in the source.
pub fn summary_prompt(section: &RawSection) -> Result<String> {
    let json = serde_json::to_string(section)?;
    Ok(format!("Summarize this JSON data in one sentence: {json}"))
}
