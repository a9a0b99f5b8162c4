//! Error types for the harvester.
//!
//! Uses the dual-error pattern: `HarvesterError` for library consumers
//! with detailed error context, and specific error types for internal use
//! (see [`crate::outline::OutlineError`] for the outline core).

use thiserror::Error;

use crate::outline::OutlineError;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// Invalid CFR title number.
    #[error("Invalid title number: '{0}'. Expected a number between 1 and 50")]
    InvalidTitle(String),

    /// Invalid CFR part number.
    #[error("Invalid part number: '{0}'. Expected digits (e.g., 482)")]
    InvalidPart(String),

    /// Invalid subpart label.
    #[error("Invalid subpart label: '{0}'. Expected upper-case letters (e.g., A)")]
    InvalidSubpart(String),

    /// Invalid date format.
    #[error("Invalid date format: '{0}'. Expected YYYY-MM-DD (e.g., 2025-01-01)")]
    InvalidDate(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// All retry attempts for a request failed.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// Failed to download the title catalog.
    #[error("Failed to download title catalog: {source}")]
    CatalogDownload {
        #[source]
        source: reqwest::Error,
    },

    /// Requested title is not in the catalog.
    #[error("Title {0} not found in the eCFR catalog")]
    TitleNotFound(u32),

    /// Title is present but has no version date to download.
    #[error("Title {0} has no up-to-date version date in the eCFR catalog")]
    MissingVersionDate(u32),

    /// Failed to download subpart content.
    #[error("Failed to download title {title} part {part} subpart {subpart} at date {date}: {source}")]
    ContentDownload {
        title: u32,
        part: String,
        subpart: String,
        date: String,
        #[source]
        source: reqwest::Error,
    },

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// Missing required XML element.
    #[error("Missing required XML element: {element} in {context}")]
    MissingElement { element: String, context: String },

    /// Outline reconstruction failed for a section.
    #[error(transparent)]
    Outline(#[from] OutlineError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM API returned an error status.
    #[error("LLM API error (status {status}): {message}")]
    LlmApiError { status: u16, message: String },

    /// LLM API rate limited the request.
    #[error("LLM rate limited, retry after {retry_after_secs}s")]
    LlmRateLimited { retry_after_secs: u64 },

    /// LLM response could not be parsed.
    #[error("Failed to parse LLM response: {0}")]
    LlmResponseParse(String),

    /// LLM returned no text.
    #[error("LLM returned empty response")]
    LlmEmptyResponse,

    /// Storage sink rejected a document.
    #[error("Failed to store {key}: {message}")]
    Storage { key: String, message: String },

    /// Harvest completed but some subparts or sections failed.
    #[error("Harvest incomplete: {failed} failure(s), {stored} section(s) stored")]
    Incomplete { failed: usize, stored: usize },
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HarvesterError::InvalidSubpart("a1".to_string());
        assert!(err.to_string().contains("a1"));
        assert!(err.to_string().contains("upper-case"));
    }

    #[test]
    fn test_outline_error_is_transparent() {
        let err: HarvesterError = OutlineError::EmptyText {
            section_id: "482.1".to_string(),
            paragraph_index: 3,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Empty paragraph text in section 482.1 at paragraph 3"
        );
    }

    #[test]
    fn test_storage_error_display() {
        let err = HarvesterError::Storage {
            key: "title-42/part-482/subpart-A/482-1.json".to_string(),
            message: "status 403".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to store title-42/part-482/subpart-A/482-1.json: status 403"
        );
    }
}
