//! eCFR title catalog.
//!
//! The versioner API lists every CFR title together with the date up to
//! which its consolidated text is current. That date selects the version
//! of the full XML to download.

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::titles_url;
use crate::error::{HarvesterError, Result};
use crate::http::download_bytes;

/// One entry of the title catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TitleSummary {
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub latest_amended_on: Option<String>,
    #[serde(default)]
    pub latest_issue_date: Option<String>,
    #[serde(default)]
    pub up_to_date_as_of: Option<String>,
    #[serde(default)]
    pub reserved: bool,
}

#[derive(Debug, Deserialize)]
struct TitlesResponse {
    titles: Vec<TitleSummary>,
}

/// Parse the `titles.json` response body.
pub fn parse_titles(json: &[u8]) -> Result<Vec<TitleSummary>> {
    let response: TitlesResponse = serde_json::from_slice(json)?;
    Ok(response.titles)
}

/// Download the title catalog.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `api_base_url` - eCFR API base URL
pub fn fetch_titles(client: &Client, api_base_url: &str) -> Result<Vec<TitleSummary>> {
    let url = titles_url(api_base_url);
    let bytes = download_bytes(client, &url, "application/json").map_err(|e| {
        if let HarvesterError::Http(source) = e {
            HarvesterError::CatalogDownload { source }
        } else {
            e
        }
    })?;
    parse_titles(&bytes)
}

/// Find a title in the catalog and return its current version date.
pub fn version_date(titles: &[TitleSummary], title: u32) -> Result<String> {
    let summary = titles
        .iter()
        .find(|t| t.number == title)
        .ok_or(HarvesterError::TitleNotFound(title))?;

    summary
        .up_to_date_as_of
        .clone()
        .ok_or(HarvesterError::MissingVersionDate(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TITLES_JSON: &str = r#"{
        "titles": [
            {
                "number": 41,
                "name": "Public Contracts and Property Management",
                "latest_amended_on": "2025-06-30",
                "latest_issue_date": "2025-06-30",
                "up_to_date_as_of": "2025-10-15",
                "reserved": false
            },
            {
                "number": 42,
                "name": "Public Health",
                "latest_amended_on": "2025-09-29",
                "latest_issue_date": "2025-09-29",
                "up_to_date_as_of": "2025-10-15",
                "reserved": false
            },
            {
                "number": 35,
                "name": "Reserved",
                "latest_amended_on": null,
                "latest_issue_date": null,
                "up_to_date_as_of": null,
                "reserved": true
            }
        ],
        "meta": { "date": "2025-10-16" }
    }"#;

    #[test]
    fn test_parse_titles() {
        let titles = parse_titles(TITLES_JSON.as_bytes()).unwrap();
        assert_eq!(titles.len(), 3);
        assert_eq!(titles[1].number, 42);
        assert_eq!(titles[1].name, "Public Health");
        assert!(titles[2].reserved);
    }

    #[test]
    fn test_version_date() {
        let titles = parse_titles(TITLES_JSON.as_bytes()).unwrap();
        assert_eq!(version_date(&titles, 42).unwrap(), "2025-10-15");
    }

    #[test]
    fn test_version_date_missing_title() {
        let titles = parse_titles(TITLES_JSON.as_bytes()).unwrap();
        assert!(matches!(
            version_date(&titles, 7),
            Err(HarvesterError::TitleNotFound(7))
        ));
    }

    #[test]
    fn test_version_date_reserved_title() {
        let titles = parse_titles(TITLES_JSON.as_bytes()).unwrap();
        assert!(matches!(
            version_date(&titles, 35),
            Err(HarvesterError::MissingVersionDate(35))
        ));
    }

    #[test]
    fn test_parse_titles_invalid_json() {
        assert!(matches!(
            parse_titles(b"not json"),
            Err(HarvesterError::Json(_))
        ));
    }
}
