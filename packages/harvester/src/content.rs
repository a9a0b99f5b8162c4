//! Subpart content downloading.
//!
//! The versioner API serves the consolidated text of a title as XML; the
//! `part` and `subpart` query parameters narrow it down to one subpart.

use reqwest::blocking::Client;

use crate::config::full_xml_url;
use crate::error::{HarvesterError, Result};
use crate::http::{bytes_to_string, download_bytes};

/// Download the XML of one subpart at a version date.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `api_base_url` - eCFR API base URL
/// * `date` - Version date in YYYY-MM-DD format
/// * `title` - CFR title number (e.g., 42)
/// * `part` - CFR part (e.g., "482")
/// * `subpart` - Subpart label (e.g., "A")
///
/// # Returns
/// Raw XML content as a string
pub fn download_subpart_xml(
    client: &Client,
    api_base_url: &str,
    date: &str,
    title: u32,
    part: &str,
    subpart: &str,
) -> Result<String> {
    let url = full_xml_url(api_base_url, date, title, part, subpart);
    let bytes = download_bytes(client, &url, "application/xml").map_err(|e| {
        if let HarvesterError::Http(source) = e {
            HarvesterError::ContentDownload {
                title,
                part: part.to_string(),
                subpart: subpart.to_string(),
                date: date.to_string(),
                source,
            }
        } else {
            e
        }
    })?;

    Ok(bytes_to_string(
        &bytes,
        &format!("title {title} part {part} subpart {subpart}"),
    ))
}
