//! Configuration constants and validation functions for the harvester.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{HarvesterError, Result};

/// Base URL of the eCFR API.
pub const ECFR_API_URL: &str = "https://www.ecfr.gov";

/// HTTP timeout in seconds.
///
/// Full-part XML downloads can be several megabytes.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Default storage key prefix for section documents.
pub const DEFAULT_KEY_PREFIX: &str = "niaho-mapper-output/cms-cop";

/// Default `regulation_source` written into every document.
pub const DEFAULT_REGULATION_SOURCE: &str = "cms_cop";

/// Default facility type for the metadata record.
pub const DEFAULT_FACILITY_TYPE: &str = "Hospital";

/// Default CFR title (Public Health).
pub const DEFAULT_TITLE: u32 = 42;

/// Default CFR part (Conditions of Participation for Hospitals).
pub const DEFAULT_PART: &str = "482";

/// Default subparts of the default part.
pub const DEFAULT_SUBPARTS: [&str; 5] = ["A", "B", "C", "D", "E"];

/// Highest CFR title number.
const MAX_TITLE: u32 = 50;

/// Part pattern: digits only.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PART_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,5}$").expect("valid regex"));

/// Subpart pattern: one to three upper-case letters.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SUBPART_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{1,3}$").expect("valid regex"));

/// Date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Validate a CFR title number.
///
/// # Examples
/// ```
/// use ecfr_harvester::config::validate_title;
///
/// assert!(validate_title(42).is_ok());
/// assert!(validate_title(0).is_err());
/// ```
pub fn validate_title(title: u32) -> Result<()> {
    if (1..=MAX_TITLE).contains(&title) {
        Ok(())
    } else {
        Err(HarvesterError::InvalidTitle(title.to_string()))
    }
}

/// Validate a CFR part number.
///
/// # Examples
/// ```
/// use ecfr_harvester::config::validate_part;
///
/// assert!(validate_part("482").is_ok());
/// assert!(validate_part("48a").is_err());
/// ```
pub fn validate_part(part: &str) -> Result<()> {
    if PART_PATTERN.is_match(part) {
        Ok(())
    } else {
        Err(HarvesterError::InvalidPart(part.to_string()))
    }
}

/// Validate a subpart label.
///
/// # Examples
/// ```
/// use ecfr_harvester::config::validate_subpart;
///
/// assert!(validate_subpart("A").is_ok());
/// assert!(validate_subpart("a").is_err());
/// ```
pub fn validate_subpart(subpart: &str) -> Result<()> {
    if SUBPART_PATTERN.is_match(subpart) {
        Ok(())
    } else {
        Err(HarvesterError::InvalidSubpart(subpart.to_string()))
    }
}

/// Validate date format (YYYY-MM-DD).
///
/// Rejects dates in the future since eCFR has no versions for them.
///
/// # Examples
/// ```
/// use ecfr_harvester::config::validate_date;
///
/// assert!(validate_date("2025-01-01").is_ok());
/// assert!(validate_date("invalid").is_err());
/// assert!(validate_date("2025-13-01").is_err()); // Invalid month
/// ```
pub fn validate_date(date_str: &str) -> Result<()> {
    if !DATE_PATTERN.is_match(date_str) {
        return Err(HarvesterError::InvalidDate(date_str.to_string()));
    }

    let parsed_date = chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| HarvesterError::InvalidDate(date_str.to_string()))?;

    let today = chrono::Local::now().date_naive();
    if parsed_date > today {
        return Err(HarvesterError::InvalidDate(format!(
            "{date_str} is in the future (today is {today})"
        )));
    }

    Ok(())
}

/// Build the title catalog URL.
pub fn titles_url(api_base_url: &str) -> String {
    format!("{}/api/versioner/v1/titles.json", api_base_url.trim_end_matches('/'))
}

/// Build the full XML URL for one subpart of a part at a version date.
///
/// # Panics
/// Debug builds panic if inputs don't match expected formats.
pub fn full_xml_url(api_base_url: &str, date: &str, title: u32, part: &str, subpart: &str) -> String {
    debug_assert!(
        DATE_PATTERN.is_match(date),
        "date should be validated before calling full_xml_url"
    );
    debug_assert!(
        SUBPART_PATTERN.is_match(subpart),
        "subpart should be validated before calling full_xml_url"
    );
    format!(
        "{}/api/versioner/v1/full/{date}/title-{title}.xml?part={part}&subpart={subpart}",
        api_base_url.trim_end_matches('/')
    )
}

/// Build the public eCFR URL for a section.
///
/// # Examples
/// ```
/// use ecfr_harvester::config::section_url;
///
/// assert_eq!(
///     section_url(42, "482.1"),
///     "https://www.ecfr.gov/current/title-42/section-482.1"
/// );
/// ```
pub fn section_url(title: u32, section_id: &str) -> String {
    format!("{ECFR_API_URL}/current/title-{title}/section-{section_id}")
}

/// Settings for one harvest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    pub api_base_url: String,
    pub title: u32,
    pub part: String,
    pub subparts: Vec<String>,
    pub facility_type: String,
    pub regulation_source: String,
    pub key_prefix: String,
    pub federal_register_citation: String,
}

impl HarvestConfig {
    /// Create a configuration for a title and part with default settings.
    #[must_use]
    pub fn new(title: u32, part: impl Into<String>) -> Self {
        Self {
            api_base_url: ECFR_API_URL.to_string(),
            title,
            part: part.into(),
            subparts: Vec::new(),
            facility_type: DEFAULT_FACILITY_TYPE.to_string(),
            regulation_source: DEFAULT_REGULATION_SOURCE.to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            federal_register_citation: "Not specified".to_string(),
        }
    }

    /// Set the subparts to harvest.
    #[must_use]
    pub fn with_subparts(mut self, subparts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.subparts = subparts.into_iter().map(Into::into).collect();
        self
    }

    /// Override the eCFR API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the facility type written to document metadata.
    #[must_use]
    pub fn with_facility_type(mut self, facility_type: impl Into<String>) -> Self {
        self.facility_type = facility_type.into();
        self
    }

    /// Set the storage key prefix.
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Validate title, part and every subpart label.
    pub fn validate(&self) -> Result<()> {
        validate_title(self.title)?;
        validate_part(&self.part)?;
        for subpart in &self.subparts {
            validate_subpart(subpart)?;
        }
        Ok(())
    }

    /// Label used for the `part_label` metadata field, e.g. `Part 482`.
    #[must_use]
    pub fn part_label(&self) -> String {
        format!("Part {}", self.part)
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE, DEFAULT_PART).with_subparts(DEFAULT_SUBPARTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title(1).is_ok());
        assert!(validate_title(42).is_ok());
        assert!(validate_title(50).is_ok());
        assert!(validate_title(0).is_err());
        assert!(validate_title(51).is_err());
    }

    #[test]
    fn test_validate_part() {
        assert!(validate_part("482").is_ok());
        assert!(validate_part("1").is_ok());
        assert!(validate_part("").is_err());
        assert!(validate_part("482.1").is_err());
        assert!(validate_part("part").is_err());
    }

    #[test]
    fn test_validate_subpart() {
        assert!(validate_subpart("A").is_ok());
        assert!(validate_subpart("AB").is_ok());
        assert!(validate_subpart("").is_err());
        assert!(validate_subpart("a").is_err());
        assert!(validate_subpart("A1").is_err());
    }

    #[test]
    fn test_validate_date_valid() {
        assert!(validate_date("2025-01-01").is_ok());
        assert!(validate_date("2024-12-31").is_ok());
    }

    #[test]
    fn test_validate_date_invalid() {
        assert!(validate_date("").is_err());
        assert!(validate_date("2025/01/01").is_err());
        assert!(validate_date("2025-02-30").is_err());
        assert!(validate_date("2999-01-01").is_err());
    }

    #[test]
    fn test_titles_url() {
        assert_eq!(
            titles_url("https://www.ecfr.gov"),
            "https://www.ecfr.gov/api/versioner/v1/titles.json"
        );
        assert_eq!(
            titles_url("http://localhost:8080/"),
            "http://localhost:8080/api/versioner/v1/titles.json"
        );
    }

    #[test]
    fn test_full_xml_url() {
        assert_eq!(
            full_xml_url(ECFR_API_URL, "2025-09-29", 42, "482", "A"),
            "https://www.ecfr.gov/api/versioner/v1/full/2025-09-29/title-42.xml?part=482&subpart=A"
        );
    }

    #[test]
    fn test_default_config() {
        let config = HarvestConfig::default();
        assert_eq!(config.title, 42);
        assert_eq!(config.part, "482");
        assert_eq!(config.subparts, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(config.part_label(), "Part 482");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_rejects_bad_subpart() {
        let config = HarvestConfig::new(42, "482").with_subparts(["A", "b"]);
        assert!(matches!(
            config.validate(),
            Err(HarvesterError::InvalidSubpart(s)) if s == "b"
        ));
    }
}
