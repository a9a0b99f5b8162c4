//! Marker classification for a single paragraph.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::ParagraphNode;

/// Lower-case letter marker that opens a new block.
///
/// `i`, `v` and `x` are left out so that `(i)`, `(v)` and `(x)` fall
/// through to the roman numeral level.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LOWER_LETTER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\([a-hj-uwyz]").expect("valid regex"));

/// Arabic numeral marker.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\([1-9]").expect("valid regex"));

/// Lower-case roman numeral marker.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ROMAN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\([ivxlcdm]").expect("valid regex"));

/// Upper-case letter marker.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static UPPER_LETTER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\([A-Z]").expect("valid regex"));

/// Citation level of a paragraph, derived from its leading marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerClass {
    /// `(a)`: opens a new content block.
    LowerLetterOpen,
    /// `(1)`
    Number,
    /// `(i)`
    Roman,
    /// `(A)`
    UpperLetter,
    /// No recognised marker; attaches to the current block.
    Unclassified,
}

impl MarkerClass {
    /// Human-readable level name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowerLetterOpen => "lower-case letter",
            Self::Number => "number",
            Self::Roman => "roman numeral",
            Self::UpperLetter => "upper-case letter",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for MarkerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify trimmed paragraph text by its leading marker.
///
/// Patterns are checked in priority order: lower-case letter, number,
/// roman numeral, upper-case letter.
///
/// # Examples
/// ```
/// use ecfr_harvester::outline::{classify, MarkerClass};
///
/// assert_eq!(classify("(a) General."), MarkerClass::LowerLetterOpen);
/// assert_eq!(classify("(i) Sub."), MarkerClass::Roman);
/// assert_eq!(classify("As used in this part"), MarkerClass::Unclassified);
/// ```
#[must_use]
pub fn classify(text: &str) -> MarkerClass {
    if LOWER_LETTER_PATTERN.is_match(text) {
        MarkerClass::LowerLetterOpen
    } else if NUMBER_PATTERN.is_match(text) {
        MarkerClass::Number
    } else if ROMAN_PATTERN.is_match(text) {
        MarkerClass::Roman
    } else if UPPER_LETTER_PATTERN.is_match(text) {
        MarkerClass::UpperLetter
    } else {
        MarkerClass::Unclassified
    }
}

/// Classify a paragraph node.
///
/// Structured nodes always open a block, whatever their text says.
#[must_use]
pub fn classify_paragraph(paragraph: &ParagraphNode) -> MarkerClass {
    if paragraph.structured {
        MarkerClass::LowerLetterOpen
    } else {
        classify(paragraph.text.trim())
    }
}
