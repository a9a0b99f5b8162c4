//! Citation outline reconstruction.
//!
//! CFR sections arrive as a flat list of paragraphs. Their nesting is only
//! visible through the leading markers: `(a)` opens a block, `(1)` nests
//! under the last letter, `(i)` under the last number and `(A)` under the
//! last roman numeral. This module rebuilds that tree.
//!
//! - [`classify`]: stateless marker classification
//! - [`collapse`]: composes fused markers such as `(1)(i)` into one code
//! - [`OutlineBuilder`]: the level-tracking state machine
//!
//! Everything here is pure: no I/O, no shared state between sections.

mod builder;
mod classify;
mod collapse;

use thiserror::Error;

pub use builder::{build_outline, OutlineBuilder};
pub use classify::{classify, classify_paragraph, MarkerClass};
pub use collapse::{collapse, leading_marker, Collapsed};

/// Errors raised while rebuilding a section outline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutlineError {
    /// A marker appeared with no node at the level it nests under.
    #[error("{level} marker has no parent in section {section_id} at paragraph {paragraph_index}")]
    MalformedMarker {
        section_id: String,
        paragraph_index: usize,
        level: MarkerClass,
    },

    /// A paragraph was empty after trimming.
    #[error("Empty paragraph text in section {section_id} at paragraph {paragraph_index}")]
    EmptyText {
        section_id: String,
        paragraph_index: usize,
    },
}

impl OutlineError {
    /// Section the error was raised for.
    #[must_use]
    pub fn section_id(&self) -> &str {
        match self {
            Self::MalformedMarker { section_id, .. } | Self::EmptyText { section_id, .. } => {
                section_id
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_marker_display() {
        let err = OutlineError::MalformedMarker {
            section_id: "482.1".to_string(),
            paragraph_index: 4,
            level: MarkerClass::Roman,
        };
        assert_eq!(
            err.to_string(),
            "roman numeral marker has no parent in section 482.1 at paragraph 4"
        );
        assert_eq!(err.section_id(), "482.1");
    }
}
