//! eCFR Harvester - Download CFR regulation sections and rebuild their outline.
//!
//! This crate downloads subparts of a Code of Federal Regulations part from
//! the eCFR versioner API, reconstructs the citation hierarchy of every
//! section (`482.12(a)(1)(i)(A)`) from its flat paragraph sequence, and
//! stores one JSON document per section.
//!
//! # Example
//!
//! ```
//! use ecfr_harvester::build_outline;
//! use ecfr_harvester::types::ParagraphNode;
//!
//! let paragraphs = vec![
//!     ParagraphNode::plain("(a) Governing body."),
//!     ParagraphNode::plain("(1) Members."),
//!     ParagraphNode::plain("(i) Appointment."),
//! ];
//! let blocks = build_outline("482.12", &paragraphs).unwrap();
//!
//! assert_eq!(blocks[0].standard_code, "482.12(a)");
//! let lower = &blocks[0].sub_requirements[0];
//! assert_eq!(lower.children[0].children[0].code, "482.12(a)(1)(i)");
//! ```
//!
//! # Architecture
//!
//! The harvester is organized into several modules:
//!
//! - [`outline`]: Marker classification, collapsing and the outline builder
//! - [`config`]: Configuration constants and validation
//! - [`types`]: Core data types (ParagraphNode, ContentBlock, SectionDocument, etc.)
//! - [`error`]: Error types and Result alias
//! - [`http`]: HTTP client with retry for the eCFR API
//! - [`catalog`]: Title catalog and version date lookup
//! - [`content`]: Subpart XML downloading
//! - [`xml`]: Flattening of subpart XML into sections
//! - [`document`]: Section document assembly
//! - [`summarize`]: Optional one-sentence section descriptions
//! - [`storage`]: Document sinks and storage keys
//! - [`cli`]: Command-line interface
//! - [`harvester`]: Main harvester service

pub mod catalog;
pub mod cli;
pub mod config;
pub mod content;
pub mod document;
pub mod error;
pub mod harvester;
pub mod http;
pub mod outline;
pub mod storage;
pub mod summarize;
pub mod types;
pub mod xml;

// Re-export main functions
pub use harvester::{harvest, HarvestReport};
pub use outline::build_outline;

// Re-export commonly used items
pub use config::HarvestConfig;
pub use error::{HarvesterError, Result};
pub use types::{ContentBlock, ParagraphNode, SectionDocument, SubRequirementNode};
