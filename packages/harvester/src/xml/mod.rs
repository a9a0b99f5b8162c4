//! XML handling for eCFR versioner documents.
//!
//! - [`utils`]: small DOM navigation helpers
//! - [`sections`]: flattening of a subpart into sections and paragraphs

mod sections;
mod utils;

pub use sections::{parse_subpart, parse_subpart_document, section_title, subpart_name};
pub use utils::{
    element_children, find_child, find_children, get_attribute, get_full_text, get_tag_name,
    has_tag,
};
