//! Outline reconstruction from a flat paragraph sequence.

use super::classify::{classify_paragraph, MarkerClass};
use super::collapse::{collapse, ends_with_number_marker, leading_marker};
use super::OutlineError;
use crate::types::{ContentBlock, ParagraphNode, SubRequirementNode};

/// Index of a node in the per-section arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

#[derive(Debug)]
struct ArenaNode {
    code: String,
    text: String,
    children: Vec<NodeId>,
}

/// Block that is still receiving paragraphs.
#[derive(Debug)]
struct OpenBlock {
    standard_code: String,
    requirement: String,
    children: Vec<NodeId>,
}

/// Where a number paragraph is attached.
enum NumberTarget {
    Block,
    Node(NodeId),
}

/// Rebuilds the citation outline of one section.
///
/// Paragraphs are pushed in document order. The builder remembers the
/// last node seen at each of the four marker levels and attaches every
/// new node beneath the most recent node of the level above it. A block
/// is finalized when the next lower-case letter marker arrives or when
/// [`finish`](Self::finish) is called, and is never touched again.
///
/// A paragraph that fails to attach leaves the builder unchanged.
#[derive(Debug)]
pub struct OutlineBuilder {
    section_id: String,
    arena: Vec<ArenaNode>,
    finalized: Vec<ContentBlock>,
    current: Option<OpenBlock>,
    last_lower: Option<NodeId>,
    last_number: Option<NodeId>,
    last_roman: Option<NodeId>,
    last_upper: Option<NodeId>,
    carry_number_to_block: bool,
    next_index: usize,
}

impl OutlineBuilder {
    /// Create a builder for the section with the given id (e.g. `482.1`).
    #[must_use]
    pub fn new(section_id: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            arena: Vec::new(),
            finalized: Vec::new(),
            current: None,
            last_lower: None,
            last_number: None,
            last_roman: None,
            last_upper: None,
            carry_number_to_block: false,
            next_index: 0,
        }
    }

    /// Feed the next paragraph of the section.
    ///
    /// # Errors
    /// * [`OutlineError::EmptyText`] if the paragraph has no text after trimming
    /// * [`OutlineError::MalformedMarker`] if a roman numeral or upper-case
    ///   letter appears with no node at the level above it in this block
    pub fn push(&mut self, paragraph: &ParagraphNode) -> Result<(), OutlineError> {
        let index = self.next_index;
        self.next_index += 1;

        let text = paragraph.text.trim();
        if text.is_empty() {
            return Err(OutlineError::EmptyText {
                section_id: self.section_id.clone(),
                paragraph_index: index,
            });
        }

        let class = classify_paragraph(paragraph);
        tracing::trace!(section = %self.section_id, index, level = %class, "attaching paragraph");

        match class {
            MarkerClass::LowerLetterOpen => {
                self.open_block(text, paragraph.label.as_deref());
            }
            MarkerClass::Number => {
                let id = self.attach_number(text);
                self.last_number = Some(id);
            }
            MarkerClass::Roman => {
                let parent = self.require(self.last_number, MarkerClass::Roman, index)?;
                let id = self.attach_under(parent, text);
                self.last_roman = Some(id);
            }
            MarkerClass::UpperLetter => {
                let parent = self.require(self.last_roman, MarkerClass::UpperLetter, index)?;
                let id = self.attach_under(parent, text);
                self.last_upper = Some(id);
            }
            MarkerClass::Unclassified => {
                self.attach_to_block(text);
            }
        }

        Ok(())
    }

    /// Blocks finalized so far.
    #[must_use]
    pub fn finalized(&self) -> &[ContentBlock] {
        &self.finalized
    }

    /// Code of the most recent node at the given level, if any.
    #[must_use]
    pub fn last_code(&self, level: MarkerClass) -> Option<&str> {
        let id = match level {
            MarkerClass::LowerLetterOpen => self.last_lower,
            MarkerClass::Number => self.last_number,
            MarkerClass::Roman => self.last_roman,
            MarkerClass::UpperLetter => self.last_upper,
            MarkerClass::Unclassified => None,
        }?;
        Some(self.arena[id.0].code.as_str())
    }

    /// Finalize the open block and return all blocks of the section.
    #[must_use]
    pub fn finish(mut self) -> Vec<ContentBlock> {
        self.finalize_block();
        self.finalized
    }

    fn require(
        &self,
        pointer: Option<NodeId>,
        level: MarkerClass,
        index: usize,
    ) -> Result<NodeId, OutlineError> {
        pointer.ok_or_else(|| OutlineError::MalformedMarker {
            section_id: self.section_id.clone(),
            paragraph_index: index,
            level,
        })
    }

    fn open_block(&mut self, text: &str, label: Option<&str>) {
        self.finalize_block();

        let standard_code = match leading_marker(text) {
            Some(marker) => format!("{}{marker}", self.section_id),
            None => self.section_id.clone(),
        };
        let requirement = label
            .map(|l| l.trim().trim_matches('.').to_string())
            .unwrap_or_default();

        let collapsed = collapse(text, &standard_code);
        let carry = ends_with_number_marker(&collapsed.code);
        let id = self.alloc(collapsed.code, collapsed.text);

        self.current = Some(OpenBlock {
            standard_code,
            requirement,
            children: vec![id],
        });
        self.last_lower = Some(id);
        self.last_number = carry.then_some(id);
        self.last_roman = None;
        self.last_upper = None;
        self.carry_number_to_block = carry;
    }

    fn attach_number(&mut self, text: &str) -> NodeId {
        let target = match self.last_lower {
            Some(lower) if !self.carry_number_to_block && self.current.is_some() => {
                NumberTarget::Node(lower)
            }
            _ => NumberTarget::Block,
        };

        match target {
            NumberTarget::Node(parent) => self.attach_under(parent, text),
            NumberTarget::Block => self.attach_to_block(text),
        }
    }

    fn attach_under(&mut self, parent: NodeId, text: &str) -> NodeId {
        let collapsed = collapse(text, &self.arena[parent.0].code);
        let id = self.alloc(collapsed.code, collapsed.text);
        self.arena[parent.0].children.push(id);
        id
    }

    fn attach_to_block(&mut self, text: &str) -> NodeId {
        let section_id = &self.section_id;
        let block = self.current.get_or_insert_with(|| OpenBlock {
            standard_code: section_id.clone(),
            requirement: String::new(),
            children: Vec::new(),
        });
        let collapsed = collapse(text, &block.standard_code);

        let id = NodeId(self.arena.len());
        block.children.push(id);
        self.arena.push(ArenaNode {
            code: collapsed.code,
            text: collapsed.text,
            children: Vec::new(),
        });
        id
    }

    fn alloc(&mut self, code: String, text: String) -> NodeId {
        let id = NodeId(self.arena.len());
        self.arena.push(ArenaNode {
            code,
            text,
            children: Vec::new(),
        });
        id
    }

    fn finalize_block(&mut self) {
        let Some(block) = self.current.take() else {
            return;
        };

        let sub_requirements = block
            .children
            .iter()
            .map(|&id| self.materialize(id))
            .collect();

        tracing::debug!(
            section = %self.section_id,
            standard_code = %block.standard_code,
            "finalized content block"
        );

        self.finalized.push(ContentBlock {
            standard_code: block.standard_code,
            requirement: block.requirement,
            sub_requirements,
        });
    }

    fn materialize(&self, id: NodeId) -> SubRequirementNode {
        let node = &self.arena[id.0];
        SubRequirementNode {
            code: node.code.clone(),
            text: node.text.clone(),
            children: node.children.iter().map(|&c| self.materialize(c)).collect(),
        }
    }
}

/// Rebuild the outline of a whole section.
///
/// On error the partial outline is discarded.
///
/// # Examples
/// ```
/// use ecfr_harvester::outline::build_outline;
/// use ecfr_harvester::types::ParagraphNode;
///
/// let paragraphs = [
///     ParagraphNode::plain("(a) General."),
///     ParagraphNode::plain("(1) First."),
/// ];
/// let blocks = build_outline("482.1", &paragraphs).unwrap();
/// assert_eq!(blocks[0].standard_code, "482.1(a)");
/// assert_eq!(blocks[0].sub_requirements[0].children[0].code, "482.1(a)(1)");
/// ```
pub fn build_outline(
    section_id: &str,
    paragraphs: &[ParagraphNode],
) -> Result<Vec<ContentBlock>, OutlineError> {
    let mut builder = OutlineBuilder::new(section_id);
    for paragraph in paragraphs {
        builder.push(paragraph)?;
    }
    Ok(builder.finish())
}
