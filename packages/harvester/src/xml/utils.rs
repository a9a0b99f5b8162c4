//! XML utility functions for navigating and extracting data from DOM trees.

use roxmltree::Node;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use ecfr_harvester::xml::get_tag_name;
///
/// let xml = r#"<DIV8><HEAD>§ 482.1 Basis and scope.</HEAD></DIV8>"#;
/// let doc = Document::parse(xml).unwrap();
/// let head = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(head), "HEAD");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Find the first child element with the given tag name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use ecfr_harvester::xml::find_child;
///
/// let xml = r#"<DIV8><HEAD/><P/></DIV8>"#;
/// let doc = Document::parse(xml).unwrap();
/// let root = doc.root_element();
///
/// assert!(find_child(root, "HEAD").is_some());
/// assert!(find_child(root, "CITA").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find all child elements with the given tag name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use ecfr_harvester::xml::find_children;
///
/// let xml = r#"<DIV8><P>1</P><CITA/><P>2</P></DIV8>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let paragraphs: Vec<_> = find_children(doc.root_element(), "P").collect();
/// assert_eq!(paragraphs.len(), 2);
/// ```
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && get_tag_name(*child) == tag)
}

/// Get all text below a node, in document order, trimmed.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use ecfr_harvester::xml::get_full_text;
///
/// let xml = "<P>(a) <I>Basis.</I> Text.</P>";
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_full_text(doc.root_element()), "(a) Basis. Text.");
/// ```
pub fn get_full_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Get an attribute value from a node.
pub fn get_attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name)
}

/// Check if a node has a specific tag name.
pub fn has_tag(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && get_tag_name(node) == tag
}

/// Get all element children of a node.
///
/// Excludes text nodes, comments and processing instructions.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}
