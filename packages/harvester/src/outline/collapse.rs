//! Composition of leading markers into a citation code.

/// Result of collapsing the leading markers of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collapsed {
    /// Parent code extended by every marker that was not a restatement.
    pub code: String,

    /// Paragraph text with all leading marker tokens stripped.
    pub text: String,

    /// The stripped marker tokens, joined by a single space.
    pub marker: String,
}

/// Strip all leading marker tokens from `text` and compose them onto `parent_code`.
///
/// A token such as `(1)(i)` carries several markers; each is appended in
/// turn. A marker whose second character equals the second-from-last
/// character of the code built so far restates the parent and is skipped.
/// A line consisting of a marker alone keeps its text.
///
/// # Examples
/// ```
/// use ecfr_harvester::outline::collapse;
///
/// let collapsed = collapse("(1)(i) Do the thing.", "482.1(a)");
/// assert_eq!(collapsed.code, "482.1(a)(1)(i)");
/// assert_eq!(collapsed.text, "Do the thing.");
/// ```
#[must_use]
pub fn collapse(text: &str, parent_code: &str) -> Collapsed {
    let mut code = parent_code.to_string();
    let mut rest = text.trim();
    let mut tokens: Vec<&str> = Vec::new();

    // Every iteration consumes a non-empty token, so the loop always ends.
    while rest.starts_with('(') {
        let Some((token, remainder)) = rest.split_once(char::is_whitespace) else {
            break;
        };

        for marker in split_markers(token) {
            if !restates_parent(marker, &code) {
                code.push_str(marker);
            }
        }

        tokens.push(token);
        rest = remainder.trim_start();
    }

    Collapsed {
        code,
        text: rest.to_string(),
        marker: tokens.join(" "),
    }
}

/// First marker of the text, if it opens with `(`.
///
/// For `(a)(1) Text` this is `(a)`.
#[must_use]
pub fn leading_marker(text: &str) -> Option<&str> {
    let text = text.trim_start();
    if !text.starts_with('(') {
        return None;
    }
    let token = text.split_whitespace().next()?;
    split_markers(token).first().copied()
}

/// Split a token like `(1)(i)` into its parenthesized markers.
///
/// Tokens that are not made up entirely of parenthesized groups are
/// returned whole.
fn split_markers(token: &str) -> Vec<&str> {
    let mut markers = Vec::new();
    let mut rest = token;

    while rest.starts_with('(') {
        let Some(end) = rest.find(')') else {
            break;
        };
        let (marker, tail) = rest.split_at(end + 1);
        markers.push(marker);
        rest = tail;
    }

    if markers.is_empty() || !rest.is_empty() {
        return vec![token];
    }
    markers
}

fn restates_parent(marker: &str, code: &str) -> bool {
    match (marker.chars().nth(1), code.chars().rev().nth(1)) {
        (Some(own), Some(parent)) => own == parent,
        _ => false,
    }
}

/// Whether a composed code ends in a number marker, e.g. `482.12(a)(1)`.
pub(crate) fn ends_with_number_marker(code: &str) -> bool {
    code.ends_with(')')
        && code
            .chars()
            .rev()
            .nth(1)
            .is_some_and(|c| c.is_ascii_digit())
}
