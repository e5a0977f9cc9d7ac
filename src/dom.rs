//! DOM Operations Adapter
//!
//! Thin helpers over the `dom_query` crate. Extraction code goes through these
//! functions instead of touching `dom_query` directly, so the handful of
//! operations the scraper relies on (attribute reads, class checks, text,
//! node identity) live in one place.

pub use dom_query::{Document, Selection};

use crate::error::{Error, Result};

// === Parsing ===

/// Parse HTML string into document.
///
/// html5ever never rejects input, so this always yields a document.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Parse HTML, rejecting input that carries no markup at all.
///
/// A fetched page body without a single tag is an error page or a truncated
/// response, so it is reported instead of parsed into an empty record.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] for blank or tag-less input.
pub fn parse_markup(html: &str) -> Result<Document> {
    if html.trim().is_empty() {
        return Err(Error::MalformedInput("document is empty".to_string()));
    }
    if !html.contains('<') {
        return Err(Error::MalformedInput("document contains no tags".to_string()));
    }
    Ok(parse(html))
}

/// Root selection covering every element of the document.
#[inline]
#[must_use]
pub fn root(doc: &Document) -> Selection<'_> {
    doc.select("html")
}

// === Attribute Operations ===

/// Get any attribute value
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Get element class attribute
#[inline]
#[must_use]
pub fn class_name(sel: &Selection) -> Option<String> {
    sel.attr("class").map(|s| s.to_string())
}

/// Whether the whitespace-separated class list contains `token` exactly.
#[must_use]
pub fn has_class_token(sel: &Selection, token: &str) -> bool {
    class_name(sel).is_some_and(|classes| classes.split_whitespace().any(|c| c == token))
}

/// Whether the raw class attribute contains `fragment` anywhere.
#[must_use]
pub fn class_contains(sel: &Selection, fragment: &str) -> bool {
    class_name(sel).is_some_and(|classes| classes.contains(fragment))
}

// === Tag/Node Information ===

/// Get tag name (lowercase)
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes()
        .first()
        .and_then(dom_query::NodeRef::node_name)
        .map(|t| t.to_string())
}

/// Whether two selections point at the same first node.
#[must_use]
pub fn same_node(a: &Selection, b: &Selection) -> bool {
    match (a.nodes().first(), b.nodes().first()) {
        (Some(x), Some(y)) => x.id == y.id,
        _ => false,
    }
}

// === Text Content ===

/// All text of the node and its descendants, untouched.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> String {
    sel.text().to_string()
}

/// Text of the node with surrounding whitespace removed.
#[inline]
#[must_use]
pub fn trimmed_text(sel: &Selection) -> String {
    sel.text().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markup_rejects_blank_input() {
        assert!(matches!(parse_markup(""), Err(Error::MalformedInput(_))));
        assert!(matches!(parse_markup("   \n\t"), Err(Error::MalformedInput(_))));
        assert!(matches!(parse_markup("just words"), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_parse_markup_accepts_fragments() {
        let doc = parse_markup("<p>text<div>more").unwrap();
        assert!(doc.select("p").exists());
        assert!(root(&doc).exists());
    }

    #[test]
    fn test_class_checks() {
        let doc = parse(r#"<div class="card sample_sample__fWsLe big">x</div>"#);
        let div = doc.select("div");

        assert!(has_class_token(&div, "card"));
        assert!(!has_class_token(&div, "sample"));
        assert!(class_contains(&div, "sample_sample__"));
        assert!(!class_contains(&div, "missing"));
    }

    #[test]
    fn test_missing_attributes_return_none() {
        let doc = parse(r#"<a>no attributes</a>"#);
        let a = doc.select("a");

        assert_eq!(get_attribute(&a, "href"), None);
        assert_eq!(class_name(&a), None);
        assert!(!has_class_token(&a, "anything"));
    }

    #[test]
    fn test_same_node() {
        let doc = parse(r#"<div><p id="a">1</p><p id="b">2</p></div>"#);
        let a = doc.select("#a");
        let first_p = doc.select("p").first();
        let b = doc.select("#b");

        assert!(same_node(&a, &first_p));
        assert!(!same_node(&a, &b));
        assert!(!same_node(&a, &doc.select("span")));
    }

    #[test]
    fn test_text_helpers() {
        let doc = parse("<p>  Hello <b>world</b>\n </p>");
        let p = doc.select("p");

        assert_eq!(text_content(&p), "  Hello world\n ");
        assert_eq!(trimmed_text(&p), "Hello world");
        assert_eq!(tag_name(&p), Some("p".to_string()));
    }
}
