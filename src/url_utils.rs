//! URL Utility Functions
//!
//! Percent-decoding of card hrefs, document-identifier recognition, and
//! validation of configured listing URLs.

use std::borrow::Cow;

use url::Url;

/// Length of a canonical document identifier.
pub const DOCUMENT_ID_LEN: usize = 24;

/// Check if a string is an absolute http(s) URL with a host.
#[must_use]
pub fn is_http_url(s: &str) -> bool {
    let s = s.trim();
    if !s.starts_with("http://") && !s.starts_with("https://") {
        return false;
    }
    Url::parse(s).is_ok_and(|url| url.host().is_some())
}

/// Percent-decode an href.
///
/// Escapes that do not form valid UTF-8 are replaced with U+FFFD instead of
/// failing, so one odd byte never hides the rest of the path.
#[must_use]
pub fn decode_href(href: &str) -> Cow<'_, str> {
    match urlencoding::decode(href) {
        Ok(decoded) => decoded,
        Err(_) => {
            let bytes = urlencoding::decode_binary(href.as_bytes());
            Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// Whether a path segment has the shape of a document identifier.
///
/// Exactly 24 characters (not bytes), each a Unicode letter or digit.
#[must_use]
pub fn is_document_id(segment: &str) -> bool {
    segment.chars().count() == DOCUMENT_ID_LEN && segment.chars().all(char::is_alphanumeric)
}

/// Every identifier-shaped segment of an already-decoded path, in order.
#[must_use]
pub fn document_id_candidates(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| is_document_id(segment)).collect()
}

/// Identifier of the document an href points at.
///
/// The href is percent-decoded first. When several segments qualify, the
/// last one wins: earlier segments are category slugs that can happen to be
/// 24 characters long, the trailing one is the resource.
///
/// # Example
///
/// ```rust
/// use ib_sample_scraper::url_utils::document_id;
///
/// let href = "/ia-sample/ib-math-ai-sl/649a7fa93367e8a2e6bfda28";
/// assert_eq!(document_id(href).as_deref(), Some("649a7fa93367e8a2e6bfda28"));
/// assert_eq!(document_id("/ia-sample/short"), None);
/// ```
#[must_use]
pub fn document_id(href: &str) -> Option<String> {
    let decoded = decode_href(href);
    document_id_candidates(&decoded)
        .last()
        .map(|id| (*id).to_string())
}
