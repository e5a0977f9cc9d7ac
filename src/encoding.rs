//! Character encoding detection and transcoding of fetched bodies.
//!
//! The charset is taken from the HTTP `Content-Type` header when present,
//! then from a `<meta>` declaration near the top of the document, and
//! defaults to UTF-8.

use encoding_rs::{Encoding, UTF_8};

use crate::patterns::{CONTENT_TYPE_CHARSET, META_CHARSET};

/// Bytes of the document scanned for a `<meta>` charset declaration.
const META_SCAN_LIMIT: usize = 1024;

/// Encoding named by a `Content-Type` header value, if recognised.
#[must_use]
pub fn encoding_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    CONTENT_TYPE_CHARSET
        .captures(content_type)
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
}

/// Encoding declared by the document itself.
///
/// Matches both `<meta charset="...">` and the older
/// `<meta http-equiv="Content-Type" content="...; charset=...">` form.
#[must_use]
pub fn encoding_from_markup(html: &[u8]) -> Option<&'static Encoding> {
    let head = &html[..html.len().min(META_SCAN_LIMIT)];
    let head = String::from_utf8_lossy(head);

    META_CHARSET
        .captures(&head)
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
}

/// Decode a response body to UTF-8.
///
/// Invalid sequences become U+FFFD rather than errors; a page with a few
/// broken bytes is still worth parsing.
///
/// # Examples
///
/// ```
/// use ib_sample_scraper::encoding::decode_body;
///
/// let body = b"<html><body>Caf\xE9</body></html>";
/// let text = decode_body(body, Some("text/html; charset=ISO-8859-1"));
/// assert!(text.contains("Café"));
/// ```
#[must_use]
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(encoding_from_content_type)
        .or_else(|| encoding_from_markup(body))
        .unwrap_or(UTF_8);

    if encoding == UTF_8 {
        return String::from_utf8_lossy(body).into_owned();
    }

    let (decoded, _encoding_used, _had_errors) = encoding.decode(body);
    decoded.into_owned()
}
