//! Sample page parsing.
//!
//! A sample page has a cover block (title, stat items, a list mentioning the
//! word count, a download link) followed by the essay body as a flat run of
//! `<h2>` and `<p>` elements. The body carries no wrapper that ties a
//! paragraph to its heading, so sections are inferred positionally: a heading
//! owns the paragraph that follows it in document order and every paragraph
//! after that, until another heading claims one.
//!
//! Missing cover elements leave their field at the default; only markup that
//! cannot be parsed at all is an error.

use std::collections::HashMap;

use tracing::debug;

use crate::dom::{self, Selection};
use crate::error::Result;
use crate::patterns::WORD_COUNT_PATTERNS;
use crate::profile::SiteProfile;
use crate::query::{self, ElementQuery};
use crate::record::{SampleRecord, Sections};

/// Leading paragraphs reserved for the description.
pub const DESCRIPTION_PARAGRAPHS: usize = 4;

/// Parse a sample page using the profile's default subject.
///
/// # Errors
///
/// Returns [`crate::Error::MalformedInput`] when the markup is blank or
/// contains no tags.
///
/// # Example
///
/// ```rust
/// use ib_sample_scraper::{page::parse_page, SiteProfile};
///
/// let html = r#"<h1 class="file_sample__body__container__middle__cover__heading__VG9Sj">
///     Modelling tides</h1><p>An exploration.</p>"#;
/// let record = parse_page(html, &SiteProfile::default())?;
/// assert_eq!(record.title, "Modelling tides");
/// assert_eq!(record.description, "An exploration.");
/// # Ok::<(), ib_sample_scraper::Error>(())
/// ```
pub fn parse_page(markup: &str, profile: &SiteProfile) -> Result<SampleRecord> {
    parse_page_for(markup, profile, &profile.default_subject, "")
}

/// Parse a sample page with the subject and source URL supplied by the caller.
///
/// # Errors
///
/// Returns [`crate::Error::MalformedInput`] when the markup is blank or
/// contains no tags.
pub fn parse_page_for(
    markup: &str,
    profile: &SiteProfile,
    subject: &str,
    source_url: &str,
) -> Result<SampleRecord> {
    let doc = dom::parse_markup(markup)?;
    let root = dom::root(&doc);

    let mut record = SampleRecord::new(subject).with_source_url(source_url);

    record.title = first_text(&root, &profile.title_query()).unwrap_or_else(|| {
        debug!(url = source_url, "no title heading");
        String::new()
    });

    record.read_time = first_text(&root, &profile.read_time_query()).unwrap_or_else(|| {
        debug!(url = source_url, "no read-time stat");
        String::new()
    });

    record.word_count = match query::query(&root, &profile.word_count_query()) {
        Some(list) => word_count(&dom::text_content(&list)),
        None => {
            debug!(url = source_url, "no word-count list");
            0
        }
    };

    record.file_link = query::query(&root, &profile.file_link_query())
        .and_then(|a| dom::get_attribute(&a, "href"))
        .unwrap_or_default();

    let paragraphs = query::query_all(&root, &ElementQuery::tag("p"));
    let paragraph_texts: Vec<String> = paragraphs.iter().map(dom::trimmed_text).collect();

    record.description = description(&paragraph_texts);
    record.sections = sections(&root, &paragraphs, &paragraph_texts);

    debug!(
        url = source_url,
        paragraphs = paragraphs.len(),
        sections = record.sections.len(),
        word_count = record.word_count,
        "parsed sample page"
    );
    Ok(record)
}

fn first_text(root: &Selection, q: &ElementQuery) -> Option<String> {
    query::query(root, q).map(|sel| dom::trimmed_text(&sel))
}

/// Word count advertised in a block of text.
///
/// The labelled form ("Word count : 2,500") is tried before the bare form
/// ("2500 words") and the first form that matches decides the result, even
/// if a later form would also match. Thousands separators are dropped. No
/// match, or a number too large for `u64`, gives 0.
#[must_use]
pub fn word_count(text: &str) -> u64 {
    let Some(caps) = WORD_COUNT_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(text))
    else {
        return 0;
    };
    caps[1].replace(',', "").parse().unwrap_or(0)
}

/// Join the leading paragraphs with single spaces.
#[must_use]
pub fn description(paragraph_texts: &[String]) -> String {
    paragraph_texts
        .iter()
        .take(DESCRIPTION_PARAGRAPHS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// For each paragraph index, the first `<h2>` whose next paragraph it is.
///
/// Walks the document once; every heading seen since the last paragraph is
/// waiting for its "next paragraph" and gets the next one encountered.
fn heading_starts<'a>(root: &Selection<'a>, paragraphs: &[Selection<'a>]) -> HashMap<usize, String> {
    let mut starts = HashMap::new();
    let mut pending: Vec<String> = Vec::new();
    let mut next_paragraph = 0;

    for node in root.select("*").nodes() {
        let sel = Selection::from(*node);
        match dom::tag_name(&sel).as_deref() {
            Some("h2") => pending.push(dom::trimmed_text(&sel)),
            Some("p") => {
                // `paragraphs` is the same document-order walk filtered to <p>.
                let Some(p) = paragraphs.get(next_paragraph) else {
                    break;
                };
                debug_assert!(dom::same_node(p, &sel));
                if let Some(first) = pending.drain(..).next() {
                    starts.insert(next_paragraph, first);
                }
                next_paragraph += 1;
            }
            _ => {}
        }
    }

    starts
}

/// Group body paragraphs under the heading that precedes them.
///
/// The first [`DESCRIPTION_PARAGRAPHS`] paragraphs are never part of a
/// section. Paragraphs before the first heading are dropped. Headings that
/// end up without text are omitted. A heading with empty text closes the
/// current section without opening a new one.
fn sections(root: &Selection, paragraphs: &[Selection], paragraph_texts: &[String]) -> Sections {
    let starts = heading_starts(root, paragraphs);

    let mut sections = Sections::new();
    let mut current: Option<String> = None;

    for (index, text) in paragraph_texts.iter().enumerate().skip(DESCRIPTION_PARAGRAPHS) {
        if let Some(heading) = starts.get(&index) {
            current = (!heading.is_empty()).then(|| heading.clone());
            if let Some(name) = &current {
                sections.insert(name.clone(), String::new());
            }
        }

        if let Some(body) = current.as_ref().and_then(|name| sections.get_mut(name)) {
            body.push_str(text);
            body.push(' ');
        }
    }

    sections.retain(|_, body| {
        *body = body.trim().to_string();
        !body.is_empty()
    });
    sections
}
