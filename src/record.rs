//! Structured output of one parsed sample page.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Section heading → section text, in the order headings appear on the page.
pub type Sections = IndexMap<String, String>;

/// A parsed IB sample (Internal Assessment or Extended Essay).
///
/// Every text field defaults to empty and `word_count` to 0 when the page
/// does not carry the corresponding element; a sparse record is normal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Cover heading of the sample.
    pub title: String,

    /// IB subject label, e.g. "Math AI SL".
    pub subject: String,

    /// The first four paragraphs of the page, joined by spaces.
    pub description: String,

    /// Body text grouped under the `<h2>` heading that precedes it.
    #[serde(default)]
    pub sections: Sections,

    /// Word count advertised on the cover.
    #[serde(default)]
    pub word_count: u64,

    /// Reading-time label, e.g. "12 mins read".
    #[serde(default)]
    pub read_time: String,

    /// Link to the downloadable document.
    #[serde(default)]
    pub file_link: String,

    /// When the page was scraped. The site does not expose a publish date.
    pub publication_date: DateTime<Utc>,

    /// Canonical URL the record was parsed from; the upsert key.
    #[serde(default)]
    pub source_url: String,
}

impl SampleRecord {
    /// An empty record stamped with the current time.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            subject: subject.into(),
            description: String::new(),
            sections: Sections::new(),
            word_count: 0,
            read_time: String::new(),
            file_link: String::new(),
            publication_date: Utc::now(),
            source_url: String::new(),
        }
    }

    /// Copy of the record with a different source URL.
    #[must_use]
    pub fn with_source_url(mut self, source_url: impl Into<String>) -> Self {
        self.source_url = source_url.into();
        self
    }

    /// Whether two records carry the same extracted content, ignoring the
    /// scrape timestamp.
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        Self {
            publication_date: other.publication_date,
            ..self.clone()
        } == *other
    }
}

/// A record as held by a [`crate::store::SampleStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSample {
    /// Store-assigned identifier (UUID v4).
    pub id: String,

    #[serde(flatten)]
    pub record: SampleRecord,
}

/// Filter for listing and counting stored samples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleFilter {
    /// Exact subject label to match.
    pub subject: Option<String>,
}

impl SampleFilter {
    #[must_use]
    pub fn subject(subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
        }
    }

    /// Whether a record passes the filter.
    #[must_use]
    pub fn matches(&self, record: &SampleRecord) -> bool {
        self.subject
            .as_deref()
            .is_none_or(|subject| record.subject == subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_content_ignores_timestamp() {
        let a = SampleRecord::new("Math AI SL").with_source_url("https://example.com/1");
        let mut b = a.clone();
        b.publication_date = a.publication_date + chrono::Duration::seconds(5);
        assert!(a.same_content(&b));

        b.title = "Different".to_string();
        assert!(!a.same_content(&b));
    }

    #[test]
    fn sections_serialize_in_page_order() {
        let mut record = SampleRecord::new("Math AI SL");
        record.sections.insert("Zeta".to_string(), "last letter".to_string());
        record.sections.insert("Alpha".to_string(), "first letter".to_string());

        let json = serde_json::to_string(&record).unwrap();
        let zeta = json.find("Zeta").unwrap();
        let alpha = json.find("Alpha").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn stored_sample_flattens_record() {
        let stored = StoredSample {
            id: "abc".to_string(),
            record: SampleRecord::new("Math AI SL"),
        };
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["subject"], "Math AI SL");
        assert_eq!(value["word_count"], 0);
    }

    #[test]
    fn filter_matches_subject() {
        let record = SampleRecord::new("Math AI SL");
        assert!(SampleFilter::default().matches(&record));
        assert!(SampleFilter::subject("Math AI SL").matches(&record));
        assert!(!SampleFilter::subject("Physics HL").matches(&record));
    }
}
