//! Site profile: the marker strings that tie extraction to one site's markup.
//!
//! Everything site-specific lives here. Pointing the scraper at a redesigned
//! page (new hashed CSS class suffixes) or another subject listing is a
//! configuration change, not a code change.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::patterns;
use crate::query::ElementQuery;

/// Placeholder substituted with the document identifier.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Marker classes, file extension, URL template and default subject.
///
/// # Example
///
/// ```rust
/// use ib_sample_scraper::SiteProfile;
///
/// let profile = SiteProfile {
///     default_subject: "Physics HL".to_string(),
///     ..SiteProfile::default()
/// };
/// assert!(profile.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// Class fragment carried by sample-card anchors on listing pages.
    pub card_class: String,

    /// Class on the `<h1>` holding the sample title.
    pub title_class: String,

    /// Class on the cover stat items (read time, subject, ...).
    pub stat_class: String,

    /// Class on the cover list that mentions the word count.
    pub list_class: String,

    /// Extension a downloadable document link ends with.
    pub document_extension: String,

    /// Canonical sample URL, with `{id}` where the identifier goes.
    pub sample_url_template: String,

    /// Subject assigned when the listing source does not name one.
    pub default_subject: String,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            card_class: "sample_sample__fWsLe".to_string(),
            title_class: "file_sample__body__container__middle__cover__heading__VG9Sj".to_string(),
            stat_class: "file_sample__body__container__middle__cover__stat__item__text__6umeQ"
                .to_string(),
            list_class: "file_sample__body__container__middle__cover__list__nmVAV".to_string(),
            document_extension: ".pdf".to_string(),
            sample_url_template: "https://nailib.com/ia-sample/ib-math-aa-hl/{id}".to_string(),
            default_subject: "Math AI SL".to_string(),
        }
    }
}

impl SiteProfile {
    /// Check that the profile can produce usable queries and URLs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a marker is blank or the URL template
    /// lacks the `{id}` placeholder.
    pub fn validate(&self) -> Result<()> {
        let markers = [
            ("card_class", &self.card_class),
            ("title_class", &self.title_class),
            ("stat_class", &self.stat_class),
            ("list_class", &self.list_class),
            ("document_extension", &self.document_extension),
        ];
        for (name, value) in markers {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("site.{name} must not be empty")));
            }
        }
        if !self.sample_url_template.contains(ID_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "site.sample_url_template must contain {ID_PLACEHOLDER}"
            )));
        }
        Ok(())
    }

    /// Canonical sample URL for a document identifier.
    #[must_use]
    pub fn sample_url(&self, id: &str) -> String {
        self.sample_url_template.replace(ID_PLACEHOLDER, id)
    }

    /// Sample-card anchors on a listing page.
    #[must_use]
    pub fn card_query(&self) -> ElementQuery {
        ElementQuery::tag("a").class_fragment(&self.card_class)
    }

    #[must_use]
    pub fn title_query(&self) -> ElementQuery {
        ElementQuery::tag("h1").class_token(&self.title_class)
    }

    /// Stat item whose text reads like "12 mins read".
    ///
    /// The pattern is tested against all descendant text of the item, so a
    /// number wrapped in its own `<span>` still matches.
    #[must_use]
    pub fn read_time_query(&self) -> ElementQuery {
        ElementQuery::tag("div")
            .class_token(&self.stat_class)
            .text_matching(Regex::clone(&patterns::READ_TIME))
    }

    #[must_use]
    pub fn word_count_query(&self) -> ElementQuery {
        ElementQuery::tag("div").class_token(&self.list_class)
    }

    #[must_use]
    pub fn file_link_query(&self) -> ElementQuery {
        ElementQuery::tag("a").href_suffix(&self.document_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_valid() {
        assert!(SiteProfile::default().validate().is_ok());
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let profile = SiteProfile {
            sample_url_template: "https://nailib.com/ia-sample/".to_string(),
            ..SiteProfile::default()
        };
        assert!(matches!(profile.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn blank_marker_is_rejected() {
        let profile = SiteProfile {
            card_class: "  ".to_string(),
            ..SiteProfile::default()
        };
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("card_class"));
    }

    #[test]
    fn sample_url_substitutes_id() {
        let profile = SiteProfile::default();
        assert_eq!(
            profile.sample_url("649a7fa93367e8a2e6bfda28"),
            "https://nailib.com/ia-sample/ib-math-aa-hl/649a7fa93367e8a2e6bfda28"
        );
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let profile: SiteProfile = toml::from_str(r#"default_subject = "Biology HL""#).unwrap();
        assert_eq!(profile.default_subject, "Biology HL");
        assert_eq!(profile.document_extension, ".pdf");
    }
}
