//! Element Queries
//!
//! A small predicate language for picking elements out of a page: tag name,
//! class match, `href` suffix and a text pattern. Site-specific marker strings
//! are plugged in through [`crate::SiteProfile`], so the extraction code only
//! ever says *what* kind of element it wants.

use dom_query::Selection;
use regex::Regex;

use crate::dom;

/// How an element's `class` attribute is tested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassMatch {
    /// One of the whitespace-separated classes equals the value.
    Token(String),
    /// The raw attribute contains the value as a substring.
    Contains(String),
}

/// Conjunction of element predicates. Unset parts match everything.
#[derive(Debug, Clone, Default)]
pub struct ElementQuery {
    tag: Option<String>,
    class: Option<ClassMatch>,
    href_suffix: Option<String>,
    text: Option<Regex>,
}

impl ElementQuery {
    /// Match elements with the given tag name.
    #[must_use]
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_ascii_lowercase()),
            ..Self::default()
        }
    }

    /// Match any element.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn class_token(mut self, token: &str) -> Self {
        self.class = Some(ClassMatch::Token(token.to_string()));
        self
    }

    #[must_use]
    pub fn class_fragment(mut self, fragment: &str) -> Self {
        self.class = Some(ClassMatch::Contains(fragment.to_string()));
        self
    }

    #[must_use]
    pub fn href_suffix(mut self, suffix: &str) -> Self {
        self.href_suffix = Some(suffix.to_string());
        self
    }

    /// Require the element's trimmed text to contain a match of `pattern`.
    #[must_use]
    pub fn text_matching(mut self, pattern: Regex) -> Self {
        self.text = Some(pattern);
        self
    }

    /// Test a single element against every configured predicate.
    #[must_use]
    pub fn matches(&self, sel: &Selection) -> bool {
        if let Some(tag) = &self.tag {
            if dom::tag_name(sel).as_deref() != Some(tag.as_str()) {
                return false;
            }
        }

        let class_ok = match &self.class {
            None => true,
            Some(ClassMatch::Token(token)) => dom::has_class_token(sel, token),
            Some(ClassMatch::Contains(fragment)) => dom::class_contains(sel, fragment),
        };
        if !class_ok {
            return false;
        }

        if let Some(suffix) = &self.href_suffix {
            let ends = dom::get_attribute(sel, "href").is_some_and(|href| href.ends_with(suffix.as_str()));
            if !ends {
                return false;
            }
        }

        if let Some(pattern) = &self.text {
            return pattern.is_match(&dom::trimmed_text(sel));
        }

        true
    }
}

/// First descendant of `root`, in document order, matching the query.
#[must_use]
pub fn query<'a>(root: &Selection<'a>, q: &ElementQuery) -> Option<Selection<'a>> {
    root.select("*")
        .nodes()
        .iter()
        .map(|node| Selection::from(*node))
        .find(|sel| q.matches(sel))
}

/// Every descendant of `root`, in document order, matching the query.
#[must_use]
pub fn query_all<'a>(root: &Selection<'a>, q: &ElementQuery) -> Vec<Selection<'a>> {
    root.select("*")
        .nodes()
        .iter()
        .map(|node| Selection::from(*node))
        .filter(|sel| q.matches(sel))
        .collect()
}
