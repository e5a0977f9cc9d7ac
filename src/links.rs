//! Sample link discovery on listing pages.
//!
//! Listing pages render each sample as a card anchor. The anchor's href is
//! category-specific (IA and EE listings use different path prefixes), but
//! the trailing 24-character identifier is shared, so every card is mapped
//! onto the profile's single canonical sample URL family.

use indexmap::IndexSet;
use tracing::debug;

use crate::dom;
use crate::profile::SiteProfile;
use crate::query;
use crate::url_utils;

/// Canonical sample URL for one card href, if it carries an identifier.
///
/// # Example
///
/// ```rust
/// use ib_sample_scraper::{links::link_for_href, SiteProfile};
///
/// let profile = SiteProfile::default();
/// let url = link_for_href("/ee-sample/ib-math-ai-sl/649a7fa93367e8a2e6bfda28", &profile);
/// assert_eq!(
///     url.as_deref(),
///     Some("https://nailib.com/ia-sample/ib-math-aa-hl/649a7fa93367e8a2e6bfda28"),
/// );
/// ```
#[must_use]
pub fn link_for_href(href: &str, profile: &SiteProfile) -> Option<String> {
    url_utils::document_id(href).map(|id| profile.sample_url(&id))
}

/// Discover sample URLs on a listing page.
///
/// Returns canonical URLs in first-seen order with duplicates removed.
/// Markup without matching cards, or cards without an identifier, simply
/// contribute nothing.
#[must_use]
pub fn extract_links(listing_markup: &str, profile: &SiteProfile) -> Vec<String> {
    let doc = dom::parse(listing_markup);
    let root = dom::root(&doc);
    let cards = query::query_all(&root, &profile.card_query());

    let mut links = IndexSet::new();
    for card in &cards {
        let href = dom::get_attribute(card, "href").unwrap_or_default();
        match link_for_href(&href, profile) {
            Some(url) => {
                links.insert(url);
            }
            None => debug!(href = %href, "card without document identifier"),
        }
    }

    debug!(cards = cards.len(), links = links.len(), "scanned listing page");
    links.into_iter().collect()
}
