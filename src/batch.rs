//! Batch orchestration: listing pages → sample links → parsed records.
//!
//! Work is strictly sequential. Listings are visited in the order given and
//! links in the order they were discovered; each fetch is awaited before the
//! next one starts. A listing or page that fails is logged, recorded in the
//! report and skipped. Nothing is retried within a run.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, FailureKind, Result};
use crate::fetch::Fetcher;
use crate::links;
use crate::page;
use crate::profile::SiteProfile;
use crate::record::SampleRecord;
use crate::store::SampleStore;

/// A listing page to scan, optionally naming the subject of its samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSource {
    pub url: String,

    #[serde(default)]
    pub subject: Option<String>,
}

impl ListingSource {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            subject: None,
        }
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

/// Where in the pipeline a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Listing,
    Page,
    Store,
}

/// A skipped unit of work.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub url: String,
    pub stage: Stage,
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    fn new(url: &str, stage: Stage, err: &Error) -> Self {
        Self {
            url: url.to_string(),
            stage,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// A sample URL together with the subject it will be parsed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    pub url: String,
    pub subject: String,
}

/// Outcome of link discovery over a set of listings.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Unique links in first-seen order.
    pub links: Vec<DiscoveredLink>,
    pub failures: Vec<Failure>,
}

/// Outcome of a full batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successfully parsed records, in link order.
    pub records: Vec<SampleRecord>,
    /// Unique links discovered across all listings.
    pub links_found: usize,
    /// Listings and pages that were skipped.
    pub failures: Vec<Failure>,
}

/// Outcome of a run whose records were written to a store.
#[derive(Debug, Default)]
pub struct HarvestSummary {
    pub report: BatchReport,
    /// Records the store accepted.
    pub stored: usize,
}

/// Drives link discovery and page parsing through a [`Fetcher`].
#[derive(Clone)]
pub struct Harvester {
    fetcher: Arc<dyn Fetcher>,
    profile: SiteProfile,
}

impl Harvester {
    pub fn new(fetcher: impl Fetcher + 'static, profile: SiteProfile) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            profile,
        }
    }

    #[must_use]
    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    /// Collect unique sample links from every listing.
    ///
    /// A link found on several listings keeps the subject of the first one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToDo`] when `listings` is empty. Individual
    /// listing failures are reported in [`Discovery::failures`].
    pub async fn discover(&self, listings: &[ListingSource]) -> Result<Discovery> {
        if listings.is_empty() {
            return Err(Error::NothingToDo);
        }

        let mut found: IndexMap<String, String> = IndexMap::new();
        let mut failures = Vec::new();

        for listing in listings {
            let markup = match self.fetcher.fetch(&listing.url).await {
                Ok(markup) => markup,
                Err(err) => {
                    warn!(url = %listing.url, error = %err, "skipping listing");
                    failures.push(Failure::new(&listing.url, Stage::Listing, &err));
                    continue;
                }
            };

            let subject = listing
                .subject
                .clone()
                .unwrap_or_else(|| self.profile.default_subject.clone());
            let urls = links::extract_links(&markup, &self.profile);
            info!(url = %listing.url, links = urls.len(), "scanned listing");

            for url in urls {
                found.entry(url).or_insert_with(|| subject.clone());
            }
        }

        let links = found
            .into_iter()
            .map(|(url, subject)| DiscoveredLink { url, subject })
            .collect();
        Ok(Discovery { links, failures })
    }

    /// Discover links on every listing, then fetch and parse each sample.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToDo`] when `listings` is empty. Per-listing
    /// and per-page failures never abort the run.
    pub async fn run(&self, listings: &[ListingSource]) -> Result<BatchReport> {
        let Discovery { links, mut failures } = self.discover(listings).await?;
        info!(links = links.len(), "discovered sample links");

        let mut records = Vec::with_capacity(links.len());
        for link in &links {
            match self.scrape_sample(&link.url, &link.subject).await {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(url = %link.url, error = %err, "skipping sample");
                    failures.push(Failure::new(&link.url, Stage::Page, &err));
                }
            }
        }

        info!(
            records = records.len(),
            failures = failures.len(),
            "batch finished"
        );
        Ok(BatchReport {
            records,
            links_found: links.len(),
            failures,
        })
    }

    /// Fetch and parse one sample page.
    ///
    /// # Errors
    ///
    /// Propagates fetch failures and [`Error::MalformedInput`].
    pub async fn scrape_sample(&self, url: &str, subject: &str) -> Result<SampleRecord> {
        let markup = self.fetcher.fetch(url).await?;
        page::parse_page_for(&markup, &self.profile, subject, url)
    }

    /// Run the batch and upsert every record into `store`.
    ///
    /// Records the store rejects are reported as [`Stage::Store`] failures
    /// and are not retried.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToDo`] when `listings` is empty.
    pub async fn harvest_into(
        &self,
        listings: &[ListingSource],
        store: &dyn SampleStore,
    ) -> Result<HarvestSummary> {
        let mut report = self.run(listings).await?;
        let mut stored = 0;

        for record in &report.records {
            match store.upsert(record).await {
                Ok(_) => stored += 1,
                Err(err) => {
                    warn!(url = %record.source_url, error = %err, "failed to store sample");
                    report
                        .failures
                        .push(Failure::new(&record.source_url, Stage::Store, &err));
                }
            }
        }

        info!(stored, "stored samples");
        Ok(HarvestSummary { report, stored })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct CannedFetcher(HashMap<String, String>);

    #[async_trait::async_trait]
    impl Fetcher for CannedFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.0.get(url).cloned().ok_or_else(|| Error::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    const ID: &str = "649a7fa93367e8a2e6bfda28";

    #[tokio::test]
    async fn empty_listing_set_is_nothing_to_do() {
        let harvester = Harvester::new(CannedFetcher(HashMap::new()), SiteProfile::default());
        assert!(matches!(harvester.run(&[]).await, Err(Error::NothingToDo)));
    }

    #[tokio::test]
    async fn first_listing_subject_wins() {
        let card = format!(r#"<a class="sample_sample__fWsLe" href="/ia-sample/x/{ID}">s</a>"#);
        let pages = HashMap::from([
            ("https://l/ia".to_string(), card.clone()),
            ("https://l/ee".to_string(), card),
        ]);
        let harvester = Harvester::new(CannedFetcher(pages), SiteProfile::default());

        let discovery = harvester
            .discover(&[
                ListingSource::new("https://l/ia").with_subject("Math AA HL"),
                ListingSource::new("https://l/ee"),
            ])
            .await
            .unwrap();

        assert_eq!(discovery.links.len(), 1);
        assert_eq!(discovery.links[0].subject, "Math AA HL");
        assert!(discovery.failures.is_empty());
    }

    #[tokio::test]
    async fn failed_listing_is_reported() {
        let harvester = Harvester::new(CannedFetcher(HashMap::new()), SiteProfile::default());
        let discovery = harvester
            .discover(&[ListingSource::new("https://l/missing")])
            .await
            .unwrap();

        assert!(discovery.links.is_empty());
        assert_eq!(discovery.failures.len(), 1);
        assert_eq!(discovery.failures[0].stage, Stage::Listing);
        assert_eq!(discovery.failures[0].kind, FailureKind::Transport);
    }
}
