//! # ib-sample-scraper
//!
//! Scrapes IB Internal Assessment and Extended Essay samples from listing
//! pages into structured records.
//!
//! A run has three stages: listing pages are scanned for sample-card links,
//! each linked sample page is fetched and parsed into a [`SampleRecord`],
//! and the records are exported as JSON and upserted into a store that a
//! small HTTP service queries.
//!
//! ## Quick Start
//!
//! ```rust
//! use ib_sample_scraper::{extract_links, parse_page, SiteProfile};
//!
//! let profile = SiteProfile::default();
//! let listing = r#"<a class="sample_sample__fWsLe"
//!     href="/ia-sample/ib-math-ai-sl/649a7fa93367e8a2e6bfda28">Sample</a>"#;
//! assert_eq!(
//!     extract_links(listing, &profile),
//!     vec!["https://nailib.com/ia-sample/ib-math-aa-hl/649a7fa93367e8a2e6bfda28"]
//! );
//!
//! let page = "<html><body><h1 class=\"file_sample__body__container__middle__cover__heading__VG9Sj\">\
//!     Modelling Queues</h1><p>Intro</p></body></html>";
//! let record = parse_page(page, &profile)?;
//! assert_eq!(record.title, "Modelling Queues");
//! assert_eq!(record.description, "Intro");
//! # Ok::<(), ib_sample_scraper::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Link Extraction**: card anchors → canonical, de-duplicated sample URLs
//! - **Page Parsing**: title, cover stats, description, heading sections
//! - **Batch Runs**: sequential fetch with per-page failure isolation
//! - **Persistence**: SQLite store upserting by source URL
//! - **Query Service**: JSON HTTP API over stored samples

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod patterns;

/// Listing → links → records orchestration.
pub mod batch;

/// TOML configuration with defaults.
pub mod config;

/// DOM helpers over `dom_query`.
pub mod dom;

/// Character encoding detection and transcoding.
pub mod encoding;

/// JSON export of records.
pub mod export;

/// Page fetching.
pub mod fetch;

/// Sample-card link extraction from listing pages.
pub mod links;

/// Sample page parsing.
pub mod page;

/// Site-specific marker classes and URL template.
pub mod profile;

/// Declarative element matching.
pub mod query;

/// Record types.
pub mod record;

/// HTTP query service.
pub mod server;

/// Sample persistence.
pub mod store;

/// URL and document-identifier utilities.
pub mod url_utils;

// Public API - re-exports
pub use batch::{BatchReport, Failure, Harvester, HarvestSummary, ListingSource, Stage};
pub use config::Config;
pub use error::{Error, FailureKind, Result};
pub use fetch::{Fetcher, HttpFetcher};
pub use links::extract_links;
pub use page::{parse_page, parse_page_for};
pub use profile::SiteProfile;
pub use record::{SampleFilter, SampleRecord, Sections, StoredSample};
pub use store::{MemoryStore, SampleStore, SqliteStore};
