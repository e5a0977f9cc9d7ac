//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ib_sample_scraper::{Error, Fetcher, Result};

pub const ID_A: &str = "649a7fa93367e8a2e6bfda28";
pub const ID_B: &str = "64b0c1d2e3f4a5b6c7d8e9f0";
pub const ID_C: &str = "65aa11bb22cc33dd44ee55ff";

pub const IA_LISTING: &str = "https://nailib.com/ia-sample/ib-math-ai-sl";
pub const EE_LISTING: &str = "https://nailib.com/ee-sample/ib-math-ai-sl";

pub fn canonical(id: &str) -> String {
    format!("https://nailib.com/ia-sample/ib-math-aa-hl/{id}")
}

/// Listing page with one card per href, plus unrelated navigation anchors.
pub fn listing_page(hrefs: &[&str]) -> String {
    let cards: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<a class="sample_sample__fWsLe card" href="{href}"><div>Sample</div></a>"#
            )
        })
        .collect();
    format!(
        r#"<html><body>
        <nav><a href="/">Home</a><a href="/ia-sample/{ID_C}">Not a card</a></nav>
        <main>{cards}</main>
        </body></html>"#
    )
}

/// A complete sample page in the site's cover-plus-body layout.
pub fn sample_page(title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title} | Nail IB</title></head>
<body>
  <div class="file_sample__body__container__middle__cover__jj1Ux">
    <h1 class="file_sample__body__container__middle__cover__heading__VG9Sj">{title}</h1>
    <div class="file_sample__body__container__middle__cover__stat__item__text__6umeQ">Math AI SL</div>
    <div class="file_sample__body__container__middle__cover__stat__item__text__6umeQ">12 mins read</div>
    <div class="file_sample__body__container__middle__cover__list__nmVAV">
      <span>Candidate session: May 2023</span>
      <span>Word count : 2,450</span>
    </div>
    <a href="https://cdn.nailib.com/files/sample.pdf">Download PDF</a>
  </div>
  <p>This exploration models supermarket queues.</p>
  <p>It uses an M/M/1 model.</p>
  <p>Data came from a local store.</p>
  <p>Results are compared with observations.</p>
  <h2>Introduction</h2>
  <p>Queues are everywhere.</p>
  <p>Waiting costs time.</p>
  <h2>Analysis</h2>
  <p>The arrival rate was 0.8 per minute.</p>
  <h2>Conclusion</h2>
  <p>The model fits reasonably well.</p>
</body>
</html>"#
    )
}

/// Fetcher serving canned markup and recording the order of requests.
///
/// Clones share the request log, so a test can keep one handle after moving
/// another into a `Harvester`.
#[derive(Clone, Default)]
pub struct StubFetcher {
    pages: HashMap<String, String>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: impl Into<String>, markup: impl Into<String>) -> Self {
        self.pages.insert(url.into(), markup.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| Error::HttpStatus {
            url: url.to_string(),
            status: 503,
        })
    }
}
