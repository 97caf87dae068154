use async_trait::async_trait;
use anyhow::Result;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::models::{Announcement, EMOJI_SEARCH};
use crate::parsers::{clean_text, matches_any_keyword};
use crate::scrapers::BulletinScraper;
use crate::utils::http::fetch_page;

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("Invalid anchor selector"));

pub struct BocScraper {
    config: Arc<Config>,
}

impl BocScraper {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BulletinScraper for BocScraper {
    async fn fetch_candidates(&self, client: &Client) -> Result<Vec<Announcement>> {
        info!(
            "{} Searching announcements on {}",
            EMOJI_SEARCH, self.config.bulletin_url
        );

        let html = fetch_page(client, &self.config.bulletin_url).await?;
        let candidates = extract_candidates(&html, &self.config.keywords, &self.config.base_url);

        info!("Found {} matching announcements", candidates.len());
        Ok(candidates)
    }
}

fn extract_candidates(html: &str, keywords: &[String], base_url: &str) -> Vec<Announcement> {
    let document = Html::parse_document(html);
    let mut candidates = Vec::new();

    for element in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let title = clean_text(&element.text().collect::<String>());
        if title.is_empty() || !matches_any_keyword(&title, keywords) {
            continue;
        }

        candidates.push(Announcement {
            title,
            link: normalize_link(href, base_url),
        });
    }

    candidates
}

/// Absolutize an href against the site root.
///
/// Idempotent: an already-absolute URL comes back unchanged, so links can be
/// normalized again without drifting.
pub fn normalize_link(href: &str, site_root: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    let root = site_root.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{root}{href}")
    } else {
        format!("{root}/{href}")
    }
}
