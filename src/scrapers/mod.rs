use async_trait::async_trait;
use anyhow::Result;
use reqwest::Client;
use crate::models::Announcement;

mod boc;
pub use boc::BocScraper;

#[async_trait]
pub trait BulletinScraper: Send + Sync {
    /// Fetch the bulletin index and return keyword-matching candidates
    /// in page order.
    async fn fetch_candidates(&self, client: &Client) -> Result<Vec<Announcement>>;
}
