use std::collections::HashSet;
use std::sync::Arc;

use reqwest::Client;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::Announcement;
use crate::scrapers::BulletinScraper;
use crate::storage::{SeenSet, SeenStore};
use crate::whatsapp::{message, Notifier};

/// Counts for one completed pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub candidates: usize,
    pub new: usize,
    pub sent: usize,
    pub failed: usize,
    pub persisted: bool,
}

/// Drives one pass: load memory, fetch candidates, diff, notify, persist.
///
/// Passes run strictly sequentially, so the in-memory seen set is never
/// shared between passes.
pub struct Runner {
    config: Arc<Config>,
    client: Client,
    scraper: Box<dyn BulletinScraper>,
    store: Arc<dyn SeenStore>,
    notifier: Arc<dyn Notifier>,
}

impl Runner {
    pub fn new(
        config: Arc<Config>,
        client: Client,
        scraper: Box<dyn BulletinScraper>,
        store: Arc<dyn SeenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            client,
            scraper,
            store,
            notifier,
        }
    }

    /// One full fetch, diff, notify, persist cycle.
    ///
    /// Never fails: every recoverable error is logged and the pass runs to
    /// completion with whatever it has.
    pub async fn run_pass(&self) -> PassReport {
        let mut seen = match self.store.load().await {
            Ok(seen) => seen,
            Err(e) => {
                warn!("Could not load memory: {e:#}. Starting with empty memory");
                SeenSet::new()
            }
        };

        let candidates = match self.scraper.fetch_candidates(&self.client).await {
            Ok(candidates) => candidates,
            Err(e) => {
                error!("Error downloading bulletin page: {e:#}");
                Vec::new()
            }
        };

        let new = diff(&candidates, &seen, self.config.dedup_within_pass);

        let mut report = PassReport {
            candidates: candidates.len(),
            new: new.len(),
            ..Default::default()
        };

        if new.is_empty() {
            info!("No new announcements found");
            if self.config.heartbeat_on_empty {
                match self.notifier.notify(&message::heartbeat_body()).await {
                    Ok(sid) => info!("Heartbeat sent: {sid}"),
                    Err(e) => error!("Error sending heartbeat: {e}"),
                }
            }
        } else {
            info!("New announcements to notify: {}", new.len());
        }

        for announcement in &new {
            match self
                .notifier
                .notify(&message::announcement_body(announcement))
                .await
            {
                Ok(sid) => {
                    info!("Notified \"{}\" ({sid})", announcement.title);
                    report.sent += 1;
                }
                Err(e) => {
                    error!("Error sending message for {}: {e}", announcement.link);
                    report.failed += 1;
                }
            }

            // Marked seen even when the send failed, otherwise a flaky
            // provider re-notifies the same announcement every pass.
            seen.insert(announcement.link.clone());
        }

        if self.config.persist_always || !new.is_empty() {
            match self.store.save(&seen).await {
                Ok(()) => report.persisted = true,
                Err(e) => error!("Error saving memory: {e:#}"),
            }
        }

        report
    }
}

/// Candidates whose links are not in the seen set, in fetch order.
///
/// With `dedup_within_pass`, repeated links within the same fetch keep only
/// their first occurrence.
fn diff(candidates: &[Announcement], seen: &SeenSet, dedup_within_pass: bool) -> Vec<Announcement> {
    let mut new = Vec::new();
    let mut picked: HashSet<&str> = HashSet::new();

    for candidate in candidates {
        if seen.contains(&candidate.link) {
            continue;
        }
        if dedup_within_pass && !picked.insert(candidate.link.as_str()) {
            continue;
        }
        new.push(candidate.clone());
    }

    new
}
