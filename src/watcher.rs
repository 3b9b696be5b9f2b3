use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::model::ChangeEvent;
use crate::notify::ChannelSink;
use crate::store::SnapshotStore;
use crate::{diff, listing, report};

/// Runs the observe-diff-report-persist cycle against one watched URL.
/// Ticks are strictly sequential; there is no internal locking.
pub struct Watcher {
    url: String,
    store: SnapshotStore,
    client: reqwest::blocking::Client,
}

impl Watcher {
    pub fn new(url: impl Into<String>, store: SnapshotStore) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("mirrorwatch")
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            url: url.into(),
            store,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the raw listing body. A transport error or non-2xx status
    /// makes this tick's observation fail; the persisted snapshot stays
    /// authoritative for the next tick.
    pub fn fetch_listing(&self) -> Result<String> {
        self.client
            .get(&self.url)
            .send()
            .context("fetch listing")?
            .error_for_status()
            .context("fetch listing status")?
            .text()
            .context("read listing body")
    }

    /// One full observation against already-fetched listing text: parse,
    /// diff against the stored snapshot, report through `sink`, persist.
    ///
    /// The new snapshot is saved unconditionally, even with zero changes
    /// or a failed delivery, so the stored baseline always equals the last
    /// observation. Report and save failures are logged, never propagated.
    pub fn observe(&self, raw: &str, sink: Option<&dyn ChannelSink>) -> Vec<ChangeEvent> {
        let current = listing::parse(raw);
        let previous = self.store.load();
        let events = diff::diff(&previous, &current);

        if events.is_empty() {
            info!(url = %self.url, entries = current.len(), "no changes detected");
        } else {
            info!(url = %self.url, changes = events.len(), "changes detected");
            match sink {
                Some(sink) => {
                    for chunk in report::format(&self.url, &events) {
                        if let Err(err) = sink.post(&chunk) {
                            warn!(%err, "failed to post change report, dropping remaining chunks");
                            break;
                        }
                    }
                }
                None => warn!(
                    changes = events.len(),
                    "no destination channel, dropping change report"
                ),
            }
        }

        if let Err(err) = self.store.save(&current) {
            error!(%err, "failed to persist snapshot, next diff will use stale state");
        }
        events
    }

    /// One scheduled tick: fetch, then observe. A fetch failure aborts the
    /// tick before parse/diff/persist.
    pub fn tick(&self, sink: Option<&dyn ChannelSink>) -> Result<Vec<ChangeEvent>> {
        info!(url = %self.url, "checking for updates");
        let raw = self.fetch_listing()?;
        Ok(self.observe(&raw, sink))
    }

    /// Ticks immediately, then every `interval`, forever. A failed tick is
    /// logged and never stops the schedule.
    pub fn run(&self, interval: Duration, sink: Option<&dyn ChannelSink>) -> ! {
        loop {
            if let Err(err) = self.tick(sink) {
                error!(err = format!("{err:#}"), "tick failed");
            }
            std::thread::sleep(interval);
        }
    }
}
