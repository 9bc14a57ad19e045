//! Periodic refresh driven by the configured update interval.
//!
//! The interval comes from the reader's settings and can change while the
//! scheduler runs; a change reschedules the next refresh from the moment it
//! was made. An interval of 0 disables automatic refresh until it is set
//! again.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::app::{EddyError, Reader};
use crate::settings::interval_from_minutes;

pub struct Scheduler {
    reader: Arc<Reader>,
    refresh_on_start: bool,
}

impl Scheduler {
    pub fn new(reader: Arc<Reader>, refresh_on_start: bool) -> Self {
        Self {
            reader,
            refresh_on_start,
        }
    }

    /// Run until `shutdown` completes.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut interval = self.reader.interval_watch();

        info!("Scheduler started (interval: {} min)", *interval.borrow());

        if self.refresh_on_start {
            self.tick().await;
        }

        loop {
            let period = interval_from_minutes(*interval.borrow_and_update());

            tokio::select! {
                _ = &mut shutdown => break,
                changed = interval.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    debug!("Update interval changed to {} min", *interval.borrow());
                }
                _ = async {
                    match period {
                        Some(period) => sleep(period).await,
                        None => std::future::pending().await,
                    }
                } => self.tick().await,
            }
        }

        info!("Scheduler shutting down");
    }

    /// Run one refresh and log the outcome.
    pub async fn tick(&self) {
        let start = Instant::now();
        match self.reader.refresh().await {
            Ok(report) => {
                for (feed, error) in &report.failed {
                    warn!("  Error updating {}: {}", feed, error);
                }
                info!(
                    "Update complete: {} new items, {} errors ({:.1}s)",
                    report.new_items,
                    report.failed.len(),
                    start.elapsed().as_secs_f64()
                );
            }
            Err(EddyError::RefreshInProgress) => debug!("Refresh already running, skipping"),
            Err(e) => warn!("Scheduled refresh failed: {}", e),
        }
    }
}
