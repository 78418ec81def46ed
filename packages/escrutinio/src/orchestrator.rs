//! The acquisition-cycle loop.
//!
//! Owns the one shared page session for the duration of each cycle,
//! sequences acquisition, projection, persistence and presentation, and
//! waits between cycles in short polls so a re-scrape trigger or a
//! cancellation is observed promptly. Every data-quality problem degrades
//! to "fewer results this cycle" or to re-displaying the cached snapshot;
//! only cancellation ends the loop.

use tokio_util::sync::CancellationToken;

use crate::acquire::RegionScanner;
use crate::capture;
use crate::display;
use crate::engine::payload;
use crate::projection::ProjectionCalculator;
use crate::store::ResultStore;
use crate::traits::PageAccessor;
use crate::types::{Region, ScraperConfig, SnapshotSource, Sweep, Tally};

pub struct Orchestrator<A: PageAccessor> {
    page: A,
    scanner: RegionScanner,
    calculator: ProjectionCalculator,
    store: ResultStore,
    config: ScraperConfig,
    cancel: CancellationToken,
}

impl<A: PageAccessor> Orchestrator<A> {
    pub fn new(page: A, config: ScraperConfig, cancel: CancellationToken) -> Self {
        Self {
            page,
            calculator: ProjectionCalculator::new(&config),
            store: ResultStore::new(&config),
            scanner: RegionScanner::new(config.clone()),
            config,
            cancel,
        }
    }

    /// Run cycles until cancelled.
    pub async fn run(&self) {
        tracing::info!(
            interval_secs = self.config.check_interval_secs,
            "starting acquisition loop"
        );
        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            self.run_once().await;
            if !self.wait_for_next_cycle().await {
                break;
            }
        }
        tracing::info!("acquisition loop stopped");
    }

    /// One full cycle: acquire, project, persist or fall back.
    pub async fn run_once(&self) {
        tracing::info!("fetching updated data");

        let sweep = self.acquire_sweep().await;
        if sweep.interrupted {
            tracing::info!("cycle interrupted before completion, nothing persisted");
            return;
        }

        let projection = self.calculator.national(&sweep);
        if projection.is_empty() {
            tracing::warn!("cycle produced no usable projection");
            self.show_cached();
            return;
        }

        println!("{}", display::department_table(&sweep));
        println!("{}", display::national_summary(&projection));

        if let Err(e) = self.store.write_snapshot(&sweep, &projection) {
            tracing::error!("could not cache snapshot: {e}");
        }
        let sample = crate::types::HistoricalSample::from_cycle(&sweep, &projection);
        if let Err(e) = self.store.append_history(&sample) {
            tracing::error!("could not append history: {e}");
        }
    }

    /// Acquire this cycle's sweep: a multi-region payload from the direct
    /// probe wins outright, otherwise the region-by-region walk runs.
    async fn acquire_sweep(&self) -> Sweep {
        if let Some(sweep) = self.payload_sweep().await {
            tracing::info!(regions = sweep.regions.len(), "using direct-payload sweep");
            return sweep;
        }
        self.scanner.sweep(&self.page, &self.cancel).await
    }

    /// Try to turn one captured payload into a full sweep without driving
    /// the page. Region names the closed set does not know are logged and
    /// skipped; the source's own national aggregate becomes the umbrella.
    async fn payload_sweep(&self) -> Option<Sweep> {
        let SnapshotSource::Payload(value) = capture::capture(&self.page).await else {
            return None;
        };
        let parsed = payload::regional_map(&value);
        if parsed.is_empty() {
            return None;
        }

        let mut regions = indexmap::IndexMap::new();
        let mut umbrella: Option<Tally> = None;
        for (name, tally) in parsed {
            match Region::from_name(&name) {
                Some(region) => {
                    regions.insert(region, tally);
                }
                None if name.eq_ignore_ascii_case("nacional") => umbrella = Some(tally),
                None => tracing::warn!(region = %name, "payload names unknown region, skipped"),
            }
        }
        if regions.is_empty() {
            return None;
        }
        Some(Sweep::new(regions, umbrella))
    }

    fn show_cached(&self) {
        match self.store.read_snapshot() {
            Ok(Some(cached)) => println!("{}", display::stale_banner(&cached)),
            Ok(None) => println!("No data available yet and no cached snapshot to fall back on."),
            Err(e) => tracing::error!("could not read cached snapshot: {e}"),
        }
    }

    /// The inter-cycle wait, polled in sub-intervals. Returns false when
    /// cancellation ended the loop; a consumed re-scrape trigger
    /// short-circuits the remaining wait.
    async fn wait_for_next_cycle(&self) -> bool {
        let interval = self.config.check_interval();
        let poll = self.config.poll_interval().min(interval).max(
            // A zero poll would spin; clamp to something cooperative.
            std::time::Duration::from_millis(1),
        );
        let mut waited = std::time::Duration::ZERO;

        while waited < interval {
            tokio::select! {
                _ = self.cancel.cancelled() => return false,
                _ = tokio::time::sleep(poll) => {}
            }
            waited += poll;
            if self.store.take_trigger() {
                tracing::info!("re-scrape trigger observed, starting next cycle early");
                break;
            }
        }
        true
    }
}
