//! Per-region acquisition: the select/submit/extract/validate walk over
//! the fixed region set.
//!
//! Each region runs through an explicit state machine with a bounded
//! attempt budget. Regions that never produce acceptable data are dropped
//! from the cycle's map and the walk moves on; a partial map is an
//! expected outcome, not an error. Regions are visited strictly one at a
//! time: the upstream session holds a single "currently selected region"
//! query state, so concurrent queries against it are unsafe.

use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;

use crate::capture;
use crate::engine::ExtractionEngine;
use crate::traits::PageAccessor;
use crate::types::{Region, ScraperConfig, Sweep, Tally};

/// States of one region's acquisition.
#[derive(Debug)]
enum AcquireState {
    /// Resolve the region's dropdown code.
    Select,
    /// Drive the dropdown and the query control.
    Submit { code: String },
    /// Settle delay for asynchronous rendering.
    Wait { code: String },
    /// Capture a snapshot and run the extraction engine.
    Extract { code: String },
    /// Apply the acceptance criteria.
    Validate { code: String, tally: Tally },
    /// Back off, then re-drive the query.
    Backoff { code: String },
}

/// Terminal outcome of one region's acquisition.
#[derive(Debug)]
pub enum RegionOutcome {
    /// Acceptance criteria met.
    Accepted(Tally),
    /// No entry in the region→code table: a configuration defect, failed
    /// immediately without retry.
    NoCodeMapping,
    /// Attempt budget spent without acceptance.
    Exhausted { attempts: u32 },
}

/// Drives the extraction engine across the fixed region set.
pub struct RegionScanner {
    engine: ExtractionEngine,
    config: ScraperConfig,
}

impl RegionScanner {
    pub fn new(config: ScraperConfig) -> Self {
        Self {
            engine: ExtractionEngine::new(&config),
            config,
        }
    }

    /// Run one full acquisition cycle: an umbrella readout of whatever the
    /// page currently shows, then every region in dropdown order.
    ///
    /// Cancellation is observed between regions; a sweep interrupted that
    /// way is flagged so the caller can skip persisting it.
    pub async fn sweep(&self, page: &dyn PageAccessor, cancel: &CancellationToken) -> Sweep {
        let umbrella = self.umbrella_readout(page).await;

        let mut regions = IndexMap::new();
        let mut interrupted = false;

        for region in Region::ALL {
            if cancel.is_cancelled() {
                tracing::info!("cancellation observed, stopping region walk");
                interrupted = true;
                break;
            }
            match self.acquire(page, region).await {
                RegionOutcome::Accepted(tally) => {
                    tracing::info!(
                        region = %region,
                        actas_pct = tally.actas_pct,
                        votes = tally.total_votes(),
                        candidates = tally.candidates.len(),
                        "region accepted"
                    );
                    regions.insert(region, tally);
                }
                RegionOutcome::NoCodeMapping => {
                    tracing::warn!(region = %region, "no code mapping, region omitted");
                }
                RegionOutcome::Exhausted { attempts } => {
                    tracing::warn!(region = %region, attempts, "region exhausted, omitted");
                }
            }
        }

        let mut sweep = Sweep::new(regions, umbrella);
        sweep.interrupted = interrupted;
        sweep
    }

    /// Page-wide national readout, taken before any region is selected.
    /// Overlaps the per-region data and is therefore display-only.
    async fn umbrella_readout(&self, page: &dyn PageAccessor) -> Option<Tally> {
        let snapshot = capture::capture(page).await;
        let tally = self.engine.extract(&snapshot);
        (!tally.is_empty()).then_some(tally)
    }

    /// Run one region to a terminal outcome.
    pub async fn acquire(&self, page: &dyn PageAccessor, region: Region) -> RegionOutcome {
        let budget = self.config.attempt_budget(region);
        let mut attempt: u32 = 1;
        let mut state = AcquireState::Select;

        loop {
            state = match state {
                AcquireState::Select => match self.config.region_codes.get(&region) {
                    Some(code) => AcquireState::Submit { code: code.clone() },
                    None => return RegionOutcome::NoCodeMapping,
                },

                AcquireState::Submit { code } => {
                    match self.drive_query(page, &code).await {
                        Ok(()) => AcquireState::Wait { code },
                        Err(reason) => {
                            tracing::debug!(region = %region, attempt, reason, "submit failed");
                            AcquireState::Backoff { code }
                        }
                    }
                }

                AcquireState::Wait { code } => {
                    tokio::time::sleep(self.config.submit_settle()).await;
                    AcquireState::Extract { code }
                }

                AcquireState::Extract { code } => {
                    let snapshot = capture::capture(page).await;
                    let tally = self.engine.extract(&snapshot);
                    AcquireState::Validate { code, tally }
                }

                AcquireState::Validate { code, tally } => {
                    if self.accepts(region, &tally) {
                        return RegionOutcome::Accepted(tally);
                    }
                    tracing::debug!(
                        region = %region,
                        attempt,
                        candidates = tally.candidates.len(),
                        votes = tally.total_votes(),
                        "snapshot rejected"
                    );
                    AcquireState::Backoff { code }
                }

                AcquireState::Backoff { code } => {
                    if attempt >= budget {
                        return RegionOutcome::Exhausted { attempts: attempt };
                    }
                    attempt += 1;
                    tokio::time::sleep(self.config.retry_backoff()).await;
                    AcquireState::Submit { code }
                }
            };
        }
    }

    /// Select the region and fire the query, with the short post-select
    /// settle. Backend errors and missing controls both read as a failed
    /// attempt.
    async fn drive_query(&self, page: &dyn PageAccessor, code: &str) -> Result<(), &'static str> {
        match page.select_option(code).await {
            Ok(true) => {}
            Ok(false) => return Err("region dropdown not found"),
            Err(_) => return Err("select failed"),
        }
        tokio::time::sleep(self.config.select_settle()).await;
        match page.submit().await {
            Ok(true) => Ok(()),
            Ok(false) => Err("submit control not found"),
            Err(_) => Err("submit failed"),
        }
    }

    /// Acceptance criteria. Ordinary regions need at least two candidates
    /// and at least one vote; the exterior pseudo-region is legitimately
    /// low-turnout and accepts on candidate count alone.
    fn accepts(&self, region: Region, tally: &Tally) -> bool {
        if tally.candidates.len() < self.config.min_candidates {
            return false;
        }
        region.is_exterior() || tally.total_votes() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CandidateTally;

    fn scanner() -> RegionScanner {
        RegionScanner::new(ScraperConfig::default().without_delays())
    }

    fn tally(votes: &[u64]) -> Tally {
        Tally::new(
            10.0,
            votes
                .iter()
                .enumerate()
                .map(|(i, v)| CandidateTally::new(format!("P{i}"), *v))
                .collect(),
        )
    }

    #[test]
    fn ordinary_region_needs_votes() {
        let s = scanner();
        assert!(s.accepts(Region::Cortes, &tally(&[100, 50])));
        assert!(!s.accepts(Region::Cortes, &tally(&[0, 0])));
        assert!(!s.accepts(Region::Cortes, &tally(&[100])));
    }

    #[test]
    fn exterior_accepts_zero_votes() {
        let s = scanner();
        assert!(s.accepts(Region::VotoExterior, &tally(&[0, 0])));
        assert!(!s.accepts(Region::VotoExterior, &tally(&[0])));
    }
}
