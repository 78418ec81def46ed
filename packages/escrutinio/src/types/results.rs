//! Result records produced by one acquisition cycle.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::region::Region;

/// Votes reported for one candidate in one region at the current level of
/// scrutiny.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTally {
    /// Candidate or party label, as rendered by the source. Non-empty.
    pub name: String,
    /// Reported vote count.
    pub votes: u64,
}

impl CandidateTally {
    pub fn new(name: impl Into<String>, votes: u64) -> Self {
        Self {
            name: name.into(),
            votes,
        }
    }
}

/// One extracted result set: completion percentage plus candidate tallies
/// in extraction order (not yet rank-sorted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    /// Share of polling-station certificates already tabulated, in [0, 100].
    #[serde(rename = "actas_percentage")]
    pub actas_pct: f64,
    /// Candidate tallies in the order the extractor found them.
    pub candidates: Vec<CandidateTally>,
}

impl Tally {
    pub fn new(actas_pct: f64, candidates: Vec<CandidateTally>) -> Self {
        Self {
            actas_pct,
            candidates,
        }
    }

    /// The "no data yet" result. Not an error.
    pub fn empty() -> Self {
        Self {
            actas_pct: 0.0,
            candidates: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Sum of reported votes across candidates.
    pub fn total_votes(&self) -> u64 {
        self.candidates.iter().map(|c| c.votes).sum()
    }
}

/// Everything one acquisition cycle collected.
///
/// `regions` holds only regions that were accepted this cycle; a partial
/// map is a valid, expected outcome. `umbrella` is the page-wide national
/// readout; it overlaps the per-region breakdowns and is carried for
/// display only, never as an aggregation summand.
#[derive(Debug, Clone)]
pub struct Sweep {
    pub regions: IndexMap<Region, Tally>,
    pub umbrella: Option<Tally>,
    pub collected_at: DateTime<Utc>,
    /// Set when cancellation stopped the walk before it finished; an
    /// interrupted sweep is never persisted.
    pub interrupted: bool,
}

impl Sweep {
    pub fn new(regions: IndexMap<Region, Tally>, umbrella: Option<Tally>) -> Self {
        Self {
            regions,
            umbrella,
            collected_at: Utc::now(),
            interrupted: false,
        }
    }

    /// Mean completion percentage over the accepted regions, 0 when no
    /// region was accepted. The umbrella readout does not participate.
    pub fn avg_actas_pct(&self) -> f64 {
        if self.regions.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.regions.values().map(|t| t.actas_pct).sum();
        sum / self.regions.len() as f64
    }
}

/// One candidate's national standing, derived each cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProjection {
    pub candidate: String,
    /// Votes actually reported so far, summed across regions.
    pub current_votes: u64,
    /// Projected final votes, summed across per-region projections.
    pub projected_votes: u64,
    /// Share of the total projected vote, rounded to 2 decimals.
    pub percentage: f64,
    /// 1-based rank by descending projected votes.
    pub rank: usize,
}

/// One line of the append-only historical log.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSample {
    pub timestamp: DateTime<Utc>,
    pub avg_actas_pct: f64,
    /// Up to three leading candidates; the log always writes exactly three
    /// slots, blank-padded.
    pub top: Vec<HistoricalEntry>,
}

/// One candidate slot within a historical sample.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalEntry {
    pub candidate: String,
    pub current_votes: u64,
    pub projected_votes: u64,
    pub percentage: f64,
}

impl HistoricalSample {
    /// Build the sample for a completed cycle from its sweep and ranking.
    pub fn from_cycle(sweep: &Sweep, projection: &[CandidateProjection]) -> Self {
        Self {
            timestamp: sweep.collected_at,
            avg_actas_pct: sweep.avg_actas_pct(),
            top: projection
                .iter()
                .take(3)
                .map(|p| HistoricalEntry {
                    candidate: p.candidate.clone(),
                    current_votes: p.current_votes,
                    projected_votes: p.projected_votes,
                    percentage: p.percentage,
                })
                .collect(),
        }
    }
}

/// The latest-snapshot cache document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResults {
    /// Accepted region snapshots, keyed by region display name.
    pub departments: IndexMap<Region, Tally>,
    /// National ranking as of this snapshot.
    pub projection: Vec<CandidateProjection>,
    /// When this snapshot was written.
    pub cached_at: DateTime<Utc>,
}
