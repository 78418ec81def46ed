//! Core data types: regions, tallies, sweeps, projections, configuration.

pub mod config;
pub mod region;
pub mod results;
pub mod snapshot;

pub use config::{default_region_codes, ScraperConfig};
pub use region::Region;
pub use results::{
    CachedResults, CandidateProjection, CandidateTally, HistoricalEntry, HistoricalSample, Sweep,
    Tally,
};
pub use snapshot::{DomSnapshot, SnapshotSource};
