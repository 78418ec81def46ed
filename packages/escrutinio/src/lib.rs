//! Election-Night Scrutiny Watcher
//!
//! Extracts live election results from a dynamic results page that exposes
//! no stable API, normalizes them into canonical per-region vote records,
//! projects final totals from partial tabulation, and aggregates a national
//! ranking backed by a snapshot cache and an append-only historical log.
//!
//! # Design Philosophy
//!
//! **Degrade, don't abort**
//!
//! - The page's structure cannot be trusted, so extraction is an ordered
//!   list of independent strategies behind one contract; a snapshot nothing
//!   recognizes is a valid empty result, not an error
//! - Regions that never produce acceptable data are dropped for the cycle;
//!   a partial map is an expected outcome
//! - A cycle that produces nothing falls back to the cached snapshot,
//!   clearly flagged stale
//! - Only explicit cancellation stops the loop
//!
//! # Usage
//!
//! ```rust,ignore
//! use escrutinio::{Orchestrator, RemoteApiAccessor, ScraperConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = ScraperConfig::default().with_data_dir("./data");
//! let page = RemoteApiAccessor::new(&config)?;
//! let cancel = CancellationToken::new();
//! Orchestrator::new(page, config, cancel).run().await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - The page-accessor capability seam
//! - [`types`] - Regions, tallies, sweeps, projections, configuration
//! - [`engine`] - Multi-strategy result extraction
//! - [`acquire`] - Per-region acquisition state machine
//! - [`projection`] - Projection arithmetic and national aggregation
//! - [`store`] - Snapshot cache, markers, historical log
//! - [`analysis`] - Offline statistics over the historical log
//! - [`testing`] - Scripted accessor double for tests

pub mod accessors;
pub mod acquire;
pub mod analysis;
pub mod capture;
pub mod display;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod projection;
pub mod store;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{AccessError, ScrapeError, StoreError};
pub use traits::PageAccessor;
pub use types::{
    CachedResults, CandidateProjection, CandidateTally, DomSnapshot, HistoricalEntry,
    HistoricalSample, Region, ScraperConfig, SnapshotSource, Sweep, Tally,
};

pub use accessors::RemoteApiAccessor;
pub use acquire::{RegionOutcome, RegionScanner};
pub use engine::ExtractionEngine;
pub use orchestrator::Orchestrator;
pub use projection::{project, ProjectionCalculator};
pub use store::ResultStore;
