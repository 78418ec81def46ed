//! Configuration for an acquisition run.
//!
//! Every threshold the loop depends on (retry budgets, settle delays,
//! acceptance minima, file locations, the region-to-code table) lives
//! here, named and overridable, instead of being scattered as ad hoc
//! constants.

use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::region::Region;

/// Configuration for the scrutiny watcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Results-presentation page the session is expected to sit on.
    pub base_url: String,

    /// Candidate JSON endpoints for the direct-payload probe, tried in
    /// order. A `{code}` placeholder, if present, is replaced with the
    /// currently selected region code.
    #[serde(default)]
    pub api_endpoints: Vec<String>,

    /// Region → dropdown value code.
    ///
    /// Shipped as data, not as a method on [`Region`]: a region missing
    /// from this table is a configuration defect and fails immediately,
    /// without retry and without guessing a code.
    pub region_codes: IndexMap<Region, String>,

    /// Total attempts for an ordinary region before it is given up for
    /// the cycle. Default: 10.
    pub max_attempts: u32,

    /// Total attempts for the exterior pseudo-region. Default: 1.
    pub exterior_attempts: u32,

    /// Minimum candidate count for a strategy result or a region snapshot
    /// to be considered usable. Default: 2.
    pub min_candidates: usize,

    /// Tallies below this vote count are dropped at aggregation time as
    /// extraction noise. Never applied during raw per-region extraction.
    /// Default: 100.
    pub noise_floor: u64,

    /// Minimum votes for a free-text regex match to be believed (guards
    /// against picking up percentages or IDs). Default: 100.
    pub freetext_floor: u64,

    /// Settle delay after selecting a region in the dropdown, in
    /// milliseconds. Default: 500.
    pub select_settle_ms: u64,

    /// Settle delay after submitting a query, for asynchronous rendering
    /// of results, in milliseconds. Default: 8000.
    pub submit_settle_ms: u64,

    /// Backoff between attempts on the same region, in milliseconds.
    /// Default: 2000.
    pub retry_backoff_ms: u64,

    /// Wait between acquisition cycles, in seconds. Default: 120.
    pub check_interval_secs: u64,

    /// Sub-interval at which the inter-cycle wait polls for the re-scrape
    /// trigger and for cancellation, in seconds. Default: 5.
    pub poll_interval_secs: u64,

    /// Latest-snapshot cache document.
    pub cache_path: PathBuf,

    /// Append-only historical log.
    pub history_path: PathBuf,

    /// Change-signal marker touched after every cache write.
    pub signal_path: PathBuf,

    /// Re-scrape trigger marker, consumed when observed.
    pub trigger_path: PathBuf,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://resultadosgenerales2025.cne.hn/results-presentation".into(),
            api_endpoints: vec![
                "https://resultadosgenerales2025.cne.hn/api/results".into(),
                "https://resultadosgenerales2025.cne.hn/api/actas".into(),
                "https://resultadosgenerales2025.cne.hn/api/presidential".into(),
            ],
            region_codes: default_region_codes(),
            max_attempts: 10,
            exterior_attempts: 1,
            min_candidates: 2,
            noise_floor: 100,
            freetext_floor: 100,
            select_settle_ms: 500,
            submit_settle_ms: 8_000,
            retry_backoff_ms: 2_000,
            check_interval_secs: 120,
            poll_interval_secs: 5,
            cache_path: PathBuf::from("last_results.json"),
            history_path: PathBuf::from("historical_data.csv"),
            signal_path: PathBuf::from(".data_updated"),
            trigger_path: PathBuf::from(".trigger_scrape"),
        }
    }
}

impl ScraperConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the results page URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Root all data files (cache, history, markers) under one directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.cache_path = dir.join("last_results.json");
        self.history_path = dir.join("historical_data.csv");
        self.signal_path = dir.join(".data_updated");
        self.trigger_path = dir.join(".trigger_scrape");
        self
    }

    /// Set the inter-cycle wait.
    pub fn with_check_interval_secs(mut self, secs: u64) -> Self {
        self.check_interval_secs = secs;
        self
    }

    /// Set the per-region retry budget.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Replace the region→code table.
    pub fn with_region_codes(mut self, codes: IndexMap<Region, String>) -> Self {
        self.region_codes = codes;
        self
    }

    /// Zero out all settle delays and backoffs. Test configs use this so a
    /// full retry budget runs in microseconds.
    pub fn without_delays(mut self) -> Self {
        self.select_settle_ms = 0;
        self.submit_settle_ms = 0;
        self.retry_backoff_ms = 0;
        self
    }

    /// Attempt budget for a given region.
    pub fn attempt_budget(&self, region: Region) -> u32 {
        if region.is_exterior() {
            self.exterior_attempts
        } else {
            self.max_attempts
        }
    }

    pub fn select_settle(&self) -> Duration {
        Duration::from_millis(self.select_settle_ms)
    }

    pub fn submit_settle(&self) -> Duration {
        Duration::from_millis(self.submit_settle_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// The confirmed region→code mappings, as published by the source.
///
/// Code `19` is absent upstream: the numbering jumps from YORO (`18`) to the
/// exterior vote (`20`). Nothing here may invent a code for an entry the
/// source does not confirm.
pub fn default_region_codes() -> IndexMap<Region, String> {
    let mut codes = IndexMap::new();
    codes.insert(Region::Atlantida, "01".to_string());
    codes.insert(Region::Colon, "02".to_string());
    codes.insert(Region::Comayagua, "03".to_string());
    codes.insert(Region::Copan, "04".to_string());
    codes.insert(Region::Cortes, "05".to_string());
    codes.insert(Region::Choluteca, "06".to_string());
    codes.insert(Region::ElParaiso, "07".to_string());
    codes.insert(Region::FranciscoMorazan, "08".to_string());
    codes.insert(Region::GraciasADios, "09".to_string());
    codes.insert(Region::Intibuca, "10".to_string());
    codes.insert(Region::IslasDeLaBahia, "11".to_string());
    codes.insert(Region::LaPaz, "12".to_string());
    codes.insert(Region::Lempira, "13".to_string());
    codes.insert(Region::Ocotepeque, "14".to_string());
    codes.insert(Region::Olancho, "15".to_string());
    codes.insert(Region::SantaBarbara, "16".to_string());
    codes.insert(Region::Valle, "17".to_string());
    codes.insert(Region::Yoro, "18".to_string());
    codes.insert(Region::VotoExterior, "20".to_string());
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_region_has_a_default_code() {
        let codes = default_region_codes();
        for region in Region::ALL {
            assert!(codes.contains_key(&region), "missing code for {region}");
        }
    }

    #[test]
    fn exterior_gets_one_attempt() {
        let config = ScraperConfig::default();
        assert_eq!(config.attempt_budget(Region::VotoExterior), 1);
        assert_eq!(config.attempt_budget(Region::Cortes), 10);
    }

    #[test]
    fn data_dir_roots_all_files() {
        let config = ScraperConfig::default().with_data_dir("/tmp/electoral");
        assert!(config.cache_path.starts_with("/tmp/electoral"));
        assert!(config.trigger_path.starts_with("/tmp/electoral"));
    }
}
