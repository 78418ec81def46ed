//! The result store: latest-snapshot cache, change-signal and re-scrape
//! markers, and the append-only historical log.
//!
//! One process writes these files, once per cycle. External consumers read
//! them uncoordinated: the change-signal marker tells them a new snapshot
//! exists, and they must tolerate reading one that is about to be
//! superseded. Eventual consistency, not transactions.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::{StoreError, StoreResult};
use crate::types::{
    CachedResults, CandidateProjection, HistoricalEntry, HistoricalSample, ScraperConfig, Sweep,
};

/// Fields per history record: timestamp, average completion, then three
/// candidate slots of four fields each.
const HISTORY_FIELDS: usize = 14;

fn history_header() -> String {
    let mut cols = vec!["timestamp".to_string(), "avg_actas_pct".to_string()];
    for i in 1..=3 {
        cols.push(format!("candidato_{i}"));
        cols.push(format!("votos_actuales_{i}"));
        cols.push(format!("votos_proyectados_{i}"));
        cols.push(format!("porcentaje_{i}"));
    }
    cols.join(",")
}

/// Quote a CSV field only when it needs it.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Split one CSV record, honoring quoted fields.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Owns the cycle outputs on disk.
pub struct ResultStore {
    cache_path: PathBuf,
    history_path: PathBuf,
    signal_path: PathBuf,
    trigger_path: PathBuf,
}

impl ResultStore {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            cache_path: config.cache_path.clone(),
            history_path: config.history_path.clone(),
            signal_path: config.signal_path.clone(),
            trigger_path: config.trigger_path.clone(),
        }
    }

    /// Persist the latest full snapshot, overwriting any previous one, and
    /// touch the change-signal marker so downstream consumers reload.
    pub fn write_snapshot(
        &self,
        sweep: &Sweep,
        projection: &[CandidateProjection],
    ) -> StoreResult<CachedResults> {
        let document = CachedResults {
            departments: sweep.regions.clone(),
            projection: projection.to_vec(),
            cached_at: Utc::now(),
        };
        fs::write(&self.cache_path, serde_json::to_string_pretty(&document)?)?;
        fs::write(&self.signal_path, document.cached_at.to_rfc3339())?;
        tracing::debug!(path = %self.cache_path.display(), "snapshot cached");
        Ok(document)
    }

    /// The most recent stored snapshot, or None if never written.
    pub fn read_snapshot(&self) -> StoreResult<Option<CachedResults>> {
        if !self.cache_path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.cache_path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Append one sample to the historical log.
    ///
    /// The column header is written exactly once, when the file is
    /// created, and never again. Every record carries exactly three
    /// candidate slots, blank-padded when the ranking is thinner.
    pub fn append_history(&self, sample: &HistoricalSample) -> StoreResult<()> {
        let is_new = !self.history_path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.history_path)?;

        if is_new {
            writeln!(file, "{}", history_header())?;
        }

        let mut fields = vec![
            sample.timestamp.to_rfc3339(),
            format!("{:.2}", sample.avg_actas_pct),
        ];
        for slot in 0..3 {
            match sample.top.get(slot) {
                Some(entry) => {
                    fields.push(csv_field(&entry.candidate));
                    fields.push(entry.current_votes.to_string());
                    fields.push(entry.projected_votes.to_string());
                    fields.push(format!("{:.2}", entry.percentage));
                }
                None => {
                    fields.push(String::new());
                    fields.push("0".to_string());
                    fields.push("0".to_string());
                    fields.push("0.00".to_string());
                }
            }
        }
        debug_assert_eq!(fields.len(), HISTORY_FIELDS);
        writeln!(file, "{}", fields.join(","))?;
        Ok(())
    }

    /// Parse the historical log back into samples. Blank-padded slots are
    /// dropped from `top`.
    pub fn read_history(&self) -> StoreResult<Vec<HistoricalSample>> {
        if !self.history_path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.history_path)?;
        let mut samples = Vec::new();
        for (idx, line) in raw.lines().enumerate() {
            if idx == 0 || line.trim().is_empty() {
                continue;
            }
            let fields = split_record(line);
            if fields.len() != HISTORY_FIELDS {
                return Err(StoreError::MalformedHistory {
                    line: idx + 1,
                    reason: format!("expected {HISTORY_FIELDS} fields, found {}", fields.len()),
                });
            }
            let timestamp = DateTime::parse_from_rfc3339(&fields[0])
                .map_err(|e| StoreError::MalformedHistory {
                    line: idx + 1,
                    reason: format!("bad timestamp: {e}"),
                })?
                .with_timezone(&Utc);
            let avg_actas_pct = fields[1].parse().unwrap_or(0.0);
            let mut top = Vec::new();
            for slot in 0..3 {
                let base = 2 + slot * 4;
                let candidate = fields[base].trim();
                if candidate.is_empty() {
                    continue;
                }
                top.push(HistoricalEntry {
                    candidate: candidate.to_string(),
                    current_votes: fields[base + 1].parse().unwrap_or(0),
                    projected_votes: fields[base + 2].parse().unwrap_or(0),
                    percentage: fields[base + 3].parse().unwrap_or(0.0),
                });
            }
            samples.push(HistoricalSample {
                timestamp,
                avg_actas_pct,
                top,
            });
        }
        Ok(samples)
    }

    /// Rewrite the percentage columns of the historical log with exactly
    /// two decimals. The one sanctioned rewrite of the log, for files
    /// produced before the formatting rule existed.
    pub fn reformat_history_decimals(&self) -> StoreResult<usize> {
        if !self.history_path.exists() {
            return Ok(0);
        }
        let raw = fs::read_to_string(&self.history_path)?;
        let mut lines = raw.lines();
        let Some(header) = lines.next() else {
            return Ok(0);
        };

        let mut out = vec![header.to_string()];
        let mut rewritten = 0;
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = split_record(line);
            for idx in [1, 5, 9, 13] {
                if let Some(field) = fields.get_mut(idx) {
                    if let Ok(value) = field.parse::<f64>() {
                        *field = format!("{value:.2}");
                    }
                }
            }
            out.push(
                fields
                    .iter()
                    .map(|f| csv_field(f))
                    .collect::<Vec<_>>()
                    .join(","),
            );
            rewritten += 1;
        }
        fs::write(&self.history_path, out.join("\n") + "\n")?;
        Ok(rewritten)
    }

    /// Whether a re-scrape was requested. Consumes the trigger marker:
    /// each request is observed at most once.
    pub fn take_trigger(&self) -> bool {
        if self.trigger_path.exists() {
            if let Err(e) = fs::remove_file(&self.trigger_path) {
                tracing::warn!("could not consume trigger marker: {e}");
                return false;
            }
            return true;
        }
        false
    }

    /// Drop the re-scrape trigger marker for a running instance to pick up.
    pub fn request_rescrape(&self) -> StoreResult<()> {
        fs::write(&self.trigger_path, Utc::now().to_rfc3339())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CandidateTally, Region, Tally};
    use indexmap::IndexMap;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ResultStore {
        ResultStore::new(&ScraperConfig::default().with_data_dir(dir.path()))
    }

    fn sample(names: &[&str]) -> HistoricalSample {
        HistoricalSample {
            timestamp: Utc::now(),
            avg_actas_pct: 43.21,
            top: names
                .iter()
                .map(|n| HistoricalEntry {
                    candidate: n.to_string(),
                    current_votes: 1000,
                    projected_votes: 2000,
                    percentage: 33.33,
                })
                .collect(),
        }
    }

    #[test]
    fn snapshot_round_trips_and_signals() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.read_snapshot().unwrap().is_none());

        let mut regions = IndexMap::new();
        regions.insert(
            Region::Cortes,
            Tally::new(50.0, vec![CandidateTally::new("A", 10), CandidateTally::new("B", 5)]),
        );
        let sweep = Sweep::new(regions, None);
        let projection = vec![CandidateProjection {
            candidate: "A".into(),
            current_votes: 10,
            projected_votes: 20,
            percentage: 66.67,
            rank: 1,
        }];

        store.write_snapshot(&sweep, &projection).unwrap();
        assert!(dir.path().join(".data_updated").exists());

        let cached = store.read_snapshot().unwrap().unwrap();
        assert_eq!(cached.departments.len(), 1);
        assert_eq!(cached.departments[&Region::Cortes].actas_pct, 50.0);
        assert_eq!(cached.projection[0].candidate, "A");
    }

    #[test]
    fn history_header_written_exactly_once() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.append_history(&sample(&["A", "B", "C"])).unwrap();
        store.append_history(&sample(&["A"])).unwrap();

        let raw = fs::read_to_string(dir.path().join("historical_data.csv")).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp,avg_actas_pct,candidato_1"));
        assert_eq!(raw.matches("avg_actas_pct").count(), 1);
        // Every record matches the header's field count, padding included.
        for line in &lines {
            assert_eq!(split_record(line).len(), HISTORY_FIELDS);
        }
    }

    #[test]
    fn padded_slots_drop_on_read() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.append_history(&sample(&["SOLO"])).unwrap();
        let samples = store.read_history().unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].top.len(), 1);
        assert_eq!(samples[0].avg_actas_pct, 43.21);
    }

    #[test]
    fn quoted_candidate_names_survive() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.append_history(&sample(&["ALIANZA, UNIDAD"])).unwrap();
        let samples = store.read_history().unwrap();
        assert_eq!(samples[0].top[0].candidate, "ALIANZA, UNIDAD");
    }

    #[test]
    fn reformat_normalizes_percentage_columns() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let path = dir.path().join("historical_data.csv");
        fs::write(
            &path,
            format!(
                "{}\n2025-11-30T22:00:00+00:00,43.213,A,1,2,33.3333,B,1,2,10,C,1,2,5.5\n",
                history_header()
            ),
        )
        .unwrap();

        let rewritten = store.reformat_history_decimals().unwrap();
        assert_eq!(rewritten, 1);
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("43.21,A"));
        assert!(raw.contains("33.33,B"));
        assert!(raw.contains("10.00,C"));
        let samples = store.read_history().unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn trigger_is_consumed_once() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(!store.take_trigger());
        store.request_rescrape().unwrap();
        assert!(store.take_trigger());
        assert!(!store.take_trigger());
    }
}
