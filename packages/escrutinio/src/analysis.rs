//! Offline analysis over the historical log: collection statistics,
//! per-candidate trends, and a summary export.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::StoreResult;
use crate::types::{HistoricalEntry, HistoricalSample};

/// Statistics over a run of historical samples.
#[derive(Debug, Clone)]
pub struct HistoryStats {
    pub first: DateTime<Utc>,
    pub last: DateTime<Utc>,
    pub samples: usize,
    pub actas_min: f64,
    pub actas_max: f64,
    pub actas_latest: f64,
    /// Latest standing, up to three candidates.
    pub latest_top: Vec<HistoricalEntry>,
    /// Percentage-point change per candidate since the first sample, in
    /// latest-standing order.
    pub trends: Vec<(String, f64)>,
}

/// Compute statistics; None when there are no samples.
pub fn statistics(samples: &[HistoricalSample]) -> Option<HistoryStats> {
    let first = samples.first()?;
    let last = samples.last()?;

    let actas: Vec<f64> = samples.iter().map(|s| s.avg_actas_pct).collect();
    let actas_min = actas.iter().copied().fold(f64::INFINITY, f64::min);
    let actas_max = actas.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let trends = last
        .top
        .iter()
        .map(|entry| {
            let initial = first
                .top
                .iter()
                .find(|e| e.candidate == entry.candidate)
                .map(|e| e.percentage)
                .unwrap_or(0.0);
            (entry.candidate.clone(), entry.percentage - initial)
        })
        .collect();

    Some(HistoryStats {
        first: first.timestamp,
        last: last.timestamp,
        samples: samples.len(),
        actas_min,
        actas_max,
        actas_latest: last.avg_actas_pct,
        latest_top: last.top.clone(),
        trends,
    })
}

/// Human-readable statistics block.
pub fn render_statistics(stats: &HistoryStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Collection period:");
    let _ = writeln!(out, "  from {}", stats.first.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "  to   {}", stats.last.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Samples: {}", stats.samples);
    let _ = writeln!(
        out,
        "Actas tabulated: min {:.2}%, max {:.2}%, latest {:.2}%",
        stats.actas_min, stats.actas_max, stats.actas_latest
    );
    let _ = writeln!(out, "\nLatest standing:");
    for (i, entry) in stats.latest_top.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {}: {} current, {} projected, {:.2}%",
            i + 1,
            entry.candidate,
            entry.current_votes,
            entry.projected_votes,
            entry.percentage
        );
    }
    if stats.samples >= 2 {
        let _ = writeln!(out, "\nChange since first sample:");
        for (candidate, delta) in &stats.trends {
            let _ = writeln!(out, "  {candidate}: {delta:+.2}%");
        }
    }
    out
}

/// Export a per-candidate summary CSV next to the given path. Returns the
/// written path.
pub fn export_summary(samples: &[HistoricalSample], out_dir: &Path) -> StoreResult<PathBuf> {
    let stats = match statistics(samples) {
        Some(stats) => stats,
        None => {
            let path = out_dir.join(summary_file_name(Utc::now()));
            fs::write(&path, "candidate,current_votes,projected_votes,percentage,initial_percentage,change_pct,samples\n")?;
            return Ok(path);
        }
    };

    let mut out =
        String::from("candidate,current_votes,projected_votes,percentage,initial_percentage,change_pct,samples\n");
    for entry in &stats.latest_top {
        let change = stats
            .trends
            .iter()
            .find(|(name, _)| name == &entry.candidate)
            .map(|(_, delta)| *delta)
            .unwrap_or(0.0);
        let initial = entry.percentage - change;
        let _ = writeln!(
            out,
            "{},{},{},{:.2},{:.2},{:+.2},{}",
            entry.candidate.replace(',', " "),
            entry.current_votes,
            entry.projected_votes,
            entry.percentage,
            initial,
            change,
            stats.samples
        );
    }

    let path = out_dir.join(summary_file_name(stats.last));
    fs::write(&path, out)?;
    Ok(path)
}

fn summary_file_name(stamp: DateTime<Utc>) -> String {
    format!("resumen_electoral_{}.csv", stamp.format("%Y%m%d_%H%M%S"))
}
