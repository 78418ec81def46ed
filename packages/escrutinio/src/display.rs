//! Presentation strings for the terminal front end.
//!
//! Builds the per-department table, the national ranking and the stale
//! banner as plain strings; actually printing them is the caller's one-line
//! job. Keeping these as pure functions keeps the layout testable.

use std::fmt::Write;

use chrono::Local;

use crate::types::{CachedResults, CandidateProjection, Sweep};

const RULE_WIDE: usize = 100;
const RULE: usize = 60;

fn shorten(name: &str, max: usize) -> String {
    if name.chars().count() > max {
        name.chars().take(max).collect()
    } else {
        name.to_string()
    }
}

/// The leading candidate names used as table columns: taken from the first
/// accepted region, ordered by its vote counts.
fn column_candidates(sweep: &Sweep) -> Vec<String> {
    for tally in sweep.regions.values() {
        if tally.candidates.is_empty() {
            continue;
        }
        let mut sorted = tally.candidates.clone();
        sorted.sort_by(|a, b| b.votes.cmp(&a.votes));
        return sorted.into_iter().take(3).map(|c| c.name).collect();
    }
    Vec::new()
}

/// Per-department results table with current and projected votes, totals
/// and percentage rows.
pub fn department_table(sweep: &Sweep) -> String {
    let columns = column_candidates(sweep);
    let mut out = String::new();

    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDE));
    let _ = writeln!(
        out,
        "RESULTS BY DEPARTMENT{:>width$}",
        format!("Data collected: {}", sweep.collected_at.format("%Y-%m-%d %H:%M:%S")),
        width = RULE_WIDE - 21
    );
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDE));

    if columns.is_empty() {
        let _ = writeln!(out, "No candidate data found.");
        return out;
    }

    let _ = write!(out, "{:<22} {:>6}", "Department", "Actas%");
    for name in &columns {
        let _ = write!(out, "  {:^19}", shorten(name, 10));
    }
    let _ = writeln!(out);
    let _ = write!(out, "{:<22} {:>6}", "", "");
    for _ in &columns {
        let _ = write!(out, "  {:>9} {:>9}", "Current", "Proj");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDE));

    let mut names: Vec<_> = sweep.regions.keys().copied().collect();
    names.sort_by_key(|r| r.name());

    let mut total_current = vec![0u64; columns.len()];
    let mut total_projected = vec![0u64; columns.len()];

    for region in names {
        let tally = &sweep.regions[&region];
        let _ = write!(out, "{:<22} {:>5.1}%", region.name(), tally.actas_pct);
        for (i, column) in columns.iter().enumerate() {
            let votes = tally
                .candidates
                .iter()
                .find(|c| &c.name == column)
                .map(|c| c.votes)
                .unwrap_or(0);
            let projected = crate::projection::project(votes, tally.actas_pct) as u64;
            total_current[i] += votes;
            total_projected[i] += projected;
            let _ = write!(out, "  {votes:>9} {projected:>9}");
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDE));
    let _ = write!(out, "{:<22} {:>6}", "TOTAL", "");
    for i in 0..columns.len() {
        let _ = write!(out, "  {:>9} {:>9}", total_current[i], total_projected[i]);
    }
    let _ = writeln!(out);

    let grand_current: u64 = total_current.iter().sum();
    let grand_projected: u64 = total_projected.iter().sum();
    if grand_projected > 0 {
        let _ = write!(out, "{:<22} {:>6}", "PERCENTAGE", "");
        for i in 0..columns.len() {
            let curr = if grand_current > 0 {
                total_current[i] as f64 / grand_current as f64 * 100.0
            } else {
                0.0
            };
            let proj = total_projected[i] as f64 / grand_projected as f64 * 100.0;
            let _ = write!(out, "  {curr:>8.2}% {proj:>8.2}%");
        }
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDE));
    out
}

/// The national ranking block.
pub fn national_summary(projection: &[CandidateProjection]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(RULE));
    let _ = writeln!(
        out,
        "=== ELECTION PROJECTION [Last Updated: {}] ===",
        Local::now().format("%H:%M:%S")
    );
    let _ = writeln!(out, "{}", "=".repeat(RULE));
    let _ = writeln!(out, "\nNATIONAL PROJECTION (Sum of Department Projections):");
    let _ = writeln!(out, "{}", "-".repeat(RULE));

    if projection.is_empty() {
        let _ = writeln!(out, "No data available yet.");
    } else {
        for row in projection {
            let _ = writeln!(
                out,
                "{}. {}: {} votes (Proj) - {}%",
                row.rank, row.candidate, row.projected_votes, row.percentage
            );
        }
    }
    let _ = writeln!(out, "{}", "-".repeat(RULE));
    out
}

/// Banner shown when a cycle produced nothing and the cached snapshot is
/// being re-displayed instead, with the cache's own timestamp.
pub fn stale_banner(cached: &CachedResults) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Source Status: OFFLINE (Using cache from {})",
        cached.cached_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = write!(out, "{}", national_summary(&cached.projection));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CandidateTally, Region, Sweep, Tally};
    use indexmap::IndexMap;

    fn sweep() -> Sweep {
        let mut regions = IndexMap::new();
        regions.insert(
            Region::Cortes,
            Tally::new(
                50.0,
                vec![CandidateTally::new("AZUL", 1000), CandidateTally::new("ROJO", 500)],
            ),
        );
        regions.insert(
            Region::Atlantida,
            Tally::new(
                100.0,
                vec![CandidateTally::new("AZUL", 200), CandidateTally::new("ROJO", 300)],
            ),
        );
        Sweep::new(regions, None)
    }

    #[test]
    fn table_lists_regions_alphabetically_with_projections() {
        let text = department_table(&sweep());
        let atlantida = text.find("ATLANTIDA").unwrap();
        let cortes = text.find("CORTES").unwrap();
        assert!(atlantida < cortes);
        // Cortes at 50% doubles: 1000 current, 2000 projected.
        assert!(text.contains("2000"));
        assert!(text.contains("TOTAL"));
    }

    #[test]
    fn empty_sweep_renders_placeholder() {
        let text = department_table(&Sweep::new(IndexMap::new(), None));
        assert!(text.contains("No candidate data found."));
    }

    #[test]
    fn ranking_lines_carry_rank_and_percentage() {
        let projection = vec![CandidateProjection {
            candidate: "AZUL".into(),
            current_votes: 1200,
            projected_votes: 2200,
            percentage: 61.11,
            rank: 1,
        }];
        let text = national_summary(&projection);
        assert!(text.contains("1. AZUL: 2200 votes (Proj) - 61.11%"));
    }
}
