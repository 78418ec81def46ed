//! Projection arithmetic and national aggregation.
//!
//! Scaling happens per region, before summing: tabulation completion
//! varies widely between regions, so extrapolating each region from its
//! own completion figure and then summing is more accurate than scaling a
//! national total by an average.

use indexmap::IndexMap;

use crate::types::{CandidateProjection, ScraperConfig, Sweep};

/// Labels that are bookkeeping rows, not candidates: running totals, void
/// and blank ballots, abstention, certificate counts. Matched as lowercase
/// substrings of the tally label.
pub const METADATA_KEYWORDS: &[&str] = &[
    "información",
    "general",
    "acta",
    "total",
    "votos",
    "nulos",
    "blancos",
    "abstención",
];

/// Linear extrapolation of a partial count to full tabulation.
///
/// With completion at or below zero the count passes through unchanged:
/// there is nothing to scale by, and inflating an uncounted region would
/// be worse than under-reporting it.
pub fn project(votes: u64, actas_pct: f64) -> f64 {
    if actas_pct <= 0.0 {
        votes as f64
    } else {
        votes as f64 * 100.0 / actas_pct
    }
}

fn is_metadata(name: &str) -> bool {
    let lower = name.to_lowercase();
    METADATA_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregates per-region tallies into the national ranking.
pub struct ProjectionCalculator {
    noise_floor: u64,
}

impl ProjectionCalculator {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            noise_floor: config.noise_floor,
        }
    }

    /// Compute the national projection for one sweep.
    ///
    /// Sums current and projected votes per candidate name across the
    /// accepted regions. The umbrella readout is never a summand; it
    /// already overlaps the regional data. Metadata rows and tallies under
    /// the noise floor are dropped here, and only here: the raw per-region
    /// snapshots keep everything extraction found.
    pub fn national(&self, sweep: &Sweep) -> Vec<CandidateProjection> {
        // name → (current, projected); insertion order is the tie-break.
        let mut totals: IndexMap<String, (u64, f64)> = IndexMap::new();

        for tally in sweep.regions.values() {
            for candidate in &tally.candidates {
                if is_metadata(&candidate.name) {
                    continue;
                }
                if candidate.votes < self.noise_floor {
                    continue;
                }
                let projected = project(candidate.votes, tally.actas_pct);
                let entry = totals.entry(candidate.name.clone()).or_insert((0, 0.0));
                entry.0 += candidate.votes;
                entry.1 += projected;
            }
        }

        let mut rows: Vec<(String, u64, u64)> = totals
            .into_iter()
            .map(|(name, (current, projected))| (name, current, projected as u64))
            .collect();

        // Stable sort: ties keep first-extraction order.
        rows.sort_by(|a, b| b.2.cmp(&a.2));

        let total_projected: u64 = rows.iter().map(|r| r.2).sum();

        rows.into_iter()
            .enumerate()
            .map(|(i, (candidate, current_votes, projected_votes))| {
                let percentage = if total_projected > 0 {
                    round2(projected_votes as f64 / total_projected as f64 * 100.0)
                } else {
                    0.0
                };
                CandidateProjection {
                    candidate,
                    current_votes,
                    projected_votes,
                    percentage,
                    rank: i + 1,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CandidateTally, Region, Tally};
    use indexmap::IndexMap;

    fn calc() -> ProjectionCalculator {
        ProjectionCalculator::new(&ScraperConfig::default())
    }

    fn sweep_of(entries: Vec<(Region, f64, Vec<(&str, u64)>)>) -> Sweep {
        let mut regions = IndexMap::new();
        for (region, pct, candidates) in entries {
            regions.insert(
                region,
                Tally::new(
                    pct,
                    candidates
                        .into_iter()
                        .map(|(n, v)| CandidateTally::new(n, v))
                        .collect(),
                ),
            );
        }
        Sweep::new(regions, None)
    }

    #[test]
    fn half_counted_region_doubles() {
        let sweep = sweep_of(vec![(Region::Cortes, 50.0, vec![("X", 1000), ("Y", 500)])]);
        let rows = calc().national(&sweep);
        assert_eq!(rows[0].candidate, "X");
        assert_eq!(rows[0].projected_votes, 2000);
        assert_eq!(rows[1].projected_votes, 1000);
    }

    #[test]
    fn zero_completion_passes_through() {
        let sweep = sweep_of(vec![(Region::Valle, 0.0, vec![("X", 300), ("Y", 200)])]);
        let rows = calc().national(&sweep);
        assert_eq!(rows[0].projected_votes, 300);
        assert_eq!(rows[1].projected_votes, 200);
    }

    #[test]
    fn regions_scale_independently_before_summing() {
        let sweep = sweep_of(vec![
            (Region::Cortes, 50.0, vec![("X", 100), ("Y", 50)]),
            (Region::Valle, 100.0, vec![("X", 200), ("Y", 300)]),
        ]);
        // Floor disabled: this exercises the scaling arithmetic on small
        // counts, not the noise filter.
        let calc = ProjectionCalculator::new(&ScraperConfig {
            noise_floor: 0,
            ..Default::default()
        });
        let rows = calc.national(&sweep);
        // X: 100→200 plus 200→200; Y: 50→100 plus 300→300. Dead heat.
        let x = rows.iter().find(|r| r.candidate == "X").unwrap();
        let y = rows.iter().find(|r| r.candidate == "Y").unwrap();
        assert_eq!(x.current_votes, 300);
        assert_eq!(y.current_votes, 350);
        assert_eq!(x.projected_votes, 400);
        assert_eq!(y.projected_votes, 400);
        assert_eq!(x.percentage, 50.0);
        assert_eq!(y.percentage, 50.0);
        // Stable tie-break: X was extracted first.
        assert_eq!(x.rank, 1);
        assert_eq!(y.rank, 2);
    }

    #[test]
    fn umbrella_is_never_a_summand() {
        let mut sweep = sweep_of(vec![(
            Region::Cortes,
            100.0,
            vec![("X", 1000), ("Y", 500)],
        )]);
        sweep.umbrella = Some(Tally::new(
            100.0,
            vec![
                CandidateTally::new("X", 1_000_000),
                CandidateTally::new("Y", 500_000),
            ],
        ));
        let rows = calc().national(&sweep);
        assert_eq!(rows[0].projected_votes, 1000);
    }

    #[test]
    fn metadata_and_noise_are_dropped() {
        let sweep = sweep_of(vec![(
            Region::Olancho,
            100.0,
            vec![
                ("PARTIDO A", 10_000),
                ("Votos Nulos", 9_999),
                ("TOTAL GENERAL", 25_000),
                ("PARTIDO B", 5_000),
                ("ruido", 99),
            ],
        )]);
        let rows = calc().national(&sweep);
        let names: Vec<&str> = rows.iter().map(|r| r.candidate.as_str()).collect();
        assert_eq!(names, vec!["PARTIDO A", "PARTIDO B"]);
    }

    #[test]
    fn noise_floor_is_aggregation_only_boundary() {
        // Exactly at the floor stays; one under goes.
        let sweep = sweep_of(vec![(
            Region::LaPaz,
            100.0,
            vec![("A", 100), ("B", 99), ("C", 200)],
        )]);
        let rows = calc().national(&sweep);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn percentages_sum_to_one_hundred_within_rounding() {
        let sweep = sweep_of(vec![(
            Region::Yoro,
            75.0,
            vec![("A", 3333), ("B", 3334), ("C", 3333)],
        )]);
        let rows = calc().national(&sweep);
        let sum: f64 = rows.iter().map(|r| r.percentage).sum();
        assert!((sum - 100.0).abs() < 0.05, "sum was {sum}");
    }

    #[test]
    fn empty_sweep_projects_to_nothing() {
        let rows = calc().national(&Sweep::new(IndexMap::new(), None));
        assert!(rows.is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn full_tabulation_is_identity(votes in 0u64..10_000_000) {
                prop_assert!((project(votes, 100.0) - votes as f64).abs() < f64::EPSILON * votes as f64 + 1e-9);
            }

            #[test]
            fn zero_votes_project_to_zero(pct in 0.0f64..100.0) {
                prop_assert_eq!(project(0, pct), 0.0);
            }

            #[test]
            fn zero_or_negative_completion_passes_through(votes in 0u64..10_000_000, pct in -100.0f64..=0.0) {
                prop_assert_eq!(project(votes, pct), votes as f64);
            }

            #[test]
            fn projection_never_shrinks_a_count(votes in 0u64..10_000_000, pct in 0.1f64..100.0) {
                prop_assert!(project(votes, pct) >= votes as f64 - 1e-6);
            }
        }
    }
}
