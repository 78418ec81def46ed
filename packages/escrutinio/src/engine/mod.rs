//! Multi-strategy result extraction.
//!
//! The upstream page has no stable structure, so no single reading can be
//! trusted to keep working. Extraction is an ordered list of independent
//! strategies behind one contract (structured payload, table rows, card
//! blocks, free text), tried in priority order with the first qualifying
//! success short-circuiting the rest.
//!
//! The engine never fails: a snapshot none of the strategies recognize
//! extracts to an empty [`Tally`], which is a valid "no data yet" outcome
//! the acquisition loop knows how to respond to.

pub mod actas;
pub mod cards;
pub mod numeric;
pub mod payload;
pub mod table;
pub mod text;

use crate::types::{CandidateTally, ScraperConfig, SnapshotSource, Tally};

pub use cards::CardScan;
pub use table::TableScan;
pub use text::TextPattern;

/// One extraction reading. Implementations are pure over the snapshot and
/// signal failure by returning no candidates, never by erroring.
pub trait ExtractStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn candidates(&self, snapshot: &SnapshotSource) -> Vec<CandidateTally>;
}

/// Payload-alias reading, wrapping [`payload::tally_from_value`].
pub struct PayloadScan;

impl ExtractStrategy for PayloadScan {
    fn name(&self) -> &'static str {
        "payload"
    }

    fn candidates(&self, snapshot: &SnapshotSource) -> Vec<CandidateTally> {
        let SnapshotSource::Payload(value) = snapshot else {
            return Vec::new();
        };
        payload::tally_from_value(value)
            .map(|t| t.candidates)
            .unwrap_or_default()
    }
}

/// Strategy-ordered extraction engine.
pub struct ExtractionEngine {
    strategies: Vec<Box<dyn ExtractStrategy>>,
    min_candidates: usize,
}

impl ExtractionEngine {
    /// Build the engine with the standard strategy order.
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            strategies: vec![
                Box::new(PayloadScan),
                Box::new(TableScan),
                Box::new(CardScan),
                Box::new(TextPattern::new(config.freetext_floor)),
            ],
            min_candidates: config.min_candidates,
        }
    }

    /// Extract a tally from one snapshot.
    ///
    /// A strategy's result counts only when it yields at least
    /// `min_candidates` entries; anything thinner and the next strategy
    /// runs. The completion percentage is resolved once, independently of
    /// which strategy supplied the candidates, and clamped into [0, 100].
    pub fn extract(&self, snapshot: &SnapshotSource) -> Tally {
        for strategy in &self.strategies {
            let candidates = strategy.candidates(snapshot);
            if candidates.len() >= self.min_candidates {
                tracing::debug!(
                    strategy = strategy.name(),
                    count = candidates.len(),
                    "extraction strategy succeeded"
                );
                return Tally::new(self.completion_pct(snapshot), candidates);
            }
        }
        Tally::empty()
    }

    fn completion_pct(&self, snapshot: &SnapshotSource) -> f64 {
        let pct = match snapshot {
            SnapshotSource::Payload(value) => payload::completion_pct(value),
            SnapshotSource::Dom(dom) => actas::completion_pct(dom),
        };
        pct.unwrap_or(0.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DomSnapshot;

    fn engine() -> ExtractionEngine {
        ExtractionEngine::new(&ScraperConfig::default())
    }

    #[test]
    fn table_wins_when_it_qualifies() {
        let snap = SnapshotSource::Dom(DomSnapshot {
            body_text: "Actas: 50%".into(),
            rows: vec![
                vec!["A".into(), "1000".into()],
                vec!["B".into(), "500".into()],
            ],
            cards: vec!["C\n9999".into(), "D\n8888".into()],
            ..Default::default()
        });
        let tally = engine().extract(&snap);
        assert_eq!(tally.actas_pct, 50.0);
        assert_eq!(tally.candidates[0].name, "A");
    }

    #[test]
    fn empty_table_falls_through_to_cards() {
        let snap = SnapshotSource::Dom(DomSnapshot {
            rows: vec![vec!["encabezado".into(), "sin datos".into()]],
            cards: vec!["PARTIDO C\n9.999".into(), "PARTIDO D\n8.888".into()],
            ..Default::default()
        });
        let tally = engine().extract(&snap);
        assert_eq!(tally.candidates.len(), 2);
        assert_eq!(tally.candidates[0].name, "PARTIDO C");
    }

    #[test]
    fn single_candidate_does_not_qualify() {
        let snap = SnapshotSource::Dom(DomSnapshot {
            rows: vec![vec!["A".into(), "1000".into()]],
            ..Default::default()
        });
        assert!(engine().extract(&snap).is_empty());
    }

    #[test]
    fn unrecognizable_snapshot_is_empty_not_an_error() {
        let tally = engine().extract(&SnapshotSource::blank());
        assert!(tally.is_empty());
        assert_eq!(tally.actas_pct, 0.0);
    }

    #[test]
    fn out_of_range_percentage_is_clamped() {
        let snap = SnapshotSource::Payload(serde_json::json!({
            "avance": 250,
            "candidatos": [
                {"nombre": "A", "votos": 10},
                {"nombre": "B", "votos": 20},
            ]
        }));
        assert_eq!(engine().extract(&snap).actas_pct, 100.0);
    }
}
