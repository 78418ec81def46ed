//! Card scan: reading for SPA-style layouts that render one block per
//! candidate instead of a table.

use std::sync::OnceLock;

use regex::Regex;

use super::numeric;
use super::ExtractStrategy;
use crate::types::{CandidateTally, SnapshotSource};

/// Lines that are nothing but digits, separators and whitespace, so they
/// cannot be a candidate label.
fn numeric_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\d\s.,]+$").expect("static pattern"))
}

/// Block reading: each card's text is split into trimmed lines; the vote
/// count is the first line that is purely digits after separator
/// stripping, the label is the first non-numeric line longer than 2
/// characters. Cards missing either are dropped. A zero count is kept:
/// low-turnout views legitimately render it.
pub struct CardScan;

impl ExtractStrategy for CardScan {
    fn name(&self) -> &'static str {
        "card-scan"
    }

    fn candidates(&self, snapshot: &SnapshotSource) -> Vec<CandidateTally> {
        let SnapshotSource::Dom(dom) = snapshot else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for card in &dom.cards {
            let lines = card.lines().map(str::trim).filter(|l| !l.is_empty());

            let mut name: Option<&str> = None;
            let mut votes: Option<u64> = None;
            for line in lines {
                if votes.is_none() {
                    if let Some(count) = numeric::digits_only(line) {
                        votes = Some(count);
                        continue;
                    }
                }
                if name.is_none() && !numeric_line().is_match(line) && line.chars().count() > 2 {
                    name = Some(line);
                }
            }

            if let (Some(name), Some(votes)) = (name, votes) {
                out.push(CandidateTally::new(name, votes));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DomSnapshot;

    fn dom(cards: Vec<&str>) -> SnapshotSource {
        SnapshotSource::Dom(DomSnapshot {
            cards: cards.into_iter().map(String::from).collect(),
            ..Default::default()
        })
    }

    #[test]
    fn first_numeric_line_is_the_count() {
        let snap = dom(vec![
            "PARTIDO AZUL\n1.234.567\n48,2%\n99",
            "PARTIDO ROJO\n900.000",
        ]);
        let candidates = CardScan.candidates(&snap);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].name, "PARTIDO AZUL");
        assert_eq!(candidates[0].votes, 1_234_567);
        assert_eq!(candidates[1].votes, 900_000);
    }

    #[test]
    fn drops_cards_missing_name_or_count() {
        let snap = dom(vec!["123.456", "SOLO TEXTO SIN CIFRAS", "AB\n77"]);
        assert!(CardScan.candidates(&snap).is_empty());
    }
}
