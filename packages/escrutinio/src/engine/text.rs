//! Free-text fallback: the last-resort reading over raw visible text.

use std::sync::OnceLock;

use regex::Regex;

use super::numeric;
use super::ExtractStrategy;
use crate::types::{CandidateTally, SnapshotSource};

/// A capitalized Spanish name run followed by a (possibly
/// thousands-separated) number, optionally suffixed "votos".
fn name_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"([A-ZÁÉÍÓÚÑ][a-záéíóúñ]+(?:\s+[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+)*)\s*[:\-]?\s*(\d{1,3}(?:[,.\s]\d{3})*)\s*(?:votos?)?",
        )
        .expect("static pattern")
    })
}

/// Scan all visible text for name/number pairs. Matches at or below the
/// vote floor are discarded: at this level of desperation a small number
/// next to a name is more likely a percentage or an ID than a vote count.
pub struct TextPattern {
    min_votes: u64,
}

impl TextPattern {
    pub fn new(min_votes: u64) -> Self {
        Self { min_votes }
    }
}

impl ExtractStrategy for TextPattern {
    fn name(&self) -> &'static str {
        "free-text"
    }

    fn candidates(&self, snapshot: &SnapshotSource) -> Vec<CandidateTally> {
        let SnapshotSource::Dom(dom) = snapshot else {
            return Vec::new();
        };

        name_number()
            .captures_iter(&dom.body_text)
            .filter_map(|cap| {
                let name = cap.get(1)?.as_str().trim();
                let votes = numeric::parse_vote_count(cap.get(2)?.as_str())?;
                (votes > self.min_votes).then(|| CandidateTally::new(name, votes))
            })
            .collect()
    }
}
