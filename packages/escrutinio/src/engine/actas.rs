//! Completion-percentage extraction for DOM snapshots.
//!
//! The tabulation-progress figure moves around the page between deploys.
//! Known phrasings are tried against the visible text first; failing that,
//! any percentage-bearing badge element is believed.

use std::sync::OnceLock;

use regex::Regex;

use super::numeric;
use crate::types::DomSnapshot;

/// Phrasings seen on the source, in decreasing order of specificity.
const PHRASINGS: &[&str] = &[
    r"(\d+(?:[.,]\d+)?)\s*%\s*(?:de\s+)?[Aa]ctas",
    r"[Aa]ctas[:\s]+(\d+(?:[.,]\d+)?)\s*%",
    r"[Aa]ctas\s+[Pp]rocesad[ao]s?[:\s]+(\d+(?:[.,]\d+)?)\s*%",
    r"[Pp]rocesad[ao]s?[:\s]+(\d+(?:[.,]\d+)?)\s*%",
    r"(\d+(?:[.,]\d+)?)\s*%\s*[Pp]rocesad[ao]",
    r"[Aa]vance[:\s]+(\d+(?:[.,]\d+)?)\s*%",
];

fn phrasings() -> &'static Vec<Regex> {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        PHRASINGS
            .iter()
            .map(|p| Regex::new(p).expect("static pattern"))
            .collect()
    })
}

fn any_percent() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*%").expect("static pattern"))
}

/// Extract the tabulated-actas percentage from a DOM snapshot, if any
/// phrasing or badge carries one.
pub fn completion_pct(dom: &DomSnapshot) -> Option<f64> {
    for re in phrasings() {
        if let Some(cap) = re.captures(&dom.body_text) {
            if let Some(pct) = numeric::parse_percentage(cap.get(1)?.as_str()) {
                return Some(pct);
            }
        }
    }

    for badge in &dom.badges {
        if let Some(cap) = any_percent().captures(badge) {
            if let Some(pct) = cap.get(1).and_then(|m| numeric::parse_percentage(m.as_str())) {
                return Some(pct);
            }
        }
    }

    None
}
