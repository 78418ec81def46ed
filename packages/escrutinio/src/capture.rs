//! Snapshot capture: turn a live page accessor into one inert
//! [`SnapshotSource`] the extraction strategies can chew on.

use crate::traits::PageAccessor;
use crate::types::{DomSnapshot, SnapshotSource};

/// Card/block selector aliases, tried in order; the first selector that
/// matches anything supplies the card texts. Covers the common component
/// libraries the source has been seen rendering with.
pub const CARD_SELECTORS: &[&str] = &[
    "[class*=\"candidate\"]",
    "[class*=\"card\"]",
    "[class*=\"result\"]",
    "[class*=\"partido\"]",
    "[class*=\"item\"]",
    ".candidate-card",
    ".result-card",
    ".p-card",
    ".mat-card",
];

/// Selector aliases for percentage-bearing elements, used as a fallback
/// when the visible text carries no recognizable completion phrase.
pub const PERCENT_SELECTORS: &[&str] = &[
    "[class*=\"actas\"]",
    "[class*=\"percentage\"]",
    "[class*=\"progress\"]",
    "[class*=\"avance\"]",
    ".progress-value",
    ".percentage",
];

/// Capture one snapshot. A payload, when the backend can see one, wins
/// outright. Individual DOM readout failures degrade to empty sections
/// rather than failing the capture: a hollow snapshot extracts to a valid
/// "no data yet" result, and the acquisition loop's retry policy owns the
/// response to that.
pub async fn capture(page: &dyn PageAccessor) -> SnapshotSource {
    match page.payload().await {
        Ok(Some(value)) => return SnapshotSource::Payload(value),
        Ok(None) => {}
        Err(e) => tracing::debug!("payload capture failed: {e}"),
    }

    let rows = page.table_rows().await.unwrap_or_default();

    let mut cards = Vec::new();
    for selector in CARD_SELECTORS {
        match page.element_texts(selector).await {
            Ok(texts) if !texts.is_empty() => {
                cards = texts;
                break;
            }
            Ok(_) => {}
            Err(e) => tracing::debug!("card selector {selector} failed: {e}"),
        }
    }

    let mut badges = Vec::new();
    for selector in PERCENT_SELECTORS {
        match page.element_texts(selector).await {
            Ok(texts) if !texts.is_empty() => {
                badges.extend(texts);
            }
            _ => {}
        }
    }

    let body_text = page.visible_text().await.unwrap_or_default();

    SnapshotSource::Dom(DomSnapshot {
        body_text,
        rows,
        cards,
        badges,
    })
}
