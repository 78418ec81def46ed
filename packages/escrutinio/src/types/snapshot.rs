//! One captured view of the upstream source, as handed to the extractor.

use serde_json::Value;

/// A DOM readout: everything the extractor's page-side strategies work on,
/// captured in one pass so extraction itself stays synchronous and pure.
#[derive(Debug, Clone, Default)]
pub struct DomSnapshot {
    /// Full visible text of the results view.
    pub body_text: String,
    /// Result-table rows as cell texts, across all tables on the page.
    pub rows: Vec<Vec<String>>,
    /// Inner texts of the first card/block selector that matched anything.
    pub cards: Vec<String>,
    /// Texts of percentage-bearing elements (progress widgets and the
    /// like), used as a completion-percentage fallback.
    pub badges: Vec<String>,
}

impl DomSnapshot {
    pub fn is_blank(&self) -> bool {
        self.body_text.trim().is_empty() && self.rows.is_empty() && self.cards.is_empty()
    }
}

/// What a capture produced: a structured payload when the backend saw one,
/// otherwise a DOM readout.
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    Payload(Value),
    Dom(DomSnapshot),
}

impl SnapshotSource {
    pub fn blank() -> Self {
        SnapshotSource::Dom(DomSnapshot::default())
    }
}
