//! Testing utilities: a scripted page-accessor double.
//!
//! Useful for exercising the acquisition loop without a live page or
//! network. Snapshots are scripted per region code, failure injection
//! serves empty views for the first N queries of a code, and every driven
//! operation is recorded for assertions.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::capture::{CARD_SELECTORS, PERCENT_SELECTORS};
use crate::error::AccessResult;
use crate::traits::PageAccessor;
use crate::types::DomSnapshot;

/// Record of a call driven against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessorCall {
    Select(String),
    Submit,
    ReadText,
    ReadTable,
    ReadElements(String),
}

#[derive(Default)]
struct Script {
    /// Views served in order; the last one repeats once the script runs
    /// out.
    views: Vec<DomSnapshot>,
    /// Queries answered with a blank view before the scripted ones start.
    failures: usize,
    /// Submissions seen so far.
    submits: usize,
}

impl Script {
    fn current_view(&self) -> DomSnapshot {
        let query = self.submits.saturating_sub(1);
        if query < self.failures {
            return DomSnapshot::default();
        }
        let idx = query - self.failures;
        self.views
            .get(idx.min(self.views.len().saturating_sub(1)))
            .cloned()
            .unwrap_or_default()
    }
}

/// A scripted page accessor.
#[derive(Default)]
pub struct MockAccessor {
    scripts: RwLock<HashMap<String, Script>>,
    /// View served before any region was selected (the umbrella readout).
    idle_view: RwLock<DomSnapshot>,
    payload: RwLock<Option<Value>>,
    selected: RwLock<Option<String>>,
    calls: RwLock<Vec<AccessorCall>>,
    /// When false, the region dropdown "does not exist".
    has_dropdown: RwLock<bool>,
}

impl MockAccessor {
    pub fn new() -> Self {
        Self {
            has_dropdown: RwLock::new(true),
            ..Default::default()
        }
    }

    /// Script the view served for a region code.
    pub fn with_view(self, code: impl Into<String>, view: DomSnapshot) -> Self {
        self.scripts
            .write()
            .unwrap()
            .entry(code.into())
            .or_default()
            .views
            .push(view);
        self
    }

    /// Serve blank views for the first `n` queries of a code.
    pub fn with_failures(self, code: impl Into<String>, n: usize) -> Self {
        self.scripts
            .write()
            .unwrap()
            .entry(code.into())
            .or_default()
            .failures = n;
        self
    }

    /// Script the pre-selection (umbrella) view.
    pub fn with_idle_view(self, view: DomSnapshot) -> Self {
        *self.idle_view.write().unwrap() = view;
        self
    }

    /// Serve a JSON payload instead of DOM readouts.
    pub fn with_payload(self, payload: Value) -> Self {
        *self.payload.write().unwrap() = Some(payload);
        self
    }

    /// Pretend the region dropdown is missing.
    pub fn without_dropdown(self) -> Self {
        *self.has_dropdown.write().unwrap() = false;
        self
    }

    /// All calls driven against this mock.
    pub fn calls(&self) -> Vec<AccessorCall> {
        self.calls.read().unwrap().clone()
    }

    /// How many times a code was submitted.
    pub fn submit_count(&self, code: &str) -> usize {
        self.scripts
            .read()
            .unwrap()
            .get(code)
            .map(|s| s.submits)
            .unwrap_or(0)
    }

    fn record(&self, call: AccessorCall) {
        self.calls.write().unwrap().push(call);
    }

    fn view(&self) -> DomSnapshot {
        let selected = self.selected.read().unwrap().clone();
        match selected {
            Some(code) => self
                .scripts
                .read()
                .unwrap()
                .get(&code)
                .map(Script::current_view)
                .unwrap_or_default(),
            None => self.idle_view.read().unwrap().clone(),
        }
    }
}

#[async_trait]
impl PageAccessor for MockAccessor {
    async fn visible_text(&self) -> AccessResult<String> {
        self.record(AccessorCall::ReadText);
        Ok(self.view().body_text)
    }

    async fn element_texts(&self, selector: &str) -> AccessResult<Vec<String>> {
        self.record(AccessorCall::ReadElements(selector.to_string()));
        let view = self.view();
        if CARD_SELECTORS.contains(&selector) {
            return Ok(view.cards);
        }
        if PERCENT_SELECTORS.contains(&selector) {
            return Ok(view.badges);
        }
        Ok(Vec::new())
    }

    async fn table_rows(&self) -> AccessResult<Vec<Vec<String>>> {
        self.record(AccessorCall::ReadTable);
        Ok(self.view().rows)
    }

    async fn select_option(&self, value: &str) -> AccessResult<bool> {
        self.record(AccessorCall::Select(value.to_string()));
        if !*self.has_dropdown.read().unwrap() {
            return Ok(false);
        }
        *self.selected.write().unwrap() = Some(value.to_string());
        Ok(true)
    }

    async fn submit(&self) -> AccessResult<bool> {
        self.record(AccessorCall::Submit);
        let selected = self.selected.read().unwrap().clone();
        if let Some(code) = selected {
            self.scripts
                .write()
                .unwrap()
                .entry(code)
                .or_default()
                .submits += 1;
        }
        Ok(true)
    }

    async fn payload(&self) -> AccessResult<Option<Value>> {
        Ok(self.payload.read().unwrap().clone())
    }
}

/// A two-party DOM view with a table and a completion phrase, the common
/// happy-path fixture.
pub fn table_view(actas_pct: f64, rows: &[(&str, u64)]) -> DomSnapshot {
    DomSnapshot {
        body_text: format!("Actas: {actas_pct}%"),
        rows: rows
            .iter()
            .map(|(name, votes)| vec![name.to_string(), votes.to_string()])
            .collect(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_views_are_served_per_code() {
        let mock = MockAccessor::new().with_view("05", table_view(50.0, &[("A", 10)]));
        mock.select_option("05").await.unwrap();
        mock.submit().await.unwrap();
        let rows = mock.table_rows().await.unwrap();
        assert_eq!(rows[0][0], "A");
    }

    #[tokio::test]
    async fn failure_injection_blanks_early_queries() {
        let mock = MockAccessor::new()
            .with_view("05", table_view(50.0, &[("A", 10)]))
            .with_failures("05", 2);
        mock.select_option("05").await.unwrap();

        mock.submit().await.unwrap();
        assert!(mock.table_rows().await.unwrap().is_empty());
        mock.submit().await.unwrap();
        assert!(mock.table_rows().await.unwrap().is_empty());
        mock.submit().await.unwrap();
        assert_eq!(mock.table_rows().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn calls_are_recorded() {
        let mock = MockAccessor::new();
        mock.select_option("01").await.unwrap();
        mock.submit().await.unwrap();
        assert_eq!(
            mock.calls(),
            vec![AccessorCall::Select("01".into()), AccessorCall::Submit]
        );
    }
}
