//! The page-accessor capability seam.
//!
//! The one fragile dependency in this system is the structure of a remote
//! results page. Everything that knows about that structure sits behind
//! [`PageAccessor`], so extraction and projection logic never touch an
//! automation backend directly and the backend (browser session, direct
//! HTTP, scripted test double) can be swapped without touching them.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AccessResult;

/// Capability contract over one upstream results view.
///
/// The acquisition loop drives exactly one of these at a time; the upstream
/// session holds a single "currently selected region" query state, so
/// implementations are never asked to serve concurrent region queries.
#[async_trait]
pub trait PageAccessor: Send + Sync {
    /// Full visible text of the results view.
    async fn visible_text(&self) -> AccessResult<String>;

    /// Inner texts of all elements matching a selector.
    async fn element_texts(&self, selector: &str) -> AccessResult<Vec<String>>;

    /// Cell texts for every result-table row on the page.
    async fn table_rows(&self) -> AccessResult<Vec<Vec<String>>>;

    /// Select a value on the region dropdown. Returns false when the
    /// control is not present.
    async fn select_option(&self, value: &str) -> AccessResult<bool>;

    /// Click the query-submit control. Returns false when the control is
    /// not present.
    async fn submit(&self) -> AccessResult<bool>;

    /// A JSON payload captured from the source, when the backend can see
    /// one (direct response or intercepted API call). DOM-only backends
    /// return `None`.
    async fn payload(&self) -> AccessResult<Option<Value>> {
        Ok(None)
    }
}
