//! Direct-request backend: probes the source's JSON endpoints without a
//! browser.
//!
//! The source sometimes answers a plain request that it would block in an
//! automated browser. This backend tries a configured endpoint list in
//! order and serves the first JSON body that comes back as a payload
//! snapshot. It has no DOM, so the page-side operations degrade to empty
//! readouts; selecting a region records the code so endpoint templates can
//! interpolate it.
//!
//! Browser automation stays an external collaborator: any backend that can
//! drive the real page implements [`PageAccessor`] and slots in here.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AccessError, AccessResult};
use crate::traits::PageAccessor;
use crate::types::ScraperConfig;

/// Placeholder interpolated with the selected region code.
const CODE_PLACEHOLDER: &str = "{code}";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub struct RemoteApiAccessor {
    client: reqwest::Client,
    endpoints: Vec<String>,
    selected: RwLock<Option<String>>,
}

impl RemoteApiAccessor {
    pub fn new(config: &ScraperConfig) -> AccessResult<Self> {
        // The source is pickier about requests that do not look like they
        // came from its own results page.
        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(referer) = reqwest::header::HeaderValue::from_str(&config.base_url) {
            headers.insert(reqwest::header::REFERER, referer);
        }
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json, text/plain, */*"),
        );

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AccessError::Http(Box::new(e)))?;
        Ok(Self {
            client,
            endpoints: config.api_endpoints.clone(),
            selected: RwLock::new(None),
        })
    }

    fn resolve(&self, endpoint: &str) -> Option<String> {
        if !endpoint.contains(CODE_PLACEHOLDER) {
            return Some(endpoint.to_string());
        }
        // Templated endpoints are only meaningful once a region is selected.
        let selected = self.selected.read().ok()?.clone()?;
        Some(endpoint.replace(CODE_PLACEHOLDER, &selected))
    }
}

#[async_trait]
impl PageAccessor for RemoteApiAccessor {
    async fn visible_text(&self) -> AccessResult<String> {
        Ok(String::new())
    }

    async fn element_texts(&self, _selector: &str) -> AccessResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn table_rows(&self) -> AccessResult<Vec<Vec<String>>> {
        Ok(Vec::new())
    }

    async fn select_option(&self, value: &str) -> AccessResult<bool> {
        if let Ok(mut selected) = self.selected.write() {
            *selected = Some(value.to_string());
        }
        Ok(true)
    }

    async fn submit(&self) -> AccessResult<bool> {
        Ok(true)
    }

    /// Probe the endpoint list; the first JSON body wins. Endpoint
    /// failures are expected (that is why there is a list) and only logged.
    async fn payload(&self) -> AccessResult<Option<Value>> {
        for endpoint in &self.endpoints {
            let Some(url) = self.resolve(endpoint) else {
                continue;
            };
            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    match response.json::<Value>().await {
                        Ok(value) if !value.is_null() => {
                            tracing::info!(%url, "direct payload probe succeeded");
                            return Ok(Some(value));
                        }
                        Ok(_) => {}
                        Err(e) => tracing::debug!(%url, "non-JSON body: {e}"),
                    }
                }
                Ok(response) => {
                    tracing::debug!(%url, status = %response.status(), "probe rejected");
                }
                Err(e) => tracing::debug!(%url, "probe failed: {e}"),
            }
        }
        Ok(None)
    }
}
