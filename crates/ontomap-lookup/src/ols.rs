//! OLS term-search client
//!
//! Searches the label field of a single ontology and returns the hits
//! in the order the service ranked them.

use std::time::Duration;

use async_trait::async_trait;
use ontomap_core::{
    CandidateMatch, MapError, OlsConfig, Ontology, Result, TermSearch, TermSearchResult,
};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::OLS_SERVICE;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SelectResponse {
    response: SelectBody,
}

#[derive(Debug, Deserialize)]
struct SelectBody {
    #[serde(rename = "numFound")]
    num_found: u64,
    docs: Vec<SelectDoc>,
}

#[derive(Debug, Deserialize)]
struct SelectDoc {
    iri: String,
    label: Option<String>,
    score: Option<f64>,
}

/// Parse a `/select` body into hits tagged with `ontology`
pub fn parse_select_response(body: &str, ontology: Ontology) -> Result<TermSearchResult> {
    let parsed: SelectResponse = serde_json::from_str(body)
        .map_err(|e| MapError::response_shape(OLS_SERVICE, e.to_string()))?;

    let candidates = parsed
        .response
        .docs
        .into_iter()
        .map(|doc| CandidateMatch {
            iri: doc.iri,
            label: doc.label,
            score: doc.score,
            ontology,
        })
        .collect();

    Ok(TermSearchResult {
        num_found: parsed.response.num_found,
        candidates,
    })
}

// ============================================================================
// OLS Client
// ============================================================================

/// OLS search API client
pub struct OlsClient {
    client: Client,
    base_url: String,
    field_list: String,
}

impl OlsClient {
    /// Create a new OLS client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            field_list: OlsConfig::default().field_list,
        }
    }

    /// Create from config
    pub fn from_config(config: &OlsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MapError::transport(OLS_SERVICE, format!("client init: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            field_list: config.field_list.clone(),
        })
    }

    fn select_url(&self) -> String {
        format!("{}/select", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TermSearch for OlsClient {
    async fn search(&self, label: &str, ontology: Ontology) -> Result<TermSearchResult> {
        debug!("OLS search {:?} in {}", label, ontology);

        let response = self
            .client
            .get(self.select_url())
            .query(&[
                ("q", label),
                ("queryFields", "label"),
                ("ontology", ontology.as_str()),
                ("fieldList", self.field_list.as_str()),
            ])
            .send()
            .await
            .map_err(|e| MapError::transport(OLS_SERVICE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MapError::transport(
                OLS_SERVICE,
                format!("HTTP {status}: {error_text}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MapError::transport(OLS_SERVICE, format!("reading body: {e}")))?;

        parse_select_response(&body, ontology)
    }

    fn name(&self) -> &str {
        OLS_SERVICE
    }
}

// ============================================================================
// Tests
// ============================================================================
