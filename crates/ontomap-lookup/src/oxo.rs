//! OxO cross-reference client
//!
//! Looks up the mappings OxO holds for a concept ID and reduces them to
//! one MeSH identifier plus the EFO terms that map onto the concept.

use std::time::Duration;

use async_trait::async_trait;
use ontomap_core::{
    CrossRefLookup, CrossRefMappings, MapError, OxoConfig, Result, SelectedMapping,
};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{RetryPolicy, OXO_SERVICE};

/// Datasource prefix of MeSH targets
pub const MESH_PREFIX: &str = "MeSH";

/// Datasource prefix of EFO sources
pub const EFO_PREFIX: &str = "EFO";

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct MappingsResponse {
    #[serde(rename = "_embedded")]
    embedded: Option<Embedded>,
}

#[derive(Debug, Deserialize)]
struct Embedded {
    mappings: Vec<MappingRecord>,
}

/// One mapping between two terms
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MappingRecord {
    #[serde(rename = "fromTerm")]
    pub from_term: MappedTerm,
    #[serde(rename = "toTerm")]
    pub to_term: MappedTerm,
}

/// One side of a mapping
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MappedTerm {
    pub curie: String,
    pub datasource: Datasource,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Datasource {
    pub prefix: String,
}

/// A `/mappings` body after shape checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossRefResponse {
    /// At least one mapping record
    Found(Vec<MappingRecord>),
    /// Well-formed, but OxO knows no mappings for the ID
    Empty,
    /// Body did not have the expected structure
    Malformed(String),
}

impl CrossRefResponse {
    /// Classify a raw response body
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str::<MappingsResponse>(body) {
            Err(e) => Self::Malformed(e.to_string()),
            Ok(MappingsResponse { embedded: None }) => Self::Empty,
            Ok(MappingsResponse {
                embedded: Some(embedded),
            }) if embedded.mappings.is_empty() => Self::Empty,
            Ok(MappingsResponse {
                embedded: Some(embedded),
            }) => Self::Found(embedded.mappings),
        }
    }
}

/// Reduce mapping records to the MeSH and EFO columns.
///
/// Without a MeSH target both columns are `NoResult`. EFO sources are
/// de-duplicated in first-seen order and joined with `"; "`.
pub fn extract_mappings(records: &[MappingRecord]) -> CrossRefMappings {
    let Some(mesh) = records
        .iter()
        .find(|r| r.to_term.datasource.prefix == MESH_PREFIX)
        .map(|r| r.to_term.curie.as_str())
    else {
        return CrossRefMappings::no_result();
    };

    let mut efo: Vec<&str> = Vec::new();
    for record in records
        .iter()
        .filter(|r| r.from_term.datasource.prefix == EFO_PREFIX)
    {
        let curie = record.from_term.curie.as_str();
        if !efo.contains(&curie) {
            efo.push(curie);
        }
    }

    CrossRefMappings {
        mesh: SelectedMapping::found(mesh),
        efo: SelectedMapping::found(efo.join("; ")),
    }
}

// ============================================================================
// OxO Client
// ============================================================================

/// OxO mappings API client
pub struct OxoClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl OxoClient {
    /// Create a new OxO client with the default retry policy
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Create from config
    pub fn from_config(config: &OxoConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MapError::transport(OXO_SERVICE, format!("client init: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            retry: RetryPolicy::from_config(config),
        })
    }

    /// Replace the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn mappings_url(&self) -> String {
        format!("{}/mappings", self.base_url.trim_end_matches('/'))
    }

    /// Fetch and classify the mappings for `concept_id`
    pub async fn fetch(&self, concept_id: &str) -> Result<CrossRefResponse> {
        let url = self.mappings_url();
        let response = self
            .retry
            .send(OXO_SERVICE, || {
                self.client.get(&url).query(&[("fromId", concept_id)])
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MapError::transport(OXO_SERVICE, format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MapError::transport(OXO_SERVICE, format!("reading body: {e}")))?;

        Ok(CrossRefResponse::parse(&body))
    }
}

#[async_trait]
impl CrossRefLookup for OxoClient {
    async fn lookup(&self, concept_id: &str) -> Result<CrossRefMappings> {
        match self.fetch(concept_id).await? {
            CrossRefResponse::Found(records) => {
                debug!("OxO returned {} mappings for {}", records.len(), concept_id);
                Ok(extract_mappings(&records))
            }
            CrossRefResponse::Empty => {
                debug!("OxO has no mappings for {}", concept_id);
                Ok(CrossRefMappings::no_result())
            }
            CrossRefResponse::Malformed(reason) => {
                Err(MapError::response_shape(OXO_SERVICE, reason))
            }
        }
    }

    fn name(&self) -> &str {
        OXO_SERVICE
    }
}

// ============================================================================
// Tests
// ============================================================================
