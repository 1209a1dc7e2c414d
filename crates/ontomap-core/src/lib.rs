//! ontomap Core - Domain models, mapping rules, and shared traits
//!
//! This crate defines the abstractions used throughout ontomap:
//! - Concept and mapping models (concepts, candidate matches, selections)
//! - The error taxonomy shared by every stage of a run
//! - Best-match selection and cross-service aggregation rules
//! - Traits for the remote term-search and cross-reference services
//! - Configuration management
//!
//! Author: hephaex@gmail.com

pub mod config;
pub mod mapping;

pub use config::{
    AppConfig, ConfigError, LoggingConfig, OlsConfig, OutputConfig, OxoConfig, PipelineConfig,
    TaxonomyConfig, TermSearchFailure,
};
pub use mapping::{
    aggregate_ols, aggregate_oxo, guard_efo_selection, join_mappings, select_best, IdNormalizer,
};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Placeholder written wherever a lookup produced nothing usable
pub const NO_RESULT: &str = "No result";

/// Base IRI shared by OBO Foundry ontologies (DOID, MONDO, HP, ...)
pub const OBO_IRI_PREFIX: &str = "http://purl.obolibrary.org/obo/";

/// Base IRI of the Experimental Factor Ontology
pub const EFO_IRI_PREFIX: &str = "http://www.ebi.ac.uk/efo/";

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for ontomap operations
#[derive(Error, Debug)]
pub enum MapError {
    #[error("Failed to parse taxonomy: {0}")]
    Parse(String),

    #[error("Closure query failed: {0}")]
    Query(String),

    #[error("{service} request failed: {message}")]
    Transport { service: String, message: String },

    #[error("Unexpected {service} response: {message}")]
    ResponseShape { service: String, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output table: {0}")]
    Output(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MapError {
    /// Build a transport error for the named service
    pub fn transport(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Build a response-shape error for the named service
    pub fn response_shape(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResponseShape {
            service: service.into(),
            message: message.into(),
        }
    }

    /// True for network failures and non-2xx responses
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// True for errors raised by a remote service rather than local input
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::ResponseShape { .. })
    }
}

pub type Result<T> = std::result::Result<T, MapError>;

// ============================================================================
// Ontologies
// ============================================================================

/// Target ontology of a term search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ontology {
    Mondo,
    Efo,
}

impl Ontology {
    /// Ontology filter value understood by the term-search service
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mondo => "mondo",
            Self::Efo => "efo",
        }
    }

    /// IRI prefix stripped when short-forming a hit from this ontology
    pub fn iri_prefix(&self) -> &'static str {
        match self {
            Self::Mondo => OBO_IRI_PREFIX,
            Self::Efo => EFO_IRI_PREFIX,
        }
    }
}

impl std::fmt::Display for Ontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mondo => write!(f, "MONDO"),
            Self::Efo => write!(f, "EFO"),
        }
    }
}

// ============================================================================
// Concept Models
// ============================================================================

/// A taxonomy concept selected by the closure query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    /// Short-form identifier (e.g., "DOID:4159")
    pub id: String,

    /// Full concept URI as it appears in the taxonomy
    pub uri: String,

    /// Preferred label
    pub label: String,
}

impl Concept {
    /// Create a concept, deriving its short-form ID with the given normalizer
    pub fn new(uri: impl Into<String>, label: impl Into<String>, normalizer: &IdNormalizer) -> Self {
        let uri = uri.into();
        Self {
            id: normalizer.shorten(&uri),
            uri,
            label: label.into(),
        }
    }
}

/// A single hit returned by a term search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    /// Resolvable IRI of the matched term
    pub iri: String,

    /// Label of the matched term, when returned
    pub label: Option<String>,

    /// Service relevance score; ordering is taken from the service, not from this
    pub score: Option<f64>,

    /// Ontology the search was filtered to
    pub ontology: Ontology,
}

/// Outcome of one term-search call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermSearchResult {
    /// Total matches reported by the service
    pub num_found: u64,

    /// Hits in service order
    pub candidates: Vec<CandidateMatch>,
}

impl TermSearchResult {
    /// A search that matched nothing
    pub fn empty() -> Self {
        Self::default()
    }
}

/// The chosen mapping for one concept in one column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectedMapping {
    /// A concrete identifier
    Found(String),
    /// Nothing usable was found
    NoResult,
}

impl SelectedMapping {
    /// Wrap an identifier, mapping blank values to `NoResult`
    pub fn found(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::NoResult
        } else {
            Self::Found(value)
        }
    }

    /// The identifier, if one was found
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Found(v) => Some(v),
            Self::NoResult => None,
        }
    }

    pub fn is_no_result(&self) -> bool {
        matches!(self, Self::NoResult)
    }
}

impl std::fmt::Display for SelectedMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Found(v) => write!(f, "{v}"),
            Self::NoResult => write!(f, "{NO_RESULT}"),
        }
    }
}

/// Mappings obtained from the cross-reference service for one concept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossRefMappings {
    /// First MeSH target
    pub mesh: SelectedMapping,

    /// EFO source terms, already joined
    pub efo: SelectedMapping,
}

impl CrossRefMappings {
    /// Both columns set to the sentinel
    pub fn no_result() -> Self {
        Self {
            mesh: SelectedMapping::NoResult,
            efo: SelectedMapping::NoResult,
        }
    }
}

/// All selections gathered for one concept during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptMappings {
    pub concept: Concept,
    pub mondo: SelectedMapping,
    pub efo: SelectedMapping,
    pub cross_ref: CrossRefMappings,
}

/// One row of the output table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    pub concept: String,
    pub label: String,
    #[serde(rename = "OLS_Mappings")]
    pub ols_mappings: String,
    #[serde(rename = "OXO_Mappings")]
    pub oxo_mappings: String,
}

impl From<&ConceptMappings> for OutputRow {
    fn from(mappings: &ConceptMappings) -> Self {
        Self {
            concept: mappings.concept.id.clone(),
            label: mappings.concept.label.clone(),
            ols_mappings: aggregate_ols(&mappings.mondo, &mappings.efo),
            oxo_mappings: aggregate_oxo(&mappings.cross_ref),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for term-search services (one ontology per call)
#[async_trait::async_trait]
pub trait TermSearch: Send + Sync {
    /// Search `label` against the label field of `ontology`
    async fn search(&self, label: &str, ontology: Ontology) -> Result<TermSearchResult>;

    /// Get service name for logging
    fn name(&self) -> &str;
}

/// Trait for cross-reference mapping services
#[async_trait::async_trait]
pub trait CrossRefLookup: Send + Sync {
    /// Look up mappings for a short-form concept ID
    async fn lookup(&self, concept_id: &str) -> Result<CrossRefMappings>;

    /// Get service name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
