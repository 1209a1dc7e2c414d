//! ontomap Pipeline - Concept-to-ontology mapping orchestrator
//!
//! Drives one run end to end:
//! 1. Extract concepts under the root term from the taxonomy
//! 2. For each concept, search MONDO and EFO by label and keep the best hit
//! 3. Look the concept ID up in the cross-reference service
//! 4. Join the per-service selections into the output table
//!
//! Concepts are processed one at a time and remote calls are sequential.
//!
//! Author: hephaex@gmail.com

use std::sync::Arc;
use std::time::Instant;

use ontomap_core::{
    select_best, AppConfig, Concept, ConceptMappings, CrossRefLookup, IdNormalizer, Ontology,
    Result, TermSearch, TermSearchFailure,
};
use ontomap_lookup::{OlsClient, OxoClient};
use ontomap_taxonomy::{ConceptExtractor, Taxonomy};
use serde::Serialize;
use tracing::{debug, info, warn};

pub mod reducer;
pub mod table;

pub use reducer::{fold_events, reduce, ConceptState, MappingEvent};
pub use table::{MappingTable, COLUMNS};

// ============================================================================
// Run Summary
// ============================================================================

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Rows in the output table
    pub concepts: usize,
    /// Rows with a non-empty OLS cell
    pub with_ols_mapping: usize,
    /// Rows with a non-empty OXO cell
    pub with_oxo_mapping: usize,
    /// Remote failures that were turned into `No result`
    pub recovered_failures: usize,
    /// Wall time in milliseconds
    pub elapsed_ms: u64,
}

/// Output of a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub records: Vec<ConceptMappings>,
    pub table: MappingTable,
    pub summary: RunSummary,
}

// ============================================================================
// Mapping Pipeline
// ============================================================================

/// Maps concepts through the term-search and cross-reference services
pub struct MappingPipeline {
    /// Term search (OLS)
    term_search: Arc<dyn TermSearch>,

    /// Cross-reference lookup (OxO)
    cross_ref: Arc<dyn CrossRefLookup>,

    /// What a failed term search does to the run
    term_search_failure: TermSearchFailure,
}

impl MappingPipeline {
    /// Ontologies searched for every concept, in column order
    pub const ONTOLOGIES: [Ontology; 2] = [Ontology::Mondo, Ontology::Efo];

    /// Create a new pipeline
    pub fn new(term_search: Arc<dyn TermSearch>, cross_ref: Arc<dyn CrossRefLookup>) -> Self {
        Self {
            term_search,
            cross_ref,
            term_search_failure: TermSearchFailure::default(),
        }
    }

    /// Set term-search failure handling
    pub fn with_term_search_failure(mut self, policy: TermSearchFailure) -> Self {
        self.term_search_failure = policy;
        self
    }

    /// Run every remote call for one concept and fold the results
    pub async fn map_concept(&self, concept: Concept) -> Result<ConceptState> {
        let mut events = Vec::with_capacity(Self::ONTOLOGIES.len() + 1);

        for ontology in Self::ONTOLOGIES {
            match self.term_search.search(&concept.label, ontology).await {
                Ok(result) => {
                    let selection = select_best(&result);
                    debug!(
                        "{} {}: {} hits, selected {}",
                        concept.id, ontology, result.num_found, selection
                    );
                    events.push(MappingEvent::Selected {
                        ontology,
                        selection,
                    });
                }
                Err(e)
                    if e.is_remote()
                        && self.term_search_failure == TermSearchFailure::Sentinel =>
                {
                    warn!(
                        "{} search for {} ({:?}) failed, recording no result: {}",
                        ontology, concept.id, concept.label, e
                    );
                    events.push(MappingEvent::Recovered {
                        service: self.term_search.name().to_string(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        match self.cross_ref.lookup(&concept.id).await {
            Ok(cross_ref) => events.push(MappingEvent::CrossRef(cross_ref)),
            Err(e) => {
                warn!(
                    "{} lookup for {} failed, recording no result: {}",
                    self.cross_ref.name(),
                    concept.id,
                    e
                );
                events.push(MappingEvent::Recovered {
                    service: self.cross_ref.name().to_string(),
                    reason: e.to_string(),
                });
            }
        }

        Ok(fold_events(concept, events))
    }

    /// Map all concepts in order and assemble the table
    pub async fn run(&self, concepts: Vec<Concept>) -> Result<PipelineOutput> {
        let start = Instant::now();
        let total = concepts.len();
        let mut records = Vec::with_capacity(total);
        let mut recovered_failures = 0;

        for (index, concept) in concepts.into_iter().enumerate() {
            debug!("[{}/{}] mapping {}", index + 1, total, concept.id);
            let state = self.map_concept(concept).await?;
            recovered_failures += state.recovered_failures;
            records.push(state.mappings);
        }

        let table = MappingTable::assemble(&records);
        let summary = RunSummary {
            concepts: table.len(),
            with_ols_mapping: table
                .rows()
                .iter()
                .filter(|r| !r.ols_mappings.is_empty())
                .count(),
            with_oxo_mapping: table
                .rows()
                .iter()
                .filter(|r| !r.oxo_mappings.is_empty())
                .count(),
            recovered_failures,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };

        Ok(PipelineOutput {
            records,
            table,
            summary,
        })
    }
}

// ============================================================================
// Configured Run
// ============================================================================

/// Load the taxonomy, map every concept, and write the table.
///
/// Any fatal error returns before the output file is created.
pub async fn run_from_config(config: &AppConfig) -> Result<RunSummary> {
    let taxonomy = Taxonomy::from_path(&config.taxonomy.path)?;
    let extractor = ConceptExtractor::new(
        config.taxonomy.root_concept.clone(),
        IdNormalizer::new([config.taxonomy.concept_prefix.as_str()]),
    );
    let concepts = extractor.extract(&taxonomy)?;

    let ols = OlsClient::from_config(&config.ols)?;
    let oxo = OxoClient::from_config(&config.oxo)?;
    let pipeline = MappingPipeline::new(Arc::new(ols), Arc::new(oxo))
        .with_term_search_failure(config.pipeline.term_search_failure);

    let output = pipeline.run(concepts).await?;
    output.table.write_to_path(&config.output.path)?;

    let summary = output.summary;
    info!(
        concepts = summary.concepts,
        with_ols_mapping = summary.with_ols_mapping,
        with_oxo_mapping = summary.with_oxo_mapping,
        recovered_failures = summary.recovered_failures,
        elapsed_ms = summary.elapsed_ms,
        "Mapping run complete"
    );
    Ok(summary)
}

// ============================================================================
// Tests
// ============================================================================
