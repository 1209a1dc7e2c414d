//! Per-concept state reducer
//!
//! Each remote call produces one event; a concept's record is the fold
//! of its events over an all-`NoResult` starting state. Nothing outside
//! the record is mutated, so concepts stay independent of each other.

use ontomap_core::{Concept, ConceptMappings, CrossRefMappings, Ontology, SelectedMapping};

/// Outcome of one remote call for a concept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingEvent {
    /// Best match of a term search
    Selected {
        ontology: Ontology,
        selection: SelectedMapping,
    },
    /// Result of the cross-reference lookup
    CrossRef(CrossRefMappings),
    /// A failed call replaced by `NoResult`
    Recovered { service: String, reason: String },
}

/// Accumulated state for one concept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptState {
    pub mappings: ConceptMappings,
    pub recovered_failures: usize,
}

impl ConceptState {
    /// Starting state: every column `NoResult`
    pub fn new(concept: Concept) -> Self {
        Self {
            mappings: ConceptMappings {
                concept,
                mondo: SelectedMapping::NoResult,
                efo: SelectedMapping::NoResult,
                cross_ref: CrossRefMappings::no_result(),
            },
            recovered_failures: 0,
        }
    }
}

/// Apply one event
pub fn reduce(mut state: ConceptState, event: MappingEvent) -> ConceptState {
    match event {
        MappingEvent::Selected {
            ontology: Ontology::Mondo,
            selection,
        } => state.mappings.mondo = selection,
        MappingEvent::Selected {
            ontology: Ontology::Efo,
            selection,
        } => state.mappings.efo = selection,
        MappingEvent::CrossRef(cross_ref) => state.mappings.cross_ref = cross_ref,
        MappingEvent::Recovered { .. } => state.recovered_failures += 1,
    }
    state
}

/// Fold a concept's events into its final record
pub fn fold_events(concept: Concept, events: impl IntoIterator<Item = MappingEvent>) -> ConceptState {
    events.into_iter().fold(ConceptState::new(concept), reduce)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concept() -> Concept {
        Concept {
            id: "DOID:1909".to_string(),
            uri: "http://purl.obolibrary.org/obo/DOID_1909".to_string(),
            label: "melanoma".to_string(),
        }
    }

    #[test]
    fn test_no_events_is_all_no_result() {
        let state = fold_events(concept(), std::iter::empty());
        assert!(state.mappings.mondo.is_no_result());
        assert!(state.mappings.efo.is_no_result());
        assert_eq!(state.mappings.cross_ref, CrossRefMappings::no_result());
        assert_eq!(state.recovered_failures, 0);
    }

    #[test]
    fn test_events_fill_their_columns() {
        let state = fold_events(
            concept(),
            [
                MappingEvent::Selected {
                    ontology: Ontology::Mondo,
                    selection: SelectedMapping::found("MONDO:0005105"),
                },
                MappingEvent::Recovered {
                    service: "OLS".to_string(),
                    reason: "timeout".to_string(),
                },
                MappingEvent::CrossRef(CrossRefMappings {
                    mesh: SelectedMapping::found("MeSH:D008545"),
                    efo: SelectedMapping::NoResult,
                }),
            ],
        );

        assert_eq!(state.mappings.mondo, SelectedMapping::found("MONDO:0005105"));
        assert!(state.mappings.efo.is_no_result());
        assert_eq!(state.mappings.cross_ref.mesh, SelectedMapping::found("MeSH:D008545"));
        assert_eq!(state.recovered_failures, 1);
    }
}
