//! Mapping rules
//!
//! Pure functions that turn raw service results into table cells:
//! ID normalization, best-match selection, and the cross-service
//! aggregation that joins per-service selections into one string.
//!
//! Author: hephaex@gmail.com

use crate::{CrossRefMappings, SelectedMapping, TermSearchResult, OBO_IRI_PREFIX};

/// Separator between identifiers inside one mapping cell
pub const MAPPING_SEPARATOR: &str = "; ";

// ============================================================================
// ID Normalizer
// ============================================================================

/// Converts concept URIs into short-form codes (`.../DOID_4159` -> `DOID:4159`)
#[derive(Debug, Clone)]
pub struct IdNormalizer {
    prefixes: Vec<String>,
}

impl IdNormalizer {
    /// Create a normalizer that knows the given base IRIs
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Normalizer for OBO Foundry IRIs
    pub fn obo() -> Self {
        Self::new([OBO_IRI_PREFIX])
    }

    /// Strip the first matching prefix and turn `_` into `:`.
    ///
    /// URIs with no known prefix are returned unchanged.
    pub fn shorten(&self, uri: &str) -> String {
        self.prefixes
            .iter()
            .find_map(|prefix| uri.strip_prefix(prefix.as_str()))
            .filter(|local| !local.is_empty())
            .map(|local| local.replace('_', ":"))
            .unwrap_or_else(|| uri.to_string())
    }
}

// ============================================================================
// Best-Match Selector
// ============================================================================

/// Pick one mapping from a term-search result.
///
/// A single hit is taken as-is; with several hits the first one in service
/// order wins (no re-ranking by score); no hits gives `NoResult`.
pub fn select_best(result: &TermSearchResult) -> SelectedMapping {
    let chosen = if result.num_found == 0 {
        None
    } else {
        result.candidates.first()
    };

    chosen
        .map(|hit| {
            let normalizer = IdNormalizer::new([hit.ontology.iri_prefix()]);
            SelectedMapping::found(normalizer.shorten(&hit.iri))
        })
        .unwrap_or(SelectedMapping::NoResult)
}

// ============================================================================
// Cross-Service Mapping Aggregator
// ============================================================================

/// Treat an EFO selection that is still an OBO IRI as `NoResult`.
///
/// EFO search sometimes echoes MONDO terms back; those are already
/// covered by the MONDO column. Only this direction is checked.
pub fn guard_efo_selection(efo: &SelectedMapping) -> SelectedMapping {
    match efo {
        SelectedMapping::Found(value) if value.starts_with(OBO_IRI_PREFIX) => {
            SelectedMapping::NoResult
        }
        other => other.clone(),
    }
}

/// Join selections with `"; "`, dropping sentinels and their separators.
///
/// Two sentinels give an empty string. Identical values are emitted once.
pub fn join_mappings<'a, I>(selections: I) -> String
where
    I: IntoIterator<Item = &'a SelectedMapping>,
{
    let mut values: Vec<&str> = Vec::new();
    for value in selections.into_iter().filter_map(SelectedMapping::value) {
        if !values.contains(&value) {
            values.push(value);
        }
    }
    values.join(MAPPING_SEPARATOR)
}

/// OLS column: MONDO then EFO
pub fn aggregate_ols(mondo: &SelectedMapping, efo: &SelectedMapping) -> String {
    let efo = guard_efo_selection(efo);
    join_mappings([mondo, &efo])
}

/// OXO column: MeSH then EFO-via-crossref
pub fn aggregate_oxo(cross_ref: &CrossRefMappings) -> String {
    join_mappings([&cross_ref.mesh, &cross_ref.efo])
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CandidateMatch, Ontology, EFO_IRI_PREFIX};
    use proptest::prelude::*;

    fn hit(ontology: Ontology, iri: &str) -> CandidateMatch {
        CandidateMatch {
            iri: iri.to_string(),
            label: None,
            score: None,
            ontology,
        }
    }

    fn found(v: &str) -> SelectedMapping {
        SelectedMapping::Found(v.to_string())
    }

    #[test]
    fn test_normalizer_strips_obo_prefix() {
        let n = IdNormalizer::obo();
        assert_eq!(n.shorten("http://purl.obolibrary.org/obo/DOID_4159"), "DOID:4159");
    }

    #[test]
    fn test_normalizer_unknown_prefix_unchanged() {
        let n = IdNormalizer::obo();
        assert_eq!(
            n.shorten("http://www.orpha.net/ORDO/Orphanet_101"),
            "http://www.orpha.net/ORDO/Orphanet_101"
        );
        assert_eq!(n.shorten(OBO_IRI_PREFIX), OBO_IRI_PREFIX);
    }

    #[test]
    fn test_normalizer_multiple_prefixes() {
        let n = IdNormalizer::new([OBO_IRI_PREFIX, EFO_IRI_PREFIX]);
        assert_eq!(n.shorten("http://www.ebi.ac.uk/efo/EFO_0000400"), "EFO:0000400");
    }

    #[test]
    fn test_select_single_hit() {
        let result = TermSearchResult {
            num_found: 1,
            candidates: vec![hit(
                Ontology::Mondo,
                "http://purl.obolibrary.org/obo/MONDO_0005148",
            )],
        };
        assert_eq!(select_best(&result), found("MONDO:0005148"));
    }

    #[test]
    fn test_select_first_of_many_ignores_score() {
        let mut low = hit(Ontology::Efo, "http://www.ebi.ac.uk/efo/EFO_0000001");
        low.score = Some(1.0);
        let mut high = hit(Ontology::Efo, "http://www.ebi.ac.uk/efo/EFO_0000002");
        high.score = Some(99.0);

        let result = TermSearchResult {
            num_found: 57,
            candidates: vec![low, high],
        };
        assert_eq!(select_best(&result), found("EFO:0000001"));
    }

    #[test]
    fn test_select_no_hits() {
        assert_eq!(select_best(&TermSearchResult::empty()), SelectedMapping::NoResult);
    }

    #[test]
    fn test_select_count_without_docs() {
        let result = TermSearchResult {
            num_found: 3,
            candidates: vec![],
        };
        assert_eq!(select_best(&result), SelectedMapping::NoResult);
    }

    #[test]
    fn test_efo_search_echoing_mondo_is_no_result() {
        let result = TermSearchResult {
            num_found: 1,
            candidates: vec![hit(
                Ontology::Efo,
                "http://purl.obolibrary.org/obo/MONDO_0005148",
            )],
        };
        let efo = select_best(&result);
        assert_eq!(efo, found("http://purl.obolibrary.org/obo/MONDO_0005148"));

        let ols = aggregate_ols(&found("MONDO:0005148"), &efo);
        assert_eq!(ols, "MONDO:0005148");
    }

    #[test]
    fn test_join_both_sentinels_is_empty() {
        assert_eq!(
            aggregate_ols(&SelectedMapping::NoResult, &SelectedMapping::NoResult),
            ""
        );
    }

    #[test]
    fn test_join_drops_sentinel_and_separator() {
        assert_eq!(aggregate_ols(&found("X"), &SelectedMapping::NoResult), "X");
        assert_eq!(aggregate_ols(&SelectedMapping::NoResult, &found("Y")), "Y");
        assert_eq!(aggregate_ols(&found("X"), &found("Y")), "X; Y");
    }

    #[test]
    fn test_join_keeps_ids_containing_sentinel_text() {
        let odd = found("No result; EFO:1");
        assert_eq!(
            join_mappings([&odd, &SelectedMapping::NoResult]),
            "No result; EFO:1"
        );
    }

    #[test]
    fn test_oxo_aggregate() {
        let xref = CrossRefMappings {
            mesh: found("MeSH:D001"),
            efo: SelectedMapping::NoResult,
        };
        assert_eq!(aggregate_oxo(&xref), "MeSH:D001");
        assert_eq!(aggregate_oxo(&CrossRefMappings::no_result()), "");
    }

    #[test]
    fn test_join_suppresses_duplicates() {
        assert_eq!(aggregate_ols(&found("EFO:1"), &found("EFO:1")), "EFO:1");
    }

    proptest! {
        #[test]
        fn prop_join_never_emits_sentinel(a in "[A-Z]{2,5}:[0-9]{1,7}", use_a in any::<bool>(), use_b in any::<bool>()) {
            let left = if use_a { found(&a) } else { SelectedMapping::NoResult };
            let right = if use_b { found(&format!("{a}0")) } else { SelectedMapping::NoResult };
            let joined = join_mappings([&left, &right]);

            prop_assert!(!joined.contains(crate::NO_RESULT));
            prop_assert!(!joined.starts_with(MAPPING_SEPARATOR));
            prop_assert!(!joined.ends_with(MAPPING_SEPARATOR));
            prop_assert_eq!(joined.is_empty(), !use_a && !use_b);
        }
    }
}
