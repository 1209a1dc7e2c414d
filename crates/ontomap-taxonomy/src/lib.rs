//! ontomap Taxonomy - SKOS loading and concept extraction
//!
//! Loads a Turtle-serialized SKOS taxonomy into an in-memory RDF store
//! and runs the `skos:broader*` closure query that selects every concept
//! under a root term, paired with its preferred label.
//!
//! Author: hephaex@gmail.com

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ontomap_core::{Concept, IdNormalizer, MapError, Result};
use oxigraph::io::RdfFormat;
use oxigraph::model::{NamedNode, Term};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use tracing::{debug, info};

const SKOS_PREFIXES: &str = r#"
    PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
    PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
"#;

// ============================================================================
// Taxonomy Graph
// ============================================================================

/// A parsed taxonomy graph
pub struct Taxonomy {
    store: Store,
}

impl Taxonomy {
    /// Parse a Turtle file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| MapError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let taxonomy = Self::from_turtle(BufReader::new(file))?;
        info!("Loaded taxonomy from {}", path.display());
        Ok(taxonomy)
    }

    /// Parse Turtle from any reader
    pub fn from_turtle(reader: impl Read) -> Result<Self> {
        let store = Store::new().map_err(|e| MapError::Parse(format!("store init: {e}")))?;
        store
            .load_from_reader(RdfFormat::Turtle, reader)
            .map_err(|e| MapError::Parse(e.to_string()))?;

        Ok(Self { store })
    }

    /// Number of triples in the graph
    pub fn len(&self) -> Result<usize> {
        self.store
            .len()
            .map_err(|e| MapError::Query(format!("store size: {e}")))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Whether any `skos:broader` statement exists
    pub fn has_broader_relations(&self) -> Result<bool> {
        let query = format!("{SKOS_PREFIXES} ASK {{ ?narrower skos:broader ?broader . }}");

        match self.run(&query)? {
            QueryResults::Boolean(found) => Ok(found),
            _ => Err(MapError::Query("ASK query returned solutions".to_string())),
        }
    }

    /// `(uri, label)` for the root and everything transitively narrower than it
    pub fn concepts_under(&self, root: &str) -> Result<Vec<(String, String)>> {
        let root = NamedNode::new(root)
            .map_err(|e| MapError::Query(format!("invalid root IRI {root}: {e}")))?;

        let query = format!(
            r#"{SKOS_PREFIXES}
            SELECT ?concept ?label
            WHERE {{
                ?concept skos:prefLabel ?label .
                ?concept skos:broader* {root} .
            }}"#
        );

        let QueryResults::Solutions(solutions) = self.run(&query)? else {
            return Err(MapError::Query("SELECT query returned no solutions".to_string()));
        };

        let mut rows = Vec::new();
        for solution in solutions {
            let solution = solution.map_err(|e| MapError::Query(e.to_string()))?;

            let concept = match solution.get("concept") {
                Some(Term::NamedNode(node)) => node.as_str().to_string(),
                Some(other) => {
                    debug!("Skipping non-IRI concept {}", other);
                    continue;
                }
                None => return Err(MapError::Query("Missing ?concept binding".to_string())),
            };

            let label = match solution.get("label") {
                Some(Term::Literal(literal)) => literal.value().to_string(),
                Some(other) => other.to_string(),
                None => return Err(MapError::Query("Missing ?label binding".to_string())),
            };

            rows.push((concept, label));
        }

        Ok(rows)
    }

    fn run(&self, query: &str) -> Result<QueryResults> {
        self.store
            .query(query)
            .map_err(|e| MapError::Query(e.to_string()))
    }
}

// ============================================================================
// Concept Extractor
// ============================================================================

/// Extracts the concepts to map from a taxonomy
#[derive(Debug, Clone)]
pub struct ConceptExtractor {
    root: String,
    normalizer: IdNormalizer,
}

impl ConceptExtractor {
    /// Create an extractor rooted at `root`
    pub fn new(root: impl Into<String>, normalizer: IdNormalizer) -> Self {
        Self {
            root: root.into(),
            normalizer,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Run the closure query and build concepts in query order.
    ///
    /// A concept with several preferred labels is kept once, with the
    /// first label the query returns.
    pub fn extract(&self, taxonomy: &Taxonomy) -> Result<Vec<Concept>> {
        if !taxonomy.has_broader_relations()? {
            return Err(MapError::Query(
                "taxonomy has no skos:broader statements".to_string(),
            ));
        }

        let rows = taxonomy.concepts_under(&self.root)?;
        if rows.is_empty() {
            return Err(MapError::Query(format!(
                "no labelled concepts under {}",
                self.root
            )));
        }

        let mut seen = HashSet::new();
        let concepts: Vec<Concept> = rows
            .into_iter()
            .filter(|(uri, _)| seen.insert(uri.clone()))
            .map(|(uri, label)| Concept::new(uri, label, &self.normalizer))
            .collect();

        info!(
            "Extracted {} concepts under {}",
            concepts.len(),
            self.root
        );
        Ok(concepts)
    }
}

// ============================================================================
// Tests
// ============================================================================
