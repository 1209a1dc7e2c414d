//! Table assembly and CSV output
//!
//! Rows keep the order in which the concept extractor returned concepts.

use std::fs;
use std::io::Write;
use std::path::Path;

use ontomap_core::{ConceptMappings, MapError, OutputRow, Result};
use tracing::info;

/// Column headers of the output table
pub const COLUMNS: [&str; 4] = ["concept", "label", "OLS_Mappings", "OXO_Mappings"];

/// The final mapping table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    rows: Vec<OutputRow>,
}

impl MappingTable {
    /// Build rows from per-concept records, preserving their order
    pub fn assemble(records: &[ConceptMappings]) -> Self {
        Self {
            rows: records.iter().map(OutputRow::from).collect(),
        }
    }

    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write CSV to any writer; the header is written even for an empty table
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        csv_writer
            .write_record(COLUMNS)
            .map_err(|e| MapError::Output(e.to_string()))?;

        for row in &self.rows {
            csv_writer
                .serialize(row)
                .map_err(|e| MapError::Output(e.to_string()))?;
        }

        csv_writer
            .flush()
            .map_err(|e| MapError::Output(e.to_string()))
    }

    /// Write CSV to `path`, creating parent directories
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| MapError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let file = fs::File::create(path).map_err(|e| MapError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.write_csv(file)?;
        info!("Wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontomap_core::{Concept, CrossRefMappings, SelectedMapping};

    fn record(id: &str, label: &str, mondo: &str, mesh: &str) -> ConceptMappings {
        ConceptMappings {
            concept: Concept {
                id: id.to_string(),
                uri: format!("http://purl.obolibrary.org/obo/{}", id.replace(':', "_")),
                label: label.to_string(),
            },
            mondo: SelectedMapping::found(mondo),
            efo: SelectedMapping::NoResult,
            cross_ref: CrossRefMappings {
                mesh: SelectedMapping::found(mesh),
                efo: SelectedMapping::NoResult,
            },
        }
    }

    #[test]
    fn test_assemble_preserves_order() {
        let table = MappingTable::assemble(&[
            record("DOID:9", "b", "MONDO:9", ""),
            record("DOID:1", "a", "", "MeSH:D1"),
        ]);

        let ids: Vec<_> = table.rows().iter().map(|r| r.concept.as_str()).collect();
        assert_eq!(ids, ["DOID:9", "DOID:1"]);
        assert_eq!(table.rows()[0].ols_mappings, "MONDO:9");
        assert_eq!(table.rows()[0].oxo_mappings, "");
        assert_eq!(table.rows()[1].ols_mappings, "");
        assert_eq!(table.rows()[1].oxo_mappings, "MeSH:D1");
    }

    #[test]
    fn test_write_csv_quotes_and_header() {
        let mut both = record("DOID:1909", "melanoma, malignant", "MONDO:0005105", "MeSH:D008545");
        both.efo = SelectedMapping::found("EFO:0000756");
        let table = MappingTable::assemble(&[both]);

        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "concept,label,OLS_Mappings,OXO_Mappings\n\
             DOID:1909,\"melanoma, malignant\",MONDO:0005105; EFO:0000756,MeSH:D008545\n"
        );
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let mut out = Vec::new();
        MappingTable::default().write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "concept,label,OLS_Mappings,OXO_Mappings\n"
        );
    }

    #[test]
    fn test_write_to_path_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output").join("output.csv");

        MappingTable::assemble(&[record("DOID:1", "a", "MONDO:1", "")])
            .write_to_path(&path)
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("concept,label,OLS_Mappings,OXO_Mappings\n"));
        assert!(text.contains("DOID:1,a,MONDO:1,"));
    }
}
