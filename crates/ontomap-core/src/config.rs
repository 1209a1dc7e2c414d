//! ontomap Configuration Management
//!
//! Handles configuration from environment variables and TOML files.
//! Defaults reproduce a plain run from a directory holding `input/`
//! and `output/`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Taxonomy input and closure root
    pub taxonomy: TaxonomyConfig,

    /// Output table location
    pub output: OutputConfig,

    /// Term-search service (OLS)
    pub ols: OlsConfig,

    /// Cross-reference mapping service (OxO)
    pub oxo: OxoConfig,

    /// Per-concept failure handling
    pub pipeline: PipelineConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Taxonomy
        if let Ok(path) = std::env::var("ONTOMAP_TAXONOMY_PATH") {
            config.taxonomy.path = PathBuf::from(path);
        }
        if let Ok(root) = std::env::var("ONTOMAP_ROOT_CONCEPT") {
            config.taxonomy.root_concept = root;
        }

        // Output
        if let Ok(path) = std::env::var("ONTOMAP_OUTPUT_PATH") {
            config.output.path = PathBuf::from(path);
        }

        // Services
        if let Ok(url) = std::env::var("OLS_BASE_URL") {
            config.ols.base_url = url;
        }
        if let Ok(url) = std::env::var("OXO_BASE_URL") {
            config.oxo.base_url = url;
        }
        if let Ok(retries) = std::env::var("OXO_MAX_RETRIES") {
            config.oxo.max_retries = retries.parse().map_err(|_| ConfigError::InvalidValue {
                key: "OXO_MAX_RETRIES".to_string(),
                value: retries,
            })?;
        }

        // Pipeline
        if let Ok(policy) = std::env::var("ONTOMAP_TERM_SEARCH_FAILURE") {
            config.pipeline.term_search_failure = policy.parse()?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = Self::default();

        // Only override if env values differ from defaults
        if env_config.taxonomy.path != defaults.taxonomy.path {
            self.taxonomy.path = env_config.taxonomy.path;
        }
        if env_config.taxonomy.root_concept != defaults.taxonomy.root_concept {
            self.taxonomy.root_concept = env_config.taxonomy.root_concept;
        }
        if env_config.output.path != defaults.output.path {
            self.output.path = env_config.output.path;
        }
        if env_config.ols.base_url != defaults.ols.base_url {
            self.ols.base_url = env_config.ols.base_url;
        }
        if env_config.oxo.base_url != defaults.oxo.base_url {
            self.oxo.base_url = env_config.oxo.base_url;
        }
        if env_config.oxo.max_retries != defaults.oxo.max_retries {
            self.oxo.max_retries = env_config.oxo.max_retries;
        }
        if env_config.pipeline.term_search_failure != defaults.pipeline.term_search_failure {
            self.pipeline.term_search_failure = env_config.pipeline.term_search_failure;
        }
        if env_config.logging.level != defaults.logging.level {
            self.logging.level = env_config.logging.level;
        }

        Ok(self)
    }
}

/// Taxonomy input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// Turtle file holding the SKOS taxonomy
    pub path: PathBuf,

    /// Concept whose transitive narrower concepts are mapped
    pub root_concept: String,

    /// Base IRI stripped from concept URIs
    pub concept_prefix: String,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("input/programming_exercise.skos.ttl"),
            root_concept: "http://purl.obolibrary.org/obo/DOID_4159".to_string(),
            concept_prefix: crate::OBO_IRI_PREFIX.to_string(),
        }
    }
}

/// Output table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// CSV file to write
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("output/output.csv"),
        }
    }
}

/// OLS term-search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OlsConfig {
    /// API base URL (the `/select` endpoint is appended)
    pub base_url: String,

    /// Fields requested for each hit
    pub field_list: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OlsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://www.ebi.ac.uk/ols/api".to_string(),
            field_list: "id,iri,label,score,synonym".to_string(),
            timeout_secs: 30,
        }
    }
}

/// OxO cross-reference configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OxoConfig {
    /// API base URL (the `/mappings` endpoint is appended)
    pub base_url: String,

    /// Reconnect attempts after a connection failure
    pub max_retries: u32,

    /// Backoff factor in milliseconds; attempt n sleeps factor * 2^(n-1)
    pub backoff_factor_ms: u64,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OxoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.ebi.ac.uk/spot/oxo/api".to_string(),
            max_retries: 3,
            backoff_factor_ms: 500,
            timeout_secs: 30,
        }
    }
}

/// Pipeline behavior configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// What a failed term search does to the run
    pub term_search_failure: TermSearchFailure,
}

/// Handling of term-search transport and response errors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermSearchFailure {
    /// Abort the run on the first failure
    #[default]
    Abort,
    /// Record `No result` for that concept and ontology, then continue
    Sentinel,
}

impl std::str::FromStr for TermSearchFailure {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "sentinel" => Ok(Self::Sentinel),
            _ => Err(ConfigError::InvalidValue {
                key: "ONTOMAP_TERM_SEARCH_FAILURE".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(
            config.taxonomy.path,
            PathBuf::from("input/programming_exercise.skos.ttl")
        );
        assert_eq!(config.output.path, PathBuf::from("output/output.csv"));
        assert_eq!(config.oxo.max_retries, 3);
        assert_eq!(config.pipeline.term_search_failure, TermSearchFailure::Abort);
    }

    #[test]
    fn test_term_search_failure_parse() {
        assert_eq!(
            "abort".parse::<TermSearchFailure>().unwrap(),
            TermSearchFailure::Abort
        );
        assert_eq!(
            "Sentinel".parse::<TermSearchFailure>().unwrap(),
            TermSearchFailure::Sentinel
        );
        assert!("retry".parse::<TermSearchFailure>().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[oxo]\nmax_retries = 5\n\n[pipeline]\nterm_search_failure = \"sentinel\""
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.oxo.max_retries, 5);
        assert_eq!(config.oxo.backoff_factor_ms, 500);
        assert_eq!(
            config.pipeline.term_search_failure,
            TermSearchFailure::Sentinel
        );
        assert_eq!(config.ols.field_list, "id,iri,label,score,synonym");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = AppConfig::from_file("/nonexistent/ontomap.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }
}
