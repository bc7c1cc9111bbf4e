// src/core/config.rs

use crate::core::common::WordVecError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const STORE_FILE: &str = "wordvector.bin";
const VOCABULARY_FILE: &str = "vocabulary.bin";
const FOREST_FILE: &str = "forest.ann";

/// Service configuration, read from TOML. Every field is optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the ingested store, the vocabulary and the forest.
    pub data_dir: PathBuf,
    pub vector_dimension: usize,
    pub num_trees: usize,
    /// Maximum items per leaf; `None` means `max(1, vector_dimension / 2)`.
    pub leaf_capacity: Option<usize>,
    /// Seed for forest construction; `None` draws one at build time.
    pub build_seed: Option<u64>,
    pub default_num_results: usize,
    pub max_num_results: usize,
    /// Candidate cap per query. Zero or negative searches the whole forest.
    pub search_budget: i64,
    pub listen_addr: String,
    /// Prefix for every HTTP route, e.g. `/wordvec`. Empty serves at the root.
    pub http_path_prefix: String,
    /// Segmentation dictionary for unknown single-phrase queries.
    pub dictionary: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            vector_dimension: 200,
            num_trees: 10,
            leaf_capacity: None,
            build_seed: None,
            default_num_results: 10,
            max_num_results: 100,
            search_budget: 10_000,
            listen_addr: "0.0.0.0:3721".to_string(),
            http_path_prefix: String::new(),
            dictionary: None,
        }
    }
}

/// Fluent construction of a validated [`Config`], starting from the defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.data_dir = path.into();
        self
    }

    #[must_use]
    pub fn vector_dimension(mut self, dimension: usize) -> Self {
        self.config.vector_dimension = dimension;
        self
    }

    #[must_use]
    pub fn num_trees(mut self, num_trees: usize) -> Self {
        self.config.num_trees = num_trees;
        self
    }

    #[must_use]
    pub fn leaf_capacity(mut self, leaf_capacity: usize) -> Self {
        self.config.leaf_capacity = Some(leaf_capacity);
        self
    }

    #[must_use]
    pub fn build_seed(mut self, seed: u64) -> Self {
        self.config.build_seed = Some(seed);
        self
    }

    #[must_use]
    pub fn num_results(mut self, default: usize, max: usize) -> Self {
        self.config.default_num_results = default;
        self.config.max_num_results = max;
        self
    }

    #[must_use]
    pub fn search_budget(mut self, budget: i64) -> Self {
        self.config.search_budget = budget;
        self
    }

    #[must_use]
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    #[must_use]
    pub fn http_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.http_path_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn dictionary<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.dictionary = Some(path.into());
        self
    }

    /// # Errors
    /// `Configuration` if the resulting settings fail [`Config::validate`].
    pub fn build(self) -> Result<Config, WordVecError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Config {
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    /// `Configuration` describing the first violated constraint.
    pub fn validate(&self) -> Result<(), WordVecError> {
        if self.vector_dimension == 0 {
            return Err(WordVecError::Configuration("vector_dimension must be greater than 0".to_string()));
        }
        if self.num_trees == 0 {
            return Err(WordVecError::Configuration("num_trees must be greater than 0".to_string()));
        }
        if self.leaf_capacity == Some(0) {
            return Err(WordVecError::Configuration("leaf_capacity must be greater than 0".to_string()));
        }
        if self.default_num_results == 0 {
            return Err(WordVecError::Configuration(
                "default_num_results must be greater than 0".to_string(),
            ));
        }
        if self.max_num_results < self.default_num_results {
            return Err(WordVecError::Configuration(format!(
                "max_num_results ({}) must be at least default_num_results ({})",
                self.max_num_results, self.default_num_results
            )));
        }
        self.socket_addr()?;
        if !self.http_path_prefix.is_empty()
            && (!self.http_path_prefix.starts_with('/') || self.http_path_prefix.ends_with('/'))
        {
            return Err(WordVecError::Configuration(format!(
                "http_path_prefix '{}' must start with '/' and not end with '/'",
                self.http_path_prefix
            )));
        }
        Ok(())
    }

    /// Loads configuration from a TOML file. A missing file yields the defaults.
    ///
    /// # Errors
    /// `Configuration` if the file cannot be parsed or fails validation; `Io`
    /// for other read failures.
    pub fn load_from_file(path: &Path) -> Result<Self, WordVecError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config: Self = toml::from_str(&contents).map_err(|e| {
                    WordVecError::Configuration(format!(
                        "Failed to parse config file '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                config.validate()?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(WordVecError::Io(e)),
        }
    }

    /// Loads from `optional_path` if given, otherwise returns the defaults.
    pub fn load_or_default(optional_path: Option<&Path>) -> Result<Self, WordVecError> {
        match optional_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Parsed `listen_addr`.
    pub fn socket_addr(&self) -> Result<SocketAddr, WordVecError> {
        self.listen_addr.parse().map_err(|e| {
            WordVecError::Configuration(format!("invalid listen_addr '{}': {e}", self.listen_addr))
        })
    }

    /// Ingested keyword vectors.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    /// Keyword table written next to the forest.
    #[must_use]
    pub fn vocabulary_path(&self) -> PathBuf {
        self.data_dir.join(VOCABULARY_FILE)
    }

    #[must_use]
    pub fn forest_path(&self) -> PathBuf {
        self.data_dir.join(FOREST_FILE)
    }
}
