//! Configuration for every subsystem, loaded from TOML with environment overrides.

mod cache_config;
pub mod defaults;
mod embedding_config;
mod observability_config;
mod rerank_config;
mod retrieval_config;
mod storage_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use cache_config::CacheConfig;
pub use embedding_config::EmbeddingConfig;
pub use observability_config::ObservabilityConfig;
pub use rerank_config::RerankConfig;
pub use retrieval_config::RetrievalConfig;
pub use storage_config::StorageConfig;

use crate::errors::{SiftError, SiftResult};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub rerank: RerankConfig,
    pub retrieval: RetrievalConfig,
    pub cache: CacheConfig,
    pub observability: ObservabilityConfig,
}

impl SiftConfig {
    /// Parse and validate a TOML document. Missing sections take defaults.
    pub fn from_toml(toml_str: &str) -> SiftResult<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| SiftError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML, then layer process environment overrides on top.
    pub fn from_toml_with_env(toml_str: &str) -> SiftResult<Self> {
        let mut config: Self =
            toml::from_str(toml_str).map_err(|e| SiftError::ConfigError(e.to_string()))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file from disk and apply environment overrides.
    pub fn load(path: &Path) -> SiftResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SiftError::ConfigError(format!("{}: {e}", path.display())))?;
        Self::from_toml_with_env(&contents)
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> SiftResult<String> {
        toml::to_string_pretty(self).map_err(|e| SiftError::ConfigError(e.to_string()))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using an arbitrary variable lookup.
    /// Pattern: `SIFT_EMBEDDING_MODEL`, `SIFT_RERANK_ENABLED`, etc.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("SIFT_EMBEDDING_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.embedding.api_key = Some(key);
        }
        if let Some(key) = lookup("SIFT_RERANK_API_KEY").or_else(|| lookup("COHERE_API_KEY")) {
            self.rerank.api_key = Some(key);
        }
        if let Some(model) = lookup("SIFT_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(model) = lookup("SIFT_RERANK_MODEL") {
            self.rerank.model = model;
        }
        if let Some(val) = lookup("SIFT_RERANK_ENABLED") {
            if let Ok(v) = val.parse::<bool>() {
                self.rerank.enabled = v;
            }
        }
        if let Some(path) = lookup("SIFT_DB_PATH") {
            self.storage.db_path = path;
        }
    }

    /// Reject values that would make the pipeline misbehave at query time.
    pub fn validate(&self) -> SiftResult<()> {
        if self.embedding.batch_size == 0 {
            return Err(SiftError::ConfigError(
                "embedding.batch_size must be at least 1".to_string(),
            ));
        }
        if self.retrieval.rrf_k == 0 {
            return Err(SiftError::ConfigError(
                "retrieval.rrf_k must be at least 1".to_string(),
            ));
        }
        for (name, weight) in [
            ("retrieval.lexical_weight", self.retrieval.lexical_weight),
            ("retrieval.vector_weight", self.retrieval.vector_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(SiftError::ConfigError(format!(
                    "{name} must be a finite non-negative number, got {weight}"
                )));
            }
        }
        let threshold = self.retrieval.similarity_threshold;
        if !(-1.0..=1.0).contains(&threshold) {
            return Err(SiftError::ConfigError(format!(
                "retrieval.similarity_threshold must be within [-1, 1], got {threshold}"
            )));
        }
        let share = self.retrieval.combined_node_share;
        if !(share > 0.0 && share < 1.0) {
            return Err(SiftError::ConfigError(format!(
                "retrieval.combined_node_share must be within (0, 1), got {share}"
            )));
        }
        Ok(())
    }
}
