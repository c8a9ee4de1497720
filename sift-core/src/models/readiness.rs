use serde::{Deserialize, Serialize};

use super::Corpus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Capability probe across subsystems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub lexical: bool,
    pub vector_nodes: bool,
    pub vector_templates: bool,
    pub embeddings: bool,
    pub reranker: bool,
}

impl ReadinessReport {
    /// Vector search needs both the schema and a provider.
    pub fn vector_ready(&self, corpus: Corpus) -> bool {
        let schema = match corpus {
            Corpus::Nodes => self.vector_nodes,
            Corpus::Templates => self.vector_templates,
        };
        schema && self.embeddings
    }

    /// Healthy when hybrid search works for both corpora, degraded when at
    /// least one branch works, unhealthy otherwise. The reranker is optional.
    pub fn status(&self) -> HealthStatus {
        let all_vector = Corpus::ALL.iter().all(|c| self.vector_ready(*c));
        let any_vector = Corpus::ALL.iter().any(|c| self.vector_ready(*c));
        if self.lexical && all_vector {
            HealthStatus::Healthy
        } else if self.lexical || any_vector {
            HealthStatus::Degraded
        } else {
            HealthStatus::Unhealthy
        }
    }
}
