use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hashing::sha256_hex;

/// One of the two independently searched collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corpus {
    Nodes,
    Templates,
}

impl Corpus {
    pub const ALL: [Corpus; 2] = [Corpus::Nodes, Corpus::Templates];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nodes => "nodes",
            Self::Templates => "templates",
        }
    }
}

impl fmt::Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The text fields shown to callers and fed to the embedding model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFields {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A node or template owned by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub corpus: Corpus,
    #[serde(flatten)]
    pub fields: DisplayFields,
}

impl Entity {
    pub fn new(id: impl Into<String>, corpus: Corpus, fields: DisplayFields) -> Self {
        Self {
            id: id.into(),
            corpus,
            fields,
        }
    }

    /// The exact text embedded for this entity. Empty parts are skipped so
    /// that adding an empty tag list does not change the hash.
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(4);
        let name = self.fields.name.trim();
        if !name.is_empty() {
            parts.push(name.to_string());
        }
        let description = self.fields.description.trim();
        if !description.is_empty() {
            parts.push(description.to_string());
        }
        if let Some(category) = self.fields.category.as_deref().map(str::trim) {
            if !category.is_empty() {
                parts.push(format!("Category: {category}"));
            }
        }
        let tags: Vec<&str> = self
            .fields
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !tags.is_empty() {
            parts.push(format!("Tags: {}", tags.join(", ")));
        }
        parts.join("\n")
    }

    /// SHA-256 fingerprint of [`Self::searchable_text`].
    pub fn content_hash(&self) -> String {
        sha256_hex(&self.searchable_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(description: &str, tags: &[&str]) -> Entity {
        Entity::new(
            "n1",
            Corpus::Nodes,
            DisplayFields {
                name: "HTTP Request".to_string(),
                description: description.to_string(),
                category: Some("Core".to_string()),
                tags: tags.iter().map(|t| t.to_string()).collect(),
            },
        )
    }

    #[test]
    fn searchable_text_joins_non_empty_fields() {
        let e = entity("Makes HTTP calls", &["api", " ", "rest"]);
        assert_eq!(
            e.searchable_text(),
            "HTTP Request\nMakes HTTP calls\nCategory: Core\nTags: api, rest"
        );
    }

    #[test]
    fn content_hash_tracks_text_changes() {
        let a = entity("Makes HTTP calls", &[]);
        let b = entity("Makes HTTP calls", &[]);
        let c = entity("Makes HTTPS calls", &[]);
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
        assert_eq!(a.content_hash().len(), 64);
    }

    #[test]
    fn corpus_serializes_lowercase() {
        let json = serde_json::to_string(&Corpus::Templates).unwrap();
        assert_eq!(json, "\"templates\"");
    }
}
