use crate::errors::SiftResult;
use crate::models::{Corpus, Entity};

/// The store that owns entities. The engine only reads display fields;
/// writers elsewhere keep it populated.
pub trait IDocumentStore: Send + Sync {
    fn upsert_entity(&self, entity: &Entity) -> SiftResult<()>;
    fn get_entity(&self, corpus: Corpus, id: &str) -> SiftResult<Option<Entity>>;
    /// Removing an entity also removes its embedding. Returns false if it did not exist.
    fn remove_entity(&self, corpus: Corpus, id: &str) -> SiftResult<bool>;
    fn count_entities(&self, corpus: Corpus) -> SiftResult<usize>;
}
