use crate::errors::SiftResult;
use crate::models::{Corpus, LexicalHit};

/// Full-text index over one or both corpora.
pub trait ILexicalSearch: Send + Sync {
    /// Ranked hits for `query`, best first, with 1-based ranks.
    fn search(&self, corpus: Corpus, query: &str, limit: usize) -> SiftResult<Vec<LexicalHit>>;

    fn is_available(&self) -> bool {
        true
    }
}
