//! Cross-encoder reranking: the HTTP client, model selection and the
//! pipeline stage that wraps them.

pub mod api_reranker;
pub mod model_selection;
pub mod stage;

pub use api_reranker::ApiReranker;
pub use model_selection::select_model;
pub use stage::{RerankOutcome, RerankStage};
