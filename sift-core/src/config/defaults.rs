// Single source of truth for all default values.

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "sift.db";
pub const DEFAULT_WAL_MODE: bool = true;
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

// --- Embeddings ---
pub const DEFAULT_EMBEDDING_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 100;
pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 100;
pub const DEFAULT_COST_PER_MILLION_TOKENS: f64 = 0.02;

// --- Provider calls (embedding and rerank) ---
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// --- Rerank ---
pub const DEFAULT_RERANK_ENABLED: bool = false;
pub const DEFAULT_RERANK_API_BASE: &str = "https://api.cohere.com/v2";
pub const DEFAULT_RERANK_MODEL: &str = "rerank-english-v3.0";
pub const DEFAULT_RERANK_MULTILINGUAL_MODEL: &str = "rerank-multilingual-v3.0";
pub const DEFAULT_RERANK_MAX_DOCUMENTS: usize = 1_000;
pub const DEFAULT_RERANK_DOCUMENT_CHARS: usize = 1_000;

// --- Retrieval ---
pub const DEFAULT_RRF_K: u32 = 60;
pub const DEFAULT_ADAPTIVE_K: bool = false;
pub const DEFAULT_LEXICAL_WEIGHT: f64 = 1.0;
pub const DEFAULT_VECTOR_WEIGHT: f64 = 1.0;
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.2;
pub const DEFAULT_RESULT_LIMIT: usize = 20;
pub const DEFAULT_CANDIDATE_MULTIPLIER: usize = 3;
pub const DEFAULT_COMBINED_NODE_SHARE: f64 = 0.7;

// --- Cache ---
pub const DEFAULT_CACHE_ENABLED: bool = true;
pub const DEFAULT_RESULT_TTL_SECS: u64 = 300;
pub const DEFAULT_EMBEDDING_TTL_SECS: u64 = 86_400; // 24 hours
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 500;
pub const DEFAULT_EMBEDDING_CACHE_MAX_ENTRIES: usize = 10_000;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
pub const DEFAULT_DEGRADATION_WINDOW_SECS: i64 = 3_600;
