//! StorageEngine: owns ConnectionPool, implements IDocumentStore + IVectorStore
//! + ILexicalSearch, startup pragma configuration and migrations.

use std::path::Path;

use rusqlite::Connection;

use sift_core::config::StorageConfig;
use sift_core::errors::SiftResult;
use sift_core::models::{
    Corpus, CoverageStats, EmbeddingRecord, Entity, LexicalHit, SimilarityHit,
};
use sift_core::traits::{IDocumentStore, ILexicalSearch, IVectorStore};

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{embedding_ops, entity_crud, lexical_search, vector_search};

/// The main storage engine.
pub struct StorageEngine {
    pool: ConnectionPool,
    /// When true, use the read pool for read operations (file-backed mode).
    /// When false, route all reads through the writer (in-memory mode,
    /// because in-memory read pool connections are isolated databases).
    use_read_pool: bool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path) -> SiftResult<Self> {
        Self::open_with_config(path, &StorageConfig::default())
    }

    pub fn open_with_config(path: &Path, config: &StorageConfig) -> SiftResult<Self> {
        let pool = ConnectionPool::open(path, config)?;
        let engine = Self {
            pool,
            use_read_pool: true,
        };
        engine.initialize(migrations::LATEST_VERSION)?;
        Ok(engine)
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory() -> SiftResult<Self> {
        Self::open_in_memory_with_schema(migrations::LATEST_VERSION)
    }

    /// In-memory engine migrated only up to `version`. Version 1 has entity
    /// tables but no embedding columns.
    pub fn open_in_memory_with_schema(version: u32) -> SiftResult<Self> {
        let pool = ConnectionPool::open_in_memory(&StorageConfig::default())?;
        let engine = Self {
            pool,
            use_read_pool: false,
        };
        engine.initialize(version)?;
        Ok(engine)
    }

    /// Apply migrations up to the latest version (e.g. after opening an
    /// older database with `open_in_memory_with_schema`).
    pub fn migrate(&self) -> SiftResult<()> {
        self.initialize(migrations::LATEST_VERSION)
    }

    fn initialize(&self, target: u32) -> SiftResult<()> {
        self.pool
            .writer
            .with_conn(|conn| migrations::run_migrations_to(conn, target))
    }

    pub fn schema_version(&self) -> SiftResult<u32> {
        self.pool.writer.with_conn(migrations::current_version)
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Execute a read-only query on the best available connection.
    fn with_reader<F, T>(&self, f: F) -> SiftResult<T>
    where
        F: FnOnce(&Connection) -> SiftResult<T>,
    {
        if self.use_read_pool {
            self.pool.readers.with_conn(f)
        } else {
            self.pool.writer.with_conn(f)
        }
    }

    /// Insert or update many entities in one transaction.
    pub fn upsert_entities(&self, entities: &[Entity]) -> SiftResult<usize> {
        self.pool.writer.with_conn(|conn| {
            conn.execute_batch("SAVEPOINT upsert_entities")
                .map_err(|e| crate::to_storage_err(e.to_string()))?;
            match entities
                .iter()
                .try_for_each(|e| entity_crud::upsert_entity(conn, e))
            {
                Ok(()) => {
                    conn.execute_batch("RELEASE upsert_entities")
                        .map_err(|e| crate::to_storage_err(e.to_string()))?;
                    Ok(entities.len())
                }
                Err(e) => {
                    let _ = conn.execute_batch("ROLLBACK TO upsert_entities");
                    let _ = conn.execute_batch("RELEASE upsert_entities");
                    Err(e)
                }
            }
        })
    }
}

impl IDocumentStore for StorageEngine {
    fn upsert_entity(&self, entity: &Entity) -> SiftResult<()> {
        self.pool
            .writer
            .with_conn(|conn| entity_crud::upsert_entity(conn, entity))
    }

    fn get_entity(&self, corpus: Corpus, id: &str) -> SiftResult<Option<Entity>> {
        self.with_reader(|conn| entity_crud::get_entity(conn, corpus, id))
    }

    fn remove_entity(&self, corpus: Corpus, id: &str) -> SiftResult<bool> {
        self.pool
            .writer
            .with_conn(|conn| entity_crud::remove_entity(conn, corpus, id))
    }

    fn count_entities(&self, corpus: Corpus) -> SiftResult<usize> {
        self.with_reader(|conn| entity_crud::count_entities(conn, corpus))
    }
}

impl IVectorStore for StorageEngine {
    fn is_ready(&self, corpus: Corpus) -> SiftResult<bool> {
        self.with_reader(|conn| embedding_ops::has_embedding_schema(conn, corpus))
    }

    fn save(&self, corpus: Corpus, record: &EmbeddingRecord) -> SiftResult<()> {
        self.pool
            .writer
            .with_conn(|conn| embedding_ops::save_embedding(conn, corpus, record))
    }

    fn save_batch(&self, corpus: Corpus, records: &[EmbeddingRecord]) -> SiftResult<usize> {
        self.pool
            .writer
            .with_conn(|conn| embedding_ops::save_embeddings_batch(conn, corpus, records))
    }

    fn get(&self, corpus: Corpus, entity_id: &str) -> SiftResult<Option<Vec<f32>>> {
        self.with_reader(|conn| embedding_ops::get_embedding(conn, corpus, entity_id))
    }

    fn get_record(&self, corpus: Corpus, entity_id: &str) -> SiftResult<Option<EmbeddingRecord>> {
        self.with_reader(|conn| embedding_ops::get_embedding_record(conn, corpus, entity_id))
    }

    fn find_similar(
        &self,
        corpus: Corpus,
        query: &[f32],
        limit: usize,
        threshold: f64,
    ) -> SiftResult<Vec<SimilarityHit>> {
        self.with_reader(|conn| {
            embedding_ops::ensure_schema(conn, corpus)?;
            vector_search::find_similar(conn, corpus, query, limit, threshold)
        })
    }

    fn needs_embedding(&self, corpus: Corpus, limit: Option<usize>) -> SiftResult<Vec<Entity>> {
        self.with_reader(|conn| embedding_ops::needs_embedding(conn, corpus, limit))
    }

    fn coverage(&self, corpus: Corpus) -> SiftResult<CoverageStats> {
        self.with_reader(|conn| embedding_ops::coverage(conn, corpus))
    }
}

impl ILexicalSearch for StorageEngine {
    fn search(&self, corpus: Corpus, query: &str, limit: usize) -> SiftResult<Vec<LexicalHit>> {
        self.with_reader(|conn| lexical_search::search_fts(conn, corpus, query, limit))
    }
}
