/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("entity not found: {corpus}/{id}")]
    EntityNotFound { corpus: String, id: String },

    #[error("vector schema not ready for corpus {corpus}")]
    SchemaNotReady { corpus: String },
}
