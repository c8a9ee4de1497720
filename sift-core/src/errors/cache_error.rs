/// Cache errors. Callers log and swallow these.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache full: {capacity} live entries")]
    Full { capacity: usize },
}
