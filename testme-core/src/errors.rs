use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid answer quality: {0}")]
    InvalidQuality(i64),
    #[error("no cards to schedule")]
    EmptyDeck,
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(String),
    #[error("corrupt persisted state: {0}")]
    CorruptPersistedState(&'static str),
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error("conflict: {0}")]
    Conflict(&'static str),
}
