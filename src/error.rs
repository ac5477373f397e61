use thiserror::Error;

/// Every way the engine can fail, from schema construction through query compilation
/// and per-record evaluation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("attribute `{0}` already exists in this schema")]
    DuplicateAttribute(String),

    #[error("a record with this key already exists")]
    DuplicateKey,

    #[error("expected {expected} value(s) but got {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("unbound variable `{0}`")]
    UnboundVariable(String),

    #[error("cannot interpret `{0}` as a number")]
    NumberFormat(String),

    #[error("failed to parse expression or query: {0}")]
    Parsing(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("no table named `{0}`")]
    UnknownTable(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
