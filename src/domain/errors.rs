use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("document '{0}' was not found")]
    DocumentNotFound(String),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("document '{filename}' is {size_kb:.1} KB, above the {limit_kb} KB limit")]
    SizeExceeded {
        filename: String,
        size_kb: f64,
        limit_kb: u64,
    },
}
