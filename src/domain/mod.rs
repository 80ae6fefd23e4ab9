pub mod document;
pub mod errors;
pub mod extraction;
pub mod types;

pub use document::{Document, DocumentType};
pub use errors::DomainError;
pub use extraction::ExtractionResult;
