//! Recovering structured data from the agent's final prose.

mod classify;
mod json;

pub use classify::classify_document;
pub use json::{DOMAIN_KEYWORDS, extract_json, strip_json_blocks};
