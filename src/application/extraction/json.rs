use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

/// A brace candidate must mention one of these to be accepted.
pub const DOMAIN_KEYWORDS: [&str; 5] = ["invoice", "vendor", "customer", "total", "date"];

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```json\s*\n(.*?)\n```").expect("valid fenced block regex"));
static BRACED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}").expect("valid brace candidate regex")
});

/// Finds the JSON object most likely to hold the extracted fields.
///
/// A fenced ```` ```json ```` block wins outright. Otherwise brace-delimited
/// substrings (one nesting level) are tried from last to first and the
/// first object mentioning a [`DOMAIN_KEYWORDS`] entry is taken. Returns an
/// empty map when nothing qualifies.
pub fn extract_json(text: &str) -> Map<String, Value> {
    for block in FENCED_JSON.captures_iter(text) {
        let Some(body) = block.get(1) else {
            continue;
        };
        match serde_json::from_str::<Value>(body.as_str().trim()) {
            Ok(Value::Object(map)) => return map,
            Ok(_) => debug!("Fenced JSON block is not an object"),
            Err(err) => debug!(%err, "Fenced JSON block did not parse"),
        }
    }

    let candidates: Vec<&str> = BRACED.find_iter(text).map(|m| m.as_str()).collect();
    for candidate in candidates.into_iter().rev() {
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) else {
            continue;
        };
        let serialized = Value::Object(map.clone()).to_string().to_lowercase();
        if DOMAIN_KEYWORDS
            .iter()
            .any(|keyword| serialized.contains(keyword))
        {
            return map;
        }
        debug!(candidate, "Skipping JSON candidate without domain keywords");
    }

    Map::new()
}

/// `text` without its fenced ```` ```json ```` blocks, for showing the prose
/// next to data that is delivered separately.
pub fn strip_json_blocks(text: &str) -> String {
    FENCED_JSON.replace_all(text, "").trim().to_string()
}
