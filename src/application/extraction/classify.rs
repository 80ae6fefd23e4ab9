use crate::domain::DocumentType;
use serde_json::{Map, Value};

const DOCUMENT_TYPE_FIELD: &str = "document_type";

/// Keyword scan, checked in priority order against the upper-cased text.
const TEXT_MARKERS: [(&[&str], DocumentType); 3] = [
    (&["BILL OF LADING", "B/L"], DocumentType::BillOfLading),
    (&["AIR WAYBILL", "AWB"], DocumentType::AirWaybill),
    (&["INVOICE"], DocumentType::Invoice),
];

/// Best-effort document type. An explicit, recognised `document_type`
/// field wins; otherwise the raw text is scanned for marker phrases.
pub fn classify_document(data: &Map<String, Value>, text: &str) -> DocumentType {
    if let Some(kind) = data
        .get(DOCUMENT_TYPE_FIELD)
        .and_then(Value::as_str)
        .and_then(DocumentType::from_label)
    {
        return kind;
    }

    let upper = text.to_uppercase();
    TEXT_MARKERS
        .iter()
        .find(|(markers, _)| markers.iter().any(|marker| upper.contains(marker)))
        .map(|(_, kind)| *kind)
        .unwrap_or(DocumentType::Unknown)
}
