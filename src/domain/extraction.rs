use super::document::DocumentType;
use super::errors::DomainError;
use serde::Serialize;
use serde_json::{Map, Value};

const HIGH_CONFIDENCE: f64 = 0.8;

/// Structured fields recovered from one document.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub document_type: DocumentType,
    pub extracted_data: Map<String, Value>,
    pub confidence_score: f64,
    pub analysis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl ExtractionResult {
    pub fn new(
        document_type: DocumentType,
        extracted_data: Map<String, Value>,
        confidence_score: f64,
        analysis: impl Into<String>,
        filename: Option<String>,
    ) -> Result<Self, DomainError> {
        if !(0.0..=1.0).contains(&confidence_score) {
            return Err(DomainError::Extraction(
                "confidence score must be between 0 and 1".into(),
            ));
        }
        if extracted_data.is_empty() {
            return Err(DomainError::Extraction(
                "extraction result must contain data".into(),
            ));
        }
        Ok(Self {
            document_type,
            extracted_data,
            confidence_score,
            analysis: analysis.into(),
            filename,
        })
    }

    pub fn is_high_confidence(&self) -> bool {
        self.confidence_score >= HIGH_CONFIDENCE
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.document_type
            .required_fields()
            .iter()
            .copied()
            .filter(|field| !self.extracted_data.contains_key(*field))
            .collect()
    }

    pub fn field_count(&self) -> usize {
        self.extracted_data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object payload")
    }

    #[test]
    fn rejects_empty_payloads_and_bad_scores() {
        assert!(
            ExtractionResult::new(DocumentType::Invoice, Map::new(), 0.9, "", None).is_err()
        );
        let data = payload(json!({"invoice_number": "1"}));
        assert!(ExtractionResult::new(DocumentType::Invoice, data, 1.5, "", None).is_err());
    }

    #[test]
    fn completeness_follows_document_type() {
        let data = payload(json!({
            "invoice_number": "INV-7",
            "date": "2024-01-02",
        }));
        let result =
            ExtractionResult::new(DocumentType::Invoice, data, 0.9, "analysis", None).expect("ok");
        assert!(result.is_high_confidence());
        assert!(!result.is_complete());
        assert_eq!(result.missing_fields(), vec!["total_amount"]);
        assert_eq!(result.field_count(), 2);

        let unknown = ExtractionResult::new(
            DocumentType::Unknown,
            payload(json!({"anything": 1})),
            0.5,
            "",
            None,
        )
        .expect("ok");
        assert!(unknown.is_complete());
        assert!(!unknown.is_high_confidence());
    }
}
