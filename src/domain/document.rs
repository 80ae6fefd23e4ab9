use super::errors::DomainError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    BillOfLading,
    AirWaybill,
    Invoice,
    PackingList,
    Unknown,
}

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::BillOfLading => "BILL_OF_LADING",
            DocumentType::AirWaybill => "AIR_WAYBILL",
            DocumentType::Invoice => "INVOICE",
            DocumentType::PackingList => "PACKING_LIST",
            DocumentType::Unknown => "UNKNOWN",
        }
    }

    /// Accepts labels such as `bill of lading`, `Air-Waybill` or `INVOICE`.
    pub fn from_label(value: &str) -> Option<Self> {
        let normalized = value.trim().to_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "BILL_OF_LADING" => Some(DocumentType::BillOfLading),
            "AIR_WAYBILL" => Some(DocumentType::AirWaybill),
            "INVOICE" => Some(DocumentType::Invoice),
            "PACKING_LIST" => Some(DocumentType::PackingList),
            "UNKNOWN" => Some(DocumentType::Unknown),
            _ => None,
        }
    }

    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            DocumentType::BillOfLading => &[
                "shipper",
                "consignee",
                "port_of_loading",
                "port_of_discharge",
            ],
            DocumentType::AirWaybill => &[
                "shipper",
                "consignee",
                "airport_of_departure",
                "airport_of_destination",
            ],
            DocumentType::Invoice => &["invoice_number", "date", "total_amount"],
            DocumentType::PackingList | DocumentType::Unknown => &[],
        }
    }
}

/// A PDF the agent is asked to work on. The bytes stay with the tool server;
/// only the name and on-disk size are known locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    filename: String,
    size_bytes: u64,
}

impl Document {
    pub fn new(filename: impl Into<String>, size_bytes: u64) -> Result<Self, DomainError> {
        let filename = filename.into();
        if filename.trim().is_empty() {
            return Err(DomainError::InvalidDocument(
                "document must have a filename".into(),
            ));
        }
        if !filename.to_lowercase().ends_with(".pdf") {
            return Err(DomainError::InvalidDocument(format!(
                "document must be a PDF file: {filename}"
            )));
        }
        Ok(Self {
            filename,
            size_bytes,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn is_empty(&self) -> bool {
        self.size_bytes == 0
    }

    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }

    pub fn exceeds_size_limit(&self, max_size_kb: u64) -> bool {
        self.size_kb() > max_size_kb as f64
    }

    pub fn ensure_within_limit(&self, max_size_kb: u64) -> Result<(), DomainError> {
        if self.exceeds_size_limit(max_size_kb) {
            return Err(DomainError::SizeExceeded {
                filename: self.filename.clone(),
                size_kb: self.size_kb(),
                limit_kb: max_size_kb,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_normalized_before_matching() {
        assert_eq!(
            DocumentType::from_label("bill of lading"),
            Some(DocumentType::BillOfLading)
        );
        assert_eq!(
            DocumentType::from_label("Air-Waybill"),
            Some(DocumentType::AirWaybill)
        );
        assert_eq!(DocumentType::from_label("receipt"), None);
    }

    #[test]
    fn rejects_non_pdf_names() {
        let err = Document::new("notes.txt", 10).expect_err("not a pdf");
        assert!(matches!(err, DomainError::InvalidDocument(_)));
        assert!(Document::new("  ", 10).is_err());
        assert!(Document::new("Invoice.PDF", 10).is_ok());
    }

    #[test]
    fn size_limit_is_measured_in_kilobytes() {
        let doc = Document::new("big.pdf", 3 * 1024).expect("valid");
        assert!(!doc.exceeds_size_limit(3));
        assert!(doc.exceeds_size_limit(2));
        let err = doc.ensure_within_limit(2).expect_err("too big");
        assert!(matches!(err, DomainError::SizeExceeded { limit_kb: 2, .. }));
    }
}
