use super::types::{Artifact, Part};
use crate::application::service::UserResponse;
use serde_json::{Map, Value};

pub const EXTRACTION_ARTIFACT: &str = "extraction_result";

/// Parts for the final agent message, plus the data artifact when present.
pub fn present(response: &UserResponse) -> (Vec<Part>, Option<Artifact>) {
    let mut text = response.message.clone();
    if let Some(error) = &response.error {
        text = format!("{text}: {error}");
    }
    if response.iteration_limit_reached {
        text.push_str("\n\n(Stopped after reaching the tool-use limit; the answer may be incomplete.)");
    }
    let mut parts = vec![Part::text(text)];

    let artifact = response.data.as_ref().filter(|data| !data.is_empty()).map(|data| {
        let mut metadata = Map::new();
        metadata.insert("name".to_string(), Value::String(EXTRACTION_ARTIFACT.to_string()));
        metadata.insert(
            "mimeType".to_string(),
            Value::String("application/json".to_string()),
        );
        let part = Part::Data {
            data: data.clone(),
            metadata: Some(metadata),
        };
        parts.push(part.clone());
        Artifact {
            artifact_id: uuid::Uuid::new_v4().to_string(),
            name: Some(EXTRACTION_ARTIFACT.to_string()),
            parts: vec![part],
        }
    });

    (parts, artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_only_without_data() {
        let (parts, artifact) = present(&UserResponse::success("3 PDFs available", None));
        assert_eq!(parts, vec![Part::text("3 PDFs available")]);
        assert!(artifact.is_none());
    }

    #[test]
    fn data_goes_to_message_and_artifact() {
        let data = json!({"invoice_number": "123"}).as_object().cloned();
        let (parts, artifact) = present(&UserResponse::success("Summary", data.clone()));
        assert_eq!(parts.len(), 2);
        let artifact = artifact.expect("artifact");
        assert_eq!(artifact.name.as_deref(), Some(EXTRACTION_ARTIFACT));
        assert!(matches!(&artifact.parts[0], Part::Data { data: d, .. } if Some(d) == data.as_ref()));
    }

    #[test]
    fn errors_are_spelled_out() {
        let (parts, _) = present(&UserResponse::error("User message cannot be empty"));
        assert_eq!(
            parts[0].as_text(),
            Some("Error processing request: User message cannot be empty")
        );
    }
}
