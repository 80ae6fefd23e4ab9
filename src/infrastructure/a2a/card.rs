use super::types::{AgentCapabilities, AgentCard, AgentSkill};

const PROTOCOL_VERSION: &str = "0.3.0";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// The card served at `/.well-known/agent.json`.
pub fn build_agent_card(url: impl Into<String>) -> AgentCard {
    AgentCard {
        name: "Document Extraction Agent".to_string(),
        description: "Reads PDF documents such as invoices, bills of lading and air waybills \
                      and returns structured JSON plus a plain-language analysis."
            .to_string(),
        url: url.into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        protocol_version: Some(PROTOCOL_VERSION.to_string()),
        capabilities: AgentCapabilities {
            streaming: false,
            push_notifications: false,
        },
        default_input_modes: strings(&["text"]),
        default_output_modes: strings(&["text", "application/json"]),
        skills: vec![
            AgentSkill {
                id: "extract-pdf".to_string(),
                name: "Extract PDF data".to_string(),
                description: "Reads a PDF through the document tools and extracts its fields \
                              as JSON."
                    .to_string(),
                tags: strings(&["pdf", "extraction", "invoice", "logistics"]),
                examples: strings(&[
                    "extract invoice.pdf",
                    "analyze bill-of-lading-template.pdf",
                    "what's in document-2024.pdf?",
                    "get data from customs-form.pdf",
                    "extract shipment.pdf",
                ]),
            },
            AgentSkill {
                id: "list-pdfs".to_string(),
                name: "List available PDFs".to_string(),
                description: "Lists the PDF files the agent can read.".to_string(),
                tags: strings(&["pdf", "list"]),
                examples: strings(&[
                    "list available pdfs",
                    "what pdfs can you extract?",
                    "show me available documents",
                ]),
            },
        ],
    }
}
