//! The ReAct prompt sent on every turn.

use crate::application::tooling::ToolDescriptor;

const TEMPLATE: &str = r#"You are a document extraction agent. You read PDF files (invoices, bills of lading, air waybills, packing lists) through tools and extract structured data from them.

RULES:
1. Always use the tools to read PDF content. Never guess or invent file names, contents or field values.
2. If you are unsure of a filename, call list_available_pdfs first.
3. Call read_doc_contents with the exact filename before describing any document.
4. After each Action, stop. The system supplies the Observation; never write it yourself.
5. Base your answer only on what the observations contain.

When you give the Final Answer:
- First describe what you found in plain language.
- Then add the extracted fields as a ```json fenced block, including a "document_type" field.
- If no tool has been used yet, say that you need to read the PDF first.

You have access to the following tools:
{tools}

Use EXACTLY this format:

Thought: what to do next
Action: the tool to use, one of [{tool_names}]
Action Input: the input for the tool
Observation: the result of the tool
... (Thought/Action/Action Input/Observation can repeat)
Thought: I now know the answer
Final Answer: the analysis followed by the JSON block

Question: {input}
Thought: {agent_scratchpad}"#;

/// Renders the prompt with the tool catalog and transcript filled in.
pub fn render_prompt(question: &str, tools: &[ToolDescriptor], scratchpad: &str) -> String {
    let catalog = tools
        .iter()
        .map(|tool| format!("{}: {}", tool.name, tool.description))
        .collect::<Vec<_>>()
        .join("\n");
    let names = tools
        .iter()
        .map(|tool| tool.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    fill(
        TEMPLATE,
        &[
            ("tools", catalog.as_str()),
            ("tool_names", names.as_str()),
            ("input", question),
            ("agent_scratchpad", scratchpad),
        ],
    )
}

/// Single pass over the template, so substituted text is never rescanned.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let value = tail.split_once('}').and_then(|(name, _)| {
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(key, value)| (key.len(), *value))
        });
        match value {
            Some((name_len, value)) => {
                out.push_str(value);
                rest = &tail[name_len + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}
