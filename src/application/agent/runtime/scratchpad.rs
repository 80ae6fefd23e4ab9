use crate::application::agent::directive::ToolAction;

#[derive(Debug, Clone)]
pub struct ScratchpadEntry {
    pub action: ToolAction,
    pub observation: String,
}

/// Action/observation transcript for one request. Append-only.
#[derive(Debug, Clone, Default)]
pub struct Scratchpad {
    entries: Vec<ScratchpadEntry>,
}

impl Scratchpad {
    pub fn push(&mut self, action: ToolAction, observation: String) {
        self.entries.push(ScratchpadEntry {
            action,
            observation,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ScratchpadEntry] {
        &self.entries
    }

    /// Renders the transcript in ReAct form, ready to follow `Thought: `.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| render_turn(&entry.action.log, &entry.observation))
            .collect()
    }
}

pub(crate) fn render_turn(log: &str, observation: &str) -> String {
    format!("{log}\nObservation: {observation}\nThought: ")
}
