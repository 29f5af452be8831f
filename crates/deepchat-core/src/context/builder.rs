use super::history::ChatMessage;
use crate::constants::{limits, messages};
use crate::llm::Message;

/// Assembles the outbound message list for one completion:
/// system prompt, a bounded window of prior messages, then the new user turn.
pub struct RequestBuilder<'a> {
    system_prompt: Option<&'a str>,
    history: &'a [ChatMessage],
    window: usize,
    user_content: String,
    knowledge_context: Option<String>,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(user_content: impl Into<String>) -> Self {
        Self {
            system_prompt: None,
            history: &[],
            window: limits::CONTEXT_WINDOW_MESSAGES,
            user_content: user_content.into(),
            knowledge_context: None,
        }
    }

    /// Blank prompts are ignored.
    pub fn with_system_prompt(mut self, prompt: Option<&'a str>) -> Self {
        self.system_prompt = prompt.filter(|p| !p.trim().is_empty());
        self
    }

    /// Messages already in the transcript before the current user turn.
    pub fn with_history(mut self, history: &'a [ChatMessage]) -> Self {
        self.history = history;
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_knowledge_context(mut self, context: Option<String>) -> Self {
        self.knowledge_context = context;
        self
    }

    pub fn build(self) -> Vec<Message> {
        let start = self.history.len().saturating_sub(self.window);
        let prior = &self.history[start..];

        let mut out = Vec::with_capacity(prior.len() + 2);
        if let Some(system) = self.system_prompt {
            out.push(Message::system(system));
        }
        out.extend(prior.iter().map(ChatMessage::to_wire));

        let content = match self.knowledge_context {
            Some(context) => annotate_with_context(&self.user_content, &context),
            None => self.user_content,
        };
        out.push(Message::user(content));
        out
    }
}

/// Append a knowledge block to the user's message.
pub fn annotate_with_context(content: &str, context: &str) -> String {
    format!("{}\n\n{}\n{}", content, messages::CONTEXT_HEADER, context)
}
