use deepchat_core::{KnowledgeEntry, KnowledgeKind};

/// Result of processing a slash command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Reset the transcript.
    Clear,
    /// Quit the application.
    Quit,
    /// Change the model.
    ModelChanged(String),
    /// Set the OpenRouter API key.
    SetApiKey(String),
    /// Replace the system prompt.
    SystemPromptChanged(String),
    /// Add a knowledge source to the session.
    AddKnowledge(KnowledgeEntry),
    /// List the configured knowledge sources.
    ShowKnowledge,
    /// Re-send the last user message.
    Retry,
    /// Print the transcript.
    ShowHistory,
    /// Show status (model, key, message count).
    ShowStatus,
    /// Not a command - treat as regular input.
    NotACommand,
}

pub fn handle_command(input: &str) -> CommandResult {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,
        "/clear" => CommandResult::Clear,

        "/model" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /model <model-name>  (e.g. deepseek/deepseek-chat)".into())
            } else {
                CommandResult::ModelChanged(arg.to_string())
            }
        }
        "/key" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /key <openrouter-api-key>".into())
            } else {
                CommandResult::SetApiKey(arg.to_string())
            }
        }
        "/system" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /system <prompt>".into())
            } else {
                CommandResult::SystemPromptChanged(arg.to_string())
            }
        }
        "/knowledge" | "/kb" => parse_knowledge(arg),
        "/retry" => CommandResult::Retry,
        "/history" => CommandResult::ShowHistory,
        "/status" => CommandResult::ShowStatus,
        "/version" => CommandResult::Message(format!("DeepChat CLI v{}", env!("CARGO_PKG_VERSION"))),

        _ => {
            if input.starts_with('/') {
                CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands."))
            } else {
                CommandResult::NotACommand
            }
        }
    }
}

fn parse_knowledge(arg: &str) -> CommandResult {
    if arg.is_empty() {
        return CommandResult::ShowKnowledge;
    }
    let (kind, content) = arg.split_once(char::is_whitespace).unwrap_or((arg, ""));
    let content = content.trim();
    match KnowledgeKind::from(kind) {
        KnowledgeKind::Other(_) => CommandResult::Message(format!(
            "Unknown knowledge type: {kind}. Use url, text or github."
        )),
        _ if content.is_empty() => {
            CommandResult::Message("Usage: /knowledge <url|text|github> <content>".into())
        }
        kind => CommandResult::AddKnowledge(KnowledgeEntry::new(kind, content)),
    }
}

fn show_help() -> CommandResult {
    let help_text = "\
DeepChat CLI Commands

  /clear                    Reset the conversation
  /retry                    Re-send the last message after a temporary failure
  /history                  Print the conversation so far
  /model <name>             Change model
  /system <prompt>          Set the system prompt
  /key <api-key>            Set and save the OpenRouter API key
  /knowledge <type> <text>  Add a url, text or github knowledge source
  /knowledge, /kb           List knowledge sources
  /status                   Show model, key and message count
  /version                  Show version information
  /help, /h                 Show this help message
  /exit, /quit, /q          Quit";

    CommandResult::Message(help_text.into())
}
