use deepchat_cli::commands::{handle_command, CommandResult};
use deepchat_core::KnowledgeEntry;

// ========================================================================
// Command Parsing Tests (commands.rs)
// ========================================================================

#[test]
fn test_help_command() {
    let result = handle_command("/help");
    if let CommandResult::Message(msg) = result {
        assert!(msg.contains("DeepChat CLI Commands"));
        assert!(msg.contains("/retry"));
        assert!(msg.contains("/key"));
    } else {
        panic!("expected help message");
    }
}

#[test]
fn test_help_command_short_alias() {
    assert!(matches!(handle_command("/h"), CommandResult::Message(_)));
}

#[test]
fn test_quit_aliases() {
    for cmd in ["/exit", "/quit", "/q"] {
        assert_eq!(handle_command(cmd), CommandResult::Quit);
    }
}

#[test]
fn test_clear_command() {
    assert_eq!(handle_command("/clear"), CommandResult::Clear);
}

#[test]
fn test_model_command_with_arg() {
    assert_eq!(
        handle_command("/model  openai/gpt-4o "),
        CommandResult::ModelChanged("openai/gpt-4o".to_string())
    );
}

#[test]
fn test_model_command_without_arg_shows_usage() {
    match handle_command("/model") {
        CommandResult::Message(msg) => assert!(msg.starts_with("Usage: /model")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_key_command() {
    assert_eq!(
        handle_command("/key sk-or-v1-abc"),
        CommandResult::SetApiKey("sk-or-v1-abc".to_string())
    );
    assert!(matches!(handle_command("/key"), CommandResult::Message(_)));
}

#[test]
fn test_system_command_keeps_full_prompt() {
    assert_eq!(
        handle_command("/system You are a friendly support agent."),
        CommandResult::SystemPromptChanged("You are a friendly support agent.".to_string())
    );
}

#[test]
fn test_misc_commands() {
    assert_eq!(handle_command("/retry"), CommandResult::Retry);
    assert_eq!(handle_command("/history"), CommandResult::ShowHistory);
    assert_eq!(handle_command("/status"), CommandResult::ShowStatus);
}

#[test]
fn test_version_command() {
    match handle_command("/version") {
        CommandResult::Message(msg) => assert!(msg.starts_with("DeepChat CLI v")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_unknown_command() {
    match handle_command("/frobnicate") {
        CommandResult::Message(msg) => assert!(msg.contains("Unknown command: /frobnicate")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_plain_text_is_not_a_command() {
    assert_eq!(handle_command("What are your opening hours?"), CommandResult::NotACommand);
    assert_eq!(handle_command(""), CommandResult::NotACommand);
}

#[test]
fn test_knowledge_command_adds_entry() {
    assert_eq!(
        handle_command("/knowledge url https://docs.example.com"),
        CommandResult::AddKnowledge(KnowledgeEntry::url("https://docs.example.com"))
    );
    assert_eq!(
        handle_command("/kb text Refunds take five working days."),
        CommandResult::AddKnowledge(KnowledgeEntry::text("Refunds take five working days."))
    );
}

#[test]
fn test_knowledge_command_without_args_lists_sources() {
    assert_eq!(handle_command("/knowledge"), CommandResult::ShowKnowledge);
}

#[test]
fn test_knowledge_command_rejects_bad_input() {
    match handle_command("/knowledge pdf manual.pdf") {
        CommandResult::Message(msg) => assert!(msg.contains("Unknown knowledge type: pdf")),
        other => panic!("unexpected {other:?}"),
    }
    match handle_command("/knowledge github") {
        CommandResult::Message(msg) => assert!(msg.starts_with("Usage: /knowledge")),
        other => panic!("unexpected {other:?}"),
    }
}
