use anyhow::{bail, Result};
use deepchat_core::{
    generate_embed_code, ChatMessage, ChatSession, CredentialStore, EmbedOptions,
    FileCredentialStore, MemoryCredentialStore, OptionsPatch, Role, SendOutcome, Settings,
};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{self, CommandResult};

// ── Session setup ───────────────────────────────────────────────────────

pub async fn build_session(settings: &Settings, api_key: Option<&str>) -> ChatSession {
    let store: Arc<dyn CredentialStore> = match FileCredentialStore::new() {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!("Credential store unavailable, key will not be saved: {e}");
            Arc::new(MemoryCredentialStore::new())
        }
    };

    let session = ChatSession::from_settings(settings, store);
    if let Some(key) = api_key {
        if let Err(e) = session.set_api_key(key).await {
            eprintln!("Warning: could not save API key: {e}");
        }
    }
    session
}

// ── Single-prompt mode ──────────────────────────────────────────────────

pub async fn run_single_prompt(session: &ChatSession, prompt: &str) -> Result<()> {
    match session.send_message(prompt).await {
        SendOutcome::Replied(message) => {
            println!("{}", message.content);
            Ok(())
        }
        SendOutcome::Failed { error, .. } => bail!("{error}"),
        SendOutcome::Skipped(reason) => {
            bail!(reason.message().unwrap_or("Nothing to send."))
        }
        SendOutcome::Busy => bail!("Another request is still in flight."),
    }
}

// ── Interactive mode ────────────────────────────────────────────────────

pub async fn run_interactive(session: &ChatSession) -> Result<()> {
    let options = session.options().await;
    println!("DeepChat ({}) - type /help for commands.", options.model_name);
    for message in session.messages().await {
        print_message(&message);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_failed: Option<String> = None;

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        let to_send = match commands::handle_command(input) {
            CommandResult::NotACommand => input.to_string(),
            CommandResult::Quit => break,
            CommandResult::Message(text) => {
                println!("{text}");
                continue;
            }
            CommandResult::Clear => {
                session.clear().await;
                last_failed = None;
                for message in session.messages().await {
                    print_message(&message);
                }
                continue;
            }
            CommandResult::ModelChanged(model) => {
                session
                    .update_options(OptionsPatch {
                        model_name: Some(model.clone()),
                        ..OptionsPatch::default()
                    })
                    .await;
                println!("Model set to {model}");
                continue;
            }
            CommandResult::SystemPromptChanged(prompt) => {
                session
                    .update_options(OptionsPatch {
                        system_prompt: Some(prompt),
                        ..OptionsPatch::default()
                    })
                    .await;
                println!("System prompt updated.");
                continue;
            }
            CommandResult::SetApiKey(key) => {
                match session.set_api_key(key).await {
                    Ok(()) => println!("API key saved."),
                    Err(e) => println!("API key set for this session, but not saved: {e}"),
                }
                continue;
            }
            CommandResult::AddKnowledge(entry) => {
                let mut knowledge_base = session.options().await.knowledge_base;
                println!("Added {} source: {}", entry.kind, entry.content);
                knowledge_base.push(entry);
                session
                    .update_options(OptionsPatch {
                        knowledge_base: Some(knowledge_base),
                        ..OptionsPatch::default()
                    })
                    .await;
                continue;
            }
            CommandResult::ShowKnowledge => {
                let knowledge_base = session.options().await.knowledge_base;
                if knowledge_base.is_empty() {
                    println!("No knowledge sources. Add one with /knowledge <type> <content>.");
                }
                for (i, entry) in knowledge_base.iter().enumerate() {
                    println!("{:>3}. [{}] {}", i + 1, entry.kind, entry.content);
                }
                continue;
            }
            CommandResult::ShowHistory => {
                for message in session.messages().await {
                    print_message(&message);
                }
                continue;
            }
            CommandResult::ShowStatus => {
                print_status(session).await;
                continue;
            }
            CommandResult::Retry => match last_failed.take() {
                Some(content) => content,
                None => {
                    println!("Nothing to retry.");
                    continue;
                }
            },
        };

        match session.send_message(&to_send).await {
            SendOutcome::Replied(message) => print_message(&message),
            SendOutcome::Failed { error, message } => {
                print_message(&message);
                if error.is_retryable() {
                    eprintln!("[temporary failure: {}] Type /retry to send again.", error.reason());
                    last_failed = Some(to_send);
                } else {
                    eprintln!("[error: {}]", error.reason());
                }
            }
            SendOutcome::Skipped(reason) => {
                if let Some(text) = reason.message() {
                    eprintln!("{text} Use /key <api-key>.");
                }
            }
            SendOutcome::Busy => eprintln!("Still waiting for the previous reply."),
        }
    }

    Ok(())
}

async fn print_status(session: &ChatSession) {
    let options = session.options().await;
    let key = session.api_key().await;
    let key_state = if key.is_empty() { "not set" } else { "set" };
    println!("Model:     {}", options.model_name);
    println!("API key:   {key_state}");
    println!("Knowledge: {} entries", options.knowledge_base.len());
    println!("Messages:  {}", session.messages().await.len());
}

fn print_message(message: &ChatMessage) {
    let who = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
        Role::System => "system",
    };
    println!(
        "[{} {}] {}",
        message.timestamp.format("%H:%M"),
        who,
        message.content
    );
}

// ── Embed snippet ───────────────────────────────────────────────────────

pub fn print_embed(options: &EmbedOptions, script_url: &str) {
    println!("{}", generate_embed_code(options, script_url));
}
