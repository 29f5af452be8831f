//! Knowledge-base injection.
//!
//! Each configured entry is turned into one tagged paragraph; the paragraphs
//! are joined into a single block appended to the outgoing user message.

mod processor;

pub use processor::{KnowledgeProcessor, PlaceholderProcessor};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared source type. Types this build does not know about are kept
/// verbatim so one unfamiliar entry cannot invalidate the rest of a config.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KnowledgeKind {
    Url,
    Text,
    Github,
    Other(String),
}

impl KnowledgeKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Url => "url",
            Self::Text => "text",
            Self::Github => "github",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for KnowledgeKind {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "url" => Self::Url,
            "text" => Self::Text,
            "github" => Self::Github,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for KnowledgeKind {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<KnowledgeKind> for String {
    fn from(kind: KnowledgeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for KnowledgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-declared source meant to ground answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    #[serde(rename = "type")]
    pub kind: KnowledgeKind,
    pub content: String,
}

impl KnowledgeEntry {
    pub fn new(kind: KnowledgeKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn url(content: impl Into<String>) -> Self {
        Self::new(KnowledgeKind::Url, content)
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(KnowledgeKind::Text, content)
    }

    pub fn github(content: impl Into<String>) -> Self {
        Self::new(KnowledgeKind::Github, content)
    }
}

/// Build the context block for `query`, or `None` when there are no entries.
///
/// Entries are processed concurrently; output keeps input order. A failing
/// entry is replaced by an inline error tag and does not affect the others.
pub async fn build_context(
    processor: &dyn KnowledgeProcessor,
    entries: &[KnowledgeEntry],
    query: &str,
) -> Option<String> {
    if entries.is_empty() {
        return None;
    }

    let segments = join_all(entries.iter().map(|entry| async move {
        match processor.process(entry, query).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Error processing knowledge base ({}): {}", entry.kind, e);
                error_tag(entry)
            }
        }
    }))
    .await;

    Some(segments.join("\n\n"))
}

fn error_tag(entry: &KnowledgeEntry) -> String {
    format!("[Error processing {} source: {}]", entry.kind, entry.content)
}
