use super::{KnowledgeEntry, KnowledgeKind};
use crate::error::DeepChatError;

/// Turns one knowledge entry into a context paragraph.
///
/// A retrieving implementation needs bounded fetch timeouts, content-size
/// caps, per-kind extraction, and a cache keyed by source and content hash.
#[async_trait::async_trait]
pub trait KnowledgeProcessor: Send + Sync {
    async fn process(&self, entry: &KnowledgeEntry, query: &str) -> Result<String, DeepChatError>;
}

/// Emits templated paragraphs without fetching anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderProcessor;

#[async_trait::async_trait]
impl KnowledgeProcessor for PlaceholderProcessor {
    async fn process(&self, entry: &KnowledgeEntry, _query: &str) -> Result<String, DeepChatError> {
        let c = &entry.content;
        Ok(match &entry.kind {
            KnowledgeKind::Url => format!(
                "[Context from URL: {c}]: This is simulated content extracted from the website at {c}. \
                 In a real implementation, this would contain actual content crawled from the URL."
            ),
            KnowledgeKind::Github => format!(
                "[Context from GitHub: {c}]: This is simulated content from the GitHub repository at {c}. \
                 In a real implementation, this would contain actual content from GitHub files."
            ),
            KnowledgeKind::Text => format!("[Context from uploaded content]: {c}"),
            KnowledgeKind::Other(kind) => format!("[Context from {kind}]: {c}"),
        })
    }
}
