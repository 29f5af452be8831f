pub mod error;
pub mod constants;
pub mod llm;
pub mod context;
pub mod knowledge;
pub mod credentials;
pub mod config;
pub mod session;
pub mod embed;

// Re-export key types
pub use error::{CompletionError, DeepChatError};
pub use llm::{ChatRequest, LlmClient, Message, OpenRouterClient, Role};
pub use context::{ChatMessage, RequestBuilder, Transcript};
pub use knowledge::{KnowledgeEntry, KnowledgeKind, KnowledgeProcessor, PlaceholderProcessor};
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use config::Settings;
pub use session::{ChatOptions, ChatSession, OptionsPatch, SendOutcome, SessionEvent, SkipReason};
pub use embed::{generate_embed_code, EmbedOptions, Position, Theme};
