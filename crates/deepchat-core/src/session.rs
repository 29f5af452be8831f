use crate::config::Settings;
use crate::constants::{defaults, limits, messages, models};
use crate::context::{ChatMessage, RequestBuilder, Transcript};
use crate::credentials::{CredentialStore, MemoryCredentialStore};
use crate::error::{CompletionError, DeepChatError};
use crate::knowledge::{self, KnowledgeEntry, KnowledgeProcessor, PlaceholderProcessor};
use crate::llm::{ChatRequest, LlmClient};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

/// Per-session configuration bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    pub initial_message: Option<String>,
    pub model_name: String,
    pub system_prompt: Option<String>,
    pub knowledge_base: Vec<KnowledgeEntry>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            initial_message: None,
            model_name: models::DEFAULT_MODEL.to_string(),
            system_prompt: None,
            knowledge_base: Vec::new(),
        }
    }
}

impl ChatOptions {
    /// Shallow merge: every `Some` field in `patch` overwrites ours.
    pub fn merge(&mut self, patch: OptionsPatch) {
        if let Some(initial_message) = patch.initial_message {
            self.initial_message = Some(initial_message);
        }
        if let Some(model_name) = patch.model_name {
            self.model_name = model_name;
        }
        if let Some(system_prompt) = patch.system_prompt {
            self.system_prompt = Some(system_prompt);
        }
        if let Some(knowledge_base) = patch.knowledge_base {
            self.knowledge_base = knowledge_base;
        }
    }

    fn welcome_message(&self) -> Option<&str> {
        self.initial_message.as_deref().filter(|m| !m.is_empty())
    }
}

/// Partial update for [`ChatOptions`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsPatch {
    pub initial_message: Option<String>,
    pub model_name: Option<String>,
    pub system_prompt: Option<String>,
    pub knowledge_base: Option<Vec<KnowledgeEntry>>,
}

/// Events emitted as session state changes - the front-end re-render signal.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    MessageAppended(ChatMessage),
    LoadingChanged(bool),
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    MissingCredential,
}

impl SkipReason {
    /// Validation text to show the user, if any.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            SkipReason::Blank => None,
            SkipReason::MissingCredential => Some(messages::MISSING_API_KEY),
        }
    }
}

/// What a call to [`ChatSession::send_message`] did.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// Nothing was sent and the transcript is unchanged.
    Skipped(SkipReason),
    /// Another send is still in flight.
    Busy,
    /// The assistant reply that was appended.
    Replied(ChatMessage),
    /// The completion failed; `message` is the apology that was appended.
    Failed {
        error: CompletionError,
        message: ChatMessage,
    },
}

impl SendOutcome {
    pub fn assistant_message(&self) -> Option<&ChatMessage> {
        match self {
            SendOutcome::Replied(message) | SendOutcome::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CompletionError> {
        match self {
            SendOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

struct SessionState {
    transcript: Transcript,
    api_key: String,
    options: ChatOptions,
}

impl SessionState {
    fn seed_welcome(&mut self) -> Option<ChatMessage> {
        if !self.transcript.is_empty() {
            return None;
        }
        let welcome = ChatMessage::assistant(self.options.welcome_message()?);
        self.transcript.push(welcome.clone());
        Some(welcome)
    }
}

/// One conversation: transcript, credential, options, and the client that
/// talks to the completion API. Methods take `&self`; share it behind an `Arc`.
pub struct ChatSession {
    llm: Box<dyn LlmClient>,
    knowledge: Box<dyn KnowledgeProcessor>,
    credentials: Arc<dyn CredentialStore>,
    state: Mutex<SessionState>,
    loading: AtomicBool,
    temperature: f32,
    max_tokens: u32,
    subscribers: std::sync::Mutex<Vec<UnboundedSender<SessionEvent>>>,
}

/// Clears the loading flag when the send finishes, however it finishes.
struct LoadingGuard<'a> {
    session: &'a ChatSession,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.session.loading.store(false, Ordering::Release);
        self.session.emit(SessionEvent::LoadingChanged(false));
    }
}

/// Stands in for the assistant reply while a completion is awaited. If the
/// send is dropped before [`PendingReply::settle`], the apology is appended so
/// the user message is never left unanswered.
struct PendingReply<'a> {
    session: &'a ChatSession,
    settled: bool,
}

impl PendingReply<'_> {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let message = ChatMessage::assistant(messages::COMPLETION_APOLOGY);
        match self.session.state.try_lock() {
            Ok(mut state) => state.transcript.push(message.clone()),
            Err(_) => {
                tracing::warn!("send_message cancelled while the transcript was locked");
                return;
            }
        }
        tracing::debug!("send_message cancelled before a reply arrived");
        self.session.emit(SessionEvent::MessageAppended(message));
    }
}

impl ChatSession {
    pub fn new(llm: Box<dyn LlmClient>, options: ChatOptions) -> Self {
        let mut state = SessionState {
            transcript: Transcript::new(),
            api_key: String::new(),
            options,
        };
        state.seed_welcome();

        Self {
            llm,
            knowledge: Box::new(PlaceholderProcessor),
            credentials: Arc::new(MemoryCredentialStore::new()),
            state: Mutex::new(state),
            loading: AtomicBool::new(false),
            temperature: defaults::TEMPERATURE,
            max_tokens: defaults::MAX_TOKENS,
            subscribers: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Build a session from loaded settings. The stored credential wins over
    /// the environment variable; an environment key is not persisted.
    pub fn from_settings(settings: &Settings, credentials: Arc<dyn CredentialStore>) -> Self {
        let mut session = Self::new(Box::new(settings.build_client()), settings.chat_options())
            .with_sampling(settings.api.temperature, settings.api.max_tokens)
            .with_credential_store(credentials);

        let state = session.state.get_mut();
        if state.api_key.is_empty() {
            if let Some(key) = settings.api_key() {
                state.api_key = key;
            }
        }
        session
    }

    /// Use `store` for the credential and read it once now.
    pub fn with_credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        match store.load() {
            Ok(Some(key)) => self.state.get_mut().api_key = key,
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to load saved API key: {}", e),
        }
        self.credentials = store;
        self
    }

    pub fn with_knowledge_processor(mut self, processor: Box<dyn KnowledgeProcessor>) -> Self {
        self.knowledge = processor;
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Receive [`SessionEvent`]s from now on.
    pub fn subscribe(&self) -> UnboundedReceiver<SessionEvent> {
        let (tx, rx) = unbounded_channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    fn emit(&self, event: SessionEvent) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    fn begin_loading(&self) -> Option<LoadingGuard<'_>> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        self.emit(SessionEvent::LoadingChanged(true));
        Some(LoadingGuard { session: self })
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().await.transcript.messages().to_vec()
    }

    pub async fn options(&self) -> ChatOptions {
        self.state.lock().await.options.clone()
    }

    pub async fn api_key(&self) -> String {
        self.state.lock().await.api_key.clone()
    }

    /// Set the credential; a non-empty key is also written to the store.
    pub async fn set_api_key(&self, key: impl Into<String>) -> Result<(), DeepChatError> {
        let key = key.into();
        self.state.lock().await.api_key = key.clone();
        if key.is_empty() {
            return Ok(());
        }
        self.credentials.save(&key).map_err(|e| {
            tracing::warn!("Failed to persist API key: {}", e);
            e
        })
    }

    pub async fn update_options(&self, patch: OptionsPatch) {
        let welcome = {
            let mut state = self.state.lock().await;
            state.options.merge(patch);
            state.seed_welcome()
        };
        if let Some(welcome) = welcome {
            self.emit(SessionEvent::MessageAppended(welcome));
        }
    }

    pub async fn replace_options(&self, options: ChatOptions) {
        let welcome = {
            let mut state = self.state.lock().await;
            state.options = options;
            state.seed_welcome()
        };
        if let Some(welcome) = welcome {
            self.emit(SessionEvent::MessageAppended(welcome));
        }
    }

    pub async fn append(&self, message: ChatMessage) {
        self.state.lock().await.transcript.push(message.clone());
        self.emit(SessionEvent::MessageAppended(message));
    }

    /// Reset the transcript to the welcome message, or to nothing if none is configured.
    pub async fn clear(&self) {
        let welcome = {
            let mut state = self.state.lock().await;
            state.transcript.clear();
            state.seed_welcome()
        };
        self.emit(SessionEvent::Cleared);
        if let Some(welcome) = welcome {
            self.emit(SessionEvent::MessageAppended(welcome));
        }
    }

    /// Send one user message and append the reply.
    ///
    /// Blank input and a missing credential are no-ops. Otherwise exactly one
    /// user message and then exactly one assistant message (the reply or an
    /// apology) are appended, also when the returned future is dropped early.
    pub async fn send_message(&self, content: &str) -> SendOutcome {
        if content.trim().is_empty() {
            return SendOutcome::Skipped(SkipReason::Blank);
        }

        let api_key = self.api_key().await;
        if api_key.is_empty() {
            tracing::debug!("send_message skipped: no API key set");
            return SendOutcome::Skipped(SkipReason::MissingCredential);
        }

        let Some(_loading) = self.begin_loading() else {
            return SendOutcome::Busy;
        };

        let user_message = ChatMessage::user(content);
        let (prior, options) = {
            let mut state = self.state.lock().await;
            let prior = state.transcript.last_n(limits::CONTEXT_WINDOW_MESSAGES).to_vec();
            state.transcript.push(user_message.clone());
            (prior, state.options.clone())
        };
        self.emit(SessionEvent::MessageAppended(user_message));
        let pending = PendingReply {
            session: self,
            settled: false,
        };

        let knowledge_context =
            knowledge::build_context(self.knowledge.as_ref(), &options.knowledge_base, content)
                .await;

        let outbound = RequestBuilder::new(content)
            .with_system_prompt(options.system_prompt.as_deref())
            .with_history(&prior)
            .with_window(limits::CONTEXT_WINDOW_MESSAGES)
            .with_knowledge_context(knowledge_context)
            .build();

        let model = if options.model_name.trim().is_empty() {
            models::DEFAULT_MODEL
        } else {
            options.model_name.as_str()
        };
        let request = ChatRequest::new(model, outbound)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        match self.llm.chat(&api_key, &request).await {
            Ok(reply) => {
                let message = ChatMessage::assistant(reply);
                self.append(message.clone()).await;
                pending.settle();
                SendOutcome::Replied(message)
            }
            Err(error) => {
                tracing::warn!("Error sending message: {}", error);
                let message = ChatMessage::assistant(messages::COMPLETION_APOLOGY);
                self.append(message.clone()).await;
                pending.settle();
                SendOutcome::Failed { error, message }
            }
        }
    }
}
