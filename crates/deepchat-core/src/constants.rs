/// DeepChat — centralized constants.
/// Defaults, endpoints, limits and user-facing strings live here.

// ─── Models ───────────────────────────────────────────────────────────────────

pub mod models {
    pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat";
}

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api";
    pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
    pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
}

// ─── Request Defaults ─────────────────────────────────────────────────────────

pub mod defaults {
    pub const TEMPERATURE: f32 = 0.7;
    pub const MAX_TOKENS: u32 = 2000;
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;
    pub const APP_TITLE: &str = "DeepChat";
}

// ─── Limits ───────────────────────────────────────────────────────────────────

pub mod limits {
    /// Prior transcript messages sent along with each new user message.
    pub const CONTEXT_WINDOW_MESSAGES: usize = 10;
}

// ─── Messages ─────────────────────────────────────────────────────────────────

pub mod messages {
    pub const COMPLETION_APOLOGY: &str = "I'm sorry, I encountered an error while processing your request. Please try again later.";
    pub const MISSING_API_KEY: &str = "Please enter an OpenRouter API key to continue.";
    pub const CONTEXT_HEADER: &str = "Available context information:";
}

// ─── Embed Snippet ────────────────────────────────────────────────────────────

pub mod embed {
    pub const ELEMENT_ID_PREFIX: &str = "deepchat-widget";
    pub const SCRIPT_FILE: &str = "chatbot-widget.js";
    pub const GLOBAL_NAME: &str = "DeepChatWidget";
    pub const DEFAULT_WIDTH: u32 = 400;
    pub const DEFAULT_HEIGHT: u32 = 600;
}

// ─── Config Paths ─────────────────────────────────────────────────────────────

pub mod paths {
    pub const CONFIG_DIR: &str = "deepchat";
    pub const CONFIG_FILE: &str = "config.toml";
    pub const CREDENTIALS_FILE: &str = "credentials.json";
    /// Storage key the API credential is persisted under.
    pub const API_KEY_STORAGE_KEY: &str = "openrouter_api_key";
}
