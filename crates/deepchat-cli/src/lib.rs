// Library interface for deepchat-cli
// This allows integration tests to access internal modules

// NOTE: Since commands.rs is also declared in main.rs, we need to use a path
// attribute to reference the same source file to avoid "file loaded multiple
// times" errors.

#[path = "commands.rs"]
pub mod commands;

pub use commands::{handle_command, CommandResult};
