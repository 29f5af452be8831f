mod history;
mod builder;

pub use history::{ChatMessage, Transcript};
pub use builder::{annotate_with_context, RequestBuilder};
