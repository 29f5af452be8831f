mod traits;
mod openrouter;

pub use traits::*;
pub use openrouter::OpenRouterClient;
