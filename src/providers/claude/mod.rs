mod adapter;
mod models;

pub use adapter::{ClaudeProvider, ANTHROPIC_VERSION, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS};
