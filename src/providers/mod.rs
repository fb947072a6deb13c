pub mod claude;
pub mod traits;
pub mod types;

pub use claude::ClaudeProvider;
pub use traits::CompletionClient;
pub use types::{CompletionRequest, CompletionResponse, ProviderError};
