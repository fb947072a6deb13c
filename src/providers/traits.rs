use async_trait::async_trait;

use super::types::{CompletionRequest, CompletionResponse, ProviderError};

/// Sends an ordered conversation to a completion service and returns the
/// reply. Implementations make a single attempt and keep no state between
/// calls.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, ProviderError>;
}
