use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::settings::Settings;
use super::store::SharedStore;
use crate::error::{NovaError, NovaResult};
use crate::models::Message;
use crate::providers::{CompletionClient, CompletionRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    AwaitingReply,
}

/// Held for the lifetime of one send; dropping it returns the store to
/// `Idle`, whichever way the send ends.
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn try_claim(flag: Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives one user turn: optimistic append, completion request, then commit
/// or roll back. Only one send may be in flight per store, across all chats
/// and every pipeline sharing that store.
pub struct SendPipeline {
    store: SharedStore,
    client: Arc<dyn CompletionClient>,
    settings: RwLock<Settings>,
}

impl SendPipeline {
    pub fn new(store: SharedStore, client: Arc<dyn CompletionClient>, settings: Settings) -> Self {
        Self {
            store,
            client,
            settings: RwLock::new(settings),
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub async fn state(&self) -> SendState {
        if self.store.read().await.is_sending() {
            SendState::AwaitingReply
        } else {
            SendState::Idle
        }
    }

    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    pub async fn update_settings(&self, settings: Settings) {
        *self.settings.write().await = settings;
    }

    pub async fn send(&self, chat_id: &str, text: &str) -> NovaResult<String> {
        self.send_with_cancel(chat_id, text, CancellationToken::new())
            .await
    }

    /// Like [`send`](Self::send); cancelling `cancel` while the reply is
    /// pending rolls the turn back and yields `NovaError::Cancelled`.
    pub async fn send_with_cancel(
        &self,
        chat_id: &str,
        text: &str,
        cancel: CancellationToken,
    ) -> NovaResult<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NovaError::validation("Message must not be empty"));
        }
        let send_flag = {
            let store = self.store.read().await;
            if store.find_chat(chat_id).is_none() {
                return Err(NovaError::validation(format!("Unknown chat: {chat_id}")));
            }
            store.send_flag()
        };

        let settings = self.settings().await;
        if !settings.has_api_key() {
            return Err(NovaError::validation("No API key configured"));
        }

        let _guard = InFlightGuard::try_claim(send_flag).ok_or(NovaError::Busy)?;

        let (appended_len, history) = {
            let mut store = self.store.write().await;
            let len = store.append_message(chat_id, Message::user(text))?;
            let history = store
                .find_chat(chat_id)
                .map(|c| c.messages.clone())
                .unwrap_or_default();
            (len, history)
        };

        let request = CompletionRequest {
            api_key: settings.api_key,
            model: settings.model,
            messages: history,
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(NovaError::Cancelled),
            result = self.client.complete(request) => result.map_err(NovaError::from),
        };

        let mut store = self.store.write().await;
        match outcome {
            Ok(response) => {
                tracing::debug!(
                    chat_id,
                    model = %response.model,
                    tokens_in = ?response.tokens_in,
                    tokens_out = ?response.tokens_out,
                    "Received reply"
                );
                store.append_message(chat_id, Message::assistant(response.content.clone()))?;
                if let Err(e) = store.persist() {
                    tracing::error!(chat_id, "{e}");
                }
                Ok(response.content)
            }
            Err(err) => {
                tracing::warn!(chat_id, "Send failed, rolling back: {err}");
                let current_len = store.find_chat(chat_id).map(|c| c.messages.len());
                if current_len == Some(appended_len) {
                    match store.remove_last_message(chat_id) {
                        // A structural write during the wait may have saved
                        // the optimistic message.
                        Ok(_) => {
                            if let Err(e) = store.persist() {
                                tracing::error!(chat_id, "{e}");
                            }
                        }
                        Err(e) => tracing::error!(chat_id, "Rollback failed: {e}"),
                    }
                } else {
                    tracing::warn!(
                        chat_id,
                        ?current_len,
                        appended_len,
                        "Chat changed while awaiting reply, nothing rolled back"
                    );
                }
                Err(err)
            }
        }
    }
}
