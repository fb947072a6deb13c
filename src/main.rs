use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use nova::config::{self, SETTINGS_FILE};
use nova::providers::ClaudeProvider;
use nova::services::{ConversationStore, SendPipeline, SettingsService, SnapshotFile};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let data_dir = config::data_dir()?;
    let settings = SettingsService::load(&data_dir.join(SETTINGS_FILE));
    let max_messages = settings.max_messages;

    let mut store = ConversationStore::open(SnapshotFile::in_dir(&data_dir));
    let mut chat_id = match store.unfiled_chats().first() {
        Some(chat) => chat.id.clone(),
        None => store.create_chat(None),
    };

    if let Ok(recent) = store.recent_messages(&chat_id, max_messages) {
        for message in recent {
            println!("{}: {}", message.role.as_str(), message.content);
        }
    }

    let store = store.into_shared();
    let pipeline = SendPipeline::new(store.clone(), Arc::new(ClaudeProvider::new()), settings);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/new" => {
                chat_id = store.write().await.create_chat(None);
                println!("(new chat)");
            }
            "" => {}
            text => match pipeline.send(&chat_id, text).await {
                Ok(reply) => println!("assistant: {reply}"),
                Err(e) => eprintln!("error: {e}"),
            },
        }
    }

    if let Err(e) = store.read().await.flush() {
        tracing::error!("{e}");
    }
    Ok(())
}
