use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::Message;

pub const PLACEHOLDER_TITLE: &str = "New chat";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn new(id: String) -> Self {
        Self {
            id,
            title: PLACEHOLDER_TITLE.to_string(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Where a chat lives, or where it should be moved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatLocation {
    Unfiled,
    Project(String),
}
