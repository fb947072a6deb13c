use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chat::Chat;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub chats: Vec<Chat>,
    /// Presentation hint only; the core never reads it.
    #[serde(default)]
    pub expanded: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            chats: Vec::new(),
            expanded: true,
            created_at: Utc::now(),
        }
    }
}
