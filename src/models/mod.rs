pub mod chat;
pub mod message;
pub mod project;

pub use chat::{Chat, ChatLocation, PLACEHOLDER_TITLE};
pub use message::{Message, Role};
pub use project::Project;
