pub mod conversation;
pub mod pipeline;
pub mod settings;
pub mod snapshot;
pub mod store;

pub use pipeline::{SendPipeline, SendState};
pub use settings::{Settings, SettingsService};
pub use snapshot::{migrate_legacy, Snapshot, SnapshotFile, SnapshotOrigin};
pub use store::{ConversationStore, SharedStore, StoreEvent};
