use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use super::conversation::{new_id, truncate_title};
use super::snapshot::{Snapshot, SnapshotFile, SnapshotOrigin};
use crate::error::{NovaError, NovaResult};
use crate::models::{Chat, ChatLocation, Message, Project};

pub type SharedStore = Arc<RwLock<ConversationStore>>;

const EVENT_CAPACITY: usize = 64;

/// Emitted after every committed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Loaded,
    ProjectCreated { id: String },
    ProjectRenamed { id: String },
    ProjectToggled { id: String, expanded: bool },
    ProjectDeleted { id: String, removed_chats: Vec<String> },
    ChatCreated { id: String, location: ChatLocation },
    ChatRenamed { id: String },
    ChatDeleted { id: String },
    ChatMoved { id: String, to: ChatLocation },
    MessageAppended { chat_id: String, len: usize },
    MessageRemoved { chat_id: String, len: usize },
}

/// The project/chat/message hierarchy.
///
/// Chat ids are unique across unfiled chats and every project combined, and
/// each chat sits in exactly one container. All mutations take `&mut self`,
/// so wrapping the store in [`SharedStore`] serializes writers while readers
/// share the last committed state. The store also owns the send flag, so at
/// most one send is in flight per store no matter how many pipelines use it.
pub struct ConversationStore {
    unfiled: Vec<Chat>,
    projects: Vec<Project>,
    file: Option<SnapshotFile>,
    events: broadcast::Sender<StoreEvent>,
    sending: Arc<AtomicBool>,
}

impl ConversationStore {
    /// A store that never touches the disk.
    pub fn in_memory() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            unfiled: Vec::new(),
            projects: Vec::new(),
            file: None,
            events,
            sending: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Load the persisted snapshot, migrating a legacy one if that is all
    /// there is. A migrated snapshot, or one whose duplicate ids had to be
    /// reissued, is written back once ids are unique.
    pub fn open(file: SnapshotFile) -> Self {
        let (snapshot, origin) = file.load_or_migrate();
        let mut store = Self::in_memory();
        store.file = Some(file);
        let reissued = store.apply_snapshot(snapshot);

        if origin == SnapshotOrigin::Legacy || reissued > 0 {
            if let Err(e) = store.persist() {
                tracing::error!(?origin, reissued, "{e}");
            }
        }
        store
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn unfiled_chats(&self) -> &[Chat] {
        &self.unfiled
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Whether a send is awaiting its reply.
    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// The flag every send pipeline on this store claims before sending.
    pub(crate) fn send_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.sending)
    }

    // --- Projects ---

    pub fn create_project(&mut self, name: &str) -> NovaResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NovaError::validation("Project name must not be empty"));
        }

        let id = new_id();
        self.projects
            .insert(0, Project::new(id.clone(), name.to_string()));
        self.commit(StoreEvent::ProjectCreated { id: id.clone() });
        Ok(id)
    }

    /// Returns `Ok(false)` when the project is unknown.
    pub fn rename_project(&mut self, id: &str, name: &str) -> NovaResult<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NovaError::validation("Project name must not be empty"));
        }

        let Some(project) = self.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        project.name = name.to_string();
        self.commit(StoreEvent::ProjectRenamed { id: id.to_string() });
        Ok(true)
    }

    /// Removes the project together with its chats. Returns `true` when
    /// `active_chat_id` was one of them, so the caller can clear its
    /// selection.
    pub fn delete_project(&mut self, id: &str, active_chat_id: Option<&str>) -> bool {
        let Some(index) = self.projects.iter().position(|p| p.id == id) else {
            return false;
        };

        let project = self.projects.remove(index);
        let removed_chats: Vec<String> = project.chats.into_iter().map(|c| c.id).collect();
        let active_removed =
            active_chat_id.is_some_and(|active| removed_chats.iter().any(|c| c == active));

        self.commit(StoreEvent::ProjectDeleted {
            id: id.to_string(),
            removed_chats,
        });
        active_removed
    }

    /// Flips the expanded hint. Returns the new value, `None` if unknown.
    pub fn toggle_expanded(&mut self, id: &str) -> Option<bool> {
        let project = self.projects.iter_mut().find(|p| p.id == id)?;
        project.expanded = !project.expanded;
        let expanded = project.expanded;
        self.commit(StoreEvent::ProjectToggled {
            id: id.to_string(),
            expanded,
        });
        Some(expanded)
    }

    // --- Chats ---

    /// An unknown parent falls back to the unfiled list.
    pub fn create_chat(&mut self, parent_project_id: Option<&str>) -> String {
        let id = new_id();
        let chat = Chat::new(id.clone());

        let location = match parent_project_id
            .and_then(|pid| self.projects.iter_mut().find(|p| p.id == pid))
        {
            Some(project) => {
                project.chats.insert(0, chat);
                ChatLocation::Project(project.id.clone())
            }
            None => {
                self.unfiled.insert(0, chat);
                ChatLocation::Unfiled
            }
        };

        self.commit(StoreEvent::ChatCreated {
            id: id.clone(),
            location,
        });
        id
    }

    pub fn rename_chat(&mut self, id: &str, title: &str) -> NovaResult<bool> {
        let title = title.trim();
        if title.is_empty() {
            return Err(NovaError::validation("Chat title must not be empty"));
        }

        let Some(chat) = self.find_chat_mut(id) else {
            return Ok(false);
        };
        chat.title = title.to_string();
        self.commit(StoreEvent::ChatRenamed { id: id.to_string() });
        Ok(true)
    }

    pub fn delete_chat(&mut self, id: &str) -> bool {
        if self.take_chat(id).is_none() {
            return false;
        }
        self.commit(StoreEvent::ChatDeleted { id: id.to_string() });
        true
    }

    /// Moves a chat to the head of `target`. Both ends are resolved before
    /// anything changes, and the detach/insert happens under one `&mut self`
    /// so no reader can observe the chat in zero or two containers.
    pub fn move_chat(&mut self, id: &str, target: &ChatLocation) -> NovaResult<()> {
        if self.find_chat(id).is_none() {
            return Err(NovaError::validation(format!("Unknown chat: {id}")));
        }
        if let ChatLocation::Project(pid) = target {
            if self.project(pid).is_none() {
                return Err(NovaError::validation(format!("Unknown project: {pid}")));
            }
        }

        let chat = self
            .take_chat(id)
            .ok_or_else(|| NovaError::validation(format!("Unknown chat: {id}")))?;

        match target {
            ChatLocation::Unfiled => self.unfiled.insert(0, chat),
            ChatLocation::Project(pid) => match self.projects.iter_mut().find(|p| &p.id == pid) {
                Some(project) => project.chats.insert(0, chat),
                // Resolved above; unreachable while we hold `&mut self`.
                None => self.unfiled.insert(0, chat),
            },
        }

        self.commit(StoreEvent::ChatMoved {
            id: id.to_string(),
            to: target.clone(),
        });
        Ok(())
    }

    /// Unfiled chats first, then each project in list order.
    pub fn find_chat(&self, id: &str) -> Option<&Chat> {
        self.unfiled.iter().find(|c| c.id == id).or_else(|| {
            self.projects
                .iter()
                .flat_map(|p| p.chats.iter())
                .find(|c| c.id == id)
        })
    }

    pub fn chat_location(&self, id: &str) -> Option<ChatLocation> {
        if self.unfiled.iter().any(|c| c.id == id) {
            return Some(ChatLocation::Unfiled);
        }
        self.projects
            .iter()
            .find(|p| p.chats.iter().any(|c| c.id == id))
            .map(|p| ChatLocation::Project(p.id.clone()))
    }

    // --- Messages ---

    /// Appends and returns the new length. The first message of a chat
    /// sets its title.
    pub fn append_message(&mut self, chat_id: &str, message: Message) -> NovaResult<usize> {
        let chat = self
            .find_chat_mut(chat_id)
            .ok_or_else(|| NovaError::validation(format!("Unknown chat: {chat_id}")))?;

        if chat.messages.is_empty() {
            chat.title = truncate_title(&message.content);
        }
        chat.messages.push(message);
        let len = chat.messages.len();

        self.emit(StoreEvent::MessageAppended {
            chat_id: chat_id.to_string(),
            len,
        });
        Ok(len)
    }

    pub fn remove_last_message(&mut self, chat_id: &str) -> NovaResult<Message> {
        let chat = self
            .find_chat_mut(chat_id)
            .ok_or_else(|| NovaError::validation(format!("Unknown chat: {chat_id}")))?;

        let removed = chat
            .messages
            .pop()
            .ok_or_else(|| NovaError::validation(format!("Chat {chat_id} has no messages")))?;
        let len = chat.messages.len();

        self.emit(StoreEvent::MessageRemoved {
            chat_id: chat_id.to_string(),
            len,
        });
        Ok(removed)
    }

    /// The last `n` messages of a chat, oldest first.
    pub fn recent_messages(&self, chat_id: &str, n: usize) -> NovaResult<&[Message]> {
        let chat = self
            .find_chat(chat_id)
            .ok_or_else(|| NovaError::validation(format!("Unknown chat: {chat_id}")))?;
        let start = chat.messages.len().saturating_sub(n);
        Ok(&chat.messages[start..])
    }

    // --- Snapshot ---

    pub fn serialize(&self) -> Snapshot {
        Snapshot {
            projects: self.projects.clone(),
            chats_without_project: self.unfiled.clone(),
        }
    }

    /// Replace the whole hierarchy.
    pub fn load(&mut self, snapshot: Snapshot) {
        let reissued = self.apply_snapshot(snapshot);
        if reissued > 0 {
            tracing::warn!(reissued, "Loaded snapshot had duplicate ids");
        }
        self.emit(StoreEvent::Loaded);
    }

    /// Write the current state to disk. A store without a backing file
    /// succeeds trivially.
    pub fn persist(&self) -> NovaResult<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        file.write(&self.serialize())
            .map_err(|e| NovaError::Persistence(format!("{e:#}")))
    }

    /// Final write at shutdown.
    pub fn flush(&self) -> NovaResult<()> {
        self.persist()?;
        if let Some(file) = &self.file {
            tracing::info!(path = %file.path().display(), "Flushed conversations");
        }
        Ok(())
    }

    /// Returns how many ids had to be reissued.
    fn apply_snapshot(&mut self, snapshot: Snapshot) -> usize {
        let Snapshot {
            mut projects,
            chats_without_project: mut unfiled,
        } = snapshot;

        let mut chat_ids = HashSet::new();
        let mut project_ids = HashSet::new();
        let mut reissued = 0;
        for chat in &mut unfiled {
            reissued += claim_unique(&mut chat_ids, &mut chat.id, "chat");
        }
        for project in &mut projects {
            reissued += claim_unique(&mut project_ids, &mut project.id, "project");
            for chat in &mut project.chats {
                reissued += claim_unique(&mut chat_ids, &mut chat.id, "chat");
            }
        }

        self.projects = projects;
        self.unfiled = unfiled;
        reissued
    }

    fn find_chat_mut(&mut self, id: &str) -> Option<&mut Chat> {
        if let Some(index) = self.unfiled.iter().position(|c| c.id == id) {
            return self.unfiled.get_mut(index);
        }
        self.projects
            .iter_mut()
            .flat_map(|p| p.chats.iter_mut())
            .find(|c| c.id == id)
    }

    fn take_chat(&mut self, id: &str) -> Option<Chat> {
        if let Some(index) = self.unfiled.iter().position(|c| c.id == id) {
            return Some(self.unfiled.remove(index));
        }
        for project in &mut self.projects {
            if let Some(index) = project.chats.iter().position(|c| c.id == id) {
                return Some(project.chats.remove(index));
            }
        }
        None
    }

    /// Persist, then notify. A failed write is logged and the in-memory
    /// state stands.
    fn commit(&self, event: StoreEvent) {
        if let Err(e) = self.persist() {
            tracing::error!(?event, "{e}");
        }
        self.emit(event);
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Returns 1 when `id` was already taken and has been replaced.
fn claim_unique(seen: &mut HashSet<String>, id: &mut String, kind: &str) -> usize {
    if seen.insert(id.clone()) {
        return 0;
    }
    let fresh = new_id();
    tracing::warn!(old = %id, new = %fresh, "Duplicate {kind} id in snapshot, reissued");
    *id = fresh.clone();
    seen.insert(fresh);
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, PLACEHOLDER_TITLE};

    fn containers_holding(store: &ConversationStore, id: &str) -> usize {
        let unfiled = store.unfiled_chats().iter().filter(|c| c.id == id).count();
        let filed: usize = store
            .projects()
            .iter()
            .map(|p| p.chats.iter().filter(|c| c.id == id).count())
            .sum();
        unfiled + filed
    }

    #[test]
    fn test_create_project_rejects_blank_name() {
        let mut store = ConversationStore::in_memory();
        let err = store.create_project("   ").unwrap_err();
        assert!(matches!(err, NovaError::Validation(_)));
        assert!(store.projects().is_empty());
    }

    #[test]
    fn test_new_entities_go_to_the_head() {
        let mut store = ConversationStore::in_memory();
        let p1 = store.create_project("One").unwrap();
        let p2 = store.create_project("Two").unwrap();
        assert_eq!(store.projects()[0].id, p2);
        assert_eq!(store.projects()[1].id, p1);

        let c1 = store.create_chat(None);
        let c2 = store.create_chat(None);
        assert_eq!(store.unfiled_chats()[0].id, c2);
        assert_eq!(store.unfiled_chats()[1].id, c1);
        assert_eq!(store.unfiled_chats()[0].title, PLACEHOLDER_TITLE);
    }

    #[test]
    fn test_create_chat_in_project_or_fallback() {
        let mut store = ConversationStore::in_memory();
        let p = store.create_project("Work").unwrap();

        let filed = store.create_chat(Some(p.as_str()));
        assert_eq!(store.project(&p).unwrap().chats[0].id, filed);
        assert_eq!(
            store.chat_location(&filed),
            Some(ChatLocation::Project(p.clone()))
        );

        let orphan = store.create_chat(Some("no-such-project"));
        assert_eq!(store.unfiled_chats()[0].id, orphan);
        assert_eq!(store.chat_location(&orphan), Some(ChatLocation::Unfiled));
    }

    #[test]
    fn test_ids_unique_under_rapid_creation() {
        let mut store = ConversationStore::in_memory();
        let mut seen = HashSet::new();
        for _ in 0..500 {
            assert!(seen.insert(store.create_project("p").unwrap()));
            assert!(seen.insert(store.create_chat(None)));
        }
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut store = ConversationStore::in_memory();
        let c = store.create_chat(None);

        assert!(!store.rename_project("missing", "x").unwrap());
        assert!(!store.delete_project("missing", Some(c.as_str())));
        assert_eq!(store.toggle_expanded("missing"), None);
        assert!(!store.delete_chat("missing"));
        assert!(!store.rename_chat("missing", "x").unwrap());
        assert_eq!(store.unfiled_chats().len(), 1);
    }

    #[test]
    fn test_rename_and_toggle_project() {
        let mut store = ConversationStore::in_memory();
        let p = store.create_project("Old").unwrap();

        assert!(store.rename_project(&p, " New ").unwrap());
        assert_eq!(store.project(&p).unwrap().name, "New");
        assert!(store.rename_project(&p, "").is_err());

        let initial = store.project(&p).unwrap().expanded;
        assert_eq!(store.toggle_expanded(&p), Some(!initial));
        assert_eq!(store.toggle_expanded(&p), Some(initial));
    }

    #[test]
    fn test_delete_project_cascades_and_reports_active_chat() {
        let mut store = ConversationStore::in_memory();
        let p = store.create_project("P").unwrap();
        let inside = store.create_chat(Some(p.as_str()));
        let outside = store.create_chat(None);

        assert!(!store.delete_project(&p, Some(outside.as_str())));
        assert!(store.find_chat(&inside).is_none());
        assert!(store.find_chat(&outside).is_some());

        let p = store.create_project("P2").unwrap();
        let active = store.create_chat(Some(p.as_str()));
        assert!(store.delete_project(&p, Some(active.as_str())));
        assert!(store.projects().is_empty());
    }

    #[test]
    fn test_delete_chat_from_any_container() {
        let mut store = ConversationStore::in_memory();
        let p = store.create_project("P").unwrap();
        let filed = store.create_chat(Some(p.as_str()));
        let unfiled = store.create_chat(None);

        assert!(store.delete_chat(&filed));
        assert!(store.delete_chat(&unfiled));
        assert!(store.project(&p).unwrap().chats.is_empty());
        assert!(store.unfiled_chats().is_empty());
    }

    #[test]
    fn test_move_between_projects() {
        let mut store = ConversationStore::in_memory();
        let p1 = store.create_project("P1").unwrap();
        let c1 = store.create_chat(Some(p1.as_str()));
        let p2 = store.create_project("P2").unwrap();
        let c2 = store.create_chat(Some(p2.as_str()));

        store
            .move_chat(&c1, &ChatLocation::Project(p2.clone()))
            .unwrap();

        assert!(store.project(&p1).unwrap().chats.is_empty());
        let ids: Vec<&str> = store
            .project(&p2)
            .unwrap()
            .chats
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec![c1.as_str(), c2.as_str()]);
        assert_eq!(containers_holding(&store, &c1), 1);
    }

    #[test]
    fn test_move_to_unfiled_and_back() {
        let mut store = ConversationStore::in_memory();
        let p = store.create_project("P").unwrap();
        let c = store.create_chat(Some(p.as_str()));

        store.move_chat(&c, &ChatLocation::Unfiled).unwrap();
        assert_eq!(store.chat_location(&c), Some(ChatLocation::Unfiled));
        assert_eq!(containers_holding(&store, &c), 1);

        store
            .move_chat(&c, &ChatLocation::Project(p.clone()))
            .unwrap();
        assert_eq!(store.chat_location(&c), Some(ChatLocation::Project(p)));
        assert_eq!(containers_holding(&store, &c), 1);
    }

    #[test]
    fn test_move_rejects_unknown_chat_or_target_without_change() {
        let mut store = ConversationStore::in_memory();
        let c = store.create_chat(None);
        let before = store.serialize();

        let err = store
            .move_chat(&c, &ChatLocation::Project("nope".into()))
            .unwrap_err();
        assert!(matches!(err, NovaError::Validation(_)));
        let err = store.move_chat("nope", &ChatLocation::Unfiled).unwrap_err();
        assert!(matches!(err, NovaError::Validation(_)));

        assert_eq!(store.serialize(), before);
    }

    #[test]
    fn test_find_chat_searches_unfiled_then_projects() {
        let mut store = ConversationStore::in_memory();
        let p = store.create_project("P").unwrap();
        let filed = store.create_chat(Some(p.as_str()));
        let unfiled = store.create_chat(None);

        assert_eq!(store.find_chat(&filed).unwrap().id, filed);
        assert_eq!(store.find_chat(&unfiled).unwrap().id, unfiled);
        assert!(store.find_chat("missing").is_none());
    }

    #[test]
    fn test_first_message_sets_title_only_once() {
        let mut store = ConversationStore::in_memory();
        let c = store.create_chat(None);

        assert_eq!(store.append_message(&c, Message::user("Hello")).unwrap(), 1);
        assert_eq!(store.find_chat(&c).unwrap().title, "Hello");

        store.append_message(&c, Message::assistant("Hi")).unwrap();
        store.append_message(&c, Message::user("Other")).unwrap();
        assert_eq!(store.find_chat(&c).unwrap().title, "Hello");
    }

    #[test]
    fn test_append_then_remove_restores_sequence() {
        let mut store = ConversationStore::in_memory();
        let c = store.create_chat(None);
        store.append_message(&c, Message::user("a")).unwrap();
        store.append_message(&c, Message::assistant("b")).unwrap();
        let before = store.find_chat(&c).unwrap().messages.clone();

        store.append_message(&c, Message::user("c")).unwrap();
        let removed = store.remove_last_message(&c).unwrap();

        assert_eq!(removed.role, Role::User);
        assert_eq!(removed.content, "c");
        assert_eq!(store.find_chat(&c).unwrap().messages, before);
    }

    #[test]
    fn test_message_ops_reject_unknown_or_empty() {
        let mut store = ConversationStore::in_memory();
        let c = store.create_chat(None);

        assert!(matches!(
            store.append_message("missing", Message::user("x")),
            Err(NovaError::Validation(_))
        ));
        assert!(matches!(
            store.remove_last_message(&c),
            Err(NovaError::Validation(_))
        ));
        assert!(matches!(
            store.remove_last_message("missing"),
            Err(NovaError::Validation(_))
        ));
    }

    #[test]
    fn test_recent_messages_returns_suffix() {
        let mut store = ConversationStore::in_memory();
        let c = store.create_chat(None);
        for i in 0..5 {
            store.append_message(&c, Message::user(format!("m{i}"))).unwrap();
        }

        let tail: Vec<&str> = store
            .recent_messages(&c, 2)
            .unwrap()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(tail, vec!["m3", "m4"]);
        assert_eq!(store.recent_messages(&c, 50).unwrap().len(), 5);
        assert!(store.recent_messages(&c, 0).unwrap().is_empty());
        assert!(store.recent_messages("missing", 3).is_err());
    }

    #[test]
    fn test_events_follow_mutations() {
        let mut store = ConversationStore::in_memory();
        let mut rx = store.subscribe();

        let p = store.create_project("P").unwrap();
        let c = store.create_chat(Some(p.as_str()));
        store.move_chat(&c, &ChatLocation::Unfiled).unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            StoreEvent::ProjectCreated { id: p.clone() }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            StoreEvent::ChatCreated {
                id: c.clone(),
                location: ChatLocation::Project(p)
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            StoreEvent::ChatMoved {
                id: c,
                to: ChatLocation::Unfiled
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_load_reissues_duplicate_ids() {
        let dup = Chat::new("same".to_string());
        let mut project = Project::new("p".to_string(), "P".to_string());
        project.chats.push(dup.clone());
        let snapshot = Snapshot {
            projects: vec![project.clone(), project],
            chats_without_project: vec![dup],
        };

        let mut store = ConversationStore::in_memory();
        store.load(snapshot);

        let mut chat_ids: Vec<&str> = store.unfiled_chats().iter().map(|c| c.id.as_str()).collect();
        for p in store.projects() {
            chat_ids.extend(p.chats.iter().map(|c| c.id.as_str()));
        }
        let unique: HashSet<&str> = chat_ids.iter().copied().collect();
        assert_eq!(chat_ids.len(), 3);
        assert_eq!(unique.len(), 3);
        assert_eq!(store.unfiled_chats()[0].id, "same");
        assert_ne!(store.projects()[0].id, store.projects()[1].id);
    }

    #[test]
    fn test_structural_mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::in_dir(dir.path());

        let mut store = ConversationStore::open(file.clone());
        let p = store.create_project("Kept").unwrap();
        let c = store.create_chat(Some(p.as_str()));
        drop(store);

        let store = ConversationStore::open(file);
        assert_eq!(store.project(&p).unwrap().name, "Kept");
        assert_eq!(store.chat_location(&c), Some(ChatLocation::Project(p)));
    }

    #[test]
    fn test_migrated_duplicate_ids_are_fixed_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::in_dir(dir.path());
        std::fs::write(
            file.legacy_path(),
            r#"[
                {"id":"1700000000000","title":"A","messages":[],"createdAt":"2024-01-01T10:00:00.000Z"},
                {"id":"1700000000000","title":"B","messages":[],"createdAt":"2024-01-01T10:00:00.000Z"}
            ]"#,
        )
        .unwrap();

        let first = ConversationStore::open(file.clone());
        let ids: Vec<String> = first.unfiled_chats().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids[0], "1700000000000");
        assert_ne!(ids[0], ids[1]);
        assert!(file.path().exists());
        assert!(file.legacy_path().exists());
        drop(first);

        let second = ConversationStore::open(file);
        let reopened: Vec<String> = second.unfiled_chats().iter().map(|c| c.id.clone()).collect();
        assert_eq!(reopened, ids);
    }

    #[test]
    fn test_send_flag_is_shared() {
        let store = ConversationStore::in_memory();
        assert!(!store.is_sending());
        store.send_flag().store(true, Ordering::Release);
        assert!(store.is_sending());
    }

    #[test]
    fn test_in_memory_store_persists_trivially() {
        let store = ConversationStore::in_memory();
        assert!(store.persist().is_ok());
        assert!(store.flush().is_ok());
    }
}
