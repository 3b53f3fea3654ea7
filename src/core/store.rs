//! The user input store.
//!
//! Single source of truth for the wizard: holds the accumulated
//! [`UserInput`] and the generated tasks, notifies subscribers after every
//! mutation and saves the state to disk.
//!
//! Each setter replaces one field wholesale. The in-memory update always
//! applies; a save failure is returned afterwards and does not roll it back.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

use super::error::PersistenceError;
use super::model::{sort_tasks, ImageMetadata, ProcessedTask, Requirements, UploadFile, UserInput};
use super::persistence::{StateFile, StoreState};

type Subscriber = Box<dyn Fn(&StoreState) + Send + Sync>;

/// Handle returned by [`UserInputStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Wizard state container.
pub struct UserInputStore {
    /// Current state
    state: RwLock<StoreState>,
    /// Change listeners, in registration order
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    /// Serializes writers so notifications follow mutation order
    write_lock: Mutex<()>,
    /// Where the state is saved (None = memory only)
    file: Option<StateFile>,
    next_subscription: AtomicU64,
}

impl std::fmt::Debug for UserInputStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserInputStore")
            .field("state", &*self.state.read())
            .field("subscribers", &self.subscribers.lock().len())
            .field("file", &self.file)
            .finish()
    }
}

impl Default for UserInputStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl UserInputStore {
    /// A store that is never saved.
    pub fn in_memory() -> Self {
        Self::with_state(StoreState::default(), None)
    }

    /// A store backed by `file`, starting from its saved content.
    ///
    /// Unreadable or incompatible saved state is ignored.
    pub fn open(file: StateFile) -> Self {
        let state = file.load_or_default();
        Self::with_state(state, Some(file))
    }

    fn with_state(state: StoreState, file: Option<StateFile>) -> Self {
        Self {
            state: RwLock::new(state),
            subscribers: Mutex::new(Vec::new()),
            write_lock: Mutex::new(()),
            file,
            next_subscription: AtomicU64::new(1),
        }
    }

    /// The backing file, if any.
    pub fn file(&self) -> Option<&StateFile> {
        self.file.as_ref()
    }

    // --- Reads ---

    /// Copy of the whole state.
    pub fn snapshot(&self) -> StoreState {
        self.state.read().clone()
    }

    pub fn user_input(&self) -> UserInput {
        self.state.read().user_input.clone()
    }

    /// Tasks in the order the backend returned them.
    pub fn tasks(&self) -> Vec<ProcessedTask> {
        self.state.read().tasks.clone()
    }

    /// Tasks sorted by their `order` field.
    pub fn sorted_tasks(&self) -> Vec<ProcessedTask> {
        let mut tasks = self.tasks();
        sort_tasks(&mut tasks);
        tasks
    }

    // --- Subscriptions ---

    /// Register a callback run after every mutation.
    ///
    /// Callbacks run on the mutating thread and may read the store, but must
    /// not mutate it or (un)subscribe.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StoreState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    // --- Mutations ---

    pub fn set_description(&self, description: impl Into<String>) -> Result<(), PersistenceError> {
        let description = description.into();
        self.update(|s| s.user_input.description = description)
    }

    /// Replace the requirements record; a missing `file_type` clears the old one.
    pub fn set_requirements(
        &self,
        content: impl Into<String>,
        file_type: Option<String>,
    ) -> Result<(), PersistenceError> {
        let requirements = Requirements { content: content.into(), file_type };
        self.update(|s| s.user_input.requirements = requirements)
    }

    /// Replace the inspiration images with the metadata of `files`.
    pub fn set_inspiration(&self, files: &[UploadFile]) -> Result<(), PersistenceError> {
        let images: Vec<ImageMetadata> = files.iter().map(ImageMetadata::from).collect();
        self.update(|s| s.user_input.inspiration.images = images)
    }

    pub fn set_inspiration_text(&self, text: impl Into<String>) -> Result<(), PersistenceError> {
        let text = text.into();
        self.update(|s| s.user_input.inspiration.processed_text = Some(text))
    }

    /// Replace the images and their extracted text in one mutation.
    pub fn replace_inspiration(
        &self,
        files: &[UploadFile],
        text: impl Into<String>,
    ) -> Result<(), PersistenceError> {
        let images: Vec<ImageMetadata> = files.iter().map(ImageMetadata::from).collect();
        let text = text.into();
        self.update(|s| {
            s.user_input.inspiration.images = images;
            s.user_input.inspiration.processed_text = Some(text);
        })
    }

    pub fn set_integrations(&self, integrations: Vec<String>) -> Result<(), PersistenceError> {
        self.update(|s| s.user_input.integrations = integrations)
    }

    pub fn set_tasks(&self, tasks: Vec<ProcessedTask>) -> Result<(), PersistenceError> {
        self.update(|s| s.tasks = tasks)
    }

    /// Restore the default state, in memory and on disk.
    pub fn reset(&self) -> Result<(), PersistenceError> {
        self.update(|s| *s = StoreState::default())
    }

    /// Apply `mutate`, notify subscribers, then save.
    fn update<F>(&self, mutate: F) -> Result<(), PersistenceError>
    where
        F: FnOnce(&mut StoreState),
    {
        let _writer = self.write_lock.lock();

        let snapshot = {
            let mut state = self.state.write();
            mutate(&mut state);
            state.clone()
        };

        for (_, callback) in self.subscribers.lock().iter() {
            callback(&snapshot);
        }

        if let Some(file) = &self.file {
            if let Err(e) = file.save(&snapshot) {
                tracing::warn!("Failed to save wizard state: {}", e);
                return Err(e);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::TaskStatus;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn task(id: &str, order: i64) -> ProcessedTask {
        ProcessedTask {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            status: TaskStatus::Pending,
            order,
        }
    }

    #[test]
    fn test_starts_empty() {
        let store = UserInputStore::in_memory();
        assert_eq!(store.snapshot(), StoreState::default());
    }

    #[test]
    fn test_set_requirements_replaces_whole_record() {
        let store = UserInputStore::in_memory();
        store.set_requirements("v1", Some("application/pdf".to_string())).unwrap();
        store.set_requirements("v2", None).unwrap();

        let req = store.user_input().requirements;
        assert_eq!(req.content, "v2");
        assert!(req.file_type.is_none());
    }

    #[test]
    fn test_inspiration_fields_are_independent() {
        let store = UserInputStore::in_memory();
        store.set_inspiration_text("bold colors").unwrap();
        store.set_inspiration(&[UploadFile::new("a.png", vec![1])]).unwrap();

        let inspiration = store.user_input().inspiration;
        assert_eq!(inspiration.processed_text.as_deref(), Some("bold colors"));
        assert_eq!(inspiration.images.len(), 1);

        store.set_inspiration(&[]).unwrap();
        let inspiration = store.user_input().inspiration;
        assert!(inspiration.images.is_empty());
        assert_eq!(inspiration.processed_text.as_deref(), Some("bold colors"));
    }

    #[test]
    fn test_set_inspiration_keeps_order_and_drops_bytes() {
        let store = UserInputStore::in_memory();
        let f1 = UploadFile::new("first.png", vec![0; 10]).with_last_modified(1);
        let f2 = UploadFile::new("second.jpg", vec![0; 20]).with_last_modified(2);
        store.set_inspiration(&[f1.clone(), f2.clone()]).unwrap();

        let images = store.user_input().inspiration.images;
        assert_eq!(images, vec![ImageMetadata::from(&f1), ImageMetadata::from(&f2)]);
    }

    #[test]
    fn test_mutations_do_not_leak() {
        let store = UserInputStore::in_memory();
        store.set_description("A todo app").unwrap();
        store.set_integrations(vec!["Stripe".to_string()]).unwrap();
        store.set_requirements("Must sync", None).unwrap();
        store.set_description("A better todo app").unwrap();

        let input = store.user_input();
        assert_eq!(input.description, "A better todo app");
        assert_eq!(input.integrations, vec!["Stripe"]);
        assert_eq!(input.requirements.content, "Must sync");
        assert!(input.inspiration.images.is_empty());
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn test_sorted_tasks() {
        let store = UserInputStore::in_memory();
        store.set_tasks(vec![task("OMN-2", 2), task("OMN-1", 1)]).unwrap();

        let ids: Vec<_> = store.sorted_tasks().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["OMN-1", "OMN-2"]);
        // Stored order is untouched
        assert_eq!(store.tasks()[0].id, "OMN-2");
    }

    #[test]
    fn test_subscribers_see_every_mutation_in_order() {
        let store = UserInputStore::in_memory();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = store.subscribe(move |s| sink.lock().push(s.user_input.description.clone()));

        store.set_description("one").unwrap();
        store.set_description("two").unwrap();
        assert!(store.unsubscribe(id));
        store.set_description("three").unwrap();

        assert_eq!(*seen.lock(), vec!["one", "two"]);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let store = UserInputStore::open(StateFile::new(&path));
            store.set_description("Persist me").unwrap();
            store.set_tasks(vec![task("T-1", 0)]).unwrap();
        }

        let store = UserInputStore::open(StateFile::new(&path));
        assert_eq!(store.user_input().description, "Persist me");
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn test_reset_overwrites_saved_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = UserInputStore::open(StateFile::new(&path));
        store.set_description("Something").unwrap();
        store.set_tasks(vec![task("T-1", 0)]).unwrap();
        store.reset().unwrap();
        assert_eq!(store.snapshot(), StoreState::default());

        let reloaded = UserInputStore::open(StateFile::new(&path));
        assert_eq!(reloaded.snapshot(), StoreState::default());
    }

    #[test]
    fn test_save_failure_keeps_memory_update() {
        let dir = tempdir().unwrap();
        // A directory where the state file should be makes the rename fail
        let path = dir.path().join("state.json");
        std::fs::create_dir_all(path.join("occupied")).unwrap();

        let store = UserInputStore::open(StateFile::new(&path));
        let result = store.set_description("kept");
        assert!(result.is_err());
        assert_eq!(store.user_input().description, "kept");
    }

    #[test]
    fn test_replace_inspiration_is_one_mutation() {
        let store = UserInputStore::in_memory();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(move |s| {
            let inspiration = &s.user_input.inspiration;
            sink.lock().push((inspiration.images.len(), inspiration.processed_text.clone()));
        });

        store.replace_inspiration(&[UploadFile::new("a.png", vec![1])], "Dark theme").unwrap();
        assert_eq!(*seen.lock(), vec![(1, Some("Dark theme".to_string()))]);
    }

    #[test]
    fn test_replace_inspiration_survives_save_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::create_dir_all(path.join("occupied")).unwrap();

        let store = UserInputStore::open(StateFile::new(&path));
        let result = store.replace_inspiration(&[UploadFile::new("a.png", vec![1])], "Dark theme");
        assert!(result.is_err());

        let inspiration = store.user_input().inspiration;
        assert_eq!(inspiration.images.len(), 1);
        assert_eq!(inspiration.processed_text.as_deref(), Some("Dark theme"));
    }
}
