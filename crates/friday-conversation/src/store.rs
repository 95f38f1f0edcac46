//! The process-wide conversation store shared by request handlers.

use std::sync::Arc;

use friday_ai::{Backend, Turn};
use parking_lot::Mutex;

use crate::{ConversationFile, ConversationLog, Error, PERSISTED_TURNS, Result};

/// Settings applied to every reply the store asks the backend for
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Persona prompt handed to model backends
    pub system_prompt: String,
}

struct State {
    turns: ConversationLog,
    backend: Backend,
}

/// A cloneable handle to the conversation log and the backend answering it.
///
/// All fields are `Arc`-wrapped, so cloning is cheap. Every mutation takes the
/// lock once and writes the file before releasing it, so the user and
/// assistant halves of an exchange are always adjacent and the file never
/// lags behind a later write.
#[derive(Clone)]
pub struct ConversationStore {
    state: Arc<Mutex<State>>,
    file: Arc<ConversationFile>,
    settings: Arc<StoreSettings>,
}

impl ConversationStore {
    /// Create an empty store. It refuses to answer until [`initialize`](Self::initialize).
    pub fn new(file: ConversationFile, settings: StoreSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                turns: ConversationLog::new(),
                backend: Backend::Unavailable,
            })),
            file: Arc::new(file),
            settings: Arc::new(settings),
        }
    }

    /// Load the persisted log and install the backend.
    pub fn initialize(&self, backend: Backend) {
        let turns = self.file.load_or_empty();
        let mut state = self.state.lock();
        tracing::info!(
            backend = backend.label(),
            turns = turns.len(),
            "Conversation store initialized"
        );
        state.turns = turns;
        state.backend = backend;
    }

    /// Flush the log one last time and stop answering.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        self.file.save_or_log(&state.turns);
        state.backend = Backend::Unavailable;
        tracing::info!(turns = state.turns.len(), "Conversation store shut down");
    }

    /// Record a user message and the assistant's reply, then persist.
    pub fn append(&self, user_text: impl Into<String>, assistant_text: impl Into<String>) {
        let mut state = self.state.lock();
        state.turns.push_exchange(user_text, assistant_text);
        self.file.save_or_log(&state.turns);
    }

    /// Forget every turn, then persist the empty log.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.turns.clear();
        self.file.save_or_log(&state.turns);
    }

    /// [`clear`](Self::clear) on the blocking pool, for async callers.
    pub async fn clear_async(&self) -> Result<()> {
        self.run_blocking(|store| store.clear()).await
    }

    /// Run a locking, file-writing operation off the async workers.
    async fn run_blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&ConversationStore) -> T + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| Error::Task(e.to_string()))
    }

    /// The last `n` turns, oldest first
    pub fn window(&self, n: usize) -> Vec<Turn> {
        self.state.lock().turns.window(n).to_vec()
    }

    pub fn len(&self) -> usize {
        self.state.lock().turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().turns.is_empty()
    }

    pub fn is_ready(&self) -> bool {
        self.state.lock().backend.is_ready()
    }

    pub fn backend_label(&self) -> String {
        self.state.lock().backend.label().to_string()
    }

    pub fn file(&self) -> &ConversationFile {
        &self.file
    }

    /// Answer `message` and record both turns.
    ///
    /// The lock is not held while the backend works. Nothing is recorded when
    /// the backend is unavailable or fails.
    pub async fn exchange(&self, message: &str) -> Result<String> {
        let (backend, history) = {
            let state = self.state.lock();
            (state.backend.clone(), state.turns.window(PERSISTED_TURNS).to_vec())
        };

        let reply = backend
            .respond(message, &history, &self.settings.system_prompt)
            .await?;

        let user_text = message.to_string();
        let assistant_text = reply.clone();
        self.run_blocking(move |store| store.append(user_text, assistant_text))
            .await?;

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use friday_ai::{ChatModel, Role};
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn settings() -> StoreSettings {
        StoreSettings {
            system_prompt: "You are Friday.".to_string(),
        }
    }

    fn make_store() -> (TempDir, ConversationStore) {
        let dir = tempdir().unwrap();
        let file = ConversationFile::new(dir.path().join("history.json"));
        let store = ConversationStore::new(file, settings());
        store.initialize(Backend::stub("Friday", 120));
        (dir, store)
    }

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _: &str, _: &[Turn], _: &str) -> friday_ai::Result<String> {
            Err(friday_ai::Error::model("model crashed"))
        }
    }

    #[test]
    fn test_new_store_is_not_ready() {
        let dir = tempdir().unwrap();
        let store = ConversationStore::new(ConversationFile::new(dir.path().join("h.json")), settings());
        assert!(!store.is_ready());
        assert_eq!(store.backend_label(), "unavailable");
    }

    #[test]
    fn test_initialize_loads_persisted_turns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(
            &path,
            r#"[{"role":"user","content":"hey"},{"role":"assistant","content":"yo"}]"#,
        )
        .unwrap();

        let store = ConversationStore::new(ConversationFile::new(&path), settings());
        store.initialize(Backend::stub("Friday", 120));

        assert!(store.is_ready());
        assert_eq!(store.len(), 2);
        assert_eq!(store.window(10)[1].content(), "yo");
    }

    #[test]
    fn test_initialize_recovers_from_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "]]]").unwrap();

        let store = ConversationStore::new(ConversationFile::new(&path), settings());
        store.initialize(Backend::stub("Friday", 120));
        assert!(store.is_empty());
        assert!(store.is_ready());
    }

    #[test]
    fn test_append_persists() {
        let (_dir, store) = make_store();
        store.append("hello", "hi there");

        let on_disk = store.file().load().unwrap();
        assert_eq!(on_disk.len(), 2);
        assert_eq!(on_disk.turns()[0].role(), Role::User);
        assert_eq!(on_disk.turns()[1].role(), Role::Assistant);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (_dir, store) = make_store();
        store.append("a", "b");

        for _ in 0..2 {
            store.clear();
            assert!(store.is_empty());
            let raw = fs::read_to_string(store.file().path()).unwrap();
            assert_eq!(raw, "[]");
        }
    }

    #[test]
    fn test_memory_exceeds_file_cap() {
        let (_dir, store) = make_store();
        for i in 0..15 {
            store.append(format!("q{}", i), format!("a{}", i));
            assert!(store.file().load().unwrap().len() <= PERSISTED_TURNS);
        }
        assert_eq!(store.len(), 30);
        assert_eq!(store.file().load().unwrap().len(), PERSISTED_TURNS);
    }

    #[test]
    fn test_shutdown_stops_answering() {
        let (_dir, store) = make_store();
        store.append("a", "b");
        store.shutdown();
        assert!(!store.is_ready());
        assert_eq!(store.file().load().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_exchange_records_both_turns() {
        let (_dir, store) = make_store();
        let reply = store.exchange("Hello Friday!").await.unwrap();

        assert!(reply.contains("Friday"));
        let turns = store.window(10);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0], Turn::user("Hello Friday!"));
        assert_eq!(turns[1], Turn::assistant(reply));
    }

    #[tokio::test]
    async fn test_clear_async_empties_and_persists() {
        let (_dir, store) = make_store();
        store.exchange("hello").await.unwrap();
        assert_eq!(store.len(), 2);

        store.clear_async().await.unwrap();
        assert!(store.is_empty());
        assert_eq!(fs::read_to_string(store.file().path()).unwrap(), "[]");

        store.clear_async().await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_exchange_uses_backend_limit() {
        let (_dir, store) = make_store();
        store.initialize(Backend::stub("Friday", 10));

        let reply = store.exchange("weather?").await.unwrap();
        assert_eq!(reply, "I'm not co");
        assert_eq!(store.window(1)[0].content(), "I'm not co");
    }

    #[tokio::test]
    async fn test_exchange_refused_before_initialize() {
        let dir = tempdir().unwrap();
        let store = ConversationStore::new(ConversationFile::new(dir.path().join("h.json")), settings());

        let err = store.exchange("hello").await.unwrap_err();
        assert!(matches!(err, Error::Ai(friday_ai::Error::Unavailable)));
        assert!(store.is_empty());
        assert!(!store.file().path().exists());
    }

    #[tokio::test]
    async fn test_exchange_backend_failure_records_nothing() {
        let (_dir, store) = make_store();
        store.initialize(Backend::ready(Arc::new(FailingModel), 120));

        let err = store.exchange("hello").await.unwrap_err();
        assert!(err.is_backend_failure());
        assert!(store.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_exchanges_stay_paired() {
        let (_dir, store) = make_store();

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.exchange(&format!("message {}", i)).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let turns = store.window(usize::MAX);
        assert_eq!(turns.len(), 64);
        for pair in turns.chunks(2) {
            assert_eq!(pair[0].role(), Role::User);
            assert_eq!(pair[1].role(), Role::Assistant);
        }
    }
}
