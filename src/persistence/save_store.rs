//! Single-slot save store

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::kv::KeyValueStore;
use crate::consts::SAVE_KEY;
use crate::error::StoreError;

/// Store operation, used to tag failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Load,
    Save,
    Delete,
}

impl StoreOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOp::Load => "load",
            StoreOp::Save => "save",
            StoreOp::Delete => "delete",
        }
    }
}

type ErrorHandler = Box<dyn FnMut(StoreOp, &StoreError)>;

struct Slot<T> {
    current: Option<T>,
    /// Bumped by every application save/delete
    generation: u64,
    /// Start-up load has completed
    ready: bool,
}

struct Shared<T> {
    slot: RefCell<Slot<T>>,
    on_error: RefCell<Option<ErrorHandler>>,
    /// Failures waiting for the handler
    failures: RefCell<VecDeque<(StoreOp, StoreError)>>,
    /// The handler is running
    reporting: Cell<bool>,
}

impl<T: DeserializeOwned> Shared<T> {
    fn report(&self, op: StoreOp, err: StoreError) {
        log::warn!("Save data {} failed: {}", op.as_str(), err);
        self.failures.borrow_mut().push_back((op, err));
        // A failure raised from inside the handler is delivered once it returns
        if self.reporting.replace(true) {
            return;
        }
        loop {
            let next = self.failures.borrow_mut().pop_front();
            let Some((op, err)) = next else { break };
            // Taken out while running so the handler may call back into the store
            let handler = self.on_error.borrow_mut().take();
            if let Some(mut handler) = handler {
                handler(op, &err);
                let mut slot = self.on_error.borrow_mut();
                if slot.is_none() {
                    *slot = Some(handler);
                }
            }
        }
        self.reporting.set(false);
    }

    fn finish_load(&self, key: &str, issued_at: u64, result: Result<Option<String>, StoreError>) {
        let outcome = match result {
            Ok(Some(json)) => serde_json::from_str::<T>(&json)
                .map(Some)
                .map_err(StoreError::Decode),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        let error = {
            let mut slot = self.slot.borrow_mut();
            slot.ready = true;
            match outcome {
                Ok(Some(data)) if slot.generation == issued_at => {
                    slot.current = Some(data);
                    log::info!("Loaded saved game from '{}'", key);
                    None
                }
                Ok(Some(_)) => {
                    log::info!("Stored game under '{}' superseded by a newer write", key);
                    None
                }
                Ok(None) => {
                    log::info!("No saved game under '{}'", key);
                    None
                }
                Err(e) => Some(e),
            }
        };

        if let Some(e) = error {
            self.report(StoreOp::Load, e);
        }
    }
}

/// The one save slot, mirrored to an external store under a fixed key
///
/// Reads and writes act on memory immediately. Writes to the external store
/// are fire-and-forget: failures are logged and passed to the error handler,
/// never returned. Create with [`SaveStore::new`], configure, then call
/// [`SaveStore::open`] to issue the start-up load.
///
/// The start-up load only fills the slot if no `save`/`delete` happened since
/// it was issued, so application writes always win the race. Until it
/// completes [`SaveStore::is_ready`] is false and reads see only what the
/// application has written.
pub struct SaveStore<T, S: KeyValueStore> {
    key: String,
    backend: S,
    shared: Rc<Shared<T>>,
}

impl<T, S> SaveStore<T, S>
where
    T: Serialize + DeserializeOwned + Clone + 'static,
    S: KeyValueStore,
{
    pub fn new(backend: S) -> Self {
        Self {
            key: SAVE_KEY.to_string(),
            backend,
            shared: Rc::new(Shared {
                slot: RefCell::new(Slot {
                    current: None,
                    generation: 0,
                    ready: false,
                }),
                on_error: RefCell::new(None),
                failures: RefCell::new(VecDeque::new()),
                reporting: Cell::new(false),
            }),
        }
    }

    /// Use a different storage key
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }

    /// Receive external-store failures in addition to the log
    ///
    /// The handler may call back into the store. Failures those calls raise
    /// while it runs are delivered in order after it returns.
    pub fn with_error_handler(self, handler: impl FnMut(StoreOp, &StoreError) + 'static) -> Self {
        *self.shared.on_error.borrow_mut() = Some(Box::new(handler));
        self
    }

    /// Issue the start-up load from the external store
    pub fn open(self) -> Self {
        let issued_at = self.shared.slot.borrow().generation;
        let shared: Weak<Shared<T>> = Rc::downgrade(&self.shared);
        let key = self.key.clone();
        self.backend.get_item(
            &self.key,
            Box::new(move |result| {
                if let Some(shared) = shared.upgrade() {
                    shared.finish_load(&key, issued_at, result);
                }
            }),
        );
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Hold `data` as the save and write it to the external store
    pub fn save(&self, data: T) {
        let encoded = serde_json::to_string(&data);
        {
            let mut slot = self.shared.slot.borrow_mut();
            slot.current = Some(data);
            slot.generation += 1;
        }

        let json = match encoded {
            Ok(json) => json,
            Err(e) => {
                self.shared.report(StoreOp::Save, StoreError::Encode(e));
                return;
            }
        };

        let shared = Rc::downgrade(&self.shared);
        let key = self.key.clone();
        self.backend.set_item(
            &self.key,
            json,
            Box::new(move |result| match result {
                Ok(()) => log::info!("Game saved under '{}'", key),
                Err(e) => {
                    if let Some(shared) = shared.upgrade() {
                        shared.report(StoreOp::Save, e);
                    }
                }
            }),
        );
    }

    /// The save currently held in memory
    pub fn load(&self) -> Option<T> {
        self.shared.slot.borrow().current.clone()
    }

    /// Forget the save and remove it from the external store
    pub fn delete(&self) {
        {
            let mut slot = self.shared.slot.borrow_mut();
            slot.current = None;
            slot.generation += 1;
        }

        let shared = Rc::downgrade(&self.shared);
        let key = self.key.clone();
        self.backend.remove_item(
            &self.key,
            Box::new(move |result| match result {
                Ok(()) => log::info!("Saved game under '{}' cleared", key),
                Err(e) => {
                    if let Some(shared) = shared.upgrade() {
                        shared.report(StoreOp::Delete, e);
                    }
                }
            }),
        );
    }

    pub fn has(&self) -> bool {
        self.shared.slot.borrow().current.is_some()
    }

    /// Load the save and delete it (continuing a game consumes the save)
    pub fn take(&self) -> Option<T> {
        let data = self.load();
        if data.is_some() {
            self.delete();
        }
        data
    }

    /// Whether the start-up load has completed
    pub fn is_ready(&self) -> bool {
        self.shared.slot.borrow().ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct GameSave {
        depth: u32,
        player: String,
    }

    fn game(depth: u32) -> GameSave {
        GameSave {
            depth,
            player: "apprentice".to_string(),
        }
    }

    fn stored(depth: u32) -> String {
        serde_json::to_string(&game(depth)).unwrap()
    }

    type Failures = Rc<RefCell<Vec<(StoreOp, String)>>>;

    fn open_with_failures(backend: MemoryStore) -> (SaveStore<GameSave, MemoryStore>, Failures) {
        let failures: Failures = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&failures);
        let store = SaveStore::new(backend)
            .with_error_handler(move |op, err| sink.borrow_mut().push((op, err.to_string())))
            .open();
        (store, failures)
    }

    #[test]
    fn test_save_is_visible_immediately() {
        let backend = MemoryStore::new();
        let store: SaveStore<GameSave, _> = SaveStore::new(backend.clone()).open();

        store.save(game(2));
        assert_eq!(store.load(), Some(game(2)));
        assert!(store.has());
        // External write still queued
        assert!(backend.get(SAVE_KEY).is_none());

        backend.run_pending();
        assert_eq!(backend.get(SAVE_KEY), Some(stored(2)));
        assert_eq!(store.load(), Some(game(2)));
    }

    #[test]
    fn test_has_false_before_startup_load_resolves() {
        let backend = MemoryStore::new();
        backend.insert(SAVE_KEY, &stored(5));
        let store: SaveStore<GameSave, _> = SaveStore::new(backend.clone()).open();

        assert!(!store.is_ready());
        assert!(!store.has());
        assert_eq!(store.load(), None);

        backend.run_pending();
        assert!(store.is_ready());
        assert!(store.has());
        assert_eq!(store.load(), Some(game(5)));
    }

    #[test]
    fn test_empty_external_store() {
        let backend = MemoryStore::new();
        let (store, failures) = open_with_failures(backend.clone());
        backend.run_pending();
        assert!(store.is_ready());
        assert!(!store.has());
        assert!(failures.borrow().is_empty());
    }

    #[test]
    fn test_delete_clears_slot_and_external_key() {
        let backend = MemoryStore::new();
        let store: SaveStore<GameSave, _> = SaveStore::new(backend.clone()).open();
        store.save(game(1));
        backend.run_pending();

        store.delete();
        assert!(!store.has());
        assert_eq!(store.load(), None);

        backend.run_pending();
        assert!(backend.get(SAVE_KEY).is_none());
    }

    #[test]
    fn test_save_racing_startup_load_wins() {
        let backend = MemoryStore::new();
        backend.insert(SAVE_KEY, &stored(1));
        let store: SaveStore<GameSave, _> = SaveStore::new(backend.clone()).open();

        store.save(game(9));
        backend.run_pending();

        assert!(store.is_ready());
        assert_eq!(store.load(), Some(game(9)));
        assert_eq!(backend.get(SAVE_KEY), Some(stored(9)));
    }

    #[test]
    fn test_delete_racing_startup_load_wins() {
        let backend = MemoryStore::new();
        backend.insert(SAVE_KEY, &stored(1));
        let store: SaveStore<GameSave, _> = SaveStore::new(backend.clone()).open();

        store.delete();
        backend.run_pending();

        assert!(store.is_ready());
        assert!(!store.has());
        assert!(backend.get(SAVE_KEY).is_none());
    }

    #[test]
    fn test_write_failure_is_reported_not_returned() {
        let backend = MemoryStore::new();
        let (store, failures) = open_with_failures(backend.clone());
        backend.run_pending();

        backend.set_unavailable(true);
        store.save(game(3));
        store.delete();
        backend.run_pending();

        let failures = failures.borrow();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].0, StoreOp::Save);
        assert_eq!(failures[1].0, StoreOp::Delete);
        // Memory is unaffected by the failed external writes
        assert!(!store.has());
    }

    #[test]
    fn test_failed_save_keeps_value_in_memory() {
        let backend = MemoryStore::new();
        let (store, failures) = open_with_failures(backend.clone());
        backend.set_unavailable(true);
        backend.run_pending();

        store.save(game(4));
        backend.run_pending();

        assert_eq!(store.load(), Some(game(4)));
        let ops: Vec<StoreOp> = failures.borrow().iter().map(|(op, _)| *op).collect();
        assert_eq!(ops, vec![StoreOp::Load, StoreOp::Save]);
    }

    #[test]
    fn test_corrupt_stored_payload_leaves_slot_empty() {
        let backend = MemoryStore::new();
        backend.insert(SAVE_KEY, "not json");
        let (store, failures) = open_with_failures(backend.clone());
        backend.run_pending();

        assert!(store.is_ready());
        assert!(!store.has());
        let failures = failures.borrow();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, StoreOp::Load);
        assert!(failures[0].1.starts_with("failed to decode"));
    }

    #[test]
    fn test_take_consumes_save() {
        let backend = MemoryStore::new();
        backend.insert(SAVE_KEY, &stored(7));
        let store: SaveStore<GameSave, _> = SaveStore::new(backend.clone()).open();
        backend.run_pending();

        assert_eq!(store.take(), Some(game(7)));
        assert!(!store.has());
        assert_eq!(store.take(), None);

        backend.run_pending();
        assert!(backend.get(SAVE_KEY).is_none());
    }

    #[test]
    fn test_custom_key() {
        let backend = MemoryStore::new();
        let store: SaveStore<GameSave, _> = SaveStore::new(backend.clone()).with_key("slot-b").open();
        store.save(game(1));
        backend.run_pending();
        assert_eq!(store.key(), "slot-b");
        assert!(backend.get("slot-b").is_some());
        assert!(backend.get(SAVE_KEY).is_none());
    }

    #[test]
    fn test_completions_after_drop_are_harmless() {
        let backend = MemoryStore::new();
        backend.insert(SAVE_KEY, &stored(1));
        let store: SaveStore<GameSave, _> = SaveStore::new(backend.clone()).open();
        store.save(game(2));
        drop(store);
        backend.run_pending();
        assert_eq!(backend.get(SAVE_KEY), Some(stored(2)));
    }

    #[test]
    fn test_error_handler_may_reenter_store() {
        let backend = MemoryStore::new();
        let store = Rc::new(RefCell::new(None::<SaveStore<GameSave, MemoryStore>>));
        let inner = Rc::clone(&store);
        let opened = SaveStore::new(backend.clone())
            .with_error_handler(move |op, _| {
                if op != StoreOp::Save {
                    return;
                }
                if let Some(store) = inner.borrow().as_ref() {
                    store.delete();
                }
            })
            .open();
        *store.borrow_mut() = Some(opened);

        backend.run_pending();
        backend.set_unavailable(true);
        store.borrow().as_ref().unwrap().save(game(1));
        backend.run_pending();

        assert!(!store.borrow().as_ref().unwrap().has());
    }

    #[test]
    fn test_opaque_text_payload_kept_byte_for_byte() {
        // Several JSON documents back to back, as the game's serializer writes them
        let payload = r#"[{"m":1,"c":{"x":3,"y":4}}][{"m":1,"c":"player"}]"#.to_string();
        let unordered = r#"{"z":1,"a":2}"#.to_string();

        let backend = MemoryStore::new();
        let store: SaveStore<String, _> = SaveStore::new(backend.clone()).open();
        backend.run_pending();

        store.save(payload.clone());
        assert_eq!(store.load().as_deref(), Some(payload.as_str()));
        backend.run_pending();

        let reopened: SaveStore<String, _> = SaveStore::new(backend.clone()).open();
        backend.run_pending();
        assert!(reopened.has());
        assert_eq!(reopened.load(), Some(payload));

        reopened.save(unordered.clone());
        backend.run_pending();
        let again: SaveStore<String, _> = SaveStore::new(backend.clone()).open();
        backend.run_pending();
        assert_eq!(again.load(), Some(unordered));
    }

    /// Store whose operations fail before the call returns
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_item(&self, _key: &str, done: crate::persistence::Completion<Option<String>>) {
            done(Err(StoreError::Unavailable));
        }

        fn set_item(&self, _key: &str, _value: String, done: crate::persistence::Completion<()>) {
            done(Err(StoreError::Unavailable));
        }

        fn remove_item(&self, _key: &str, done: crate::persistence::Completion<()>) {
            done(Err(StoreError::Unavailable));
        }
    }

    #[test]
    fn test_failure_raised_inside_handler_is_delivered() {
        let store = Rc::new(RefCell::new(None::<SaveStore<GameSave, BrokenStore>>));
        let ops = Rc::new(RefCell::new(Vec::new()));

        let inner = Rc::clone(&store);
        let sink = Rc::clone(&ops);
        let opened = SaveStore::new(BrokenStore)
            .with_error_handler(move |op, _| {
                sink.borrow_mut().push(op);
                if op == StoreOp::Save {
                    if let Some(store) = inner.borrow().as_ref() {
                        store.delete();
                    }
                }
            })
            .open();
        *store.borrow_mut() = Some(opened);

        store.borrow().as_ref().unwrap().save(game(1));

        assert_eq!(
            *ops.borrow(),
            vec![StoreOp::Load, StoreOp::Save, StoreOp::Delete]
        );
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_store_survives_restart() {
        use crate::persistence::FileStore;
        let dir = tempfile::TempDir::new().unwrap();

        let first: SaveStore<GameSave, _> = SaveStore::new(FileStore::new(dir.path())).open();
        assert!(first.is_ready());
        assert!(!first.has());
        first.save(game(6));

        let second: SaveStore<GameSave, _> = SaveStore::new(FileStore::new(dir.path())).open();
        assert!(second.is_ready());
        assert_eq!(second.load(), Some(game(6)));
    }
}
