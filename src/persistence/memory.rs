//! In-process store driven by a cooperative event loop

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};

use super::kv::{Completion, KeyValueStore};
use crate::error::StoreError;

type Task = Box<dyn FnOnce()>;

#[derive(Default)]
struct MemoryInner {
    items: RefCell<HashMap<String, String>>,
    pending: RefCell<VecDeque<Task>>,
    unavailable: Cell<bool>,
}

/// Key-value store whose operations run only when [`MemoryStore::run_pending`] is called
///
/// Cloning yields another handle to the same store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a value directly, bypassing the queue (e.g. a previous session's save)
    pub fn insert(&self, key: &str, value: &str) {
        self.inner
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    /// Read a value directly, bypassing the queue
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.items.borrow().get(key).cloned()
    }

    /// Make every operation that runs from now on fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.set(unavailable);
    }

    /// Number of queued operations
    pub fn pending(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Run queued operations (and any they queue) until idle
    ///
    /// Returns the number of operations run.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.inner.pending.borrow_mut().pop_front();
            let Some(task) = task else { break };
            task();
            ran += 1;
        }
        ran
    }

    fn schedule<T: 'static>(
        &self,
        done: Completion<T>,
        op: impl FnOnce(&MemoryInner) -> T + 'static,
    ) {
        let inner: Weak<MemoryInner> = Rc::downgrade(&self.inner);
        self.inner.pending.borrow_mut().push_back(Box::new(move || {
            let Some(inner) = inner.upgrade() else { return };
            let result = if inner.unavailable.get() {
                Err(StoreError::Unavailable)
            } else {
                Ok(op(inner.as_ref()))
            };
            done(result);
        }));
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str, done: Completion<Option<String>>) {
        let key = key.to_string();
        self.schedule(done, move |inner| inner.items.borrow().get(&key).cloned());
    }

    fn set_item(&self, key: &str, value: String, done: Completion<()>) {
        let key = key.to_string();
        self.schedule(done, move |inner| {
            inner.items.borrow_mut().insert(key, value);
        });
    }

    fn remove_item(&self, key: &str, done: Completion<()>) {
        let key = key.to_string();
        self.schedule(done, move |inner| {
            inner.items.borrow_mut().remove(&key);
        });
    }
}
