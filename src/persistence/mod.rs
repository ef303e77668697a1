//! Save-game persistence
//!
//! Features:
//! - One save slot held in memory, visible to readers immediately
//! - Fire-and-forget mirroring to an asynchronous key-value store
//! - Start-up load that never overwrites a newer application write
//! - Failures logged and optionally reported to a handler

mod kv;
mod memory;
mod save_store;
#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod local_storage;

pub use kv::{Completion, KeyValueStore};
pub use memory::MemoryStore;
pub use save_store::{SaveStore, StoreOp};
#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;
