//! Asynchronous key-value store interface

use crate::error::StoreError;

/// Callback invoked once an operation finishes
pub type Completion<T> = Box<dyn FnOnce(Result<T, StoreError>)>;

/// An external string key-value store with callback completion
///
/// Implementations may complete immediately or later from the event loop;
/// callers must not hold borrows of their own state across a call. In-flight
/// operations cannot be cancelled.
pub trait KeyValueStore {
    fn get_item(&self, key: &str, done: Completion<Option<String>>);
    fn set_item(&self, key: &str, value: String, done: Completion<()>);
    fn remove_item(&self, key: &str, done: Completion<()>);
}
