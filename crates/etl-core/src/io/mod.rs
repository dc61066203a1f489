//! Colaboradores externos del protocolo y sus implementaciones en memoria.

mod notify;
mod object;

pub use notify::{InMemoryNotifier, LogNotifier, Notification, Notifier, NoopNotifier};
pub use object::{object_key, InMemoryObjectStore, ObjectStoreAccessor};
