//! Eventos de ejecución de stages y trait EventStore.

mod store;
mod types;

pub use store::{EventStore, InMemoryEventStore};
pub use types::{StageEvent, StageEventKind};
