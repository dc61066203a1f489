use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use super::{StageEvent, StageEventKind};
use crate::ledger::LifecycleState;

/// Almacenamiento de eventos append-only, particionado por `run_id`.
pub trait EventStore: Send + Sync {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&self, run_id: Uuid, kind: StageEventKind) -> StageEvent;
    /// Lista eventos de un run (orden ascendente por seq).
    fn list(&self, run_id: Uuid) -> Vec<StageEvent>;

    /// Secuencia de estados escritos por un run, en orden.
    fn transitions(&self, run_id: Uuid) -> Vec<LifecycleState> {
        self.list(run_id)
            .into_iter()
            .filter_map(|e| match e.kind {
                StageEventKind::StateTransition { state, .. } => Some(state),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    inner: Mutex<HashMap<Uuid, Vec<StageEvent>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_ids(&self) -> Vec<Uuid> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).keys().copied().collect()
    }
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&self, run_id: Uuid, kind: StageEventKind) -> StageEvent {
        let mut guard = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let vec = guard.entry(run_id).or_default();
        let seq = vec.len() as u64;
        let ev = StageEvent { seq,
                              run_id,
                              kind,
                              ts: Utc::now() };
        vec.push(ev.clone());
        ev
    }

    fn list(&self, run_id: Uuid) -> Vec<StageEvent> {
        self.inner
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(&run_id)
            .cloned()
            .unwrap_or_default()
    }
}
