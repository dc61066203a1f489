use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::LifecycleState;

/// Una fila del ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub artifact_id: String,
    pub state: LifecycleState,
    pub last_update: DateTime<Utc>,
}

/// Colección ordenada de `StatusRecord`, única por `artifact_id`.
///
/// Invariante: nunca hay dos registros con el mismo `artifact_id`. `upsert`
/// actualiza en sitio (conservando la posición) o inserta al final.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLedger {
    records: Vec<StatusRecord>,
}

impl StatusLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construye un ledger a partir de filas arbitrarias. Si un `artifact_id`
    /// aparece repetido gana la última fila, en la posición de la primera.
    pub fn from_records<I>(records: I) -> Self
        where I: IntoIterator<Item = StatusRecord>
    {
        let mut ledger = Self::new();
        for r in records {
            ledger.upsert(&r.artifact_id, r.state, r.last_update);
        }
        ledger
    }

    pub fn lookup(&self, artifact_id: &str) -> Option<LifecycleState> {
        self.get(artifact_id).map(|r| r.state)
    }

    pub fn get(&self, artifact_id: &str) -> Option<&StatusRecord> {
        self.records.iter().find(|r| r.artifact_id == artifact_id)
    }

    /// Inserta o actualiza el registro de `artifact_id`; el resto queda intacto.
    pub fn upsert(&mut self, artifact_id: &str, state: LifecycleState, at: DateTime<Utc>) {
        match self.records.iter_mut().find(|r| r.artifact_id == artifact_id) {
            Some(existing) => {
                existing.state = state;
                existing.last_update = at;
            }
            None => self.records.push(StatusRecord { artifact_id: artifact_id.to_string(),
                                                     state,
                                                     last_update: at }),
        }
    }

    /// Variante por valor de `upsert`, cómoda para encadenar.
    pub fn with(mut self, artifact_id: &str, state: LifecycleState, at: DateTime<Utc>) -> Self {
        self.upsert(artifact_id, state, at);
        self
    }

    pub fn records(&self) -> &[StatusRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
