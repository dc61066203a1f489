//! Tipos de evento de un stage y estructura `StageEvent`.
//!
//! Rol:
//! - Cada invocación de `StageRunner::run_stage` obtiene un `run_id` y emite
//!   sus eventos a un `EventStore` append-only.
//! - El ledger sólo guarda el último estado por artifact; los eventos
//!   conservan la secuencia completa de transiciones de una ejecución (y si
//!   cada escritura llegó a persistirse).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::StageError;
use crate::ledger::LifecycleState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageEventKind {
    /// Primer evento de una ejecución.
    StageStarted { stage: String, artifact_id: String, upstream: Vec<String> },
    /// El runner escribió (o intentó escribir) un estado en el ledger.
    /// `persisted = false` cuando el save falló y se continuó best-effort.
    StateTransition { artifact_id: String, state: LifecycleState, persisted: bool },
    /// Precondición no cumplida; el stage no tocó el ledger.
    StageSkipped { stage: String, reason: String },
    /// La ejecución terminó en `P4` (o no pudo reclamar el artifact).
    StageFailed { stage: String, error: StageError },
    /// La ejecución terminó en `P3`; `payload` es la salida serializada.
    StageFinished { stage: String, artifact_id: String, payload: serde_json::Value },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    pub seq: u64, // orden de append dentro del run
    pub run_id: Uuid,
    pub kind: StageEventKind,
    pub ts: DateTime<Utc>,
}
