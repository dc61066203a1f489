//! Errores del core.
//!
//! Cada colaborador tiene su propio enum; `StageError` es el que cruza la
//! frontera del runner y por eso es `Clone + Serialize` (viaja dentro de los
//! eventos y del `StageOutcome`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errores del object store (lectura/escritura de blobs).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    #[error("i/o error: {0}")]
    Io(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Errores de lectura/escritura del ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("ledger storage: {0}")]
    Store(#[from] StoreError),
    #[error("ledger decode: {0}")]
    Decode(String),
    #[error("ledger encode: {0}")]
    Encode(String),
    #[error("unknown lifecycle state: {0:?}")]
    InvalidState(String),
}

/// Errores del sink relacional (tablas del warehouse).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("sink backend: {0}")]
    Backend(String),
}

/// Error del notifier. Nunca se propaga fuera del runner.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Error de un stage, tal como lo ve el orquestador.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum StageError {
    #[error("ledger: {0}")] Ledger(String),
    #[error("storage: {0}")] Storage(String),
    #[error("relational sink: {0}")] Sink(String),
    #[error("data: {0}")] Data(String),
    #[error("config: {0}")] Config(String),
    #[error("internal: {0}")] Internal(String),
}

impl From<StoreError> for StageError {
    fn from(e: StoreError) -> Self {
        StageError::Storage(e.to_string())
    }
}

impl From<SinkError> for StageError {
    fn from(e: SinkError) -> Self {
        StageError::Sink(e.to_string())
    }
}

impl From<LedgerError> for StageError {
    fn from(e: LedgerError) -> Self {
        StageError::Ledger(e.to_string())
    }
}
