use std::fmt;

use crate::errors::StageError;
use crate::ledger::LifecycleState;

/// Motivo por el que un stage no hizo nada. No es un error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Un artifact upstream no está en `P3` (`observed = None` si no tiene
    /// registro).
    UpstreamNotReady { upstream: String, observed: Option<LifecycleState> },
    /// No se pudo leer el ledger; ante la duda, no avanzar.
    LedgerUnavailable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UpstreamNotReady { upstream, observed: Some(s) } => {
                write!(f, "upstream {upstream} is {s}, not P3")
            }
            SkipReason::UpstreamNotReady { upstream, observed: None } => {
                write!(f, "upstream {upstream} has no status record")
            }
            SkipReason::LedgerUnavailable(detail) => write!(f, "ledger unavailable: {detail}"),
        }
    }
}

/// Resultado de una ejecución de stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Success(T),
    Skipped(SkipReason),
    Failed(StageError),
}

impl<T> StageOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, StageOutcome::Success(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StageOutcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StageOutcome::Failed(_))
    }

    /// Palabra corta para la salida de la CLI.
    pub fn label(&self) -> &'static str {
        match self {
            StageOutcome::Success(_) => "success",
            StageOutcome::Skipped(_) => "skipped",
            StageOutcome::Failed(_) => "failed",
        }
    }

    /// Contrato de entrypoint para el orquestador: `Ok(Some(payload))` en
    /// éxito, `Ok(None)` si se saltó, `Err` si falló (para que el orquestador
    /// marque la corrida como fallida).
    pub fn into_result(self) -> Result<Option<T>, StageError> {
        match self {
            StageOutcome::Success(v) => Ok(Some(v)),
            StageOutcome::Skipped(_) => Ok(None),
            StageOutcome::Failed(e) => Err(e),
        }
    }
}
