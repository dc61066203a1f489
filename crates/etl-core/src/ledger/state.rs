use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// Estado de un artifact en el ledger.
///
/// La ausencia de registro (`ABSENT`) no es una variante: `lookup` devuelve
/// `None`. Dentro de una misma ejecución las transiciones válidas son:
/// - `None | P3 | P4` -> `P1` (claim; una re-ejecución pisa el terminal previo)
/// - `P1` -> `P2` | `P4`
/// - `P2` -> `P3` | `P4`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    /// El stage reclamó el artifact y empezó a trabajar.
    P1,
    /// Checkpoint de procesamiento (datos materializados, escritura pendiente).
    P2,
    /// Terminado con éxito; consumible aguas abajo.
    P3,
    /// Falló; no confiar en el artifact.
    P4,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::P1 => "P1",
            LifecycleState::P2 => "P2",
            LifecycleState::P3 => "P3",
            LifecycleState::P4 => "P4",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::P3 | LifecycleState::P4)
    }

    /// Sólo `P3` habilita a los stages dependientes.
    pub fn is_consumable(&self) -> bool {
        matches!(self, LifecycleState::P3)
    }

    /// `true` si `self` puede seguir a `prev` dentro de una ejecución.
    pub fn follows(&self, prev: Option<LifecycleState>) -> bool {
        use LifecycleState::*;
        match (prev, self) {
            (None | Some(P3) | Some(P4), P1) => true,
            (Some(P1), P2 | P4) => true,
            (Some(P2), P3 | P4) => true,
            _ => false,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleState {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "P1" => Ok(LifecycleState::P1),
            "P2" => Ok(LifecycleState::P2),
            "P3" => Ok(LifecycleState::P3),
            "P4" => Ok(LifecycleState::P4),
            other => Err(LedgerError::InvalidState(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LifecycleState::*;
    use super::*;

    #[test]
    fn parses_the_four_tokens_only() {
        assert_eq!(" P3 ".parse::<LifecycleState>().unwrap(), P3);
        assert!("p3".parse::<LifecycleState>().is_err());
        assert!("DONE".parse::<LifecycleState>().is_err());
    }

    #[test]
    fn forward_only_transitions() {
        assert!(P1.follows(None));
        assert!(P1.follows(Some(P4)));
        assert!(P2.follows(Some(P1)));
        assert!(P4.follows(Some(P1)));
        assert!(P3.follows(Some(P2)));
        assert!(!P3.follows(Some(P1)));
        assert!(!P2.follows(None));
        assert!(!P1.follows(Some(P2)));
    }

    #[test]
    fn only_p3_is_consumable() {
        assert!(P3.is_consumable());
        assert!(!P4.is_consumable());
        assert!(P4.is_terminal() && !P2.is_terminal());
    }
}
