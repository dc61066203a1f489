//! Stages del pipeline.
//!
//! Un stage es una unidad de trabajo con un artifact principal y 0..n
//! artifacts de los que depende. Este módulo define:
//! - `StageSpec`: nombre, artifact y aristas de dependencia (datos, no código).
//! - `StageRunner`: gating contra el ledger + secuencia `P1 -> P2 -> P3|P4`.
//! - `StageCtx`: handle que recibe la función de trabajo (checkpoint `P2`).
//! - `StageOutcome` y `SkipReason`.

mod definition;
mod outcome;
mod runner;

pub use definition::StageSpec;
pub use outcome::{SkipReason, StageOutcome};
pub use runner::{StageCtx, StageRunner, StageRunnerBuilder};
