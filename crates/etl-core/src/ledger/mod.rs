//! Ledger de estados de artifacts.
//!
//! Un único objeto tabular (`file_status.csv`) mapea cada `artifact_id` a su
//! `LifecycleState`. El backing store no ofrece updates por fila, así que toda
//! escritura es load -> upsert -> save del ledger completo (last writer wins).

mod codec;
mod record;
mod state;
mod store;

pub use codec::{decode, encode};
pub use record::{StatusLedger, StatusRecord};
pub use state::LifecycleState;
pub use store::{LedgerStore, ObjectLedgerStore};
