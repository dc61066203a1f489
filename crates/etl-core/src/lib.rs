//! etl-core: protocolo de coordinación entre stages del pipeline ETL.
//!
//! Este crate no sabe nada de CSV de productos ni de warehouses; sólo modela
//! el ledger de estados compartido (`file_status.csv`) y el runner que hace
//! que cada stage respete el handshake `P1 -> P2 -> (P3 | P4)`.
//!
//! Módulos:
//! - `ledger`: `StatusLedger`, `StatusRecord`, `LifecycleState`, codec CSV y
//!   `LedgerStore` (load / save / update como unidad).
//! - `stage`: `StageSpec`, `StageRunner`, `StageCtx` y `StageOutcome`.
//! - `event`: eventos append-only emitidos por cada ejecución de un stage.
//! - `io`: colaboradores externos (object store, notifier) y sus versiones
//!   en memoria.
//! - `clock`: reloj inyectable para timestamps deterministas en tests.
pub mod clock;
pub mod constants;
pub mod errors;
pub mod event;
pub mod io;
pub mod ledger;
pub mod stage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{LedgerError, NotifyError, SinkError, StageError, StoreError};
pub use event::{EventStore, InMemoryEventStore, StageEvent, StageEventKind};
pub use io::{object_key, InMemoryNotifier, InMemoryObjectStore, LogNotifier, Notification, Notifier, NoopNotifier,
             ObjectStoreAccessor};
pub use ledger::{LedgerStore, LifecycleState, ObjectLedgerStore, StatusLedger, StatusRecord};
pub use stage::{SkipReason, StageCtx, StageOutcome, StageRunner, StageRunnerBuilder, StageSpec};
