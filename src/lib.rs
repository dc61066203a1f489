//! etlflow
//!
//! Fachada del workspace: re-exporta los crates del pipeline para que un
//! embebedor (o los tests de integración de la raíz) dependa de un solo
//! paquete.
//!
//! - `core`: ledger de estados, runner de stages, eventos y colaboradores.
//! - `domain`: `Table`, codec CSV, modelo dimensional y reporte de calidad.
//! - `persistence`: object stores local / S3, sink Postgres y configuración.
//! - `adapters`: catálogo de stages, funciones de trabajo y `Pipeline`.

pub use etl_adapters as adapters;
pub use etl_core as core;
pub use etl_domain as domain;
pub use etl_persistence as persistence;

pub use etl_adapters::{Catalog, Pipeline, PipelineContext, PipelineError, StageOutput};
pub use etl_core::{LedgerStore, LifecycleState, ObjectLedgerStore, SkipReason, StageError, StageOutcome, StageRunner,
                   StageSpec, StatusLedger};
pub use etl_persistence::{open_store, EtlConfig};
