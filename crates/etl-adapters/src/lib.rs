//! etl-adapters: stages concretos del pipeline de precios de productos.
//!
//! - `catalog`: nombres de stages/artifacts y aristas de gating por defecto.
//! - `context`: colaboradores compartidos (object store, sink, reloj) y claves.
//! - `stages`: funciones de trabajo (extract, transform, load, check, dw_load_*).
//! - `pipeline`: `Pipeline`, que ejecuta stages del catálogo con un `StageRunner`.

pub mod catalog;
pub mod context;
pub mod pipeline;
pub mod stages;

pub use catalog::Catalog;
pub use context::PipelineContext;
pub use pipeline::{Pipeline, PipelineError};
pub use stages::{work_for, StageOutput};
