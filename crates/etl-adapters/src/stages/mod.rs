//! Funciones de trabajo de cada stage.
//!
//! Todas siguen la misma forma: leer entradas, `ctx.checkpoint()` cuando los
//! datos de salida ya están materializados en memoria, escribir salidas. El
//! protocolo del ledger lo pone el runner, no estas funciones.

mod check;
mod extract;
mod load;
mod transform;
mod warehouse;

use etl_core::{StageCtx, StageError};
use etl_domain::QualityReport;
use serde::Serialize;

use crate::catalog;
use crate::context::PipelineContext;

pub use check::check;
pub use extract::extract;
pub use load::load;
pub use transform::transform;
pub use warehouse::{dw_load_dim_brand, dw_load_dim_product, dw_load_fact_product_price};

/// Payload de éxito de un stage (queda también en el evento `StageFinished`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageOutput {
    Extract { raw_key: String, rows: usize },
    Transform { clean_key: String, dim_brand_key: String, dim_product_key: String, fact_key: String, rows: usize },
    Load { staged_key: String, rows: usize },
    Check { report_key: String, report: QualityReport },
    Warehouse { table: String, object_key: String, rows_written: u64, row_count: u64 },
}

pub type WorkFn = fn(&PipelineContext, &mut StageCtx<'_>) -> Result<StageOutput, StageError>;

/// Función de trabajo asociada a un nombre de stage.
pub fn work_for(stage: &str) -> Option<WorkFn> {
    let f: WorkFn = match stage {
        catalog::EXTRACT => extract,
        catalog::TRANSFORM => transform,
        catalog::LOAD => load,
        catalog::CHECK => check,
        catalog::DW_LOAD_DIM_BRAND => dw_load_dim_brand,
        catalog::DW_LOAD_DIM_PRODUCT => dw_load_dim_product,
        catalog::DW_LOAD_FACT_PRODUCT_PRICE => dw_load_fact_product_price,
        _ => return None,
    };
    Some(f)
}
