//! Carga del modelo dimensional al warehouse.
//!
//! Cada loader reconstruye su tabla desde `clean_data.csv`, la deja en el
//! bucket y reemplaza la tabla relacional homónima.

use etl_core::{StageCtx, StageError};
use etl_domain::dimensional::{dim_brand, dim_product, fact_product_price, PRODUCT_ID};
use etl_domain::Table;
use log::{info, warn};

use super::StageOutput;
use crate::catalog::{CLEAN_DATA, DIM_BRAND, DIM_PRODUCT, FACT_PRODUCT_PRICE};
use crate::context::PipelineContext;

fn table_name(artifact: &str) -> &str {
    artifact.strip_suffix(".csv").unwrap_or(artifact)
}

fn publish(ctx: &PipelineContext, artifact: &str, table: &Table) -> Result<StageOutput, StageError> {
    let object_key = ctx.write(artifact, table)?;
    let name = table_name(artifact);
    let rows_written = ctx.sink.replace_table(name, table)?;
    let row_count = ctx.sink.row_count(name)?;
    info!("dw_load: table {name} replaced, {row_count} rows");
    Ok(StageOutput::Warehouse { table: name.to_string(),
                                object_key,
                                rows_written,
                                row_count })
}

pub fn dw_load_dim_brand(ctx: &PipelineContext, stage: &mut StageCtx<'_>) -> Result<StageOutput, StageError> {
    let clean = ctx.read(CLEAN_DATA)?;
    let brands = dim_brand(&clean)?;
    stage.checkpoint();
    publish(ctx, DIM_BRAND, &brands)
}

pub fn dw_load_dim_product(ctx: &PipelineContext, stage: &mut StageCtx<'_>) -> Result<StageOutput, StageError> {
    let clean = ctx.read(CLEAN_DATA)?;
    let products = dim_product(&clean)?;
    stage.checkpoint();
    publish(ctx, DIM_PRODUCT, &products)
}

/// Usa el `dim_product.csv` publicado (no uno recalculado) para que los
/// `product_id` del fact coincidan con la dimensión cargada. Las filas limpias
/// cuyo producto todavía no está publicado quedan sin `product_id`.
pub fn dw_load_fact_product_price(ctx: &PipelineContext, stage: &mut StageCtx<'_>) -> Result<StageOutput, StageError> {
    let clean = ctx.read(CLEAN_DATA)?;
    let products = ctx.read(DIM_PRODUCT)?;
    info!("dw_load: clean {} rows, dim_product {} rows", clean.len(), products.len());
    let fact = fact_product_price(&clean, &products)?;
    let unmatched = fact.column(PRODUCT_ID)?.filter(Option::is_none).count();
    if unmatched > 0 {
        warn!("dw_load: {unmatched} fact rows have no product in the published dim_product");
    }
    stage.checkpoint();
    publish(ctx, FACT_PRODUCT_PRICE, &fact)
}
