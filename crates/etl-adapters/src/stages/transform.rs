use etl_core::{StageCtx, StageError};
use etl_domain::dimensional::{clean, dim_brand, dim_product, fact_product_price};
use log::info;

use super::StageOutput;
use crate::catalog::{CLEAN_DATA, DIM_BRAND, DIM_PRODUCT, FACT_PRODUCT_PRICE, RAW_DATA};
use crate::context::PipelineContext;

const PREVIEW_PREFIX: &str = "preview";

fn preview(artifact: &str) -> String {
    format!("{PREVIEW_PREFIX}/{artifact}")
}

/// Limpia `raw_data.csv` y arma el modelo dimensional.
///
/// Escribe la tabla limpia y una vista previa de `dim_brand`, `dim_product` y
/// `fact_product_price` bajo `preview/`. Los nombres sin prefijo pertenecen a
/// los stages `dw_load_*`; escribirlos acá los cambiaría sin pasar por el
/// ledger.
pub fn transform(ctx: &PipelineContext, stage: &mut StageCtx<'_>) -> Result<StageOutput, StageError> {
    let raw = ctx.read(RAW_DATA)?;
    info!("transform: read {} raw rows", raw.len());

    let transform_time = ctx.clock.now().naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
    let clean_table = clean(&raw, &transform_time)?;
    let brands = dim_brand(&clean_table)?;
    let products = dim_product(&clean_table)?;
    let fact = fact_product_price(&clean_table, &products)?;
    info!("transform: {} clean rows ({} dropped), {} brands, {} products",
          clean_table.len(),
          raw.len() - clean_table.len(),
          brands.len(),
          products.len());
    stage.checkpoint();

    Ok(StageOutput::Transform { clean_key: ctx.write(CLEAN_DATA, &clean_table)?,
                                dim_brand_key: ctx.write(&preview(DIM_BRAND), &brands)?,
                                dim_product_key: ctx.write(&preview(DIM_PRODUCT), &products)?,
                                fact_key: ctx.write(&preview(FACT_PRODUCT_PRICE), &fact)?,
                                rows: clean_table.len() })
}
