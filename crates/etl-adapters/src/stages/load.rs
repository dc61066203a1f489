use etl_core::{StageCtx, StageError};
use etl_domain::TableStoreExt;
use log::info;

use super::StageOutput;
use crate::catalog::CLEAN_DATA;
use crate::context::PipelineContext;

/// Versiona la tabla limpia por día en el área de staging.
pub fn load(ctx: &PipelineContext, stage: &mut StageCtx<'_>) -> Result<StageOutput, StageError> {
    let clean = ctx.read(CLEAN_DATA)?;
    info!("load: read {} rows, {} cols", clean.len(), clean.width());
    stage.checkpoint();

    let staged_key = ctx.staging_key(ctx.today(), CLEAN_DATA);
    ctx.store.write_table(&staged_key, &clean)?;
    info!("load: staged to {staged_key}");
    Ok(StageOutput::Load { staged_key,
                           rows: clean.len() })
}
