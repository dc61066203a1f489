use std::fs;

use etl_core::{StageCtx, StageError};
use etl_domain::read_csv;
use log::info;

use super::StageOutput;
use crate::catalog::RAW_DATA;
use crate::context::PipelineContext;

/// Copia el CSV de origen configurado a `{bucket}/raw_data.csv`.
pub fn extract(ctx: &PipelineContext, stage: &mut StageCtx<'_>) -> Result<StageOutput, StageError> {
    let source = ctx.source_path
                    .as_ref()
                    .ok_or_else(|| StageError::Config("no source path configured for extract".into()))?;
    let bytes = fs::read(source).map_err(|e| StageError::Storage(format!("{}: {e}", source.display())))?;
    let raw = read_csv(&bytes)?;
    info!("extract: read {} rows, {} cols from {}", raw.len(), raw.width(), source.display());
    stage.checkpoint();

    let raw_key = ctx.write(RAW_DATA, &raw)?;
    info!("extract: raw data saved to {raw_key}");
    Ok(StageOutput::Extract { raw_key,
                              rows: raw.len() })
}
