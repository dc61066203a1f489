use etl_core::{StageCtx, StageError};
use etl_domain::{QualityReport, TableStoreExt};
use log::info;

use super::StageOutput;
use crate::catalog::{CLEAN_DATA, QUALITY_REPORT};
use crate::context::PipelineContext;

/// Reporte de calidad del staging del día, guardado junto al archivo.
///
/// La carpeta se arma con la fecha de `ctx.today()`, no con la que usó `load`:
/// ambos stages tienen que correr el mismo día (UTC). Si `check` corre otro
/// día no encuentra el archivo y termina en `P4` aunque `staged_data.csv` esté
/// en `P3`.
pub fn check(ctx: &PipelineContext, stage: &mut StageCtx<'_>) -> Result<StageOutput, StageError> {
    let day = ctx.today();
    let staged_key = ctx.staging_key(day, CLEAN_DATA);
    let staged = ctx.store.read_table(&staged_key)?;
    info!("check: {} staged rows in {staged_key}", staged.len());

    let report = QualityReport::inspect(&staged);
    report.log_findings();
    let report_table = report.to_table()?;
    stage.checkpoint();

    let report_key = ctx.staging_key(day, QUALITY_REPORT);
    ctx.store.write_table(&report_key, &report_table)?;
    info!("check: report saved to {report_key}");
    Ok(StageOutput::Check { report_key, report })
}
