use etl_core::{LedgerError, LedgerStore, StageOutcome, StageRunner, StatusLedger};
use log::info;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::context::PipelineContext;
use crate::stages::{work_for, StageOutput};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("unknown stage {0:?}")]
    UnknownStage(String),
}

/// Catálogo + runner + contexto: el punto de entrada del orquestador.
pub struct Pipeline<L: LedgerStore> {
    runner: StageRunner<L>,
    catalog: Catalog,
    ctx: PipelineContext,
}

impl<L: LedgerStore> Pipeline<L> {
    pub fn new(runner: StageRunner<L>, catalog: Catalog, ctx: PipelineContext) -> Self {
        Self { runner, catalog, ctx }
    }

    pub fn runner(&self) -> &StageRunner<L> {
        &self.runner
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    /// Ejecuta un stage por nombre. Cada invocación es independiente: el
    /// único estado compartido con otras ejecuciones es el ledger.
    pub fn run(&self, stage: &str) -> Result<StageOutcome<StageOutput>, PipelineError> {
        let spec = self.catalog
                       .get(stage)
                       .ok_or_else(|| PipelineError::UnknownStage(stage.to_string()))?;
        let work = work_for(&spec.name).ok_or_else(|| PipelineError::UnknownStage(stage.to_string()))?;
        Ok(self.runner.run_stage(spec, |stage_ctx| work(&self.ctx, stage_ctx)))
    }

    /// Ejecuta todo el catálogo una vez, en orden. Un stage que falla o se
    /// salta no detiene a los demás; los que dependen de él se saltarán solos
    /// por gating.
    pub fn run_all(&self) -> Vec<(String, StageOutcome<StageOutput>)> {
        let outcomes: Vec<_> = self.catalog
                                   .iter()
                                   .filter_map(|spec| {
                                       let work = work_for(&spec.name)?;
                                       let outcome = self.runner.run_stage(spec, |stage_ctx| work(&self.ctx, stage_ctx));
                                       Some((spec.name.clone(), outcome))
                                   })
                                   .collect();
        let failed = outcomes.iter().filter(|(_, o)| o.is_failed()).count();
        let skipped = outcomes.iter().filter(|(_, o)| o.is_skipped()).count();
        info!("run_all: {} stages, {failed} failed, {skipped} skipped", outcomes.len());
        outcomes
    }

    pub fn status(&self) -> Result<StatusLedger, LedgerError> {
        self.runner.ledger().load()
    }
}
