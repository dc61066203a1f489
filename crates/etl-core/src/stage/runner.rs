//! Runner de stages.
//!
//! Todos los stages pasan por aquí, parametrizados sólo por su `StageSpec` y
//! la función de trabajo. Orden de una ejecución:
//!
//! 1. Gating: cada upstream debe estar en `P3`; si no, `Skipped` sin escribir.
//! 2. Claim: `P1` persistido. Si no se puede escribir, el trabajo no empieza.
//! 3. Trabajo: la función recibe un `StageCtx`; `ctx.checkpoint()` escribe `P2`.
//! 4. Éxito: `P2` (si la función no lo hizo) y luego `P3`.
//! 5. Fallo: `P4`, notificación y `Failed(error)`.
//!
//! Las escrituras de `P2`/`P3`/`P4` son best-effort: si fallan se loguean y la
//! ejecución sigue, porque el efecto sobre los datos ya ocurrió (o no) con
//! independencia del ledger. No hay rollback de artifacts parcialmente
//! escritos, ni reintentos, ni lock por artifact: dos ejecuciones del mismo
//! stage en paralelo pueden intercalar sus escrituras.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::Serialize;
use uuid::Uuid;

use super::{SkipReason, StageOutcome, StageSpec};
use crate::clock::{Clock, SystemClock};
use crate::constants::FAILURE_SUBJECT_PREFIX;
use crate::errors::StageError;
use crate::event::{EventStore, InMemoryEventStore, StageEventKind};
use crate::io::{LogNotifier, Notifier};
use crate::ledger::{LedgerStore, LifecycleState};

pub struct StageRunner<L: LedgerStore> {
    ledger: L,
    notifier: Arc<dyn Notifier>,
    events: Arc<dyn EventStore>,
    clock: Arc<dyn Clock>,
    recipient: String,
}

/// Builder de `StageRunner`. Sólo el ledger es obligatorio.
pub struct StageRunnerBuilder<L: LedgerStore> {
    ledger: L,
    notifier: Arc<dyn Notifier>,
    events: Arc<dyn EventStore>,
    clock: Arc<dyn Clock>,
    recipient: String,
}

impl<L: LedgerStore> StageRunnerBuilder<L> {
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn events(mut self, events: Arc<dyn EventStore>) -> Self {
        self.events = events;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Destinatario de las notificaciones de fallo.
    pub fn recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = recipient.into();
        self
    }

    pub fn build(self) -> StageRunner<L> {
        StageRunner { ledger: self.ledger,
                      notifier: self.notifier,
                      events: self.events,
                      clock: self.clock,
                      recipient: self.recipient }
    }
}

impl<L: LedgerStore> StageRunner<L> {
    #[inline]
    pub fn builder(ledger: L) -> StageRunnerBuilder<L> {
        StageRunnerBuilder { ledger,
                             notifier: Arc::new(LogNotifier),
                             events: Arc::new(InMemoryEventStore::new()),
                             clock: Arc::new(SystemClock),
                             recipient: String::new() }
    }

    /// Runner con defaults: `LogNotifier`, eventos en memoria, reloj del sistema.
    pub fn new(ledger: L) -> Self {
        Self::builder(ledger).build()
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn events(&self) -> &Arc<dyn EventStore> {
        &self.events
    }

    /// Evalúa la regla de gating: lectura puntual, sin esperas ni polling.
    pub fn check_preconditions(&self, spec: &StageSpec) -> Result<(), SkipReason> {
        if spec.upstream.is_empty() {
            return Ok(());
        }
        let ledger = self.ledger.load().map_err(|e| {
                                           error!("stage={} cannot read ledger: {e}", spec.name);
                                           SkipReason::LedgerUnavailable(e.to_string())
                                       })?;
        for upstream in &spec.upstream {
            let observed = ledger.lookup(upstream);
            if !observed.is_some_and(|s| s.is_consumable()) {
                return Err(SkipReason::UpstreamNotReady { upstream: upstream.clone(),
                                                          observed });
            }
        }
        Ok(())
    }

    /// Ejecuta un stage completo bajo el protocolo del ledger.
    ///
    /// La función de trabajo es opaca: lee, transforma y escribe lo que
    /// necesite. Un `panic` dentro de ella se trata como fallo del stage.
    pub fn run_stage<T, F>(&self, spec: &StageSpec, work: F) -> StageOutcome<T>
        where T: Serialize,
              F: FnOnce(&mut StageCtx<'_>) -> Result<T, StageError>
    {
        let run_id = Uuid::new_v4();
        self.events.append_kind(run_id,
                                StageEventKind::StageStarted { stage: spec.name.clone(),
                                                               artifact_id: spec.artifact_id.clone(),
                                                               upstream: spec.upstream.clone() });

        if let Err(reason) = self.check_preconditions(spec) {
            info!("stage={} skipped: {reason}", spec.name);
            self.events.append_kind(run_id,
                                    StageEventKind::StageSkipped { stage: spec.name.clone(),
                                                                   reason: reason.to_string() });
            return StageOutcome::Skipped(reason);
        }

        info!("stage={} artifact={} run_id={run_id} starting", spec.name, spec.artifact_id);
        if let Err(e) = self.ledger.update(&spec.artifact_id, LifecycleState::P1, self.clock.now()) {
            let err = StageError::from(e);
            error!("stage={} cannot claim {}: {err}", spec.name, spec.artifact_id);
            self.record_transition(run_id, &spec.artifact_id, LifecycleState::P1, false);
            self.report_failure(run_id, spec, &err);
            return StageOutcome::Failed(err);
        }
        self.record_transition(run_id, &spec.artifact_id, LifecycleState::P1, true);

        let mut ctx = StageCtx { ledger: &self.ledger,
                                 events: self.events.as_ref(),
                                 clock: self.clock.as_ref(),
                                 spec,
                                 run_id,
                                 state: LifecycleState::P1 };
        let result = panic::catch_unwind(AssertUnwindSafe(|| work(&mut ctx)))
            .unwrap_or_else(|payload| Err(StageError::Internal(format!("stage panicked: {}", panic_message(payload.as_ref())))));

        match result {
            Ok(output) => {
                ctx.checkpoint();
                self.write_terminal(run_id, spec, ctx.state, LifecycleState::P3);
                let payload = serde_json::to_value(&output).unwrap_or(serde_json::Value::Null);
                self.events.append_kind(run_id,
                                        StageEventKind::StageFinished { stage: spec.name.clone(),
                                                                        artifact_id: spec.artifact_id.clone(),
                                                                        payload });
                info!("stage={} artifact={} finished (P3)", spec.name, spec.artifact_id);
                StageOutcome::Success(output)
            }
            Err(err) => {
                error!("stage={} artifact={} failed: {err}", spec.name, spec.artifact_id);
                self.write_terminal(run_id, spec, ctx.state, LifecycleState::P4);
                self.report_failure(run_id, spec, &err);
                StageOutcome::Failed(err)
            }
        }
    }

    fn write_terminal(&self, run_id: Uuid, spec: &StageSpec, from: LifecycleState, state: LifecycleState) {
        debug_assert!(state.is_terminal() && state.follows(Some(from)), "{from} -> {state}");
        let persisted = match self.ledger.update(&spec.artifact_id, state, self.clock.now()) {
            Ok(_) => true,
            Err(e) => {
                error!("stage={} could not persist {state} for {}: {e}", spec.name, spec.artifact_id);
                false
            }
        };
        self.record_transition(run_id, &spec.artifact_id, state, persisted);
    }

    fn record_transition(&self, run_id: Uuid, artifact_id: &str, state: LifecycleState, persisted: bool) {
        debug!("transition run_id={run_id} artifact={artifact_id} state={state} persisted={persisted}");
        self.events.append_kind(run_id,
                                StageEventKind::StateTransition { artifact_id: artifact_id.to_string(),
                                                                  state,
                                                                  persisted });
    }

    fn report_failure(&self, run_id: Uuid, spec: &StageSpec, err: &StageError) {
        self.events.append_kind(run_id,
                                StageEventKind::StageFailed { stage: spec.name.clone(),
                                                              error: err.clone() });
        let subject = format!("{FAILURE_SUBJECT_PREFIX} {} Failed", spec.name);
        let message = format!("stage: {}\nartifact: {}\nrun_id: {run_id}\nerror: {err}",
                              spec.name, spec.artifact_id);
        if let Err(e) = self.notifier.notify_failure(&subject, &message, &self.recipient) {
            warn!("stage={} notification not delivered: {e}", spec.name);
        }
    }
}

/// Handle entregado a la función de trabajo de un stage.
pub struct StageCtx<'a> {
    ledger: &'a dyn LedgerStore,
    events: &'a dyn EventStore,
    clock: &'a dyn Clock,
    spec: &'a StageSpec,
    run_id: Uuid,
    state: LifecycleState,
}

impl StageCtx<'_> {
    pub fn spec(&self) -> &StageSpec {
        self.spec
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn is_checkpointed(&self) -> bool {
        self.state == LifecycleState::P2
    }

    /// Marca `P2`: los datos de salida están materializados y empieza la
    /// escritura durable. Es un checkpoint de liveness; si el ledger no acepta
    /// la escritura se loguea y el trabajo continúa. Idempotente por ejecución.
    pub fn checkpoint(&mut self) {
        if !LifecycleState::P2.follows(Some(self.state)) {
            return;
        }
        self.state = LifecycleState::P2;
        let persisted = match self.ledger.update(&self.spec.artifact_id, LifecycleState::P2, self.clock.now()) {
            Ok(_) => true,
            Err(e) => {
                warn!("stage={} could not persist P2 for {}: {e}", self.spec.name, self.spec.artifact_id);
                false
            }
        };
        self.events.append_kind(self.run_id,
                                StageEventKind::StateTransition { artifact_id: self.spec.artifact_id.clone(),
                                                                  state: LifecycleState::P2,
                                                                  persisted });
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
