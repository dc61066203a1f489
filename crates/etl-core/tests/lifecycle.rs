use std::sync::Arc;

use etl_core::{InMemoryEventStore, InMemoryNotifier, InMemoryObjectStore, LedgerStore, LifecycleState, ObjectLedgerStore,
               SkipReason, StageError, StageOutcome, StageRunner, StageSpec};
use etl_core::{EventStore, ManualClock};
use chrono::{DateTime, Duration, TimeZone, Utc};
use LifecycleState::*;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 6, 0, 0).unwrap()
}

type Runner = StageRunner<ObjectLedgerStore<InMemoryObjectStore>>;

fn runner(store: &InMemoryObjectStore, notifier: &InMemoryNotifier, events: &Arc<InMemoryEventStore>) -> Runner {
    StageRunner::builder(ObjectLedgerStore::new(store.clone(), "etl")).notifier(Arc::new(notifier.clone()))
                                                                       .events(events.clone())
                                                                       .clock(Arc::new(ManualClock::new(t0(), Duration::seconds(1))))
                                                                       .recipient("data-team@example.org")
                                                                       .build()
}

fn extract() -> StageSpec {
    StageSpec::new("extract", "raw")
}
fn transform() -> StageSpec {
    StageSpec::new("transform", "clean").after("raw")
}
fn load() -> StageSpec {
    StageSpec::new("load", "staged").after("clean")
}

fn snapshot(r: &Runner) -> Vec<(String, LifecycleState)> {
    r.ledger()
     .load()
     .unwrap()
     .iter()
     .map(|rec| (rec.artifact_id.clone(), rec.state))
     .collect()
}

fn pairs(items: &[(&str, LifecycleState)]) -> Vec<(String, LifecycleState)> {
    items.iter().map(|(a, s)| (a.to_string(), *s)).collect()
}

#[test]
fn empty_ledger_gates_dependent_stage_without_writes() {
    let store = InMemoryObjectStore::new();
    let notifier = InMemoryNotifier::new();
    let events = Arc::new(InMemoryEventStore::new());
    let r = runner(&store, &notifier, &events);

    let outcome = r.run_stage(&transform(), |_ctx| -> Result<(), StageError> { panic!("must not run") });
    assert_eq!(outcome,
               StageOutcome::Skipped(SkipReason::UpstreamNotReady { upstream: "raw".into(),
                                                                    observed: None }));
    assert!(store.keys().is_empty(), "gating must not create the ledger object");
    assert!(notifier.sent().is_empty());
}

#[test]
fn non_p3_upstream_states_all_gate() {
    for state in [P1, P2, P4] {
        let store = InMemoryObjectStore::new();
        let events = Arc::new(InMemoryEventStore::new());
        let r = runner(&store, &InMemoryNotifier::new(), &events);
        r.ledger().update("raw", state, Utc::now()).unwrap();

        let outcome = r.run_stage(&transform(), |_ctx| Ok(()));
        assert_eq!(outcome,
                   StageOutcome::Skipped(SkipReason::UpstreamNotReady { upstream: "raw".into(),
                                                                        observed: Some(state) }));
        assert_eq!(snapshot(&r), pairs(&[("raw", state)]));
    }
}

#[test]
fn every_upstream_must_be_consumable() {
    let store = InMemoryObjectStore::new();
    let events = Arc::new(InMemoryEventStore::new());
    let r = runner(&store, &InMemoryNotifier::new(), &events);
    r.ledger().update("clean", P3, Utc::now()).unwrap();
    r.ledger().update("dim_product", P2, Utc::now()).unwrap();

    let spec = StageSpec::new("dw_load_fact", "fact").after("clean").after("dim_product");
    let outcome = r.run_stage(&spec, |_ctx| Ok(()));
    assert!(outcome.is_skipped());
    assert_eq!(r.ledger().load().unwrap().lookup("fact"), None);
}

#[test]
fn success_and_failure_sequences() {
    let store = InMemoryObjectStore::new();
    let notifier = InMemoryNotifier::new();
    let events = Arc::new(InMemoryEventStore::new());
    let r = runner(&store, &notifier, &events);

    assert!(r.run_stage(&extract(), |ctx| {
                 ctx.checkpoint();
                 Ok(1u32)
             })
             .is_success());
    let first_run = events.run_ids()[0];
    assert_eq!(events.transitions(first_run), [P1, P2, P3]);

    let outcome: StageOutcome<()> = r.run_stage(&transform(), |ctx| {
                                         ctx.checkpoint();
                                         Err(StageError::Data("column price missing".into()))
                                     });
    assert!(outcome.is_failed());
    let failed_run = events.run_ids().into_iter().find(|id| *id != first_run).unwrap();
    assert_eq!(events.transitions(failed_run), [P1, P2, P4]);
    assert_eq!(snapshot(&r), pairs(&[("raw", P3), ("clean", P4)]));

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "[ETL ERROR] transform Failed");
    assert_eq!(sent[0].recipient, "data-team@example.org");
    assert!(sent[0].message.contains("column price missing"));
}

#[test]
fn later_run_terminal_state_wins() {
    let store = InMemoryObjectStore::new();
    let events = Arc::new(InMemoryEventStore::new());
    let r = runner(&store, &InMemoryNotifier::new(), &events);

    let failed: StageOutcome<()> = r.run_stage(&extract(), |_ctx| Err(StageError::Storage("source offline".into())));
    assert!(failed.is_failed());
    assert_eq!(snapshot(&r), pairs(&[("raw", P4)]));

    assert!(r.run_stage(&extract(), |_ctx| Ok(())).is_success());
    let ledger = r.ledger().load().unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.lookup("raw"), Some(P3));
}

#[test]
fn timestamps_follow_the_injected_clock() {
    let store = InMemoryObjectStore::new();
    let events = Arc::new(InMemoryEventStore::new());
    let r = runner(&store, &InMemoryNotifier::new(), &events);
    r.run_stage(&extract(), |_ctx| Ok(()));
    r.run_stage(&extract(), |_ctx| Ok(()));

    let rec = r.ledger().load().unwrap().get("raw").cloned().unwrap();
    // seis escrituras (P1, P2, P3 por corrida) con paso de 1s desde el instante base
    assert_eq!(rec.last_update, t0() + Duration::seconds(5));
}

#[test]
fn extract_transform_load_then_failed_rerun_blocks_load() {
    let store = InMemoryObjectStore::new();
    let notifier = InMemoryNotifier::new();
    let events = Arc::new(InMemoryEventStore::new());
    let r = runner(&store, &notifier, &events);

    assert!(r.run_stage(&extract(), |_ctx| Ok(())).is_success());
    assert_eq!(snapshot(&r), pairs(&[("raw", P3)]));

    assert!(r.run_stage(&transform(), |_ctx| Ok(())).is_success());
    assert_eq!(snapshot(&r), pairs(&[("raw", P3), ("clean", P3)]));

    assert!(r.run_stage(&load(), |_ctx| Ok(())).is_success());
    assert_eq!(snapshot(&r), pairs(&[("raw", P3), ("clean", P3), ("staged", P3)]));

    let rerun: StageOutcome<()> = r.run_stage(&transform(), |ctx| {
                                       ctx.checkpoint();
                                       Err(StageError::Data("division by zero".into()))
                                   });
    assert!(rerun.is_failed());
    assert_eq!(snapshot(&r), pairs(&[("raw", P3), ("clean", P4), ("staged", P3)]));

    let blocked = r.run_stage(&load(), |_ctx| Ok(()));
    assert_eq!(blocked,
               StageOutcome::Skipped(SkipReason::UpstreamNotReady { upstream: "clean".into(),
                                                                    observed: Some(P4) }));
    assert_eq!(snapshot(&r), pairs(&[("raw", P3), ("clean", P4), ("staged", P3)]));
    assert_eq!(notifier.sent().len(), 1);
}
