use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use etl_core::{EventStore, InMemoryEventStore, InMemoryNotifier, InMemoryObjectStore, LifecycleState, ObjectLedgerStore,
               ObjectStoreAccessor, SkipReason, StageError, StageEventKind, StageOutcome, StageRunner, StageSpec,
               StoreError};
use etl_core::LedgerStore;
use LifecycleState::*;

/// Object store que rechaza las escrituras indicadas (1-based) y delega el
/// resto en un store en memoria.
struct FlakyStore {
    inner: InMemoryObjectStore,
    puts: AtomicUsize,
    fail_on: Vec<usize>,
}

impl FlakyStore {
    fn failing_puts(fail_on: &[usize]) -> Self {
        Self { inner: InMemoryObjectStore::new(),
               puts: AtomicUsize::new(0),
               fail_on: fail_on.to_vec() }
    }
}

impl ObjectStoreAccessor for FlakyStore {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.exists(key)
    }

    fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.inner.get_bytes(key)
    }

    fn put_bytes(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let n = self.puts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on.contains(&n) {
            return Err(StoreError::Backend(format!("put #{n} rejected")));
        }
        self.inner.put_bytes(key, bytes)
    }
}

fn persisted_flags(events: &InMemoryEventStore) -> Vec<(LifecycleState, bool)> {
    let run = events.run_ids()[0];
    events.list(run)
          .into_iter()
          .filter_map(|e| match e.kind {
              StageEventKind::StateTransition { state, persisted, .. } => Some((state, persisted)),
              _ => None,
          })
          .collect()
}

#[test]
fn unreadable_ledger_skips_gated_stage_and_writes_nothing() {
    let store = InMemoryObjectStore::new();
    let corrupt = b"artifact_id,status,last_update\nraw_data.csv,DONE,2024-01-01T00:00:00Z\n".to_vec();
    store.put_bytes("etl/file_status.csv", corrupt.clone()).unwrap();
    let notifier = InMemoryNotifier::new();
    let runner = StageRunner::builder(ObjectLedgerStore::new(store.clone(), "etl")).notifier(Arc::new(notifier.clone()))
                                                                                   .build();

    let outcome = runner.run_stage(&StageSpec::new("transform", "clean_data.csv").after("raw_data.csv"), |_ctx| Ok(()));
    assert!(matches!(outcome, StageOutcome::Skipped(SkipReason::LedgerUnavailable(_))));
    assert_eq!(store.get_bytes("etl/file_status.csv").unwrap(), corrupt);
    assert!(notifier.sent().is_empty());
}

#[test]
fn claim_failure_fails_stage_before_work_and_notifies() {
    let notifier = InMemoryNotifier::new();
    let events = Arc::new(InMemoryEventStore::new());
    let runner = StageRunner::builder(ObjectLedgerStore::new(FlakyStore::failing_puts(&[1]), "etl"))
        .notifier(Arc::new(notifier.clone()))
        .events(events.clone())
        .build();

    let mut started = false;
    let outcome = runner.run_stage(&StageSpec::new("extract", "raw_data.csv"), |_ctx| {
                            started = true;
                            Ok(())
                        });
    assert!(!started);
    match outcome {
        StageOutcome::Failed(StageError::Ledger(msg)) => assert!(msg.contains("put #1 rejected")),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(persisted_flags(&events), [(P1, false)]);
    assert_eq!(notifier.sent().len(), 1);
    assert!(runner.ledger().load().unwrap().is_empty());
}

#[test]
fn checkpoint_write_failure_is_not_fatal() {
    let events = Arc::new(InMemoryEventStore::new());
    let runner = StageRunner::builder(ObjectLedgerStore::new(FlakyStore::failing_puts(&[2]), "etl")).events(events.clone())
                                                                                                  .build();

    let outcome = runner.run_stage(&StageSpec::new("extract", "raw_data.csv"), |ctx| {
                            ctx.checkpoint();
                            Ok("written")
                        });
    assert_eq!(outcome, StageOutcome::Success("written"));
    assert_eq!(persisted_flags(&events), [(P1, true), (P2, false), (P3, true)]);
    assert_eq!(runner.ledger().load().unwrap().lookup("raw_data.csv"), Some(P3));
}

#[test]
fn terminal_write_failure_keeps_outcome_and_leaves_last_persisted_state() {
    let events = Arc::new(InMemoryEventStore::new());
    let runner = StageRunner::builder(ObjectLedgerStore::new(FlakyStore::failing_puts(&[3]), "etl")).events(events.clone())
                                                                                                  .build();

    let outcome = runner.run_stage(&StageSpec::new("extract", "raw_data.csv"), |_ctx| Ok(()));
    assert!(outcome.is_success());
    assert_eq!(persisted_flags(&events), [(P1, true), (P2, true), (P3, false)]);
    assert_eq!(runner.ledger().load().unwrap().lookup("raw_data.csv"), Some(P2));
}

#[test]
fn failing_notifier_is_swallowed() {
    let notifier = InMemoryNotifier::failing();
    let runner = StageRunner::builder(ObjectLedgerStore::new(InMemoryObjectStore::new(), "etl")).notifier(Arc::new(notifier.clone()))
                                                                                              .build();

    let outcome: StageOutcome<()> =
        runner.run_stage(&StageSpec::new("check", "data_quality_report.csv"), |_ctx| Err(StageError::Data("empty".into())));
    assert_eq!(outcome, StageOutcome::Failed(StageError::Data("empty".into())));
    assert_eq!(notifier.sent().len(), 1, "delivery was attempted once");
    assert_eq!(runner.ledger().load().unwrap().lookup("data_quality_report.csv"), Some(P4));
}
