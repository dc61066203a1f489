//! Escenario completo sobre un object store en disco: cada `Pipeline` hace
//! las veces de un proceso independiente que sólo comparte el directorio.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use etl_core::{EventStore, InMemoryEventStore, InMemoryNotifier, ObjectStoreAccessor};
use etl_domain::{InMemoryRelationalSink, RelationalSink};
use etlflow::adapters::catalog;
use etlflow::{open_store, Catalog, EtlConfig, LifecycleState, ObjectLedgerStore, Pipeline, PipelineContext,
              SkipReason, StageOutcome, StageRunner};
use tempfile::TempDir;
use LifecycleState::*;

const SOURCE: &str = "product_name,price_raw\n\
                      Apple iPhone 15,22.990.000₫\n\
                      Samsung Galaxy S24,19.990.000₫\n\
                      Samsung Galaxy A55,9.490.000₫\n";

type DiskLedger = ObjectLedgerStore<Arc<dyn ObjectStoreAccessor>>;

struct Process {
    pipeline: Pipeline<DiskLedger>,
    events: Arc<InMemoryEventStore>,
    notifier: InMemoryNotifier,
}

fn config(root: &Path) -> EtlConfig {
    let source = root.join("products.csv");
    EtlConfig::from_vars([("ETL_STORE", "local".to_string()),
                          ("ETL_LOCAL_ROOT", root.join("lake").display().to_string()),
                          ("ETL_BUCKET", "etl".to_string()),
                          ("ETL_SOURCE_PATH", source.display().to_string()),
                          ("ETL_NOTIFY_RECIPIENT", "oncall@example.org".to_string())]).unwrap()
}

fn process(cfg: &EtlConfig, sink: &InMemoryRelationalSink) -> Process {
    let store = open_store(cfg).unwrap();
    let events = Arc::new(InMemoryEventStore::new());
    let notifier = InMemoryNotifier::new();
    let runner = StageRunner::builder(ObjectLedgerStore::with_file_name(store.clone(), &cfg.bucket, &cfg.ledger_file))
        .events(events.clone())
        .notifier(Arc::new(notifier.clone()))
        .recipient(cfg.notify_recipient.clone())
        .build();
    let mut ctx = PipelineContext::new(store, Arc::new(sink.clone()), cfg.bucket.clone());
    if let Some(path) = &cfg.source_path {
        ctx = ctx.with_source_path(path.clone());
    }
    Process { pipeline: Pipeline::new(runner, Catalog::default().with_overrides(&cfg.upstream_overrides), ctx),
              events,
              notifier }
}

fn ledger_of(p: &Process) -> Vec<(String, LifecycleState)> {
    p.pipeline
     .status()
     .unwrap()
     .iter()
     .map(|r| (r.artifact_id.clone(), r.state))
     .collect()
}

#[test]
fn extract_transform_load_then_failed_rerun_gates_load() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("products.csv"), SOURCE).unwrap();
    let cfg = config(dir.path());
    let sink = InMemoryRelationalSink::new();

    let first = process(&cfg, &sink);
    for stage in [catalog::EXTRACT, catalog::TRANSFORM, catalog::LOAD] {
        assert!(first.pipeline.run(stage).unwrap().is_success(), "{stage}");
    }
    assert_eq!(ledger_of(&first),
               vec![("raw_data.csv".to_string(), P3), ("clean_data.csv".to_string(), P3), ("staged_data.csv".to_string(), P3)]);

    let ledger_file = fs::read_to_string(dir.path().join("lake/etl/file_status.csv")).unwrap();
    assert!(ledger_file.starts_with("artifact_id,status,last_update"));

    // la salida de transform pasa a ser un directorio: el stage falla al
    // escribir, después del checkpoint
    let clean_path = dir.path().join("lake/etl/clean_data.csv");
    fs::remove_file(&clean_path).unwrap();
    fs::create_dir(&clean_path).unwrap();

    let rerun = process(&cfg, &sink);
    assert!(rerun.pipeline.run(catalog::TRANSFORM).unwrap().is_failed());
    let run_ids = rerun.events.run_ids();
    assert_eq!(run_ids.len(), 1);
    assert_eq!(rerun.events.transitions(run_ids[0]), vec![P1, P2, P4]);
    assert_eq!(rerun.notifier.sent().len(), 1);
    assert_eq!(rerun.notifier.sent()[0].recipient, "oncall@example.org");

    assert_eq!(ledger_of(&rerun),
               vec![("raw_data.csv".to_string(), P3), ("clean_data.csv".to_string(), P4), ("staged_data.csv".to_string(), P3)]);

    let downstream = process(&cfg, &sink);
    assert_eq!(downstream.pipeline.run(catalog::LOAD).unwrap(),
               StageOutcome::Skipped(SkipReason::UpstreamNotReady { upstream: "clean_data.csv".into(),
                                                                    observed: Some(P4) }));
    assert_eq!(ledger_of(&downstream), ledger_of(&rerun));
}

#[test]
fn full_run_publishes_the_dimensional_model() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("products.csv"), SOURCE).unwrap();
    let cfg = config(dir.path());
    let sink = InMemoryRelationalSink::new();

    let p = process(&cfg, &sink);
    let outcomes = p.pipeline.run_all();
    assert!(outcomes.iter().all(|(_, o)| o.is_success()), "{outcomes:?}");

    assert_eq!(sink.row_count("dim_brand").unwrap(), 2);
    assert_eq!(sink.row_count("dim_product").unwrap(), 3);
    assert_eq!(sink.row_count("fact_product_price").unwrap(), 3);

    let lake = dir.path().join("lake/etl");
    for name in ["raw_data.csv", "clean_data.csv", "dim_brand.csv", "dim_product.csv", "fact_product_price.csv"] {
        assert!(lake.join(name).is_file(), "{name}");
    }
    let staged_days: Vec<_> = fs::read_dir(lake.join("staging")).unwrap().collect();
    assert_eq!(staged_days.len(), 1);
    assert!(p.notifier.sent().is_empty());
}

#[test]
fn configured_edges_change_what_gates_a_stage() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("products.csv"), SOURCE).unwrap();
    let mut cfg = config(dir.path());
    cfg.upstream_overrides.insert("transform".into(), vec!["dim_brand.csv".into()]);
    let sink = InMemoryRelationalSink::new();

    let p = process(&cfg, &sink);
    assert!(p.pipeline.run(catalog::EXTRACT).unwrap().is_success());
    assert_eq!(p.pipeline.run(catalog::TRANSFORM).unwrap(),
               StageOutcome::Skipped(SkipReason::UpstreamNotReady { upstream: "dim_brand.csv".into(),
                                                                    observed: None }));
    assert_eq!(ledger_of(&p), vec![("raw_data.csv".to_string(), P3)]);
}
