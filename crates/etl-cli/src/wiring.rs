//! Arma el `Pipeline` a partir de `EtlConfig`.

use std::sync::Arc;

use anyhow::Context;
use etl_adapters::{Catalog, Pipeline, PipelineContext};
use etl_core::{LogNotifier, ObjectLedgerStore, ObjectStoreAccessor, StageRunner};
use etl_domain::{InMemoryRelationalSink, RelationalSink};
use etl_persistence::{build_pool_from_config, open_store, EtlConfig, PgRelationalSink, PoolProvider};
use log::{info, warn};

pub type CliLedger = ObjectLedgerStore<Arc<dyn ObjectStoreAccessor>>;

fn open_sink(cfg: &EtlConfig) -> anyhow::Result<Arc<dyn RelationalSink>> {
    match &cfg.database {
        Some(db) => {
            let pool = build_pool_from_config(db).context("building Postgres pool")?;
            info!("sink: Postgres (pool {}..{})", db.min_connections, db.max_connections);
            Ok(Arc::new(PgRelationalSink::new(PoolProvider { pool })))
        }
        None => {
            warn!("sink: DATABASE_URL not set, dw_load_* stages write to an in-memory sink");
            Ok(Arc::new(InMemoryRelationalSink::new()))
        }
    }
}

pub fn catalog(cfg: &EtlConfig) -> Catalog {
    Catalog::default().with_overrides(&cfg.upstream_overrides)
}

pub fn build_pipeline(cfg: &EtlConfig) -> anyhow::Result<Pipeline<CliLedger>> {
    let store = open_store(cfg).context("opening object store")?;
    let ledger = ObjectLedgerStore::with_file_name(store.clone(), &cfg.bucket, &cfg.ledger_file);
    info!("ledger at {}", ledger.key());

    let runner = StageRunner::builder(ledger).notifier(Arc::new(LogNotifier))
                                             .recipient(cfg.notify_recipient.clone())
                                             .build();

    let mut ctx = PipelineContext::new(store, open_sink(cfg)?, cfg.bucket.clone()).with_staging_folder(cfg.staging_folder.clone());
    if let Some(path) = &cfg.source_path {
        ctx = ctx.with_source_path(path.clone());
    }
    Ok(Pipeline::new(runner, catalog(cfg), ctx))
}
