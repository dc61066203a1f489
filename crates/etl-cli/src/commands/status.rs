use anyhow::{Context, Result};
use etl_adapters::{Catalog, Pipeline};
use etl_core::LedgerStore;

/// Imprime el ledger tal como está persistido.
pub fn execute<L: LedgerStore>(pipeline: &Pipeline<L>) -> Result<()> {
    let ledger = pipeline.status().context("reading status ledger")?;
    if ledger.is_empty() {
        println!("ledger is empty");
        return Ok(());
    }
    println!("{:<28} {:<6} last_update", "artifact_id", "status");
    for record in ledger.iter() {
        println!("{:<28} {:<6} {}", record.artifact_id, record.state.as_str(), record.last_update.to_rfc3339());
    }
    Ok(())
}

/// Lista el catálogo con sus aristas efectivas (tras los overrides).
pub fn list_stages(catalog: &Catalog) {
    for spec in catalog.iter() {
        let upstream = if spec.is_root() { "-".to_string() } else { spec.upstream.join(", ") };
        println!("{:<28} -> {:<26} after: {upstream}", spec.name, spec.artifact_id);
    }
}
