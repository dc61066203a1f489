use anyhow::{bail, Result};
use etl_adapters::{Pipeline, StageOutput};
use etl_core::{LedgerStore, StageOutcome};

fn report(stage: &str, outcome: &StageOutcome<StageOutput>) -> Result<()> {
    let label = outcome.label();
    match outcome {
        StageOutcome::Success(output) => {
            println!("{stage}: {label}");
            println!("{}", serde_json::to_string_pretty(output)?);
        }
        StageOutcome::Skipped(reason) => println!("{stage}: {label} ({reason})"),
        StageOutcome::Failed(err) => println!("{stage}: {label} ({err})"),
    }
    Ok(())
}

/// `etlflow run <stage>`: un stage, una vez. Sale con error si el stage falla
/// para que el orquestador externo marque la corrida.
pub fn execute<L: LedgerStore>(pipeline: &Pipeline<L>, stage: &str) -> Result<()> {
    let outcome = pipeline.run(stage)?;
    report(stage, &outcome)?;
    outcome.into_result()?;
    Ok(())
}

/// `etlflow run-all`: todo el catálogo en orden.
pub fn execute_all<L: LedgerStore>(pipeline: &Pipeline<L>) -> Result<()> {
    let outcomes = pipeline.run_all();
    for (stage, outcome) in &outcomes {
        report(stage, outcome)?;
    }
    let failed: Vec<&str> = outcomes.iter()
                                    .filter(|(_, o)| o.is_failed())
                                    .map(|(s, _)| s.as_str())
                                    .collect();
    if !failed.is_empty() {
        bail!("failed stages: {}", failed.join(", "));
    }
    Ok(())
}
