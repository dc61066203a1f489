//! `etlflow`: entrypoint de línea de comandos del pipeline.
//!
//! Cada invocación de `run` es una ejecución independiente de un stage; la
//! coordinación entre invocaciones (incluidas las de otros procesos) pasa
//! sólo por el ledger del bucket.

mod commands;
mod logging;
mod wiring;

use clap::{Parser, Subcommand};
use etl_persistence::EtlConfig;

#[derive(Parser)]
#[command(name = "etlflow", version, about = "Stage runner for the product-price ETL pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single stage once
    Run {
        /// Stage name (see `etlflow stages`)
        stage: String,
    },
    /// Run every stage of the catalog once, in declaration order
    RunAll,
    /// Print the status ledger
    Status,
    /// List the stage catalog with its effective dependency edges
    Stages,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    let cfg = EtlConfig::from_env()?;
    match cli.command {
        Commands::Run { stage } => commands::run::execute(&wiring::build_pipeline(&cfg)?, &stage),
        Commands::RunAll => commands::run::execute_all(&wiring::build_pipeline(&cfg)?),
        Commands::Status => commands::status::execute(&wiring::build_pipeline(&cfg)?),
        Commands::Stages => {
            commands::status::list_stages(&wiring::catalog(&cfg));
            Ok(())
        }
    }
}
