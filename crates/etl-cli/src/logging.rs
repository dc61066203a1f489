use tracing_subscriber::EnvFilter;

/// Instala el subscriber de `tracing` para todo el proceso.
///
/// `RUST_LOG` tiene prioridad; si no está definido se usa `log_level`. Los
/// registros emitidos con la fachada `log` por los crates de librería también
/// pasan por este subscriber.
pub fn init(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt().with_env_filter(env_filter)
                             .with_target(false)
                             .init();
}
