//! Constantes compartidas del protocolo.

/// Nombre lógico del ledger dentro del bucket. Todos los stages leen y
/// escriben este único objeto.
pub const LEDGER_FILE_NAME: &str = "file_status.csv";

/// Columnas del ledger persistido, en orden.
pub const LEDGER_COLUMNS: [&str; 3] = ["artifact_id", "status", "last_update"];

/// Nombre de columna usado por ledgers escritos antes del renombrado a
/// `artifact_id`. Sólo se acepta en lectura.
pub const LEGACY_ID_COLUMN: &str = "file_name";

/// Plantilla del asunto de la notificación de fallo.
pub const FAILURE_SUBJECT_PREFIX: &str = "[ETL ERROR]";
