//! Sink relacional sobre Postgres (Diesel + r2d2).
//!
//! Cada `replace_table` corre en UNA transacción:
//! `DROP TABLE IF EXISTS` + `CREATE TABLE` (todas las columnas `TEXT`) +
//! inserts por lotes. Un lector concurrente ve la tabla anterior completa o la
//! nueva completa, nunca una mezcla.
//!
//! Los nombres de tabla y columna se validan (`validate_identifier`) y además
//! se citan; los valores se escapan como literales. Errores transitorios de
//! pool / conexión se reintentan con `with_retry`.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel::sql_types::BigInt;
use etl_core::SinkError;
use etl_domain::{validate_identifier, Cell, RelationalSink, Table};
use log::{debug, info, warn};

use crate::config::DbConfig;
use crate::error::PersistenceError;

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub type PgPooledConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Permite inyectar un pool real o, en tests, cualquier otra fuente de
/// conexiones sin acoplar el sink a r2d2.
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<PgPooledConnection, PersistenceError>;
}

/// Implementación concreta de `ConnectionProvider` respaldada por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<PgPooledConnection, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

const MAX_RETRIES: u32 = 3;
const RETRY_STEP_MS: u64 = 15;
const TRANSIENT_MESSAGES: [&str; 5] =
    ["deadlock detected", "terminating connection", "connection closed", "connection refused", "timeout"];

/// Errores tras los cuales vale la pena repetir el reemplazo entero.
fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict | PersistenceError::TransientIo(_) => true,
        // el driver a veces sólo deja el texto del servidor
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            TRANSIENT_MESSAGES.iter().any(|needle| m.contains(needle))
        }
        _ => false,
    }
}

/// Repite `f` mientras falle con un error transitorio, hasta `MAX_RETRIES`
/// veces, esperando un poco más en cada vuelta. Como cada intento es una
/// transacción completa, repetir no duplica filas.
pub(crate) fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut retries = 0;
    loop {
        match f() {
            Err(e) if retries < MAX_RETRIES && is_retryable(&e) => {
                retries += 1;
                let wait = std::time::Duration::from_millis(RETRY_STEP_MS * u64::from(retries));
                warn!("pg: {e}; retry {retries}/{MAX_RETRIES} in {wait:?}");
                std::thread::sleep(wait);
            }
            r => return r,
        }
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_literal(cell: &Cell) -> String {
    match cell {
        None => "NULL".to_string(),
        // Postgres no acepta NUL dentro de TEXT
        Some(v) => format!("'{}'", v.replace('\0', "").replace('\'', "''")),
    }
}

/// Sentencias SQL de un reemplazo completo de tabla.
fn replace_statements(name: &str, table: &Table, batch_size: usize) -> Result<Vec<String>, SinkError> {
    let table_ident = quote_ident(validate_identifier(name)?);
    let mut columns = Vec::with_capacity(table.width());
    for c in table.columns() {
        columns.push(quote_ident(validate_identifier(c)?));
    }
    let column_defs: Vec<String> = columns.iter().map(|c| format!("{c} TEXT")).collect();

    let mut statements = vec![format!("DROP TABLE IF EXISTS {table_ident}"),
                              format!("CREATE TABLE {table_ident} ({})", column_defs.join(", "))];
    let column_list = columns.join(", ");
    for chunk in table.rows().chunks(batch_size.max(1)) {
        let values: Vec<String> = chunk.iter()
                                       .map(|row| {
                                           let cells: Vec<String> = row.iter().map(quote_literal).collect();
                                           format!("({})", cells.join(", "))
                                       })
                                       .collect();
        statements.push(format!("INSERT INTO {table_ident} ({column_list}) VALUES {}", values.join(", ")));
    }
    Ok(statements)
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    n: i64,
}

pub struct PgRelationalSink<P: ConnectionProvider = PoolProvider> {
    provider: P,
    batch_size: usize,
}

impl<P: ConnectionProvider> PgRelationalSink<P> {
    pub fn new(provider: P) -> Self {
        Self { provider,
               batch_size: 500 }
    }

    /// Filas por sentencia `INSERT`.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

impl<P: ConnectionProvider> RelationalSink for PgRelationalSink<P> {
    fn replace_table(&self, name: &str, table: &Table) -> Result<u64, SinkError> {
        let statements = replace_statements(name, table, self.batch_size)?;
        debug!("pg:replace_table table={name} rows={} statements={}", table.len(), statements.len());
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.transaction::<_, diesel::result::Error, _>(|c| {
                    for stmt in &statements {
                        c.batch_execute(stmt)?;
                    }
                    Ok(())
                })?;
            Ok(())
        })?;
        info!("pg:replace_table table={name} rows={}", table.len());
        Ok(table.len() as u64)
    }

    fn row_count(&self, name: &str) -> Result<u64, SinkError> {
        let query = format!("SELECT COUNT(*) AS n FROM {}", quote_ident(validate_identifier(name)?));
        let row: CountRow = with_retry(|| {
            let mut conn = self.provider.connection()?;
            Ok(diesel::sql_query(&query).get_result::<CountRow>(&mut conn)?)
        })?;
        Ok(row.n.max(0) as u64)
    }
}

/// Construye un pool Postgres r2d2 a partir de URL.
///
/// Si `min_size > max_size` se usa `min = max`; tamaños 0 se elevan a 1.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let validated_min = min_size.max(1);
    let validated_max = max_size.max(1);
    if validated_min > validated_max {
        warn!("min_size > max_size ({validated_min} > {validated_max}), ajustando min=max");
    }
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    r2d2::Pool::builder().min_idle(Some(validated_min.min(validated_max)))
                         .max_size(validated_max)
                         .build(manager)
                         .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))
}

pub fn build_pool_from_config(cfg: &DbConfig) -> Result<PgPool, PersistenceError> {
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let mut t = Table::new(["brand", "brand_id"]);
        t.push_row(vec![Some("O'Neill".into()), Some("1".into())]).unwrap();
        t.push_row(vec![Some("Apple".into()), None]).unwrap();
        t.push_row(vec![Some("Sony".into()), Some("3".into())]).unwrap();
        t
    }

    #[test]
    fn statements_quote_identifiers_and_escape_values() {
        let stmts = replace_statements("dim_brand", &table(), 2).unwrap();
        assert_eq!(stmts[0], r#"DROP TABLE IF EXISTS "dim_brand""#);
        assert_eq!(stmts[1], r#"CREATE TABLE "dim_brand" ("brand" TEXT, "brand_id" TEXT)"#);
        assert_eq!(stmts[2],
                   r#"INSERT INTO "dim_brand" ("brand", "brand_id") VALUES ('O''Neill', '1'), ('Apple', NULL)"#);
        assert_eq!(stmts.len(), 4);
    }

    #[test]
    fn empty_table_only_recreates() {
        let stmts = replace_statements("dim_brand", &Table::new(["brand"]), 500).unwrap();
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn invalid_identifiers_are_rejected_before_sql() {
        assert!(matches!(replace_statements("dim brand", &table(), 10), Err(SinkError::InvalidIdentifier(_))));
        let bad_col = Table::new(["price; drop"]);
        assert!(matches!(replace_statements("fact", &bad_col, 10), Err(SinkError::InvalidIdentifier(_))));
    }

    #[test]
    fn transient_errors_are_retried_until_the_limit() {
        let mut calls = 0;
        let r: Result<(), _> = with_retry(|| {
            calls += 1;
            Err(PersistenceError::TransientIo("connection refused".into()))
        });
        assert!(r.is_err());
        assert_eq!(calls, MAX_RETRIES + 1);

        let mut calls = 0;
        let r = with_retry(|| {
            calls += 1;
            if calls < 3 {
                Err(PersistenceError::Unknown("ERROR: deadlock detected".into()))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(r.unwrap(), 3);

        let mut calls = 0;
        let r: Result<(), _> = with_retry(|| {
            calls += 1;
            Err(PersistenceError::UniqueViolation("dup".into()))
        });
        assert!(r.is_err());
        assert_eq!(calls, 1);
    }
}
