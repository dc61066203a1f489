use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use etl_core::SinkError;

use crate::table::Table;

/// Destino relacional de las tablas del warehouse.
///
/// `replace_table` tiene semántica de reemplazo total (drop + create + insert)
/// y devuelve la cantidad de filas escritas.
pub trait RelationalSink: Send + Sync {
    fn replace_table(&self, name: &str, table: &Table) -> Result<u64, SinkError>;
    fn row_count(&self, name: &str) -> Result<u64, SinkError>;
}

impl<T: RelationalSink + ?Sized> RelationalSink for Arc<T> {
    fn replace_table(&self, name: &str, table: &Table) -> Result<u64, SinkError> {
        (**self).replace_table(name, table)
    }
    fn row_count(&self, name: &str) -> Result<u64, SinkError> {
        (**self).row_count(name)
    }
}

/// Nombre de tabla válido: `[A-Za-z_][A-Za-z0-9_]*`, hasta 63 bytes.
pub fn validate_identifier(name: &str) -> Result<&str, SinkError> {
    let mut chars = name.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || name.len() > 63 || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SinkError::InvalidIdentifier(name.to_string()));
    }
    Ok(name)
}

/// Sink en memoria. Los clones comparten contenido.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRelationalSink {
    tables: Arc<Mutex<HashMap<String, Table>>>,
}

impl InMemoryRelationalSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<Table> {
        self.tables.lock().unwrap_or_else(|p| p.into_inner()).get(name).cloned()
    }
}

impl RelationalSink for InMemoryRelationalSink {
    fn replace_table(&self, name: &str, table: &Table) -> Result<u64, SinkError> {
        validate_identifier(name)?;
        for column in table.columns() {
            validate_identifier(column)?;
        }
        self.tables
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(name.to_string(), table.clone());
        Ok(table.len() as u64)
    }

    fn row_count(&self, name: &str) -> Result<u64, SinkError> {
        self.tables
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(name)
            .map(|t| t.len() as u64)
            .ok_or_else(|| SinkError::TableNotFound(name.to_string()))
    }
}
