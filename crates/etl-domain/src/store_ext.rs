use etl_core::ObjectStoreAccessor;
use log::debug;

use crate::codec::{read_csv, write_csv};
use crate::table::Table;
use crate::TableError;

/// Lectura/escritura de tablas sobre cualquier object store.
pub trait TableStoreExt: ObjectStoreAccessor {
    fn read_table(&self, key: &str) -> Result<Table, TableError> {
        let bytes = self.get_bytes(key)?;
        let table = read_csv(&bytes)?;
        debug!("table:read key={key} rows={} cols={}", table.len(), table.width());
        Ok(table)
    }

    fn write_table(&self, key: &str, table: &Table) -> Result<(), TableError> {
        self.put_bytes(key, write_csv(table)?)?;
        debug!("table:write key={key} rows={} cols={}", table.len(), table.width());
        Ok(())
    }
}

impl<T: ObjectStoreAccessor + ?Sized> TableStoreExt for T {}
