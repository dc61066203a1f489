use chrono::{DateTime, Utc};
use log::debug;

use super::{decode, encode, LifecycleState, StatusLedger};
use crate::constants::LEDGER_FILE_NAME;
use crate::errors::LedgerError;
use crate::io::{object_key, ObjectStoreAccessor};

/// Almacenamiento del ledger completo.
///
/// Nivel de consistencia: last-writer-wins, sin aislamiento ni token de
/// versión. Dos `update` concurrentes sobre artifacts distintos pueden perder
/// uno de los dos cambios; es una propiedad conocida del protocolo.
pub trait LedgerStore: Send + Sync {
    /// Lee el ledger completo. Si todavía no existe devuelve un ledger vacío.
    fn load(&self) -> Result<StatusLedger, LedgerError>;

    /// Reemplaza el ledger persistido por completo.
    fn save(&self, ledger: &StatusLedger) -> Result<(), LedgerError>;

    /// Ciclo load -> upsert -> save como una unidad. Es el único punto por el
    /// que el runner escribe, de modo que un backend con compare-and-swap puede
    /// sobreescribir este método sin tocar a los llamadores.
    fn update(&self, artifact_id: &str, state: LifecycleState, at: DateTime<Utc>) -> Result<StatusLedger, LedgerError> {
        let mut ledger = self.load()?;
        ledger.upsert(artifact_id, state, at);
        self.save(&ledger)?;
        Ok(ledger)
    }
}

impl<T: LedgerStore + ?Sized> LedgerStore for std::sync::Arc<T> {
    fn load(&self) -> Result<StatusLedger, LedgerError> {
        (**self).load()
    }
    fn save(&self, ledger: &StatusLedger) -> Result<(), LedgerError> {
        (**self).save(ledger)
    }
    fn update(&self, artifact_id: &str, state: LifecycleState, at: DateTime<Utc>) -> Result<StatusLedger, LedgerError> {
        (**self).update(artifact_id, state, at)
    }
}

/// Ledger persistido como un único objeto CSV en el object store
/// (`{bucket}/file_status.csv` por defecto).
#[derive(Debug, Clone)]
pub struct ObjectLedgerStore<O: ObjectStoreAccessor> {
    store: O,
    key: String,
}

impl<O: ObjectStoreAccessor> ObjectLedgerStore<O> {
    pub fn new(store: O, bucket: &str) -> Self {
        Self::with_file_name(store, bucket, LEDGER_FILE_NAME)
    }

    pub fn with_file_name(store: O, bucket: &str, file_name: &str) -> Self {
        Self { store,
               key: object_key(bucket, file_name) }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &O {
        &self.store
    }
}

impl<O: ObjectStoreAccessor> LedgerStore for ObjectLedgerStore<O> {
    fn load(&self) -> Result<StatusLedger, LedgerError> {
        if !self.store.exists(&self.key)? {
            debug!("ledger:load key={} absent -> empty ledger", self.key);
            return Ok(StatusLedger::new());
        }
        let bytes = self.store.get_bytes(&self.key)?;
        let ledger = decode(&bytes)?;
        debug!("ledger:load key={} records={}", self.key, ledger.len());
        Ok(ledger)
    }

    fn save(&self, ledger: &StatusLedger) -> Result<(), LedgerError> {
        let bytes = encode(ledger)?;
        self.store.put_bytes(&self.key, bytes)?;
        debug!("ledger:save key={} records={}", self.key, ledger.len());
        Ok(())
    }
}
