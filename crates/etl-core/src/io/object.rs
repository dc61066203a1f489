use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::errors::StoreError;

/// Acceso a blobs por clave `{bucket}/{nombre-lógico}`.
///
/// El contenido es opaco para el core; las tablas se codifican arriba
/// (`etl-domain`). Las implementaciones deben ser `Send + Sync` porque varios
/// runners pueden compartir el mismo store.
pub trait ObjectStoreAccessor: Send + Sync {
    fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Lee el objeto completo. `StoreError::NotFound` si no existe.
    fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Escribe (o reemplaza) el objeto completo.
    fn put_bytes(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;
}

impl<T: ObjectStoreAccessor + ?Sized> ObjectStoreAccessor for Arc<T> {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        (**self).exists(key)
    }
    fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        (**self).get_bytes(key)
    }
    fn put_bytes(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        (**self).put_bytes(key, bytes)
    }
}

/// Une bucket y nombre lógico en una clave, sin barras duplicadas.
pub fn object_key(bucket: &str, name: &str) -> String {
    let bucket = bucket.trim_matches('/');
    let name = name.trim_start_matches('/');
    if bucket.is_empty() {
        name.to_string()
    } else {
        format!("{bucket}/{name}")
    }
}

/// Object store en memoria. Los clones comparten el mismo contenido.
#[derive(Debug, Clone, Default)]
pub struct InMemoryObjectStore {
    inner: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).keys().cloned().collect()
    }

    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).remove(key)
    }
}

impl ObjectStoreAccessor for InMemoryObjectStore {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.inner.lock().unwrap_or_else(|p| p.into_inner()).contains_key(key))
    }

    fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.inner
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn put_bytes(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).insert(key.to_string(), bytes);
        Ok(())
    }
}
