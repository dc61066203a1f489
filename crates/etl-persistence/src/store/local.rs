use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use etl_core::{ObjectStoreAccessor, StoreError};
use log::debug;

/// Object store sobre un directorio local: la clave `{bucket}/{nombre}` es
/// una ruta relativa a `root`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resuelve la clave rechazando rutas absolutas o que escapen de `root`.
    fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        let rel = Path::new(key);
        let valid = !key.is_empty() && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(rel))
    }
}

fn io_error(key: &str, e: std::io::Error) -> StoreError {
    match e.kind() {
        ErrorKind::NotFound => StoreError::NotFound(key.to_string()),
        _ => StoreError::Io(format!("{key}: {e}")),
    }
}

impl ObjectStoreAccessor for LocalObjectStore {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.resolve(key)?.is_file())
    }

    fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(key)?;
        fs::read(&path).map_err(|e| io_error(key, e))
    }

    fn put_bytes(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(key, e))?;
        }
        fs::write(&path, &bytes).map_err(|e| io_error(key, e))?;
        debug!("local:put path={} bytes={}", path.display(), bytes.len());
        Ok(())
    }
}
