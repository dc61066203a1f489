//! Implementaciones durables de `ObjectStoreAccessor`.
mod local;
mod s3;

use std::sync::Arc;

use etl_core::{ObjectStoreAccessor, StoreError};

pub use local::LocalObjectStore;
pub use s3::S3ObjectStore;

use crate::config::{EtlConfig, StoreBackend};

/// Abre el object store elegido por configuración.
pub fn open_store(cfg: &EtlConfig) -> Result<Arc<dyn ObjectStoreAccessor>, StoreError> {
    let store: Arc<dyn ObjectStoreAccessor> = match &cfg.store {
        StoreBackend::Local { root } => Arc::new(LocalObjectStore::new(root.clone())),
        StoreBackend::S3(settings) => Arc::new(S3ObjectStore::connect(&cfg.bucket, settings)?),
    };
    Ok(store)
}
