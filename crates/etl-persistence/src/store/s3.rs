//! Object store S3 / MinIO.
//!
//! Usa `object_store` (async) detrás de una fachada bloqueante con runtime
//! tokio propio, porque los stages son síncronos. No debe llamarse desde
//! dentro de otro runtime tokio.

use std::sync::Arc;

use etl_core::{ObjectStoreAccessor, StoreError};
use log::debug;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use tokio::runtime::Runtime;

use crate::config::S3Settings;

pub struct S3ObjectStore {
    bucket: String,
    store: Arc<dyn ObjectStore>,
    runtime: Runtime,
}

fn backend(e: object_store::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl S3ObjectStore {
    /// Conecta contra un bucket. Con endpoint propio se usan requests
    /// path-style y se permite HTTP (MinIO local).
    pub fn connect(bucket: &str, settings: &S3Settings) -> Result<Self, StoreError> {
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket)
                                                     .with_region(&settings.region);
        if let Some(key) = &settings.access_key {
            builder = builder.with_access_key_id(key);
        }
        if let Some(secret) = &settings.secret_key {
            builder = builder.with_secret_access_key(secret);
        }
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.with_endpoint(endpoint)
                             .with_virtual_hosted_style_request(false)
                             .with_allow_http(true);
        }
        let store = builder.build().map_err(backend)?;
        Self::with_store(bucket, Arc::new(store))
    }

    /// Envuelve un `ObjectStore` ya construido (p.ej. `object_store::memory::InMemory`).
    pub fn with_store(bucket: &str, store: Arc<dyn ObjectStore>) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all()
                                                                   .build()
                                                                   .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(Self { bucket: bucket.trim_matches('/').to_string(),
                  store,
                  runtime })
    }

    /// `{bucket}/{resto}` -> ruta dentro del bucket. El primer segmento debe
    /// ser el bucket configurado.
    fn path(&self, key: &str) -> Result<Path, StoreError> {
        let invalid = || StoreError::InvalidKey(key.to_string());
        let (bucket, rest) = key.trim_start_matches('/').split_once('/').ok_or_else(invalid)?;
        if bucket != self.bucket || rest.is_empty() {
            return Err(invalid());
        }
        Path::parse(rest).map_err(|_| invalid())
    }
}

impl ObjectStoreAccessor for S3ObjectStore {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.path(key)?;
        match self.runtime.block_on(self.store.head(&path)) {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(backend(e)),
        }
    }

    fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path(key)?;
        let bytes = self.runtime.block_on(async {
                                    let result = self.store.get(&path).await?;
                                    result.bytes().await
                                })
                                .map_err(|e| match e {
                                    object_store::Error::NotFound { .. } => StoreError::NotFound(key.to_string()),
                                    other => backend(other),
                                })?;
        Ok(bytes.to_vec())
    }

    fn put_bytes(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let path = self.path(key)?;
        let len = bytes.len();
        self.runtime
            .block_on(self.store.put(&path, PutPayload::from(bytes)))
            .map_err(backend)?;
        debug!("s3:put bucket={} path={path} bytes={len}", self.bucket);
        Ok(())
    }
}
