//! etl-persistence
//!
//! Implementaciones durables de los colaboradores externos del pipeline:
//!
//! - `store`: object stores local (directorio) y S3 / MinIO (`object_store`).
//! - `pg`: `RelationalSink` sobre Postgres con Diesel + r2d2.
//! - `config`: configuración tipada desde variables de entorno / `.env`.

pub mod config;
pub mod error;
pub mod pg;
pub mod store;

pub use config::{init_dotenv, DbConfig, EtlConfig, S3Settings, StoreBackend};
pub use error::{ConfigError, PersistenceError};
pub use pg::{build_pool, build_pool_from_config, ConnectionProvider, PgPool, PgRelationalSink, PoolProvider};
pub use store::{open_store, LocalObjectStore, S3ObjectStore};
