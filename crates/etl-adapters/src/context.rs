use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use etl_core::{object_key, Clock, ObjectStoreAccessor, StageError, SystemClock};
use etl_domain::{RelationalSink, Table, TableStoreExt};

/// Colaboradores y ubicaciones que comparten las funciones de trabajo.
#[derive(Clone)]
pub struct PipelineContext {
    pub store: Arc<dyn ObjectStoreAccessor>,
    pub sink: Arc<dyn RelationalSink>,
    pub bucket: String,
    pub staging_folder: String,
    /// CSV de origen para `extract`.
    pub source_path: Option<PathBuf>,
    pub clock: Arc<dyn Clock>,
}

impl PipelineContext {
    pub fn new(store: Arc<dyn ObjectStoreAccessor>, sink: Arc<dyn RelationalSink>, bucket: impl Into<String>) -> Self {
        Self { store,
               sink,
               bucket: bucket.into(),
               staging_folder: "staging".to_string(),
               source_path: None,
               clock: Arc::new(SystemClock) }
    }

    pub fn with_staging_folder(mut self, folder: impl Into<String>) -> Self {
        self.staging_folder = folder.into();
        self
    }

    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// `{bucket}/{name}`
    pub fn key(&self, name: &str) -> String {
        object_key(&self.bucket, name)
    }

    /// `{bucket}/{staging_folder}/{YYYY-MM-DD}/{name}`
    pub fn staging_key(&self, day: NaiveDate, name: &str) -> String {
        let folder = self.staging_folder.trim_matches('/');
        object_key(&self.bucket, &format!("{folder}/{}/{name}", day.format("%Y-%m-%d")))
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    pub fn read(&self, name: &str) -> Result<Table, StageError> {
        Ok(self.store.read_table(&self.key(name))?)
    }

    pub fn write(&self, name: &str, table: &Table) -> Result<String, StageError> {
        let key = self.key(name);
        self.store.write_table(&key, table)?;
        Ok(key)
    }
}
