use etl_core::{StageError, StoreError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("missing column: {0}")]
    MissingColumn(String),
    #[error("row {row} has {found} fields, expected {expected}")]
    Shape { row: usize, expected: usize, found: usize },
    #[error("csv: {0}")]
    Csv(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<csv::Error> for TableError {
    fn from(e: csv::Error) -> Self {
        TableError::Csv(e.to_string())
    }
}

impl From<TableError> for StageError {
    fn from(e: TableError) -> Self {
        match e {
            TableError::Store(inner) => StageError::from(inner),
            other => StageError::Data(other.to_string()),
        }
    }
}
