// etl-domain: tablas, reglas de limpieza y modelo dimensional
pub mod codec;
pub mod dimensional;
pub mod error;
pub mod quality;
pub mod sink;
pub mod store_ext;
pub mod table;

pub use codec::{read_csv, write_csv};
pub use error::TableError;
pub use quality::{PriceStats, QualityReport};
pub use sink::{validate_identifier, InMemoryRelationalSink, RelationalSink};
pub use store_ext::TableStoreExt;
pub use table::{Cell, RowRef, Table};
