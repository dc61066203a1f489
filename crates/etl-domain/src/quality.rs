use indexmap::IndexMap;
use log::{info, warn};
use serde::Serialize;

use crate::dimensional::PRICE;
use crate::table::Table;
use crate::TableError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceStats {
    pub min: Option<i64>,
    pub max: Option<i64>,
    /// Precios `<= 0` o no numéricos.
    pub invalid: usize,
}

/// Reporte de calidad de una tabla ya en staging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    pub num_rows: usize,
    pub num_cols: usize,
    pub null_counts: IndexMap<String, usize>,
    pub duplicate_rows: usize,
    /// Sólo si la tabla tiene columna `price`.
    pub price: Option<PriceStats>,
}

impl QualityReport {
    pub fn inspect(table: &Table) -> Self {
        let price = table.column(PRICE).ok().map(|values| {
                                                 let mut stats = PriceStats { min: None,
                                                                              max: None,
                                                                              invalid: 0 };
                                                 for v in values.flatten() {
                                                     match v.parse::<i64>() {
                                                         Ok(p) => {
                                                             stats.min = Some(stats.min.map_or(p, |m| m.min(p)));
                                                             stats.max = Some(stats.max.map_or(p, |m| m.max(p)));
                                                             if p <= 0 {
                                                                 stats.invalid += 1;
                                                             }
                                                         }
                                                         Err(_) => stats.invalid += 1,
                                                     }
                                                 }
                                                 stats
                                             });
        Self { num_rows: table.len(),
               num_cols: table.width(),
               null_counts: table.null_counts(),
               duplicate_rows: table.duplicate_count(),
               price }
    }

    /// Deja en el log los hallazgos (warn si hay nulos, duplicados o precios
    /// inválidos).
    pub fn log_findings(&self) {
        info!("quality: rows={} cols={}", self.num_rows, self.num_cols);
        let with_nulls: IndexMap<&str, usize> = self.null_counts
                                                    .iter()
                                                    .filter(|(_, n)| **n > 0)
                                                    .map(|(c, n)| (c.as_str(), *n))
                                                    .collect();
        if with_nulls.is_empty() {
            info!("quality: no null values");
        } else {
            warn!("quality: null values per column {with_nulls:?}");
        }
        if self.duplicate_rows > 0 {
            warn!("quality: {} duplicated rows", self.duplicate_rows);
        }
        if let Some(p) = &self.price {
            info!("quality: price min={:?} max={:?}", p.min, p.max);
            if p.invalid > 0 {
                warn!("quality: {} rows with invalid price", p.invalid);
            }
        }
    }

    /// Reporte como tabla de una fila. `null_counts` se serializa como JSON.
    pub fn to_table(&self) -> Result<Table, TableError> {
        let null_counts = serde_json::to_string(&self.null_counts).map_err(|e| TableError::Csv(e.to_string()))?;
        let mut columns = vec!["num_rows", "num_cols", "null_counts", "duplicate_rows"];
        let mut row = vec![Some(self.num_rows.to_string()),
                           Some(self.num_cols.to_string()),
                           Some(null_counts),
                           Some(self.duplicate_rows.to_string())];
        if let Some(p) = &self.price {
            columns.extend(["price_min", "price_max", "price_invalid"]);
            row.extend([p.min.map(|v| v.to_string()), p.max.map(|v| v.to_string()), Some(p.invalid.to_string())]);
        }
        Table::from_rows(columns.into_iter().map(str::to_string).collect(), [row])
    }
}
