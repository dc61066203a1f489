// table.rs
use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

use crate::TableError;

/// Celda de una tabla. `None` representa un valor ausente (campo vacío en el
/// CSV).
pub type Cell = Option<String>;

/// Tabla en memoria: columnas con nombre y filas de celdas de texto.
///
/// Es deliberadamente simple: todas las operaciones devuelven una tabla nueva
/// y preservan el orden de aparición de las filas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Vista de una fila con acceso por nombre de columna.
pub struct RowRef<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl<'a> RowRef<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.cells[i].as_deref())
    }

    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        Self { columns: columns.into_iter().map(Into::into).collect(),
               rows: Vec::new() }
    }

    /// Construye una tabla validando que cada fila tenga tantas celdas como
    /// columnas.
    ///
    /// # Errores
    /// `TableError::Shape` con el índice de la primera fila inválida.
    pub fn from_rows<I>(columns: Vec<String>, rows: I) -> Result<Self, TableError>
        where I: IntoIterator<Item = Vec<Cell>>
    {
        let mut table = Self { columns,
                               rows: Vec::new() };
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::Shape { row: self.rows.len(),
                                           expected: self.columns.len(),
                                           found: row.len() });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Valores de una columna, en orden de filas.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = Option<&str>> + '_, TableError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |r| r[idx].as_deref()))
    }

    pub fn iter(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |cells| RowRef { columns: &self.columns,
                                                   cells })
    }

    /// Quita filas completamente duplicadas, conservando la primera aparición.
    pub fn drop_duplicates(&self) -> Table {
        let unique: IndexSet<&Vec<Cell>> = self.rows.iter().collect();
        Table { columns: self.columns.clone(),
                rows: unique.into_iter().cloned().collect() }
    }

    /// Cantidad de filas que repiten una fila anterior.
    pub fn duplicate_count(&self) -> usize {
        let unique: IndexSet<&Vec<Cell>> = self.rows.iter().collect();
        self.rows.len() - unique.len()
    }

    /// Quita las filas con algún valor ausente en `subset`.
    pub fn drop_nulls(&self, subset: &[&str]) -> Result<Table, TableError> {
        let idx = self.indices(subset)?;
        Ok(self.retain(|row| idx.iter().all(|&i| row[i].is_some())))
    }

    pub fn filter<F>(&self, mut keep: F) -> Table
        where F: FnMut(&RowRef<'_>) -> bool
    {
        let rows = self.iter()
                       .filter(|r| keep(r))
                       .map(|r| r.cells.to_vec())
                       .collect();
        Table { columns: self.columns.clone(),
                rows }
    }

    /// Agrega (o reemplaza) una columna derivada fila a fila.
    pub fn with_column<F>(&self, name: &str, mut derive: F) -> Table
        where F: FnMut(&RowRef<'_>) -> Cell
    {
        let values: Vec<Cell> = self.iter().map(|r| derive(&r)).collect();
        let mut out = self.clone();
        match out.columns.iter().position(|c| c == name) {
            Some(i) => {
                for (row, v) in out.rows.iter_mut().zip(values) {
                    row[i] = v;
                }
            }
            None => {
                out.columns.push(name.to_string());
                for (row, v) in out.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
        out
    }

    /// Proyección en el orden pedido.
    pub fn select(&self, columns: &[&str]) -> Result<Table, TableError> {
        let idx = self.indices(columns)?;
        let rows = self.rows
                       .iter()
                       .map(|r| idx.iter().map(|&i| r[i].clone()).collect())
                       .collect();
        Ok(Table { columns: columns.iter().map(|c| c.to_string()).collect(),
                   rows })
    }

    /// `select` + `drop_duplicates`.
    pub fn distinct(&self, columns: &[&str]) -> Result<Table, TableError> {
        Ok(self.select(columns)?.drop_duplicates())
    }

    /// Left join por igualdad de `on`. Las columnas de `right` que no son
    /// clave se agregan al final; una fila sin match recibe celdas vacías y
    /// una fila con varios matches se repite por cada uno.
    pub fn left_join(&self, right: &Table, on: &[&str]) -> Result<Table, TableError> {
        let left_keys = self.indices(on)?;
        let right_keys = right.indices(on)?;
        let right_rest: Vec<usize> = (0..right.width()).filter(|i| !right_keys.contains(i)).collect();

        let mut index: HashMap<Vec<&Cell>, Vec<usize>> = HashMap::new();
        for (i, row) in right.rows.iter().enumerate() {
            index.entry(right_keys.iter().map(|&k| &row[k]).collect())
                 .or_default()
                 .push(i);
        }

        let mut columns = self.columns.clone();
        columns.extend(right_rest.iter().map(|&i| right.columns[i].clone()));
        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let key: Vec<&Cell> = left_keys.iter().map(|&k| &row[k]).collect();
            match index.get(&key) {
                Some(matches) => {
                    for &m in matches {
                        let mut joined = row.clone();
                        joined.extend(right_rest.iter().map(|&i| right.rows[m][i].clone()));
                        rows.push(joined);
                    }
                }
                None => {
                    let mut joined = row.clone();
                    joined.extend(std::iter::repeat(None).take(right_rest.len()));
                    rows.push(joined);
                }
            }
        }
        Ok(Table { columns, rows })
    }

    /// Agrega una columna con un entero secuencial empezando en 1.
    pub fn with_sequence(&self, name: &str) -> Table {
        let mut n = 0u64;
        self.with_column(name, |_| {
                n += 1;
                Some(n.to_string())
            })
    }

    /// Cantidad de valores ausentes por columna, en orden de columnas.
    pub fn null_counts(&self) -> IndexMap<String, usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), self.rows.iter().filter(|r| r[i].is_none()).count()))
            .collect()
    }

    fn indices(&self, names: &[&str]) -> Result<Vec<usize>, TableError> {
        names.iter().map(|n| self.column_index(n)).collect()
    }

    fn retain<F>(&self, keep: F) -> Table
        where F: Fn(&[Cell]) -> bool
    {
        Table { columns: self.columns.clone(),
                rows: self.rows.iter().filter(|r| keep(r)).cloned().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(v: &str) -> Cell {
        if v.is_empty() {
            None
        } else {
            Some(v.to_string())
        }
    }

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::from_rows(columns.iter().map(|c| c.to_string()).collect(),
                         rows.iter().map(|r| r.iter().map(|v| cell(v)).collect())).unwrap()
    }

    #[test]
    fn shape_is_validated() {
        let err = Table::from_rows(vec!["a".into(), "b".into()], vec![vec![None]]).unwrap_err();
        assert_eq!(err, TableError::Shape { row: 0, expected: 2, found: 1 });
    }

    #[test]
    fn drop_duplicates_keeps_first_occurrence_order() {
        let t = table(&["a", "b"], &[&["1", "x"], &["2", "y"], &["1", "x"], &["3", ""]]);
        let d = t.drop_duplicates();
        assert_eq!(d.len(), 3);
        assert_eq!(d.column("a").unwrap().collect::<Vec<_>>(), [Some("1"), Some("2"), Some("3")]);
        assert_eq!(t.duplicate_count(), 1);
    }

    #[test]
    fn drop_nulls_only_looks_at_subset() {
        let t = table(&["a", "b", "c"], &[&["1", "", "z"], &["", "y", "z"], &["3", "y", ""]]);
        let d = t.drop_nulls(&["a"]).unwrap();
        assert_eq!(d.len(), 2);
        assert_eq!(t.drop_nulls(&["missing"]), Err(TableError::MissingColumn("missing".into())));
    }

    #[test]
    fn with_column_appends_or_replaces() {
        let t = table(&["a"], &[&["1"], &["2"]]);
        let t = t.with_column("b", |r| r.get("a").map(|v| format!("{v}{v}")));
        assert_eq!(t.columns(), ["a", "b"]);
        assert_eq!(t.column("b").unwrap().collect::<Vec<_>>(), [Some("11"), Some("22")]);
        let t = t.with_column("a", |_| None);
        assert_eq!(t.width(), 2);
        assert_eq!(t.null_counts()["a"], 2);
    }

    #[test]
    fn left_join_fills_missing_and_repeats_multiple_matches() {
        let left = table(&["k", "v"], &[&["a", "1"], &["b", "2"], &["c", "3"]]);
        let right = table(&["k", "w"], &[&["a", "x"], &["b", "y"], &["b", "z"]]);
        let j = left.left_join(&right, &["k"]).unwrap();
        assert_eq!(j.columns(), ["k", "v", "w"]);
        assert_eq!(j.column("w").unwrap().collect::<Vec<_>>(), [Some("x"), Some("y"), Some("z"), None]);
    }

    #[test]
    fn sequence_starts_at_one() {
        let t = table(&["brand"], &[&["Apple"], &["Samsung"]]).with_sequence("brand_id");
        assert_eq!(t.column("brand_id").unwrap().collect::<Vec<_>>(), [Some("1"), Some("2")]);
    }

    #[test]
    fn distinct_projects_then_dedupes() {
        let t = table(&["a", "b"], &[&["1", "x"], &["1", "y"], &["2", "x"]]);
        let d = t.distinct(&["a"]).unwrap();
        assert_eq!(d.len(), 2);
        let f = t.filter(|r| r.get("b") == Some("x"));
        assert_eq!(f.len(), 2);
    }
}
