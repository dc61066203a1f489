//! CSV <-> `Table`.
//!
//! Lectura tolerante: BOM UTF-8 opcional, campos con espacios alrededor, celda
//! vacía = valor ausente. La escritura antepone BOM (`utf-8-sig`) para que las
//! planillas abiertas a mano reconozcan la codificación.

use crate::table::{Cell, Table};
use crate::TableError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn read_csv(bytes: &[u8]) -> Result<Table, TableError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Table::default());
    }
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All)
                                              .flexible(true)
                                              .from_reader(bytes);
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let width = columns.len();
    let mut table = Table::new(columns);
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != width {
            return Err(TableError::Shape { row: i,
                                           expected: width,
                                           found: record.len() });
        }
        let row: Vec<Cell> = record.iter()
                                   .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
                                   .collect();
        table.push_row(row)?;
    }
    Ok(table)
}

pub fn write_csv(table: &Table) -> Result<Vec<u8>, TableError> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
    }
    writer.into_inner().map_err(|e| TableError::Csv(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_and_empty_cells() {
        let raw = "\u{feff}product_name,price_raw\n iPhone 15 , 20.990.000₫\nGalaxy S24,\n";
        let t = read_csv(raw.as_bytes()).unwrap();
        assert_eq!(t.columns(), ["product_name", "price_raw"]);
        assert_eq!(t.rows()[0], [Some("iPhone 15".to_string()), Some("20.990.000₫".to_string())]);
        assert_eq!(t.rows()[1][1], None);
    }

    #[test]
    fn written_csv_starts_with_bom_and_reads_back() {
        let mut t = Table::new(["name", "note"]);
        t.push_row(vec![Some("a, b".into()), None]).unwrap();
        let bytes = write_csv(&t).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        assert_eq!(read_csv(&bytes).unwrap(), t);
    }

    #[test]
    fn ragged_row_is_rejected() {
        let err = read_csv(b"a,b\n1,2,3\n").unwrap_err();
        assert_eq!(err, TableError::Shape { row: 0, expected: 2, found: 3 });
    }

    #[test]
    fn blank_input_is_empty_table() {
        assert!(read_csv(b"  \n").unwrap().is_empty());
    }
}
