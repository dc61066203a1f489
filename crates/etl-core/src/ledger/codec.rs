//! Codec CSV del ledger persistido.
//!
//! Formato: cabecera `artifact_id,status,last_update`, una fila por artifact,
//! `last_update` en RFC 3339 UTC. En lectura se toleran los ledgers del
//! sistema anterior: BOM UTF-8, columna `file_name` y timestamps ISO-8601 sin
//! zona (se interpretan como UTC).

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use super::{LifecycleState, StatusLedger, StatusRecord};
use crate::constants::{LEDGER_COLUMNS, LEGACY_ID_COLUMN};
use crate::errors::LedgerError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn encode(ledger: &StatusLedger) -> Result<Vec<u8>, LedgerError> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(LEDGER_COLUMNS)
     .map_err(|e| LedgerError::Encode(e.to_string()))?;
    for r in ledger.iter() {
        let ts = r.last_update.to_rfc3339_opts(SecondsFormat::Micros, true);
        w.write_record([r.artifact_id.as_str(), r.state.as_str(), ts.as_str()])
         .map_err(|e| LedgerError::Encode(e.to_string()))?;
    }
    w.into_inner().map_err(|e| LedgerError::Encode(e.to_string()))
}

pub fn decode(bytes: &[u8]) -> Result<StatusLedger, LedgerError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(StatusLedger::new());
    }

    let mut rdr = csv::ReaderBuilder::new().has_headers(true)
                                           .trim(csv::Trim::All)
                                           .from_reader(bytes);
    let headers = rdr.headers().map_err(|e| LedgerError::Decode(e.to_string()))?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let id_idx = column(LEDGER_COLUMNS[0]).or_else(|| column(LEGACY_ID_COLUMN))
                                          .ok_or_else(|| LedgerError::Decode("missing artifact_id column".into()))?;
    let status_idx = column(LEDGER_COLUMNS[1]).ok_or_else(|| LedgerError::Decode("missing status column".into()))?;
    let ts_idx = column(LEDGER_COLUMNS[2]).ok_or_else(|| LedgerError::Decode("missing last_update column".into()))?;

    let mut rows = Vec::new();
    for (line, row) in rdr.records().enumerate() {
        let row = row.map_err(|e| LedgerError::Decode(e.to_string()))?;
        let field = |idx: usize| row.get(idx).unwrap_or("");
        let artifact_id = field(id_idx);
        if artifact_id.is_empty() {
            return Err(LedgerError::Decode(format!("row {}: empty artifact_id", line + 1)));
        }
        let state: LifecycleState = field(status_idx).parse()?;
        let last_update = parse_timestamp(field(ts_idx))
            .ok_or_else(|| LedgerError::Decode(format!("row {}: bad last_update {:?}", line + 1, field(ts_idx))))?;
        rows.push(StatusRecord { artifact_id: artifact_id.to_string(),
                                 state,
                                 last_update });
    }
    Ok(StatusLedger::from_records(rows))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"].iter()
                                                   .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                                                   .map(|naive| naive.and_utc())
}
