//! CSV export of result tables
//!
//! The header row is the field names of the record type, in declaration
//! order. An empty table produces empty output.

use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, RiskError};

/// Write `rows` as CSV to any writer
pub fn write_csv<T: Serialize, W: Write>(writer: W, rows: &[T]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write `rows` as CSV to a file, replacing it
pub fn write_csv_path<T: Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    write_csv(file, rows)?;
    log::info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Render `rows` as a CSV string
pub fn to_csv_string<T: Serialize>(rows: &[T]) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, rows)?;
    String::from_utf8(buffer).map_err(|e| RiskError::invalid("csv", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rehi::RegionalRehiRow;
    use crate::risk::AggregateRow;

    #[test]
    fn test_aggregate_header_and_rows() {
        let rows = vec![
            AggregateRow {
                rate_shock: 0.0,
                no_tli_collapse_probability: 0.0,
                with_tli_collapse_probability: 0.0,
            },
            AggregateRow {
                rate_shock: 0.25,
                no_tli_collapse_probability: 0.5,
                with_tli_collapse_probability: 0.75,
            },
        ];
        let text = to_csv_string(&rows).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "rate_shock,no_tli_collapse_probability,with_tli_collapse_probability"
        );
        assert_eq!(lines[2], "0.25,0.5,0.75");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_regional_header_uses_renamed_field() {
        let rows = vec![RegionalRehiRow {
            region: "Tokyo".to_string(),
            rate_shock: 1.5,
            rehi_region: 72.5,
        }];
        let text = to_csv_string(&rows).unwrap();
        assert!(text.starts_with("region,rate_shock,REHI_region\n"));
        assert!(text.contains("Tokyo,1.5,72.5"));
    }

    #[test]
    fn test_empty_table() {
        let rows: Vec<AggregateRow> = Vec::new();
        assert_eq!(to_csv_string(&rows).unwrap(), "");
    }
}
