//! Load institution tables from CSV
//!
//! Accepts the canonical snake_case headers plus the looser spellings found in
//! hand-maintained spreadsheets (`Name`, `JGB_Holdings_JPY`, `equity`, ...).

use super::InstitutionRecord;
use crate::error::{Result, RiskError};
use csv::{ReaderBuilder, Trim};
use std::path::Path;

/// Default location of the bundled sample table
pub const DEFAULT_SAMPLE_PATH: &str = "data/sample_institutions.csv";

const SAMPLE_CSV: &str = include_str!("../../data/sample_institutions.csv");

/// Raw CSV row; empty cells deserialize to `None`
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(default, alias = "Name")]
    name: Option<String>,
    #[serde(default, alias = "Region")]
    region: Option<String>,
    #[serde(default, alias = "Total_Assets_JPY", alias = "totalAssets", alias = "Assets")]
    total_assets_jpy: Option<f64>,
    #[serde(default, alias = "Equity_Capital_JPY", alias = "equity")]
    equity_capital_jpy: Option<f64>,
    #[serde(default, alias = "JGB_Holdings_JPY", alias = "jgb")]
    jgb_holdings_jpy: Option<f64>,
    #[serde(default, alias = "Duration_Years", alias = "duration")]
    duration_years: Option<f64>,
    #[serde(default, alias = "NPL_Ratio", alias = "npl")]
    npl_ratio: Option<f64>,
    #[serde(default, alias = "TLI")]
    tli: Option<f64>,
    #[serde(default, alias = "Diversification_Index", alias = "diversification")]
    diversification_index: Option<f64>,
}

impl CsvRow {
    fn into_record(self, row_number: usize) -> Result<InstitutionRecord> {
        let name = self.name.filter(|n| !n.is_empty());
        if name.is_none() {
            return Err(RiskError::missing(format!("row {}", row_number), "name"));
        }

        Ok(InstitutionRecord {
            name,
            region: self.region.filter(|r| !r.is_empty()),
            duration_years: self.duration_years,
            jgb_holdings_jpy: self.jgb_holdings_jpy,
            equity_capital_jpy: self.equity_capital_jpy,
            npl_ratio: self.npl_ratio,
            tli: self.tli,
            diversification_index: self.diversification_index,
            total_assets_jpy: self.total_assets_jpy,
        })
    }
}

/// Load institution records from a CSV file
pub fn load_institutions<P: AsRef<Path>>(path: P) -> Result<Vec<InstitutionRecord>> {
    let path = path.as_ref();
    log::debug!("loading institutions from {}", path.display());
    let file = std::fs::File::open(path)?;
    load_institutions_from_reader(file)
}

/// Load institution records from any reader (e.g., string buffer, upload body)
pub fn load_institutions_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<InstitutionRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (idx, result) in csv_reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        // Row 1 is the header
        records.push(row.into_record(idx + 2)?);
    }

    log::debug!("loaded {} institution rows", records.len());
    Ok(records)
}

/// The bundled three-bank sample table
pub fn load_sample() -> Result<Vec<InstitutionRecord>> {
    load_institutions_from_reader(SAMPLE_CSV.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_sample() {
        let records = load_sample().expect("Failed to load sample");
        assert_eq!(records.len(), 3);

        let a = &records[0];
        assert_eq!(a.name.as_deref(), Some("Shinkin A"));
        assert_eq!(a.region.as_deref(), Some("Tokyo"));
        assert_eq!(a.duration_years, Some(6.0));
        assert_eq!(a.jgb_holdings_jpy, Some(350_000_000_000.0));
    }

    #[test]
    fn test_load_default_sample_file() {
        let from_file = load_institutions(DEFAULT_SAMPLE_PATH).expect("Failed to load sample file");
        assert_eq!(from_file, load_sample().unwrap());
    }

    #[test]
    fn test_loose_headers_and_empty_cells() {
        let csv = "Name,Region,Assets,equity,jgb,duration,NPL_Ratio,TLI,diversification\n\
                   Bank X, Kyushu ,,100, 1000 ,5,,0.2,\n";
        let records = load_institutions_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);

        let r = &records[0];
        assert_eq!(r.name.as_deref(), Some("Bank X"));
        assert_eq!(r.region.as_deref(), Some("Kyushu"));
        assert_eq!(r.total_assets_jpy, None);
        assert_eq!(r.equity_capital_jpy, Some(100.0));
        assert_eq!(r.jgb_holdings_jpy, Some(1000.0));
        assert_eq!(r.npl_ratio, None);
        assert_eq!(r.tli, Some(0.2));
        assert_eq!(r.diversification_index, None);
    }

    #[test]
    fn test_missing_columns_are_absent() {
        let csv = "name,equity_capital_jpy\nBank Y,10\n";
        let records = load_institutions_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(records[0].duration_years, None);
        assert_eq!(records[0].region, None);
    }

    #[test]
    fn test_blank_name_reports_row() {
        let csv = "name,region\nBank Z,Tokyo\n,Osaka\n";
        match load_institutions_from_reader(csv.as_bytes()) {
            Err(RiskError::MissingField { institution, field }) => {
                assert_eq!(institution, "row 3");
                assert_eq!(field, "name");
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_cell_is_csv_error() {
        let csv = "name,duration_years\nBank Q,long\n";
        assert!(matches!(
            load_institutions_from_reader(csv.as_bytes()),
            Err(RiskError::Csv(_))
        ));
    }
}
