//! CSV export for constituent tables and augmented price series.
//!
//! Constituent exports carry the catalog's header row verbatim and one record
//! per row in catalog order, so a standard CSV reader gets the same table back.
//! Fields containing the delimiter or quotes are quoted by the `csv` writer.

use thiserror::Error;

use crate::catalog::{CatalogError, ConstituentCatalog, RawTable};
use crate::domain::PriceSeries;

/// Download filename for a constituent export.
pub const EXPORT_FILENAME: &str = "SP500.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV writer: {0}")]
    Flush(String),

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Serialize a catalog as UTF-8 CSV bytes.
pub fn to_portable_text(catalog: &ConstituentCatalog) -> Result<Vec<u8>, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(catalog.headers())?;
    for row in catalog.rows() {
        wtr.write_record(row.values())?;
    }
    wtr.into_inner().map_err(|e| ExportError::Flush(e.to_string()))
}

/// Read a header row and records from CSV bytes.
pub fn read_table(bytes: &[u8]) -> Result<RawTable, ExportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = rdr.headers()?.iter().map(String::from).collect();
    let records = rdr
        .records()
        .map(|r| r.map(|rec| rec.iter().map(String::from).collect()))
        .collect::<Result<Vec<Vec<String>>, _>>()?;

    Ok(RawTable { headers, records })
}

/// Parse an export back into a catalog.
pub fn from_portable_text(bytes: &[u8]) -> Result<ConstituentCatalog, ExportError> {
    let table = read_table(bytes)?;
    Ok(ConstituentCatalog::from_table(table.headers, table.records)?)
}

/// Export an augmented price series as CSV.
///
/// Columns: Date, Open, High, Low, Close, Adj Close, Volume, then every derived
/// column in insertion order. Missing values are written as empty cells.
pub fn series_to_csv(series: &PriceSeries) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<&str> = vec!["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"];
    header.extend(series.column_names());
    wtr.write_record(&header)?;

    let derived: Vec<&[Option<f64>]> = series.columns().map(|(_, v)| v).collect();
    for (i, bar) in series.bars().iter().enumerate() {
        let mut record = vec![
            bar.date.to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            fmt_opt(bar.adj_close),
            bar.volume.to_string(),
        ];
        record.extend(derived.iter().map(|col| fmt_opt(col.get(i).copied().flatten())));
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().map_err(|e| ExportError::Flush(e.to_string()))?;
    Ok(String::from_utf8(data)?)
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_catalog;
    use crate::domain::bar::make_series;
    use crate::indicators::augment;

    #[test]
    fn header_matches_field_names() {
        let bytes = to_portable_text(&sample_catalog()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("Symbol,Security,GICS Sector,GICS Sub-Industry\n"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn embedded_comma_is_quoted_and_round_trips() {
        let catalog = ConstituentCatalog::from_table(
            vec!["Symbol".into(), "Security".into()],
            vec![vec!["BRK.B".into(), "Berkshire Hathaway, Inc.".into()]],
        )
        .unwrap();

        let bytes = to_portable_text(&catalog).unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("\"Berkshire Hathaway, Inc.\""));
        assert_eq!(from_portable_text(&bytes).unwrap(), catalog);
    }

    #[test]
    fn empty_catalog_exports_header_only() {
        let empty = sample_catalog().filter_by_sector(Vec::<String>::new());
        let bytes = to_portable_text(&empty).unwrap();
        assert_eq!(bytes, b"Symbol,Security,GICS Sector,GICS Sub-Industry\n");
    }

    #[test]
    fn series_csv_has_derived_columns() {
        let mut series = make_series(&[1.0, 2.0, 3.0]);
        augment(&mut series, &[2]).unwrap();

        let csv = series_to_csv(&series).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Date,Open,High,Low,Close,Adj Close,Volume,MA for 2 days");
        assert_eq!(lines[1], "2024-01-02,1,2,0,1,1,1000,");
        assert_eq!(lines[2], "2024-01-03,2,3,1,2,2,1000,1.5");
    }
}
