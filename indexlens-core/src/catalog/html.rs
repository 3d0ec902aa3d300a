//! First-table extraction from an HTML page.
//!
//! Consumes the first `<table>` in the document, uses its first row as the
//! header and every following row with at least one cell as a record. Cell
//! text is whitespace-collapsed and trimmed; no other schema checks happen here.

use scraper::{ElementRef, Html, Selector};

use super::source::RawTable;
use super::CatalogError;

fn selector(css: &str) -> Result<Selector, CatalogError> {
    Selector::parse(css).map_err(|e| CatalogError::SourceUnavailable {
        origin: "html".into(),
        reason: format!("invalid selector '{css}': {e:?}"),
    })
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse the first table of `html` into a header row and records.
pub fn parse_first_table(html: &str, origin: &str) -> Result<RawTable, CatalogError> {
    let unavailable = |reason: &str| CatalogError::SourceUnavailable {
        origin: origin.to_string(),
        reason: reason.to_string(),
    };

    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("th, td")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| unavailable("page contains no table"))?;

    let mut rows = table
        .select(&row_sel)
        .map(|tr| tr.select(&cell_sel).map(cell_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty());

    let headers = rows
        .next()
        .ok_or_else(|| unavailable("first table has no header row"))?;
    let records: Vec<Vec<String>> = rows.collect();

    if records.is_empty() {
        return Err(unavailable("first table has no data rows"));
    }

    tracing::debug!(origin, columns = headers.len(), rows = records.len(), "parsed first table");
    Ok(RawTable { headers, records })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <p>List of companies</p>
        <table id="constituents">
          <tr><th>Symbol</th><th>Security</th><th>GICS Sector</th></tr>
          <tr><td><a href="/a">AAPL</a></td><td>Apple
              Inc.</td><td>Information Technology</td></tr>
          <tr><td>MMM</td><td> 3M </td><td>Industrials</td></tr>
        </table>
        <table>
          <tr><th>Date</th><th>Added</th></tr>
          <tr><td>2024-01-01</td><td>XYZ</td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn picks_first_table() {
        let table = parse_first_table(PAGE, "fixture").unwrap();
        assert_eq!(table.headers, vec!["Symbol", "Security", "GICS Sector"]);
        assert_eq!(table.records.len(), 2);
    }

    #[test]
    fn collapses_cell_whitespace() {
        let table = parse_first_table(PAGE, "fixture").unwrap();
        assert_eq!(table.records[0], vec!["AAPL", "Apple Inc.", "Information Technology"]);
        assert_eq!(table.records[1][1], "3M");
    }

    #[test]
    fn page_without_table_is_unavailable() {
        let err = parse_first_table("<html><body><p>moved</p></body></html>", "fixture").unwrap_err();
        assert!(matches!(err, CatalogError::SourceUnavailable { .. }));
    }

    #[test]
    fn header_only_table_is_unavailable() {
        let html = "<table><tr><th>Symbol</th></tr></table>";
        assert!(parse_first_table(html, "fixture").is_err());
    }
}
