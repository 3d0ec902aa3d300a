//! IndexLens CLI — constituent listing, CSV export and moving-average analysis.
//!
//! Commands:
//! - `sectors` — list GICS sectors with their constituent counts
//! - `companies` — list companies in the selected sectors
//! - `export` — write the selected sectors' constituents to `SP500.csv`
//! - `analyze` — fetch one year of prices for selected companies and add moving averages
//! - `ytd` — year-to-date prices for the leading symbols of the selected sectors

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use indexlens_core::data::{DataError, FetchProgress};
use indexlens_core::{
    series_to_csv, to_portable_text, Config, ConstituentCatalog, FetchBatch, PriceSeries, Session,
    EXPORT_FILENAME,
};

#[derive(Parser)]
#[command(
    name = "indexlens",
    about = "IndexLens CLI — S&P 500 constituents, prices and moving averages"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./indexlens.toml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Load constituents from a previously exported CSV instead of the web.
    #[arg(long, global = true)]
    catalog_file: Option<PathBuf>,

    /// Fetch symbols in parallel (overrides the config file).
    #[arg(long, global = true, default_value_t = false)]
    parallel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List GICS sectors and how many constituents each has.
    Sectors,
    /// List companies in the selected sectors.
    Companies {
        /// GICS sector (repeatable).
        #[arg(long = "sector", required = true)]
        sectors: Vec<String>,
    },
    /// Export the selected sectors' constituents as CSV.
    Export {
        /// GICS sector (repeatable). Omit to export every sector.
        #[arg(long = "sector")]
        sectors: Vec<String>,

        /// Output file.
        #[arg(long, default_value = EXPORT_FILENAME)]
        out: PathBuf,
    },
    /// Fetch one year of daily prices for selected companies and add moving averages.
    Analyze {
        /// GICS sector (repeatable).
        #[arg(long = "sector", required = true)]
        sectors: Vec<String>,

        /// Company name as listed by `companies` (repeatable).
        #[arg(long = "company", required = true)]
        companies: Vec<String>,

        /// Write one `{SYMBOL}.csv` per ticker into this directory.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Year-to-date prices for the leading symbols of the selected sectors.
    Ytd {
        /// GICS sector (repeatable).
        #[arg(long = "sector", required = true)]
        sectors: Vec<String>,

        /// Write one `{SYMBOL}.csv` per ticker into this directory.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("failed to load config")?;
    if cli.parallel {
        config.prices.parallel = true;
    }
    tracing::debug!(?config, "config loaded");
    let session = Session::online(config, cli.catalog_file.as_deref())?;

    match cli.command {
        Commands::Sectors => run_sectors(&session),
        Commands::Companies { sectors } => run_companies(&session, &sectors),
        Commands::Export { sectors, out } => run_export(&session, &sectors, &out),
        Commands::Analyze {
            sectors,
            companies,
            out_dir,
        } => run_analyze(&session, &sectors, &companies, out_dir.as_deref()),
        Commands::Ytd { sectors, out_dir } => run_ytd(&session, &sectors, out_dir.as_deref()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

/// Load the catalog; failures here end the session.
fn load_catalog(session: &Session) -> Result<&ConstituentCatalog> {
    session
        .catalog()
        .context("constituent table unavailable, nothing else can run")
}

fn print_dimension(label: &str, catalog: &ConstituentCatalog) {
    let (rows, cols) = catalog.dimensions();
    println!("{label}");
    println!("Data Dimension: {rows} rows and {cols} columns");
}

/// Reject sector names that are not in the catalog so typos do not look like empty sectors.
fn select_sectors(catalog: &ConstituentCatalog, sectors: &[String]) -> Result<ConstituentCatalog> {
    let known = catalog.list_sectors();
    let unknown: Vec<&str> = sectors
        .iter()
        .filter(|s| !known.contains(*s))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        bail!(
            "unknown sector(s): {}. Run `indexlens sectors` to list valid names",
            unknown.join(", ")
        );
    }
    Ok(catalog.filter_by_sector(sectors))
}

fn run_sectors(session: &Session) -> Result<()> {
    let catalog = load_catalog(session)?;
    print_dimension("S&P500 Companies", catalog);
    println!();
    println!("{:<28} {:>6}", "Sector", "Count");
    println!("{}", "-".repeat(35));
    for sector in catalog.list_sectors() {
        let count = catalog.filter_by_sector([&sector]).len();
        println!("{sector:<28} {count:>6}");
    }
    Ok(())
}

fn run_companies(session: &Session, sectors: &[String]) -> Result<()> {
    let catalog = load_catalog(session)?;
    let selected = select_sectors(catalog, sectors)?;
    print_dimension("Companies in Selected Sector", &selected);
    println!();
    for name in selected.list_companies() {
        println!("{name}");
    }
    Ok(())
}

fn run_export(session: &Session, sectors: &[String], out: &Path) -> Result<()> {
    let catalog = load_catalog(session)?;
    let selected = if sectors.is_empty() {
        catalog.clone()
    } else {
        select_sectors(catalog, sectors)?
    };

    let bytes = to_portable_text(&selected)?;
    std::fs::write(out, bytes).with_context(|| format!("failed to write {}", out.display()))?;
    println!("Wrote {} rows to {}", selected.len(), out.display());
    Ok(())
}

fn run_analyze(
    session: &Session,
    sectors: &[String],
    companies: &[String],
    out_dir: Option<&Path>,
) -> Result<()> {
    let catalog = load_catalog(session)?;
    let selected = select_sectors(catalog, sectors)?.filter_by_company(companies);
    if selected.is_empty() {
        bail!("none of the given companies are in the selected sectors");
    }

    let batch = session.analyze(&selected.symbols(), &StdoutProgress)?;
    report_batch(&batch, &selected, out_dir)
}

fn run_ytd(session: &Session, sectors: &[String], out_dir: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(session)?;
    let selected = select_sectors(catalog, sectors)?;
    let batch = session.year_to_date(sectors, &StdoutProgress)?;
    report_batch(&batch, &selected, out_dir)
}

fn report_batch(batch: &FetchBatch, names: &ConstituentCatalog, out_dir: Option<&Path>) -> Result<()> {
    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    println!();
    println!("Window: {}", batch.window);
    for series in batch.succeeded() {
        let company = names.security_for(series.symbol()).unwrap_or("?");
        print_series_summary(company, series);

        if let Some(dir) = out_dir {
            let path = dir.join(format!("{}.csv", series.symbol()));
            std::fs::write(&path, series_to_csv(series)?)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("  Saved: {}", path.display());
        }
    }

    for (symbol, err) in batch.failed() {
        let company = names.security_for(symbol).unwrap_or("?");
        eprintln!("Skipped {symbol} ({company}): {err}");
    }

    if batch.all_failed() {
        bail!("no price data for any selected ticker");
    }
    Ok(())
}

fn print_series_summary(company: &str, series: &PriceSeries) {
    println!();
    println!("=== {} ({}) ===", company, series.symbol());
    let (Some(first), Some(last)) = (series.bars().first(), series.bars().last()) else {
        println!("No bars");
        return;
    };
    println!("Bars:           {} ({} to {})", series.len(), first.date, last.date);
    println!("Close:          {:.2}", last.close);
    println!("Volume:         {}", last.volume);
    println!("Adj Close:      {}", fmt_value(last.adj_close));
    for (name, values) in series.columns() {
        println!("{:<16}{}", format!("{name}:"), fmt_value(values.last().copied().flatten()));
    }
}

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

/// Progress reporter that prints to stdout.
struct StdoutProgress;

impl FetchProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_complete(&self, symbol: &str, _index: usize, _total: usize, result: Result<usize, &DataError>) {
        match result {
            Ok(bars) => println!("  OK: {symbol} ({bars} bars)"),
            Err(e) => println!("  FAIL: {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nFetch complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use indexlens_core::catalog::StaticSource;

    fn catalog() -> ConstituentCatalog {
        let source = StaticSource::new(
            &["Symbol", "Security", "GICS Sector"],
            &[&["AAPL", "Apple Inc.", "Tech"], &["XOM", "ExxonMobil", "Energy"]],
        );
        ConstituentCatalog::load(&source).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_requires_sector_and_company() {
        assert!(Cli::try_parse_from(["indexlens", "analyze", "--sector", "Tech"]).is_err());
        let cli = Cli::try_parse_from([
            "indexlens", "analyze", "--sector", "Tech", "--company", "Apple Inc.", "--parallel",
        ])
        .unwrap();
        assert!(cli.parallel);
        assert!(matches!(cli.command, Commands::Analyze { ref companies, .. } if companies == &["Apple Inc."]));
    }

    #[test]
    fn export_defaults_to_sp500_csv() {
        let cli = Cli::try_parse_from(["indexlens", "export"]).unwrap();
        match cli.command {
            Commands::Export { sectors, out } => {
                assert!(sectors.is_empty());
                assert_eq!(out, PathBuf::from("SP500.csv"));
            }
            _ => panic!("expected export command"),
        }
    }

    #[test]
    fn unknown_sector_is_an_error() {
        let err = select_sectors(&catalog(), &["Tech".into(), "Crypto".into()]).unwrap_err();
        assert!(err.to_string().contains("Crypto"));
    }

    #[test]
    fn known_sectors_filter() {
        let selected = select_sectors(&catalog(), &["Energy".into()]).unwrap();
        assert_eq!(selected.symbols(), vec!["XOM"]);
    }

    #[test]
    fn missing_values_render_as_na() {
        assert_eq!(fmt_value(None), "n/a");
        assert_eq!(fmt_value(Some(1.234)), "1.23");
    }
}
