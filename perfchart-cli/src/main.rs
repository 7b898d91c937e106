//! PerfChart CLI — fetch and print the normalized performance comparison.
//!
//! Commands:
//! - `compare` — refresh every configured ticker and render the aligned table
//! - `tickers` — list the configured tickers
//! - `default-config` — print the built-in configuration as TOML

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use perfchart_core::{
    AlignedRow, ChartConfig, ChartRange, ChartSnapshot, Dashboard, RefreshOutcome,
    SeriesVisibility, YahooProvider,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "perfchart",
    about = "PerfChart CLI — compare normalized (base 100) ticker performance"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all configured tickers and print the aligned comparison.
    Compare {
        /// Range to compare: 1y or 5y. Defaults to the configured range.
        #[arg(long, value_parser = parse_range)]
        range: Option<ChartRange>,

        /// Path to a TOML config file. Defaults to the built-in tickers.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Hide a series (repeatable).
        #[arg(long = "hide", value_name = "SYMBOL")]
        hidden: Vec<String>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Write to a file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the configured tickers.
    Tickers {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the built-in configuration as TOML.
    DefaultConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn parse_range(s: &str) -> Result<ChartRange, String> {
    s.parse::<ChartRange>().map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            range,
            config,
            hidden,
            format,
            output,
        } => run_compare(range, config.as_deref(), &hidden, format, output.as_deref()),
        Commands::Tickers { config } => run_tickers(config.as_deref()),
        Commands::DefaultConfig => {
            print!("{}", ChartConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ChartConfig> {
    match path {
        Some(path) => ChartConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(ChartConfig::default()),
    }
}

fn run_compare(
    range: Option<ChartRange>,
    config_path: Option<&Path>,
    hidden: &[String],
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let range = range.unwrap_or(config.default_range);

    let mut visibility = SeriesVisibility::all_visible(&config.tickers);
    for symbol in hidden {
        if !config.tickers.iter().any(|t| &t.symbol == symbol) {
            warn!(%symbol, "--hide names a symbol that is not configured");
        }
        visibility.hide(symbol);
    }

    let provider = YahooProvider::new(&config.provider).context("building HTTP client")?;
    let dashboard = Dashboard::new(Arc::new(provider), config.tickers.clone())?;

    let snapshot = match dashboard.refresh(range)? {
        RefreshOutcome::Ready(snapshot) => snapshot,
        RefreshOutcome::Superseded => bail!("refresh was cancelled before it completed"),
    };

    let rendered = match format {
        OutputFormat::Table => render_table(&config, &snapshot, &visibility),
        OutputFormat::Json => render_json(&snapshot, &visibility)?,
        OutputFormat::Csv => render_csv(&snapshot, &visibility)?,
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => std::io::stdout().write_all(rendered.as_bytes())?,
    }

    Ok(())
}

fn run_tickers(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    println!("{:<10} {}", "Symbol", "Name");
    println!("{}", "-".repeat(40));
    for ticker in &config.tickers {
        println!("{:<10} {}", ticker.symbol, ticker.display_name);
    }
    Ok(())
}

fn render_table(
    config: &ChartConfig,
    snapshot: &ChartSnapshot,
    visibility: &SeriesVisibility,
) -> String {
    let columns = visibility.visible(&snapshot.symbols);
    let rows = visibility.apply(&snapshot.rows);
    let mut out = String::new();

    out.push_str(&format!(
        "Normalized performance (base 100), range {}\n\n",
        snapshot.range
    ));
    out.push_str(&format!("{:<8}", "Month"));
    for symbol in &columns {
        out.push_str(&format!(" {:>14}", truncate(config.display_name(symbol), 14)));
    }
    out.push('\n');
    out.push_str(&"-".repeat(8 + columns.len() * 15));
    out.push('\n');

    for row in &rows {
        out.push_str(&format!("{:<8}", row.date_label));
        for symbol in &columns {
            match row.get(symbol) {
                Some(value) => out.push_str(&format!(" {value:>14.1}")),
                None => out.push_str(&format!(" {:>14}", "-")),
            }
        }
        out.push('\n');
    }

    if !snapshot.failures.is_empty() {
        out.push('\n');
        let missing: Vec<&str> = snapshot.failures.iter().map(|e| e.symbol()).collect();
        out.push_str(&format!("No data: {}\n", missing.join(", ")));
    }

    out
}

fn render_json(snapshot: &ChartSnapshot, visibility: &SeriesVisibility) -> Result<String> {
    let rows: Vec<AlignedRow> = visibility.apply(&snapshot.rows);
    let doc = serde_json::json!({
        "range": snapshot.range,
        "symbols": visibility.visible(&snapshot.symbols),
        "rows": rows,
    });
    Ok(serde_json::to_string_pretty(&doc)? + "\n")
}

fn render_csv(snapshot: &ChartSnapshot, visibility: &SeriesVisibility) -> Result<String> {
    let columns = visibility.visible(&snapshot.symbols);
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["month"];
    header.extend(columns.iter().copied());
    writer.write_record(&header)?;

    for row in visibility.apply(&snapshot.rows) {
        let mut record = vec![row.date_label.clone()];
        record.extend(
            columns
                .iter()
                .map(|s| row.get(s).map(|v| format!("{v:.4}")).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfchart_core::DataError;
    use std::collections::BTreeMap;

    fn snapshot() -> ChartSnapshot {
        let row = |label: &str, values: &[(&str, f64)]| AlignedRow {
            date_label: label.into(),
            values: values
                .iter()
                .map(|&(s, v)| (s.to_string(), v))
                .collect::<BTreeMap<_, _>>(),
        };
        ChartSnapshot {
            range: ChartRange::OneYear,
            rows: vec![
                row("2024-01", &[("GLD", 100.0)]),
                row("2024-02", &[("GLD", 104.5), ("^GSPC", 100.0)]),
            ],
            symbols: vec!["GLD".into(), "^GSPC".into()],
            failures: vec![DataError::provider("VTSAX", "HTTP 404")],
        }
    }

    #[test]
    fn table_marks_missing_cells() {
        let out = render_table(
            &ChartConfig::default(),
            &snapshot(),
            &SeriesVisibility::default(),
        );
        assert!(out.contains("range 1y"));
        assert!(out.contains("Gold"));
        assert!(out.contains("104.5"));
        assert!(out.contains("No data: VTSAX"));
        let jan = out.lines().find(|l| l.starts_with("2024-01")).unwrap();
        assert!(jan.trim_end().ends_with('-'));
    }

    #[test]
    fn csv_leaves_missing_cells_blank() {
        let out = render_csv(&snapshot(), &SeriesVisibility::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "month,GLD,^GSPC");
        assert_eq!(lines[1], "2024-01,100.0000,");
        assert_eq!(lines[2], "2024-02,104.5000,100.0000");
    }

    #[test]
    fn hidden_series_are_omitted() {
        let mut vis = SeriesVisibility::default();
        vis.hide("^GSPC");
        let out = render_csv(&snapshot(), &vis).unwrap();
        assert_eq!(out.lines().next(), Some("month,GLD"));
    }

    #[test]
    fn json_has_range_and_rows() {
        let out = render_json(&snapshot(), &SeriesVisibility::default()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["range"], "1y");
        assert_eq!(doc["rows"].as_array().unwrap().len(), 2);
        assert!(doc["rows"][0]["values"].get("^GSPC").is_none());
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("Gold", 14), "Gold");
        assert_eq!(truncate("Vanguard Total Stock Market", 14).chars().count(), 14);
    }
}
