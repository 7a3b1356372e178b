//! ADXLab CLI: instrument listing, single-configuration annotation and sweeps.
//!
//! Commands:
//! - `instruments`: list instrument groups, or one group's instruments
//! - `annotate`: fetch a series and append ADX columns and trend labels
//! - `sweep`: run a parameter grid from a TOML file and report the merged table

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use polars::prelude::DataFrame;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use adxlab_core::data::{
    fetch_or_empty, CsvProvider, DukascopyProvider, FetchRequest, InstrumentCatalog, Interval,
    OfferSide, SeriesProvider, SyntheticProvider,
};
use adxlab_core::{try_annotate, IndicatorConfig, MaMode};
use adxlab_core::domain::BASE_COLUMNS;
use adxlab_runner::{ParamSweep, SweepConfig, TableSummary};

const RULE_WIDTH: usize = 80;

#[derive(Parser)]
#[command(
    name = "adxlab",
    about = "ADXLab CLI: ADX trend classification over historical price series"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Source {
    /// Dukascopy public chart feed.
    Dukascopy,
    /// Per-instrument CSV files in --csv-dir.
    Csv,
    /// Deterministic random walk (offline).
    Synthetic,
}

#[derive(Subcommand)]
enum Commands {
    /// List instrument groups, or the instruments of one group.
    Instruments {
        /// Group to list (e.g. FX). Case does not matter.
        #[arg(long)]
        group: Option<String>,

        /// TOML catalog replacing the built-in one.
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Fetch one series and annotate it with a single configuration.
    Annotate {
        /// Instrument identifier (e.g. EUR/USD).
        #[arg(long, default_value = "EUR/USD")]
        instrument: String,

        /// Start date (YYYY-MM-DD).
        #[arg(long, default_value = "2000-01-01")]
        start: String,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Bar interval (1MIN, 5MIN, ..., 1DAY, 1WEEK, 1MONTH).
        #[arg(long, default_value = "1DAY")]
        interval: Interval,

        /// Offer side: B (bid) or A (ask).
        #[arg(long, default_value = "B")]
        offer_side: OfferSide,

        #[arg(long, value_enum, default_value = "dukascopy")]
        source: Source,

        /// Directory of CSV files for --source csv.
        #[arg(long, default_value = "data")]
        csv_dir: PathBuf,

        #[arg(long, default_value_t = 14)]
        length: usize,

        /// Defaults to --length.
        #[arg(long)]
        signal_length: Option<usize>,

        /// Moving-average mode: rma, ema, sma, wma, hma, dema, tema.
        #[arg(long, default_value = "rma")]
        mode: MaMode,

        #[arg(long, default_value_t = 100.0)]
        scalar: f64,

        #[arg(long, default_value_t = 1)]
        drift: usize,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: isize,

        #[arg(long, default_value_t = 25.0)]
        forming_threshold: f64,

        #[arg(long, default_value_t = 45.0)]
        trend_threshold: f64,

        /// Number of trailing rows to print.
        #[arg(long, default_value_t = 10)]
        tail: usize,
    },
    /// Run a parameter sweep described by a TOML file.
    Sweep {
        /// Path to the sweep TOML file.
        #[arg(long)]
        config: PathBuf,

        #[arg(long, value_enum, default_value = "dukascopy")]
        source: Source,

        /// Directory of CSV files for --source csv.
        #[arg(long, default_value = "data")]
        csv_dir: PathBuf,

        /// Compute combinations in parallel (overrides the file).
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Print the sweep report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Instruments { group, catalog } => run_instruments(group, catalog),
        Commands::Annotate {
            instrument,
            start,
            end,
            interval,
            offer_side,
            source,
            csv_dir,
            length,
            signal_length,
            mode,
            scalar,
            drift,
            offset,
            forming_threshold,
            trend_threshold,
            tail,
        } => {
            let config = IndicatorConfig {
                length,
                signal_length: signal_length.unwrap_or(length),
                mode,
                scalar,
                drift,
                offset,
                forming_trend_threshold: forming_threshold,
                trend_threshold,
            };
            let end = match end {
                Some(end) => parse_date(&end)?,
                None => chrono::Local::now().date_naive(),
            };
            let request =
                FetchRequest::for_days(instrument, parse_date(&start)?, end, interval, offer_side);
            run_annotate(request, source, csv_dir, config, tail)
        }
        Commands::Sweep {
            config,
            source,
            csv_dir,
            parallel,
            json,
        } => run_sweep(config, source, csv_dir, parallel, json),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn rule(c: &str) -> String {
    c.repeat(RULE_WIDTH)
}

fn build_provider(source: Source, csv_dir: PathBuf) -> Result<Box<dyn SeriesProvider>> {
    Ok(match source {
        Source::Dukascopy => Box::new(DukascopyProvider::new()?),
        Source::Csv => Box::new(CsvProvider::new(csv_dir)),
        Source::Synthetic => Box::new(SyntheticProvider::new()),
    })
}

fn run_instruments(group: Option<String>, catalog: Option<PathBuf>) -> Result<()> {
    let catalog = match catalog {
        Some(path) => InstrumentCatalog::from_file(&path)?,
        None => InstrumentCatalog::builtin(),
    };

    println!("{}", rule("-"));
    match group {
        None => {
            print!("{}", catalog.render_groups());
            println!("{}", rule("-"));
            println!("To list a group's instruments: adxlab instruments --group FX");
        }
        Some(group) => match catalog.render_group(&group) {
            Ok(listing) => print!("{listing}"),
            Err(e) => println!("Error: {e}"),
        },
    }
    println!("{}", rule("-"));
    Ok(())
}

fn fetch_frame(
    source: Source,
    csv_dir: PathBuf,
    request: &FetchRequest,
) -> Result<Option<DataFrame>> {
    let provider = build_provider(source, csv_dir)?;
    let series = fetch_or_empty(provider.as_ref(), request);
    if series.is_empty() {
        println!(
            "\nNo data for {} between {} and {}. Stopping.",
            request.instrument,
            request.start.date(),
            request.end.date()
        );
        return Ok(None);
    }
    let df = series.to_frame()?;
    println!("{}", TableSummary::from_frame(&df));
    Ok(Some(df))
}

fn run_annotate(
    request: FetchRequest,
    source: Source,
    csv_dir: PathBuf,
    config: IndicatorConfig,
    tail: usize,
) -> Result<()> {
    config.validate()?;
    if let Some(violation) = config.window_rule_violation() {
        warn!(%violation, "configuration breaks a window rule; ADX may be empty");
    }

    let Some(df) = fetch_frame(source, csv_dir, &request)? else {
        return Ok(());
    };

    let view = annotated_view(&df, &config)?;
    println!("{}", view.tail(Some(tail)));
    Ok(())
}

/// Timestamp, close and the produced columns; the base columns when the
/// engine cannot annotate the frame.
fn annotated_view(df: &DataFrame, config: &IndicatorConfig) -> Result<DataFrame> {
    match try_annotate(df, config, None) {
        Ok(annotation) => {
            let columns = annotation.columns.names();
            info!(columns = ?columns, "annotated");
            let mut shown = vec!["timestamp", "close"];
            shown.extend(columns);
            Ok(annotation.frame.select(shown)?)
        }
        Err(e) => {
            warn!(error = %e, "could not compute ADX columns, showing the input unchanged");
            let present: Vec<&str> = BASE_COLUMNS
                .into_iter()
                .filter(|name| df.column(name).is_ok())
                .collect();
            Ok(df.select(present)?)
        }
    }
}

fn run_sweep(
    path: PathBuf,
    source: Source,
    csv_dir: PathBuf,
    parallel: bool,
    json: bool,
) -> Result<()> {
    let config = SweepConfig::from_file(&path)?;
    let request = config.fetch_request();

    let Some(df) = fetch_frame(source, csv_dir, &request)? else {
        return Ok(());
    };

    let valid = config
        .grid
        .combinations(&config.indicator)
        .iter()
        .filter(|c| c.is_valid())
        .count();
    if valid == 0 {
        println!(
            "\nNo valid combinations among {}; the table holds only the base columns.",
            config.grid.size()
        );
    } else {
        println!("\nRunning the parameter grid ({valid} of {} combinations)", config.grid.size());
    }
    println!("{} (Grid Search) {}", ".".repeat(20), ".".repeat(20));

    let sweep = ParamSweep::new().with_parallelism(parallel || config.parallel);
    let outcome = sweep.run_with_progress(&df, &config.grid, &config.indicator, |idx, total, suffix| {
        println!(" - [{}/{total}] {suffix}", idx + 1);
    })?;

    println!("\nGrid search complete.");
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    } else {
        let report = &outcome.report;
        println!(
            "processed {} | skipped {} | empty {} | columns added {}",
            report.processed,
            report.skipped_invalid,
            report.empty.len(),
            report.columns_added
        );
        for suffix in &report.empty {
            println!("Warning: combination {suffix} produced no columns");
        }
    }

    println!("\nStructure of the final table:");
    println!("{}", TableSummary::from_frame(&outcome.frame));
    Ok(())
}
