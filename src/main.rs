use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info, info_span};
use tracing_subscriber::EnvFilter;

use freefall::adapters::csv_source::CsvSampleSource;
use freefall::adapters::discover::discover_csv_files;
use freefall::adapters::sink::OutputSink;
use freefall::log_format::TargetFirstFormat;
use freefall::{cli_config, Config, Engine};

/// Detect skydive flight phases from GPS altimeter logs.
#[derive(Parser, Debug)]
#[command(name = "jump", version, about, long_about = None)]
struct Cli {
    /// A single CSV log file, or a directory of `*.csv` files.
    path: PathBuf,

    /// TOML file overlaying the documented configuration defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override a single configuration value, e.g. `--set landing.speed_max=6.0`.
    /// May be repeated; applied in order, after any `--config` overlay.
    #[arg(long = "set", value_name = "GROUP.OPTION=VALUE")]
    overrides: Vec<String>,

    /// Output format for annotated rows.
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Write output here instead of stdout.
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Csv,
    Ndjson,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = cli_config::load(cli.config.as_deref(), &cli.overrides)
        .context("loading configuration")?;
    let files = discover_csv_files(&cli.path)
        .with_context(|| format!("discovering input files under {}", cli.path.display()))?;

    if files.is_empty() {
        anyhow::bail!("no CSV files found under {}", cli.path.display());
    }

    let mut sink = open_sink(cli.format, cli.out.as_deref())?;
    let mut had_failure = false;

    for file in &files {
        let span = info_span!("process_file", path = %file.display());
        let _enter = span.enter();
        info!("starting");
        match process_file(file, &config, &mut sink) {
            Ok(rows) => info!(rows, "finished"),
            Err(err) => {
                error!(error = format!("{err:#}"), "failed, skipping file");
                had_failure = true;
            }
        }
    }

    sink.flush().context("flushing output")?;

    if had_failure {
        anyhow::bail!("one or more input files failed to process");
    }
    Ok(())
}

fn open_sink(format: OutputFormat, out: Option<&std::path::Path>) -> Result<OutputSink> {
    match (format, out) {
        (OutputFormat::Csv, Some(path)) => OutputSink::csv_to_path(path),
        (OutputFormat::Csv, None) => Ok(OutputSink::csv_to_stdout()),
        (OutputFormat::Ndjson, Some(path)) => OutputSink::ndjson_to_path(path),
        (OutputFormat::Ndjson, None) => Ok(OutputSink::ndjson_to_stdout()),
    }
}

fn process_file(path: &std::path::Path, config: &Config, sink: &mut OutputSink) -> Result<usize> {
    let source = CsvSampleSource::open(path)?;
    let mut engine = Engine::new(config.clone());
    let mut rows = 0;

    for sample in source {
        let sample = sample?;
        for output in engine.process(sample).map_err(anyhow::Error::new)? {
            sink.write_row(&output)?;
            rows += 1;
        }
    }
    for output in engine.finish() {
        sink.write_row(&output)?;
        rows += 1;
    }

    Ok(rows)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .event_format(TargetFirstFormat)
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
