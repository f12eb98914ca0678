//! Command-line interface components.

use crate::config::{
    CollisionPolicy, CompressionAlgorithm, EmptyTablePolicy, ExtractorConfig, OutputFormat,
    ShortLinePolicy,
};
use crate::models::ConversionStats;
use crate::processor::TreeConverter;
use crate::processor::discovery::{ScanReport, scan_tree};
use crate::report::{ConversionEvent, Reporter, TracingReporter};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "idis-processor")]
#[command(about = "Convert HUD IDIS fixed-width exports to CSV or Parquet tables")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert every export under a directory (zip archives are expanded and deleted)
    Convert(ConvertArgs),
    /// List what a conversion would touch without changing anything
    Scan(ScanArgs),
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Directory (or single file / zip archive) holding IDIS exports
    #[arg(value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    /// Flat output directory, defaults to a sibling of the input named after the format
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// Output format (csv, parquet)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Parquet compression algorithm
    #[arg(long, value_enum)]
    pub compression: Option<CompressionAlgorithm>,

    /// What to do when two exports derive the same table name
    #[arg(long = "on-collision", value_enum)]
    pub on_collision: Option<CollisionPolicy>,

    /// Write header-only tables for exports without data rows
    #[arg(long)]
    pub allow_empty: bool,

    /// Keep the characters of columns cut off by short lines
    #[arg(long)]
    pub partial_lines: bool,

    /// Keep whitespace padding around cell values
    #[arg(long)]
    pub keep_padding: bool,

    /// Spell out special characters in column names
    #[arg(long)]
    pub sanitize_columns: bool,

    /// Extension of fixed-width exports
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Directory holding IDIS exports
    #[arg(value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    /// Extension of fixed-width exports
    #[arg(long, value_name = "EXT", default_value = "txt")]
    pub extension: String,
}

impl ConvertArgs {
    /// Configuration file settings with command-line overrides applied
    pub fn resolve_config(&self) -> crate::Result<ExtractorConfig> {
        let mut config = ExtractorConfig::discover(self.config.as_deref())?;

        if let Some(format) = &self.format {
            config.format = format.parse()?;
        }
        if let Some(compression) = self.compression {
            config.compression = compression;
        }
        if let Some(policy) = self.on_collision {
            config.output_collisions = policy;
        }
        if let Some(extension) = &self.extension {
            config.text_extension = extension.clone();
        }
        if self.allow_empty {
            config.empty_tables = EmptyTablePolicy::Accept;
        }
        if self.partial_lines {
            config.short_lines = ShortLinePolicy::Partial;
        }
        if self.keep_padding {
            config.trim_cells = false;
        }
        if self.sanitize_columns {
            config.sanitize_column_names = true;
        }

        config.validate()?;
        Ok(config)
    }

    /// Get the output path, defaulting to `<input parent>/<format>`
    pub fn get_output_path(&self, format: OutputFormat) -> PathBuf {
        match &self.output_path {
            Some(path) => path.clone(),
            None => self
                .input_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .join(format.extension()),
        }
    }
}

/// Install the tracing subscriber for the binary
pub fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("idis_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Spinner showing the entry being processed, forwarding events to tracing
pub struct ProgressReporter {
    progress_bar: ProgressBar,
    inner: TracingReporter,
}

impl ProgressReporter {
    pub fn new(hidden: bool) -> Self {
        let progress_bar = if hidden {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {pos} converted {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
            );
            pb.enable_steady_tick(Duration::from_millis(120));
            pb
        };
        Self {
            progress_bar,
            inner: TracingReporter,
        }
    }

    pub fn finish(&self) {
        self.progress_bar.finish_and_clear();
    }
}

impl Reporter for ProgressReporter {
    fn report(&mut self, event: &ConversionEvent) {
        match event {
            ConversionEvent::Converted { source, .. } => {
                self.progress_bar.inc(1);
                self.progress_bar
                    .set_message(source.display().to_string());
            }
            ConversionEvent::Extracted { archive, .. } => {
                self.progress_bar
                    .set_message(format!("expanded {}", archive.display()));
            }
            ConversionEvent::Skipped { .. } | ConversionEvent::Failed { .. } => {}
        }
        let inner = &mut self.inner;
        self.progress_bar.suspend(|| inner.report(event));
    }
}

/// Outcome of a command, used to pick the exit code
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    PartialFailure,
}

/// Run the parsed command
pub fn run(args: Args) -> Result<Outcome> {
    match args.command {
        Commands::Convert(convert) => run_convert(&convert, args.quiet),
        Commands::Scan(scan) => run_scan(&scan),
    }
}

fn run_convert(args: &ConvertArgs, quiet: bool) -> Result<Outcome> {
    let config = args
        .resolve_config()
        .context("Failed to resolve configuration")?;
    let output_path = args.get_output_path(config.format);

    if !quiet {
        println!("{}", "Starting IDIS export conversion".bright_green().bold());
        println!("  {} {}", "Input:".bright_cyan(), args.input_path.display());
        println!("  {} {}", "Output:".bright_cyan(), output_path.display());
        println!("  {} {}", "Format:".bright_cyan(), config.format);
    }

    let mut converter = TreeConverter::new(output_path, config, ProgressReporter::new(quiet));
    let result = converter.convert(&args.input_path);
    converter.reporter().finish();
    let stats = result
        .with_context(|| format!("Failed to convert {}", args.input_path.display()))?;

    if !quiet {
        print_conversion_summary(&stats);
    }

    Ok(if stats.has_failures() {
        Outcome::PartialFailure
    } else {
        Outcome::Success
    })
}

fn run_scan(args: &ScanArgs) -> Result<Outcome> {
    let report = scan_tree(&args.input_path, &args.extension)
        .with_context(|| format!("Failed to scan {}", args.input_path.display()))?;
    print_scan_report(&report);

    Ok(if report.unreadable.is_empty() {
        Outcome::Success
    } else {
        Outcome::PartialFailure
    })
}

fn print_conversion_summary(stats: &ConversionStats) {
    println!("\n{}", "Conversion complete".bright_green().bold());
    println!(
        "  {} {}",
        "Files converted:".bright_cyan(),
        stats.files_converted.to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Rows written:".bright_cyan(),
        stats.total_rows.to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Archives extracted:".bright_cyan(),
        stats.archives_extracted
    );
    if stats.files_skipped > 0 {
        println!(
            "  {} {}",
            "Skipped:".bright_yellow(),
            stats.files_skipped
        );
    }
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Failed:".bright_red().bold(),
            stats.files_failed.to_string().bright_red()
        );
    }
    println!(
        "  {} {:.2}s",
        "Time:".bright_cyan(),
        stats.processing_time_ms as f64 / 1000.0
    );
}

fn print_scan_report(report: &ScanReport) {
    println!("{}", "Scan results".bright_green().bold());
    for path in &report.text_files {
        println!("  {} {}", "export ".bright_green(), path.display());
    }
    for archive in &report.archives {
        println!(
            "  {} {} ({} exports inside)",
            "archive".bright_cyan(),
            archive.path.display(),
            archive.text_entries
        );
    }
    for path in &report.skipped {
        println!("  {} {}", "skip   ".bright_yellow(), path.display());
    }
    for (path, reason) in &report.unreadable {
        println!("  {} {}: {}", "error  ".bright_red(), path.display(), reason);
    }
    println!(
        "\n  {} {}",
        "Exports to convert:".bright_cyan(),
        report.convertible_files().to_string().bright_white().bold()
    );
}
