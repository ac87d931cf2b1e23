// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::app_config::Config;
use crate::interchange::{parse_interval_rows, parse_label_rows, render_interval_rows};
use crate::session::AnnotationSession;
use crate::validator::{IntervalValidator, RowFlag};

mod app_config;
mod errors;
mod events;
mod interchange;
mod interval_store;
mod label_registry;
mod session;
mod timecode;
mod validator;

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliLogLevel {
    fn to_level_filter(&self) -> LevelFilter {
        match self {
            CliLogLevel::Error => LevelFilter::Error,
            CliLogLevel::Warn => LevelFilter::Warn,
            CliLogLevel::Info => LevelFilter::Info,
            CliLogLevel::Debug => LevelFilter::Debug,
            CliLogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a marks file against a label set and report conflicts
    Check(CheckArgs),

    /// Sort a marks file ascending by begin time
    Sort(SortArgs),

    /// Generate shell completions for yavat
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Marks CSV file to validate
    #[arg(value_name = "MARKS_CSV")]
    marks_path: PathBuf,

    /// Label-set CSV file (groups and incompatibilities); without it
    /// every label is unconstrained
    #[arg(short, long)]
    labels: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Emit the report as JSON instead of plain text
    #[arg(long)]
    json: bool,

    /// Set logging level
    #[arg(short = 'g', long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct SortArgs {
    /// Marks CSV file to sort
    #[arg(value_name = "MARKS_CSV")]
    marks_path: PathBuf,

    /// Output path; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Set logging level
    #[arg(short = 'g', long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// YAVAT - Yet Another Video Annotation Tool
///
/// Checks labeled time intervals against label-group consistency rules:
/// no overlapping marks within a group, no forbidden predecessor
/// sequencing.
#[derive(Parser, Debug)]
#[command(name = "yavat")]
#[command(version = "0.3.0")]
#[command(about = "Label/group consistency checking for video annotation marks")]
#[command(long_about = "YAVAT validates video annotation mark tables: intervals of the same
label group must not overlap, and a label may forbid specific labels
from immediately preceding it within the group.

EXAMPLES:
    yavat check marks.csv                     # Structural checks only
    yavat check -l labels.csv marks.csv       # Full group validation
    yavat check --json -l labels.csv marks.csv
    yavat sort marks.csv -o sorted.csv        # Stable sort by begin time
    yavat completions bash > yavat.bash       # Generate bash completions

FILES:
    A label row is: id,name,shortcut,group,incompatibilities
    (incompatibilities is a ';'-delimited list of label names).
    A mark row is: label,begin,end with HH:MM:SS,mmm timecodes; an end
    of '...' means the mark was still open.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Default level; check/sort may lower or raise it from their args
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "yavat", &mut std::io::stdout());
            Ok(())
        }
        Commands::Check(args) => run_check(args),
        Commands::Sort(args) => run_sort(args),
    }
}

fn load_session(marks_path: &PathBuf, labels_path: Option<&PathBuf>, config: &Config) -> Result<AnnotationSession> {
    let validator = IntervalValidator::with_config((&config.validation).into());
    let mut session = AnnotationSession::with_validator(validator);

    if let Some(labels_path) = labels_path {
        let text = fs::read_to_string(labels_path)
            .with_context(|| format!("Failed to read label set: {}", labels_path.display()))?;
        let rows = parse_label_rows(&text)
            .with_context(|| format!("Failed to parse label set: {}", labels_path.display()))?;
        session.load_label_set(rows);
    } else {
        warn!("No label set supplied; every label is unconstrained");
    }

    let text = fs::read_to_string(marks_path)
        .with_context(|| format!("Failed to read marks: {}", marks_path.display()))?;
    let rows = parse_interval_rows(&text)
        .with_context(|| format!("Failed to parse marks: {}", marks_path.display()))?;
    session.load_intervals(&rows);

    Ok(session)
}

fn run_check(args: CheckArgs) -> Result<()> {
    if let Some(level) = &args.log_level {
        log::set_max_level(level.to_level_filter());
    }

    let config = Config::from_file_or_default(&args.config_path)?;
    if args.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let session = load_session(&args.marks_path, args.labels.as_ref(), &config)?;
    let report = session.report();

    if args.json {
        let rows: Vec<serde_json::Value> = report
            .rows()
            .iter()
            .map(|row| {
                let entry = &session.store().entries()[row.index];
                let status = match &row.flag {
                    RowFlag::Valid => "valid",
                    RowFlag::Malformed => "malformed",
                    RowFlag::GroupOverlap { .. } => "overlap",
                    RowFlag::IncompatiblePredecessor { .. } => "incompatible-predecessor",
                };
                serde_json::json!({
                    "row": row.index + 1,
                    "label": entry.label,
                    "begin": entry.begin.display_text(),
                    "end": entry.end.display_text(),
                    "status": status,
                    "detail": row.flag.to_string(),
                })
            })
            .collect();
        let doc = serde_json::json!({
            "rows": rows,
            "conflicts": report.conflict_count,
            "malformed": report.malformed_count,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        for row in report.flagged_rows() {
            let entry = &session.store().entries()[row.index];
            println!(
                "row {:>4}  {:<16} {:>13} -> {:>13}  {}",
                row.index + 1,
                entry.label,
                entry.begin.display_text(),
                entry.end.display_text(),
                row.flag
            );
        }
        info!(
            "{} rows checked, {} conflicts, {} malformed",
            report.rows().len(),
            report.conflict_count,
            report.malformed_count
        );
    }

    if report.passed() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

fn run_sort(args: SortArgs) -> Result<()> {
    if let Some(level) = &args.log_level {
        log::set_max_level(level.to_level_filter());
    }

    let text = fs::read_to_string(&args.marks_path)
        .with_context(|| format!("Failed to read marks: {}", args.marks_path.display()))?;
    let rows = parse_interval_rows(&text)
        .with_context(|| format!("Failed to parse marks: {}", args.marks_path.display()))?;

    let mut session = AnnotationSession::new();
    session.load_intervals(&rows);
    session.sort_intervals();
    let sorted = render_interval_rows(&session.dump_intervals());

    match &args.output {
        Some(path) => {
            fs::write(path, sorted)
                .with_context(|| format!("Failed to write marks: {}", path.display()))?;
            info!("Wrote {} sorted rows to {}", rows.len(), path.display());
        }
        None => print!("{}", sorted),
    }
    Ok(())
}
