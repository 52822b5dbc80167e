//! Audiodiff CLI - compare two audio recordings of the same event.

mod report;

use anyhow::Context;
use audiodiff_core::{AlignConfig, AlignStrategy, CompareOptions, compare};
use audiodiff_io::load_audio;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit code for comparisons scoring below 80.
const EXIT_DIFFERENT: u8 = 1;
/// Exit code for comparisons scoring below 50.
const EXIT_VERY_DIFFERENT: u8 = 2;
/// Exit code for unreadable input files.
const EXIT_INPUT_ERROR: u8 = 3;

#[derive(Parser)]
#[command(name = "audiodiff")]
#[command(author, version, about = "Compare two audio recordings of the same event", long_about = None)]
struct Cli {
    /// First audio file (reference)
    #[arg(value_name = "FILE1")]
    file1: PathBuf,

    /// Second audio file
    #[arg(value_name = "FILE2")]
    file2: PathBuf,

    /// Skip automatic temporal alignment
    #[arg(long = "no-align", action = clap::ArgAction::SetTrue)]
    no_align: bool,

    /// Trim the aligned views to the first file's duration
    #[arg(long)]
    trim: bool,

    /// Peak-normalize both files before correlating
    #[arg(long)]
    normalize: bool,

    /// Silence threshold in dB
    #[arg(long, default_value = "-60", value_name = "DB", allow_hyphen_values = true)]
    threshold: f32,

    /// Offset estimation strategy
    #[arg(long, value_enum, default_value_t = Strategy::Transient)]
    strategy: Strategy,

    /// Alignment search window half-width in ms (cross-correlation only)
    #[arg(long, default_value = "500", value_name = "MS")]
    max_offset_ms: f32,

    /// Output the full result as JSON instead of a report
    #[arg(long)]
    json: bool,

    /// Show detailed analysis in the report
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    /// Match the first above-threshold samples
    Transient,
    /// FFT cross-correlation peak
    Xcorr,
}

impl From<Strategy> for AlignStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Transient => AlignStrategy::TransientMatch,
            Strategy::Xcorr => AlignStrategy::CrossCorrelation,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(EXIT_INPUT_ERROR)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let buffer1 = load_audio(&cli.file1)
        .with_context(|| format!("failed to load {}", cli.file1.display()))?;
    let buffer2 = load_audio(&cli.file2)
        .with_context(|| format!("failed to load {}", cli.file2.display()))?;
    tracing::info!(
        file1 = %cli.file1.display(),
        rate1 = buffer1.sample_rate(),
        file2 = %cli.file2.display(),
        rate2 = buffer2.sample_rate(),
        "loaded input files"
    );

    let options = CompareOptions {
        align: !cli.no_align,
        trim: cli.trim,
        normalize: cli.normalize,
        silence_threshold_db: cli.threshold,
        alignment: AlignConfig {
            strategy: cli.strategy.into(),
            max_offset_ms: cli.max_offset_ms,
            ..AlignConfig::default()
        },
    };

    let result = compare(&buffer1, &buffer2, &options);

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report::to_json(&result, &cli.file1, &cli.file2))?
        );
    } else {
        report::print_report(&result, &cli.file1, &cli.file2, cli.verbose);
    }

    Ok(ExitCode::from(exit_code(result.similarity_score)))
}

fn exit_code(score: f32) -> u8 {
    if score < 50.0 {
        EXIT_VERY_DIFFERENT
    } else if score < 80.0 {
        EXIT_DIFFERENT
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_tiers() {
        assert_eq!(exit_code(95.0), 0);
        assert_eq!(exit_code(80.0), 0);
        assert_eq!(exit_code(79.9), EXIT_DIFFERENT);
        assert_eq!(exit_code(50.0), EXIT_DIFFERENT);
        assert_eq!(exit_code(49.9), EXIT_VERY_DIFFERENT);
    }

    #[test]
    fn test_cli_parses_defaults() {
        let cli = Cli::try_parse_from(["audiodiff", "a.wav", "b.wav"]).unwrap();
        assert!(!cli.no_align);
        assert!(!cli.trim);
        assert!(!cli.normalize);
        assert_eq!(cli.threshold, -60.0);
        assert_eq!(cli.max_offset_ms, 500.0);
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_parses_all_flags() {
        let cli = Cli::try_parse_from([
            "audiodiff",
            "a.wav",
            "b.wav",
            "--no-align",
            "--trim",
            "--normalize",
            "--threshold",
            "-48",
            "--strategy",
            "xcorr",
            "--max-offset-ms",
            "250",
            "--json",
            "--verbose",
        ])
        .unwrap();
        assert!(cli.no_align);
        assert!(cli.trim);
        assert!(cli.normalize);
        assert_eq!(cli.threshold, -48.0);
        assert!(matches!(cli.strategy, Strategy::Xcorr));
        assert_eq!(cli.max_offset_ms, 250.0);
        assert!(cli.json);
        assert!(cli.verbose);
    }
}
