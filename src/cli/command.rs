use std::path::PathBuf;
use std::sync::LazyLock;

use clap::builder::TypedValueParser;
use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};
use fllr::process::DEFAULT_BLOCK_FRAMES;

static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{} (git {}, fllr {}, built {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown"),
        env!("FLLR_VERSION"),
        env!("BUILD_TIMESTAMP"),
    )
});

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = LONG_VERSION.as_str(),
    author       = env!("CARGO_PKG_AUTHORS"),
    about        = "Convert Apple FLLR WAVE captures into FLAC files",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat warnings as fatal errors (fail on first warning).
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress bars during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert a capture into one or more FLAC files.
    Convert(ConvertArgs),

    /// Print the stream parameters of a capture.
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Input WAVE capture (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Base path for the output files, without the .flac extension.
    ///
    /// Defaults to the input path without its extension. Required for stdin.
    #[arg(long, value_name = "PATH")]
    pub output_path: Option<PathBuf>,

    /// Start a new output file every SECONDS of audio (0 writes one file).
    #[arg(long, value_name = "SECONDS", default_value_t = 0)]
    pub split: u32,

    /// Frames read and encoded per block.
    #[arg(
        long,
        value_name = "FRAMES",
        default_value_t = DEFAULT_BLOCK_FRAMES,
        value_parser = clap::value_parser!(u32).range(1..).map(|v| v as usize),
    )]
    pub block_frames: usize,

    /// FLAC block size in frames (encoder default when omitted).
    #[arg(long, value_name = "FRAMES")]
    pub flac_block_size: Option<usize>,

    /// Write a YAML report of the stream and produced files.
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Input WAVE capture (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = InfoFormat::Plain)]
    pub format: InfoFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum InfoFormat {
    /// Human-readable summary.
    Plain,
    /// YAML document.
    Yaml,
}
