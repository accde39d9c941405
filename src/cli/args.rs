//! Command-line argument definitions.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use l7dissect_core::config::{NormalizerConfig, PipelineConfig};
use l7dissect_core::message::Direction;

use super::OutputFormat;

/// Direction of the frames in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    /// Client to server
    Request,
    /// Server to client
    Response,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Request => Direction::Request,
            DirectionArg::Response => Direction::Response,
        }
    }
}

/// Classify hex-encoded MySQL frames.
#[derive(Parser, Debug)]
#[command(name = "l7dissect")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input file with one hex-encoded frame per line (stdin if omitted)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Direction of the input frames
    #[arg(short = 'd', long = "direction", value_enum, default_value = "request")]
    pub direction: DirectionArg,

    /// Output format for stdout
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Print the content key of a SQL statement and exit
    #[arg(short = 'n', long = "normalize", value_name = "SQL")]
    pub normalize: Option<String>,

    /// List registered command dissectors
    #[arg(long = "list-commands")]
    pub list_commands: bool,

    /// Print decoder and cache statistics after the input is processed
    #[arg(long = "stats")]
    pub stats: bool,

    /// Content-key cache capacity (0 disables the cache)
    #[arg(long = "cache-size", default_value = "10000")]
    pub cache_size: usize,

    /// Maximum number of tokens in a content key
    #[arg(long = "max-tokens", default_value = "512")]
    pub max_tokens: usize,

    /// Do not register the generic catch-all dissectors
    #[arg(long = "no-fallback")]
    pub no_fallback: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Check if this is an info-only command (no frame input needed).
    pub fn is_info_only(&self) -> bool {
        self.list_commands || self.normalize.is_some()
    }

    pub fn normalizer_config(&self) -> NormalizerConfig {
        NormalizerConfig::default()
            .with_cache_capacity(self.cache_size)
            .with_max_tokens(self.max_tokens)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default().with_fallback(!self.no_fallback)
    }

    /// Log filter selected by the `-v` count.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["l7dissect"]);
        assert!(args.file.is_none());
        assert_eq!(args.direction, DirectionArg::Request);
        assert_eq!(args.format, OutputFormat::Table);
        assert!(!args.is_info_only());
        assert_eq!(args.normalizer_config(), NormalizerConfig::default());
        assert_eq!(args.pipeline_config(), PipelineConfig::default());
        assert_eq!(args.log_filter(), "warn");
    }

    #[test]
    fn test_flags_map_to_config() {
        let args = Args::parse_from([
            "l7dissect",
            "frames.hex",
            "--direction",
            "response",
            "--format",
            "json",
            "--cache-size",
            "0",
            "--max-tokens",
            "64",
            "--no-fallback",
            "-vv",
        ]);
        assert_eq!(args.file, Some(PathBuf::from("frames.hex")));
        assert_eq!(Direction::from(args.direction), Direction::Response);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.normalizer_config().cache_capacity, 0);
        assert_eq!(args.normalizer_config().max_tokens, 64);
        assert!(!args.pipeline_config().use_fallback);
        assert_eq!(args.log_filter(), "debug");
    }

    #[test]
    fn test_info_only() {
        assert!(Args::parse_from(["l7dissect", "--list-commands"]).is_info_only());
        assert!(Args::parse_from(["l7dissect", "-n", "SELECT 1"]).is_info_only());
    }
}
