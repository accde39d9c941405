//! Command-line interface module.
//!
//! This module handles:
//! - Argument parsing via clap
//! - Reading hex-encoded frames from a file or stdin
//! - Output formatting (table, CSV, JSON)

mod args;
mod input;
mod output;

pub use args::{Args, DirectionArg};
pub use input::{Frame, FrameReader};
pub use output::{DecodedFrame, OutputFormat, OutputFormatter};
