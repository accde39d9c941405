//! l7dissect CLI entry point.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use l7dissect::cli::{Args, DecodedFrame, FrameReader, OutputFormatter};
use l7dissect::dissect::{CommandDissector, ProtocolDecoder};
use l7dissect::message::{Direction, PayloadMessage};
use l7dissect::mysql::{self, MysqlCommand};
use l7dissect::sql::SqlNormalizer;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter())),
        )
        .with_writer(io::stderr)
        .init();

    let normalizer = Arc::new(
        SqlNormalizer::new(args.normalizer_config()).context("Invalid normalizer settings")?,
    );
    let decoder = mysql::decoder(Arc::clone(&normalizer), &args.pipeline_config());

    // Handle info-only commands
    if args.is_info_only() {
        if let Some(sql) = &args.normalize {
            println!("{}", normalizer.normalize(sql));
        }
        if args.list_commands {
            list_commands(&decoder);
        }
        return Ok(());
    }

    let input: Box<dyn BufRead> = match &args.file {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open input: {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let direction = Direction::from(args.direction);
    let frames = decode_frames(&decoder, input, direction)?;
    info!(frames = frames.len(), direction = direction.as_str(), "input decoded");

    let formatter = OutputFormatter::new(args.format);
    let mut stdout = io::stdout().lock();
    formatter.write(&frames, &mut stdout)?;

    if args.stats {
        let snapshot = decoder.pipeline(direction).stats().snapshot();
        formatter.write_stats(&snapshot, normalizer.cache_stats().as_ref(), &mut stdout)?;
    }

    Ok(())
}

/// Decode every frame of the input. Malformed lines are logged and skipped.
fn decode_frames(
    decoder: &ProtocolDecoder<MysqlCommand>,
    input: Box<dyn BufRead>,
    direction: Direction,
) -> Result<Vec<DecodedFrame>> {
    let mut decoded = Vec::new();

    for frame in FrameReader::new(input) {
        let frame = match frame {
            Ok(frame) => frame,
            Err(l7dissect::Error::Io(e)) => return Err(e).context("Failed to read input"),
            Err(e) => {
                warn!("skipping frame: {e}");
                continue;
            }
        };

        let mut msg = PayloadMessage::new(&frame.data, direction);
        let outcome = decoder.decode(&mut msg);
        decoded.push(DecodedFrame {
            line: frame.line,
            len: frame.data.len(),
            outcome,
            attributes: msg.into_attributes(),
        });
    }

    Ok(decoded)
}

fn list_commands(decoder: &ProtocolDecoder<MysqlCommand>) {
    println!("Registered {} dissectors:", decoder.protocol());
    println!("{:-<50}", "");

    for direction in [Direction::Request, Direction::Response] {
        let pipeline = decoder.pipeline(direction);
        println!("  {}:", direction.as_str());

        for dissector in pipeline.dissectors() {
            println!("    {} ({})", dissector.display_name(), dissector.name());
        }
        if let Some(fallback) = pipeline.fallback() {
            println!("    {} ({}, fallback)", fallback.display_name(), fallback.name());
        }
    }
}
