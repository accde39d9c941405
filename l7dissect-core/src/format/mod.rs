//! Text encodings for captured frames.
//!
//! Frames travel through the CLI and test fixtures as hex text, one frame per
//! line.

mod hex;

pub use hex::{decode_hex_line, encode_hex, strip_comment};
