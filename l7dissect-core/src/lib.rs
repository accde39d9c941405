//! # l7dissect-core
//!
//! Application-layer payload classification for network observability.
//!
//! Byte payloads captured from TCP connections are handed to a dispatch
//! pipeline of command dissectors. The first dissector that recognizes the
//! payload classifies it and records structured attributes (the SQL text, a
//! normalized content key, whether the command is one-way) on the message.
//!
//! ## Features
//!
//! - **Fastfail/parse dispatch**: cheap structural pre-checks before any
//!   attribute extraction, with a catch-all fallback per direction
//! - **MySQL dissectors**: `COM_QUERY`, `COM_STMT_PREPARE`, `COM_QUIT`,
//!   `COM_INIT_DB`, `COM_PING`, `COM_STMT_CLOSE`, and OK/ERR/EOF responses
//! - **SQL normalization**: literal-insensitive content keys, memoized in a
//!   bounded LRU cache shared across threads
//! - **Coverage counters**: per-pipeline outcome and per-dissector counts
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use l7dissect_core::prelude::*;
//!
//! let normalizer = Arc::new(SqlNormalizer::new(NormalizerConfig::default()).unwrap());
//! let registry = default_registry(normalizer, &PipelineConfig::default());
//!
//! // COM_QUIT
//! let frame = [0x01, 0x00, 0x00, 0x00, 0x01];
//! let mut msg = PayloadMessage::request(&frame);
//! let outcome = registry.decode("mysql", &mut msg).unwrap();
//!
//! assert!(outcome.is_detailed());
//! assert_eq!(msg.attributes().get_bool(names::ONEWAY), Some(true));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                        l7dissect-core                               |
//! +---------------------------------------------------------------------+
//! |  message/    - PayloadMessage, typed attributes                     |
//! |  dissect/    - CommandDissector trait, pipelines, registry, stats   |
//! |  mysql/      - MySQL request and response dissectors                |
//! |  sql/        - SQL verb gate, lexer, content-key normalizer         |
//! |  cache/      - LRU content-key cache                                |
//! |  config/     - Normalizer and pipeline configuration                |
//! |  format/     - Hex frame encoding                                   |
//! |  error/      - Error types                                          |
//! +---------------------------------------------------------------------+
//! ```

pub mod cache;
pub mod config;
pub mod dissect;
pub mod error;
pub mod format;
pub mod message;
pub mod mysql;
pub mod prelude;
pub mod sql;

// Test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at crate root for convenience
pub use cache::{CacheStats, ContentKeyCache, LruContentKeyCache, NoCache};
pub use config::{NormalizerConfig, PipelineConfig};
pub use dissect::{
    default_registry, Classification, CommandDissector, DecoderStats, DecoderStatsSnapshot,
    DispatchOutcome, DispatchPipeline, ProtocolDecoder, ProtocolRegistry, Verdict,
};
pub use error::{ConfigError, Error, InputError, Result};
pub use message::{names, AttributeValue, Attributes, Direction, PayloadMessage};
pub use mysql::MysqlCommand;
pub use sql::{is_sql, normalize_statement, SqlNormalizer};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
