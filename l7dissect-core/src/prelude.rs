//! Convenient re-exports for common usage.
//!
//! This module provides a curated set of the most commonly used types
//! from l7dissect-core, allowing you to import them with a single `use` statement.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use l7dissect_core::prelude::*;
//!
//! let registry = default_registry(Arc::new(SqlNormalizer::default()), &PipelineConfig::default());
//! assert!(registry.get("mysql").is_some());
//! ```

// Message types
pub use crate::message::{names, AttributeValue, Attributes, Direction, PayloadMessage};

// Dispatch types
pub use crate::dissect::{
    default_registry, Classification, CommandDissector, DispatchOutcome, DispatchPipeline,
    ProtocolDecoder, ProtocolRegistry, Verdict,
};
pub use crate::mysql::MysqlCommand;

// SQL types
pub use crate::sql::{is_sql, SqlNormalizer};

// Configuration and cache types
pub use crate::cache::{CacheStats, ContentKeyCache, LruContentKeyCache, NoCache};
pub use crate::config::{NormalizerConfig, PipelineConfig};

// Error types
pub use crate::error::{Error, Result};
