//! l7dissect - Classify captured application-layer payloads.
//!
//! This crate wraps [`l7dissect_core`] with a command-line front end that
//! reads hex-encoded MySQL frames and prints how each one is classified.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use l7dissect::config::PipelineConfig;
//! use l7dissect::dissect::default_registry;
//! use l7dissect::message::PayloadMessage;
//! use l7dissect::sql::SqlNormalizer;
//!
//! let registry = default_registry(Arc::new(SqlNormalizer::default()), &PipelineConfig::default());
//! let mut msg = PayloadMessage::request(&[0x01, 0x00, 0x00, 0x00, 0x0e]);
//! let outcome = registry.decode("mysql", &mut msg).unwrap();
//! assert_eq!(outcome.dissector, Some("mysql_ping"));
//! ```

pub mod cli;

pub use l7dissect_core::{cache, config, dissect, error, format, message, mysql, sql};
pub use l7dissect_core::{Error, Result};
