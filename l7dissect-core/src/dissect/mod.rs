//! Command dissection framework.
//!
//! This module provides:
//! - [`CommandDissector`] trait for implementing per-command dissectors
//! - [`DispatchPipeline`] for trying dissectors in registration order
//! - [`ProtocolDecoder`] pairing a request and a response pipeline
//! - [`ProtocolRegistry`] mapping protocol names to decoders
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use l7dissect_core::config::PipelineConfig;
//! use l7dissect_core::dissect::default_registry;
//! use l7dissect_core::message::{names, PayloadMessage};
//! use l7dissect_core::sql::SqlNormalizer;
//!
//! let normalizer = Arc::new(SqlNormalizer::default());
//! let registry = default_registry(normalizer, &PipelineConfig::default());
//!
//! // COM_QUERY "SELECT 1"
//! let frame = [0x09, 0x00, 0x00, 0x00, 0x03, b'S', b'E', b'L', b'E', b'C', b'T', b' ', b'1'];
//! let mut msg = PayloadMessage::request(&frame);
//! let outcome = registry.decode("mysql", &mut msg).unwrap();
//!
//! assert!(outcome.is_detailed());
//! assert_eq!(msg.attributes().get_str(names::SQL), Some("SELECT 1"));
//! ```

mod pipeline;
mod registry;
mod stats;

pub use pipeline::{DispatchPipeline, ProtocolDecoder};
pub use registry::{default_registry, ProtocolRegistry};
pub use stats::{DecoderStats, DecoderStatsSnapshot};

use crate::message::PayloadMessage;

/// Result of one dissector's parse.
///
/// Replaces the `(matched, detailed)` flag pair; [`Verdict::from_flags`] and
/// the accessors keep that view available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The frame failed the dissector's own structural check.
    /// The pipeline moves on to the next dissector.
    Unmatched,
    /// Recognized, no attributes extracted.
    Coarse,
    /// Recognized and attributes extracted.
    Detailed,
    /// Structurally this command, but the content is invalid.
    /// Terminal: no other dissector is tried.
    Rejected,
}

impl Verdict {
    /// Build a verdict from the `(matched, detailed)` pair.
    pub fn from_flags(matched: bool, detailed: bool) -> Self {
        match (matched, detailed) {
            (false, false) => Verdict::Unmatched,
            (true, false) => Verdict::Coarse,
            (true, true) => Verdict::Detailed,
            (false, true) => Verdict::Rejected,
        }
    }

    #[inline]
    pub fn matched(self) -> bool {
        matches!(self, Verdict::Coarse | Verdict::Detailed)
    }

    #[inline]
    pub fn detailed(self) -> bool {
        matches!(self, Verdict::Detailed | Verdict::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Unmatched => "unmatched",
            Verdict::Coarse => "coarse",
            Verdict::Detailed => "detailed",
            Verdict::Rejected => "rejected",
        }
    }
}

/// Final state of a message after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// No dissector accepted the message.
    Unclassified,
    /// A dissector accepted the message.
    Classified { detailed: bool },
    /// A dissector recognized the command but found invalid content.
    Rejected,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Unclassified => "unclassified",
            Classification::Classified { detailed: false } => "coarse",
            Classification::Classified { detailed: true } => "detailed",
            Classification::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the pipeline decided, and which dissector decided it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub classification: Classification,
    pub dissector: Option<&'static str>,
}

impl DispatchOutcome {
    pub fn unclassified() -> Self {
        Self {
            classification: Classification::Unclassified,
            dissector: None,
        }
    }

    /// Outcome for a terminal verdict; None for [`Verdict::Unmatched`].
    pub fn from_verdict(verdict: Verdict, dissector: &'static str) -> Option<Self> {
        let classification = match verdict {
            Verdict::Unmatched => return None,
            Verdict::Coarse => Classification::Classified { detailed: false },
            Verdict::Detailed => Classification::Classified { detailed: true },
            Verdict::Rejected => Classification::Rejected,
        };
        Some(Self {
            classification,
            dissector: Some(dissector),
        })
    }

    #[inline]
    pub fn is_classified(&self) -> bool {
        matches!(self.classification, Classification::Classified { .. })
    }

    #[inline]
    pub fn is_detailed(&self) -> bool {
        matches!(
            self.classification,
            Classification::Classified { detailed: true }
        )
    }

    #[inline]
    pub fn is_rejected(&self) -> bool {
        self.classification == Classification::Rejected
    }
}

/// Core trait all command dissectors implement.
///
/// Dissectors are constructed once, hold no per-message state and are called
/// concurrently from many threads.
pub trait CommandDissector: Send + Sync {
    /// Unique identifier within its protocol (e.g. "mysql_query").
    fn name(&self) -> &'static str;

    /// Human-readable display name.
    fn display_name(&self) -> &'static str {
        self.name()
    }

    /// Cheap structural pre-check. True means "definitely not this command".
    ///
    /// Must only look at a small fixed prefix of the payload and must not
    /// read out of bounds.
    fn fastfail(&self, msg: &PayloadMessage<'_>) -> bool;

    /// Extract attributes. Must never panic, whatever the payload bytes.
    fn parse(&self, msg: &mut PayloadMessage<'_>) -> Verdict;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_flags() {
        for verdict in [
            Verdict::Unmatched,
            Verdict::Coarse,
            Verdict::Detailed,
            Verdict::Rejected,
        ] {
            assert_eq!(
                Verdict::from_flags(verdict.matched(), verdict.detailed()),
                verdict
            );
        }
        assert!(!Verdict::Rejected.matched());
        assert!(Verdict::Rejected.detailed());
    }

    #[test]
    fn test_outcome_from_verdict() {
        assert!(DispatchOutcome::from_verdict(Verdict::Unmatched, "x").is_none());

        let outcome = DispatchOutcome::from_verdict(Verdict::Coarse, "x").unwrap();
        assert!(outcome.is_classified());
        assert!(!outcome.is_detailed());
        assert_eq!(outcome.dissector, Some("x"));

        let outcome = DispatchOutcome::from_verdict(Verdict::Rejected, "x").unwrap();
        assert!(outcome.is_rejected());
        assert_eq!(outcome.classification.to_string(), "rejected");
    }
}
