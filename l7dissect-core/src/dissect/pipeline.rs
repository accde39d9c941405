//! Fastfail/parse dispatch.

use tracing::{debug, trace};

use super::{CommandDissector, DecoderStats, DispatchOutcome};
use crate::message::{Direction, PayloadMessage};

/// Ordered list of dissectors for one protocol and one direction.
///
/// Dissectors are tried in registration order. The first one whose fastfail
/// passes and whose parse returns anything but [`Verdict::Unmatched`]
/// decides the outcome. The fallback, if any, runs last and is subject to its
/// own fastfail.
///
/// [`Verdict::Unmatched`]: super::Verdict::Unmatched
#[derive(Debug)]
pub struct DispatchPipeline<D> {
    protocol: &'static str,
    direction: Direction,
    dissectors: Vec<D>,
    fallback: Option<D>,
    stats: DecoderStats,
}

impl<D: CommandDissector> DispatchPipeline<D> {
    /// Create an empty pipeline.
    pub fn new(protocol: &'static str, direction: Direction) -> Self {
        Self {
            protocol,
            direction,
            dissectors: Vec::new(),
            fallback: None,
            stats: DecoderStats::new(),
        }
    }

    /// Register a dissector. Registration order is dispatch order.
    pub fn register<T: Into<D>>(&mut self, dissector: T) {
        let dissector = dissector.into();
        self.stats.track(dissector.name());
        self.dissectors.push(dissector);
    }

    /// Set the catch-all dissector tried after all registered ones.
    pub fn set_fallback<T: Into<D>>(&mut self, dissector: T) {
        let dissector = dissector.into();
        self.stats.track(dissector.name());
        self.fallback = Some(dissector);
    }

    pub fn protocol(&self) -> &'static str {
        self.protocol
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Registered dissectors in dispatch order (fallback excluded).
    pub fn dissectors(&self) -> impl Iterator<Item = &D> {
        self.dissectors.iter()
    }

    pub fn fallback(&self) -> Option<&D> {
        self.fallback.as_ref()
    }

    /// Number of dissectors including the fallback.
    pub fn len(&self) -> usize {
        self.dissectors.len() + usize::from(self.fallback.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    /// Classify one message, writing attributes into it.
    ///
    /// A message travelling in the other direction is left untouched and
    /// reported as unclassified.
    pub fn dispatch(&self, msg: &mut PayloadMessage<'_>) -> DispatchOutcome {
        if msg.direction() != self.direction {
            return DispatchOutcome::unclassified();
        }

        let outcome = self
            .dissectors
            .iter()
            .chain(self.fallback.iter())
            .find_map(|dissector| self.try_dissector(dissector, msg))
            .unwrap_or_else(DispatchOutcome::unclassified);

        if outcome.is_rejected() {
            debug!(
                protocol = self.protocol,
                dissector = outcome.dissector,
                len = msg.len(),
                "payload rejected"
            );
        }
        self.stats.record(outcome.classification, outcome.dissector);
        outcome
    }

    fn try_dissector(
        &self,
        dissector: &D,
        msg: &mut PayloadMessage<'_>,
    ) -> Option<DispatchOutcome> {
        if dissector.fastfail(msg) {
            trace!(protocol = self.protocol, dissector = dissector.name(), "fastfail");
            return None;
        }
        DispatchOutcome::from_verdict(dissector.parse(msg), dissector.name())
    }
}

/// Request and response pipelines of one protocol.
#[derive(Debug)]
pub struct ProtocolDecoder<D> {
    request: DispatchPipeline<D>,
    response: DispatchPipeline<D>,
}

impl<D: CommandDissector> ProtocolDecoder<D> {
    /// Pair two pipelines. They must share a protocol name.
    pub fn new(request: DispatchPipeline<D>, response: DispatchPipeline<D>) -> Self {
        debug_assert_eq!(request.protocol(), response.protocol());
        debug_assert_eq!(request.direction(), Direction::Request);
        debug_assert_eq!(response.direction(), Direction::Response);
        Self { request, response }
    }

    pub fn protocol(&self) -> &'static str {
        self.request.protocol()
    }

    /// The pipeline handling one direction.
    pub fn pipeline(&self, direction: Direction) -> &DispatchPipeline<D> {
        match direction {
            Direction::Request => &self.request,
            Direction::Response => &self.response,
        }
    }

    /// Route a message to the pipeline matching its direction hint.
    pub fn decode(&self, msg: &mut PayloadMessage<'_>) -> DispatchOutcome {
        self.pipeline(msg.direction()).dispatch(msg)
    }
}
