//! Protocol registry for managing decoders.

use std::sync::Arc;

use super::{CommandDissector, DispatchOutcome, ProtocolDecoder};
use crate::config::PipelineConfig;
use crate::message::PayloadMessage;
use crate::mysql::{self, MysqlCommand};
use crate::sql::SqlNormalizer;

/// Registry of protocol decoders, looked up by protocol name.
#[derive(Debug)]
pub struct ProtocolRegistry<D = MysqlCommand> {
    decoders: Vec<ProtocolDecoder<D>>,
}

impl<D: CommandDissector> ProtocolRegistry<D> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    /// Register a decoder, replacing any previous decoder for the same protocol.
    pub fn register(&mut self, decoder: ProtocolDecoder<D>) {
        self.decoders.retain(|d| d.protocol() != decoder.protocol());
        self.decoders.push(decoder);
    }

    /// Get a decoder by protocol name.
    pub fn get(&self, protocol: &str) -> Option<&ProtocolDecoder<D>> {
        self.decoders.iter().find(|d| d.protocol() == protocol)
    }

    /// Get all registered decoders.
    pub fn decoders(&self) -> impl Iterator<Item = &ProtocolDecoder<D>> {
        self.decoders.iter()
    }

    /// Decode a message as the named protocol.
    ///
    /// Returns None when no decoder is registered under that name.
    pub fn decode(&self, protocol: &str, msg: &mut PayloadMessage<'_>) -> Option<DispatchOutcome> {
        self.get(protocol).map(|decoder| decoder.decode(msg))
    }

    /// Get the number of registered decoders.
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl<D: CommandDissector> Default for ProtocolRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry with all built-in protocol decoders.
pub fn default_registry(
    normalizer: Arc<SqlNormalizer>,
    config: &PipelineConfig,
) -> ProtocolRegistry {
    let mut registry = ProtocolRegistry::new();
    registry.register(mysql::decoder(normalizer, config));
    registry
}
