//! Fuzz target for the MySQL request pipeline.
//!
//! Feeds arbitrary bytes through every request dissector:
//! - Command byte fastfail checks
//! - Query-attribute prefix skipping
//! - Lossy UTF-8 decoding and the SQL verb gate
//! - Content-key normalization of whatever text survives

#![no_main]

use std::sync::{Arc, OnceLock};

use libfuzzer_sys::fuzz_target;
use l7dissect_core::config::{NormalizerConfig, PipelineConfig};
use l7dissect_core::dissect::ProtocolDecoder;
use l7dissect_core::message::{names, PayloadMessage};
use l7dissect_core::mysql::{self, MysqlCommand};
use l7dissect_core::sql::SqlNormalizer;

fn decoder() -> &'static ProtocolDecoder<MysqlCommand> {
    static DECODER: OnceLock<ProtocolDecoder<MysqlCommand>> = OnceLock::new();
    DECODER.get_or_init(|| {
        // Small cache so eviction runs often
        let config = NormalizerConfig::default().with_cache_capacity(64);
        let normalizer = SqlNormalizer::new(config).expect("valid config");
        mysql::decoder(Arc::new(normalizer), &PipelineConfig::default())
    })
}

fuzz_target!(|data: &[u8]| {
    let mut msg = PayloadMessage::request(data);
    let outcome = decoder().decode(&mut msg);

    if data.len() < mysql::MIN_FRAME_LEN {
        assert!(!outcome.is_classified());
    }
    if !outcome.is_detailed() {
        assert!(!msg.attributes().contains(names::SQL));
    }
});
