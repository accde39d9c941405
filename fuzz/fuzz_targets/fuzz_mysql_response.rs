//! Fuzz target for the MySQL response pipeline.
//!
//! Exercises OK packet length-encoded integers, ERR packet code/state/message
//! slicing, and the EOF payload-length check.

#![no_main]

use libfuzzer_sys::fuzz_target;
use l7dissect_core::config::PipelineConfig;
use l7dissect_core::message::PayloadMessage;
use l7dissect_core::mysql;

fuzz_target!(|data: &[u8]| {
    let pipeline = mysql::response_pipeline(&PipelineConfig::default());
    let mut msg = PayloadMessage::response(data);
    let outcome = pipeline.dispatch(&mut msg);

    if data.len() < mysql::MIN_FRAME_LEN {
        assert!(!outcome.is_classified());
        assert!(msg.attributes().is_empty());
    }
});
