//! MySQL client/server protocol dissectors.
//!
//! Every MySQL packet starts with a 4-byte header:
//!
//! ```text
//! int<3>  payload_length
//! int<1>  sequence_id
//! payload
//! ```
//!
//! The first payload byte (absolute offset 4) is the command byte of a client
//! request, or the response code of a server reply. Dissectors only look at a
//! single packet; multi-packet statements are not reassembled.

mod builtin;
mod request;
mod response;

use std::sync::Arc;

pub use builtin::MysqlCommand;
pub use request::{
    MysqlInitDb, MysqlPing, MysqlPrepare, MysqlQuery, MysqlQuit, MysqlRequest, MysqlStmtClose,
};
pub use response::{MysqlEof, MysqlErr, MysqlOk, MysqlResponse};

use crate::config::PipelineConfig;
use crate::dissect::{DispatchPipeline, ProtocolDecoder};
use crate::message::{Direction, PayloadMessage};
use crate::sql::SqlNormalizer;

/// Protocol name used in the registry.
pub const PROTOCOL: &str = "mysql";

/// Packet header length (payload length + sequence id).
pub const HEADER_LEN: usize = 4;

/// Offset of the command byte / response code.
pub const COMMAND_OFFSET: usize = 4;

/// Shortest frame carrying a command byte.
pub const MIN_FRAME_LEN: usize = 5;

/// Client command bytes.
pub mod command {
    pub const COM_QUIT: u8 = 0x01;
    pub const COM_INIT_DB: u8 = 0x02;
    pub const COM_QUERY: u8 = 0x03;
    pub const COM_PING: u8 = 0x0e;
    pub const COM_STMT_PREPARE: u8 = 0x16;
    pub const COM_STMT_CLOSE: u8 = 0x19;
}

/// Server response codes.
pub mod response_code {
    pub const OK: u8 = 0x00;
    pub const EOF: u8 = 0xfe;
    pub const ERR: u8 = 0xff;
}

/// Command byte of a frame, or None for frames shorter than [`MIN_FRAME_LEN`].
#[inline]
pub fn command_of(msg: &PayloadMessage<'_>) -> Option<u8> {
    msg.byte_at(COMMAND_OFFSET)
}

/// Payload length declared in the packet header.
pub fn payload_length(data: &[u8]) -> Option<u32> {
    match data {
        [a, b, c, ..] => Some(u32::from_le_bytes([*a, *b, *c, 0])),
        _ => None,
    }
}

/// Decode a length-encoded integer.
///
/// Returns the value and the number of bytes consumed, or None when the
/// buffer is empty, truncated, or holds the NULL marker (`0xfb`).
pub fn read_lenenc_int(data: &[u8]) -> Option<(u64, usize)> {
    let (&first, rest) = data.split_first()?;
    let width = match first {
        0x00..=0xfa => return Some((u64::from(first), 1)),
        0xfc => 2,
        0xfd => 3,
        0xfe => 8,
        _ => return None,
    };
    let bytes = rest.get(..width)?;
    let mut buf = [0u8; 8];
    buf[..width].copy_from_slice(bytes);
    Some((u64::from_le_bytes(buf), 1 + width))
}

/// Request pipeline: the core commands first, then the extra commands, then
/// the generic request as fallback.
pub fn request_pipeline(
    normalizer: Arc<SqlNormalizer>,
    config: &PipelineConfig,
) -> DispatchPipeline<MysqlCommand> {
    let mut pipeline = DispatchPipeline::new(PROTOCOL, Direction::Request);

    pipeline.register(MysqlPrepare::new(Arc::clone(&normalizer)));
    pipeline.register(MysqlQuery::new(normalizer));
    pipeline.register(MysqlQuit);

    pipeline.register(MysqlInitDb);
    pipeline.register(MysqlPing);
    pipeline.register(MysqlStmtClose);

    if config.use_fallback {
        pipeline.set_fallback(MysqlRequest);
    }
    pipeline
}

/// Response pipeline: OK, ERR and EOF packets, then the generic response.
pub fn response_pipeline(config: &PipelineConfig) -> DispatchPipeline<MysqlCommand> {
    let mut pipeline = DispatchPipeline::new(PROTOCOL, Direction::Response);

    pipeline.register(MysqlOk);
    pipeline.register(MysqlErr);
    pipeline.register(MysqlEof);

    if config.use_fallback {
        pipeline.set_fallback(MysqlResponse);
    }
    pipeline
}

/// Both MySQL pipelines as one decoder.
pub fn decoder(
    normalizer: Arc<SqlNormalizer>,
    config: &PipelineConfig,
) -> ProtocolDecoder<MysqlCommand> {
    ProtocolDecoder::new(
        request_pipeline(normalizer, config),
        response_pipeline(config),
    )
}
