//! Server response dissectors.

use super::{
    command_of, payload_length, read_lenenc_int, response_code, COMMAND_OFFSET, MIN_FRAME_LEN,
};
use crate::dissect::{CommandDissector, Verdict};
use crate::message::{names, PayloadMessage};

const AFFECTED_ROWS_OFFSET: usize = COMMAND_OFFSET + 1;

const ERROR_CODE_OFFSET: usize = COMMAND_OFFSET + 1;
const ERROR_CODE_LEN: usize = 2;
const SQL_STATE_OFFSET: usize = ERROR_CODE_OFFSET + ERROR_CODE_LEN;
const SQL_STATE_MARKER: u8 = b'#';
/// Marker plus the 5-character state.
const SQL_STATE_LEN: usize = 6;

/// EOF packets are shorter than this; longer `0xfe` payloads are rows.
const EOF_MAX_PAYLOAD: u32 = 9;

/// Any server frame long enough to carry a response code.
///
/// Registered as the fallback of the response pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlResponse;

impl CommandDissector for MysqlResponse {
    fn name(&self) -> &'static str {
        "mysql_response"
    }

    fn display_name(&self) -> &'static str {
        "MySQL response"
    }

    fn fastfail(&self, msg: &PayloadMessage<'_>) -> bool {
        msg.len() < MIN_FRAME_LEN
    }

    fn parse(&self, msg: &mut PayloadMessage<'_>) -> Verdict {
        if msg.len() < MIN_FRAME_LEN {
            return Verdict::Unmatched;
        }
        Verdict::Coarse
    }
}

/// OK packet: `0x00`, affected rows, last insert id, status, warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlOk;

impl CommandDissector for MysqlOk {
    fn name(&self) -> &'static str {
        "mysql_ok"
    }

    fn display_name(&self) -> &'static str {
        "OK_Packet"
    }

    fn fastfail(&self, msg: &PayloadMessage<'_>) -> bool {
        command_of(msg) != Some(response_code::OK)
    }

    fn parse(&self, msg: &mut PayloadMessage<'_>) -> Verdict {
        let Some(rest) = msg.tail(AFFECTED_ROWS_OFFSET) else {
            return Verdict::Unmatched;
        };
        if let Some((rows, _)) = read_lenenc_int(rest) {
            let rows = i64::try_from(rows).unwrap_or(i64::MAX);
            msg.add_int_attribute(names::SQL_AFFECTED_ROWS, rows);
        }
        Verdict::Detailed
    }
}

/// ERR packet: `0xff`, error code, optional `#` + SQL state, message.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlErr;

impl CommandDissector for MysqlErr {
    fn name(&self) -> &'static str {
        "mysql_err"
    }

    fn display_name(&self) -> &'static str {
        "ERR_Packet"
    }

    fn fastfail(&self, msg: &PayloadMessage<'_>) -> bool {
        command_of(msg) != Some(response_code::ERR)
    }

    fn parse(&self, msg: &mut PayloadMessage<'_>) -> Verdict {
        let data = msg.data();
        if data.len() < MIN_FRAME_LEN {
            return Verdict::Unmatched;
        }
        let Some(&[lo, hi]) = data.get(ERROR_CODE_OFFSET..SQL_STATE_OFFSET) else {
            return Verdict::Rejected;
        };
        msg.add_int_attribute(names::SQL_ERROR_CODE, i64::from(u16::from_le_bytes([lo, hi])));

        let has_state = data.len() >= SQL_STATE_OFFSET + SQL_STATE_LEN
            && data[SQL_STATE_OFFSET] == SQL_STATE_MARKER;
        let message_offset = if has_state {
            SQL_STATE_OFFSET + SQL_STATE_LEN
        } else {
            SQL_STATE_OFFSET
        };
        if let Some(message) = data.get(message_offset..).filter(|m| !m.is_empty()) {
            msg.add_string_attribute(names::SQL_ERROR_MSG, &*String::from_utf8_lossy(message));
        }
        Verdict::Detailed
    }
}

/// EOF packet: `0xfe` with a payload shorter than 9 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlEof;

impl CommandDissector for MysqlEof {
    fn name(&self) -> &'static str {
        "mysql_eof"
    }

    fn display_name(&self) -> &'static str {
        "EOF_Packet"
    }

    fn fastfail(&self, msg: &PayloadMessage<'_>) -> bool {
        command_of(msg) != Some(response_code::EOF)
            || payload_length(msg.data()).map_or(true, |len| len >= EOF_MAX_PAYLOAD)
    }

    fn parse(&self, msg: &mut PayloadMessage<'_>) -> Verdict {
        if msg.len() < MIN_FRAME_LEN {
            return Verdict::Unmatched;
        }
        Verdict::Detailed
    }
}
