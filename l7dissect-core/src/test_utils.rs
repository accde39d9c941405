//! Test utilities for command dissection.
//!
//! Provides builders for MySQL wire frames and helpers for running a single
//! dissector over a buffer.

use crate::dissect::{CommandDissector, Verdict};
use crate::message::{Attributes, Direction, PayloadMessage};
use crate::mysql::{command, response_code};

/// Builder for constructing MySQL packets (header + payload).
#[derive(Debug, Clone, Default)]
pub struct MysqlFrameBuilder {
    sequence_id: u8,
    payload: Vec<u8>,
    length_override: Option<u32>,
}

impl MysqlFrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequence_id(mut self, sequence_id: u8) -> Self {
        self.sequence_id = sequence_id;
        self
    }

    /// Start the payload with a command byte.
    pub fn command(mut self, command: u8) -> Self {
        self.payload.insert(0, command);
        self
    }

    pub fn payload(mut self, payload: &[u8]) -> Self {
        self.payload.extend_from_slice(payload);
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.payload(text.as_bytes())
    }

    /// Write this value into the header instead of the real payload length.
    pub fn length(mut self, length: u32) -> Self {
        self.length_override = Some(length);
        self
    }

    pub fn query(sql: &str) -> Self {
        Self::new().command(command::COM_QUERY).text(sql)
    }

    pub fn prepare(sql: &str) -> Self {
        Self::new().command(command::COM_STMT_PREPARE).text(sql)
    }

    pub fn quit() -> Self {
        Self::new().command(command::COM_QUIT)
    }

    /// OK packet with a one-byte affected-rows count.
    pub fn ok(affected_rows: u8) -> Self {
        Self::new()
            .sequence_id(1)
            .command(response_code::OK)
            .payload(&[affected_rows, 0x00, 0x02, 0x00, 0x00, 0x00])
    }

    /// ERR packet, with SQL state marker when `sql_state` is given.
    pub fn err(code: u16, sql_state: Option<&str>, message: &str) -> Self {
        let mut builder = Self::new()
            .sequence_id(1)
            .command(response_code::ERR)
            .payload(&code.to_le_bytes());
        if let Some(state) = sql_state {
            builder = builder.payload(b"#").text(state);
        }
        builder.text(message)
    }

    /// Protocol 4.1 EOF packet.
    pub fn eof() -> Self {
        Self::new()
            .sequence_id(1)
            .command(response_code::EOF)
            .payload(&[0x00, 0x00, 0x02, 0x00])
    }

    pub fn build(self) -> Vec<u8> {
        let length = self.length_override.unwrap_or(self.payload.len() as u32);
        let mut frame = Vec::with_capacity(4 + self.payload.len());
        frame.extend_from_slice(&length.to_le_bytes()[..3]);
        frame.push(self.sequence_id);
        frame.extend_from_slice(&self.payload);
        frame
    }
}

/// Run fastfail then parse of one dissector, the way a pipeline would.
///
/// Returns None when fastfail rejects the frame.
pub fn run_dissector<D: CommandDissector>(
    dissector: &D,
    data: &[u8],
    direction: Direction,
) -> Option<(Verdict, Attributes)> {
    let mut msg = PayloadMessage::new(data, direction);
    if dissector.fastfail(&msg) {
        return None;
    }
    let verdict = dissector.parse(&mut msg);
    Some((verdict, msg.into_attributes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_header() {
        let frame = MysqlFrameBuilder::query("SELECT 1").build();
        assert_eq!(&frame[..5], &[9, 0, 0, 0, 0x03]);
        assert_eq!(&frame[5..], b"SELECT 1");
    }

    #[test]
    fn test_length_override() {
        let frame = MysqlFrameBuilder::quit().sequence_id(7).length(0x010203).build();
        assert_eq!(frame, vec![0x03, 0x02, 0x01, 7, 0x01]);
    }

    #[test]
    fn test_err_layout() {
        let frame = MysqlFrameBuilder::err(1146, Some("42S02"), "no table").build();
        assert_eq!(frame[4], 0xff);
        assert_eq!(u16::from_le_bytes([frame[5], frame[6]]), 1146);
        assert_eq!(frame[7], b'#');
        assert_eq!(&frame[8..13], b"42S02");
        assert_eq!(&frame[13..], b"no table");
    }
}
