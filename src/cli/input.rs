//! Hex frame input.

use std::io::BufRead;

use l7dissect_core::format::{decode_hex_line, strip_comment};
use l7dissect_core::Error;

/// One decoded input frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 1-based line number in the input.
    pub line: usize,
    pub data: Vec<u8>,
}

/// Iterator over the frames of a hex text stream.
///
/// Blank lines and `#` comments are skipped. A malformed line yields an
/// error and iteration continues with the next line.
pub struct FrameReader<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for FrameReader<R> {
    type Item = Result<Frame, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line += 1;

            let text = strip_comment(&self.buf);
            if text.trim().is_empty() {
                continue;
            }
            return Some(
                decode_hex_line(text, self.line)
                    .map(|data| Frame {
                        line: self.line,
                        data,
                    })
                    .map_err(Error::from),
            );
        }
    }
}
