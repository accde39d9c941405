//! Payload messages handed to the dissectors.
//!
//! A [`PayloadMessage`] borrows the captured bytes of one direction of one
//! connection and owns the [`Attributes`] that dissectors write. The bytes are
//! never modified; everything a dissector learns is expressed as attributes.

mod attribute;

use compact_str::CompactString;

pub use attribute::{names, AttributeEntry, AttributeValue, Attributes};

/// Direction of a payload relative to the connection initiator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Client to server.
    Request,
    /// Server to client.
    Response,
}

impl Direction {
    /// Return a string representation of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Request => "request",
            Direction::Response => "response",
        }
    }
}

/// One assembled application-layer payload plus its attribute sink.
#[derive(Debug, Clone)]
pub struct PayloadMessage<'data> {
    data: &'data [u8],
    direction: Direction,
    attributes: Attributes,
}

impl<'data> PayloadMessage<'data> {
    pub fn new(data: &'data [u8], direction: Direction) -> Self {
        Self {
            data,
            direction,
            attributes: Attributes::new(),
        }
    }

    /// Message travelling from client to server.
    pub fn request(data: &'data [u8]) -> Self {
        Self::new(data, Direction::Request)
    }

    /// Message travelling from server to client.
    pub fn response(data: &'data [u8]) -> Self {
        Self::new(data, Direction::Response)
    }

    #[inline]
    pub fn data(&self) -> &'data [u8] {
        self.data
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Byte at `offset`, or None past the end of the payload.
    #[inline]
    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        self.data.get(offset).copied()
    }

    /// Bytes from `offset` to the end, or None if `offset` is past the end.
    #[inline]
    pub fn tail(&self, offset: usize) -> Option<&'data [u8]> {
        self.data.get(offset..)
    }

    pub fn add_string_attribute(&mut self, name: &'static str, value: impl Into<CompactString>) {
        self.attributes
            .insert(name, AttributeValue::Str(value.into()));
    }

    pub fn add_bool_attribute(&mut self, name: &'static str, value: bool) {
        self.attributes.insert(name, AttributeValue::Bool(value));
    }

    pub fn add_int_attribute(&mut self, name: &'static str, value: i64) {
        self.attributes.insert(name, AttributeValue::Int(value));
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Release the bytes and keep only the decoded attributes.
    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_checked_access() {
        let data = [0x01, 0x00, 0x00, 0x00, 0x03];
        let msg = PayloadMessage::request(&data);

        assert_eq!(msg.byte_at(4), Some(0x03));
        assert_eq!(msg.byte_at(5), None);
        assert_eq!(msg.tail(5), Some(&b""[..]));
        assert_eq!(msg.tail(6), None);
    }

    #[test]
    fn test_attribute_sink() {
        let mut msg = PayloadMessage::request(b"");
        msg.add_string_attribute(names::SQL, "SELECT 1");
        msg.add_bool_attribute(names::ONEWAY, true);
        msg.add_int_attribute(names::SQL_ERROR_CODE, 1146);

        let attrs = msg.into_attributes();
        assert_eq!(attrs.get_str(names::SQL), Some("SELECT 1"));
        assert_eq!(attrs.get_bool(names::ONEWAY), Some(true));
        assert_eq!(attrs.get_int(names::SQL_ERROR_CODE), Some(1146));
    }

    #[test]
    fn test_direction_constructors() {
        assert_eq!(PayloadMessage::request(b"").direction(), Direction::Request);
        assert_eq!(PayloadMessage::response(b"").direction(), Direction::Response);
        assert_eq!(Direction::Response.as_str(), "response");
    }
}
