//! Positional binary record stream.
//!
//! Primitive layout (little-endian throughout):
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ i32 / i64    4 / 8 bytes                     │
//! │ bool         1 byte, 0 or 1                  │
//! │ string       u32 byte length + UTF-8 bytes   │
//! │ uri          string; "" = absent             │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! There is no framing, no field names and no versioning: the writer and the
//! reader agree on one fixed field order per record type (see
//! [`settings`](super::settings) and [`attachment`](super::attachment)).
//! Streams are produced and consumed by the same system; a short or corrupt
//! stream is a caller bug, and the reader panics rather than reporting a
//! recoverable error.

use byteorder::{ByteOrder, LittleEndian};
use url::Url;

/// Appends primitives to a byte buffer in call order.
#[derive(Debug, Default)]
pub struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the writer, yielding the encoded stream.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_i32(&mut self, value: i32) {
        let mut b = [0u8; 4];
        LittleEndian::write_i32(&mut b, value);
        self.buf.extend_from_slice(&b);
    }

    pub fn write_i64(&mut self, value: i64) {
        let mut b = [0u8; 8];
        LittleEndian::write_i64(&mut b, value);
        self.buf.extend_from_slice(&b);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    pub fn write_str(&mut self, value: &str) {
        let mut b = [0u8; 4];
        LittleEndian::write_u32(&mut b, value.len() as u32);
        self.buf.extend_from_slice(&b);
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// URI as its string form; the empty string is the absent sentinel.
    pub fn write_opt_uri(&mut self, value: Option<&Url>) {
        match value {
            Some(uri) => self.write_str(uri.as_str()),
            None => self.write_str(""),
        }
    }

    /// Optional string with the empty-string absent sentinel, mirroring
    /// [`write_opt_uri`](Self::write_opt_uri).
    pub fn write_opt_str(&mut self, value: Option<&str>) {
        self.write_str(value.unwrap_or(""));
    }
}

/// Reads primitives off a byte slice in call order.
///
/// # Panics
///
/// Every read panics if the stream is exhausted or a string is not valid
/// UTF-8. Binary streams come from this system's own writer; feeding the
/// reader anything else violates its precondition.
#[derive(Debug)]
pub struct RecordReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Whether every byte has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.data.len()
    }

    fn take(&mut self, len: usize) -> &'a [u8] {
        match self.data.get(self.pos..self.pos + len) {
            Some(bytes) => {
                self.pos += len;
                bytes
            }
            None => panic!(
                "truncated record stream: wanted {len} bytes at offset {}, have {}",
                self.pos,
                self.data.len() - self.pos
            ),
        }
    }

    pub fn read_i32(&mut self) -> i32 {
        LittleEndian::read_i32(self.take(4))
    }

    pub fn read_i64(&mut self) -> i64 {
        LittleEndian::read_i64(self.take(8))
    }

    pub fn read_bool(&mut self) -> bool {
        self.take(1)[0] != 0
    }

    pub fn read_string(&mut self) -> String {
        let len = LittleEndian::read_u32(self.take(4)) as usize;
        let bytes = self.take(len);
        match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(e) => panic!("corrupt record stream: string is not UTF-8: {e}"),
        }
    }

    /// Counterpart of [`RecordWriter::write_opt_uri`]. An unparseable
    /// non-empty URI decodes as absent (optional-field rule), not as a
    /// stream error.
    pub fn read_opt_uri(&mut self) -> Option<Url> {
        let s = self.read_string();
        if s.is_empty() {
            return None;
        }
        match Url::parse(&s) {
            Ok(uri) => Some(uri),
            Err(e) => {
                tracing::debug!(uri = %s, error = %e, "Dropping unparseable URI field");
                None
            }
        }
    }

    /// Counterpart of [`RecordWriter::write_opt_str`].
    pub fn read_opt_string(&mut self) -> Option<String> {
        let s = self.read_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }
}
