//! Incremental splitting of a byte stream into JSON values.
//!
//! The subscription body is a sequence of JSON documents with no guaranteed
//! separator, delivered in arbitrary chunks. [`JsonStreamDecoder`] buffers
//! chunks and yields one complete value at a time.

use serde::de::Error as _;
use serde_json::Value;

/// Buffering decoder for back-to-back JSON values.
#[derive(Debug, Default)]
pub struct JsonStreamDecoder {
    buf: Vec<u8>,
    limit: Option<usize>,
}

impl JsonStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A decoder that fails once a single incomplete value holds more than
    /// `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit: Some(limit),
        }
    }

    /// Append a chunk read from the stream.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Number of buffered bytes not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// True when nothing but whitespace is buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.iter().all(u8::is_ascii_whitespace)
    }

    /// Take the next complete value off the buffer.
    ///
    /// `Ok(None)` means more input is needed. A syntax error, or a pending
    /// value past the size limit, is returned as an error and leaves the
    /// buffer untouched.
    pub fn next_value(&mut self) -> Result<Option<Value>, serde_json::Error> {
        let parsed = {
            let mut values = serde_json::Deserializer::from_slice(&self.buf).into_iter::<Value>();
            match values.next() {
                None => None,
                Some(Err(e)) if e.is_eof() => return self.need_more(),
                Some(Err(e)) => return Err(e),
                Some(Ok(value)) => Some((value, values.byte_offset())),
            }
        };
        let Some((value, consumed)) = parsed else {
            self.buf.clear();
            return Ok(None);
        };

        // A number running into the end of the buffer may still be growing.
        if value.is_number() && consumed == self.buf.len() {
            return self.need_more();
        }

        self.buf.drain(..consumed);
        Ok(Some(value))
    }

    fn need_more(&self) -> Result<Option<Value>, serde_json::Error> {
        match self.limit {
            Some(limit) if self.buf.len() > limit => Err(serde_json::Error::custom(format!(
                "pending message exceeds {limit} bytes"
            ))),
            _ => Ok(None),
        }
    }
}
