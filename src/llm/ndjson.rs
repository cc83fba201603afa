//! Incremental newline-delimited JSON decoding
//!
//! Bytes arrive in arbitrary chunks; a line (and any multi-byte UTF-8
//! sequence inside it) may be split across several of them. The decoder only
//! buffers the unfinished tail of the current line.

use serde::de::DeserializeOwned;

/// Longest line kept in memory; anything longer is dropped unparsed
const MAX_LINE_BYTES: usize = 1 << 20;

#[derive(Debug)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to hold no newline
    scanned: usize,
    /// Set while skipping the rest of an oversized line
    discarding: bool,
    max_line: usize,
}

impl Default for NdjsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            discarding: false,
            max_line: MAX_LINE_BYTES,
        }
    }

    /// Feed a chunk of bytes, returning every complete line that decoded.
    ///
    /// Blank, undecodable and oversized lines are dropped. Only the bytes
    /// added since the last call are searched for line breaks.
    pub fn push<T: DeserializeOwned>(&mut self, bytes: &[u8]) -> Vec<T> {
        self.buffer.extend_from_slice(bytes);

        let mut decoded = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.buffer[from..].iter().position(|&b| b == b'\n') {
            let end = from + offset;
            if self.discarding {
                self.discarding = false;
            } else if let Some(item) = decode_line(&self.buffer[start..end]) {
                decoded.push(item);
            }
            start = end + 1;
            from = start;
        }
        self.buffer.drain(..start);
        self.scanned = self.buffer.len();

        if self.buffer.len() > self.max_line {
            tracing::warn!(
                bytes = self.buffer.len(),
                limit = self.max_line,
                "Dropping oversized stream line"
            );
            self.buffer.clear();
            self.scanned = 0;
            self.discarding = true;
        }
        decoded
    }

    /// Decode whatever is left once the body ends without a final newline.
    pub fn finish<T: DeserializeOwned>(&mut self) -> Option<T> {
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        if std::mem::take(&mut self.discarding) {
            return None;
        }
        decode_line(&rest)
    }

    /// Bytes of the current unfinished line
    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn decode_line<T: DeserializeOwned>(line: &[u8]) -> Option<T> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_slice(line) {
        Ok(item) => Some(item),
        Err(e) => {
            tracing::debug!(
                error = %e,
                line = %String::from_utf8_lossy(line),
                "Skipping undecodable stream line"
            );
            None
        }
    }
}
