/*
[INPUT]:  Arbitrary body chunks from a streaming response
[OUTPUT]: Complete newline-terminated lines
[POS]:    Stream layer - line framing across chunk boundaries
[UPDATE]: When the stream line format changes
*/

use crate::http::{OandaError, Result};

/// Longest line accepted by default; stream lines are a few hundred bytes
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Splits a chunked body into non-empty lines
#[derive(Debug)]
pub struct LineFramer {
    buffer: Vec<u8>,
    /// Bytes of `buffer` already known to hold no newline
    scanned: usize,
    max_line: usize,
    /// Dropping the rest of an over-long line until its newline arrives
    discarding: bool,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::with_max_line(DEFAULT_MAX_LINE_BYTES)
    }
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            max_line: max_line.max(1),
            discarding: false,
        }
    }

    /// Feed a chunk and collect every line it completes.
    ///
    /// A line longer than the limit yields one `InvalidResponse` and is
    /// skipped up to its newline.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<Vec<u8>>> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        let mut start = 0;

        while let Some(offset) = self.buffer[self.scanned..].iter().position(|byte| *byte == b'\n') {
            let end = self.scanned + offset;
            if self.discarding {
                self.discarding = false;
            } else if end - start > self.max_line {
                lines.push(Err(self.too_long()));
            } else if let Some(line) = clean(&self.buffer[start..end]) {
                lines.push(Ok(line));
            }
            start = end + 1;
            self.scanned = start;
        }

        self.buffer.drain(..start);
        self.scanned = self.buffer.len();

        if self.buffer.len() > self.max_line {
            if !self.discarding {
                lines.push(Err(self.too_long()));
                self.discarding = true;
            }
            self.buffer.clear();
            self.scanned = 0;
        }
        lines
    }

    /// Flush the unterminated tail once the body has ended
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        let tail = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        if std::mem::take(&mut self.discarding) {
            return None;
        }
        clean(&tail)
    }

    /// Bytes buffered without a terminating newline
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn too_long(&self) -> OandaError {
        OandaError::InvalidResponse(format!("stream line exceeds {} bytes", self.max_line))
    }
}

fn clean(line: &[u8]) -> Option<Vec<u8>> {
    let mut end = line.len();
    while end > 0 && (line[end - 1] == b'\r' || line[end - 1] == b'\n') {
        end -= 1;
    }
    let line = &line[..end];
    if line.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        Some(line.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_lines(results: Vec<Result<Vec<u8>>>) -> Vec<Vec<u8>> {
        results.into_iter().map(|line| line.expect("line")).collect()
    }

    #[test]
    fn test_lines_split_across_chunks() {
        let mut framer = LineFramer::new();
        assert!(framer.push(b"{\"tick\":{\"instr").is_empty());
        assert_eq!(framer.pending(), 15);

        let lines = ok_lines(framer.push(b"ument\":\"EUR_USD\"}}\n{\"heartbeat\":{}}\n{\"par"));
        assert_eq!(
            lines,
            vec![
                b"{\"tick\":{\"instrument\":\"EUR_USD\"}}".to_vec(),
                b"{\"heartbeat\":{}}".to_vec(),
            ]
        );
        assert_eq!(framer.finish(), Some(b"{\"par".to_vec()));
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let mut framer = LineFramer::new();
        let lines = ok_lines(framer.push(b"\r\n\n{\"a\":1}\r\n   \n"));
        assert_eq!(lines, vec![b"{\"a\":1}".to_vec()]);
        assert_eq!(framer.finish(), None);
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut framer = LineFramer::new();
        let mut lines = Vec::new();
        for byte in b"{\"a\":1}\r\n{\"b\":2}\n" {
            lines.extend(ok_lines(framer.push(std::slice::from_ref(byte))));
        }
        assert_eq!(lines, vec![b"{\"a\":1}".to_vec(), b"{\"b\":2}".to_vec()]);
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_unterminated_line_is_capped() {
        let mut framer = LineFramer::with_max_line(8);
        assert!(framer.push(b"0123").is_empty());

        let results = framer.push(b"456789abc");
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(OandaError::InvalidResponse(_))));
        assert_eq!(framer.pending(), 0);

        // Rest of the long line is dropped without a second error
        assert!(framer.push(b"defghijklmnop").is_empty());
        assert_eq!(framer.pending(), 0);

        let lines = ok_lines(framer.push(b"xyz\n{\"a\":1}\n"));
        assert_eq!(lines, vec![b"{\"a\":1}".to_vec()]);
        assert_eq!(framer.finish(), None);
    }

    #[test]
    fn test_terminated_long_line_is_rejected() {
        let mut framer = LineFramer::with_max_line(4);
        let results = framer.push(b"{\"a\":1}\n{}\n");
        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert_eq!(results[1].as_ref().expect("short line"), b"{}");
    }
}
