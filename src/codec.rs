//! ASCII / NETASCII line-ending transform for ASCII-mode transfers (spec §4.5)
//!
//! NETASCII is CRLF-terminated 7-bit ASCII. These are chunk-wise, stateful
//! transforms rather than `AsyncRead`/`AsyncWrite` wrappers: the transfer
//! engine (`client::transfer`) already runs its own chunked copy loop, and
//! threading a transform function through that loop — the way the teacher
//! crate threads its DEFLATE (de)compressor through a single decode call
//! rather than wrapping the socket type — keeps the state (a split CR/LF
//! pair across a chunk boundary) in one place instead of duplicated across
//! a generic adapter.

/// The host's native line ending for decoded (RETR-side) NETASCII output.
#[cfg(windows)]
pub const HOST_LINE_ENDING: &[u8] = b"\r\n";
/// The host's native line ending for decoded (RETR-side) NETASCII output.
#[cfg(not(windows))]
pub const HOST_LINE_ENDING: &[u8] = b"\n";

/// Translates local line endings to CRLF for outbound (STOR) ASCII transfers.
///
/// Bare CR and bare LF are both translated to CRLF; an existing CRLF pair is
/// passed through unchanged (not doubled). State carries across calls so a
/// CR at the end of one chunk and an LF at the start of the next are still
/// recognized as one CRLF pair.
#[derive(Debug, Default)]
pub struct NetAsciiEncoder {
    pending_cr: bool,
}

impl NetAsciiEncoder {
    /// A fresh encoder with no carried-over state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode one chunk, returning the NETASCII bytes to write to the wire.
    pub fn encode_chunk(&mut self, input: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(input.len() + input.len() / 32);
        let mut iter = input.iter().copied().peekable();

        if self.pending_cr {
            self.pending_cr = false;
            match iter.peek() {
                Some(b'\n') => {
                    out.extend_from_slice(b"\r\n");
                    iter.next();
                }
                _ => out.extend_from_slice(b"\r\n"),
            }
        }

        while let Some(byte) = iter.next() {
            match byte {
                b'\r' => match iter.peek() {
                    Some(b'\n') => {
                        out.extend_from_slice(b"\r\n");
                        iter.next();
                    }
                    Some(_) => out.extend_from_slice(b"\r\n"),
                    None => {
                        self.pending_cr = true;
                    }
                },
                b'\n' => out.extend_from_slice(b"\r\n"),
                other => out.push(other),
            }
        }

        out
    }

    /// Flush any carried CR that never saw its matching LF.
    pub fn finish(&mut self) -> Vec<u8> {
        if self.pending_cr {
            self.pending_cr = false;
            b"\r\n".to_vec()
        } else {
            Vec::new()
        }
    }
}

/// Translates inbound (RETR) CRLF line endings to the host's native ending.
#[derive(Debug, Default)]
pub struct NetAsciiDecoder {
    pending_cr: bool,
}

impl NetAsciiDecoder {
    /// A fresh decoder with no carried-over state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, returning host-line-ending bytes.
    pub fn decode_chunk(&mut self, input: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(input.len());
        let mut iter = input.iter().copied().peekable();

        if self.pending_cr {
            self.pending_cr = false;
            match iter.peek() {
                Some(b'\n') => {
                    out.extend_from_slice(HOST_LINE_ENDING);
                    iter.next();
                }
                _ => out.push(b'\r'),
            }
        }

        while let Some(byte) = iter.next() {
            if byte == b'\r' {
                match iter.peek() {
                    Some(b'\n') => {
                        out.extend_from_slice(HOST_LINE_ENDING);
                        iter.next();
                    }
                    Some(_) => out.push(b'\r'),
                    None => self.pending_cr = true,
                }
            } else {
                out.push(byte);
            }
        }

        out
    }

    /// Flush a trailing bare CR that never saw its matching LF.
    pub fn finish(&mut self) -> Vec<u8> {
        if self.pending_cr {
            self.pending_cr = false;
            vec![b'\r']
        } else {
            Vec::new()
        }
    }
}
