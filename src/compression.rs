//! `MODE Z` DEFLATE socket hook (spec §4.3.2): transparently deflate outbound
//! bytes and inflate inbound bytes on the data connection when the transfer
//! mode has been switched with `MODE Z`. Only compiled with the `deflate`
//! feature, mirroring the teacher's optional-compression-dependency shape.
//!
//! Chunk-wise and stateful rather than an `AsyncRead`/`AsyncWrite` adapter,
//! for the same reason the NETASCII transforms in `codec.rs` are chunk-wise:
//! the transfer engine already owns a chunked copy loop, so the transform is
//! threaded through that loop instead of wrapping the socket type.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

/// Deflates chunks for the outbound (STOR-side) half of a `MODE Z` transfer.
pub(crate) struct DeflateEncoder {
    inner: Compress,
}

impl DeflateEncoder {
    pub(crate) fn new() -> Self {
        Self { inner: Compress::new(Compression::default(), false) }
    }

    /// Compress one chunk, returning the wire bytes to send.
    pub(crate) fn encode_chunk(&mut self, input: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(input.len());
        compress_all(&mut self.inner, input, &mut out, FlushCompress::None);
        out
    }

    /// Flush any buffered output and end the DEFLATE stream.
    pub(crate) fn finish(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        compress_all(&mut self.inner, &[], &mut out, FlushCompress::Finish);
        out
    }
}

/// Inflates chunks for the inbound (RETR-side) half of a `MODE Z` transfer.
pub(crate) struct DeflateDecoder {
    inner: Decompress,
}

impl DeflateDecoder {
    pub(crate) fn new() -> Self {
        Self { inner: Decompress::new(false) }
    }

    /// Decompress one chunk of wire bytes, returning plain bytes.
    pub(crate) fn decode_chunk(&mut self, input: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(input.len() * 2);
        decompress_all(&mut self.inner, input, &mut out, FlushDecompress::None);
        out
    }

    /// Flush any trailing buffered output at end of stream.
    pub(crate) fn finish(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        decompress_all(&mut self.inner, &[], &mut out, FlushDecompress::Finish);
        out
    }
}

const CHUNK: usize = 32 * 1024;

fn compress_all(compress: &mut Compress, input: &[u8], out: &mut Vec<u8>, flush: FlushCompress) {
    let mut buf = [0u8; CHUNK];
    let mut offset = 0usize;
    loop {
        let before_in = compress.total_in();
        let before_out = compress.total_out();
        let status = compress.compress(&input[offset..], &mut buf, flush).unwrap_or(Status::Ok);
        out.extend_from_slice(&buf[..(compress.total_out() - before_out) as usize]);
        offset += (compress.total_in() - before_in) as usize;
        let consumed_all = offset >= input.len();
        if status == Status::StreamEnd || (consumed_all && !matches!(flush, FlushCompress::Finish)) {
            break;
        }
        if status == Status::BufError && consumed_all {
            break;
        }
    }
}

fn decompress_all(decompress: &mut Decompress, input: &[u8], out: &mut Vec<u8>, flush: FlushDecompress) {
    let mut buf = [0u8; CHUNK];
    let mut offset = 0usize;
    loop {
        let before_in = decompress.total_in();
        let before_out = decompress.total_out();
        let status = decompress.decompress(&input[offset..], &mut buf, flush).unwrap_or(Status::Ok);
        out.extend_from_slice(&buf[..(decompress.total_out() - before_out) as usize]);
        offset += (decompress.total_in() - before_in) as usize;
        let consumed_all = offset >= input.len();
        if status == Status::StreamEnd || (consumed_all && !matches!(flush, FlushDecompress::Finish)) {
            break;
        }
        if status == Status::BufError && consumed_all {
            break;
        }
    }
}
