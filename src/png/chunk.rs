//! PNG chunk framing: length, type, data, CRC32

use crate::error::DecodeError;
use tracing::{debug, warn};

/// A chunk type tag, e.g. `*b"IHDR"`.
pub type ChunkType = [u8; 4];

pub const IHDR: ChunkType = *b"IHDR";
pub const PLTE: ChunkType = *b"PLTE";
pub const TRNS: ChunkType = *b"tRNS";
pub const IDAT: ChunkType = *b"IDAT";
pub const IEND: ChunkType = *b"IEND";
pub const ACTL: ChunkType = *b"acTL";
pub const FCTL: ChunkType = *b"fcTL";
pub const FDAT: ChunkType = *b"fdAT";

/// CRC32 over the chunk type followed by its data.
pub fn chunk_crc(chunk_type: &ChunkType, data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    hasher.finalize()
}

/// Append a framed chunk to `out`.
pub fn write_chunk(out: &mut Vec<u8>, chunk_type: &ChunkType, data: &[u8]) {
    out.reserve(12 + data.len());
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    out.extend_from_slice(&chunk_crc(chunk_type, data).to_be_bytes());
}

/// A chunk read from a stream, borrowing its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub chunk_type: ChunkType,
    pub data: &'a [u8],
}

/// Sequential chunk reader over an in-memory byte stream.
///
/// CRCs are read and compared, but a mismatch is only logged.
pub struct ChunkReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    /// Start reading at `pos` (usually just past the signature).
    pub fn new(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let available = self.remaining();
        if available < n {
            return Err(DecodeError::TruncatedChunk { needed: n, available });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read the next chunk.
    ///
    /// Returns `Ok(None)` at a clean end of stream, and
    /// `Err(TruncatedChunk)` when a chunk declares more bytes than remain.
    pub fn read_chunk(&mut self) -> Result<Option<Chunk<'a>>, DecodeError> {
        if self.remaining() == 0 {
            return Ok(None);
        }

        let length = be_u32(self.take(4)?) as usize;
        let mut chunk_type = [0u8; 4];
        chunk_type.copy_from_slice(self.take(4)?);
        let data = self.take(length)?;
        let crc = be_u32(self.take(4)?);

        let expected = chunk_crc(&chunk_type, data);
        if crc != expected {
            warn!(
                chunk = %String::from_utf8_lossy(&chunk_type),
                stored = crc,
                computed = expected,
                "CRC mismatch, accepting chunk anyway"
            );
        }
        debug!(chunk = %String::from_utf8_lossy(&chunk_type), length, "read chunk");

        Ok(Some(Chunk { chunk_type, data }))
    }
}

/// Big-endian u32 from the first four bytes of `bytes`.
pub(crate) fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
