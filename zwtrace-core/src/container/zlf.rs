//! ZLF trace container.
//!
//! A ZLF file is a 2048-byte header followed by data chunks:
//!
//! ```text
//! timestamp(8, LE ticks) | properties(1) | length(4, LE) | DCH data(length) | api type(1)
//! ```
//!
//! `properties` holds the outcome flag in bit 7 and a 7-bit session id. The
//! api type byte is `0xF5` for PTI data.

use tracing::{debug, warn};

use super::DecodeOptions;
use crate::cursor::{BitOrder, BitWriter, Cursor, Endian};
use crate::error::{DecodeFault, Error, FormatError, Result};
use crate::model::{ChunkRecord, ContainerMeta, Timestamp};
use crate::trace;

pub const ZLF_HEADER_LEN: usize = 2048;

/// Bytes ahead of the chunk data.
pub const CHUNK_HEADER_LEN: usize = 13;

/// Api type of PTI chunks.
pub const API_TYPE_PTI: u8 = 0xF5;

/// Header of one ZLF data chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZlfChunkHeader {
    pub timestamp: u64,
    pub is_outcome: bool,
    pub session_id: u8,
    pub length: u32,
}

impl ZlfChunkHeader {
    pub fn parse(cur: &mut Cursor<'_>) -> std::result::Result<Self, DecodeFault> {
        let timestamp = cur.read_u64(Endian::Little)?;
        let is_outcome = cur.read_flag(BitOrder::MsbFirst)?;
        let session_id = cur.read_bits(7, BitOrder::MsbFirst)? as u8;
        let length = cur.read_u32(Endian::Little)?;
        Ok(Self {
            timestamp,
            is_outcome,
            session_id,
            length,
        })
    }

    pub fn write(&self, w: &mut BitWriter) {
        w.write_u64(self.timestamp, Endian::Little);
        w.write_flag(self.is_outcome, BitOrder::MsbFirst);
        w.write_bits(self.session_id as u64, 7, BitOrder::MsbFirst);
        w.write_u32(self.length, Endian::Little);
    }
}

/// Start decoding a ZLF capture held in memory.
pub fn decode_zlf(data: &[u8], options: DecodeOptions) -> Result<ZlfChunks<'_>> {
    if data.len() < ZLF_HEADER_LEN {
        return Err(Error::Format(FormatError::FileTooShort {
            needed: ZLF_HEADER_LEN,
            actual: data.len(),
        }));
    }
    Ok(ZlfChunks::from_validated(data, options))
}

/// Lazy iterator over the chunks of a ZLF capture.
#[derive(Debug, Clone)]
pub struct ZlfChunks<'a> {
    data: &'a [u8],
    pos: usize,
    index: usize,
    options: DecodeOptions,
    trailing: usize,
    done: bool,
}

impl<'a> ZlfChunks<'a> {
    pub(crate) fn from_validated(data: &'a [u8], options: DecodeOptions) -> Self {
        Self {
            data,
            pos: ZLF_HEADER_LEN,
            index: 0,
            options,
            trailing: 0,
            done: false,
        }
    }

    /// Bytes left over at the end that could not hold a chunk header.
    pub fn trailing_bytes(&self) -> usize {
        self.trailing
    }

    /// Capture bytes consumed so far, file header included.
    pub fn bytes_consumed(&self) -> usize {
        self.pos
    }

    fn finish(&mut self) -> Option<ChunkRecord> {
        self.done = true;
        None
    }
}

impl<'a> Iterator for ZlfChunks<'a> {
    type Item = ChunkRecord;

    fn next(&mut self) -> Option<ChunkRecord> {
        if self.done || self.options.limit_reached(self.index, self.pos) {
            return self.finish();
        }

        let rest = &self.data[self.pos..];
        if rest.is_empty() {
            return self.finish();
        }
        if rest.len() < CHUNK_HEADER_LEN {
            warn!(
                offset = self.pos,
                bytes = rest.len(),
                "dangling bytes after the last ZLF chunk"
            );
            self.trailing = rest.len();
            return self.finish();
        }

        let mut cur = Cursor::new(rest);
        let header = match ZlfChunkHeader::parse(&mut cur) {
            Ok(header) => header,
            Err(_) => return self.finish(),
        };
        let offset = self.pos;
        let index = self.index;
        self.index += 1;

        let body_len = header.length as usize;
        let timestamp = Timestamp::Ticks(header.timestamp);
        let meta = |api_type| ContainerMeta::Zlf {
            is_outcome: header.is_outcome,
            session_id: header.session_id,
            api_type,
        };

        let (body, api_type) = match read_body(&mut cur, body_len) {
            Ok(parts) => parts,
            Err(_) => {
                let fault = DecodeFault::TruncatedChunk {
                    needed: body_len + 1,
                    available: rest.len() - CHUNK_HEADER_LEN,
                };
                debug!(index, %fault, "ZLF chunk runs past the end of the capture");
                self.pos = self.data.len();
                self.done = true;
                return Some(ChunkRecord {
                    index,
                    offset,
                    timestamp,
                    length: header.length,
                    container: meta(0),
                    frames: Err(fault),
                });
            }
        };
        self.pos += CHUNK_HEADER_LEN + body_len + 1;

        let frames = if api_type == API_TYPE_PTI {
            trace::decode_chunk(body)
        } else {
            Err(DecodeFault::UnsupportedApiType(api_type))
        };
        if let Err(fault) = &frames {
            debug!(index, offset, %fault, "ZLF chunk fault");
        }

        Some(ChunkRecord {
            index,
            offset,
            timestamp,
            length: header.length,
            container: meta(api_type),
            frames,
        })
    }
}

fn read_body<'a>(cur: &mut Cursor<'a>, len: usize) -> std::result::Result<(&'a [u8], u8), DecodeFault> {
    let body = cur.read_bytes(len)?;
    let api_type = cur.read_u8()?;
    Ok((body, api_type))
}
