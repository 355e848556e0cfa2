//! DCH trace frames.
//!
//! Every ZLF chunk carries one or more back-to-back DCH frames as emitted by
//! the radio tracing hardware:
//!
//! ```text
//! v2: 0x5B | len(2) | ver(2) | timestamp µs(6) | type(2) | seq(1)                | radio payload | 0x5D
//! v3: 0x5B | len(2) | ver(2) | timestamp ns(8) | type(2) | flags(4) | seq(2)     | radio payload | 0x5D
//! ```
//!
//! `len` counts every byte between the two markers, so the radio payload is
//! `len - 13` bytes on v2 and `len - 20` bytes on v3. All integers are
//! little-endian.

use bytes::Bytes;
use serde::Serialize;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::cursor::{BitWriter, Cursor, Endian};
use crate::error::DecodeFault;
use crate::mac;
use crate::model::RadioFrame;
use crate::radio::RadioPayload;

pub const START_MARKER: u8 = 0x5B;
pub const STOP_MARKER: u8 = 0x5D;

/// Bytes counted by `len` that precede the radio payload on v2.
pub const V2_HEADER_LEN: usize = 13;
/// Bytes counted by `len` that precede the radio payload on v3.
pub const V3_HEADER_LEN: usize = 20;

/// Length and version fields, counted by `len`.
const PREAMBLE_LEN: usize = 4;

/// DCH frame types that carry a PTI radio payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceType {
    PtiTx,
    PtiRx,
    PtiOther,
}

impl TraceType {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x29 => Some(TraceType::PtiTx),
            0x2A => Some(TraceType::PtiRx),
            0x2B => Some(TraceType::PtiOther),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            TraceType::PtiTx => 0x29,
            TraceType::PtiRx => 0x2A,
            TraceType::PtiOther => 0x2B,
        }
    }
}

/// Decoded DCH header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceHeader {
    pub version: u16,
    /// Declared frame length (excludes the two markers).
    pub length: u16,
    /// Time since the tracing board booted: µs on v2, ns on v3.
    pub timestamp: u64,
    pub trace_type: TraceType,
    /// v3 only.
    pub flags: Option<u32>,
    pub sequence_number: u16,
}

impl TraceHeader {
    pub fn header_len(version: u16) -> Result<usize, DecodeFault> {
        match version {
            2 => Ok(V2_HEADER_LEN),
            3 => Ok(V3_HEADER_LEN),
            other => Err(DecodeFault::UnsupportedVersion(other)),
        }
    }

    pub fn timestamp_us(&self) -> u64 {
        if self.version == 2 {
            self.timestamp
        } else {
            self.timestamp / 1_000
        }
    }

    pub fn timestamp_ns(&self) -> u64 {
        if self.version == 2 {
            self.timestamp.saturating_mul(1_000)
        } else {
            self.timestamp
        }
    }

    /// Encode start marker and header. The payload and stop marker follow.
    pub fn write(&self, w: &mut BitWriter) {
        w.write_u8(START_MARKER);
        w.write_u16(self.length, Endian::Little);
        w.write_u16(self.version, Endian::Little);
        if self.version == 2 {
            w.write_uint(self.timestamp, 6, Endian::Little);
            w.write_u16(self.trace_type.as_u16(), Endian::Little);
            w.write_u8(self.sequence_number as u8);
        } else {
            w.write_u64(self.timestamp, Endian::Little);
            w.write_u16(self.trace_type.as_u16(), Endian::Little);
            w.write_u32(self.flags.unwrap_or(0), Endian::Little);
            w.write_u16(self.sequence_number, Endian::Little);
        }
    }
}

/// One DCH frame with its radio payload still undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFrame<'a> {
    pub header: TraceHeader,
    pub radio: &'a [u8],
}

impl<'a> TraceFrame<'a> {
    /// Decode the frame at the cursor and advance past its stop marker.
    pub fn parse(cur: &mut Cursor<'a>) -> Result<Self, DecodeFault> {
        let marker = cur.read_u8()?;
        if marker != START_MARKER {
            return Err(DecodeFault::InvalidMarker {
                layer: "trace start",
                found: marker,
            });
        }
        let length = cur.read_u16(Endian::Little)?;
        let version = cur.read_u16(Endian::Little)?;
        let header_len = TraceHeader::header_len(version)?;
        if (length as usize) <= header_len {
            return Err(DecodeFault::LengthUnderflow {
                layer: "trace",
                length: length as usize,
                minimum: header_len + 1,
            });
        }

        let mut body = cur.take(length as usize - PREAMBLE_LEN)?;
        let stop = cur.read_u8()?;
        if stop != STOP_MARKER {
            return Err(DecodeFault::InvalidMarker {
                layer: "trace stop",
                found: stop,
            });
        }

        let (timestamp, trace_type, flags, sequence_number) = if version == 2 {
            let timestamp = body.read_uint(6, Endian::Little)?;
            let trace_type = body.read_u16(Endian::Little)?;
            let seq = body.read_u8()? as u16;
            (timestamp, trace_type, None, seq)
        } else {
            let timestamp = body.read_u64(Endian::Little)?;
            let trace_type = body.read_u16(Endian::Little)?;
            let flags = body.read_u32(Endian::Little)?;
            let seq = body.read_u16(Endian::Little)?;
            (timestamp, trace_type, Some(flags), seq)
        };
        let trace_type =
            TraceType::from_u16(trace_type).ok_or(DecodeFault::UnsupportedTraceType(trace_type))?;

        trace!(version, length, ?trace_type, "trace frame");
        Ok(Self {
            header: TraceHeader {
                version,
                length,
                timestamp,
                trace_type,
                flags,
                sequence_number,
            },
            radio: body.rest(),
        })
    }

    pub fn write(&self, w: &mut BitWriter) {
        self.header.write(w);
        w.write_bytes(self.radio);
        w.write_u8(STOP_MARKER);
    }
}

/// Decode every DCH frame of a ZLF chunk body down to the MAC layer.
///
/// Envelope faults (markers, lengths, versions, radio payload framing) fail
/// the whole chunk. A MAC fault only fails the frame it belongs to.
pub fn decode_chunk(chunk: &[u8]) -> Result<SmallVec<[RadioFrame; 1]>, DecodeFault> {
    let mut cur = Cursor::new(chunk);
    let mut frames: SmallVec<[RadioFrame; 1]> = SmallVec::new();
    loop {
        let frame = TraceFrame::parse(&mut cur)?;
        frames.push(decode_frame(frame)?);
        if cur.is_empty() {
            break;
        }
    }
    if frames.len() > 1 {
        debug!(count = frames.len(), "chunk carries several trace frames");
    }
    Ok(frames)
}

fn decode_frame(frame: TraceFrame<'_>) -> Result<RadioFrame, DecodeFault> {
    let radio = RadioPayload::parse(frame.radio)?;
    let ota = Bytes::copy_from_slice(radio.ota);
    let diag = &radio.diagnostics;

    let mac = if !diag.is_zwave() {
        Err(DecodeFault::UnsupportedProtocol(diag.protocol_id))
    } else {
        mac::resolve_layout(diag.region, diag.channel_number)
            .and_then(|layout| mac::decode(&ota, layout))
    };
    if let Err(fault) = &mac {
        debug!(%fault, "MAC decode failed");
    }

    Ok(RadioFrame {
        trace: Some(frame.header),
        hw_start: Some(radio.hw_start),
        hw_end: Some(radio.hw_end),
        diagnostics: Some(radio.diagnostics),
        tap: None,
        ota_payload: ota,
        mac,
    })
}
