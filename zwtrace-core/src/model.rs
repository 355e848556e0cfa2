//! Decoded-frame model returned by the container readers.
//!
//! Every container entry becomes one [`ChunkRecord`]. A record owns its bytes
//! (via [`Bytes`]), so records stay valid after the capture buffer is dropped.

use bytes::Bytes;
use serde::Serialize;
use smallvec::SmallVec;

pub use crate::error::DecodeFault;
use crate::mac::{DataRate, MacFrame};
use crate::radio::{Diagnostics, HwMarker};
use crate::trace::TraceHeader;

/// .NET `DateTime` ticks at 1970-01-01T00:00:00.
const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;
const TICKS_MASK: u64 = (1 << 62) - 1;

/// Container timestamp of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Timestamp {
    /// ZLF: a .NET `DateTime`, 2-bit kind over 62 bits of 100 ns ticks since
    /// 0001-01-01.
    Ticks(u64),
    /// pcap: seconds plus a µs or ns fraction.
    Unix {
        seconds: u32,
        fraction: u32,
        nanos: bool,
    },
}

impl Timestamp {
    /// Microseconds since the Unix epoch.
    ///
    /// The `DateTime` kind is ignored; local-time stamps come out shifted by
    /// the writer's UTC offset.
    pub fn unix_micros(&self) -> i64 {
        match *self {
            Timestamp::Ticks(raw) => ((raw & TICKS_MASK) as i64 - UNIX_EPOCH_TICKS) / 10,
            Timestamp::Unix {
                seconds,
                fraction,
                nanos,
            } => {
                let sub = if nanos { fraction / 1_000 } else { fraction };
                seconds as i64 * 1_000_000 + sub as i64
            }
        }
    }

    /// `DateTime` kind bits of a ZLF timestamp (0 unspecified, 1 UTC, 2 local).
    pub fn kind(&self) -> Option<u8> {
        match *self {
            Timestamp::Ticks(raw) => Some((raw >> 62) as u8),
            Timestamp::Unix { .. } => None,
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let micros = self.unix_micros();
        write!(
            f,
            "{}.{:06}",
            micros.div_euclid(1_000_000),
            micros.rem_euclid(1_000_000)
        )
    }
}

/// Container-specific metadata of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "container", rename_all = "snake_case")]
pub enum ContainerMeta {
    Zlf {
        is_outcome: bool,
        session_id: u8,
        api_type: u8,
    },
    Tap {
        original_length: u32,
    },
}

/// Radio information carried by TAP TLVs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TapInfo {
    pub version: u8,
    /// FCS length announced by the FCS TLV.
    pub fcs_len: Option<u8>,
    /// Received signal strength in dBm.
    pub rss_dbm: Option<f32>,
    /// TAP region code, see [`RegionId::from_tap_code`](crate::radio::RegionId::from_tap_code).
    pub region: Option<u16>,
    pub data_rate: Option<DataRate>,
    pub frequency_khz: Option<u32>,
}

/// One radio event with everything decoded from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadioFrame {
    /// DCH header (ZLF only).
    pub trace: Option<TraceHeader>,
    pub hw_start: Option<HwMarker>,
    pub hw_end: Option<HwMarker>,
    pub diagnostics: Option<Diagnostics>,
    /// TAP radio information (TAP only).
    pub tap: Option<TapInfo>,
    pub ota_payload: Bytes,
    pub mac: Result<MacFrame, DecodeFault>,
}

impl RadioFrame {
    /// Signal strength in dBm, from whichever source the container offers.
    pub fn rssi_dbm(&self) -> Option<f32> {
        self.diagnostics
            .as_ref()
            .and_then(Diagnostics::rssi_dbm)
            .map(f32::from)
            .or_else(|| self.tap.as_ref().and_then(|t| t.rss_dbm))
    }
}

/// One container entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkRecord {
    /// Position of the record in the capture, from 0.
    pub index: usize,
    /// Byte offset of the record header in the capture.
    pub offset: usize,
    pub timestamp: Timestamp,
    /// Declared length of the record body.
    pub length: u32,
    pub container: ContainerMeta,
    pub frames: Result<SmallVec<[RadioFrame; 1]>, DecodeFault>,
}

impl ChunkRecord {
    /// First radio frame of the record.
    pub fn frame(&self) -> Option<&RadioFrame> {
        self.frames.as_ref().ok().and_then(|frames| frames.first())
    }

    /// First fault at any layer: the record itself, or the first frame's MAC.
    pub fn fault(&self) -> Option<&DecodeFault> {
        match &self.frames {
            Err(fault) => Some(fault),
            Ok(frames) => frames.first().and_then(|f| f.mac.as_ref().err()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.fault().is_none()
    }
}
