//! PTI radio payload.
//!
//! ```text
//! +----------+-----------------+--------+--------+------------------+
//! | hw start | OTA MAC bytes   | hw end | [RSSI] | appended info(4) |
//! +----------+-----------------+--------+--------+------------------+
//! ```
//!
//! The RSSI byte is only present on receive frames. Whether it is there is
//! decided by the class of the hardware-start marker, which makes the
//! trailer window 5 bytes for RX and 4 bytes for TX.

mod diagnostics;
pub mod region;

pub use diagnostics::{Diagnostics, Direction, PROTOCOL_ID_ZWAVE, TRAILER_LEN};
pub use region::{Baud, Channel, RegionId};

use serde::Serialize;
use tracing::debug;

use crate::cursor::BitWriter;
use crate::error::DecodeFault;

/// Hardware marker framing the OTA bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum HwMarker {
    RxStart = 0xF8,
    RxSuccess = 0xF9,
    RxAbort = 0xFA,
    TxStart = 0xFC,
    TxSuccess = 0xFD,
    TxAbort = 0xFE,
}

impl HwMarker {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0xF8 => Some(HwMarker::RxStart),
            0xF9 => Some(HwMarker::RxSuccess),
            0xFA => Some(HwMarker::RxAbort),
            0xFC => Some(HwMarker::TxStart),
            0xFD => Some(HwMarker::TxSuccess),
            0xFE => Some(HwMarker::TxAbort),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn is_start(&self) -> bool {
        matches!(self, HwMarker::RxStart | HwMarker::TxStart)
    }

    pub fn is_receive(&self) -> bool {
        matches!(
            self,
            HwMarker::RxStart | HwMarker::RxSuccess | HwMarker::RxAbort
        )
    }

    /// End markers reporting a radio abort.
    pub fn is_abort(&self) -> bool {
        matches!(self, HwMarker::RxAbort | HwMarker::TxAbort)
    }
}

/// A PTI radio payload split into its parts. Borrows the OTA bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioPayload<'a> {
    pub hw_start: HwMarker,
    pub ota: &'a [u8],
    pub hw_end: HwMarker,
    pub diagnostics: Diagnostics,
}

impl<'a> RadioPayload<'a> {
    pub fn parse(payload: &'a [u8]) -> Result<Self, DecodeFault> {
        let first = *payload.first().ok_or(DecodeFault::LengthUnderflow {
            layer: "radio",
            length: 0,
            minimum: 2 + TRAILER_LEN,
        })?;
        let hw_start = HwMarker::from_u8(first)
            .filter(HwMarker::is_start)
            .ok_or(DecodeFault::InvalidMarker {
                layer: "radio start",
                found: first,
            })?;

        let window = TRAILER_LEN + usize::from(hw_start.is_receive());
        let minimum = 2 + window;
        if payload.len() < minimum {
            return Err(DecodeFault::LengthUnderflow {
                layer: "radio",
                length: payload.len(),
                minimum,
            });
        }

        let end_pos = payload.len() - window - 1;
        let hw_end = HwMarker::from_u8(payload[end_pos])
            .filter(|m| !m.is_start())
            .ok_or(DecodeFault::InvalidMarker {
                layer: "radio end",
                found: payload[end_pos],
            })?;

        let diagnostics = Diagnostics::parse(&payload[end_pos + 1..], hw_start.is_receive())?;

        if hw_end.is_receive() != hw_start.is_receive() {
            debug!(start = ?hw_start, end = ?hw_end, "hardware markers disagree on direction");
        }
        if diagnostics.declared_window_len() != diagnostics.window_len()
            || (diagnostics.direction == Direction::Rx) != hw_start.is_receive()
        {
            debug!(
                declared = diagnostics.declared_window_len(),
                window = diagnostics.window_len(),
                direction = %diagnostics.direction,
                "appended-info cfg disagrees with start marker"
            );
        }

        Ok(Self {
            hw_start,
            ota: &payload[1..end_pos],
            hw_end,
            diagnostics,
        })
    }

    pub fn write(&self, w: &mut BitWriter) {
        w.write_u8(self.hw_start.as_u8());
        w.write_bytes(self.ota);
        w.write_u8(self.hw_end.as_u8());
        self.diagnostics.write(w);
    }
}
