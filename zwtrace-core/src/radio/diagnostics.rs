//! Appended-info trailer of a PTI radio payload.

use serde::Serialize;

use crate::cursor::{BitOrder, BitWriter, Cursor};
use crate::error::DecodeFault;

const BITS: BitOrder = BitOrder::LsbFirst;

/// Size of the packed trailer (radio config, radio info, status, cfg).
pub const TRAILER_LEN: usize = 4;

/// PTI protocol id of Z-Wave.
pub const PROTOCOL_ID_ZWAVE: u8 = 6;

/// RSSI offset applied by appended-info version 1 and later.
const RSSI_OFFSET: i16 = 0x32;

/// Radio direction recorded in the appended-info cfg byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Rx,
    Tx,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Rx => f.write_str("rx"),
            Direction::Tx => f.write_str("tx"),
        }
    }
}

/// Decoded appended-info trailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Raw RSSI byte, only on receive frames.
    pub rssi: Option<i8>,
    pub region: u8,
    pub region_reserved: u8,
    pub channel_number: u8,
    pub syncword_selected: bool,
    pub antenna_selected: bool,
    pub protocol_id: u8,
    pub error_code: u8,
    pub version: u8,
    /// Size of the appended info minus its three mandatory bytes.
    pub appended_length: u8,
    pub direction: Direction,
    pub cfg_reserved: bool,
}

impl Diagnostics {
    /// Decode the 4-byte packed trailer, with the RSSI byte in front of it
    /// when `with_rssi` is set.
    pub fn parse(window: &[u8], with_rssi: bool) -> Result<Self, DecodeFault> {
        let mut cur = Cursor::new(window);
        let rssi = if with_rssi {
            Some(cur.read_i8()?)
        } else {
            None
        };

        // radio config
        let region = cur.read_bits(5, BITS)? as u8;
        let region_reserved = cur.read_bits(3, BITS)? as u8;

        // radio info
        let channel_number = cur.read_bits(6, BITS)? as u8;
        let syncword_selected = cur.read_flag(BITS)?;
        let antenna_selected = cur.read_flag(BITS)?;

        // status 0
        let protocol_id = cur.read_bits(4, BITS)? as u8;
        let error_code = cur.read_bits(4, BITS)? as u8;

        // appended-info cfg
        let version = cur.read_bits(3, BITS)? as u8;
        let appended_length = cur.read_bits(3, BITS)? as u8;
        let is_rx = cur.read_flag(BITS)?;
        let cfg_reserved = cur.read_flag(BITS)?;

        Ok(Self {
            rssi,
            region,
            region_reserved,
            channel_number,
            syncword_selected,
            antenna_selected,
            protocol_id,
            error_code,
            version,
            appended_length,
            direction: if is_rx { Direction::Rx } else { Direction::Tx },
            cfg_reserved,
        })
    }

    /// Bytes occupied on the wire, RSSI included.
    pub fn window_len(&self) -> usize {
        TRAILER_LEN + usize::from(self.rssi.is_some())
    }

    /// Window size announced by the cfg byte itself.
    pub fn declared_window_len(&self) -> usize {
        self.appended_length as usize + 3
    }

    pub fn is_zwave(&self) -> bool {
        self.protocol_id == PROTOCOL_ID_ZWAVE
    }

    /// RSSI in dBm, compensated for the appended-info version.
    pub fn rssi_dbm(&self) -> Option<i16> {
        self.rssi.map(|raw| {
            if self.version >= 1 {
                raw as i16 - RSSI_OFFSET
            } else {
                raw as i16
            }
        })
    }

    pub fn write(&self, w: &mut BitWriter) {
        if let Some(rssi) = self.rssi {
            w.write_u8(rssi as u8);
        }
        w.write_bits(self.region as u64, 5, BITS);
        w.write_bits(self.region_reserved as u64, 3, BITS);
        w.write_bits(self.channel_number as u64, 6, BITS);
        w.write_flag(self.syncword_selected, BITS);
        w.write_flag(self.antenna_selected, BITS);
        w.write_bits(self.protocol_id as u64, 4, BITS);
        w.write_bits(self.error_code as u64, 4, BITS);
        w.write_bits(self.version as u64, 3, BITS);
        w.write_bits(self.appended_length as u64, 3, BITS);
        w.write_flag(self.direction == Direction::Rx, BITS);
        w.write_flag(self.cfg_reserved, BITS);
    }
}
