//! Frame check sequences.

use serde::Serialize;

const XOR_INIT: u8 = 0xFF;
const CRC16_POLY: u16 = 0x1021;
const CRC16_INIT: u16 = 0x1D0F;

/// Checksum carried at the end of a MAC frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Crc {
    /// XOR checksum of 9.6k and 40k classic frames.
    One(u8),
    /// CRC-16 of 100k classic frames and long-range frames, stored big-endian.
    Two(u16),
}

impl Crc {
    /// Width on the wire in bytes.
    pub fn width(&self) -> usize {
        match self {
            Crc::One(_) => 1,
            Crc::Two(_) => 2,
        }
    }

    /// Compute the checksum of `covered` with the same width as `self`.
    pub fn compute_like(&self, covered: &[u8]) -> Crc {
        match self {
            Crc::One(_) => Crc::One(xor8(covered)),
            Crc::Two(_) => Crc::Two(crc16(covered)),
        }
    }

    pub fn matches(&self, covered: &[u8]) -> bool {
        self.compute_like(covered) == *self
    }
}

impl std::fmt::Display for Crc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Crc::One(v) => write!(f, "{:02x}", v),
            Crc::Two(v) => write!(f, "{:04x}", v),
        }
    }
}

pub fn xor8(data: &[u8]) -> u8 {
    data.iter().fold(XOR_INIT, |acc, &b| acc ^ b)
}

/// CRC-16/CCITT with the Z-Wave initial value.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = CRC16_INIT;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ CRC16_POLY;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
