//! Long-range MAC frames.
//!
//! ```text
//! home id(4) | src:12 dst:12 (3) | len(1) | fc(1) | seq(1) | noise(1) | tx power(1) | payload | crc16(2)
//! ```

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use super::checksum::Crc;
use super::HeaderType;
use crate::cursor::{BitOrder, BitWriter, Cursor, Endian};
use crate::error::DecodeFault;

/// Everything ahead of the payload.
pub const LONG_RANGE_HEADER_LEN: usize = 12;

const CRC_WIDTH: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongRangeFrame {
    pub home_id: u32,
    pub src_node_id: u16,
    pub dst_node_id: u16,
    pub length: u8,
    pub header_type: HeaderType,
    pub reserved: u8,
    /// A header extension follows; it is left inside `payload`.
    pub extended: bool,
    pub ack_request: bool,
    pub sequence_number: u8,
    pub noise_floor: i8,
    pub tx_power: i8,
    pub payload: Bytes,
    pub crc: u16,
    pub crc_valid: bool,
}

impl LongRangeFrame {
    pub fn parse(ota: &Bytes) -> Result<Self, DecodeFault> {
        let mut cur = Cursor::new(ota);

        let home_id = cur.read_u32(Endian::Big)?;
        let src_node_id = cur.read_bits(12, BitOrder::MsbFirst)? as u16;
        let dst_node_id = cur.read_bits(12, BitOrder::MsbFirst)? as u16;
        let length = cur.read_u8()?;

        let header_type = HeaderType::from_u8(cur.read_bits(3, BitOrder::LsbFirst)? as u8);
        let reserved = cur.read_bits(3, BitOrder::LsbFirst)? as u8;
        let extended = cur.read_flag(BitOrder::LsbFirst)?;
        let ack_request = cur.read_flag(BitOrder::LsbFirst)?;

        let sequence_number = cur.read_u8()?;
        let noise_floor = cur.read_i8()?;
        let tx_power = cur.read_i8()?;

        let mpdu_len = length as usize;
        if ota.len() < mpdu_len {
            return Err(DecodeFault::TruncatedChunk {
                needed: mpdu_len,
                available: ota.len(),
            });
        }
        if ota.len() > mpdu_len {
            debug!(mpdu_len, ota_len = ota.len(), "ignoring bytes after the LR MPDU");
        }
        let payload_len = mpdu_len
            .checked_sub(LONG_RANGE_HEADER_LEN + CRC_WIDTH)
            .ok_or(DecodeFault::LengthUnderflow {
                layer: "mac",
                length: mpdu_len,
                minimum: LONG_RANGE_HEADER_LEN + CRC_WIDTH,
            })?;

        let start = cur.position();
        cur.skip(payload_len)?;
        let payload = ota.slice(start..start + payload_len);
        let crc = cur.read_u16(Endian::Big)?;
        let crc_valid = Crc::Two(crc).matches(&ota[..mpdu_len - CRC_WIDTH]);

        Ok(Self {
            home_id,
            src_node_id,
            dst_node_id,
            length,
            header_type,
            reserved,
            extended,
            ack_request,
            sequence_number,
            noise_floor,
            tx_power,
            payload,
            crc,
            crc_valid,
        })
    }

    pub fn write(&self, w: &mut BitWriter) {
        w.write_u32(self.home_id, Endian::Big);
        w.write_bits(self.src_node_id as u64, 12, BitOrder::MsbFirst);
        w.write_bits(self.dst_node_id as u64, 12, BitOrder::MsbFirst);
        w.write_u8(self.length);
        w.write_bits(self.header_type.as_u8() as u64, 3, BitOrder::LsbFirst);
        w.write_bits(self.reserved as u64, 3, BitOrder::LsbFirst);
        w.write_flag(self.extended, BitOrder::LsbFirst);
        w.write_flag(self.ack_request, BitOrder::LsbFirst);
        w.write_u8(self.sequence_number);
        w.write_u8(self.noise_floor as u8);
        w.write_u8(self.tx_power as u8);
        w.write_bytes(&self.payload);
        w.write_u16(self.crc, Endian::Big);
    }
}
