//! Classic (9.6k/40k/100k) MAC frames.
//!
//! Two-channel layout:
//!
//! ```text
//! home id(4) | src(1) | fc1(1) | fc2(1) | len(1) | dst(1) | payload | crc(1|2)
//! ```
//!
//! Three-channel regions move the sequence number out of `fc2` into its own
//! byte following `len` and always use a 2-byte CRC. Multicast frames replace
//! the destination byte with a control byte and a 29-byte node mask.

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use super::checksum::Crc;
use super::{HeaderType, MacPayload, UndecodedHeader};
use crate::cursor::{BitOrder, BitWriter, Cursor, Endian};
use crate::error::DecodeFault;

const BITS: BitOrder = BitOrder::LsbFirst;

/// Size of the multicast node mask.
pub const MULTICAST_MASK_LEN: usize = 29;

/// Fixed header size of a singlecast two-channel frame.
pub const TWO_CHANNEL_HEADER_LEN: usize = 9;

/// Fixed header size of a singlecast three-channel frame.
pub const THREE_CHANNEL_HEADER_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Single(u8),
    Multicast {
        control: u8,
        mask: [u8; MULTICAST_MASK_LEN],
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassicFrame {
    pub home_id: u32,
    pub src_node_id: u8,
    pub header_type: HeaderType,
    pub speed_modified: bool,
    pub low_power: bool,
    pub ack_request: bool,
    pub routed: bool,
    pub sequence_number: u8,
    /// Reserved bits of the second frame-control byte (1 bit on two-channel,
    /// 5 bits on three-channel layouts).
    pub reserved: u8,
    // Known as the source/wakeup beam flags, but which name belongs to which
    // bit is not settled. Kept by position only.
    pub beam_flag_a: bool,
    pub beam_flag_b: bool,
    pub suc_present: bool,
    /// MPDU length as declared by the frame.
    pub length: u8,
    pub destination: Destination,
    pub payload: MacPayload,
    pub crc: Crc,
    pub crc_valid: bool,
}

impl ClassicFrame {
    /// Decode a classic frame. `crc_width` is 1 or 2.
    pub fn parse(ota: &Bytes, three_channel: bool, crc_width: usize) -> Result<Self, DecodeFault> {
        let mut cur = Cursor::new(ota);

        let home_id = cur.read_u32(Endian::Big)?;
        let src_node_id = cur.read_u8()?;

        let header_type = HeaderType::from_u8(cur.read_bits(4, BITS)? as u8);
        let speed_modified = cur.read_flag(BITS)?;
        let low_power = cur.read_flag(BITS)?;
        let ack_request = cur.read_flag(BITS)?;
        let routed = cur.read_flag(BITS)?;

        let mut sequence_number = 0;
        let reserved = if three_channel {
            cur.read_bits(5, BITS)? as u8
        } else {
            sequence_number = cur.read_bits(4, BITS)? as u8;
            cur.read_bits(1, BITS)? as u8
        };
        let beam_flag_a = cur.read_flag(BITS)?;
        let beam_flag_b = cur.read_flag(BITS)?;
        let suc_present = cur.read_flag(BITS)?;

        let length = cur.read_u8()?;
        if three_channel {
            sequence_number = cur.read_u8()?;
        }

        let mpdu_len = length as usize;
        if ota.len() < mpdu_len {
            return Err(DecodeFault::TruncatedChunk {
                needed: mpdu_len,
                available: ota.len(),
            });
        }
        if ota.len() > mpdu_len {
            debug!(
                mpdu_len,
                ota_len = ota.len(),
                "ignoring bytes after the classic MPDU"
            );
        }

        let multicast = header_type == HeaderType::Multicast;
        let header_len = if three_channel {
            THREE_CHANNEL_HEADER_LEN
        } else {
            TWO_CHANNEL_HEADER_LEN
        } + if multicast { MULTICAST_MASK_LEN } else { 0 };
        let payload_len = mpdu_len.checked_sub(header_len + crc_width).ok_or(
            DecodeFault::LengthUnderflow {
                layer: "mac",
                length: mpdu_len,
                minimum: header_len + crc_width,
            },
        )?;

        let destination = if multicast {
            Destination::Multicast {
                control: cur.read_u8()?,
                mask: cur.read_array::<MULTICAST_MASK_LEN>()?,
            }
        } else {
            Destination::Single(cur.read_u8()?)
        };

        let start = cur.position();
        cur.skip(payload_len)?;
        let bytes = ota.slice(start..start + payload_len);

        let crc = if crc_width == 1 {
            Crc::One(cur.read_u8()?)
        } else {
            Crc::Two(cur.read_u16(Endian::Big)?)
        };
        let crc_valid = crc.matches(&ota[..mpdu_len - crc_width]);

        let payload = match header_type {
            HeaderType::Explore => MacPayload::Undecoded {
                header: UndecodedHeader::Explore,
                bytes,
            },
            HeaderType::Routed => MacPayload::Undecoded {
                header: UndecodedHeader::Routing,
                bytes,
            },
            _ if routed => MacPayload::Undecoded {
                header: UndecodedHeader::Routing,
                bytes,
            },
            _ => MacPayload::Data(bytes),
        };

        Ok(Self {
            home_id,
            src_node_id,
            header_type,
            speed_modified,
            low_power,
            ack_request,
            routed,
            sequence_number,
            reserved,
            beam_flag_a,
            beam_flag_b,
            suc_present,
            length,
            destination,
            payload,
            crc,
            crc_valid,
        })
    }

    pub fn write(&self, w: &mut BitWriter, three_channel: bool) {
        w.write_u32(self.home_id, Endian::Big);
        w.write_u8(self.src_node_id);

        w.write_bits(self.header_type.as_u8() as u64, 4, BITS);
        w.write_flag(self.speed_modified, BITS);
        w.write_flag(self.low_power, BITS);
        w.write_flag(self.ack_request, BITS);
        w.write_flag(self.routed, BITS);

        if three_channel {
            w.write_bits(self.reserved as u64, 5, BITS);
        } else {
            w.write_bits(self.sequence_number as u64, 4, BITS);
            w.write_bits(self.reserved as u64, 1, BITS);
        }
        w.write_flag(self.beam_flag_a, BITS);
        w.write_flag(self.beam_flag_b, BITS);
        w.write_flag(self.suc_present, BITS);

        w.write_u8(self.length);
        if three_channel {
            w.write_u8(self.sequence_number);
        }

        match &self.destination {
            Destination::Single(dst) => w.write_u8(*dst),
            Destination::Multicast { control, mask } => {
                w.write_u8(*control);
                w.write_bytes(mask);
            }
        }
        w.write_bytes(self.payload.bytes());
        match self.crc {
            Crc::One(v) => w.write_u8(v),
            Crc::Two(v) => w.write_u16(v, Endian::Big),
        }
    }
}
