//! Wake-up beam fragments.
//!
//! A beam is a run of tiny frames sent to wake a listening node. It carries
//! no payload and no checksum:
//!
//! ```text
//! classic:    0x55 | dst(1) | [home id hash(1)]
//! long range: 0x55 | dst:12 tx power:4 (2) | home id hash(1)
//! ```

use serde::Serialize;

use super::PhyLayout;
use crate::cursor::{BitOrder, BitWriter, Cursor};
use crate::error::DecodeFault;

pub const BEAM_TAG: u8 = 0x55;

/// Largest classic beam fragment.
pub const MAX_CLASSIC_BEAM_LEN: usize = 3;

/// Size of a long-range beam fragment.
pub const LONG_RANGE_BEAM_LEN: usize = 4;

/// Whether `ota` is a beam fragment rather than a data frame on `layout`.
///
/// The size bound keeps a data frame whose home id starts with `0x55` from
/// being taken for a beam.
pub fn is_beam(ota: &[u8], layout: PhyLayout) -> bool {
    let max_len = match layout {
        PhyLayout::LongRange => LONG_RANGE_BEAM_LEN,
        PhyLayout::ClassicTwoChannel(_) | PhyLayout::ClassicThreeChannel => MAX_CLASSIC_BEAM_LEN,
    };
    ota.first() == Some(&BEAM_TAG) && ota.len() <= max_len
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassicBeam {
    pub dst_node_id: u8,
    /// Omitted by two-channel beams of two bytes or fewer.
    pub home_id_hash: Option<u8>,
}

impl ClassicBeam {
    pub fn parse(ota: &[u8], three_channel: bool) -> Result<Self, DecodeFault> {
        let mut cur = Cursor::new(ota);
        expect_tag(&mut cur)?;
        let dst_node_id = cur.read_u8()?;
        let home_id_hash = if three_channel || ota.len() > 2 {
            Some(cur.read_u8()?)
        } else {
            None
        };
        Ok(Self {
            dst_node_id,
            home_id_hash,
        })
    }

    pub fn write(&self, w: &mut BitWriter) {
        w.write_u8(BEAM_TAG);
        w.write_u8(self.dst_node_id);
        if let Some(hash) = self.home_id_hash {
            w.write_u8(hash);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongRangeBeam {
    pub dst_node_id: u16,
    pub tx_power: u8,
    pub home_id_hash: u8,
}

impl LongRangeBeam {
    pub fn parse(ota: &[u8]) -> Result<Self, DecodeFault> {
        let mut cur = Cursor::new(ota);
        expect_tag(&mut cur)?;
        let dst_node_id = cur.read_bits(12, BitOrder::MsbFirst)? as u16;
        let tx_power = cur.read_bits(4, BitOrder::MsbFirst)? as u8;
        let home_id_hash = cur.read_u8()?;
        Ok(Self {
            dst_node_id,
            tx_power,
            home_id_hash,
        })
    }

    pub fn write(&self, w: &mut BitWriter) {
        w.write_u8(BEAM_TAG);
        w.write_bits(self.dst_node_id as u64, 12, BitOrder::MsbFirst);
        w.write_bits(self.tx_power as u64, 4, BitOrder::MsbFirst);
        w.write_u8(self.home_id_hash);
    }
}

fn expect_tag(cur: &mut Cursor<'_>) -> Result<(), DecodeFault> {
    let tag = cur.read_u8()?;
    if tag != BEAM_TAG {
        return Err(DecodeFault::InvalidMarker {
            layer: "beam",
            found: tag,
        });
    }
    Ok(())
}
