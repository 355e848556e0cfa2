//! Z-Wave MAC frame decoding.
//!
//! The byte layout of a MAC frame is not self-describing; it follows from the
//! radio configuration the frame was received on. [`resolve_layout`] maps the
//! `(region, channel)` pair of the diagnostics trailer to a [`PhyLayout`],
//! [`resolve_tap_layout`] does the same for the `(region, data rate)` pair of
//! a TAP record, and [`decode`] picks the frame variant for that layout.
//!
//! | layout | frame | CRC |
//! |--------|-------|-----|
//! | classic 2-channel, R1/R2 | [`ClassicFrame`] | 1 byte XOR |
//! | classic 2-channel, R3 | [`ClassicFrame`] | CRC-16 |
//! | classic 3-channel (JP, KR) | [`ClassicFrame`] | CRC-16 |
//! | long range | [`LongRangeFrame`] | CRC-16 |
//!
//! Beam fragments ([`ClassicBeam`], [`LongRangeBeam`]) are recognized on every
//! layout before a full frame decode is attempted.

mod beam;
mod checksum;
mod classic;
mod long_range;

pub use beam::{
    is_beam, ClassicBeam, LongRangeBeam, BEAM_TAG, LONG_RANGE_BEAM_LEN, MAX_CLASSIC_BEAM_LEN,
};
pub use checksum::{crc16, xor8, Crc};
pub use classic::{
    ClassicFrame, Destination, MULTICAST_MASK_LEN, THREE_CHANNEL_HEADER_LEN,
    TWO_CHANNEL_HEADER_LEN,
};
pub use long_range::{LongRangeFrame, LONG_RANGE_HEADER_LEN};

use bytes::Bytes;
use serde::Serialize;
use tracing::trace;

use crate::cursor::BitWriter;
use crate::error::DecodeFault;
use crate::radio::region::{LONG_RANGE_CHANNEL, LONG_RANGE_END_DEVICE_REGION};
use crate::radio::{Baud, RegionId};

/// Classic channel speed index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChannelSpeed {
    /// 9.6 kbit/s
    R1,
    /// 40 kbit/s
    R2,
    /// 100 kbit/s
    R3,
}

impl ChannelSpeed {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(ChannelSpeed::R1),
            1 => Some(ChannelSpeed::R2),
            2 => Some(ChannelSpeed::R3),
            _ => None,
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            ChannelSpeed::R1 => 0,
            ChannelSpeed::R2 => 1,
            ChannelSpeed::R3 => 2,
        }
    }

    pub fn crc_len(&self) -> usize {
        match self {
            ChannelSpeed::R1 | ChannelSpeed::R2 => 1,
            ChannelSpeed::R3 => 2,
        }
    }
}

/// MAC byte layout selected for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PhyLayout {
    ClassicTwoChannel(ChannelSpeed),
    ClassicThreeChannel,
    LongRange,
}

impl PhyLayout {
    pub fn crc_len(&self) -> usize {
        match self {
            PhyLayout::ClassicTwoChannel(speed) => speed.crc_len(),
            PhyLayout::ClassicThreeChannel | PhyLayout::LongRange => 2,
        }
    }
}

/// Data rate field of the TAP RF-information TLV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataRate {
    R1,
    R2,
    R3,
    LongRange,
}

impl DataRate {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(DataRate::R1),
            1 => Some(DataRate::R2),
            2 => Some(DataRate::R3),
            3 => Some(DataRate::LongRange),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            DataRate::R1 => 0,
            DataRate::R2 => 1,
            DataRate::R3 => 2,
            DataRate::LongRange => 3,
        }
    }

    pub fn baud(&self) -> Baud {
        match self {
            DataRate::R1 => Baud::Baud9600,
            DataRate::R2 => Baud::Baud40k,
            DataRate::R3 => Baud::Baud100k,
            DataRate::LongRange => Baud::Baud100kLr,
        }
    }
}

/// Apply the channel-3 override.
///
/// Channel 3 only exists as the long-range channel, so a frame seen on it is
/// treated as coming from the long-range end-device region whatever the
/// nominal region says. Applying it twice is the same as applying it once.
pub fn normalize(region: u8, channel: u8) -> (u8, u8) {
    if channel == LONG_RANGE_CHANNEL {
        (LONG_RANGE_END_DEVICE_REGION as u8, channel)
    } else {
        (region, channel)
    }
}

/// Resolve the layout of a frame from the diagnostics `(region, channel)` pair.
///
/// Every region, long-range end-device regions included, must define the
/// channel; only the channel-3 override skips the lookup.
pub fn resolve_layout(region: u8, channel: u8) -> Result<PhyLayout, DecodeFault> {
    let unsupported = || DecodeFault::UnsupportedRegionChannelCombination {
        region: region as u16,
        channel: channel as u16,
    };
    let (region_id, channel) = normalize(region, channel);
    let layout = if channel == LONG_RANGE_CHANNEL {
        PhyLayout::LongRange
    } else {
        let region_id = RegionId::from_u8(region_id).ok_or_else(unsupported)?;
        let rail = region_id.channel(channel).ok_or_else(unsupported)?;
        layout_for(region_id, rail.baud)
    };
    trace!(region, channel, ?layout, "resolved MAC layout");
    Ok(layout)
}

/// Resolve the layout of a TAP record from its RF information.
///
/// `region` is a TAP region code, translated with [`RegionId::from_tap_code`].
/// The data rate must match one of the region's channels. An unknown data
/// rate is reported in the `channel` field of the fault.
pub fn resolve_tap_layout(region: u16, data_rate: u16) -> Result<PhyLayout, DecodeFault> {
    let unsupported = || DecodeFault::UnsupportedRegionChannelCombination {
        region,
        channel: data_rate,
    };
    let baud = DataRate::from_u16(data_rate)
        .ok_or_else(unsupported)?
        .baud();
    let region_id = RegionId::from_tap_code(region).ok_or_else(unsupported)?;
    if !region_id.supports(baud) {
        return Err(unsupported());
    }

    let layout = layout_for(region_id, baud);
    trace!(region, data_rate, ?layout, "resolved TAP MAC layout");
    Ok(layout)
}

fn layout_for(region: RegionId, baud: Baud) -> PhyLayout {
    match baud {
        Baud::Baud100kLr => PhyLayout::LongRange,
        _ if region.is_three_channel() => PhyLayout::ClassicThreeChannel,
        Baud::Baud9600 => PhyLayout::ClassicTwoChannel(ChannelSpeed::R1),
        Baud::Baud40k => PhyLayout::ClassicTwoChannel(ChannelSpeed::R2),
        Baud::Baud100k => PhyLayout::ClassicTwoChannel(ChannelSpeed::R3),
    }
}

/// Frame header types. The raw value is kept for types without a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderType {
    Singlecast,
    Multicast,
    Ack,
    Explore,
    Routed,
    Other(u8),
}

impl HeaderType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x01 => HeaderType::Singlecast,
            0x02 => HeaderType::Multicast,
            0x03 => HeaderType::Ack,
            0x05 => HeaderType::Explore,
            0x08 => HeaderType::Routed,
            other => HeaderType::Other(other),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            HeaderType::Singlecast => 0x01,
            HeaderType::Multicast => 0x02,
            HeaderType::Ack => 0x03,
            HeaderType::Explore => 0x05,
            HeaderType::Routed => 0x08,
            HeaderType::Other(v) => *v,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HeaderType::Singlecast => "singlecast",
            HeaderType::Multicast => "multicast",
            HeaderType::Ack => "ack",
            HeaderType::Explore => "explore",
            HeaderType::Routed => "routed",
            HeaderType::Other(_) => "other",
        }
    }
}

/// Extra header that sits in front of the payload but is not decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UndecodedHeader {
    Routing,
    Explore,
}

/// Payload of a data frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MacPayload {
    Data(Bytes),
    /// Payload still prefixed by a routing or explore header, passed through
    /// opaque.
    Undecoded { header: UndecodedHeader, bytes: Bytes },
}

impl MacPayload {
    pub fn bytes(&self) -> &Bytes {
        match self {
            MacPayload::Data(bytes) | MacPayload::Undecoded { bytes, .. } => bytes,
        }
    }
}

/// A decoded MAC frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum MacFrame {
    ClassicTwoChannel(ClassicFrame),
    ClassicThreeChannel(ClassicFrame),
    LongRange(LongRangeFrame),
    BeamClassic(ClassicBeam),
    BeamLongRange(LongRangeBeam),
}

impl MacFrame {
    pub fn variant_name(&self) -> &'static str {
        match self {
            MacFrame::ClassicTwoChannel(_) => "classic_2ch",
            MacFrame::ClassicThreeChannel(_) => "classic_3ch",
            MacFrame::LongRange(_) => "long_range",
            MacFrame::BeamClassic(_) => "beam",
            MacFrame::BeamLongRange(_) => "beam_lr",
        }
    }

    pub fn is_beam(&self) -> bool {
        matches!(self, MacFrame::BeamClassic(_) | MacFrame::BeamLongRange(_))
    }

    pub fn home_id(&self) -> Option<u32> {
        match self {
            MacFrame::ClassicTwoChannel(f) | MacFrame::ClassicThreeChannel(f) => Some(f.home_id),
            MacFrame::LongRange(f) => Some(f.home_id),
            MacFrame::BeamClassic(_) | MacFrame::BeamLongRange(_) => None,
        }
    }

    pub fn src_node_id(&self) -> Option<u16> {
        match self {
            MacFrame::ClassicTwoChannel(f) | MacFrame::ClassicThreeChannel(f) => {
                Some(f.src_node_id as u16)
            }
            MacFrame::LongRange(f) => Some(f.src_node_id),
            MacFrame::BeamClassic(_) | MacFrame::BeamLongRange(_) => None,
        }
    }

    /// Destination node; `None` for multicast frames.
    pub fn dst_node_id(&self) -> Option<u16> {
        match self {
            MacFrame::ClassicTwoChannel(f) | MacFrame::ClassicThreeChannel(f) => {
                match f.destination {
                    Destination::Single(dst) => Some(dst as u16),
                    Destination::Multicast { .. } => None,
                }
            }
            MacFrame::LongRange(f) => Some(f.dst_node_id),
            MacFrame::BeamClassic(b) => Some(b.dst_node_id as u16),
            MacFrame::BeamLongRange(b) => Some(b.dst_node_id),
        }
    }

    pub fn header_type(&self) -> Option<HeaderType> {
        match self {
            MacFrame::ClassicTwoChannel(f) | MacFrame::ClassicThreeChannel(f) => {
                Some(f.header_type)
            }
            MacFrame::LongRange(f) => Some(f.header_type),
            MacFrame::BeamClassic(_) | MacFrame::BeamLongRange(_) => None,
        }
    }

    pub fn sequence_number(&self) -> Option<u8> {
        match self {
            MacFrame::ClassicTwoChannel(f) | MacFrame::ClassicThreeChannel(f) => {
                Some(f.sequence_number)
            }
            MacFrame::LongRange(f) => Some(f.sequence_number),
            MacFrame::BeamClassic(_) | MacFrame::BeamLongRange(_) => None,
        }
    }

    pub fn payload(&self) -> Option<&Bytes> {
        match self {
            MacFrame::ClassicTwoChannel(f) | MacFrame::ClassicThreeChannel(f) => {
                Some(f.payload.bytes())
            }
            MacFrame::LongRange(f) => Some(&f.payload),
            MacFrame::BeamClassic(_) | MacFrame::BeamLongRange(_) => None,
        }
    }

    pub fn crc(&self) -> Option<Crc> {
        match self {
            MacFrame::ClassicTwoChannel(f) | MacFrame::ClassicThreeChannel(f) => Some(f.crc),
            MacFrame::LongRange(f) => Some(Crc::Two(f.crc)),
            MacFrame::BeamClassic(_) | MacFrame::BeamLongRange(_) => None,
        }
    }

    pub fn crc_valid(&self) -> Option<bool> {
        match self {
            MacFrame::ClassicTwoChannel(f) | MacFrame::ClassicThreeChannel(f) => {
                Some(f.crc_valid)
            }
            MacFrame::LongRange(f) => Some(f.crc_valid),
            MacFrame::BeamClassic(_) | MacFrame::BeamLongRange(_) => None,
        }
    }

    pub fn write(&self, w: &mut BitWriter) {
        match self {
            MacFrame::ClassicTwoChannel(f) => f.write(w, false),
            MacFrame::ClassicThreeChannel(f) => f.write(w, true),
            MacFrame::LongRange(f) => f.write(w),
            MacFrame::BeamClassic(b) => b.write(w),
            MacFrame::BeamLongRange(b) => b.write(w),
        }
    }
}

/// Decode the OTA bytes of one frame with the given layout.
pub fn decode(ota: &Bytes, layout: PhyLayout) -> Result<MacFrame, DecodeFault> {
    if is_beam(ota, layout) {
        return match layout {
            PhyLayout::LongRange => LongRangeBeam::parse(ota).map(MacFrame::BeamLongRange),
            PhyLayout::ClassicThreeChannel => {
                ClassicBeam::parse(ota, true).map(MacFrame::BeamClassic)
            }
            PhyLayout::ClassicTwoChannel(_) => {
                ClassicBeam::parse(ota, false).map(MacFrame::BeamClassic)
            }
        };
    }

    match layout {
        PhyLayout::ClassicTwoChannel(speed) => {
            ClassicFrame::parse(ota, false, speed.crc_len()).map(MacFrame::ClassicTwoChannel)
        }
        PhyLayout::ClassicThreeChannel => {
            ClassicFrame::parse(ota, true, 2).map(MacFrame::ClassicThreeChannel)
        }
        PhyLayout::LongRange => LongRangeFrame::parse(ota).map(MacFrame::LongRange),
    }
}
