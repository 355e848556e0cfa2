//! RAIL Z-Wave region and channel table.
//!
//! Every region exposes up to four RAIL channels, each a fixed
//! (frequency, baud) pair. The table is what turns the `(region, channel)`
//! pair carried by the diagnostics trailer into a channel speed.

use serde::Serialize;

/// RAIL region identifier as carried in the radio-config byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum RegionId {
    Inv = 0,
    Eu = 1,
    Us = 2,
    Anz = 3,
    Hk = 4,
    My = 5,
    In = 6,
    Jp = 7,
    Ru = 8,
    Il = 9,
    Kr = 10,
    Cn = 11,
    UsLr1 = 12,
    UsLr2 = 13,
    UsLr3 = 14,
    EuLr1 = 15,
    EuLr2 = 16,
    EuLr3 = 17,
}

/// Region forced by the channel-3 override.
pub const LONG_RANGE_END_DEVICE_REGION: RegionId = RegionId::UsLr3;

/// Channel index reserved for long range in four-channel regions.
pub const LONG_RANGE_CHANNEL: u8 = 3;

impl RegionId {
    pub fn from_u8(value: u8) -> Option<Self> {
        use RegionId::*;
        Some(match value {
            0 => Inv,
            1 => Eu,
            2 => Us,
            3 => Anz,
            4 => Hk,
            5 => My,
            6 => In,
            7 => Jp,
            8 => Ru,
            9 => Il,
            10 => Kr,
            11 => Cn,
            12 => UsLr1,
            13 => UsLr2,
            14 => UsLr3,
            15 => EuLr1,
            16 => EuLr2,
            17 => EuLr3,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        use RegionId::*;
        match self {
            Inv => "INV",
            Eu => "EU",
            Us => "US",
            Anz => "ANZ",
            Hk => "HK",
            My => "MY",
            In => "IN",
            Jp => "JP",
            Ru => "RU",
            Il => "IL",
            Kr => "KR",
            Cn => "CN",
            UsLr1 => "US_LR1",
            UsLr2 => "US_LR2",
            UsLr3 => "US_LR3",
            EuLr1 => "EU_LR1",
            EuLr2 => "EU_LR2",
            EuLr3 => "EU_LR3",
        }
    }

    /// Regions whose three channels all run at 100 kbit/s.
    pub fn is_three_channel(&self) -> bool {
        matches!(self, RegionId::Jp | RegionId::Kr)
    }

    /// Map a TAP region code to the RAIL region with the same channel plan.
    ///
    /// TAP numbers regions the way the Z-Wave host API does: two-channel
    /// regions from 0, three-channel regions from 0x20 and long-range
    /// end-device regions from 0x30.
    pub fn from_tap_code(code: u16) -> Option<Self> {
        use RegionId::*;
        Some(match code {
            0x00 => Eu,
            0x01 => Us,
            0x02 => Anz,
            0x03 => Hk,
            0x04 => My,
            0x05 => In,
            0x06 => Il,
            0x07 => Ru,
            0x08 => Cn,
            0x09 => UsLr1,
            0x0A => UsLr2,
            0x0B => EuLr1,
            0x0C => EuLr2,
            0x20 => Jp,
            0x21 => Kr,
            0x30 => UsLr3,
            0x31 => EuLr3,
            _ => return None,
        })
    }

    /// Whether any channel of this region runs at `baud`.
    pub fn supports(&self, baud: Baud) -> bool {
        CHANNELS[*self as usize]
            .iter()
            .flatten()
            .any(|channel| channel.baud == baud)
    }

    /// Look up a RAIL channel of this region.
    pub fn channel(&self, index: u8) -> Option<Channel> {
        CHANNELS[*self as usize].get(index as usize).copied().flatten()
    }
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// RAIL baud setting of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Baud {
    /// R1, 9.6 kbit/s
    Baud9600,
    /// R2, 40 kbit/s
    Baud40k,
    /// R3, 100 kbit/s
    Baud100k,
    /// Long range, 100 kbit/s
    Baud100kLr,
}

/// One RAIL channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub frequency_khz: u32,
    pub baud: Baud,
}

const fn ch(frequency_khz: u32, baud: Baud) -> Option<Channel> {
    Some(Channel {
        frequency_khz,
        baud,
    })
}

use Baud::*;

/// Indexed by `RegionId as usize`.
const CHANNELS: [[Option<Channel>; 4]; 18] = [
    // INV
    [ch(916_000, Baud100k), ch(908_400, Baud40k), ch(908_420, Baud9600), None],
    // EU
    [ch(869_850, Baud100k), ch(868_400, Baud40k), ch(868_420, Baud9600), None],
    // US
    [ch(916_000, Baud100k), ch(908_400, Baud40k), ch(908_420, Baud9600), None],
    // ANZ
    [ch(919_800, Baud100k), ch(921_400, Baud40k), ch(921_420, Baud9600), None],
    // HK
    [ch(919_800, Baud100k), ch(919_800, Baud40k), ch(919_820, Baud9600), None],
    // MY
    [ch(919_800, Baud100k), ch(921_400, Baud40k), ch(921_420, Baud9600), None],
    // IN
    [ch(865_200, Baud100k), ch(865_200, Baud40k), ch(865_220, Baud9600), None],
    // JP
    [ch(922_500, Baud100k), ch(923_900, Baud100k), ch(926_300, Baud100k), None],
    // RU
    [ch(869_000, Baud100k), ch(869_000, Baud40k), ch(869_020, Baud9600), None],
    // IL
    [ch(916_000, Baud100k), ch(916_000, Baud40k), ch(916_020, Baud9600), None],
    // KR
    [ch(920_900, Baud100k), ch(921_700, Baud100k), ch(923_100, Baud100k), None],
    // CN
    [ch(868_400, Baud100k), ch(868_400, Baud40k), ch(868_420, Baud9600), None],
    // US_LR1
    [
        ch(916_000, Baud100k),
        ch(908_400, Baud40k),
        ch(908_420, Baud9600),
        ch(912_000, Baud100kLr),
    ],
    // US_LR2
    [
        ch(916_000, Baud100k),
        ch(908_400, Baud40k),
        ch(908_420, Baud9600),
        ch(920_000, Baud100kLr),
    ],
    // US_LR3
    [ch(912_000, Baud100kLr), ch(920_000, Baud100kLr), None, None],
    // EU_LR1
    [
        ch(869_850, Baud100k),
        ch(868_400, Baud40k),
        ch(868_420, Baud9600),
        ch(864_400, Baud100kLr),
    ],
    // EU_LR2
    [
        ch(869_850, Baud100k),
        ch(868_400, Baud40k),
        ch(868_420, Baud9600),
        ch(866_400, Baud100kLr),
    ],
    // EU_LR3
    [ch(864_400, Baud100kLr), ch(866_400, Baud100kLr), None, None],
];
