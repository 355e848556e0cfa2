//! TAP-annotated pcap captures.
//!
//! The global header is parsed with `pcap_parser`; records are walked
//! directly over the buffer. Three link types carry Z-Wave:
//!
//! - 297 `ZWAVE_TAP`: TAP header, TLVs, then the MAC frame.
//! - 261 `ZWAVE_R1_R2` and 262 `ZWAVE_R3`: the bare MAC frame.
//!
//! TAP header and TLVs are little-endian whatever the file byte order:
//!
//! ```text
//! version(1) | reserved(1) | tlv words(2) | TLVs | MAC frame
//! TLV: type(2) | length(2) | value, padded to 4 bytes
//! ```

use bytes::Bytes;
use pcap_parser::parse_pcap_header;
use serde::Serialize;
use smallvec::smallvec;
use tracing::{debug, trace, warn};

use super::DecodeOptions;
use crate::cursor::{Cursor, Endian};
use crate::error::{DecodeFault, Error, FormatError, Result};
use crate::mac::{self, ChannelSpeed, DataRate, PhyLayout};
use crate::model::{ChunkRecord, ContainerMeta, RadioFrame, TapInfo, Timestamp};

pub const PCAP_HEADER_LEN: usize = 24;
pub const RECORD_HEADER_LEN: usize = 16;

const TLV_FCS: u16 = 0;
const TLV_RSS: u16 = 1;
const TLV_RF_INFO: u16 = 2;

/// Link types that carry Z-Wave frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// Bare frame at 9.6k or 40k. Decoded as 40k.
    ZwaveR1R2,
    /// Bare frame at 100k.
    ZwaveR3,
    /// Frame behind a TAP header.
    ZwaveTap,
}

impl LinkType {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            261 => Some(LinkType::ZwaveR1R2),
            262 => Some(LinkType::ZwaveR3),
            297 => Some(LinkType::ZwaveTap),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            LinkType::ZwaveR1R2 => 261,
            LinkType::ZwaveR3 => 262,
            LinkType::ZwaveTap => 297,
        }
    }
}

/// Global header of a pcap capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PcapGlobalHeader {
    pub version_major: u16,
    pub version_minor: u16,
    /// GMT offset of the record timestamps, in seconds.
    pub thiszone: i32,
    /// Timestamp accuracy; zero in practice.
    pub sigfigs: u32,
    pub snaplen: u32,
    pub link_type: LinkType,
    pub big_endian: bool,
    /// Record fractions are nanoseconds rather than microseconds.
    pub nanos: bool,
}

impl PcapGlobalHeader {
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < PCAP_HEADER_LEN {
            return Err(Error::Format(FormatError::FileTooShort {
                needed: PCAP_HEADER_LEN,
                actual: data.len(),
            }));
        }
        let (_, header) = parse_pcap_header(data).map_err(|e| {
            Error::Format(FormatError::InvalidFormat {
                reason: format!("pcap header: {:?}", e),
            })
        })?;
        let link_type = LinkType::from_i32(header.network.0).ok_or(Error::Format(
            FormatError::UnsupportedLinkType {
                link_type: header.network.0,
            },
        ))?;
        Ok(Self {
            version_major: header.version_major,
            version_minor: header.version_minor,
            thiszone: header.thiszone,
            sigfigs: header.sigfigs,
            snaplen: header.snaplen,
            link_type,
            big_endian: header.is_bigendian(),
            nanos: header.is_nanosecond_precision(),
        })
    }

    fn endian(&self) -> Endian {
        if self.big_endian {
            Endian::Big
        } else {
            Endian::Little
        }
    }
}

/// Start decoding a pcap capture held in memory.
///
/// Fails before any record when the link type does not carry Z-Wave.
pub fn decode_tap(data: &[u8], options: DecodeOptions) -> Result<TapRecords<'_>> {
    let header = PcapGlobalHeader::parse(data)?;
    debug!(link_type = ?header.link_type, nanos = header.nanos, "pcap capture");
    Ok(TapRecords::from_validated(data, header, options))
}

/// Lazy iterator over the records of a pcap capture.
#[derive(Debug, Clone)]
pub struct TapRecords<'a> {
    data: &'a [u8],
    header: PcapGlobalHeader,
    pos: usize,
    index: usize,
    options: DecodeOptions,
    trailing: usize,
    done: bool,
}

impl<'a> TapRecords<'a> {
    pub(crate) fn from_validated(data: &'a [u8], header: PcapGlobalHeader, options: DecodeOptions) -> Self {
        Self {
            data,
            header,
            pos: PCAP_HEADER_LEN,
            index: 0,
            options,
            trailing: 0,
            done: false,
        }
    }

    pub fn header(&self) -> &PcapGlobalHeader {
        &self.header
    }

    /// Bytes left over at the end that could not hold a record header.
    pub fn trailing_bytes(&self) -> usize {
        self.trailing
    }

    pub fn bytes_consumed(&self) -> usize {
        self.pos
    }

    fn finish(&mut self) -> Option<ChunkRecord> {
        self.done = true;
        None
    }
}

impl<'a> Iterator for TapRecords<'a> {
    type Item = ChunkRecord;

    fn next(&mut self) -> Option<ChunkRecord> {
        if self.done || self.options.limit_reached(self.index, self.pos) {
            return self.finish();
        }

        let rest = &self.data[self.pos..];
        if rest.is_empty() {
            return self.finish();
        }
        if rest.len() < RECORD_HEADER_LEN {
            warn!(
                offset = self.pos,
                bytes = rest.len(),
                "dangling bytes after the last pcap record"
            );
            self.trailing = rest.len();
            return self.finish();
        }

        let endian = self.header.endian();
        let mut cur = Cursor::new(rest);
        let (seconds, fraction, captured, original) = match read_record_header(&mut cur, endian) {
            Ok(fields) => fields,
            Err(_) => return self.finish(),
        };
        let offset = self.pos;
        let index = self.index;
        self.index += 1;

        let mut record = ChunkRecord {
            index,
            offset,
            timestamp: Timestamp::Unix {
                seconds,
                fraction,
                nanos: self.header.nanos,
            },
            length: captured,
            container: ContainerMeta::Tap {
                original_length: original,
            },
            frames: Err(DecodeFault::MissingRadioInfo),
        };

        let body = match cur.read_bytes(captured as usize) {
            Ok(body) => body,
            Err(_) => {
                let fault = DecodeFault::TruncatedChunk {
                    needed: captured as usize,
                    available: cur.remaining(),
                };
                debug!(index, %fault, "pcap record runs past the end of the capture");
                self.pos = self.data.len();
                self.done = true;
                record.frames = Err(fault);
                return Some(record);
            }
        };
        self.pos += RECORD_HEADER_LEN + body.len();

        record.frames = decode_record(self.header.link_type, body).map(|frame| smallvec![frame]);
        if let Some(fault) = record.fault() {
            debug!(index, offset, %fault, "pcap record fault");
        }
        Some(record)
    }
}

fn read_record_header(
    cur: &mut Cursor<'_>,
    endian: Endian,
) -> std::result::Result<(u32, u32, u32, u32), DecodeFault> {
    Ok((
        cur.read_u32(endian)?,
        cur.read_u32(endian)?,
        cur.read_u32(endian)?,
        cur.read_u32(endian)?,
    ))
}

/// Decode the body of one pcap record into a radio frame.
pub fn decode_record(link_type: LinkType, body: &[u8]) -> std::result::Result<RadioFrame, DecodeFault> {
    let (tap, ota, layout) = match link_type {
        LinkType::ZwaveR1R2 => (None, body, Ok(PhyLayout::ClassicTwoChannel(ChannelSpeed::R2))),
        LinkType::ZwaveR3 => (None, body, Ok(PhyLayout::ClassicTwoChannel(ChannelSpeed::R3))),
        LinkType::ZwaveTap => {
            let mut cur = Cursor::new(body);
            let info = parse_tap_header(&mut cur)?;
            let layout = match (info.region, info.raw_data_rate) {
                (Some(region), Some(rate)) => mac::resolve_tap_layout(region, rate),
                _ => Err(DecodeFault::MissingRadioInfo),
            };
            (Some(info.info), cur.rest(), layout)
        }
    };

    let ota = Bytes::copy_from_slice(ota);
    let mac = layout.and_then(|layout| mac::decode(&ota, layout));
    Ok(RadioFrame {
        trace: None,
        hw_start: None,
        hw_end: None,
        diagnostics: None,
        tap,
        ota_payload: ota,
        mac,
    })
}

struct ParsedTap {
    info: TapInfo,
    region: Option<u16>,
    raw_data_rate: Option<u16>,
}

fn parse_tap_header(cur: &mut Cursor<'_>) -> std::result::Result<ParsedTap, DecodeFault> {
    let version = cur.read_u8()?;
    cur.skip(1)?;
    let words = cur.read_u16(Endian::Little)? as usize;
    let mut tlvs = cur.take(words * 4)?;

    let mut parsed = ParsedTap {
        info: TapInfo {
            version,
            fcs_len: None,
            rss_dbm: None,
            region: None,
            data_rate: None,
            frequency_khz: None,
        },
        region: None,
        raw_data_rate: None,
    };

    while !tlvs.is_empty() {
        let tlv_type = tlvs.read_u16(Endian::Little)?;
        let len = tlvs.read_u16(Endian::Little)? as usize;
        let mut value = tlvs.take(len)?;
        // the last TLV may come without its padding
        let pad = (4 - len % 4) % 4;
        tlvs.skip(pad.min(tlvs.remaining()))?;

        match tlv_type {
            TLV_FCS => parsed.info.fcs_len = Some(value.read_u8()?),
            TLV_RSS => {
                let bits = value.read_u32(Endian::Little)?;
                parsed.info.rss_dbm = Some(f32::from_bits(bits));
            }
            TLV_RF_INFO => {
                let region = value.read_u16(Endian::Little)?;
                let rate = value.read_u16(Endian::Little)?;
                let freq = value.read_u32(Endian::Little)?;
                parsed.region = Some(region);
                parsed.raw_data_rate = Some(rate);
                parsed.info.region = Some(region);
                parsed.info.data_rate = DataRate::from_u16(rate);
                parsed.info.frequency_khz = Some(freq);
            }
            other => trace!(tlv_type = other, len, "skipping TAP TLV"),
        }
    }
    Ok(parsed)
}
