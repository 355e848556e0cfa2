//! Container readers.
//!
//! Both readers are lazy iterators over an immutable buffer. Each call to
//! `next` yields one [`ChunkRecord`]; per-record faults are stored on the
//! record and iteration resumes at the next record boundary. A [`Capture`]
//! hands out fresh iterators, so a capture can be walked more than once.

pub mod tap;
pub mod zlf;

pub use tap::{decode_tap, LinkType, PcapGlobalHeader, TapRecords};
pub use zlf::{decode_zlf, ZlfChunkHeader, ZlfChunks};

use serde::Serialize;

use crate::error::{Error, FormatError, Result};
use crate::format::CaptureFormat;
use crate::model::ChunkRecord;

/// Caller-supplied limits for partial decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Stop after this many records.
    pub max_records: Option<usize>,
    /// Stop once this many capture bytes (container header included) have
    /// been consumed. The record that crosses the limit is still produced.
    pub max_bytes: Option<usize>,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = Some(max);
        self
    }

    pub fn with_max_bytes(mut self, max: usize) -> Self {
        self.max_bytes = Some(max);
        self
    }

    pub(crate) fn limit_reached(&self, records: usize, bytes: usize) -> bool {
        self.max_records.is_some_and(|max| records >= max)
            || self.max_bytes.is_some_and(|max| bytes >= max)
    }
}

/// Container-level metadata of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum CaptureHeader {
    /// The 2048-byte ZLF header is opaque.
    Zlf,
    Pcap(PcapGlobalHeader),
}

/// A validated capture ready to be iterated.
#[derive(Debug, Clone)]
pub struct Capture<'a> {
    data: &'a [u8],
    header: CaptureHeader,
    options: DecodeOptions,
}

impl<'a> Capture<'a> {
    /// Detect the container format and validate its header.
    pub fn from_bytes(data: &'a [u8], options: DecodeOptions) -> Result<Self> {
        let header = match CaptureFormat::detect(data) {
            CaptureFormat::Zlf => {
                decode_zlf(data, options)?;
                CaptureHeader::Zlf
            }
            CaptureFormat::TapCapture => CaptureHeader::Pcap(*decode_tap(data, options)?.header()),
            CaptureFormat::Unknown => {
                return Err(Error::Format(FormatError::InvalidFormat {
                    reason: "neither a ZLF trace nor a pcap capture".into(),
                }))
            }
        };
        Ok(Self {
            data,
            header,
            options,
        })
    }

    pub fn header(&self) -> &CaptureHeader {
        &self.header
    }

    pub fn format(&self) -> CaptureFormat {
        match self.header {
            CaptureHeader::Zlf => CaptureFormat::Zlf,
            CaptureHeader::Pcap(_) => CaptureFormat::TapCapture,
        }
    }

    /// A fresh iterator from the first record.
    pub fn chunks(&self) -> Chunks<'a> {
        match self.header {
            CaptureHeader::Zlf => Chunks::Zlf(ZlfChunks::from_validated(self.data, self.options)),
            CaptureHeader::Pcap(header) => {
                Chunks::Tap(TapRecords::from_validated(self.data, header, self.options))
            }
        }
    }
}

/// Iterator over the records of either container.
#[derive(Debug, Clone)]
pub enum Chunks<'a> {
    Zlf(ZlfChunks<'a>),
    Tap(TapRecords<'a>),
}

impl Chunks<'_> {
    /// Bytes left over at the end that could not hold a record header.
    pub fn trailing_bytes(&self) -> usize {
        match self {
            Chunks::Zlf(it) => it.trailing_bytes(),
            Chunks::Tap(it) => it.trailing_bytes(),
        }
    }

    pub fn bytes_consumed(&self) -> usize {
        match self {
            Chunks::Zlf(it) => it.bytes_consumed(),
            Chunks::Tap(it) => it.bytes_consumed(),
        }
    }
}

impl Iterator for Chunks<'_> {
    type Item = ChunkRecord;

    fn next(&mut self) -> Option<ChunkRecord> {
        match self {
            Chunks::Zlf(it) => it.next(),
            Chunks::Tap(it) => it.next(),
        }
    }
}
