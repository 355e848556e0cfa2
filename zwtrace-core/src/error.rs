//! Error types for zwtrace-core.
//!
//! Two levels of failure exist when decoding a capture:
//!
//! - [`enum@Error`] - capture-level errors. Bad magic, an unsupported link type
//!   or an unreadable file abort decoding before any record is produced.
//! - [`DecodeFault`] - per-record faults. They are stored on the
//!   [`ChunkRecord`](crate::model::ChunkRecord) they belong to and decoding of
//!   the following records continues.
//!
//! All errors implement `std::error::Error` and can be converted to `anyhow::Error`.

use serde::Serialize;
use thiserror::Error;

/// Main error type for zwtrace-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The container could not be recognized or is not a Z-Wave capture
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to the container format as a whole.
#[derive(Error, Debug)]
pub enum FormatError {
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Neither a ZLF trace nor a pcap capture
    #[error("Invalid capture format: {reason}")]
    InvalidFormat { reason: String },

    /// The pcap header declares a link type that does not carry Z-Wave frames
    #[error("Unsupported link type: {link_type}")]
    UnsupportedLinkType { link_type: i32 },

    /// Input ends before the container header does
    #[error("File too short: need {needed} bytes, got {actual}")]
    FileTooShort { needed: usize, actual: usize },
}

/// Fault recorded on a single record or radio frame.
///
/// Faults never abort the capture; the container reader resynchronizes on the
/// next record boundary using the declared record length.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeFault {
    /// A structural sentinel byte does not have its expected value
    #[error("{layer}: invalid marker {found:#04x}")]
    InvalidMarker { layer: &'static str, found: u8 },

    /// Trace-frame version other than 2 or 3
    #[error("unsupported trace frame version {0}")]
    UnsupportedVersion(u16),

    /// Input exhausted before a declared length was satisfied
    #[error("truncated: need {needed} bytes, have {available}")]
    TruncatedChunk { needed: usize, available: usize },

    /// No MAC layout is defined for this radio configuration
    #[error("unsupported region {region} / channel {channel}")]
    UnsupportedRegionChannelCombination { region: u16, channel: u16 },

    /// A computed size would be negative
    #[error("{layer}: length underflow (length {length} < minimum {minimum})")]
    LengthUnderflow {
        layer: &'static str,
        length: usize,
        minimum: usize,
    },

    /// DCH trace type that does not carry a PTI radio payload
    #[error("unsupported trace type {0:#06x}")]
    UnsupportedTraceType(u16),

    /// PTI protocol id other than Z-Wave
    #[error("unsupported radio protocol id {0}")]
    UnsupportedProtocol(u8),

    /// ZLF api type other than PTI
    #[error("unsupported ZLF api type {0:#04x}")]
    UnsupportedApiType(u8),

    /// TAP record without an RF information TLV
    #[error("TAP record carries no RF information")]
    MissingRadioInfo,
}

impl DecodeFault {
    /// Short machine-friendly name of the fault cause.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeFault::InvalidMarker { .. } => "invalid_marker",
            DecodeFault::UnsupportedVersion(_) => "unsupported_version",
            DecodeFault::TruncatedChunk { .. } => "truncated_chunk",
            DecodeFault::UnsupportedRegionChannelCombination { .. } => {
                "unsupported_region_channel_combination"
            }
            DecodeFault::LengthUnderflow { .. } => "length_underflow",
            DecodeFault::UnsupportedTraceType(_) => "unsupported_trace_type",
            DecodeFault::UnsupportedProtocol(_) => "unsupported_protocol",
            DecodeFault::UnsupportedApiType(_) => "unsupported_api_type",
            DecodeFault::MissingRadioInfo => "missing_radio_info",
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
