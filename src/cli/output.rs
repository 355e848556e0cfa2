//! Output formatting for decoded frames.
//!
//! Every radio frame becomes one [`FrameRow`]; a record whose envelope
//! failed to decode becomes a single row carrying only the fault. Rows are
//! printed as a table, CSV or JSON lines.

use std::fmt::Write as _;
use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

use zwtrace_core::{ChunkRecord, RadioFrame, RegionId};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table (default)
    Table,
    /// Comma-separated values
    Csv,
    /// JSON Lines (one JSON object per row)
    Json,
}

const COLUMNS: [&str; 15] = [
    "index",
    "timestamp",
    "direction",
    "region",
    "channel",
    "rssi",
    "variant",
    "home_id",
    "src",
    "dst",
    "header_type",
    "seq",
    "payload",
    "crc_ok",
    "fault",
];

/// One output row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameRow {
    pub index: usize,
    pub timestamp: String,
    pub direction: Option<String>,
    pub region: Option<String>,
    pub channel: Option<u8>,
    pub rssi: Option<f32>,
    pub variant: Option<&'static str>,
    pub home_id: Option<String>,
    pub src: Option<u16>,
    pub dst: Option<u16>,
    pub header_type: Option<&'static str>,
    pub seq: Option<u8>,
    pub payload: Option<String>,
    pub crc_ok: Option<bool>,
    pub fault: Option<String>,
}

impl FrameRow {
    /// Rows for every frame of a record.
    pub fn from_record(record: &ChunkRecord) -> Vec<FrameRow> {
        let base = FrameRow {
            index: record.index,
            timestamp: record.timestamp.to_string(),
            ..Default::default()
        };
        match &record.frames {
            Err(fault) => vec![FrameRow {
                fault: Some(fault.to_string()),
                ..base
            }],
            Ok(frames) => frames
                .iter()
                .map(|frame| Self::from_frame(base.clone(), frame))
                .collect(),
        }
    }

    fn from_frame(mut row: FrameRow, frame: &RadioFrame) -> FrameRow {
        row.rssi = frame.rssi_dbm();
        if let Some(diag) = &frame.diagnostics {
            row.direction = Some(diag.direction.to_string());
            row.region = Some(region_name(diag.region as u16));
            row.channel = Some(diag.channel_number);
        } else if let Some(tap) = &frame.tap {
            row.region = tap.region.map(tap_region_name);
        }

        match &frame.mac {
            Ok(mac) => {
                row.variant = Some(mac.variant_name());
                row.home_id = mac.home_id().map(|id| format!("{:08X}", id));
                row.src = mac.src_node_id();
                row.dst = mac.dst_node_id();
                row.header_type = mac.header_type().map(|h| h.name());
                row.seq = mac.sequence_number();
                row.payload = mac.payload().map(|p| hex(p));
                row.crc_ok = mac.crc_valid();
            }
            Err(fault) => {
                row.payload = Some(hex(&frame.ota_payload));
                row.fault = Some(fault.to_string());
            }
        }
        row
    }

    fn cells(&self) -> [String; 15] {
        fn opt<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(|v| v.to_string()).unwrap_or_default()
        }
        [
            self.index.to_string(),
            self.timestamp.clone(),
            opt(&self.direction),
            opt(&self.region),
            opt(&self.channel),
            self.rssi.map(|r| format!("{:.1}", r)).unwrap_or_default(),
            opt(&self.variant),
            opt(&self.home_id),
            opt(&self.src),
            opt(&self.dst),
            opt(&self.header_type),
            opt(&self.seq),
            opt(&self.payload),
            opt(&self.crc_ok),
            opt(&self.fault),
        ]
    }
}

fn region_name(region: u16) -> String {
    u8::try_from(region)
        .ok()
        .and_then(RegionId::from_u8)
        .map(|r| r.name().to_string())
        .unwrap_or_else(|| region.to_string())
}

fn tap_region_name(code: u16) -> String {
    RegionId::from_tap_code(code)
        .map(|r| r.name().to_string())
        .unwrap_or_else(|| code.to_string())
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02X}", b);
    }
    out
}

/// Writes rows as they are produced.
///
/// CSV and JSON rows go straight to the writer. A table needs every row to
/// size its columns, so table rows are held until [`finish`](Self::finish).
pub struct OutputFormatter<W: Write> {
    format: OutputFormat,
    writer: W,
    table_rows: Vec<FrameRow>,
}

impl<W: Write> OutputFormatter<W> {
    /// Create a formatter and write the CSV header if needed.
    pub fn new(format: OutputFormat, mut writer: W) -> std::io::Result<Self> {
        if format == OutputFormat::Csv {
            writeln!(writer, "{}", COLUMNS.join(","))?;
        }
        Ok(Self {
            format,
            writer,
            table_rows: Vec::new(),
        })
    }

    pub fn write_row(&mut self, row: FrameRow) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Table => {
                self.table_rows.push(row);
                Ok(())
            }
            OutputFormat::Csv => self.write_csv(&row),
            OutputFormat::Json => self.write_json(&row),
        }
    }

    /// Write any held rows, flush, and hand the writer back.
    pub fn finish(mut self) -> std::io::Result<W> {
        if self.format == OutputFormat::Table {
            self.write_table()?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_table(&mut self) -> std::io::Result<()> {
        use comfy_table::{Cell, Table};

        let mut table = Table::new();
        table.set_header(COLUMNS.iter().map(Cell::new).collect::<Vec<_>>());
        for row in &self.table_rows {
            table.add_row(row.cells().into_iter().map(Cell::new).collect::<Vec<_>>());
        }

        writeln!(self.writer, "{table}")
    }

    fn write_csv(&mut self, row: &FrameRow) -> std::io::Result<()> {
        let values: Vec<String> = row
            .cells()
            .into_iter()
            .map(|value| {
                // Escape commas and quotes
                if value.contains(',') || value.contains('"') || value.contains('\n') {
                    format!("\"{}\"", value.replace('"', "\"\""))
                } else {
                    value
                }
            })
            .collect();
        writeln!(self.writer, "{}", values.join(","))
    }

    fn write_json(&mut self, row: &FrameRow) -> std::io::Result<()> {
        let line = serde_json::to_string(row).map_err(std::io::Error::other)?;
        writeln!(self.writer, "{}", line)
    }
}
