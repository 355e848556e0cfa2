//! Test utilities for the container readers.
//!
//! Holds two real WPK trace frames and builders for wrapping frames into ZLF
//! and pcap captures.

use crate::container::zlf::{API_TYPE_PTI, ZLF_HEADER_LEN};

/// v2 DCH frame: received ACK from node 2 to node 1, EU channel 1, RSSI 0x1C.
pub const V2_RX_ACK: [u8; 32] = [
    0x5B, 0x1E, 0x00, 0x02, 0x00, 0xCC, 0x9D, 0x29, 0xC5, 0x01, 0x05, 0x2A, 0x00, 0x6C, 0xF8, 0xDF,
    0xEE, 0xBB, 0x0C, 0x02, 0x03, 0x82, 0x0A, 0x01, 0xF1, 0xF9, 0x1C, 0x01, 0x01, 0x06, 0x51, 0x5D,
];

/// v3 DCH frame: transmitted NOP from node 1 to node 2, EU channel 1.
pub const V3_TX_NOP: [u8; 39] = [
    0x5B, 0x25, 0x00, 0x03, 0x00, 0xCC, 0x9D, 0x29, 0xC5, 0x01, 0x05, 0x00, 0x00, 0x29, 0x00, 0x00,
    0x00, 0x00, 0x00, 0xB9, 0x6C, 0xFC, 0xDF, 0xEE, 0xBB, 0x0C, 0x01, 0x41, 0x02, 0x0B, 0x02, 0x00,
    0x32, 0xFD, 0x01, 0x01, 0x06, 0x09, 0x5D,
];

/// OTA bytes of the ACK inside [`V2_RX_ACK`].
pub const ACK_OTA: [u8; 10] = [0xDF, 0xEE, 0xBB, 0x0C, 0x02, 0x03, 0x82, 0x0A, 0x01, 0xF1];

/// 2024-01-01T00:00:00Z as UTC `DateTime` ticks.
pub const TICKS_2024: u64 = 638_396_640_000_000_000 | (1 << 62);

/// A ZLF file header followed by the given chunks.
pub fn zlf_file(chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut file = vec![0u8; ZLF_HEADER_LEN];
    file[0] = 0x68;
    file[ZLF_HEADER_LEN - 2] = 0x23;
    file[ZLF_HEADER_LEN - 1] = 0x12;
    for chunk in chunks {
        file.extend_from_slice(chunk);
    }
    file
}

/// One ZLF chunk with the given properties byte, body and api type.
pub fn zlf_chunk(properties: u8, body: &[u8], api_type: u8) -> Vec<u8> {
    let mut chunk = Vec::with_capacity(14 + body.len());
    chunk.extend_from_slice(&TICKS_2024.to_le_bytes());
    chunk.push(properties);
    chunk.extend_from_slice(&(body.len() as u32).to_le_bytes());
    chunk.extend_from_slice(body);
    chunk.push(api_type);
    chunk
}

/// PTI chunk of an RX trace frame.
pub fn pti_chunk(body: &[u8]) -> Vec<u8> {
    zlf_chunk(0x00, body, API_TYPE_PTI)
}

/// Builder for the TAP pseudo-header and TLVs in front of a MAC frame.
#[derive(Debug, Clone)]
pub struct TapRecordBuilder {
    version: u8,
    fcs_len: Option<u8>,
    rss: Option<f32>,
    rf_info: Option<(u16, u16, u32)>,
    extra_tlvs: Vec<(u16, Vec<u8>)>,
    frame: Vec<u8>,
}

impl Default for TapRecordBuilder {
    fn default() -> Self {
        Self {
            version: 1,
            fcs_len: Some(1),
            rss: Some(-62.5),
            // EU, 40 kbit/s, 868.4 MHz
            rf_info: Some((0, 1, 868_400)),
            extra_tlvs: Vec::new(),
            frame: ACK_OTA.to_vec(),
        }
    }
}

impl TapRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fcs_len(mut self, len: Option<u8>) -> Self {
        self.fcs_len = len;
        self
    }

    pub fn rss(mut self, rss: Option<f32>) -> Self {
        self.rss = rss;
        self
    }

    pub fn rf_info(mut self, region: u16, data_rate: u16, frequency_khz: u32) -> Self {
        self.rf_info = Some((region, data_rate, frequency_khz));
        self
    }

    pub fn no_rf_info(mut self) -> Self {
        self.rf_info = None;
        self
    }

    pub fn tlv(mut self, tlv_type: u16, value: Vec<u8>) -> Self {
        self.extra_tlvs.push((tlv_type, value));
        self
    }

    pub fn frame(mut self, frame: &[u8]) -> Self {
        self.frame = frame.to_vec();
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut tlvs = Vec::new();
        if let Some(len) = self.fcs_len {
            push_tlv(&mut tlvs, 0, &[len]);
        }
        if let Some(rss) = self.rss {
            push_tlv(&mut tlvs, 1, &rss.to_le_bytes());
        }
        if let Some((region, rate, freq)) = self.rf_info {
            let mut value = Vec::with_capacity(8);
            value.extend_from_slice(&region.to_le_bytes());
            value.extend_from_slice(&rate.to_le_bytes());
            value.extend_from_slice(&freq.to_le_bytes());
            push_tlv(&mut tlvs, 2, &value);
        }
        for (tlv_type, value) in &self.extra_tlvs {
            push_tlv(&mut tlvs, *tlv_type, value);
        }

        let mut record = Vec::with_capacity(4 + tlvs.len() + self.frame.len());
        record.push(self.version);
        record.push(0);
        record.extend_from_slice(&((tlvs.len() / 4) as u16).to_le_bytes());
        record.extend_from_slice(&tlvs);
        record.extend_from_slice(&self.frame);
        record
    }
}

fn push_tlv(out: &mut Vec<u8>, tlv_type: u16, value: &[u8]) {
    out.extend_from_slice(&tlv_type.to_le_bytes());
    out.extend_from_slice(&(value.len() as u16).to_le_bytes());
    out.extend_from_slice(value);
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

/// Builder for classic pcap files.
#[derive(Debug, Clone)]
pub struct PcapBuilder {
    link_type: u32,
    big_endian: bool,
    nanos: bool,
    thiszone: i32,
    records: Vec<Vec<u8>>,
}

impl Default for PcapBuilder {
    fn default() -> Self {
        Self {
            link_type: 297,
            big_endian: false,
            nanos: false,
            thiszone: 0,
            records: Vec::new(),
        }
    }
}

impl PcapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link_type(mut self, link_type: u32) -> Self {
        self.link_type = link_type;
        self
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    pub fn nanos(mut self) -> Self {
        self.nanos = true;
        self
    }

    pub fn thiszone(mut self, offset: i32) -> Self {
        self.thiszone = offset;
        self
    }

    /// Add a record stamped 1704067200.250 with `captured == original`.
    pub fn record(mut self, data: &[u8]) -> Self {
        let fraction = if self.nanos { 250_000_000 } else { 250_000 };
        let mut record = Vec::with_capacity(16 + data.len());
        for value in [1_704_067_200, fraction, data.len() as u32, data.len() as u32] {
            record.extend_from_slice(&self.u32_bytes(value));
        }
        record.extend_from_slice(data);
        self.records.push(record);
        self
    }

    /// Add raw bytes after the last record.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.records.push(bytes.to_vec());
        self
    }

    fn u32_bytes(&self, value: u32) -> [u8; 4] {
        if self.big_endian {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        }
    }

    fn u16_bytes(&self, value: u16) -> [u8; 2] {
        if self.big_endian {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        }
    }

    pub fn build(self) -> Vec<u8> {
        let magic = if self.nanos { 0xA1B2_3C4D } else { 0xA1B2_C3D4 };
        let mut file = Vec::new();
        file.extend_from_slice(&self.u32_bytes(magic));
        file.extend_from_slice(&self.u16_bytes(2));
        file.extend_from_slice(&self.u16_bytes(4));
        file.extend_from_slice(&self.u32_bytes(self.thiszone as u32));
        file.extend_from_slice(&self.u32_bytes(0));
        file.extend_from_slice(&self.u32_bytes(65_535));
        file.extend_from_slice(&self.u32_bytes(self.link_type));
        for record in &self.records {
            file.extend_from_slice(record);
        }
        file
    }
}
