//! Capture builders shared by the integration tests.

#![allow(dead_code)]

pub const V2_RX_ACK: [u8; 32] = [
    0x5B, 0x1E, 0x00, 0x02, 0x00, 0xCC, 0x9D, 0x29, 0xC5, 0x01, 0x05, 0x2A, 0x00, 0x6C, 0xF8, 0xDF,
    0xEE, 0xBB, 0x0C, 0x02, 0x03, 0x82, 0x0A, 0x01, 0xF1, 0xF9, 0x1C, 0x01, 0x01, 0x06, 0x51, 0x5D,
];

pub const V3_TX_NOP: [u8; 39] = [
    0x5B, 0x25, 0x00, 0x03, 0x00, 0xCC, 0x9D, 0x29, 0xC5, 0x01, 0x05, 0x00, 0x00, 0x29, 0x00, 0x00,
    0x00, 0x00, 0x00, 0xB9, 0x6C, 0xFC, 0xDF, 0xEE, 0xBB, 0x0C, 0x01, 0x41, 0x02, 0x0B, 0x02, 0x00,
    0x32, 0xFD, 0x01, 0x01, 0x06, 0x09, 0x5D,
];

pub const ACK_OTA: [u8; 10] = [0xDF, 0xEE, 0xBB, 0x0C, 0x02, 0x03, 0x82, 0x0A, 0x01, 0xF1];

/// RSSI and appended-info bytes of an RX frame on EU channel 1.
pub const EU_RX_TRAILER: [u8; 5] = [0x1C, 0x01, 0x01, 0x06, 0x51];

pub const TICKS_2024: u64 = 638_396_640_000_000_000 | (1 << 62);

pub fn zlf_file(chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut file = vec![0u8; 2048];
    file[0] = 0x68;
    file[2046] = 0x23;
    file[2047] = 0x12;
    for chunk in chunks {
        file.extend_from_slice(chunk);
    }
    file
}

pub fn zlf_chunk(properties: u8, body: &[u8], api_type: u8) -> Vec<u8> {
    let mut chunk = Vec::new();
    chunk.extend_from_slice(&TICKS_2024.to_le_bytes());
    chunk.push(properties);
    chunk.extend_from_slice(&(body.len() as u32).to_le_bytes());
    chunk.extend_from_slice(body);
    chunk.push(api_type);
    chunk
}

pub fn pti_chunk(body: &[u8]) -> Vec<u8> {
    zlf_chunk(0x00, body, 0xF5)
}

/// A v2 RX trace frame wrapping `ota` with the EU channel 1 trailer.
pub fn v2_rx_frame(ota: &[u8]) -> Vec<u8> {
    v2_frame(ota, &EU_RX_TRAILER)
}

/// RSSI and appended-info bytes of an RX frame on `(region, channel)`.
pub fn rx_trailer(region: u8, channel: u8) -> [u8; 5] {
    [0x1C, region & 0x1F, channel & 0x3F, 0x06, 0x51]
}

/// A v2 RX trace frame wrapping `ota` with the given RSSI and trailer.
pub fn v2_frame(ota: &[u8], trailer: &[u8; 5]) -> Vec<u8> {
    let length = 13 + 1 + ota.len() + 1 + trailer.len();
    let mut frame = vec![0x5B];
    frame.extend_from_slice(&(length as u16).to_le_bytes());
    frame.extend_from_slice(&[0x02, 0x00]);
    frame.extend_from_slice(&[0x10, 0x27, 0x00, 0x00, 0x00, 0x00]);
    frame.extend_from_slice(&[0x2A, 0x00, 0x01]);
    frame.push(0xF8);
    frame.extend_from_slice(ota);
    frame.push(0xF9);
    frame.extend_from_slice(trailer);
    frame.push(0x5D);
    frame
}

/// Classic two-channel ACK with a 2-byte CRC (100k).
pub const ACK_OTA_R3: [u8; 11] = [0xDF, 0xEE, 0xBB, 0x0C, 0x02, 0x03, 0x82, 0x0B, 0x01, 0x00, 0x00];

/// Classic three-channel ACK: separate sequence byte, 2-byte CRC.
pub const ACK_OTA_3CH: [u8; 12] = [0xDF, 0xEE, 0xBB, 0x0C, 0x02, 0x03, 0x00, 0x0C, 0x07, 0x01, 0x00, 0x00];

/// Long-range frame with an empty payload.
pub const LR_OTA: [u8; 14] = [
    0xE1, 0x5A, 0x0C, 0x33, 0x00, 0x11, 0x00, 0x0E, 0x81, 0x07, 0xA6, 0x0E, 0x00, 0x00,
];

/// TAP header with FCS, RSS and RF-information TLVs, then `frame`.
pub fn tap_record(region: u16, data_rate: u16, frame: &[u8]) -> Vec<u8> {
    let mut record = vec![0x01, 0x00, 0x07, 0x00];
    // FCS length 1
    record.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00]);
    record.extend_from_slice(&[0x01, 0x00, 0x04, 0x00]);
    record.extend_from_slice(&(-70.0f32).to_le_bytes());
    record.extend_from_slice(&[0x02, 0x00, 0x08, 0x00]);
    record.extend_from_slice(&region.to_le_bytes());
    record.extend_from_slice(&data_rate.to_le_bytes());
    record.extend_from_slice(&868_400u32.to_le_bytes());
    record.extend_from_slice(frame);
    record
}

/// Little-endian µs pcap file.
pub fn pcap_file(link_type: u32, records: &[Vec<u8>]) -> Vec<u8> {
    let mut file = Vec::new();
    file.extend_from_slice(&0xA1B2_C3D4u32.to_le_bytes());
    file.extend_from_slice(&2u16.to_le_bytes());
    file.extend_from_slice(&4u16.to_le_bytes());
    file.extend_from_slice(&0u32.to_le_bytes());
    file.extend_from_slice(&0u32.to_le_bytes());
    file.extend_from_slice(&65_535u32.to_le_bytes());
    file.extend_from_slice(&link_type.to_le_bytes());
    for (i, data) in records.iter().enumerate() {
        file.extend_from_slice(&(1_704_067_200 + i as u32).to_le_bytes());
        file.extend_from_slice(&0u32.to_le_bytes());
        file.extend_from_slice(&(data.len() as u32).to_le_bytes());
        file.extend_from_slice(&(data.len() as u32).to_le_bytes());
        file.extend_from_slice(data);
    }
    file
}
