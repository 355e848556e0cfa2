//! ZLF decoding end to end.

mod common;

use std::io::Write;

use common::*;
use zwtrace_core::mac::{Crc, HeaderType, MacFrame};
use zwtrace_core::prelude::*;
use zwtrace_core::radio::HwMarker;
use zwtrace_core::{decode_zlf, ContainerMeta};

#[test]
fn test_real_wpk_frames_decode() {
    let file = zlf_file(&[zlf_chunk(0x00, &V2_RX_ACK, 0xF5), zlf_chunk(0x01, &V3_TX_NOP, 0xF5)]);
    let records: Vec<_> = decode_zlf(&file, DecodeOptions::default()).unwrap().collect();
    assert_eq!(records.len(), 2);

    let ack = records[0].frame().unwrap();
    assert_eq!(records[0].timestamp.unix_micros(), 1_704_067_200_000_000);
    assert_eq!(ack.hw_start, Some(HwMarker::from_u8(0xF8).unwrap()));
    let diag = ack.diagnostics.as_ref().unwrap();
    assert_eq!(diag.direction, Direction::Rx);
    assert_eq!(diag.region, 1);
    assert_eq!(diag.channel_number, 1);
    assert_eq!(diag.rssi, Some(0x1C));

    let mac = ack.mac.as_ref().unwrap();
    assert_eq!(mac.variant_name(), "classic_2ch");
    assert_eq!(mac.home_id(), Some(0xDFEE_BB0C));
    assert_eq!(mac.src_node_id(), Some(2));
    assert_eq!(mac.dst_node_id(), Some(1));
    assert_eq!(mac.header_type(), Some(HeaderType::Ack));
    assert_eq!(mac.sequence_number(), Some(2));
    assert_eq!(mac.crc(), Some(Crc::One(0xF1)));
    assert_eq!(mac.crc_valid(), Some(true));

    let nop = records[1].frame().unwrap();
    assert_eq!(
        records[1].container,
        ContainerMeta::Zlf {
            is_outcome: false,
            session_id: 1,
            api_type: 0xF5
        }
    );
    let diag = nop.diagnostics.as_ref().unwrap();
    assert_eq!(diag.direction, Direction::Tx);
    assert_eq!(diag.rssi, None);
    match nop.mac.as_ref().unwrap() {
        MacFrame::ClassicTwoChannel(f) => {
            assert_eq!(f.header_type, HeaderType::Singlecast);
            assert!(f.ack_request);
            assert_eq!(f.length, 11);
            assert_eq!(f.payload.bytes().as_ref(), &[0x00]);
            assert_eq!(f.crc, Crc::One(0x32));
            assert!(f.crc_valid);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_minimal_rx_chunk() {
    // length 22: 13 header, start marker, 2 OTA bytes, end marker, RSSI, 4 trailer
    let frame = v2_rx_frame(&[0xAA, 0xBB]);
    assert_eq!(u16::from_le_bytes([frame[1], frame[2]]), 22);

    let file = zlf_file(&[pti_chunk(&frame)]);
    let records: Vec<_> = decode_zlf(&file, DecodeOptions::default()).unwrap().collect();
    assert_eq!(records.len(), 1);

    let frame = records[0].frame().unwrap();
    assert_eq!(frame.trace.as_ref().unwrap().version, 2);
    assert_eq!(frame.ota_payload.len(), 2);
    assert!(frame.diagnostics.as_ref().unwrap().rssi.is_some());
    // two bytes cannot hold a MAC header
    assert!(matches!(frame.mac, Err(DecodeFault::TruncatedChunk { .. })));
}

#[test]
fn test_declared_length_past_end() {
    let mut chunk = pti_chunk(&V3_TX_NOP);
    chunk.truncate(20);
    let file = zlf_file(&[pti_chunk(&V2_RX_ACK), chunk]);

    let records: Vec<_> = decode_zlf(&file, DecodeOptions::default()).unwrap().collect();
    assert_eq!(records.len(), 2);
    assert!(records[0].is_ok());
    assert!(matches!(records[1].fault(), Some(DecodeFault::TruncatedChunk { .. })));
}

#[test]
fn test_faults_do_not_stop_capture() {
    let mut bad_version = V2_RX_ACK;
    bad_version[3] = 0x07;
    let file = zlf_file(&[
        pti_chunk(&bad_version),
        zlf_chunk(0x00, &[0x01, 0x02], 0x42),
        pti_chunk(&V3_TX_NOP),
    ]);
    let faults: Vec<_> = decode_zlf(&file, DecodeOptions::default())
        .unwrap()
        .map(|r| r.fault().map(DecodeFault::kind))
        .collect();
    assert_eq!(
        faults,
        vec![Some("unsupported_version"), Some("unsupported_api_type"), None]
    );
}

#[test]
fn test_capture_source_from_file() {
    let file = zlf_file(&[pti_chunk(&V2_RX_ACK), pti_chunk(&V3_TX_NOP)]);
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(&file).unwrap();

    let source = CaptureSource::open(tmp.path()).unwrap();
    assert_eq!(source.format(), CaptureFormat::Zlf);
    let capture = source.decode(DecodeOptions::new().with_max_records(1)).unwrap();
    let records: Vec<_> = capture.chunks().collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].index, 0);
}

#[test]
fn test_records_serialize() {
    let file = zlf_file(&[pti_chunk(&V2_RX_ACK)]);
    let record = decode_zlf(&file, DecodeOptions::default())
        .unwrap()
        .next()
        .unwrap();
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["index"], 0);
    assert_eq!(json["container"]["container"], "zlf");
    assert_eq!(json["frames"]["Ok"][0]["mac"]["Ok"]["variant"], "classic_two_channel");
}

/// Variant name and CRC width each `(region, channel)` pair must decode to.
fn expected_layout(region: u8, channel: u8) -> Option<(&'static str, usize)> {
    const R3: (&str, usize) = ("classic_2ch", 2);
    const R2: (&str, usize) = ("classic_2ch", 1);
    const R1: (&str, usize) = ("classic_2ch", 1);
    const THREE: (&str, usize) = ("classic_3ch", 2);
    const LR: (&str, usize) = ("long_range", 2);

    if channel == 3 {
        return Some(LR);
    }
    match (region, channel) {
        // JP, KR
        (7 | 10, 0..=2) => Some(THREE),
        // US_LR3, EU_LR3
        (14 | 17, 0 | 1) => Some(LR),
        (14 | 17, _) => None,
        (0..=17, 0) => Some(R3),
        (0..=17, 1) => Some(R2),
        (0..=17, 2) => Some(R1),
        _ => None,
    }
}

fn ota_for(layout: (&str, usize)) -> &'static [u8] {
    match layout {
        ("classic_3ch", _) => &ACK_OTA_3CH[..],
        ("long_range", _) => &LR_OTA[..],
        (_, 2) => &ACK_OTA_R3[..],
        _ => &ACK_OTA[..],
    }
}

#[test]
fn test_every_region_channel_pair_dispatches() {
    for region in 0u8..=20 {
        for channel in 0u8..=5 {
            let expected = expected_layout(region, channel);
            let ota = expected.map(ota_for).unwrap_or(&ACK_OTA[..]);
            let file = zlf_file(&[pti_chunk(&v2_frame(ota, &rx_trailer(region, channel)))]);
            let record = decode_zlf(&file, DecodeOptions::default())
                .unwrap()
                .next()
                .unwrap();
            let frame = record.frame().unwrap();
            let diag = frame.diagnostics.as_ref().unwrap();
            assert_eq!((diag.region, diag.channel_number), (region, channel));

            match expected {
                Some((variant, crc_width)) => {
                    let mac = frame
                        .mac
                        .as_ref()
                        .unwrap_or_else(|e| panic!("region {region} channel {channel}: {e}"));
                    assert_eq!(mac.variant_name(), variant, "region {region} channel {channel}");
                    let width = match mac.crc().unwrap() {
                        Crc::One(_) => 1,
                        Crc::Two(_) => 2,
                    };
                    assert_eq!(width, crc_width, "region {region} channel {channel}");
                }
                None => assert_eq!(
                    frame.mac,
                    Err(DecodeFault::UnsupportedRegionChannelCombination {
                        region: region as u16,
                        channel: channel as u16
                    }),
                    "region {region} channel {channel}"
                ),
            }
        }
    }
}

#[test]
fn test_long_range_and_three_channel_through_trailer() {
    let file = zlf_file(&[
        pti_chunk(&v2_frame(&ACK_OTA_3CH, &rx_trailer(7, 1))),
        pti_chunk(&v2_frame(&LR_OTA, &rx_trailer(17, 0))),
        // channel 3 on EU is the long-range channel
        pti_chunk(&v2_frame(&LR_OTA, &rx_trailer(1, 3))),
    ]);
    let records: Vec<_> = decode_zlf(&file, DecodeOptions::default()).unwrap().collect();
    assert_eq!(records.len(), 3);

    match records[0].frame().unwrap().mac.as_ref().unwrap() {
        MacFrame::ClassicThreeChannel(f) => {
            assert_eq!(f.sequence_number, 7);
            assert_eq!(f.length, 12);
        }
        other => panic!("unexpected {:?}", other),
    }
    for record in &records[1..] {
        match record.frame().unwrap().mac.as_ref().unwrap() {
            MacFrame::LongRange(f) => {
                assert_eq!(f.home_id, 0xE15A_0C33);
                assert_eq!(f.dst_node_id, 0x100);
                assert!(f.payload.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
