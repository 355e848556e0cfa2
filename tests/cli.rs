//! End-to-end tests of the zwtrace binary.

use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;

const V2_RX_ACK: [u8; 32] = [
    0x5B, 0x1E, 0x00, 0x02, 0x00, 0xCC, 0x9D, 0x29, 0xC5, 0x01, 0x05, 0x2A, 0x00, 0x6C, 0xF8, 0xDF,
    0xEE, 0xBB, 0x0C, 0x02, 0x03, 0x82, 0x0A, 0x01, 0xF1, 0xF9, 0x1C, 0x01, 0x01, 0x06, 0x51, 0x5D,
];

fn zlf_capture(bodies: &[(&[u8], u8)]) -> NamedTempFile {
    let mut file = vec![0u8; 2048];
    file[0] = 0x68;
    file[2046] = 0x23;
    file[2047] = 0x12;
    for (body, api_type) in bodies {
        file.extend_from_slice(&(638_396_640_000_000_000u64 | (1 << 62)).to_le_bytes());
        file.push(0x00);
        file.extend_from_slice(&(body.len() as u32).to_le_bytes());
        file.extend_from_slice(body);
        file.push(*api_type);
    }
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(&file).unwrap();
    tmp
}

fn zwtrace(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_zwtrace"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_csv_rows() {
    let capture = zlf_capture(&[(&V2_RX_ACK, 0xF5), (&[0x01], 0x42)]);
    let output = zwtrace(&[capture.path().to_str().unwrap(), "--format", "csv"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "0,1704067200.000000,rx,EU,1,-22.0,classic_2ch,DFEEBB0C,2,1,ack,2,,true,"
    );
    assert!(lines[2].starts_with("1,"));
    assert!(lines[2].ends_with("unsupported ZLF api type 0x42"));
}

#[test]
fn test_limit_and_faults_only() {
    let capture = zlf_capture(&[(&V2_RX_ACK, 0xF5), (&[0x01], 0x42), (&V2_RX_ACK, 0xF5)]);
    let path = capture.path().to_str().unwrap();

    let output = zwtrace(&[path, "--format", "json", "--limit", "1"]);
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);

    let output = zwtrace(&[path, "--format", "json", "--faults-only"]);
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("\"index\":1"));
}

#[test]
fn test_rejects_non_capture() {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(b"definitely not a capture").unwrap();
    let output = zwtrace(&[tmp.path().to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to decode capture"));
}

#[test]
fn test_missing_file() {
    let output = zwtrace(&["/nonexistent/trace.zlf"]);
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr).unwrap().contains("File not found"));
}
