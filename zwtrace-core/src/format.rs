//! Capture format detection.

use serde::Serialize;

use crate::container::zlf::ZLF_HEADER_LEN;

/// Container format of a capture (after decompression).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureFormat {
    /// ZLF trace written by the Zniffer tooling
    Zlf,
    /// Classic pcap, either byte order, µs or ns
    TapCapture,
    /// Neither of the above
    Unknown,
}

impl CaptureFormat {
    /// Detect the format from the leading bytes.
    pub fn detect(data: &[u8]) -> Self {
        if data.len() >= 4 {
            let magic = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
            match magic {
                0xa1b2c3d4 | 0xd4c3b2a1 | 0xa1b23c4d | 0x4d3cb2a1 => {
                    return CaptureFormat::TapCapture
                }
                _ => {}
            }
        }

        if data.len() >= ZLF_HEADER_LEN
            && data[0] == 0x68
            && data[ZLF_HEADER_LEN - 2..ZLF_HEADER_LEN] == [0x23, 0x12]
        {
            return CaptureFormat::Zlf;
        }

        CaptureFormat::Unknown
    }

    pub fn name(&self) -> &'static str {
        match self {
            CaptureFormat::Zlf => "zlf",
            CaptureFormat::TapCapture => "pcap",
            CaptureFormat::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for CaptureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{zlf_file, PcapBuilder};

    #[test]
    fn test_detect_pcap_magics() {
        for magic in [
            [0xd4, 0xc3, 0xb2, 0xa1],
            [0xa1, 0xb2, 0xc3, 0xd4],
            [0x4d, 0x3c, 0xb2, 0xa1],
            [0xa1, 0xb2, 0x3c, 0x4d],
        ] {
            assert_eq!(CaptureFormat::detect(&magic), CaptureFormat::TapCapture);
        }
        let file = PcapBuilder::new().big_endian().nanos().build();
        assert_eq!(CaptureFormat::detect(&file), CaptureFormat::TapCapture);
    }

    #[test]
    fn test_detect_zlf() {
        assert_eq!(CaptureFormat::detect(&zlf_file(&[])), CaptureFormat::Zlf);

        let mut file = zlf_file(&[]);
        file[2047] = 0x00;
        assert_eq!(CaptureFormat::detect(&file), CaptureFormat::Unknown);
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(CaptureFormat::detect(&[]), CaptureFormat::Unknown);
        assert_eq!(CaptureFormat::detect(&[0x68; 100]), CaptureFormat::Unknown);
        assert_eq!(CaptureFormat::detect(&[0x0a, 0x0d, 0x0d, 0x0a]), CaptureFormat::Unknown);
    }
}
