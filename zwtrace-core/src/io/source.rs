//! Owned capture bytes.

use std::fs::File;
use std::io::Read;
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::Mmap;
use tracing::debug;

use super::decompress::{inflate, Compression};
use crate::container::{Capture, DecodeOptions};
use crate::error::{Error, FormatError, Result};
use crate::format::CaptureFormat;

#[derive(Debug)]
enum Storage {
    Owned(Vec<u8>),
    #[cfg(feature = "mmap")]
    Mapped(Mmap),
}

/// The bytes of one capture, decompressed.
#[derive(Debug)]
pub struct CaptureSource {
    storage: Storage,
    compression: Compression,
}

impl CaptureSource {
    /// Open a capture file.
    ///
    /// Plain files are memory-mapped (or read, without the `mmap` feature);
    /// gzip files are inflated into memory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Format(FormatError::FileNotFound {
                path: path.display().to_string(),
            }));
        }
        let mut file = File::open(path).map_err(Error::Io)?;
        let len = file.metadata().map_err(Error::Io)?.len();
        if len == 0 {
            // zero-length files cannot be mapped
            return Ok(Self::from_bytes(Vec::new()));
        }

        let storage = Self::load(&mut file)?;
        let compression = Compression::detect(storage_bytes(&storage));
        let source = if compression.is_compressed() {
            let inflated = inflate(storage_bytes(&storage), compression).map_err(Error::Io)?;
            debug!(
                path = %path.display(),
                %compression,
                compressed = len,
                inflated = inflated.len(),
                "inflated capture"
            );
            Self {
                storage: Storage::Owned(inflated),
                compression,
            }
        } else {
            Self {
                storage,
                compression,
            }
        };
        Ok(source)
    }

    #[cfg(feature = "mmap")]
    fn load(file: &mut File) -> Result<Storage> {
        // SAFETY: the mapping is read-only; a capture truncated by another
        // process while mapped is outside what this reader guards against.
        let mmap = unsafe { Mmap::map(&*file).map_err(Error::Io)? };
        Ok(Storage::Mapped(mmap))
    }

    #[cfg(not(feature = "mmap"))]
    fn load(file: &mut File) -> Result<Storage> {
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).map_err(Error::Io)?;
        Ok(Storage::Owned(buf))
    }

    /// Wrap bytes already in memory. Gzip input is not inflated here.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            storage: Storage::Owned(data),
            compression: Compression::None,
        }
    }

    /// Read a whole capture from any reader, inflating gzip input.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).map_err(Error::Io)?;
        let compression = Compression::detect(&buf);
        if compression.is_compressed() {
            buf = inflate(&buf, compression).map_err(Error::Io)?;
        }
        Ok(Self {
            storage: Storage::Owned(buf),
            compression,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        storage_bytes(&self.storage)
    }

    /// Compression the capture was stored with.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn is_mapped(&self) -> bool {
        match self.storage {
            Storage::Owned(_) => false,
            #[cfg(feature = "mmap")]
            Storage::Mapped(_) => true,
        }
    }

    pub fn format(&self) -> CaptureFormat {
        CaptureFormat::detect(self.as_bytes())
    }

    /// Detect the container and validate its header.
    pub fn decode(&self, options: DecodeOptions) -> Result<Capture<'_>> {
        Capture::from_bytes(self.as_bytes(), options)
    }
}

fn storage_bytes(storage: &Storage) -> &[u8] {
    match storage {
        Storage::Owned(buf) => buf,
        #[cfg(feature = "mmap")]
        Storage::Mapped(mmap) => mmap,
    }
}
