//! Sequential byte and bit reader.
//!
//! [`Cursor`] walks a borrowed buffer front to back. Byte-granular reads take
//! an explicit [`Endian`]; sub-byte reads take an explicit [`BitOrder`]. The
//! trace format mixes both bit-order regimes (packed trailer and classic frame
//! control are [`BitOrder::LsbFirst`], long-range node ids are
//! [`BitOrder::MsbFirst`]), so every bitfield read names its regime.
//!
//! A read either returns the full value or fails with
//! [`DecodeFault::TruncatedChunk`] and leaves the cursor where it was.
//!
//! [`BitWriter`] is the encoding counterpart used to re-emit decoded headers.

use crate::error::DecodeFault;

/// Byte order for multi-byte integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// Order in which packed fields are laid out inside a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// First field occupies the most significant bits.
    MsbFirst,
    /// First field occupies the least significant bits.
    LsbFirst,
}

/// Sequential reader over a byte slice.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    /// Bits already consumed from `data[pos]` by bitfield reads.
    bit_pos: u8,
    bit_order: BitOrder,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            bit_pos: 0,
            bit_order: BitOrder::MsbFirst,
        }
    }

    /// Byte offset of the next unread byte.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whole bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Unread part of the buffer.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Drop any partially consumed byte so the next read starts on a boundary.
    #[inline]
    fn align(&mut self) {
        if self.bit_pos != 0 {
            self.bit_pos = 0;
            self.pos += 1;
        }
    }

    fn ensure(&self, needed: usize) -> Result<(), DecodeFault> {
        let start = self.pos + usize::from(self.bit_pos != 0);
        let available = self.data.len().saturating_sub(start);
        if available < needed {
            return Err(DecodeFault::TruncatedChunk { needed, available });
        }
        Ok(())
    }

    pub fn peek_u8(&self) -> Result<u8, DecodeFault> {
        self.ensure(1)?;
        let idx = self.pos + usize::from(self.bit_pos != 0);
        Ok(self.data[idx])
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeFault> {
        self.ensure(1)?;
        self.align();
        let value = self.data[self.pos];
        self.pos += 1;
        Ok(value)
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeFault> {
        self.read_u8().map(|b| b as i8)
    }

    pub fn read_u16(&mut self, endian: Endian) -> Result<u16, DecodeFault> {
        self.read_uint(2, endian).map(|v| v as u16)
    }

    pub fn read_u32(&mut self, endian: Endian) -> Result<u32, DecodeFault> {
        self.read_uint(4, endian).map(|v| v as u32)
    }

    pub fn read_u64(&mut self, endian: Endian) -> Result<u64, DecodeFault> {
        self.read_uint(8, endian)
    }

    /// Read an unsigned integer `width` bytes wide (1..=8).
    pub fn read_uint(&mut self, width: usize, endian: Endian) -> Result<u64, DecodeFault> {
        debug_assert!((1..=8).contains(&width));
        let bytes = self.read_bytes(width)?;
        let value = match endian {
            Endian::Big => bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64),
            Endian::Little => bytes.iter().rev().fold(0u64, |acc, &b| (acc << 8) | b as u64),
        };
        Ok(value)
    }

    /// Borrow the next `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeFault> {
        self.ensure(n)?;
        self.align();
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeFault> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), DecodeFault> {
        self.read_bytes(n).map(|_| ())
    }

    /// Split off the next `n` bytes as an independent cursor.
    pub fn take(&mut self, n: usize) -> Result<Cursor<'a>, DecodeFault> {
        self.read_bytes(n).map(Cursor::new)
    }

    /// Read an `n`-bit field (n <= 64).
    ///
    /// Consecutive bitfield reads pack into the same byte(s). Switching the
    /// bit order in the middle of a byte is a programming error.
    pub fn read_bits(&mut self, n: u32, order: BitOrder) -> Result<u64, DecodeFault> {
        debug_assert!(n <= 64);
        debug_assert!(
            self.bit_pos == 0 || self.bit_order == order,
            "bit order changed inside a byte"
        );

        let available_bits = self.remaining() * 8 - self.bit_pos as usize;
        if available_bits < n as usize {
            return Err(DecodeFault::TruncatedChunk {
                needed: (n as usize).div_ceil(8),
                available: available_bits / 8,
            });
        }

        self.bit_order = order;
        let mut value = 0u64;
        for i in 0..n {
            let byte = self.data[self.pos];
            let bit = match order {
                BitOrder::MsbFirst => (byte >> (7 - self.bit_pos)) & 1,
                BitOrder::LsbFirst => (byte >> self.bit_pos) & 1,
            } as u64;
            value = match order {
                BitOrder::MsbFirst => (value << 1) | bit,
                BitOrder::LsbFirst => value | (bit << i),
            };
            self.bit_pos += 1;
            if self.bit_pos == 8 {
                self.bit_pos = 0;
                self.pos += 1;
            }
        }
        Ok(value)
    }

    pub fn read_flag(&mut self, order: BitOrder) -> Result<bool, DecodeFault> {
        self.read_bits(1, order).map(|b| b == 1)
    }
}

/// Byte buffer writer with bitfield packing, the inverse of [`Cursor`].
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    out: Vec<u8>,
    bit_pos: u8,
    bit_order: Option<BitOrder>,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    fn align(&mut self) {
        self.bit_pos = 0;
        self.bit_order = None;
    }

    pub fn write_u8(&mut self, value: u8) {
        self.align();
        self.out.push(value);
    }

    /// Write the low `width` bytes of `value`.
    pub fn write_uint(&mut self, value: u64, width: usize, endian: Endian) {
        self.align();
        let bytes = value.to_le_bytes();
        match endian {
            Endian::Little => self.out.extend_from_slice(&bytes[..width]),
            Endian::Big => self.out.extend(bytes[..width].iter().rev()),
        }
    }

    pub fn write_u16(&mut self, value: u16, endian: Endian) {
        self.write_uint(value as u64, 2, endian);
    }

    pub fn write_u32(&mut self, value: u32, endian: Endian) {
        self.write_uint(value as u64, 4, endian);
    }

    pub fn write_u64(&mut self, value: u64, endian: Endian) {
        self.write_uint(value, 8, endian);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.align();
        self.out.extend_from_slice(bytes);
    }

    /// Pack the low `n` bits of `value`.
    pub fn write_bits(&mut self, value: u64, n: u32, order: BitOrder) {
        debug_assert!(self.bit_pos == 0 || self.bit_order == Some(order));
        self.bit_order = Some(order);
        for i in 0..n {
            if self.bit_pos == 0 {
                self.out.push(0);
            }
            let bit = match order {
                BitOrder::MsbFirst => (value >> (n - 1 - i)) & 1,
                BitOrder::LsbFirst => (value >> i) & 1,
            } as u8;
            let shift = match order {
                BitOrder::MsbFirst => 7 - self.bit_pos,
                BitOrder::LsbFirst => self.bit_pos,
            };
            if let Some(last) = self.out.last_mut() {
                *last |= bit << shift;
            }
            self.bit_pos = (self.bit_pos + 1) % 8;
        }
    }

    pub fn write_flag(&mut self, flag: bool, order: BitOrder) {
        self.write_bits(flag as u64, 1, order);
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.out
    }
}
