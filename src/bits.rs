//! Single-bit I/O over byte streams and in-memory buffers.
//!
//! Bits are packed least-significant first within each byte. A stream that
//! does not end on a byte boundary is padded with zero bits.

use bitstream_io::{BitRead, BitReader, BitWrite, BitWriter, Endianness};
use bitvec::prelude::*;
use std::io;

/// Destination for single bits.
pub trait BitSink {
    fn write_bit(&mut self, bit: bool) -> io::Result<()>;

    fn write_bits(&mut self, bits: &BitSlice<u8, Lsb0>) -> io::Result<()> {
        for bit in bits.iter().by_vals() {
            self.write_bit(bit)?;
        }
        Ok(())
    }
}

/// Source of single bits.
pub trait BitSource {
    /// Reads the next bit, `Ok(None)` once the buffered bits are exhausted.
    fn read_bit(&mut self) -> io::Result<Option<bool>>;
}

impl<S: BitSink + ?Sized> BitSink for &mut S {
    fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        (**self).write_bit(bit)
    }

    fn write_bits(&mut self, bits: &BitSlice<u8, Lsb0>) -> io::Result<()> {
        (**self).write_bits(bits)
    }
}

impl<S: BitSource + ?Sized> BitSource for &mut S {
    fn read_bit(&mut self) -> io::Result<Option<bool>> {
        (**self).read_bit()
    }
}

impl<W: io::Write, E: Endianness> BitSink for BitWriter<W, E> {
    fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        BitWrite::write_bit(self, bit)
    }
}

impl<R: io::Read, E: Endianness> BitSource for BitReader<R, E> {
    fn read_bit(&mut self) -> io::Result<Option<bool>> {
        match BitRead::read_bit(self) {
            Ok(bit) => Ok(Some(bit)),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl BitSink for BitVec<u8, Lsb0> {
    fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        self.push(bit);
        Ok(())
    }

    fn write_bits(&mut self, bits: &BitSlice<u8, Lsb0>) -> io::Result<()> {
        self.extend_from_bitslice(bits);
        Ok(())
    }
}

/// Reads bits from a borrowed bit slice.
#[derive(Clone, Debug)]
pub struct BitCursor<'a> {
    bits: &'a BitSlice<u8, Lsb0>,
    position: usize,
}

impl<'a> BitCursor<'a> {
    pub fn new(bits: &'a BitSlice<u8, Lsb0>) -> Self {
        BitCursor { bits, position: 0 }
    }

    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self::new(bytes.view_bits::<Lsb0>())
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl BitSource for BitCursor<'_> {
    fn read_bit(&mut self) -> io::Result<Option<bool>> {
        let bit = self.bits.get(self.position).map(|bit| *bit);
        if bit.is_some() {
            self.position += 1;
        }
        Ok(bit)
    }
}

/// Packs a bit vector into bytes, zero-padding the final byte.
pub fn into_padded_bytes(mut bits: BitVec<u8, Lsb0>) -> Vec<u8> {
    let padded = bits.len().div_ceil(8) * 8;
    bits.resize(padded, false);
    bits.into_vec()
}
