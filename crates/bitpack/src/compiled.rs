//! Compiled per-field descriptors: the constants the pack and unpack loops
//! need, all precomputed when the layout is built.

use crate::{bits, errors::Error, field::ScalarKind};

/// One leaf field of a compiled [`crate::layout::Layout`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct CompiledField {
    /// Byte offset of the field's storage from the instance base address.
    pub val_offset: usize,
    /// Byte offset of the field's first bit within the packed buffer.
    pub buf_offset: usize,
    /// Position of the field's least-significant bit within that byte.
    pub buf_lsb: u8,
    /// Packed width in bits.
    pub width: u8,
    /// Buffer bytes the bit range touches, 1..=9.
    pub bytes_spanned: u8,
    /// Set when `width` is narrower than the storage type, requiring a
    /// range check on every pack.
    pub can_overflow: bool,
    pub kind: ScalarKind,
    pub signed: bool,
    // Bounds used by the range check; meaningful only when `can_overflow`.
    pub max_unsigned: u64,
    pub min_signed: i64,
    pub max_signed: i64,
}

impl CompiledField {
    pub fn new(val_offset: usize, bit_cursor: u64, width: u8, kind: ScalarKind) -> Self {
        let buf_lsb = (bit_cursor % 8) as u8;
        let signed = kind.is_signed();
        CompiledField {
            val_offset,
            buf_offset: (bit_cursor / 8) as usize,
            buf_lsb,
            width,
            bytes_spanned: bits::bytes_spanned(buf_lsb, width),
            can_overflow: width != kind.native_bits(),
            kind,
            signed,
            max_unsigned: bits::mask(width),
            min_signed: if signed { -1i64 << (width - 1) } else { 0 },
            max_signed: if signed {
                (bits::mask(width) >> 1) as i64
            } else {
                0
            },
        }
    }

    pub fn pack_unsigned(&self, buf: &mut [u8], val: u64) -> Result<(), Error> {
        if self.can_overflow && val > self.max_unsigned {
            return Err(Error::UnsignedOverflow {
                max: self.max_unsigned,
                got: val,
            });
        }
        bits::pack_bits_spanned(
            buf,
            val,
            self.buf_offset,
            self.buf_lsb,
            self.width,
            self.bytes_spanned,
        );
        Ok(())
    }

    pub fn pack_signed(&self, buf: &mut [u8], val: i64) -> Result<(), Error> {
        if self.can_overflow && (val < self.min_signed || val > self.max_signed) {
            return Err(Error::SignedOverflow {
                max: self.max_signed,
                min: self.min_signed,
                got: val,
            });
        }
        // pack_bits masks to `width`, stripping the sign-extension ones of a
        // negative value.
        bits::pack_bits_spanned(
            buf,
            val as u64,
            self.buf_offset,
            self.buf_lsb,
            self.width,
            self.bytes_spanned,
        );
        Ok(())
    }

    pub fn unpack_unsigned(&self, buf: &[u8]) -> u64 {
        bits::unpack_bits_spanned(buf, self.buf_offset, self.buf_lsb, self.width, self.bytes_spanned)
    }

    pub fn unpack_signed(&self, buf: &[u8]) -> i64 {
        bits::sign_extend(self.unpack_unsigned(buf), self.width)
    }

    pub fn pack_bool(&self, buf: &mut [u8], val: bool) {
        if val {
            buf[self.buf_offset] |= 1 << self.buf_lsb;
        }
    }

    pub fn unpack_bool(&self, buf: &[u8]) -> bool {
        buf[self.buf_offset] >> self.buf_lsb & 1 == 1
    }
}
