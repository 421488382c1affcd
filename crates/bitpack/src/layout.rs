//! Layouts: the planner that turns a field table into compiled descriptors,
//! and the engines that move instance fields to and from packed buffers.

use core::ptr;

use crate::{
    compiled::CompiledField,
    errors::Error,
    field::{FieldDesc, FieldKind, ScalarKind},
};

/// A compiled layout: leaf descriptors in declaration order plus the packed
/// byte count. Immutable once built.
#[derive(Debug, Clone)]
pub struct Layout {
    pub(crate) fields: Vec<CompiledField>,
    total_bits: u64,
    bytes: usize,
}

impl Layout {
    /// Walks `fields` depth-first in declaration order, assigning each leaf
    /// field a bit range and validating width attributes. Fails whole; no
    /// partial layout is ever returned.
    pub fn compile(fields: &[FieldDesc]) -> Result<Self, Error> {
        let mut compiled = Vec::new();
        let mut cursor = 0u64;
        walk_struct(fields, 0, &mut cursor, &mut compiled)?;
        Ok(Layout {
            fields: compiled,
            total_bits: cursor,
            bytes: cursor.div_ceil(8) as usize,
        })
    }

    /// Bytes a packed instance occupies.
    pub fn byte_count(&self) -> usize {
        self.bytes
    }

    /// Total packed bits across all leaf fields.
    pub fn bit_count(&self) -> u64 {
        self.total_bits
    }

    /// ORs every described field of the instance at `base` into `buf`,
    /// range-checking narrowed fields.
    ///
    /// # Safety
    ///
    /// `base` must point to a live instance whose fields this layout
    /// describes exactly, pinned for the duration of the call. `buf` must
    /// hold at least `byte_count()` bytes, zeroed over the target region.
    pub(crate) unsafe fn pack_fields(&self, buf: &mut [u8], base: *const u8) -> Result<(), Error> {
        for f in &self.fields {
            let p = base.add(f.val_offset);
            if f.kind == ScalarKind::Bool {
                f.pack_bool(buf, ptr::read(p as *const bool));
            } else if f.signed {
                let val = match f.kind {
                    ScalarKind::I8 => ptr::read(p as *const i8) as i64,
                    ScalarKind::I16 => ptr::read(p as *const i16) as i64,
                    ScalarKind::I32 => ptr::read(p as *const i32) as i64,
                    _ => ptr::read(p as *const i64),
                };
                f.pack_signed(buf, val)?;
            } else {
                let val = match f.kind {
                    ScalarKind::U8 => ptr::read(p as *const u8) as u64,
                    ScalarKind::U16 => ptr::read(p as *const u16) as u64,
                    ScalarKind::U32 => ptr::read(p as *const u32) as u64,
                    _ => ptr::read(p as *const u64),
                };
                f.pack_unsigned(buf, val)?;
            }
        }
        Ok(())
    }

    /// Extracts every described field from `buf` into the instance at
    /// `base`. Fields outside the layout are left untouched.
    ///
    /// # Safety
    ///
    /// `base` must point to a live, exclusively borrowed instance whose
    /// fields this layout describes exactly. `buf` must hold at least
    /// `byte_count()` bytes.
    pub(crate) unsafe fn unpack_fields(&self, buf: &[u8], base: *mut u8) {
        for f in &self.fields {
            let p = base.add(f.val_offset);
            if f.kind == ScalarKind::Bool {
                ptr::write(p as *mut bool, f.unpack_bool(buf));
            } else if f.signed {
                let val = f.unpack_signed(buf);
                match f.kind {
                    ScalarKind::I8 => ptr::write(p as *mut i8, val as i8),
                    ScalarKind::I16 => ptr::write(p as *mut i16, val as i16),
                    ScalarKind::I32 => ptr::write(p as *mut i32, val as i32),
                    _ => ptr::write(p as *mut i64, val),
                }
            } else {
                let val = f.unpack_unsigned(buf);
                match f.kind {
                    ScalarKind::U8 => ptr::write(p as *mut u8, val as u8),
                    ScalarKind::U16 => ptr::write(p as *mut u16, val as u16),
                    ScalarKind::U32 => ptr::write(p as *mut u32, val as u32),
                    _ => ptr::write(p as *mut u64, val),
                }
            }
        }
    }
}

fn walk_struct(
    fields: &[FieldDesc],
    base: usize,
    cursor: &mut u64,
    out: &mut Vec<CompiledField>,
) -> Result<(), Error> {
    for desc in fields {
        walk_field(
            desc.name,
            &desc.kind,
            base + desc.offset,
            desc.width,
            cursor,
            out,
        )?;
    }
    Ok(())
}

fn walk_field(
    name: &'static str,
    kind: &FieldKind,
    addr: usize,
    width: Option<u8>,
    cursor: &mut u64,
    out: &mut Vec<CompiledField>,
) -> Result<(), Error> {
    let scalar = match *kind {
        FieldKind::Bool => {
            if width.is_some() {
                return Err(Error::WidthNotAllowed { field: name });
            }
            out.push(CompiledField::new(addr, *cursor, 1, ScalarKind::Bool));
            *cursor += 1;
            return Ok(());
        }
        FieldKind::Struct(inner) => {
            if width.is_some() {
                return Err(Error::WidthNotAllowed { field: name });
            }
            return walk_struct(inner, addr, cursor, out);
        }
        FieldKind::Array { elem, len, stride } => {
            // A width attribute on an array applies to each element; element
            // kind rules apply on recursion.
            for i in 0..len {
                walk_field(name, elem, addr + i * stride, width, cursor, out)?;
            }
            return Ok(());
        }
        FieldKind::U8 => ScalarKind::U8,
        FieldKind::U16 => ScalarKind::U16,
        FieldKind::U32 => ScalarKind::U32,
        FieldKind::U64 => ScalarKind::U64,
        FieldKind::I8 => ScalarKind::I8,
        FieldKind::I16 => ScalarKind::I16,
        FieldKind::I32 => ScalarKind::I32,
        FieldKind::I64 => ScalarKind::I64,
    };

    let native = scalar.native_bits();
    let bits = match width {
        None => native,
        Some(bits) if bits < 1 => return Err(Error::WidthTooSmall { field: name, bits }),
        Some(bits) if bits > native => {
            return Err(Error::WidthTooWide {
                field: name,
                kind: scalar,
                bits,
            })
        }
        Some(bits) => bits,
    };

    out.push(CompiledField::new(addr, *cursor, bits, scalar));
    *cursor += bits as u64;
    Ok(())
}
