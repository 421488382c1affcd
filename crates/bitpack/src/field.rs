//! Static description of a packable struct: one [`FieldDesc`] per visible field.

/// A single visible field of a packable struct.
///
/// `#[derive(Packable)]` emits one of these per non-skipped field. They can
/// also be built by hand to register a layout programmatically; see
/// [`Packable`] for the accuracy contract that applies as soon as a
/// description is used to pack or unpack real instances.
#[derive(Debug, Clone, Copy)]
pub struct FieldDesc {
    /// Field name, used in planning diagnostics.
    pub name: &'static str,
    /// Byte offset of the field's storage within its containing struct.
    pub offset: usize,
    /// Storage type of the field.
    pub kind: FieldKind,
    /// Custom packed width in bits. `None` means the native width.
    pub width: Option<u8>,
}

/// Storage type of a [`FieldDesc`]: a scalar leaf, a nested struct, or a
/// fixed array.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    /// Nested packable struct; its fields contribute in order at the
    /// current bit cursor.
    Struct(&'static [FieldDesc]),
    /// Fixed-length array. `stride` is the size in bytes of one element in
    /// the struct's storage.
    Array {
        elem: &'static FieldKind,
        len: usize,
        stride: usize,
    },
}

/// Leaf scalar kinds that end up in a compiled layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
}

impl ScalarKind {
    /// Bit count of the scalar's storage type.
    pub fn native_bits(self) -> u8 {
        match self {
            ScalarKind::Bool => 1,
            ScalarKind::U8 | ScalarKind::I8 => 8,
            ScalarKind::U16 | ScalarKind::I16 => 16,
            ScalarKind::U32 | ScalarKind::I32 => 32,
            ScalarKind::U64 | ScalarKind::I64 => 64,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            ScalarKind::I8 | ScalarKind::I16 | ScalarKind::I32 | ScalarKind::I64
        )
    }
}

impl core::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ScalarKind::Bool => "bool",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
        };
        f.write_str(name)
    }
}

/// A struct whose packed layout can be derived from a static field table.
///
/// Implement via `#[derive(Packable)]`. Manual implementations are possible
/// but `unsafe`: the pack and unpack engines read and write field storage
/// through raw pointers computed from `FIELDS`, so every descriptor must
/// name the byte offset and exact storage type of a real field of `Self`,
/// and nested/array entries must match the actual element layout.
pub unsafe trait Packable: 'static {
    /// Visible fields in declaration order.
    const FIELDS: &'static [FieldDesc];
}
