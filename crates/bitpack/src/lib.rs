//! # bitpack
//!
//! Packs the fields of a struct into a byte buffer at bit granularity.
//!
//! Each field occupies exactly its declared width: the native width of its
//! type, or a narrower one given with `#[packed(bits = N)]`. Fields are laid
//! out in declaration order, least-significant bit first, with no padding,
//! and unpacking reconstructs the original values exactly — including sign
//! extension for narrowed signed fields. Layouts are compiled once per type
//! and cached process-wide.
//!
//! ## Example
//!
//! ```
//! use bitpack::{pack, packed_size, unpack, Packable};
//!
//! #[derive(Packable, Debug, Default, PartialEq)]
//! struct Mode {
//!     #[packed(bits = 3)]
//!     user: u8,
//!     #[packed(bits = 3)]
//!     group: u8,
//!     #[packed(bits = 3)]
//!     other: u8,
//!     set_uid: bool,
//! }
//!
//! let mode = Mode { user: 0b111, group: 0b101, other: 0b100, set_uid: false };
//!
//! assert_eq!(packed_size::<Mode>()?, 2);
//! let mut buf = [0u8; 2];
//! pack(&mut buf, &mode)?;
//!
//! let mut back = Mode::default();
//! unpack(&buf, &mut back)?;
//! assert_eq!(back, mode);
//! # Ok::<(), bitpack::Error>(())
//! ```
//!
//! Supported field types: `bool`, `u8`–`u64`, `i8`–`i64`, nested `Packable`
//! structs, and fixed arrays of any of these. `#[packed(skip)]` hides a
//! field: it takes no space and is never read or written.

pub mod bits;
pub mod errors;
pub mod field;
pub mod layout;

mod cache;
mod compiled;

pub use bitpack_derive::Packable;
pub use errors::Error;
pub use field::{FieldDesc, FieldKind, Packable, ScalarKind};
pub use layout::Layout;

/// Packs the visible fields of `value` into `buf`.
///
/// `buf[..packed_size::<T>()?]` is zeroed and then filled; bits past the
/// last field in the final used byte stay zero, and bytes beyond it are not
/// touched. Fails if the buffer is too short or a narrowed field holds a
/// value outside its declared range.
pub fn pack<T: Packable>(buf: &mut [u8], value: &T) -> Result<(), Error> {
    let layout = cache::layout_for::<T>()?;
    let need = layout.byte_count();
    if buf.len() < need {
        return Err(Error::BufferTooSmall {
            got: buf.len(),
            need,
        });
    }
    // The engine ORs bits into place, so stale buffer content must go first.
    buf[..need].fill(0);
    // SAFETY: `T::FIELDS` describes `T` exactly (the `Packable` contract),
    // and the reference keeps the instance alive at a stable address for the
    // duration of the call.
    unsafe { layout.pack_fields(buf, (value as *const T).cast()) }
}

/// Overwrites the visible fields of `target` with values extracted from
/// `buf`. Skipped fields keep their prior contents.
pub fn unpack<T: Packable>(buf: &[u8], target: &mut T) -> Result<(), Error> {
    let layout = cache::layout_for::<T>()?;
    let need = layout.byte_count();
    if buf.len() < need {
        return Err(Error::BufferTooSmall {
            got: buf.len(),
            need,
        });
    }
    // SAFETY: as in `pack`; the exclusive reference additionally guarantees
    // the field writes alias nothing else.
    unsafe { layout.unpack_fields(buf, (target as *mut T).cast()) };
    Ok(())
}

/// Bytes a packed `T` occupies. Shares the compiled-layout cache with
/// [`pack`] and [`unpack`].
pub fn packed_size<T: Packable>() -> Result<usize, Error> {
    Ok(cache::layout_for::<T>()?.byte_count())
}
