use thiserror::Error;

use crate::field::ScalarKind;

/// Errors from planning a layout or running pack/unpack.
///
/// Planning errors are not cached; a failing type fails the same way on
/// every call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Width attributes are only meaningful on integer fields (or arrays of
    /// them).
    #[error("width attribute not allowed on field `{field}`")]
    WidthNotAllowed { field: &'static str },

    #[error("width attribute on field `{field}` too small ({bits})")]
    WidthTooSmall { field: &'static str, bits: u8 },

    #[error("width attribute on field `{field}` (type {kind}) too wide ({bits})")]
    WidthTooWide {
        field: &'static str,
        kind: ScalarKind,
        bits: u8,
    },

    #[error("value out of range: max {max}; got {got}")]
    UnsignedOverflow { max: u64, got: u64 },

    #[error("value out of range: max {max}, min {min}; got {got}")]
    SignedOverflow { max: i64, min: i64, got: i64 },

    #[error("buffer too small (got {got}; need {need})")]
    BufferTooSmall { got: usize, need: usize },
}
