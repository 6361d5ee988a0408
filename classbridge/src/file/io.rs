//! Byte-order aware, bounds-checked reading and writing primitives.
//!
//! Class files are big-endian throughout (JVMS §4.1), so this module provides
//! the big-endian half of a generic binary I/O layer: safe `read_be*` and
//! `write_be*` helpers over byte buffers, built on the [`ClassIO`] trait which
//! abstracts the primitive-type byte conversions.
//!
//! All functions validate buffer bounds before touching memory and return
//! [`crate::Error::OutOfBounds`] on short buffers, which keeps truncated or
//! corrupt inputs from ever causing a panic during decode.

use crate::{Error::OutOfBounds, Result};

/// Trait implementing type-specific safe binary conversions.
///
/// Each implementation defines a `Bytes` associated type representing the
/// fixed-size byte array for that particular type (e.g. `[u8; 4]` for `u32`).
/// Implemented for the unsigned integer types the class file format uses.
pub trait ClassIO: Sized {
    /// The fixed-size byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]> + AsRef<[u8]>;

    /// Read Self from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Write Self to a byte buffer in big-endian
    fn to_be_bytes(self) -> Self::Bytes;
}

impl ClassIO for u8 {
    type Bytes = [u8; 1];

    fn from_be_bytes(bytes: Self::Bytes) -> Self {
        u8::from_be_bytes(bytes)
    }

    fn to_be_bytes(self) -> Self::Bytes {
        u8::to_be_bytes(self)
    }
}

impl ClassIO for u16 {
    type Bytes = [u8; 2];

    fn from_be_bytes(bytes: Self::Bytes) -> Self {
        u16::from_be_bytes(bytes)
    }

    fn to_be_bytes(self) -> Self::Bytes {
        u16::to_be_bytes(self)
    }
}

impl ClassIO for u32 {
    type Bytes = [u8; 4];

    fn from_be_bytes(bytes: Self::Bytes) -> Self {
        u32::from_be_bytes(bytes)
    }

    fn to_be_bytes(self) -> Self::Bytes {
        u32::to_be_bytes(self)
    }
}

impl ClassIO for u64 {
    type Bytes = [u8; 8];

    fn from_be_bytes(bytes: Self::Bytes) -> Self {
        u64::from_be_bytes(bytes)
    }

    fn to_be_bytes(self) -> Self::Bytes {
        u64::to_be_bytes(self)
    }
}

/// Safely reads a value of type `T` in big-endian byte order from the start of
/// a buffer.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer holds fewer bytes than
/// `T` requires.
pub fn read_be<T: ClassIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_be_at(data, &mut offset)
}

/// Safely reads a value of type `T` in big-endian byte order at `offset`,
/// advancing the offset by the number of bytes read.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_be_at<T: ClassIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(OutOfBounds);
    };

    *offset += type_len;

    Ok(T::from_be_bytes(read))
}

/// Safely writes a value of type `T` in big-endian byte order to the start of
/// a buffer.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too small for `T`.
pub fn write_be<T: ClassIO>(data: &mut [u8], value: T) -> Result<()> {
    let mut offset = 0_usize;
    write_be_at(data, &mut offset, value)
}

/// Safely writes a value of type `T` in big-endian byte order at `offset`,
/// advancing the offset by the number of bytes written.
///
/// Used by the call-site rewriter to patch instruction operands in place; the
/// bounds check guarantees a patch can never grow the code array.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn write_be_at<T: ClassIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(OutOfBounds);
    }

    let bytes = value.to_be_bytes();
    data[*offset..*offset + type_len].copy_from_slice(bytes.as_ref());
    *offset += type_len;

    Ok(())
}
