//! Input abstraction over class file bytes.
//!
//! A [`File`] wraps the raw bytes of one class file, sourced either from disk
//! (memory-mapped, so large batches never copy unchanged inputs) or from an
//! in-memory buffer handed over by a caller. The decoder only ever sees the
//! `&[u8]` view, so both backends behave identically.
//!
//! # Key Components
//!
//! - [`File`] - owning handle over the input bytes
//! - [`parser::Parser`] - cursor used by the decoder
//! - [`io`] - bounds-checked big-endian primitives

pub(crate) mod io;
pub mod parser;

use std::path::Path;

use memmap2::Mmap;

use crate::Result;

/// The data source backing a [`File`].
enum Backend {
    /// Memory-mapped file on disk
    Physical(Mmap),
    /// Owned in-memory buffer
    Memory(Vec<u8>),
}

/// An owning handle over the raw bytes of one class file.
///
/// # Examples
///
/// ```rust,no_run
/// use classbridge::File;
/// use std::path::Path;
///
/// let file = File::from_file(Path::new("Foo.class"))?;
/// assert!(!file.is_empty());
/// # Ok::<(), classbridge::Error>(())
/// ```
pub struct File {
    backend: Backend,
}

impl File {
    /// Memory-map a class file from disk.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or
    /// mapped, and [`crate::Error::Empty`] for a zero-length file.
    pub fn from_file(path: &Path) -> Result<File> {
        let file = std::fs::File::open(path)?;

        // Safety: the map is read-only and private to this process; a
        // concurrent writer truncating the file is the usual mmap caveat.
        let mmap = unsafe { Mmap::map(&file)? };
        if mmap.is_empty() {
            return Err(crate::Error::Empty);
        }

        Ok(File {
            backend: Backend::Physical(mmap),
        })
    }

    /// Wrap an in-memory buffer.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for an empty buffer.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        if data.is_empty() {
            return Err(crate::Error::Empty);
        }

        Ok(File {
            backend: Backend::Memory(data),
        })
    }

    /// The raw bytes of the class file.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        match &self.backend {
            Backend::Physical(mmap) => mmap,
            Backend::Memory(vec) => vec,
        }
    }

    /// Length of the underlying data in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns `true` if the file holds no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }
}
