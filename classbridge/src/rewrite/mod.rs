//! The bridge-name rewrite engine.
//!
//! A compiler extension emits methods and call sites under marker-suffixed
//! names (`foo$$bridge1`) to keep the source compiler from resolving dispatch
//! prematurely. This module restores the real names in the compiled output:
//! marked method *definitions* are renamed and flagged `BRIDGE | SYNTHETIC`,
//! marked *call sites* are redirected to a same-kind constant pool entry
//! carrying the real name. Everything else in the class file is preserved
//! byte for byte.
//!
//! # Key Components
//!
//! - [`BridgeRewriter`] - the engine; owns the two transform counters
//! - [`MARKER`] - the sentinel substring identifying marked names
//!
//! # Examples
//!
//! ```rust,no_run
//! use classbridge::BridgeRewriter;
//!
//! let rewriter = BridgeRewriter::new();
//! let input = std::fs::read("Foo.class")?;
//! let output = rewriter.rewrite(&input)?;
//! println!(
//!     "{} members, {} call sites",
//!     rewriter.members_rewritten(),
//!     rewriter.call_sites_rewritten()
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod callsites;
mod members;
mod opcodes;

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use log::{debug, warn};
use rayon::prelude::*;

use crate::{classfile::ClassFile, file::File, Result};

/// The sentinel substring identifying a marked name.
///
/// The real name is everything before the *first* occurrence; the rest of the
/// name (including any instance discriminator like the `1` in `foo$$bridge1`)
/// is discarded. The sentinel is plain ASCII, so matching happens on the raw
/// modified-UTF-8 bytes.
pub const MARKER: &[u8] = b"$$bridge";

/// Split a marked name, returning the real-name prefix, or `None` if the
/// name does not contain the marker.
pub(crate) fn strip_marker(name: &[u8]) -> Option<&[u8]> {
    name.windows(MARKER.len())
        .position(|window| window == MARKER)
        .map(|index| &name[..index])
}

/// Outcome of a batch run over many class files.
///
/// Failures never abort the batch; every failing file is named here so the
/// caller can report it.
#[derive(Debug)]
pub struct BatchSummary {
    /// Number of files rewritten successfully.
    pub rewritten: usize,
    /// Files that failed, with the error each one produced.
    pub failures: Vec<(PathBuf, crate::Error)>,
}

impl BatchSummary {
    /// Returns `true` if every file in the batch was rewritten.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The rewrite engine.
///
/// Holds the two process-wide transform counters; everything else about a
/// rewrite is per-class-file state owned by that invocation, so one engine
/// can serve any number of threads concurrently. The counters are plain
/// fetch-and-add atomics with no ordering relationship to anything else.
#[derive(Debug, Default)]
pub struct BridgeRewriter {
    members_rewritten: AtomicU64,
    call_sites_rewritten: AtomicU64,
}

impl BridgeRewriter {
    /// Create a new engine with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        BridgeRewriter::default()
    }

    /// Rewrite one class file held in memory.
    ///
    /// Decodes, runs the member and call-site passes, and re-encodes. The
    /// output is byte-identical to the input when nothing was marked.
    /// Counters are updated only after the whole pipeline succeeds.
    ///
    /// # Errors
    /// Any decode, reference-consistency, or pool-growth error; the input
    /// buffer is never modified.
    pub fn rewrite(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut class = ClassFile::from_bytes(data)?;

        let members = members::rewrite_members(&mut class)?;
        let call_sites = callsites::rewrite_call_sites(&mut class)?;
        let output = class.to_bytes()?;

        self.members_rewritten
            .fetch_add(members as u64, Ordering::Relaxed);
        self.call_sites_rewritten
            .fetch_add(call_sites as u64, Ordering::Relaxed);

        debug!(
            "rewrote {} members and {} call sites ({} -> {} bytes)",
            members,
            call_sites,
            data.len(),
            output.len()
        );

        Ok(output)
    }

    /// Rewrite one class file on disk, in place.
    ///
    /// The full output buffer is computed first; it is then written to a
    /// temporary file in the same directory and atomically persisted over
    /// the original. A failure at any stage (decode, rewrite, or I/O)
    /// leaves the original file untouched, never truncated.
    ///
    /// # Errors
    /// As [`BridgeRewriter::rewrite`], plus [`crate::Error::FileError`] for
    /// I/O failures.
    pub fn rewrite_file(&self, path: &Path) -> Result<()> {
        let output = {
            let file = File::from_file(path)?;
            self.rewrite(file.data())?
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(&output)?;
        temp.flush()?;
        temp.persist(path).map_err(|error| error.error)?;

        debug!("replaced {}", path.display());
        Ok(())
    }

    /// Rewrite many class files in place, in parallel.
    ///
    /// Files are independent: each owns its model and constant pool
    /// outright, so the only shared state is the counters. A failing file is
    /// recorded in the summary and the rest of the batch continues.
    pub fn rewrite_paths(&self, files: &[PathBuf]) -> BatchSummary {
        let results: Vec<Option<(PathBuf, crate::Error)>> = files
            .par_iter()
            .map(|path| match self.rewrite_file(path) {
                Ok(()) => None,
                Err(error) => {
                    warn!("failed to rewrite {}: {}", path.display(), error);
                    Some((path.clone(), error))
                }
            })
            .collect();

        let failures: Vec<(PathBuf, crate::Error)> = results.into_iter().flatten().collect();
        BatchSummary {
            rewritten: files.len() - failures.len(),
            failures,
        }
    }

    /// Total member definitions transformed by this engine so far.
    #[must_use]
    pub fn members_rewritten(&self) -> u64 {
        self.members_rewritten.load(Ordering::Relaxed)
    }

    /// Total call sites transformed by this engine so far.
    #[must_use]
    pub fn call_sites_rewritten(&self) -> u64 {
        self.call_sites_rewritten.load(Ordering::Relaxed)
    }
}
