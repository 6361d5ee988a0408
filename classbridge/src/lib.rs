// Copyright 2026 the classbridge contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
#![allow(dead_code)]

//! # classbridge
//!
//! Rewrites compiled JVM class files to repair a bridge-method naming
//! convention: a source-level compiler extension emits methods and call sites
//! under marker-suffixed names (`foo$$bridge1`) so the compiler cannot
//! resolve dispatch prematurely, and this library restores the real names in
//! the compiled output. Marked method definitions become `foo` with the
//! `BRIDGE` and `SYNTHETIC` access flags set; marked call sites are
//! redirected to constant pool entries carrying the real name.
//!
//! The transformation is semantically transparent: every byte not touched by
//! a rename is preserved exactly, instruction lengths and code offsets never
//! change, and the output is a structurally valid, loadable class file.
//!
//! ## Features
//!
//! - **Byte-faithful round-trip** - decoding then encoding an untouched
//!   class file reproduces the input exactly
//! - **Strict decoding** - size fields, table bounds, and reference kinds
//!   are validated up front; corrupt files are rejected, never half-patched
//! - **Append-only symbol growth** - existing constant pool indices are
//!   never renumbered; new entries land at the end of the table
//! - **Parallel batch processing** - independent class files rewrite
//!   concurrently, sharing nothing but two atomic counters
//! - **Atomic in-place replace** - an on-disk rewrite either completes or
//!   leaves the original file untouched
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use classbridge::BridgeRewriter;
//!
//! let rewriter = BridgeRewriter::new();
//!
//! // In memory
//! let input = std::fs::read("Foo.class")?;
//! let output = rewriter.rewrite(&input)?;
//!
//! // Or in place on disk
//! rewriter.rewrite_file("Foo.class".as_ref())?;
//!
//! println!(
//!     "rewrote {} members and {} call sites",
//!     rewriter.members_rewritten(),
//!     rewriter.call_sites_rewritten()
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`classfile`] - the structural model, strict decoder, and byte-faithful
//!   encoder
//! - [`rewrite`] - the member and call-site rewrite passes behind
//!   [`BridgeRewriter`]
//! - [`prelude`] - convenient re-exports of the common types
//! - [`Error`] and [`Result`] - error handling for the whole crate
//!
//! ## Inspecting a class
//!
//! ```rust,no_run
//! use classbridge::ClassFile;
//! use std::path::Path;
//!
//! let class = ClassFile::from_file(Path::new("Foo.class"))?;
//! for method in &class.methods {
//!     let name = method.name(&class.constant_pool)?;
//!     println!("{}", String::from_utf8_lossy(name));
//! }
//! # Ok::<(), classbridge::Error>(())
//! ```

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust,no_run
/// use classbridge::prelude::*;
///
/// let rewriter = BridgeRewriter::new();
/// let output = rewriter.rewrite(&std::fs::read("Foo.class")?)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod prelude;

/// Class file structural model, decoder, and encoder.
///
/// [`ClassFile`] is the entry point: [`ClassFile::from_bytes`] and
/// [`ClassFile::from_file`] decode, [`ClassFile::to_bytes`] re-encodes. The
/// model is mutable in between; the rewrite passes in [`rewrite`] are its
/// only intended mutators.
pub mod classfile;

/// The bridge-name rewrite engine.
///
/// [`BridgeRewriter`] drives the member and call-site passes over a class
/// file and carries the two process-wide transform counters.
pub mod rewrite;

/// `classbridge` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] used by every fallible
/// operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// `classbridge` Error type
///
/// Covers structural decode failures, reference-consistency violations, and
/// I/O errors. See [`error`](crate::Error) variants for details.
pub use error::Error;

/// The in-memory model of one class file.
pub use classfile::ClassFile;

/// The rewrite engine and its batch summary.
pub use rewrite::{BatchSummary, BridgeRewriter, MARKER};

/// Low-level input handling: memory-mapped or in-memory class file bytes,
/// and the bounds-checked cursor the decoder reads through.
pub use file::{parser::Parser, File};
