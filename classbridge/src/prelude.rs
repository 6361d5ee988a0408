//! Convenient re-exports of the most commonly used types and traits.
//!
//! This module provides a curated selection of the types needed for typical
//! use of the library, allowing for convenient glob imports:
//!
//! ```rust,no_run
//! use classbridge::prelude::*;
//!
//! let rewriter = BridgeRewriter::new();
//! let summary = rewriter.rewrite_paths(&[]);
//! assert!(summary.is_clean());
//! ```

pub use crate::{
    classfile::{
        attributes::{Attribute, AttributeInfo, CodeAttribute, ExceptionTableEntry},
        constpool::{ConstantEntry, ConstantPool},
        member::{MemberFlags, MemberInfo},
        ClassFile, ClassFlags,
    },
    rewrite::{BatchSummary, BridgeRewriter, MARKER},
    Error, File, Parser, Result,
};
