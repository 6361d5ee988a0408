//! Class file structural model, decoder, and encoder.
//!
//! [`ClassFile`] is an in-memory representation of one compiled class,
//! sufficient to round-trip the binary format without loss: every section the
//! rewrite does not touch re-encodes byte-identically. The decoder is strict:
//! size fields, table bounds, and reference kinds are all validated up front,
//! and any violation fails the whole artifact rather than attempting a
//! best-effort parse (a dangling symbol reference is unrecoverable ambiguity).
//!
//! # Key Components
//!
//! - [`ClassFile`] - the model; [`ClassFile::from_bytes`] /
//!   [`ClassFile::from_file`] decode, [`ClassFile::to_bytes`] encodes
//! - [`constpool::ConstantPool`] - the symbol table
//! - [`member::MemberInfo`] - field and method definitions
//! - [`attributes::Attribute`] - parsed `Code` sections and opaque ranges
//!
//! # Examples
//!
//! ```rust,no_run
//! use classbridge::ClassFile;
//! use std::path::Path;
//!
//! let class = ClassFile::from_file(Path::new("Foo.class"))?;
//! println!("{} methods, {} fields", class.methods.len(), class.fields.len());
//!
//! let bytes = class.to_bytes()?;
//! # Ok::<(), classbridge::Error>(())
//! ```

pub mod attributes;
pub mod constpool;
pub mod member;

use std::path::Path;

use bitflags::bitflags;

use crate::{
    classfile::{attributes::Attribute, constpool::ConstantPool, member::MemberInfo},
    file::{parser::Parser, File},
    Result,
};

/// The class file magic number.
pub const MAGIC: u32 = 0xCAFE_BABE;

/// Oldest supported major version (JDK 1.1).
pub const MIN_MAJOR_VERSION: u16 = 45;

/// Newest supported major version. Files above this are rejected with
/// [`crate::Error::NotSupported`] rather than best-effort patched.
pub const MAX_MAJOR_VERSION: u16 = 68;

bitflags! {
    /// Class-level access and property flags.
    ///
    /// Raw bits are retained so unknown or future flags survive re-encoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClassFlags: u16 {
        /// Declared public.
        const PUBLIC = 0x0001;
        /// Declared final.
        const FINAL = 0x0010;
        /// Treat superclass methods specially on `invokespecial`.
        const SUPER = 0x0020;
        /// An interface, not a class.
        const INTERFACE = 0x0200;
        /// Declared abstract.
        const ABSTRACT = 0x0400;
        /// Not present in source; generated by a compiler.
        const SYNTHETIC = 0x1000;
        /// An annotation interface.
        const ANNOTATION = 0x2000;
        /// An enum class.
        const ENUM = 0x4000;
        /// A module descriptor.
        const MODULE = 0x8000;
    }
}

/// In-memory representation of one class file.
///
/// Constructed by the decoder, mutated in place by the rewriters, consumed
/// read-only by the encoder. Instances are independent: each owns its
/// constant pool outright, so many class files can be processed in parallel
/// with no shared structure.
#[derive(Debug, Clone)]
pub struct ClassFile {
    /// Format minor version.
    pub minor_version: u16,
    /// Format major version, within the supported range.
    pub major_version: u16,
    /// The symbol table.
    pub constant_pool: ConstantPool,
    /// Class-level access flags, raw bits retained.
    pub access_flags: ClassFlags,
    /// Pool index of this class's `Class` entry.
    pub this_class: u16,
    /// Pool index of the superclass `Class` entry, or 0 for
    /// `java/lang/Object` itself.
    pub super_class: u16,
    /// Pool indices of directly implemented interfaces.
    pub interfaces: Vec<u16>,
    /// Field definitions, in declaration order.
    pub fields: Vec<MemberInfo>,
    /// Method definitions, in declaration order.
    pub methods: Vec<MemberInfo>,
    /// Class-level attributes, kept opaque.
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    /// Decode a class file from a raw byte buffer.
    ///
    /// # Errors
    /// - [`crate::Error::Empty`] for an empty buffer
    /// - [`crate::Error::NotSupported`] for an unrecognized major version
    /// - [`crate::Error::Malformed`] / [`crate::Error::OutOfBounds`] for
    ///   structural corruption, including trailing bytes after the last
    ///   section
    /// - [`crate::Error::ReferenceKind`] for a kind-mismatched symbol
    ///   reference
    pub fn from_bytes(data: &[u8]) -> Result<ClassFile> {
        if data.is_empty() {
            return Err(crate::Error::Empty);
        }

        let mut parser = Parser::new(data);

        let magic = parser.read_be::<u32>()?;
        if magic != MAGIC {
            return Err(malformed_error!(
                "invalid magic 0x{:08X}, expected 0x{:08X}",
                magic,
                MAGIC
            ));
        }

        let minor_version = parser.read_be::<u16>()?;
        let major_version = parser.read_be::<u16>()?;
        if !(MIN_MAJOR_VERSION..=MAX_MAJOR_VERSION).contains(&major_version) {
            return Err(crate::Error::NotSupported);
        }

        let constant_pool = ConstantPool::parse(&mut parser)?;

        let access_flags = ClassFlags::from_bits_retain(parser.read_be::<u16>()?);
        let this_class = parser.read_be::<u16>()?;
        let super_class = parser.read_be::<u16>()?;

        let interface_count = parser.read_be::<u16>()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(parser.read_be::<u16>()?);
        }

        let field_count = parser.read_be::<u16>()?;
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            fields.push(MemberInfo::parse(&mut parser, &constant_pool)?);
        }

        let method_count = parser.read_be::<u16>()?;
        let mut methods = Vec::with_capacity(method_count as usize);
        for _ in 0..method_count {
            methods.push(MemberInfo::parse(&mut parser, &constant_pool)?);
        }

        let attr_count = parser.read_be::<u16>()?;
        let mut attributes = Vec::with_capacity(attr_count as usize);
        for _ in 0..attr_count {
            attributes.push(Attribute::parse(&mut parser, &constant_pool)?);
        }

        if parser.has_more_data() {
            return Err(malformed_error!(
                "{} trailing bytes after class attributes",
                parser.len() - parser.pos()
            ));
        }

        let class = ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        };
        class.validate_references()?;

        Ok(class)
    }

    /// Decode a class file from disk (memory-mapped).
    ///
    /// # Errors
    /// [`crate::Error::FileError`] on I/O failure, otherwise as
    /// [`ClassFile::from_bytes`].
    pub fn from_file(path: &Path) -> Result<ClassFile> {
        let file = File::from_file(path)?;
        Self::from_bytes(file.data())
    }

    /// Serialize the class back into a raw byte buffer.
    ///
    /// Sections are emitted in decode order; opaque ranges verbatim. The
    /// output is deterministic, and byte-identical to the decoded input
    /// wherever no rewrite touched the model.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] only for payloads exceeding a
    /// format length field, which cannot happen for a decoded model.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();

        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.extend_from_slice(&self.minor_version.to_be_bytes());
        out.extend_from_slice(&self.major_version.to_be_bytes());

        self.constant_pool.write(&mut out);

        out.extend_from_slice(&self.access_flags.bits().to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());

        out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            out.extend_from_slice(&interface.to_be_bytes());
        }

        out.extend_from_slice(&(self.fields.len() as u16).to_be_bytes());
        for field in &self.fields {
            field.write(&mut out)?;
        }

        out.extend_from_slice(&(self.methods.len() as u16).to_be_bytes());
        for method in &self.methods {
            method.write(&mut out)?;
        }

        out.extend_from_slice(&(self.attributes.len() as u16).to_be_bytes());
        for attribute in &self.attributes {
            attribute.write(&mut out)?;
        }

        Ok(out)
    }

    /// Verify that every stored index points at an existing entry of the
    /// expected kind.
    fn validate_references(&self) -> Result<()> {
        self.constant_pool.validate()?;

        self.constant_pool.expect_class(self.this_class)?;
        if self.super_class != 0 {
            self.constant_pool.expect_class(self.super_class)?;
        }
        for interface in &self.interfaces {
            self.constant_pool.expect_class(*interface)?;
        }

        for member in self.fields.iter().chain(self.methods.iter()) {
            self.constant_pool.utf8(member.name_index)?;
            self.constant_pool.utf8(member.descriptor_index)?;

            for attribute in &member.attributes {
                if let Attribute::Code(code) = attribute {
                    for row in &code.exception_table {
                        if row.catch_type != 0 {
                            self.constant_pool.expect_class(row.catch_type)?;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
