//! Member definitions: the shared field/method entry shape.
//!
//! Fields and methods have an identical on-disk layout (JVMS §4.5/§4.6), so
//! one [`MemberInfo`] type backs both lists. Which list a member sits in is
//! the only thing distinguishing the two kinds.

use bitflags::bitflags;

use crate::{
    classfile::{attributes::Attribute, constpool::ConstantPool},
    file::parser::Parser,
    Result,
};

bitflags! {
    /// Member access and property flags.
    ///
    /// Declared with the method-form names; fields reuse several bit
    /// positions under different names (`0x0040` is `BRIDGE` on a method,
    /// `VOLATILE` on a field). The raw `u16` is retained bit-for-bit,
    /// including positions with no name here, so flags the rewrite does not
    /// touch always re-encode unchanged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MemberFlags: u16 {
        /// Declared public.
        const PUBLIC = 0x0001;
        /// Declared private.
        const PRIVATE = 0x0002;
        /// Declared protected.
        const PROTECTED = 0x0004;
        /// Declared static.
        const STATIC = 0x0008;
        /// Declared final.
        const FINAL = 0x0010;
        /// Declared synchronized (methods).
        const SYNCHRONIZED = 0x0020;
        /// A compiler-generated bridge method (`VOLATILE` on fields).
        const BRIDGE = 0x0040;
        /// Declared with a variable arity (`TRANSIENT` on fields).
        const VARARGS = 0x0080;
        /// Implemented in native code.
        const NATIVE = 0x0100;
        /// Declared abstract.
        const ABSTRACT = 0x0400;
        /// FP-strict semantics.
        const STRICT = 0x0800;
        /// Not present in source; generated by a compiler.
        const SYNTHETIC = 0x1000;
        /// An enum constant (fields).
        const ENUM = 0x4000;
    }
}

/// One field or method of a class.
#[derive(Debug, Clone)]
pub struct MemberInfo {
    /// Access and property flags, raw bits retained.
    pub access_flags: MemberFlags,
    /// Pool index of the `Utf8` member name.
    pub name_index: u16,
    /// Pool index of the `Utf8` type descriptor.
    pub descriptor_index: u16,
    /// The member's attributes; `Code` is parsed, the rest are opaque.
    pub attributes: Vec<Attribute>,
}

impl MemberInfo {
    /// Parse one member entry at the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] on truncation or an invalid
    /// attribute name reference.
    pub(crate) fn parse(parser: &mut Parser, pool: &ConstantPool) -> Result<MemberInfo> {
        let access_flags = MemberFlags::from_bits_retain(parser.read_be::<u16>()?);
        let name_index = parser.read_be::<u16>()?;
        let descriptor_index = parser.read_be::<u16>()?;

        let attr_count = parser.read_be::<u16>()?;
        let mut attributes = Vec::with_capacity(attr_count as usize);
        for _ in 0..attr_count {
            attributes.push(Attribute::parse(parser, pool)?);
        }

        Ok(MemberInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    /// Serialize this member entry.
    ///
    /// # Errors
    /// Propagates attribute serialization failures.
    pub(crate) fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&self.access_flags.bits().to_be_bytes());
        out.extend_from_slice(&self.name_index.to_be_bytes());
        out.extend_from_slice(&self.descriptor_index.to_be_bytes());
        out.extend_from_slice(&(self.attributes.len() as u16).to_be_bytes());
        for attribute in &self.attributes {
            attribute.write(out)?;
        }
        Ok(())
    }

    /// The member's name bytes, resolved through the pool.
    ///
    /// # Errors
    /// Returns [`crate::Error::ReferenceKind`] if `name_index` does not
    /// resolve to a `Utf8` entry.
    pub fn name<'a>(&self, pool: &'a ConstantPool) -> Result<&'a [u8]> {
        pool.utf8(self.name_index)
    }
}
