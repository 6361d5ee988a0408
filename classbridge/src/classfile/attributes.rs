//! Attribute model: parsed `Code` sections, opaque everything else.
//!
//! Only the `Code` attribute is decoded structurally, because the call-site
//! rewriter has to walk its instruction stream. Every other attribute
//! (`LineNumberTable`, `StackMapTable`, `BootstrapMethods`, annotations) is
//! kept as an opaque byte range and re-emitted verbatim. The rewrite never
//! changes an instruction's encoded length, so every byte offset those
//! attributes store remains valid without adjustment.

use crate::{classfile::constpool::ConstantPool, file::parser::Parser, Result};

/// An attribute kept as an opaque byte range.
#[derive(Debug, Clone)]
pub struct AttributeInfo {
    /// Pool index of the `Utf8` attribute name.
    pub name_index: u16,
    /// The attribute payload, verbatim.
    pub info: Vec<u8>,
}

/// One exception table row of a `Code` attribute.
///
/// All four fields are byte offsets or pool indices that the rewrite must
/// never invalidate; since instruction lengths are fixed, the row is carried
/// through unchanged.
#[derive(Debug, Clone)]
pub struct ExceptionTableEntry {
    /// Start (inclusive) of the protected range, as a code offset.
    pub start_pc: u16,
    /// End (exclusive) of the protected range, as a code offset.
    pub end_pc: u16,
    /// Code offset of the handler.
    pub handler_pc: u16,
    /// Pool index of the caught `Class`, or 0 for catch-all.
    pub catch_type: u16,
}

/// A parsed `Code` attribute: the executable section of one method.
#[derive(Debug, Clone)]
pub struct CodeAttribute {
    /// Pool index of the `Utf8` entry spelling `Code`.
    pub name_index: u16,
    /// Operand stack depth limit.
    pub max_stack: u16,
    /// Local variable slot count.
    pub max_locals: u16,
    /// The instruction stream. Mutated in place by the call-site rewriter,
    /// never resized.
    pub code: Vec<u8>,
    /// Exception handler rows.
    pub exception_table: Vec<ExceptionTableEntry>,
    /// Nested attributes (debug tables etc.), kept opaque.
    pub attributes: Vec<AttributeInfo>,
}

/// One attribute of a class, field, or method.
#[derive(Debug, Clone)]
pub enum Attribute {
    /// A structurally parsed `Code` attribute.
    Code(CodeAttribute),
    /// Any other attribute, opaque.
    Raw(AttributeInfo),
}

impl Attribute {
    /// Parse one attribute at the cursor.
    ///
    /// The attribute name is resolved through the pool to decide whether the
    /// payload gets the structural `Code` treatment; an unresolvable name
    /// index is a decode failure.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] on truncation or on a `Code`
    /// payload whose parsed size disagrees with the declared length.
    pub(crate) fn parse(parser: &mut Parser, pool: &ConstantPool) -> Result<Attribute> {
        let name_index = parser.read_be::<u16>()?;
        let length = parser.read_be::<u32>()?;
        let name = pool.utf8(name_index)?;

        if name == b"Code" {
            let start = parser.pos();
            let code = Self::parse_code(parser, name_index, pool)?;
            let consumed = parser.pos() - start;
            if consumed != length as usize {
                return Err(malformed_error!(
                    "Code attribute declares {} bytes but spans {}",
                    length,
                    consumed
                ));
            }
            Ok(Attribute::Code(code))
        } else {
            let info = parser.read_bytes(length as usize)?;
            Ok(Attribute::Raw(AttributeInfo {
                name_index,
                info: info.to_vec(),
            }))
        }
    }

    fn parse_code(
        parser: &mut Parser,
        name_index: u16,
        pool: &ConstantPool,
    ) -> Result<CodeAttribute> {
        let max_stack = parser.read_be::<u16>()?;
        let max_locals = parser.read_be::<u16>()?;

        let code_length = parser.read_be::<u32>()?;
        if code_length == 0 {
            return Err(malformed_error!("Code attribute has an empty code array"));
        }
        let code = parser.read_bytes(code_length as usize)?.to_vec();

        let exception_count = parser.read_be::<u16>()?;
        let mut exception_table = Vec::with_capacity(exception_count as usize);
        for _ in 0..exception_count {
            exception_table.push(ExceptionTableEntry {
                start_pc: parser.read_be::<u16>()?,
                end_pc: parser.read_be::<u16>()?,
                handler_pc: parser.read_be::<u16>()?,
                catch_type: parser.read_be::<u16>()?,
            });
        }

        let attr_count = parser.read_be::<u16>()?;
        let mut attributes = Vec::with_capacity(attr_count as usize);
        for _ in 0..attr_count {
            // Nested attributes stay opaque, whatever their name; a nested
            // Code attribute is not a thing the format produces.
            let nested_name_index = parser.read_be::<u16>()?;
            pool.utf8(nested_name_index)?;
            let nested_length = parser.read_be::<u32>()?;
            let info = parser.read_bytes(nested_length as usize)?;
            attributes.push(AttributeInfo {
                name_index: nested_name_index,
                info: info.to_vec(),
            });
        }

        Ok(CodeAttribute {
            name_index,
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    /// Serialize this attribute, recomputing its length field.
    ///
    /// For untouched attributes the recomputed length always equals the
    /// decoded one, so output bytes match input bytes exactly.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a payload exceeds the format's
    /// `u32` length field (cannot happen for decoded input).
    pub(crate) fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Attribute::Raw(attr) => {
                out.extend_from_slice(&attr.name_index.to_be_bytes());
                out.extend_from_slice(&attr_length(attr.info.len())?.to_be_bytes());
                out.extend_from_slice(&attr.info);
            }
            Attribute::Code(code) => {
                let mut length = 2 + 2 + 4 + code.code.len();
                length += 2 + 8 * code.exception_table.len();
                length += 2;
                for nested in &code.attributes {
                    length += 6 + nested.info.len();
                }

                out.extend_from_slice(&code.name_index.to_be_bytes());
                out.extend_from_slice(&attr_length(length)?.to_be_bytes());
                out.extend_from_slice(&code.max_stack.to_be_bytes());
                out.extend_from_slice(&code.max_locals.to_be_bytes());
                out.extend_from_slice(&(code.code.len() as u32).to_be_bytes());
                out.extend_from_slice(&code.code);
                out.extend_from_slice(&(code.exception_table.len() as u16).to_be_bytes());
                for row in &code.exception_table {
                    out.extend_from_slice(&row.start_pc.to_be_bytes());
                    out.extend_from_slice(&row.end_pc.to_be_bytes());
                    out.extend_from_slice(&row.handler_pc.to_be_bytes());
                    out.extend_from_slice(&row.catch_type.to_be_bytes());
                }
                out.extend_from_slice(&(code.attributes.len() as u16).to_be_bytes());
                for nested in &code.attributes {
                    out.extend_from_slice(&nested.name_index.to_be_bytes());
                    out.extend_from_slice(&attr_length(nested.info.len())?.to_be_bytes());
                    out.extend_from_slice(&nested.info);
                }
            }
        }
        Ok(())
    }

    /// The pool index of this attribute's name.
    #[must_use]
    pub fn name_index(&self) -> u16 {
        match self {
            Attribute::Code(code) => code.name_index,
            Attribute::Raw(attr) => attr.name_index,
        }
    }
}

fn attr_length(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| malformed_error!("attribute payload of {} bytes too large", len))
}
