//! The call-site rewrite pass.
//!
//! Walks every method's code array positionally and redirects invocation and
//! field-access instructions whose referenced name carries the marker. The
//! redirect swaps the instruction's u2 pool operand for a found-or-appended
//! entry of the *same* structural kind carrying the real name: a Methodref
//! stays a Methodref, an InvokeDynamic stays an InvokeDynamic with the same
//! bootstrap index. The operand keeps its byte width and the instruction its
//! length, so no offset anywhere in the code or its side tables moves.

use crate::{
    classfile::{
        attributes::Attribute,
        constpool::{ConstantEntry, ConstantPool},
        ClassFile,
    },
    file::io::write_be_at,
    rewrite::{
        opcodes::{
            self, GETSTATIC, INVOKEDYNAMIC, INVOKEINTERFACE, INVOKESPECIAL, INVOKESTATIC,
            INVOKEVIRTUAL, PUTFIELD,
        },
        strip_marker,
    },
    Result,
};

/// The structural shape of a rewritable reference, captured before the pool
/// is mutated.
enum RefShape {
    Field { class_index: u16 },
    Method { class_index: u16 },
    InterfaceMethod { class_index: u16 },
    Dynamic { bootstrap_index: u16 },
}

/// Rewrite every marked call site in the class, returning the number of
/// instructions patched.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for an undefined opcode or truncated
/// instruction, [`crate::Error::ReferenceKind`] when an operand points at a
/// pool entry of the wrong kind, and [`crate::Error::PoolFull`] if a new
/// entry cannot be appended.
pub(crate) fn rewrite_call_sites(class: &mut ClassFile) -> Result<usize> {
    let ClassFile {
        constant_pool,
        methods,
        ..
    } = class;

    let mut count = 0;
    for method in methods.iter_mut() {
        for attribute in method.attributes.iter_mut() {
            if let Attribute::Code(code) = attribute {
                count += rewrite_code(&mut code.code, constant_pool)?;
            }
        }
    }

    Ok(count)
}

/// Walk one code array instruction by instruction, patching marked
/// references in place.
fn rewrite_code(code: &mut [u8], pool: &mut ConstantPool) -> Result<usize> {
    let mut count = 0;
    let mut pc = 0;

    while pc < code.len() {
        let opcode = code[pc];
        let length = opcodes::instruction_length(code, pc)?;

        if matches!(opcode, GETSTATIC..=INVOKEDYNAMIC) {
            let index = u16::from_be_bytes([code[pc + 1], code[pc + 2]]);
            if let Some(new_index) = rewrite_reference(pool, opcode, index)? {
                let mut offset = pc + 1;
                write_be_at(code, &mut offset, new_index)?;
                count += 1;
            }
        }

        pc += length;
    }

    Ok(count)
}

/// Resolve one instruction operand; if the referenced name is marked, return
/// the index of a same-kind entry carrying the real name.
fn rewrite_reference(pool: &mut ConstantPool, opcode: u8, index: u16) -> Result<Option<u16>> {
    let entry = pool.get(index)?;

    // Field instructions take a Fieldref; invokeinterface takes an
    // InterfaceMethodref; invokevirtual takes a Methodref; invokespecial and
    // invokestatic accept either method kind (class file v52+); invokedynamic
    // takes an InvokeDynamic. Anything else is a kind mismatch.
    let (shape, nat_index) = match (entry, opcode) {
        (
            ConstantEntry::FieldRef {
                class_index,
                name_and_type_index,
            },
            GETSTATIC..=PUTFIELD,
        ) => (
            RefShape::Field {
                class_index: *class_index,
            },
            *name_and_type_index,
        ),
        (
            ConstantEntry::MethodRef {
                class_index,
                name_and_type_index,
            },
            INVOKEVIRTUAL | INVOKESPECIAL | INVOKESTATIC,
        ) => (
            RefShape::Method {
                class_index: *class_index,
            },
            *name_and_type_index,
        ),
        (
            ConstantEntry::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            },
            INVOKESPECIAL | INVOKESTATIC | INVOKEINTERFACE,
        ) => (
            RefShape::InterfaceMethod {
                class_index: *class_index,
            },
            *name_and_type_index,
        ),
        (
            ConstantEntry::InvokeDynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            },
            INVOKEDYNAMIC,
        ) => (
            RefShape::Dynamic {
                bootstrap_index: *bootstrap_method_attr_index,
            },
            *name_and_type_index,
        ),
        (other, _) => {
            return Err(crate::Error::ReferenceKind {
                index,
                found: other.tag_name(),
                expected: expected_kind(opcode),
            })
        }
    };

    let (name_index, descriptor_index) = pool.name_and_type(nat_index)?;
    let name = pool.utf8(name_index)?;
    let Some(real_name) = strip_marker(name) else {
        return Ok(None);
    };
    let real_name = real_name.to_vec();

    let new_name = pool.find_or_add_utf8(&real_name)?;
    let new_nat = pool.find_or_add(ConstantEntry::NameAndType {
        name_index: new_name,
        descriptor_index,
    })?;

    let new_entry = match shape {
        RefShape::Field { class_index } => ConstantEntry::FieldRef {
            class_index,
            name_and_type_index: new_nat,
        },
        RefShape::Method { class_index } => ConstantEntry::MethodRef {
            class_index,
            name_and_type_index: new_nat,
        },
        RefShape::InterfaceMethod { class_index } => ConstantEntry::InterfaceMethodRef {
            class_index,
            name_and_type_index: new_nat,
        },
        RefShape::Dynamic { bootstrap_index } => ConstantEntry::InvokeDynamic {
            bootstrap_method_attr_index: bootstrap_index,
            name_and_type_index: new_nat,
        },
    };

    Ok(Some(pool.find_or_add(new_entry)?))
}

fn expected_kind(opcode: u8) -> &'static str {
    match opcode {
        GETSTATIC..=PUTFIELD => "Fieldref",
        INVOKEVIRTUAL => "Methodref",
        INVOKESPECIAL | INVOKESTATIC => "Methodref or InterfaceMethodref",
        INVOKEINTERFACE => "InterfaceMethodref",
        _ => "InvokeDynamic",
    }
}
