//! Instruction length computation for the bytecode stream walk.
//!
//! The call-site rewriter needs to find instruction boundaries without
//! understanding instruction semantics. Almost every opcode has a fixed
//! encoded length; the exceptions are `wide` (length depends on the modified
//! opcode) and `tableswitch`/`lookupswitch` (length depends on operand counts
//! *and* on the instruction's own offset, because their operands are padded
//! to a 4-byte boundary relative to the start of the code array).
//!
//! The rewrite itself never changes any length (rewritten invocations keep
//! their original width), so a single forward pass over each code array is
//! enough and no offset in any side table ever moves.

use crate::Result;

/// `getstatic`
pub(crate) const GETSTATIC: u8 = 0xB2;
/// `putfield`
pub(crate) const PUTFIELD: u8 = 0xB5;
/// `invokevirtual`
pub(crate) const INVOKEVIRTUAL: u8 = 0xB6;
/// `invokespecial`
pub(crate) const INVOKESPECIAL: u8 = 0xB7;
/// `invokestatic`
pub(crate) const INVOKESTATIC: u8 = 0xB8;
/// `invokeinterface`
pub(crate) const INVOKEINTERFACE: u8 = 0xB9;
/// `invokedynamic`
pub(crate) const INVOKEDYNAMIC: u8 = 0xBA;

const WIDE: u8 = 0xC4;
const IINC: u8 = 0x84;
const TABLESWITCH: u8 = 0xAA;
const LOOKUPSWITCH: u8 = 0xAB;

/// Encoded length of a fixed-width opcode, or `None` for the three
/// variable-width forms and for opcodes the format does not define.
fn fixed_length(opcode: u8) -> Option<usize> {
    Some(match opcode {
        // nop, constants
        0x00..=0x0F => 1,
        // bipush
        0x10 => 2,
        // sipush
        0x11 => 3,
        // ldc
        0x12 => 2,
        // ldc_w, ldc2_w
        0x13 | 0x14 => 3,
        // iload..aload with local index
        0x15..=0x19 => 2,
        // iload_0..saload
        0x1A..=0x35 => 1,
        // istore..astore with local index
        0x36..=0x3A => 2,
        // istore_0..lxor
        0x3B..=0x83 => 1,
        // iinc
        0x84 => 3,
        // conversions and comparisons
        0x85..=0x98 => 1,
        // conditional and unconditional branches, jsr
        0x99..=0xA8 => 3,
        // ret
        0xA9 => 2,
        // ireturn..return
        0xAC..=0xB1 => 1,
        // getstatic..invokestatic
        0xB2..=0xB8 => 3,
        // invokeinterface, invokedynamic
        0xB9 | 0xBA => 5,
        // new
        0xBB => 3,
        // newarray
        0xBC => 2,
        // anewarray
        0xBD => 3,
        // arraylength, athrow
        0xBE | 0xBF => 1,
        // checkcast, instanceof
        0xC0 | 0xC1 => 3,
        // monitorenter, monitorexit
        0xC2 | 0xC3 => 1,
        // multianewarray
        0xC5 => 4,
        // ifnull, ifnonnull
        0xC6 | 0xC7 => 3,
        // goto_w, jsr_w
        0xC8 | 0xC9 => 5,
        _ => return None,
    })
}

fn read_u32(code: &[u8], at: usize) -> Result<u32> {
    let Some(bytes) = code.get(at..at + 4) else {
        return Err(malformed_error!(
            "bytecode truncated inside a switch instruction at offset {}",
            at
        ));
    };
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Compute the total encoded length of the instruction starting at `pc`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for an opcode the format does not
/// define, a switch whose bounds are inconsistent, or a stream that ends
/// mid-instruction.
pub(crate) fn instruction_length(code: &[u8], pc: usize) -> Result<usize> {
    let opcode = code[pc];

    let length = match opcode {
        TABLESWITCH => {
            let pad = (4 - ((pc + 1) % 4)) % 4;
            let low = read_u32(code, pc + 1 + pad + 4)? as i32;
            let high = read_u32(code, pc + 1 + pad + 8)? as i32;
            if high < low {
                return Err(malformed_error!(
                    "tableswitch at offset {} has high {} below low {}",
                    pc,
                    high,
                    low
                ));
            }
            let entries = (high as i64 - low as i64 + 1) as usize;
            1 + pad + 12 + 4 * entries
        }
        LOOKUPSWITCH => {
            let pad = (4 - ((pc + 1) % 4)) % 4;
            let npairs = read_u32(code, pc + 1 + pad + 4)? as usize;
            1 + pad + 8 + 8 * npairs
        }
        WIDE => {
            let Some(modified) = code.get(pc + 1) else {
                return Err(malformed_error!(
                    "bytecode truncated inside wide at offset {}",
                    pc
                ));
            };
            if *modified == IINC {
                6
            } else {
                4
            }
        }
        _ => fixed_length(opcode).ok_or_else(|| {
            malformed_error!("undefined opcode 0x{:02X} at offset {}", opcode, pc)
        })?,
    };

    if pc + length > code.len() {
        return Err(malformed_error!(
            "instruction 0x{:02X} at offset {} runs past the end of the code array",
            opcode,
            pc
        ));
    }

    Ok(length)
}
