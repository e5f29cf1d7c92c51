//! Just enough knowledge about 65C02 opcodes for the monitor to walk
//! through code: how long an instruction is, and which one is a call.

/// JSR abs, the only subroutine call the 65C02 has
pub const JSR: u8 = 0x20;

/// Encoded length of JSR abs. Step-over breaks at `PC + JSR_LEN`.
pub const JSR_LEN: u16 = 3;

/// Returns the encoded length (opcode + operands) of an instruction, in bytes.
/// Undefined opcodes report the number of bytes the 65C02 skips when
/// executing them as NOPs.
pub fn instruction_len(opcode: u8) -> u8 {
    let row = opcode >> 4;

    match opcode & 0x0F {
        0x0 => match opcode {
            // BRK, RTI, RTS
            0x00 | 0x40 | 0x60 => 1,
            JSR => 3,
            // Branches and immediate loads/compares
            _ => 2,
        },
        // (zp,X), (zp),Y, (zp), zp, zp,X, zp,Y, RMB/SMB
        0x1 | 0x2 | 0x4..=0x7 => 2,
        // Implied/accumulator, and single byte NOPs
        0x3 | 0x8 | 0xA | 0xB => 1,
        // Immediate on even rows, abs,Y on odd ones
        0x9 => {
            if row % 2 == 0 {
                2
            } else {
                3
            }
        }
        // Absolute forms, and BBR/BBS zp,rel
        0xC..=0xF => 3,
        _ => unreachable!(),
    }
}

pub fn is_call(opcode: u8) -> bool {
    opcode == JSR
}
