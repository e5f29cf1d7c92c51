//! A 65C02 core that implements the instructions simple test programs need.
//! Opcodes outside of that set are skipped over by their encoded length, so
//! the PC always stays on instruction boundaries.

use super::board::Board;
use bitflags::bitflags;
use xmon::opcode;

const STACK_PAGE: u16 = 0x0100;
pub const RESET_VECTOR: u16 = 0xFFFC;

bitflags! {
    #[derive(Default)]
    pub struct Flags: u8 {
        const C = 0b_0000_0001;
        const Z = 0b_0000_0010;
        const I = 0b_0000_0100;
        const D = 0b_0000_1000;
        const V = 0b_0100_0000;
        const N = 0b_1000_0000;
    }
}

#[derive(Default, Debug, Clone)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub flags: Flags,
}

pub struct Cpu {
    pub reg: Registers,
    /// Set by BRK. A halted CPU doesn't execute anything until reset.
    halted: bool,
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            reg: Registers::default(),
            halted: false,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn reset(&mut self, board: &Board) {
        self.reg = Registers {
            sp: 0xFF,
            pc: board.read16(RESET_VECTOR),
            flags: Flags::I,
            ..Registers::default()
        };
        self.halted = false;
    }

    pub fn step_instr(&mut self, board: &mut Board) {
        if self.halted {
            return;
        }

        let instr_start = self.reg.pc;
        let op = self.read8i(board);

        match op {
            0x00 => {
                log::info!("BRK at {:#06X}, CPU halted", instr_start);
                self.halted = true;
            }
            0xEA => (),

            // Loads
            0xA9 => self.reg.a = self.imm_nz(board),
            0xA5 | 0xAD => {
                let addr = self.operand_addr(board, op);
                self.reg.a = self.nz(board.read8(addr));
            }
            0xA2 => self.reg.x = self.imm_nz(board),
            0xA6 | 0xAE => {
                let addr = self.operand_addr(board, op);
                self.reg.x = self.nz(board.read8(addr));
            }
            0xA0 => self.reg.y = self.imm_nz(board),
            0xA4 | 0xAC => {
                let addr = self.operand_addr(board, op);
                self.reg.y = self.nz(board.read8(addr));
            }

            // Stores
            0x85 | 0x8D => {
                let addr = self.operand_addr(board, op);
                board.write8(addr, self.reg.a);
            }
            0x86 | 0x8E => {
                let addr = self.operand_addr(board, op);
                board.write8(addr, self.reg.x);
            }
            0x84 | 0x8C => {
                let addr = self.operand_addr(board, op);
                board.write8(addr, self.reg.y);
            }
            0x64 | 0x9C => {
                let addr = self.operand_addr(board, op);
                board.write8(addr, 0);
            }

            // Transfers
            0xAA => self.reg.x = self.nz(self.reg.a),
            0x8A => self.reg.a = self.nz(self.reg.x),
            0xA8 => self.reg.y = self.nz(self.reg.a),
            0x98 => self.reg.a = self.nz(self.reg.y),

            // Increments and decrements
            0xE8 => self.reg.x = self.nz(self.reg.x.wrapping_add(1)),
            0xC8 => self.reg.y = self.nz(self.reg.y.wrapping_add(1)),
            0xCA => self.reg.x = self.nz(self.reg.x.wrapping_sub(1)),
            0x88 => self.reg.y = self.nz(self.reg.y.wrapping_sub(1)),
            0x1A => self.reg.a = self.nz(self.reg.a.wrapping_add(1)),
            0x3A => self.reg.a = self.nz(self.reg.a.wrapping_sub(1)),
            0xE6 | 0xEE => {
                let addr = self.operand_addr(board, op);
                let val = self.nz(board.read8(addr).wrapping_add(1));
                board.write8(addr, val);
            }
            0xC6 | 0xCE => {
                let addr = self.operand_addr(board, op);
                let val = self.nz(board.read8(addr).wrapping_sub(1));
                board.write8(addr, val);
            }

            // Arithmetic and comparisons
            0x69 => {
                let val = self.read8i(board);
                self.adc(val);
            }
            0xE9 => {
                let val = self.read8i(board);
                self.adc(!val);
            }
            0xC9 => {
                let val = self.read8i(board);
                self.compare(self.reg.a, val);
            }
            0xE0 => {
                let val = self.read8i(board);
                self.compare(self.reg.x, val);
            }
            0xC0 => {
                let val = self.read8i(board);
                self.compare(self.reg.y, val);
            }
            0x18 => self.reg.flags.remove(Flags::C),
            0x38 => self.reg.flags.insert(Flags::C),

            // Stack
            0x48 => self.push(board, self.reg.a),
            0x68 => {
                let val = self.pull(board);
                self.reg.a = self.nz(val);
            }

            // Branches
            0x10 => self.branch(board, !self.reg.flags.contains(Flags::N)),
            0x30 => self.branch(board, self.reg.flags.contains(Flags::N)),
            0x90 => self.branch(board, !self.reg.flags.contains(Flags::C)),
            0xB0 => self.branch(board, self.reg.flags.contains(Flags::C)),
            0xD0 => self.branch(board, !self.reg.flags.contains(Flags::Z)),
            0xF0 => self.branch(board, self.reg.flags.contains(Flags::Z)),
            0x80 => self.branch(board, true),

            // Control flow
            0x4C => self.reg.pc = self.read16i(board),
            0x20 => {
                let target = self.read16i(board);
                let [lo, hi] = self.reg.pc.wrapping_sub(1).to_le_bytes();
                self.push(board, hi);
                self.push(board, lo);
                self.reg.pc = target;
            }
            0x60 => {
                let lo = self.pull(board);
                let hi = self.pull(board);
                self.reg.pc = u16::from_le_bytes([lo, hi]).wrapping_add(1);
            }

            _ => {
                log::trace!("Skipping unimplemented opcode {:#04X} at {:#06X}", op, instr_start);
                let operand_len = opcode::instruction_len(op) as u16 - 1;
                self.reg.pc = self.reg.pc.wrapping_add(operand_len);
            }
        }
    }

    fn read8i(&mut self, board: &Board) -> u8 {
        let val = board.read8(self.reg.pc);
        self.reg.pc = self.reg.pc.wrapping_add(1);
        val
    }

    fn read16i(&mut self, board: &Board) -> u16 {
        u16::from_le_bytes([self.read8i(board), self.read8i(board)])
    }

    fn imm_nz(&mut self, board: &Board) -> u8 {
        let val = self.read8i(board);
        self.nz(val)
    }

    /// Zero page or absolute operand, depending on the length of `op`
    fn operand_addr(&mut self, board: &Board, op: u8) -> u16 {
        if opcode::instruction_len(op) == 2 {
            self.read8i(board) as u16
        } else {
            self.read16i(board)
        }
    }

    fn nz(&mut self, val: u8) -> u8 {
        self.reg.flags.set(Flags::Z, val == 0);
        self.reg.flags.set(Flags::N, val & 0x80 != 0);
        val
    }

    fn adc(&mut self, val: u8) {
        let a = self.reg.a;
        let carry = self.reg.flags.contains(Flags::C) as u16;
        let sum = a as u16 + val as u16 + carry;
        let result = sum as u8;

        self.reg.flags.set(Flags::C, sum > 0xFF);
        self.reg
            .flags
            .set(Flags::V, (!(a ^ val) & (a ^ result) & 0x80) != 0);
        self.reg.a = self.nz(result);
    }

    fn compare(&mut self, reg: u8, val: u8) {
        self.reg.flags.set(Flags::C, reg >= val);
        self.nz(reg.wrapping_sub(val));
    }

    fn branch(&mut self, board: &Board, taken: bool) {
        let offset = self.read8i(board) as i8;

        if taken {
            self.reg.pc = self.reg.pc.wrapping_add(offset as i16 as u16);
        }
    }

    fn push(&mut self, board: &mut Board, val: u8) {
        board.write8(STACK_PAGE | self.reg.sp as u16, val);
        self.reg.sp = self.reg.sp.wrapping_sub(1);
    }

    fn pull(&mut self, board: &Board) -> u8 {
        self.reg.sp = self.reg.sp.wrapping_add(1);
        board.read8(STACK_PAGE | self.reg.sp as u16)
    }
}
