use super::{ADDRESS_MASK, ROM_START_ADDRESS};

/// General-purpose registers V0-VF plus the index register and program counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    /// V0-VF; VF doubles as the carry/borrow/collision flag.
    pub v: [u8; 16],
    i: u16,
    pc: u16,
}

impl Registers {
    pub fn new() -> Self {
        Registers {
            v: [0; 16],
            i: 0,
            pc: ROM_START_ADDRESS as u16,
        }
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn set_i(&mut self, value: u16) {
        self.i = value & ADDRESS_MASK;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, value: u16) {
        self.pc = value & ADDRESS_MASK;
    }

    /// Moves the program counter past one instruction.
    pub fn advance_pc(&mut self) {
        self.set_pc(self.pc.wrapping_add(2));
    }

    pub fn set_flag(&mut self, set: bool) {
        self.v[0xF] = u8::from(set);
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
