use super::{FONT, FONT_END_ADDRESS, FONT_START_ADDRESS, LoadError};

// Standard CHIP-8 memory layout
pub const MEMORY_SIZE: usize = 4096;
pub const ROM_START_ADDRESS: usize = 0x200;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - ROM_START_ADDRESS;

/// Mask applied to every address; accesses past 0xFFF wrap around to 0x000.
pub const ADDRESS_MASK: u16 = 0x0FFF;

/// 4KB of byte-addressable memory with the font preloaded.
#[derive(Clone)]
pub struct Memory {
    data: [u8; MEMORY_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        let mut data = [0; MEMORY_SIZE];
        data[FONT_START_ADDRESS..FONT_END_ADDRESS].copy_from_slice(&FONT);
        Memory { data }
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.data[usize::from(addr & ADDRESS_MASK)]
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        self.data[usize::from(addr & ADDRESS_MASK)] = value;
    }

    /// Reads a big-endian instruction word, wrapping from 0xFFF to 0x000.
    pub fn read_word(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.read(addr), self.read(addr.wrapping_add(1))])
    }

    /// Copies `len` bytes starting at `addr`, wrapping at the end of memory.
    pub fn read_wrapping(&self, addr: u16, len: usize) -> Vec<u8> {
        (0..len)
            .map(|offset| self.read(addr.wrapping_add(offset as u16)))
            .collect()
    }

    /// Copies a ROM image to the program area at 0x200.
    /// Copies `rom` to 0x200 and zeroes the rest of program memory.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(LoadError::RomTooLarge {
                size: rom.len(),
                max_size: MAX_ROM_SIZE,
            });
        }

        let (program, rest) = self.data[ROM_START_ADDRESS..].split_at_mut(rom.len());
        program.copy_from_slice(rom);
        rest.fill(0);

        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
