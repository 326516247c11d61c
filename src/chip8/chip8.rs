use std::path::Path;

use log::{debug, trace, warn};
use rand::{SeedableRng, rngs::StdRng};

use super::{
    CallStack, Chip8Error, Chip8Result, Config, Framebuffer, Keypad, LoadError, Memory, Opcode,
    Quirks, ROM_START_ADDRESS, Registers, Timers,
};
use crate::u4;

/// Pending FX0A: the target register and the key seen pressed so far, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct KeyWait {
    pub(crate) x: u4,
    pub(crate) pressed: Option<u4>,
}

/// CHIP-8 virtual machine state
pub struct Chip8 {
    /// 4KB memory with the font at 0x50 and the program at 0x200
    pub(crate) memory: Memory,
    /// V0-VF, I and PC
    pub(crate) registers: Registers,
    /// Return addresses for subroutine calls
    pub(crate) stack: CallStack,
    /// Delay and sound timers, ticked by the host at 60Hz
    pub(crate) timers: Timers,
    /// Display buffer: 64x32 monochrome pixels
    pub(crate) framebuffer: Framebuffer,
    /// Keypad state, written by the host
    pub(crate) keypad: Keypad,

    /// Set while FX0A is suspended waiting for a key
    pub(crate) key_wait: Option<KeyWait>,

    pub(crate) quirks: Quirks,
    pub(crate) rng: StdRng,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        debug!("Creating CHIP-8 VM with {:?}", config.quirks);

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Chip8 {
            memory: Memory::new(),
            registers: Registers::new(),
            stack: CallStack::new(),
            timers: Timers::new(),
            framebuffer: Framebuffer::new(),
            keypad: Keypad::new(),
            key_wait: None,
            quirks: config.quirks,
            rng,
        }
    }

    /// Loads a ROM into memory at 0x200 and points the program counter at it.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.memory.load_rom(rom)?;
        self.registers.set_pc(ROM_START_ADDRESS as u16);
        debug!("Loaded {} byte ROM at {:#05X}", rom.len(), ROM_START_ADDRESS);

        Ok(())
    }

    /// Reads a ROM file from disk and loads it.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let path = path.as_ref();
        let rom = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.load(&rom)
    }

    /// Executes a single fetch-decode-execute cycle.
    ///
    /// On error the machine is left exactly as it was before the faulting
    /// instruction, with the program counter still pointing at it.
    pub fn step(&mut self) -> Result<Chip8Result, Chip8Error> {
        if self.key_wait.is_some() {
            return Ok(self.poll_key_wait());
        }

        let pc = self.registers.pc();
        let raw = self.memory.read_word(pc);
        let opcode = Opcode::decode(raw);
        trace!("{pc:03X}: {raw:04X} {opcode:?}");

        let result = self.execute(pc, opcode);
        if let Err(err) = &result {
            self.registers.set_pc(pc);
            warn!("{err}");
        }

        result
    }

    /// Updates the delay and sound timers. Should be called at 60Hz.
    pub fn timers_cycle(&mut self) {
        self.timers.tick();
    }

    /// Returns true if the sound timer is greater than zero, indicating a beep should be played.
    pub fn should_beep(&self) -> bool {
        self.timers.is_sound_active()
    }

    /// Set the state of a key on the keypad.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.keypad.set(key, pressed);
    }

    /// Get the state of a pixel on the display (true = on, false = off).
    pub fn get_display_pixel(&self, y: usize, x: usize) -> bool {
        self.framebuffer.pixel_at(x, y)
    }

    /// True while FX0A is waiting for a key press and release.
    pub fn is_awaiting_key(&self) -> bool {
        self.key_wait.is_some()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut Timers {
        &mut self.timers
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vm(program: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::with_config(&Config::default().with_seed(1));
        chip8.load(program).unwrap();
        chip8
    }

    #[test]
    fn load_points_pc_at_program() {
        let chip8 = vm(&[0x12, 0x00]);
        assert_eq!(chip8.registers().pc(), 0x200);
        assert_eq!(chip8.memory().read_word(0x200), 0x1200);
    }

    #[test]
    fn reload_clears_previous_program() {
        let mut chip8 = vm(&[0x60, 0x01, 0x61, 0x02, 0x62, 0x03]);
        chip8.load(&[0x12, 0x00]).unwrap();
        assert_eq!(chip8.memory().read_word(0x200), 0x1200);
        assert_eq!(chip8.memory().read_word(0x202), 0x0000);
        assert_eq!(chip8.memory().read_word(0x204), 0x0000);
        assert_eq!(chip8.memory().read(0x50), 0xF0);
    }

    #[test]
    fn load_file_reports_missing_path() {
        let mut chip8 = Chip8::new();
        let err = chip8
            .load_file("/nonexistent/definitely/missing.ch8")
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn unknown_opcode_leaves_state_untouched() {
        let mut chip8 = vm(&[0xFF, 0xFF]);
        let registers = chip8.registers().clone();
        let framebuffer = chip8.framebuffer().clone();

        let err = chip8.step().unwrap_err();

        assert_eq!(
            err,
            Chip8Error::UnknownOpcode {
                opcode: 0xFFFF,
                pc: 0x200
            }
        );
        assert_eq!(chip8.registers(), &registers);
        assert_eq!(chip8.framebuffer(), &framebuffer);
    }

    #[test]
    fn fetch_wraps_at_end_of_memory() {
        let mut chip8 = vm(&[]);
        chip8.memory_mut().write(0xFFE, 0x60);
        chip8.memory_mut().write(0xFFF, 0x2A);
        chip8.registers_mut().set_pc(0xFFE);

        chip8.step().unwrap();

        assert_eq!(chip8.registers().v[0], 0x2A);
        assert_eq!(chip8.registers().pc(), 0x000);
    }

    #[test]
    fn should_beep_follows_sound_timer() {
        let mut chip8 = vm(&[]);
        assert!(!chip8.should_beep());
        chip8.timers_mut().set_sound(1);
        assert!(chip8.should_beep());
        chip8.timers_cycle();
        assert!(!chip8.should_beep());
    }
}
