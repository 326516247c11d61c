use std::path::PathBuf;

pub const DISPLAY_X: usize = 64;
pub const DISPLAY_Y: usize = 32;
/// A type alias for the CHIP-8 display buffer representation
pub type Display<T> = [[T; DISPLAY_X]; DISPLAY_Y];

/// Result type for CHIP-8 CPU cycle execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chip8Result {
    /// Continue executing instructions in the current frame.
    Continue,
    /// Wait for the next frame before continuing
    /// (only produced by draws when the display wait quirk is enabled).
    WaitForNextFrame,
    /// The VM is suspended on FX0A until a key is pressed and released.
    AwaitingKey,
}

/// Errors raised while loading a program, before any execution begins.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("Failed to read ROM file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal errors that halt the VM. `pc` is the address of the faulting instruction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Chip8Error {
    #[error("Stack overflow at {pc:#05X}: call depth exceeds 16")]
    StackOverflow { pc: u16 },

    #[error("Stack underflow at {pc:#05X}: attempted to return from a subroutine with empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("Unknown opcode {opcode:#06X} at {pc:#05X}")]
    UnknownOpcode { opcode: u16, pc: u16 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_opcode_and_pc() {
        let err = Chip8Error::UnknownOpcode {
            opcode: 0xFFFF,
            pc: 0x200,
        };
        assert_eq!(err.to_string(), "Unknown opcode 0xFFFF at 0x200");
    }

    #[test]
    fn load_error_reports_sizes() {
        let err = LoadError::RomTooLarge {
            size: 4000,
            max_size: 3584,
        };
        assert_eq!(
            err.to_string(),
            "ROM is too large (4000 bytes), max size is 3584 bytes"
        );
    }
}
