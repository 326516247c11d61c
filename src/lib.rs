//! A CHIP-8 interpreter core: memory, registers, call stack, timers and a
//! 64x32 framebuffer driven one instruction at a time through [`Chip8::step`].
//!
//! Windowing, audio and input polling are left to the host; [`Chip8Runner`]
//! paces the VM from elapsed wall-clock time.

mod chip8;
mod nibble;

pub use chip8::*;
pub use nibble::u4;
