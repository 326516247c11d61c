mod chip8;
mod config;
mod execute;
mod font;
mod framebuffer;
mod keypad;
mod memory;
mod opcode;
mod programs;
mod registers;
mod runner;
mod stack;
mod timer;
mod types;

pub use chip8::*;
pub use config::*;
pub use font::*;
pub use framebuffer::*;
pub use keypad::*;
pub use memory::*;
pub use opcode::*;
pub use programs::*;
pub use registers::*;
pub use runner::*;
pub use stack::*;
pub use timer::*;
pub use types::*;
