use crate::u4;

/// Pressed state of the 16-key hex keypad. Written by the host, read by the VM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; 16],
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: u4, pressed: bool) {
        self.keys[key] = pressed;
    }

    pub fn is_pressed(&self, key: u4) -> bool {
        self.keys[key]
    }

    /// Lowest-numbered key currently held down.
    pub fn first_pressed(&self) -> Option<u4> {
        self.keys
            .iter()
            .position(|&pressed| pressed)
            .map(|key| u4::new(key as u8))
    }
}
