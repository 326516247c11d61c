/// Delay and sound timers. Both count down once per tick and stop at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timers {
    delay: u8,
    sound: u8,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// One 60Hz decrement step.
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    pub fn delay(&self) -> u8 {
        self.delay
    }

    pub fn sound(&self) -> u8 {
        self.sound
    }

    pub fn set_delay(&mut self, value: u8) {
        self.delay = value;
    }

    pub fn set_sound(&mut self, value: u8) {
        self.sound = value;
    }

    pub fn is_sound_active(&self) -> bool {
        self.sound > 0
    }
}
