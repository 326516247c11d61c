/// Behaviours that differ between historical CHIP-8 interpreters.
///
/// `Quirks::default()` is the modern behaviour; `Quirks::cosmac_vip()` matches the
/// original COSMAC VIP interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    /// 8XY6/8XYE shift VY into VX instead of shifting VX in place.
    pub shift_uses_vy: bool,
    /// BXNN jumps to XNN + VX instead of NNN + V0.
    pub jump_with_vx: bool,
    /// FX55/FX65 leave I pointing past the last register transferred.
    pub load_store_increments_index: bool,
    /// 8XY1/8XY2/8XY3 clear VF.
    pub logic_resets_vf: bool,
    /// DXYN clears VF before drawing; otherwise VF is only written on collision.
    pub draw_resets_vf: bool,
    /// Sprites are clipped at the right and bottom edges instead of wrapping.
    pub clip_sprites: bool,
    /// DXYN ends the current batch so at most one sprite is drawn per frame.
    pub display_wait: bool,
}

impl Quirks {
    pub const fn modern() -> Self {
        Quirks {
            shift_uses_vy: false,
            jump_with_vx: false,
            load_store_increments_index: false,
            logic_resets_vf: false,
            draw_resets_vf: true,
            clip_sprites: false,
            display_wait: false,
        }
    }

    pub const fn cosmac_vip() -> Self {
        Quirks {
            shift_uses_vy: true,
            jump_with_vx: false,
            load_store_increments_index: true,
            logic_resets_vf: true,
            draw_resets_vf: true,
            clip_sprites: true,
            display_wait: true,
        }
    }
}

impl Default for Quirks {
    fn default() -> Self {
        Self::modern()
    }
}

pub const DEFAULT_CPU_HZ: f32 = 700.0;
pub const DEFAULT_TIMER_HZ: f32 = 60.0;

/// VM and pacing settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub quirks: Quirks,
    /// Instructions executed per second by `Chip8Runner`.
    pub cpu_hz: f32,
    /// Timer decrements per second by `Chip8Runner`.
    pub timer_hz: f32,
    /// Seed for CXNN; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Config {
    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_cpu_hz(mut self, cpu_hz: f32) -> Self {
        self.cpu_hz = cpu_hz;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            quirks: Quirks::default(),
            cpu_hz: DEFAULT_CPU_HZ,
            timer_hz: DEFAULT_TIMER_HZ,
            rng_seed: None,
        }
    }
}
