use log::warn;

use super::{Chip8, Chip8Error, Chip8Result, Config, DEFAULT_CPU_HZ, DEFAULT_TIMER_HZ};
use crate::u4;

/// High-level emulator runner that manages timing internally.
pub struct Chip8Runner {
    chip8: Chip8,
    cpu_time_step: f32,
    timer_time_step: f32,
    cpu_dt_accumulator: f32,
    timer_dt_accumulator: f32,
}

impl Chip8Runner {
    pub fn new(chip8: Chip8) -> Self {
        Self::with_config(chip8, &Config::default())
    }

    /// Paces `chip8` at the instruction and timer rates from `config`.
    pub fn with_config(chip8: Chip8, config: &Config) -> Self {
        Self {
            chip8,
            cpu_time_step: time_step("CPU", config.cpu_hz, DEFAULT_CPU_HZ),
            timer_time_step: time_step("timer", config.timer_hz, DEFAULT_TIMER_HZ),
            cpu_dt_accumulator: 0.0,
            timer_dt_accumulator: 0.0,
        }
    }

    /// Update emulator by delta time, handles both CPU and timer cycles.
    ///
    /// Runs as many CPU cycles and timer updates as needed based on the elapsed time `dt`.
    /// Returns early if a frame has to be rendered before the next CPU cycle, or if
    /// the program is waiting for a key.
    pub fn update(&mut self, dt: f32) -> Result<Chip8Result, Chip8Error> {
        self.cpu_dt_accumulator += dt;
        self.timer_dt_accumulator += dt;

        while self.timer_dt_accumulator >= self.timer_time_step {
            self.chip8.timers_cycle();
            self.timer_dt_accumulator -= self.timer_time_step;
        }

        while self.cpu_dt_accumulator >= self.cpu_time_step {
            self.cpu_dt_accumulator -= self.cpu_time_step;
            match self.chip8.step()? {
                result @ (Chip8Result::WaitForNextFrame | Chip8Result::AwaitingKey) => {
                    // Stop executing cycles until the next frame.
                    // We also clear the accumulator to avoid "catching up" too fast in the next frame.
                    self.cpu_dt_accumulator = 0.0;
                    return Ok(result);
                }
                Chip8Result::Continue => {}
            }
        }

        Ok(Chip8Result::Continue)
    }

    /// Returns true if the sound timer is active, indicating a beep should be played.
    pub fn should_beep(&self) -> bool {
        self.chip8.should_beep()
    }

    /// Set the state of a key on the keypad.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.chip8.set_key(key, pressed)
    }

    /// Get the state of a pixel on the display (true = on, false = off).
    pub fn get_display_pixel(&self, y: usize, x: usize) -> bool {
        self.chip8.get_display_pixel(y, x)
    }

    pub fn chip8_ref(&self) -> &Chip8 {
        &self.chip8
    }

    pub fn chip8_mut(&mut self) -> &mut Chip8 {
        &mut self.chip8
    }
}

/// Seconds per cycle at `hz`. Rates that don't give a positive, finite step
/// would stall or spin the update loop, so they fall back to `default_hz`.
fn time_step(name: &str, hz: f32, default_hz: f32) -> f32 {
    let step = 1.0 / hz;
    if step.is_finite() && step > 0.0 {
        step
    } else {
        warn!("Invalid {name} rate {hz}Hz, using {default_hz}Hz");
        1.0 / default_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Quirks;

    fn runner(program: &[u8], config: Config) -> Chip8Runner {
        let mut chip8 = Chip8::with_config(&config);
        chip8.load(program).unwrap();
        Chip8Runner::with_config(chip8, &config)
    }

    fn test_config() -> Config {
        // Power-of-two rates keep the accumulator arithmetic exact.
        Config {
            cpu_hz: 512.0,
            timer_hz: 64.0,
            ..Config::default()
        }
    }

    #[test]
    fn runs_instructions_proportional_to_elapsed_time() {
        // Each instruction increments V0.
        let program: Vec<u8> = [0x70, 0x01].repeat(64);
        let mut runner = runner(&program, test_config());

        runner.update(1.0 / 16.0).unwrap();

        assert_eq!(runner.chip8_ref().registers().v[0], 32);
    }

    #[test]
    fn ticks_timers_at_timer_rate() {
        let mut runner = runner(&[0x12, 0x00], test_config());
        runner.chip8_mut().timers_mut().set_delay(10);

        runner.update(0.0625).unwrap();

        assert_eq!(runner.chip8_ref().timers().delay(), 6);
    }

    #[test]
    fn display_wait_stops_the_batch() {
        let config = test_config().with_quirks(Quirks::cosmac_vip());
        let mut runner = runner(&[0xD0, 0x01, 0x70, 0x01], config);

        let result = runner.update(1.0).unwrap();

        assert_eq!(result, Chip8Result::WaitForNextFrame);
        assert_eq!(runner.chip8_ref().registers().pc(), 0x202);
    }

    #[test]
    fn key_wait_yields_to_host() {
        let mut runner = runner(&[0xF1, 0x0A], test_config());
        runner.chip8_mut().timers_mut().set_sound(5);

        assert_eq!(runner.update(0.25).unwrap(), Chip8Result::AwaitingKey);
        assert!(runner.chip8_ref().is_awaiting_key());
        assert_eq!(runner.chip8_ref().timers().sound(), 0);
        assert!(!runner.should_beep());

        runner.set_key(u4::new(4), true);
        runner.update(1.0 / 512.0).unwrap();
        runner.set_key(u4::new(4), false);
        runner.update(1.0 / 512.0).unwrap();
        assert_eq!(runner.chip8_ref().registers().v[1], 4);
    }

    #[test]
    fn invalid_rates_fall_back_to_defaults() {
        let program: Vec<u8> = [0x70, 0x01].repeat(128);
        for hz in [-700.0, 0.0, f32::NAN, f32::INFINITY] {
            let config = Config {
                cpu_hz: hz,
                timer_hz: hz,
                ..Config::default()
            };
            let mut runner = runner(&program, config);
            runner.chip8_mut().timers_mut().set_delay(10);

            runner.update(0.1).unwrap();

            // 0.1s at 700Hz and 60Hz
            let executed = runner.chip8_ref().registers().v[0];
            assert!((69..=70).contains(&executed), "{hz}: ran {executed}");
            let delay = runner.chip8_ref().timers().delay();
            assert!((4..=5).contains(&delay), "{hz}: delay {delay}");
        }
    }

    #[test]
    fn propagates_fatal_errors() {
        let mut runner = runner(&[0x00, 0xEE], test_config());
        let err = runner.update(0.1).unwrap_err();
        assert_eq!(err, Chip8Error::StackUnderflow { pc: 0x200 });
    }
}
