use chip8_vm::{Chip8, Config, DISPLAY_X, DISPLAY_Y, Framebuffer, Timers};
use proptest::prelude::*;

fn load(program: &[u8]) -> Chip8 {
    let mut chip8 = Chip8::with_config(&Config::default().with_seed(0));
    chip8.load(program).unwrap();
    chip8
}

fn sprite() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=15)
}

proptest! {
    #[test]
    fn set_immediate_stores_byte(x in 0u8..16, nn in any::<u8>()) {
        let mut chip8 = load(&[0x60 | x, nn]);
        chip8.step().unwrap();
        prop_assert_eq!(chip8.registers().v[usize::from(x)], nn);
    }

    #[test]
    fn add_immediate_wraps(x in 0u8..15, start in any::<u8>(), nn in any::<u8>()) {
        let mut chip8 = load(&[0x70 | x, nn]);
        chip8.registers_mut().v[usize::from(x)] = start;
        chip8.registers_mut().v[0xF] = 0xAA;
        chip8.step().unwrap();
        prop_assert_eq!(chip8.registers().v[usize::from(x)], start.wrapping_add(nn));
        prop_assert_eq!(chip8.registers().v[0xF], 0xAA);
    }

    #[test]
    fn drawing_twice_is_identity(
        background in sprite(),
        bx in 0usize..DISPLAY_X,
        by in 0usize..DISPLAY_Y,
        bytes in sprite(),
        x in 0usize..256,
        y in 0usize..256,
    ) {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(bx, by, &background);
        let before = fb.clone();

        fb.draw_sprite(x, y, &bytes);
        fb.draw_sprite(x, y, &bytes);

        prop_assert_eq!(fb, before);
    }

    #[test]
    fn collision_iff_lit_pixel_cleared(
        background in sprite(),
        bytes in sprite(),
        x in 0usize..DISPLAY_X,
        y in 0usize..DISPLAY_Y,
    ) {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(x / 2, y / 2, &background);
        let before = fb.clone();

        let collided = fb.draw_sprite(x, y, &bytes);

        let cleared = (0..DISPLAY_Y).any(|py| {
            (0..DISPLAY_X).any(|px| before.pixel_at(px, py) && !fb.pixel_at(px, py))
        });
        prop_assert_eq!(collided, cleared);
    }

    #[test]
    fn draw_instruction_flag_matches_framebuffer(
        vx in any::<u8>(),
        vy in any::<u8>(),
        n in 1u8..16,
    ) {
        // Draw the same font glyph bytes twice at an arbitrary position.
        let mut chip8 = load(&[0xA0, 0x50, 0xD0, 0x10 | n, 0xD0, 0x10 | n]);
        chip8.registers_mut().v[0] = vx;
        chip8.registers_mut().v[1] = vy;

        chip8.step().unwrap();
        chip8.step().unwrap();
        prop_assert_eq!(chip8.registers().v[0xF], 0);
        let lit = chip8.framebuffer().lit_count();

        chip8.step().unwrap();
        prop_assert_eq!(chip8.registers().v[0xF], u8::from(lit > 0));
        prop_assert_eq!(chip8.framebuffer().lit_count(), 0);
    }

    #[test]
    fn call_then_return_is_symmetric(target in 0x150u16..0x7FF) {
        let target = target * 2;
        let mut chip8 = load(&[0x20 | (target >> 8) as u8, target as u8]);
        chip8.memory_mut().write(target, 0x00);
        chip8.memory_mut().write(target + 1, 0xEE);

        chip8.step().unwrap();
        prop_assert_eq!(chip8.registers().pc(), target);
        prop_assert_eq!(chip8.stack().len(), 1);

        chip8.step().unwrap();
        prop_assert_eq!(chip8.registers().pc(), 0x202);
        prop_assert!(chip8.stack().is_empty());
    }

    #[test]
    fn timers_saturate_at_zero(delay in any::<u8>(), sound in any::<u8>(), ticks in 0usize..300) {
        let mut timers = Timers::new();
        timers.set_delay(delay);
        timers.set_sound(sound);
        for _ in 0..ticks {
            timers.tick();
        }
        prop_assert_eq!(usize::from(timers.delay()), usize::from(delay).saturating_sub(ticks));
        prop_assert_eq!(usize::from(timers.sound()), usize::from(sound).saturating_sub(ticks));
    }
}
