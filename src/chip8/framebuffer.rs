use super::{DISPLAY_X, DISPLAY_Y, Display};

/// 64x32 monochrome display with XOR sprite drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Display<bool>,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: [[false; DISPLAY_X]; DISPLAY_Y],
        }
    }

    pub fn clear(&mut self) {
        self.pixels = [[false; DISPLAY_X]; DISPLAY_Y];
    }

    /// XORs an 8-pixel-wide sprite onto the display at (`x`, `y`), wrapping at every edge.
    ///
    /// Returns true if any lit pixel was turned off.
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        self.blit(x, y, sprite, true)
    }

    /// Like `draw_sprite`, but pixels past the right or bottom edge are dropped.
    /// The starting coordinate still wraps.
    pub fn draw_sprite_clipped(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        self.blit(x, y, sprite, false)
    }

    fn blit(&mut self, x: usize, y: usize, sprite: &[u8], wrap: bool) -> bool {
        let x_pos = x % DISPLAY_X;
        let y_pos = y % DISPLAY_Y;

        let mut any_erased = false;
        for (row, &sprite_byte) in sprite.iter().enumerate() {
            let py = y_pos + row;
            if !wrap && py >= DISPLAY_Y {
                break;
            }

            for col in 0..8 {
                // If current sprite bit is non-zero
                if (sprite_byte & (0x80 >> col)) == 0 {
                    continue;
                }

                let px = x_pos + col;
                if !wrap && px >= DISPLAY_X {
                    break;
                }

                let pixel = &mut self.pixels[py % DISPLAY_Y][px % DISPLAY_X];
                any_erased |= *pixel;
                *pixel ^= true;
            }
        }

        any_erased
    }

    /// Reads a pixel; coordinates are taken modulo the display size.
    pub fn pixel_at(&self, x: usize, y: usize) -> bool {
        self.pixels[y % DISPLAY_Y][x % DISPLAY_X]
    }

    /// Row-major view of the whole display for renderers.
    pub fn rows(&self) -> &Display<bool> {
        &self.pixels
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().flatten().filter(|&&p| p).count()
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_sprite_bits_left_to_right() {
        let mut fb = Framebuffer::new();
        let collided = fb.draw_sprite(2, 3, &[0b1010_0001]);
        assert!(!collided);
        assert!(fb.pixel_at(2, 3));
        assert!(!fb.pixel_at(3, 3));
        assert!(fb.pixel_at(4, 3));
        assert!(fb.pixel_at(9, 3));
        assert_eq!(fb.lit_count(), 3);
    }

    #[test]
    fn drawing_twice_restores_and_reports_collision() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(10, 10, &[0xFF, 0x81]);
        let before_second = fb.clone();
        assert!(fb.draw_sprite(10, 10, &[0xFF, 0x81]));
        assert_eq!(fb, Framebuffer::new());
        assert_ne!(fb, before_second);
    }

    #[test]
    fn wraps_columns_and_rows() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(60, 31, &[0xFF, 0xFF]);
        for x in (60..64).chain(0..4) {
            assert!(fb.pixel_at(x, 31), "row 31 col {x}");
            assert!(fb.pixel_at(x, 0), "row 0 col {x}");
        }
        assert!(!fb.pixel_at(4, 31));
        assert!(!fb.pixel_at(59, 0));
        assert_eq!(fb.lit_count(), 16);
    }

    #[test]
    fn clipped_draw_drops_overflow() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite_clipped(60, 31, &[0xFF, 0xFF]);
        assert_eq!(fb.lit_count(), 4);
        assert!(!fb.pixel_at(0, 31));
        assert!(!fb.pixel_at(60, 0));
    }

    #[test]
    fn start_coordinates_are_taken_modulo() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(64 + 5, 32 + 1, &[0x80]);
        assert!(fb.pixel_at(5, 1));
        assert!(fb.pixel_at(69, 33));
    }

    #[test]
    fn collision_only_when_lit_pixel_turns_off() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(0, 0, &[0xF0]);
        assert!(!fb.draw_sprite(4, 0, &[0xF0]));
        assert!(fb.draw_sprite(3, 0, &[0x80]));
        assert!(!fb.pixel_at(3, 0));
    }

    #[test]
    fn clear_zeroes_everything() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(0, 0, &[0xFF; 15]);
        fb.clear();
        assert_eq!(fb.lit_count(), 0);
    }
}
