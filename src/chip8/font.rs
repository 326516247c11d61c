/// Height in bytes of one hexadecimal glyph.
pub const FONT_GLYPH_HEIGHT: usize = 5;

pub const FONT_START_ADDRESS: usize = 0x50;
pub const FONT_END_ADDRESS: usize = FONT_START_ADDRESS + FONT.len();

/// Built-in 4x5 sprites for the hexadecimal digits 0-F.
pub const FONT: [u8; 16 * FONT_GLYPH_HEIGHT] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Memory address of the glyph for the low nibble of `digit`.
pub fn glyph_address(digit: u8) -> u16 {
    (FONT_START_ADDRESS + usize::from(digit & 0x0F) * FONT_GLYPH_HEIGHT) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs_are_contiguous() {
        assert_eq!(glyph_address(0x0), 0x50);
        assert_eq!(glyph_address(0xF), 0x50 + 15 * 5);
        assert_eq!(FONT_END_ADDRESS, 0xA0);
    }

    #[test]
    fn only_low_nibble_selects_glyph() {
        assert_eq!(glyph_address(0x3A), glyph_address(0x0A));
    }
}
