//! RGB565 to 32-bit ARGB color conversion.

/// Convert a 16-bit RGB565 value to 0xAARRGGBB with opaque alpha.
///
/// Channels are expanded by bit replication, so full-scale 5- and 6-bit
/// values map to 0xFF rather than 0xF8/0xFC.
pub fn rgb565_to_argb(value: u16) -> u32 {
    let r5 = u32::from(value >> 11) & 0x1F;
    let g6 = u32::from(value >> 5) & 0x3F;
    let b5 = u32::from(value) & 0x1F;
    let r8 = (r5 << 3) | (r5 >> 2);
    let g8 = (g6 << 2) | (g6 >> 4);
    let b8 = (b5 << 3) | (b5 >> 2);
    0xFF00_0000 | (r8 << 16) | (g8 << 8) | b8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primaries_expand_to_full_scale() {
        assert_eq!(rgb565_to_argb(0xF800), 0xFFFF0000); // red
        assert_eq!(rgb565_to_argb(0x07E0), 0xFF00FF00); // green
        assert_eq!(rgb565_to_argb(0x001F), 0xFF0000FF); // blue
    }

    #[test]
    fn test_black_and_white() {
        assert_eq!(rgb565_to_argb(0x0000), 0xFF000000);
        assert_eq!(rgb565_to_argb(0xFFFF), 0xFFFFFFFF);
    }

    #[test]
    fn test_bit_replication() {
        // R5 = 0b10000 → 0b10000100 = 0x84
        assert_eq!(rgb565_to_argb(0x8000), 0xFF840000);
        // G6 = 0b100000 → 0b10000010 = 0x82
        assert_eq!(rgb565_to_argb(0x0400), 0xFF008200);
    }
}
