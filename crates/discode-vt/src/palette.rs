//! The fixed xterm-256 color table: 16 ANSI base colors, a 6x6x6 cube, and
//! 24 grayscale steps.

const BASE16: [(u8, u8, u8); 16] = [
    (0x00, 0x00, 0x00),
    (0xcd, 0x31, 0x31),
    (0x0d, 0xbc, 0x79),
    (0xe5, 0xe5, 0x10),
    (0x24, 0x72, 0xc8),
    (0xbc, 0x3f, 0xbc),
    (0x11, 0xa8, 0xcd),
    (0xe5, 0xe5, 0xe5),
    (0x66, 0x66, 0x66),
    (0xf1, 0x4c, 0x4c),
    (0x23, 0xd1, 0x8b),
    (0xf5, 0xf5, 0x43),
    (0x3b, 0x8e, 0xea),
    (0xd6, 0x70, 0xd6),
    (0x29, 0xb8, 0xdb),
    (0xff, 0xff, 0xff),
];

const CUBE_STEPS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// Look up color index `i` in the xterm-256 palette. Returns `None` for
/// anything outside `0..=255`.
pub fn xterm256_color(i: u32) -> Option<(u8, u8, u8)> {
    match i {
        0..=15 => Some(BASE16[i as usize]),
        16..=231 => {
            let n = i - 16;
            let r = n / 36;
            let g = (n % 36) / 6;
            let b = n % 6;
            Some((
                CUBE_STEPS[r as usize],
                CUBE_STEPS[g as usize],
                CUBE_STEPS[b as usize],
            ))
        }
        232..=255 => {
            let level = 8 + (i - 232) * 10;
            Some((level as u8, level as u8, level as u8))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base16_round_trips_known_values() {
        assert_eq!(xterm256_color(0), Some((0x00, 0x00, 0x00)));
        assert_eq!(xterm256_color(15), Some((0xff, 0xff, 0xff)));
    }

    #[test]
    fn cube_is_defined_for_every_entry() {
        for i in 16..=231u32 {
            assert!(xterm256_color(i).is_some());
        }
    }

    #[test]
    fn grayscale_ramp_is_monotonic() {
        let first = xterm256_color(232).unwrap().0;
        let last = xterm256_color(255).unwrap().0;
        assert!(last > first);
    }

    #[test]
    fn out_of_range_is_none() {
        assert_eq!(xterm256_color(256), None);
    }
}
