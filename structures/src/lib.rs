use chrono::NaiveDateTime;
use image::Rgba;

/// One pixel placement from the canvas history.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Event {
    pub x: u32,
    pub y: u32,
    pub color_index: u8,
    pub placed_at: NaiveDateTime,
}

impl Event {
    pub fn new(x: u32, y: u32, color_index: u8, placed_at: NaiveDateTime) -> Self {
        Self {
            x,
            y,
            color_index,
            placed_at,
        }
    }
}

/// The 16 colours of the 2017 canvas, in color index order.
pub const REFERENCE_PALETTE: [u32; 16] = [
    0xFFFFFF, // 0
    0xE4E4E4, // 1
    0x888888, // 2
    0x222222, // 3
    0xFFA7D1, // 4
    0xE50000, // 5
    0xE59500, // 6
    0xA06A42, // 7
    0xE5D900, // 8
    0x94E044, // 9
    0x02BE01, // 10
    0x00E5F0, // 11
    0x0083C7, // 12
    0x0000EA, // 13
    0xE04AFF, // 14
    0x820080, // 15
];

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Palette {
    colors: Vec<Rgba<u8>>,
}

impl Palette {
    /// Builds a palette from 24-bit `0xRRGGBB` values. Every entry is fully opaque.
    pub fn from_hex(values: &[u32]) -> Self {
        let colors = values
            .iter()
            .map(|hex| {
                Rgba([
                    (hex >> 16) as u8,
                    (hex >> 8) as u8,
                    *hex as u8,
                    0xff,
                ])
            })
            .collect();

        Self { colors }
    }

    pub fn get(&self, color_index: usize) -> Option<Rgba<u8>> {
        self.colors.get(color_index).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_hex(&REFERENCE_PALETTE)
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub palette: Palette,
    /// Number of frames to aim for, excluding the terminal frame.
    pub frame_budget: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            palette: Palette::default(),
            frame_budget: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_palette_is_opaque_and_ordered() {
        let palette = Palette::default();

        assert_eq!(palette.len(), 16);
        assert_eq!(palette.get(0), Some(Rgba([0xff, 0xff, 0xff, 0xff])));
        assert_eq!(palette.get(5), Some(Rgba([0xe5, 0x00, 0x00, 0xff])));
        assert_eq!(palette.get(15), Some(Rgba([0x82, 0x00, 0x80, 0xff])));
        assert_eq!(palette.get(16), None);
    }

    #[test]
    fn reference_palette_entries_are_distinct() {
        let palette = Palette::default();

        for a in 0..palette.len() {
            for b in (a + 1)..palette.len() {
                assert_ne!(palette.get(a), palette.get(b), "{} and {} collide", a, b);
            }
        }
    }
}
