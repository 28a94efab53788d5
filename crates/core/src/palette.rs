//! Fixed color palette
//!
//! Position in [`PALETTE`] is the canonical color index. The snapshot encoding
//! writes each index as a single base-`PALETTE_SIZE` digit, so the palette may
//! never grow past 36 entries (`0-9` + `a-z`).

use serde::{Deserialize, Serialize};

/// RGB triple
pub type Rgb = [u8; 3];

/// Number of selectable colors
pub const PALETTE_SIZE: usize = 32;

const _: () = assert!(PALETTE_SIZE >= 2 && PALETTE_SIZE <= 36);

/// Selectable colors, dark to light per hue
pub const PALETTE: [Rgb; PALETTE_SIZE] = [
    [0x6D, 0x00, 0x1A], // 0: Burgundy
    [0xBE, 0x00, 0x39], // 1: Dark red
    [0xFF, 0x45, 0x00], // 2: Red
    [0xFF, 0xA8, 0x00], // 3: Orange
    [0xFF, 0xD6, 0x35], // 4: Yellow
    [0xFF, 0xF8, 0xB8], // 5: Pale yellow
    [0x00, 0xA3, 0x68], // 6: Dark green
    [0x00, 0xCC, 0x78], // 7: Green
    [0x7E, 0xED, 0x56], // 8: Light green
    [0x00, 0x75, 0x6F], // 9: Dark teal
    [0x00, 0x9E, 0xAA], // 10: Teal
    [0x00, 0xCC, 0xC0], // 11: Light teal
    [0x24, 0x50, 0xA4], // 12: Dark blue
    [0x36, 0x90, 0xEA], // 13: Blue
    [0x51, 0xE9, 0xF4], // 14: Light blue
    [0x49, 0x3A, 0xC1], // 15: Indigo
    [0x6A, 0x5C, 0xFF], // 16: Periwinkle
    [0x94, 0xB3, 0xFF], // 17: Lavender
    [0x81, 0x1E, 0x9F], // 18: Dark purple
    [0xB4, 0x4A, 0xC0], // 19: Purple
    [0xE4, 0xAB, 0xFF], // 20: Pale purple
    [0xDE, 0x10, 0x7F], // 21: Magenta
    [0xFF, 0x38, 0x81], // 22: Pink
    [0xFF, 0x99, 0xAA], // 23: Light pink
    [0x6D, 0x48, 0x2F], // 24: Dark brown
    [0x9C, 0x69, 0x26], // 25: Brown
    [0xFF, 0xB4, 0x70], // 26: Beige
    [0x00, 0x00, 0x00], // 27: Black
    [0x51, 0x52, 0x52], // 28: Dark gray
    [0x89, 0x8D, 0x90], // 29: Gray
    [0xD4, 0xD7, 0xD9], // 30: Light gray
    [0xFF, 0xFF, 0xFF], // 31: White
];

/// Valid index into [`PALETTE`]
///
/// Can only be constructed through [`ColorIndex::new`], so holding one is
/// proof the index is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct ColorIndex(u8);

impl ColorIndex {
    /// Validate a raw index against the palette size
    pub fn new(index: i64) -> Option<Self> {
        if (0..PALETTE_SIZE as i64).contains(&index) {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Wrap a value read back from the board store, which only ever holds
    /// validated indices
    pub(crate) fn from_stored(raw: u8) -> Self {
        debug_assert!((raw as usize) < PALETTE_SIZE);
        Self(raw)
    }

    /// Raw index value
    pub fn get(self) -> u8 {
        self.0
    }

    /// RGB value of this color
    pub fn rgb(self) -> Rgb {
        PALETTE[self.0 as usize]
    }

    /// Single base-`PALETTE_SIZE` digit (`0-9`, then `a-z`)
    pub fn to_digit(self) -> char {
        // In range by construction, and PALETTE_SIZE <= 36
        char::from_digit(self.0 as u32, PALETTE_SIZE as u32).unwrap_or('?')
    }
}

impl TryFrom<i64> for ColorIndex {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("color {} outside palette", value))
    }
}

impl From<ColorIndex> for u8 {
    fn from(color: ColorIndex) -> Self {
        color.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_range() {
        assert!(ColorIndex::new(0).is_some());
        assert!(ColorIndex::new(PALETTE_SIZE as i64 - 1).is_some());
        assert!(ColorIndex::new(PALETTE_SIZE as i64).is_none());
        assert!(ColorIndex::new(-1).is_none());
    }

    #[test]
    fn test_digits() {
        let digit = |i| ColorIndex::new(i).unwrap().to_digit();
        assert_eq!(digit(0), '0');
        assert_eq!(digit(9), '9');
        assert_eq!(digit(10), 'a');
        assert_eq!(digit(31), 'v');
    }

    #[test]
    fn test_rgb_lookup() {
        assert_eq!(ColorIndex::new(27).unwrap().rgb(), [0, 0, 0]);
        assert_eq!(ColorIndex::new(31).unwrap().rgb(), [0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        let color: ColorIndex = serde_json::from_str("5").unwrap();
        assert_eq!(color.get(), 5);
        assert_eq!(serde_json::to_string(&color).unwrap(), "5");
        assert!(serde_json::from_str::<ColorIndex>("32").is_err());
    }
}
