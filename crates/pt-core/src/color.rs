// ABOUTME: Colour representation for terminal sessions.
// ABOUTME: Defines the 22-entry session palette (defaults, cursor, ANSI normal/bold).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Number of entries in a session palette
pub const PALETTE_LEN: usize = 22;

/// Session colour table.
///
/// Layout: default foreground, default bold foreground, default background,
/// default bold background, cursor text, cursor colour, then the eight ANSI
/// colours (black, red, green, yellow, blue, magenta, cyan, white), each as a
/// normal/bold pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub colours: [Rgb; PALETTE_LEN],
}

impl Palette {
    const ANSI_BASE: usize = 6;

    pub fn foreground(&self, bold: bool) -> Rgb {
        self.colours[bold as usize]
    }

    pub fn background(&self, bold: bool) -> Rgb {
        self.colours[2 + bold as usize]
    }

    pub fn cursor(&self) -> Rgb {
        self.colours[5]
    }

    /// ANSI colour 0-7, optionally the bold variant. Indices 8-15 map to bold.
    pub fn ansi(&self, index: u8, bold: bool) -> Rgb {
        let (base, bold) = if index >= 8 {
            (index - 8, true)
        } else {
            (index, bold)
        };
        let base = (base as usize).min(7);
        self.colours[Self::ANSI_BASE + base * 2 + bold as usize]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colours: [
                Rgb::new(187, 187, 187),
                Rgb::new(255, 255, 255),
                Rgb::new(0, 0, 0),
                Rgb::new(85, 85, 85),
                Rgb::new(0, 0, 0),
                Rgb::new(0, 255, 0),
                // ANSI black
                Rgb::new(0, 0, 0),
                Rgb::new(85, 85, 85),
                // red
                Rgb::new(187, 0, 0),
                Rgb::new(255, 85, 85),
                // green
                Rgb::new(0, 187, 0),
                Rgb::new(85, 255, 85),
                // yellow
                Rgb::new(187, 187, 0),
                Rgb::new(255, 255, 85),
                // blue
                Rgb::new(0, 0, 187),
                Rgb::new(85, 85, 255),
                // magenta
                Rgb::new(187, 0, 187),
                Rgb::new(255, 85, 255),
                // cyan
                Rgb::new(0, 187, 187),
                Rgb::new(85, 255, 255),
                // white
                Rgb::new(187, 187, 187),
                Rgb::new(255, 255, 255),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_has_expected_anchors() {
        let palette = Palette::default();
        assert_eq!(palette.foreground(false), Rgb::new(187, 187, 187));
        assert_eq!(palette.background(false), Rgb::new(0, 0, 0));
        assert_eq!(palette.cursor(), Rgb::new(0, 255, 0));
    }

    #[test]
    fn ansi_lookup_handles_bright_indices() {
        let palette = Palette::default();
        assert_eq!(palette.ansi(1, false), Rgb::new(187, 0, 0));
        assert_eq!(palette.ansi(1, true), Rgb::new(255, 85, 85));
        assert_eq!(palette.ansi(9, false), Rgb::new(255, 85, 85));
        assert_eq!(palette.ansi(15, false), Rgb::new(255, 255, 255));
    }
}
