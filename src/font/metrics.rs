//! AFM advance widths for the built-in fonts, in 1/1000 em units.
//!
//! These are the standard Adobe metrics for Helvetica and Helvetica-Bold,
//! covering printable ASCII (32..=126). Characters outside the table fall
//! back to a default advance, which keeps measurement total for inputs like
//! the rupee glyph without pretending to know its exact width.

/// Width tables for one standard font.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    widths: &'static [u16; 95],
    default_width: u16,
}

/// Fraction of the em above the baseline used when positioning text lines.
pub const ASCENT_RATIO: f64 = 0.8;

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278,
    584, 584, 584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278,
    500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333,
    584, 584, 584, 611, 975, 722, 722, 722, 722, 667, 611, 778, 722, 278,
    556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556,
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    widths: &HELVETICA_WIDTHS,
    default_width: 556,
};

pub static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    widths: &HELVETICA_BOLD_WIDTHS,
    default_width: 556,
};

impl StandardFontMetrics {
    /// Advance width of a character at the given size, in logical units.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let units = match (ch as u32).checked_sub(32) {
            Some(index) if index < 95 => self.widths[index as usize],
            _ => self.default_width,
        };
        (units as f64 / 1000.0) * font_size
    }

    /// Width of a string at the given size, including letter spacing.
    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size) + letter_spacing)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_width() {
        let w = HELVETICA.char_width(' ', 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_bold_wider() {
        assert!(HELVETICA_BOLD.char_width('A', 12.0) > HELVETICA.char_width('A', 12.0));
    }

    #[test]
    fn test_non_ascii_uses_default() {
        let w = HELVETICA.char_width('₹', 10.0);
        assert!((w - 5.56).abs() < 0.001);
    }

    #[test]
    fn test_letter_spacing_accumulates() {
        let plain = HELVETICA.measure_string("ab", 10.0, 0.0);
        let spaced = HELVETICA.measure_string("ab", 10.0, 1.5);
        assert!((spaced - plain - 3.0).abs() < 0.001);
    }
}
