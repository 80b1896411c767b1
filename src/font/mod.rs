//! # Font Management
//!
//! Text measurement for layout and glyph sourcing for the export
//! rasterizer.
//!
//! Out of the box the context carries metric tables for Helvetica and
//! Helvetica-Bold, which is enough to lay out the invoice and to measure
//! every string deterministically. For fully drawn glyphs in the exported
//! raster, the host registers a TrueType font (regular and optionally
//! bold); without one, the rasterizer greeks text from these metrics.

pub mod metrics;

pub use metrics::{StandardFontMetrics, ASCENT_RATIO};

use std::collections::HashMap;

use crate::error::PlatenError;

/// The two weights the invoice template uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// A registered font: built-in metric tables, or an embedded TrueType face.
#[derive(Debug, Clone)]
pub enum FontData {
    /// Built-in AFM metrics. Measurable, not outlineable.
    Standard(&'static StandardFontMetrics),
    /// Raw TrueType/OpenType data plus metrics parsed via ttf-parser.
    Custom {
        data: Vec<u8>,
        metrics: CustomFontMetrics,
    },
}

/// Metrics parsed from a TrueType face.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    advance_widths: HashMap<char, u16>,
    default_advance: u16,
}

impl CustomFontMetrics {
    /// Parse metrics from font data. Samples the Basic Multilingual Plane
    /// up through the currency block, which covers invoice content
    /// including the rupee sign.
    pub fn from_font_data(data: &[u8]) -> Result<Self, PlatenError> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| PlatenError::Font(format!("failed to parse font: {e}")))?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;
        for code in 32u32..=0x20FF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }
        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Ok(Self {
            units_per_em,
            advance_widths,
            default_advance,
        })
    }

    /// Advance width of a character in logical units.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let units = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (units as f64 / self.units_per_em as f64) * font_size
    }
}

/// Shared font context used by layout and the export rasterizer.
pub struct FontContext {
    regular: FontData,
    bold: FontData,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    /// A context backed by the built-in Helvetica metric tables.
    pub fn new() -> Self {
        Self {
            regular: FontData::Standard(&metrics::HELVETICA),
            bold: FontData::Standard(&metrics::HELVETICA_BOLD),
        }
    }

    /// Register a TrueType face for one weight. Replaces the built-in
    /// metrics for that weight; measurement and export glyphs both use it.
    pub fn register(&mut self, weight: FontWeight, data: Vec<u8>) -> Result<(), PlatenError> {
        let metrics = CustomFontMetrics::from_font_data(&data)?;
        let slot = match weight {
            FontWeight::Regular => &mut self.regular,
            FontWeight::Bold => &mut self.bold,
        };
        *slot = FontData::Custom { data, metrics };
        Ok(())
    }

    pub fn resolve(&self, weight: FontWeight) -> &FontData {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }

    /// Advance width of a single character in logical units.
    pub fn char_width(&self, ch: char, weight: FontWeight, font_size: f64) -> f64 {
        match self.resolve(weight) {
            FontData::Standard(std) => std.char_width(ch, font_size),
            FontData::Custom { metrics, .. } => metrics.char_width(ch, font_size),
        }
    }

    /// Width of a string in logical units, including letter spacing.
    pub fn measure_string(
        &self,
        text: &str,
        weight: FontWeight,
        font_size: f64,
        letter_spacing: f64,
    ) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, weight, font_size) + letter_spacing)
            .sum()
    }

    /// Raw TrueType bytes for a weight, when a custom face is registered.
    /// The rasterizer parses these into a face to outline glyphs.
    pub fn face_data(&self, weight: FontWeight) -> Option<&[u8]> {
        match self.resolve(weight) {
            FontData::Custom { data, .. } => Some(data.as_slice()),
            FontData::Standard(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context_measures() {
        let ctx = FontContext::new();
        let w = ctx.measure_string("Hello", FontWeight::Regular, 12.0, 0.0);
        assert!(w > 0.0);
    }

    #[test]
    fn test_bold_weight_resolves_bold_table() {
        let ctx = FontContext::new();
        let regular = ctx.char_width('A', FontWeight::Regular, 12.0);
        let bold = ctx.char_width('A', FontWeight::Bold, 12.0);
        assert!(bold > regular);
    }

    #[test]
    fn test_no_face_data_for_standard_fonts() {
        let ctx = FontContext::new();
        assert!(ctx.face_data(FontWeight::Regular).is_none());
    }

    #[test]
    fn test_register_rejects_garbage() {
        let mut ctx = FontContext::new();
        let err = ctx.register(FontWeight::Regular, vec![0, 1, 2, 3]);
        assert!(matches!(err, Err(PlatenError::Font(_))));
    }
}
