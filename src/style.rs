//! # Style System
//!
//! A deliberately small CSS-like style model: the box, flex, and typography
//! properties a fixed single-page invoice actually needs, and nothing more.
//! Unset properties inherit (typography) or default (box/flex) during
//! resolution, exactly once per node, before layout.

/// Style properties for a node. All fields optional; `None` means
/// inherit-or-default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    // ── Box model ───────────────────────────────────────────────
    /// Explicit width: absolute units or a fraction of the parent's
    /// content width.
    pub width: Option<Dimension>,
    /// Explicit height in logical units.
    pub height: Option<f64>,
    pub padding: Option<Edges>,

    // ── Flex ────────────────────────────────────────────────────
    pub direction: Option<FlexDirection>,
    /// Main-axis distribution for rows.
    pub justify: Option<Justify>,
    /// Cross-axis placement of narrower children in a column.
    pub align_items: Option<AlignItems>,
    /// Gap between children along the main axis.
    pub gap: Option<f64>,
    /// Share of leftover column height this node absorbs.
    pub grow: Option<f64>,

    // ── Typography (inherited) ──────────────────────────────────
    pub font_size: Option<f64>,
    pub bold: Option<bool>,
    pub color: Option<Color>,
    /// Line height as a multiplier of font size.
    pub line_height: Option<f64>,
    pub text_align: Option<TextAlign>,
    pub letter_spacing: Option<f64>,
    pub uppercase: Option<bool>,

    // ── Visual ──────────────────────────────────────────────────
    pub background: Option<Color>,
    pub border_top: Option<Border>,
    pub border_bottom: Option<Border>,
    /// Full outline box (the empty-signature placeholder).
    pub border: Option<Border>,
}

/// A width that is absolute or relative to the parent content width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    /// Logical units.
    Px(f64),
    /// Fraction of the parent's content width (0.0–1.0).
    Fraction(f64),
}

impl Dimension {
    pub fn resolve(&self, available_width: f64) -> f64 {
        match self {
            Dimension::Px(v) => *v,
            Dimension::Fraction(f) => available_width * f,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlexDirection {
    #[default]
    Column,
    Row,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Justify {
    #[default]
    Start,
    SpaceBetween,
    End,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlignItems {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A border stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    pub width: f64,
    pub color: Color,
    pub dashed: bool,
}

impl Border {
    pub fn solid(width: f64, color: Color) -> Self {
        Self {
            width,
            color,
            dashed: false,
        }
    }

    pub fn dashed(width: f64, color: Color) -> Self {
        Self {
            width,
            color,
            dashed: true,
        }
    }
}

/// An RGBA color, components 0.0–1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#rgb` or `#rrggbb`. Malformed input yields black.
    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).unwrap_or(0);
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                (r, g, b)
            }
            _ => (0, 0, 0),
        };
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Edge values for padding.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn vertical_only(v: f64) -> Self {
        Self {
            top: v,
            bottom: v,
            ..Self::default()
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Fully resolved style the layout engine works with: typography inherited
/// from the parent, everything else concrete.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub width: Option<Dimension>,
    pub height: Option<f64>,
    pub padding: Edges,
    pub direction: FlexDirection,
    pub justify: Justify,
    pub align_items: AlignItems,
    pub gap: f64,
    pub grow: f64,
    pub font_size: f64,
    pub bold: bool,
    pub color: Color,
    pub line_height: f64,
    pub text_align: TextAlign,
    pub letter_spacing: f64,
    pub uppercase: bool,
    pub background: Option<Color>,
    pub border_top: Option<Border>,
    pub border_bottom: Option<Border>,
    pub border: Option<Border>,
}

impl Style {
    /// Resolve against the parent's resolved style.
    pub fn resolve(&self, parent: Option<&ResolvedStyle>) -> ResolvedStyle {
        ResolvedStyle {
            width: self.width,
            height: self.height,
            padding: self.padding.unwrap_or_default(),
            direction: self.direction.unwrap_or_default(),
            justify: self.justify.unwrap_or_default(),
            align_items: self.align_items.unwrap_or_default(),
            gap: self.gap.unwrap_or(0.0),
            grow: self.grow.unwrap_or(0.0),
            font_size: self
                .font_size
                .unwrap_or_else(|| parent.map(|p| p.font_size).unwrap_or(14.0)),
            bold: self
                .bold
                .unwrap_or_else(|| parent.map(|p| p.bold).unwrap_or(false)),
            color: self
                .color
                .unwrap_or_else(|| parent.map(|p| p.color).unwrap_or(Color::BLACK)),
            line_height: self
                .line_height
                .unwrap_or_else(|| parent.map(|p| p.line_height).unwrap_or(1.4)),
            text_align: self
                .text_align
                .unwrap_or_else(|| parent.map(|p| p.text_align).unwrap_or_default()),
            letter_spacing: self.letter_spacing.unwrap_or(0.0),
            uppercase: self
                .uppercase
                .unwrap_or_else(|| parent.map(|p| p.uppercase).unwrap_or(false)),
            background: self.background,
            border_top: self.border_top,
            border_bottom: self.border_bottom,
            border: self.border,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typography_inherits() {
        let parent = Style {
            font_size: Some(10.0),
            bold: Some(true),
            text_align: Some(TextAlign::Right),
            ..Style::default()
        }
        .resolve(None);

        let child = Style::default().resolve(Some(&parent));
        assert_eq!(child.font_size, 10.0);
        assert!(child.bold);
        assert_eq!(child.text_align, TextAlign::Right);
    }

    #[test]
    fn test_box_properties_do_not_inherit() {
        let parent = Style {
            padding: Some(Edges::uniform(8.0)),
            gap: Some(4.0),
            ..Style::default()
        }
        .resolve(None);

        let child = Style::default().resolve(Some(&parent));
        assert_eq!(child.padding, Edges::default());
        assert_eq!(child.gap, 0.0);
    }

    #[test]
    fn test_dimension_resolution() {
        assert_eq!(Dimension::Px(120.0).resolve(700.0), 120.0);
        assert!((Dimension::Fraction(0.5).resolve(700.0) - 350.0).abs() < 1e-9);
    }

    #[test]
    fn test_hex_parsing() {
        let c = Color::hex("#2563eb");
        assert!((c.r - 37.0 / 255.0).abs() < 1e-9);
        assert!((c.g - 99.0 / 255.0).abs() < 1e-9);
        assert!((c.b - 235.0 / 255.0).abs() < 1e-9);
        assert_eq!(Color::hex("oops"), Color::BLACK);
    }
}
