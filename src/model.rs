//! # Document Tree Model
//!
//! The intermediate representation between the invoice template and the
//! layout engine: a tree of containers, text, and images, each carrying a
//! style. The tree is sized against one canonical page box — there is no
//! infinite canvas and no pagination; the page *is* the layout unit.

use crate::style::Style;

/// Canonical page width in logical units (A4 at 96 DPI).
pub const PAGE_WIDTH: f64 = 794.0;
/// Canonical page height in logical units (A4 at 96 DPI).
pub const PAGE_HEIGHT: f64 = 1123.0;
/// Inner content padding of the invoice page.
pub const PAGE_PADDING: f64 = 48.0;

/// Physical page width for the exported artifact, in millimetres.
pub const PAGE_WIDTH_MM: f64 = 210.0;
/// Physical page height for the exported artifact, in millimetres.
pub const PAGE_HEIGHT_MM: f64 = 297.0;

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub style: Style,
    pub children: Vec<Node>,
}

/// The kinds of nodes the invoice layout uses.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A generic container. Stacks children vertically by default, or in a
    /// row when the style says so.
    View,
    /// A text node; wraps against its available width.
    Text { content: String },
    /// An image placed in a fixed box (the signature). The source stays a
    /// string here; decoding happens in the export rasterizer.
    Image { src: String },
}

impl Node {
    pub fn view(style: Style, children: Vec<Node>) -> Self {
        Self {
            kind: NodeKind::View,
            style,
            children,
        }
    }

    pub fn text(content: impl Into<String>, style: Style) -> Self {
        Self {
            kind: NodeKind::Text {
                content: content.into(),
            },
            style,
            children: vec![],
        }
    }

    pub fn image(src: impl Into<String>, style: Style) -> Self {
        Self {
            kind: NodeKind::Image { src: src.into() },
            style,
            children: vec![],
        }
    }

    /// An invisible flexible spacer: absorbs leftover column height so the
    /// content after it sits against the bottom of the page.
    pub fn spacer() -> Self {
        Self::view(
            Style {
                grow: Some(1.0),
                ..Style::default()
            },
            vec![],
        )
    }
}
