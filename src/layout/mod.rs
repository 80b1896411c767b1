//! # Fixed-Box Layout Engine
//!
//! Maps the invoice document tree onto one canonical page box
//! (794×1123 logical units) and produces absolutely positioned elements
//! ready for the preview surface and the export rasterizer.
//!
//! There is no pagination: the page is a hard, fixed frame. Content that
//! would overflow it is neither split nor truncated here — keeping item
//! counts reasonable is the caller's contract, and multi-page output is an
//! explicit non-goal.
//!
//! The algorithm is a single deterministic pass:
//!
//! 1. Resolve each node's style against its parent (typography inherits).
//! 2. Columns stack children top-to-bottom; rows place children
//!    side-by-side with explicit fractional widths or intrinsic widths.
//! 3. Text wraps greedily against real font metrics.
//! 4. A second cheap pass distributes leftover column height to `grow`
//!    spacers, which is how the footer stays bottom-anchored.
//!
//! Given identical input, the output element tree is identical — no clock,
//! no randomness, no environment reads.

use tracing::debug;

use crate::font::{FontContext, FontWeight};
use crate::model::{Node, NodeKind, PAGE_HEIGHT, PAGE_WIDTH};
use crate::style::{
    AlignItems, Border, Color, FlexDirection, Justify, ResolvedStyle, Style, TextAlign,
};
use crate::text::wrap_text;

/// The laid-out page: fixed dimensions plus positioned elements.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutPage {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
}

/// A positioned element. Coordinates are absolute page coordinates
/// (top-left origin), not parent-relative.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
    pub children: Vec<LayoutElement>,
}

/// What to paint for an element.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Pure layout container, nothing visible.
    None,
    /// Background fill and/or borders.
    Rect {
        background: Option<Color>,
        border: Option<Border>,
        border_top: Option<Border>,
        border_bottom: Option<Border>,
    },
    /// Wrapped text lines.
    Text {
        lines: Vec<TextLine>,
        color: Color,
        font_size: f64,
        bold: bool,
        letter_spacing: f64,
        line_height: f64,
    },
    /// The signature image, fitted into the element box at paint time.
    Image { src: String },
}

/// One laid-out line of text, positioned absolutely.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    /// Left edge of the line (alignment already applied).
    pub x: f64,
    /// Top of the line box.
    pub y: f64,
    pub width: f64,
}

pub struct LayoutEngine;

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self
    }

    /// Lay out a document tree into the canonical page box.
    pub fn layout(&self, root: &Node, fonts: &FontContext) -> LaidOutPage {
        let element = self.layout_node(root, None, 0.0, 0.0, PAGE_WIDTH, Some(PAGE_HEIGHT), fonts);
        debug!(
            elements = count_elements(&element),
            "laid out invoice page"
        );
        LaidOutPage {
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            elements: vec![element],
        }
    }

    /// Lay out one node at an assigned position and width. `forced_height`
    /// pins the box height (the page root, explicit heights); otherwise the
    /// node sizes to its content.
    fn layout_node(
        &self,
        node: &Node,
        parent: Option<&ResolvedStyle>,
        x: f64,
        y: f64,
        width: f64,
        forced_height: Option<f64>,
        fonts: &FontContext,
    ) -> LayoutElement {
        let style = node.style.resolve(parent);

        match &node.kind {
            NodeKind::Text { content } => self.layout_text(content, &style, x, y, width, fonts),
            NodeKind::Image { src } => {
                let w = style
                    .width
                    .map(|d| d.resolve(width))
                    .unwrap_or(128.0)
                    .min(width);
                let h = style.height.unwrap_or(48.0);
                LayoutElement {
                    x,
                    y,
                    width: w,
                    height: h,
                    draw: DrawCommand::Image { src: src.clone() },
                    children: vec![],
                }
            }
            NodeKind::View => {
                let forced = style.height.or(forced_height);
                match style.direction {
                    FlexDirection::Column => {
                        self.layout_column(node, &style, x, y, width, forced, fonts)
                    }
                    FlexDirection::Row => self.layout_row(node, &style, x, y, width, forced, fonts),
                }
            }
        }
    }

    fn layout_text(
        &self,
        content: &str,
        style: &ResolvedStyle,
        x: f64,
        y: f64,
        width: f64,
        fonts: &FontContext,
    ) -> LayoutElement {
        let text = if style.uppercase {
            content.to_uppercase()
        } else {
            content.to_string()
        };
        let weight = weight_of(style);
        let content_w = (width - style.padding.horizontal()).max(0.0);
        let content_x = x + style.padding.left;
        let content_y = y + style.padding.top;

        let wrapped = wrap_text(
            &text,
            content_w,
            fonts,
            weight,
            style.font_size,
            style.letter_spacing,
        );
        let advance = style.font_size * style.line_height;

        let lines: Vec<TextLine> = wrapped
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let line_w =
                    fonts.measure_string(line, weight, style.font_size, style.letter_spacing);
                let line_x = match style.text_align {
                    TextAlign::Left => content_x,
                    TextAlign::Center => content_x + (content_w - line_w) / 2.0,
                    TextAlign::Right => content_x + content_w - line_w,
                };
                TextLine {
                    text: line.clone(),
                    x: line_x,
                    y: content_y + i as f64 * advance,
                    width: line_w,
                }
            })
            .collect();

        let height = lines.len() as f64 * advance + style.padding.vertical();
        LayoutElement {
            x,
            y,
            width,
            height,
            draw: DrawCommand::Text {
                lines,
                color: style.color,
                font_size: style.font_size,
                bold: style.bold,
                letter_spacing: style.letter_spacing,
                line_height: style.line_height,
            },
            children: vec![],
        }
    }

    fn layout_column(
        &self,
        node: &Node,
        style: &ResolvedStyle,
        x: f64,
        y: f64,
        width: f64,
        forced_height: Option<f64>,
        fonts: &FontContext,
    ) -> LayoutElement {
        let content_x = x + style.padding.left;
        let content_w = (width - style.padding.horizontal()).max(0.0);
        let mut cursor = y + style.padding.top;

        let mut children = Vec::with_capacity(node.children.len());
        let mut grows: Vec<f64> = Vec::with_capacity(node.children.len());
        for (i, child) in node.children.iter().enumerate() {
            if i > 0 {
                cursor += style.gap;
            }
            let child_style = child.style.resolve(Some(style));
            let child_w = child_style
                .width
                .map(|d| d.resolve(content_w))
                .unwrap_or(content_w)
                .min(content_w);
            let child_x = match style.align_items {
                AlignItems::Start => content_x,
                AlignItems::Center => content_x + (content_w - child_w) / 2.0,
                AlignItems::End => content_x + content_w - child_w,
            };
            let element =
                self.layout_node(child, Some(style), child_x, cursor, child_w, None, fonts);
            cursor += element.height;
            grows.push(child_style.grow);
            children.push(element);
        }

        let natural_height = cursor - y + style.padding.bottom;
        let height = forced_height.unwrap_or(natural_height);

        // Distribute leftover height to grow children, shifting everything
        // below them down. This anchors content after a spacer to the
        // bottom edge.
        let total_grow: f64 = grows.iter().sum();
        let leftover = height - natural_height;
        if total_grow > 0.0 && leftover > 0.0 {
            let mut shift_by = 0.0;
            for (element, grow) in children.iter_mut().zip(&grows) {
                if shift_by > 0.0 {
                    shift_element(element, shift_by);
                }
                if *grow > 0.0 {
                    let extra = leftover * (grow / total_grow);
                    element.height += extra;
                    shift_by += extra;
                }
            }
        }

        LayoutElement {
            x,
            y,
            width,
            height,
            draw: rect_draw(style),
            children,
        }
    }

    fn layout_row(
        &self,
        node: &Node,
        style: &ResolvedStyle,
        x: f64,
        y: f64,
        width: f64,
        forced_height: Option<f64>,
        fonts: &FontContext,
    ) -> LayoutElement {
        let content_x = x + style.padding.left;
        let content_y = y + style.padding.top;
        let content_w = (width - style.padding.horizontal()).max(0.0);

        // Assign widths first: explicit (fractions resolve against the row
        // content width), else intrinsic.
        let widths: Vec<f64> = node
            .children
            .iter()
            .map(|child| {
                let child_style = child.style.resolve(Some(style));
                child_style
                    .width
                    .map(|d| d.resolve(content_w))
                    .unwrap_or_else(|| self.intrinsic_width(child, Some(style), fonts))
                    .min(content_w)
            })
            .collect();

        let total_w: f64 = widths.iter().sum();
        let gaps = style.gap * node.children.len().saturating_sub(1) as f64;
        let (start_x, spacing) = match style.justify {
            Justify::Start => (content_x, style.gap),
            Justify::End => (content_x + content_w - total_w - gaps, style.gap),
            Justify::SpaceBetween => {
                if node.children.len() > 1 {
                    let space =
                        (content_w - total_w).max(0.0) / (node.children.len() - 1) as f64;
                    (content_x, space)
                } else {
                    (content_x, 0.0)
                }
            }
        };

        let mut cursor = start_x;
        let mut children = Vec::with_capacity(node.children.len());
        let mut max_h = 0.0f64;
        for (i, (child, child_w)) in node.children.iter().zip(&widths).enumerate() {
            if i > 0 {
                cursor += spacing;
            }
            let element =
                self.layout_node(child, Some(style), cursor, content_y, *child_w, None, fonts);
            cursor += element.width;
            max_h = max_h.max(element.height);
            children.push(element);
        }

        let height = forced_height.unwrap_or(max_h + style.padding.vertical());
        LayoutElement {
            x,
            y,
            width,
            height,
            draw: rect_draw(style),
            children,
        }
    }

    /// Natural (unconstrained) width of a node, used for row children
    /// without explicit widths.
    fn intrinsic_width(
        &self,
        node: &Node,
        parent: Option<&ResolvedStyle>,
        fonts: &FontContext,
    ) -> f64 {
        let style = node.style.resolve(parent);
        if let Some(d) = style.width {
            return d.resolve(0.0);
        }
        let inner = match &node.kind {
            NodeKind::Text { content } => {
                let text = if style.uppercase {
                    content.to_uppercase()
                } else {
                    content.to_string()
                };
                let weight = weight_of(&style);
                text.split('\n')
                    .map(|line| {
                        fonts.measure_string(line, weight, style.font_size, style.letter_spacing)
                    })
                    .fold(0.0f64, f64::max)
            }
            NodeKind::Image { .. } => 128.0,
            NodeKind::View => match style.direction {
                FlexDirection::Row => {
                    let sum: f64 = node
                        .children
                        .iter()
                        .map(|c| self.intrinsic_width(c, Some(&style), fonts))
                        .sum();
                    sum + style.gap * node.children.len().saturating_sub(1) as f64
                }
                FlexDirection::Column => node
                    .children
                    .iter()
                    .map(|c| self.intrinsic_width(c, Some(&style), fonts))
                    .fold(0.0f64, f64::max),
            },
        };
        inner + style.padding.horizontal()
    }
}

fn weight_of(style: &ResolvedStyle) -> FontWeight {
    if style.bold {
        FontWeight::Bold
    } else {
        FontWeight::Regular
    }
}

fn rect_draw(style: &ResolvedStyle) -> DrawCommand {
    if style.background.is_some()
        || style.border.is_some()
        || style.border_top.is_some()
        || style.border_bottom.is_some()
    {
        DrawCommand::Rect {
            background: style.background,
            border: style.border,
            border_top: style.border_top,
            border_bottom: style.border_bottom,
        }
    } else {
        DrawCommand::None
    }
}

/// Shift an element and its whole subtree (including text lines) down.
fn shift_element(element: &mut LayoutElement, dy: f64) {
    element.y += dy;
    if let DrawCommand::Text { lines, .. } = &mut element.draw {
        for line in lines {
            line.y += dy;
        }
    }
    for child in &mut element.children {
        shift_element(child, dy);
    }
}

fn count_elements(element: &LayoutElement) -> usize {
    1 + element
        .children
        .iter()
        .map(count_elements)
        .sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Dimension, Edges};

    fn engine() -> (LayoutEngine, FontContext) {
        (LayoutEngine::new(), FontContext::new())
    }

    fn text_node(content: &str, size: f64) -> Node {
        Node::text(
            content,
            Style {
                font_size: Some(size),
                ..Style::default()
            },
        )
    }

    #[test]
    fn test_column_stacks_children() {
        let (engine, fonts) = engine();
        let root = Node::view(
            Style {
                gap: Some(10.0),
                ..Style::default()
            },
            vec![text_node("one", 12.0), text_node("two", 12.0)],
        );
        let page = engine.layout(&root, &fonts);
        let children = &page.elements[0].children;
        assert_eq!(children.len(), 2);
        assert!(children[1].y >= children[0].y + children[0].height + 10.0 - 1e-9);
    }

    #[test]
    fn test_row_fractional_widths() {
        let (engine, fonts) = engine();
        let cell = |frac: f64| {
            Node::view(
                Style {
                    width: Some(Dimension::Fraction(frac)),
                    ..Style::default()
                },
                vec![text_node("x", 10.0)],
            )
        };
        let root = Node::view(
            Style::default(),
            vec![Node::view(
                Style {
                    direction: Some(FlexDirection::Row),
                    ..Style::default()
                },
                vec![cell(0.5), cell(0.25), cell(0.25)],
            )],
        );
        let page = engine.layout(&root, &fonts);
        let row = &page.elements[0].children[0];
        assert!((row.children[0].width - PAGE_WIDTH * 0.5).abs() < 1e-6);
        assert!((row.children[1].x - (row.children[0].x + row.children[0].width)).abs() < 1e-6);
    }

    #[test]
    fn test_spacer_anchors_footer_to_bottom() {
        let (engine, fonts) = engine();
        let root = Node::view(
            Style {
                padding: Some(Edges::uniform(48.0)),
                ..Style::default()
            },
            vec![
                text_node("header", 12.0),
                Node::spacer(),
                text_node("footer", 12.0),
            ],
        );
        let page = engine.layout(&root, &fonts);
        let footer = &page.elements[0].children[2];
        let expected_bottom = PAGE_HEIGHT - 48.0;
        assert!((footer.y + footer.height - expected_bottom).abs() < 1e-6);
    }

    #[test]
    fn test_right_aligned_block() {
        let (engine, fonts) = engine();
        let root = Node::view(
            Style {
                align_items: Some(AlignItems::End),
                ..Style::default()
            },
            vec![Node::view(
                Style {
                    width: Some(Dimension::Px(200.0)),
                    ..Style::default()
                },
                vec![text_node("totals", 10.0)],
            )],
        );
        let page = engine.layout(&root, &fonts);
        let block = &page.elements[0].children[0];
        assert!((block.x + block.width - PAGE_WIDTH).abs() < 1e-6);
    }

    #[test]
    fn test_text_right_alignment_positions_line() {
        let (engine, fonts) = engine();
        let root = Node::view(
            Style::default(),
            vec![Node::text(
                "amount",
                Style {
                    font_size: Some(10.0),
                    text_align: Some(TextAlign::Right),
                    ..Style::default()
                },
            )],
        );
        let page = engine.layout(&root, &fonts);
        let text = &page.elements[0].children[0];
        if let DrawCommand::Text { lines, .. } = &text.draw {
            assert!((lines[0].x + lines[0].width - PAGE_WIDTH).abs() < 1e-6);
        } else {
            panic!("expected text draw command");
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let (engine, fonts) = engine();
        let root = Node::view(
            Style {
                gap: Some(4.0),
                ..Style::default()
            },
            vec![
                text_node("alpha beta gamma delta epsilon zeta eta theta", 14.0),
                Node::spacer(),
                text_node("bottom", 10.0),
            ],
        );
        let a = engine.layout(&root, &fonts);
        let b = engine.layout(&root, &fonts);
        assert_eq!(a, b);
    }
}
