//! Greedy line wrapping against real font metrics.
//!
//! Invoice content is short prose (addresses, item descriptions), so a
//! greedy first-fit wrapper is enough; there is no hyphenation and no
//! paragraph-level optimization. Explicit newlines always force a break.

use crate::font::{FontContext, FontWeight};

/// Wrap `text` into lines no wider than `max_width` logical units.
///
/// Words that exceed the full width on their own are split by character so
/// a pathological token cannot push outside the fixed page box. Always
/// returns at least one (possibly empty) line.
pub fn wrap_text(
    text: &str,
    max_width: f64,
    fonts: &FontContext,
    weight: FontWeight,
    font_size: f64,
    letter_spacing: f64,
) -> Vec<String> {
    let measure = |s: &str| fonts.measure_string(s, weight, font_size, letter_spacing);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if measure(&candidate) <= max_width || current.is_empty() {
                if measure(word) > max_width && current.is_empty() {
                    // Oversized token: hard-break by character.
                    for piece in split_oversized(word, max_width, &measure) {
                        lines.push(piece);
                    }
                    current = lines.pop().unwrap_or_default();
                } else {
                    current = candidate;
                }
            } else {
                lines.push(std::mem::take(&mut current));
                if measure(word) > max_width {
                    for piece in split_oversized(word, max_width, &measure) {
                        lines.push(piece);
                    }
                    current = lines.pop().unwrap_or_default();
                } else {
                    current = word.to_string();
                }
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn split_oversized(word: &str, max_width: f64, measure: &dyn Fn(&str) -> f64) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        if !current.is_empty() && measure(&candidate) > max_width {
            pieces.push(std::mem::take(&mut current));
            current.push(ch);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() || pieces.is_empty() {
        pieces.push(current);
    }
    pieces
}
