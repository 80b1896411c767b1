//! # Invoice Template
//!
//! Builds the document tree for one invoice from an [`InvoiceDocument`]
//! snapshot and the [`ComputedTotals`] derived from that same snapshot.
//! This is a pure mapping: the only date that appears is the document's own
//! issue date, so identical inputs always produce an identical tree.
//!
//! Block order, top to bottom: header (title, number badge, issue date),
//! the two-column party block, the line-item table, a flexible spacer, the
//! right-aligned totals block, and the footer strip (bank details,
//! signature, branding). The spacer keeps the footer pressed against the
//! bottom of the fixed page box.

use crate::invoice::{DiscountType, InvoiceDocument, LineItem, Party};
use crate::model::{Node, NodeKind, PAGE_HEIGHT, PAGE_PADDING};
use crate::style::{
    AlignItems, Border, Color, Dimension, Edges, FlexDirection, Justify, Style, TextAlign,
};
use crate::totals::{currency_symbol, format_amount, ComputedTotals};

/// Accent color presets for the rendered document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Blue,
    Black,
    Purple,
}

impl Theme {
    pub fn accent(&self) -> Color {
        match self {
            Theme::Blue => Color::hex("#2563eb"),
            Theme::Black => Color::hex("#18181b"),
            Theme::Purple => Color::hex("#9333ea"),
        }
    }
}

// The neutral palette used throughout the page.
fn ink() -> Color {
    Color::hex("#0f172a")
}
fn muted() -> Color {
    Color::hex("#64748b")
}
fn faint() -> Color {
    Color::hex("#94a3b8")
}
fn whisper() -> Color {
    Color::hex("#cbd5e1")
}
fn panel() -> Color {
    Color::hex("#f8fafc")
}
fn hairline() -> Color {
    Color::hex("#f1f5f9")
}
fn rule() -> Color {
    Color::hex("#e2e8f0")
}
fn positive() -> Color {
    Color::hex("#16a34a")
}
fn negative() -> Color {
    Color::hex("#ef4444")
}

/// Table column fractions: description, qty, rate, amount.
const COLUMNS: [f64; 4] = [0.50, 0.15, 0.15, 0.20];

/// Build the full invoice document tree.
pub fn build_invoice_tree(
    doc: &InvoiceDocument,
    totals: &ComputedTotals,
    theme: Theme,
) -> Node {
    Node::view(
        Style {
            height: Some(PAGE_HEIGHT),
            padding: Some(Edges::uniform(PAGE_PADDING)),
            background: Some(Color::WHITE),
            font_size: Some(14.0),
            color: Some(ink()),
            line_height: Some(1.4),
            ..Style::default()
        },
        vec![
            header(doc, theme),
            parties(doc),
            item_table(doc),
            Node::spacer(),
            totals_block(doc, totals, theme),
            footer(doc),
            branding(),
        ],
    )
}

fn label(text: &str) -> Node {
    Node::text(
        text,
        Style {
            font_size: Some(10.0),
            bold: Some(true),
            color: Some(faint()),
            uppercase: Some(true),
            letter_spacing: Some(1.5),
            ..Style::default()
        },
    )
}

fn header(doc: &InvoiceDocument, theme: Theme) -> Node {
    let number = if doc.invoice_number.is_empty() {
        "DRAFT".to_string()
    } else {
        doc.invoice_number.clone()
    };

    let title_block = Node::view(
        Style {
            gap: Some(4.0),
            ..Style::default()
        },
        vec![
            Node::text(
                "INVOICE",
                Style {
                    font_size: Some(48.0),
                    bold: Some(true),
                    color: Some(theme.accent()),
                    ..Style::default()
                },
            ),
            Node::text(
                format!("#{number}"),
                Style {
                    font_size: Some(12.0),
                    bold: Some(true),
                    color: Some(muted()),
                    uppercase: Some(true),
                    letter_spacing: Some(1.0),
                    background: Some(hairline()),
                    padding: Some(Edges::symmetric(2.0, 8.0)),
                    ..Style::default()
                },
            ),
        ],
    );

    // Long en-GB style date: "14 February 2026".
    let issued = doc.date.format("%-d %B %Y").to_string();
    let date_block = Node::view(
        Style {
            gap: Some(4.0),
            text_align: Some(TextAlign::Right),
            ..Style::default()
        },
        vec![
            label("Date Issued"),
            Node::text(
                issued,
                Style {
                    font_size: Some(18.0),
                    bold: Some(true),
                    ..Style::default()
                },
            ),
        ],
    );

    Node::view(
        Style {
            direction: Some(FlexDirection::Row),
            justify: Some(Justify::SpaceBetween),
            padding: Some(Edges {
                bottom: 48.0,
                ..Edges::default()
            }),
            ..Style::default()
        },
        vec![title_block, date_block],
    )
}

fn party_panel(heading: &str, party: &Party, fallback_name: &str, align: TextAlign) -> Node {
    let name = if party.name.is_empty() {
        fallback_name
    } else {
        party.name.as_str()
    };

    let mut children = vec![
        label(heading),
        Node::text(
            name,
            Style {
                font_size: Some(18.0),
                bold: Some(true),
                padding: Some(Edges {
                    top: 12.0,
                    bottom: 4.0,
                    ..Edges::default()
                }),
                ..Style::default()
            },
        ),
        Node::text(
            party.address.clone(),
            Style {
                font_size: Some(12.0),
                color: Some(muted()),
                line_height: Some(1.6),
                ..Style::default()
            },
        ),
    ];

    // Tax id lines are omitted entirely when absent, never shown blank.
    if let Some(gstin) = party.gstin.as_deref().filter(|g| !g.is_empty()) {
        children.push(Node::text(
            format!("GSTIN: {gstin}"),
            Style {
                font_size: Some(12.0),
                bold: Some(true),
                color: Some(muted()),
                padding: Some(Edges {
                    top: 8.0,
                    ..Edges::default()
                }),
                ..Style::default()
            },
        ));
    }
    if let Some(pan) = party.pan.as_deref().filter(|p| !p.is_empty()) {
        children.push(Node::text(
            format!("PAN: {pan}"),
            Style {
                font_size: Some(12.0),
                bold: Some(true),
                color: Some(muted()),
                ..Style::default()
            },
        ));
    }

    Node::view(
        Style {
            width: Some(Dimension::Fraction(0.5)),
            padding: Some(Edges::uniform(24.0)),
            background: Some(panel()),
            text_align: Some(align),
            ..Style::default()
        },
        children,
    )
}

fn parties(doc: &InvoiceDocument) -> Node {
    Node::view(
        Style {
            direction: Some(FlexDirection::Row),
            gap: Some(32.0),
            padding: Some(Edges {
                bottom: 40.0,
                ..Edges::default()
            }),
            ..Style::default()
        },
        vec![
            party_panel("From", &doc.creator, "Creator Name", TextAlign::Left),
            party_panel("Bill To", &doc.client, "Client Name", TextAlign::Right),
        ],
    )
}

fn table_cell(fraction: f64, align: TextAlign, children: Vec<Node>) -> Node {
    Node::view(
        Style {
            width: Some(Dimension::Fraction(fraction)),
            text_align: Some(align),
            ..Style::default()
        },
        children,
    )
}

fn item_table(doc: &InvoiceDocument) -> Node {
    let header_cell = |fraction: f64, text: &str, align: TextAlign| {
        table_cell(
            fraction,
            align,
            vec![Node::text(
                text,
                Style {
                    font_size: Some(12.0),
                    bold: Some(true),
                    uppercase: Some(true),
                    letter_spacing: Some(1.0),
                    padding: Some(Edges::vertical_only(12.0)),
                    ..Style::default()
                },
            )],
        )
    };

    let mut rows = vec![Node::view(
        Style {
            direction: Some(FlexDirection::Row),
            border_bottom: Some(Border::solid(2.0, ink())),
            ..Style::default()
        },
        vec![
            header_cell(COLUMNS[0], "Description", TextAlign::Left),
            header_cell(COLUMNS[1], "Qty", TextAlign::Center),
            header_cell(COLUMNS[2], "Rate", TextAlign::Right),
            header_cell(COLUMNS[3], "Amount", TextAlign::Right),
        ],
    )];

    let last = doc.items.len().saturating_sub(1);
    for (i, item) in doc.items.iter().enumerate() {
        rows.push(item_row(item, i == last));
    }

    Node::view(Style::default(), rows)
}

fn item_row(item: &LineItem, is_last: bool) -> Node {
    let mut description = vec![Node::text(
        item.name.clone(),
        Style {
            bold: Some(true),
            ..Style::default()
        },
    )];
    if let Some(desc) = item.description.as_deref().filter(|d| !d.is_empty()) {
        description.push(Node::text(
            desc,
            Style {
                font_size: Some(12.0),
                bold: Some(false),
                color: Some(muted()),
                padding: Some(Edges {
                    top: 4.0,
                    ..Edges::default()
                }),
                ..Style::default()
            },
        ));
    }
    if let Some(hsn) = item.hsn_code.as_deref().filter(|h| !h.is_empty()) {
        description.push(Node::text(
            format!("HSN: {hsn}"),
            Style {
                font_size: Some(10.0),
                bold: Some(false),
                color: Some(faint()),
                padding: Some(Edges {
                    top: 4.0,
                    ..Edges::default()
                }),
                ..Style::default()
            },
        ));
    }

    let quantity = if item.quantity.fract() == 0.0 {
        format!("{}", item.quantity as i64)
    } else {
        format!("{}", item.quantity)
    };

    let border = if is_last {
        None
    } else {
        Some(Border::solid(1.0, hairline()))
    };

    Node::view(
        Style {
            direction: Some(FlexDirection::Row),
            font_size: Some(14.0),
            padding: Some(Edges::vertical_only(16.0)),
            border_bottom: border,
            ..Style::default()
        },
        vec![
            table_cell(
                COLUMNS[0],
                TextAlign::Left,
                vec![Node::view(
                    Style {
                        padding: Some(Edges {
                            right: 16.0,
                            ..Edges::default()
                        }),
                        ..Style::default()
                    },
                    description,
                )],
            ),
            table_cell(
                COLUMNS[1],
                TextAlign::Center,
                vec![Node::text(
                    quantity,
                    Style {
                        color: Some(Color::hex("#475569")),
                        ..Style::default()
                    },
                )],
            ),
            table_cell(
                COLUMNS[2],
                TextAlign::Right,
                vec![Node::text(
                    format_amount(item.rate),
                    Style {
                        color: Some(Color::hex("#475569")),
                        ..Style::default()
                    },
                )],
            ),
            table_cell(
                COLUMNS[3],
                TextAlign::Right,
                vec![Node::text(
                    format_amount(item.amount),
                    Style {
                        bold: Some(true),
                        ..Style::default()
                    },
                )],
            ),
        ],
    )
}

fn totals_row(label_text: String, value: String, color: Option<Color>) -> Node {
    let style = Style {
        font_size: Some(12.0),
        color: Some(color.unwrap_or_else(muted)),
        ..Style::default()
    };
    Node::view(
        Style {
            direction: Some(FlexDirection::Row),
            justify: Some(Justify::SpaceBetween),
            padding: Some(Edges::vertical_only(4.0)),
            ..Style::default()
        },
        vec![
            Node::text(label_text, style.clone()),
            Node::text(value, style),
        ],
    )
}

fn totals_block(doc: &InvoiceDocument, totals: &ComputedTotals, theme: Theme) -> Node {
    let mut rows = vec![totals_row(
        "Subtotal".to_string(),
        format_amount(totals.subtotal),
        None,
    )];

    if totals.discount_amount > 0.0 {
        let note = match doc.discount_type {
            DiscountType::Percentage => format!("Discount ({}%)", doc.discount),
            DiscountType::Fixed => "Discount (flat)".to_string(),
        };
        rows.push(totals_row(
            note,
            format!("-{}", format_amount(totals.discount_amount)),
            Some(positive()),
        ));
    }

    if totals.igst > 0.0 {
        rows.push(totals_row(
            "IGST (18%)".to_string(),
            format_amount(totals.igst),
            None,
        ));
    }
    if totals.cgst > 0.0 {
        rows.push(totals_row(
            "CGST (9%)".to_string(),
            format_amount(totals.cgst),
            None,
        ));
    }
    if totals.sgst > 0.0 {
        rows.push(totals_row(
            "SGST (9%)".to_string(),
            format_amount(totals.sgst),
            None,
        ));
    }

    if totals.tds_amount > 0.0 {
        rows.push(totals_row(
            format!("TDS ({}%)", doc.tax_rate),
            format!("-{}", format_amount(totals.tds_amount)),
            Some(negative()),
        ));
    }

    let grand = Style {
        font_size: Some(18.0),
        bold: Some(true),
        color: Some(theme.accent()),
        ..Style::default()
    };
    rows.push(Node::view(
        Style {
            direction: Some(FlexDirection::Row),
            justify: Some(Justify::SpaceBetween),
            padding: Some(Edges {
                top: 12.0,
                bottom: 4.0,
                ..Edges::default()
            }),
            border_top: Some(Border::solid(1.0, rule())),
            ..Style::default()
        },
        vec![
            Node::text("Total", grand.clone()),
            Node::text(
                format!(
                    "{} {}",
                    currency_symbol(&doc.currency),
                    format_amount(totals.total)
                ),
                grand,
            ),
        ],
    ));

    Node::view(
        Style {
            align_items: Some(AlignItems::End),
            padding: Some(Edges {
                bottom: 32.0,
                ..Edges::default()
            }),
            ..Style::default()
        },
        vec![Node::view(
            Style {
                width: Some(Dimension::Fraction(5.0 / 12.0)),
                ..Style::default()
            },
            rows,
        )],
    )
}

fn footer(doc: &InvoiceDocument) -> Node {
    let bank = Node::view(
        Style {
            width: Some(Dimension::Fraction(0.5)),
            gap: Some(4.0),
            ..Style::default()
        },
        vec![
            label("Bank Details"),
            Node::text(
                doc.bank_name.clone(),
                Style {
                    font_size: Some(12.0),
                    color: Some(Color::hex("#475569")),
                    ..Style::default()
                },
            ),
            Node::text(
                format!("A/C: {} • IFSC: {}", doc.account_number, doc.ifsc_code),
                Style {
                    font_size: Some(12.0),
                    color: Some(muted()),
                    ..Style::default()
                },
            ),
            Node::text(
                doc.account_holder_name.clone(),
                Style {
                    font_size: Some(12.0),
                    color: Some(muted()),
                    ..Style::default()
                },
            ),
        ],
    );

    let signature_box = match &doc.signature {
        Some(src) => Node::image(
            src.clone(),
            Style {
                width: Some(Dimension::Px(128.0)),
                height: Some(48.0),
                ..Style::default()
            },
        ),
        None => Node::view(
            Style {
                width: Some(Dimension::Px(128.0)),
                height: Some(48.0),
                background: Some(panel()),
                border: Some(Border::dashed(1.0, whisper())),
                text_align: Some(TextAlign::Center),
                ..Style::default()
            },
            vec![Node::text(
                "No Signature",
                Style {
                    font_size: Some(10.0),
                    color: Some(faint()),
                    padding: Some(Edges {
                        top: 18.0,
                        ..Edges::default()
                    }),
                    ..Style::default()
                },
            )],
        ),
    };

    let signatory = Node::view(
        Style {
            width: Some(Dimension::Fraction(0.5)),
            align_items: Some(AlignItems::End),
            gap: Some(8.0),
            ..Style::default()
        },
        vec![signature_box, label("Authorized Signatory")],
    );

    Node::view(
        Style {
            direction: Some(FlexDirection::Row),
            gap: Some(32.0),
            padding: Some(Edges {
                top: 24.0,
                ..Edges::default()
            }),
            border_top: Some(Border::dashed(1.0, whisper())),
            ..Style::default()
        },
        vec![bank, signatory],
    )
}

fn branding() -> Node {
    Node::view(
        Style {
            padding: Some(Edges {
                top: 16.0,
                ..Edges::default()
            }),
            border_top: Some(Border::solid(1.0, hairline())),
            align_items: Some(AlignItems::Center),
            ..Style::default()
        },
        vec![Node::text(
            "Generated with Platen",
            Style {
                font_size: Some(10.0),
                color: Some(whisper()),
                uppercase: Some(true),
                letter_spacing: Some(1.5),
                text_align: Some(TextAlign::Center),
                ..Style::default()
            },
        )],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::SessionConfig;
    use crate::totals::compute_totals;

    fn collect_text(node: &Node, out: &mut Vec<String>) {
        if let NodeKind::Text { content } = &node.kind {
            out.push(content.clone());
        }
        for child in &node.children {
            collect_text(child, out);
        }
    }

    fn all_text(doc: &InvoiceDocument) -> Vec<String> {
        let totals = compute_totals(doc);
        let tree = build_invoice_tree(doc, &totals, Theme::Blue);
        let mut out = Vec::new();
        collect_text(&tree, &mut out);
        out
    }

    #[test]
    fn test_empty_number_renders_draft_badge() {
        let doc = InvoiceDocument::draft(&SessionConfig::default());
        assert!(all_text(&doc).iter().any(|t| t == "#DRAFT"));
    }

    #[test]
    fn test_tax_id_lines_omitted_when_absent() {
        let doc = InvoiceDocument::draft(&SessionConfig::default());
        let texts = all_text(&doc);
        assert!(!texts.iter().any(|t| t.starts_with("GSTIN:")));
        assert!(!texts.iter().any(|t| t.starts_with("PAN:")));
    }

    #[test]
    fn test_gst_rows_appear_for_intra_state() {
        let mut doc = InvoiceDocument::draft(&SessionConfig::default());
        doc.items[0].amount = 1000.0;
        doc.creator.gstin = Some("08AAA".to_string());
        doc.client.gstin = Some("08BBB".to_string());
        let texts = all_text(&doc);
        assert!(texts.iter().any(|t| t == "CGST (9%)"));
        assert!(texts.iter().any(|t| t == "SGST (9%)"));
        assert!(!texts.iter().any(|t| t == "IGST (18%)"));
    }

    #[test]
    fn test_zero_tds_row_hidden() {
        let doc = InvoiceDocument::draft(&SessionConfig::default());
        assert!(!all_text(&doc).iter().any(|t| t.starts_with("TDS")));
    }

    #[test]
    fn test_total_uses_rupee_glyph_for_inr() {
        let mut doc = InvoiceDocument::draft(&SessionConfig::default());
        doc.items[0].amount = 1000.0;
        let texts = all_text(&doc);
        assert!(texts.iter().any(|t| t == "₹ 1,000.00"));

        doc.currency = "USD".to_string();
        let texts = all_text(&doc);
        assert!(texts.iter().any(|t| t == "USD 1,000.00"));
    }

    #[test]
    fn test_missing_signature_placeholder() {
        let mut doc = InvoiceDocument::draft(&SessionConfig::default());
        assert!(all_text(&doc).iter().any(|t| t == "No Signature"));

        doc.signature = Some("data:image/png;base64,AAAA".to_string());
        assert!(!all_text(&doc).iter().any(|t| t == "No Signature"));
    }

    #[test]
    fn test_date_formatted_long() {
        let mut doc = InvoiceDocument::draft(&SessionConfig::default());
        doc.date = chrono::NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();
        assert!(all_text(&doc).iter().any(|t| t == "14 February 2026"));
    }
}
