//! # Tax Engine
//!
//! Turns an [`InvoiceDocument`] into a [`ComputedTotals`] value. This is a
//! pure, total function: it never fails, never mutates its input, and is
//! cheap enough to run on every keystroke (O(number of items)).
//!
//! All amounts are carried at full `f64` precision and rounded only at
//! display time, so rounding error never compounds across the
//! subtotal → tax → total chain.
//!
//! ## The GST split
//!
//! GST applies only when **both** parties carry a GSTIN — asymmetric
//! information is not unilaterally taxed. When the two-character state
//! prefixes match the transaction is intra-state (CGST 9% + SGST 9%);
//! otherwise it is inter-state (IGST 18%). The engine extracts the prefix
//! and nothing more; GSTIN checksum validation is not its job.

use serde::Serialize;

use crate::invoice::{DiscountType, InvoiceDocument};

/// Central + State GST rate, each applied to the taxable value intra-state.
pub const CGST_RATE: f64 = 0.09;
pub const SGST_RATE: f64 = 0.09;
/// Integrated GST rate applied inter-state.
pub const IGST_RATE: f64 = 0.18;

/// Derived totals, recomputed from scratch on every document change.
///
/// Never mutated incrementally and never derived from a previous total, so
/// repeated recomputation is idempotent and cannot drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedTotals {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub taxable_value: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub tds_amount: f64,
    pub total: f64,
}

impl ComputedTotals {
    /// Sum of all GST components (at most one of the two schemes is set).
    pub fn gst_total(&self) -> f64 {
        self.cgst + self.sgst + self.igst
    }
}

/// Compute invoice totals from the current document snapshot.
///
/// Negative discount or tax-rate values pass through as given — a negative
/// discount models a surcharge. Clamping them is a product decision the
/// engine deliberately does not make.
pub fn compute_totals(doc: &InvoiceDocument) -> ComputedTotals {
    let subtotal: f64 = doc.items.iter().map(|item| item.amount).sum();

    let discount_amount = match doc.discount_type {
        DiscountType::Percentage => subtotal * (doc.discount / 100.0),
        DiscountType::Fixed => doc.discount,
    };
    let taxable_value = subtotal - discount_amount;

    let mut cgst = 0.0;
    let mut sgst = 0.0;
    let mut igst = 0.0;
    if let (Some(creator_state), Some(client_state)) =
        (doc.creator.state_code(), doc.client.state_code())
    {
        if creator_state == client_state {
            cgst = taxable_value * CGST_RATE;
            sgst = taxable_value * SGST_RATE;
        } else {
            igst = taxable_value * IGST_RATE;
        }
    }

    let tds_amount = taxable_value * (doc.tax_rate / 100.0);
    let total = taxable_value + cgst + sgst + igst - tds_amount;

    ComputedTotals {
        subtotal,
        discount_amount,
        taxable_value,
        cgst,
        sgst,
        igst,
        tds_amount,
        total,
    }
}

/// Format an amount with Indian digit grouping and two decimals:
/// `1234567.5` → `"12,34,567.50"`. The last three integer digits group
/// together, then pairs (lakh/crore style).
pub fn format_amount(value: f64) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, ch) in digits.iter().enumerate() {
        let remaining = digits.len() - i;
        if i > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    format!(
        "{}{}.{}",
        if negative { "-" } else { "" },
        grouped,
        frac_part
    )
}

/// The display prefix for a currency code: `"INR"` renders the rupee glyph,
/// anything else renders the raw code.
pub fn currency_symbol(code: &str) -> &str {
    if code == "INR" {
        "₹"
    } else {
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{LineItem, Party, SessionConfig};

    fn doc_with_amounts(amounts: &[f64]) -> InvoiceDocument {
        let mut doc = InvoiceDocument::draft(&SessionConfig::default());
        doc.items = amounts
            .iter()
            .map(|&a| LineItem {
                amount: a,
                ..LineItem::new("item")
            })
            .collect();
        doc
    }

    fn with_gstins(mut doc: InvoiceDocument, creator: &str, client: &str) -> InvoiceDocument {
        doc.creator = Party {
            gstin: Some(creator.to_string()),
            ..Party::default()
        };
        doc.client = Party {
            gstin: Some(client.to_string()),
            ..Party::default()
        };
        doc
    }

    #[test]
    fn test_empty_items_all_zero() {
        let totals = compute_totals(&doc_with_amounts(&[]));
        assert_eq!(totals, ComputedTotals::default());
    }

    #[test]
    fn test_idempotent_recomputation() {
        let doc = with_gstins(doc_with_amounts(&[1000.0, 250.5]), "08AAA", "27BBB");
        let a = compute_totals(&doc);
        let b = compute_totals(&doc);
        assert_eq!(a, b);
    }

    #[test]
    fn test_percentage_discount_law() {
        let mut doc = doc_with_amounts(&[1000.0]);
        doc.discount = 10.0;
        doc.discount_type = DiscountType::Percentage;
        assert_eq!(compute_totals(&doc).discount_amount, 100.0);
    }

    #[test]
    fn test_fixed_discount_ignores_subtotal() {
        let mut doc = doc_with_amounts(&[1000.0]);
        doc.discount = 50.0;
        doc.discount_type = DiscountType::Fixed;
        assert_eq!(compute_totals(&doc).discount_amount, 50.0);

        doc.items[0].amount = 99999.0;
        assert_eq!(compute_totals(&doc).discount_amount, 50.0);
    }

    #[test]
    fn test_gst_gated_on_both_gstins() {
        let mut doc = with_gstins(doc_with_amounts(&[1000.0]), "08AAA", "");
        let totals = compute_totals(&doc);
        assert_eq!(totals.gst_total(), 0.0);

        doc.creator.gstin = None;
        doc.client.gstin = Some("27BBB".to_string());
        assert_eq!(compute_totals(&doc).gst_total(), 0.0);
    }

    #[test]
    fn test_intra_state_splits_evenly() {
        let doc = with_gstins(doc_with_amounts(&[1000.0]), "08AAA", "08BBB");
        let totals = compute_totals(&doc);
        assert_eq!(totals.cgst, 90.0);
        assert_eq!(totals.sgst, 90.0);
        assert_eq!(totals.igst, 0.0);
    }

    #[test]
    fn test_inter_state_is_single_rate() {
        let doc = with_gstins(doc_with_amounts(&[1000.0]), "08AAA", "27BBB");
        let totals = compute_totals(&doc);
        assert_eq!(totals.igst, 180.0);
        assert_eq!(totals.cgst, 0.0);
        assert_eq!(totals.sgst, 0.0);
        // IGST is exactly the combined intra-state burden
        assert_eq!(totals.igst, 1000.0 * (CGST_RATE + SGST_RATE));
    }

    #[test]
    fn test_negative_discount_models_surcharge() {
        let mut doc = doc_with_amounts(&[1000.0]);
        doc.discount = -10.0;
        doc.discount_type = DiscountType::Percentage;
        let totals = compute_totals(&doc);
        assert_eq!(totals.discount_amount, -100.0);
        assert_eq!(totals.taxable_value, 1100.0);
    }

    #[test]
    fn test_format_amount_indian_grouping() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(999.0), "999.00");
        assert_eq!(format_amount(1000.0), "1,000.00");
        assert_eq!(format_amount(100000.0), "1,00,000.00");
        assert_eq!(format_amount(1234567.5), "12,34,567.50");
        assert_eq!(format_amount(-45000.0), "-45,000.00");
    }

    #[test]
    fn test_currency_symbol() {
        assert_eq!(currency_symbol("INR"), "₹");
        assert_eq!(currency_symbol("USD"), "USD");
    }
}
