//! # Invoice Document Model
//!
//! The input representation for the engine. An `InvoiceDocument` is an
//! immutable snapshot produced by the host's data-entry layer and replaced
//! wholesale on every field edit — the engine never mutates it, it only
//! derives totals and layout from it.
//!
//! Numeric fields coerce at the serde boundary: a JSON number, a numeric
//! string, or null/missing all deserialize cleanly, and anything
//! non-numeric becomes `0.0`. This keeps every keystroke renderable and
//! keeps the coercion rule in exactly one place.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A complete invoice ready for computation and rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDocument {
    /// Invoice number. May be empty while drafting; rendering falls back
    /// to a literal "DRAFT" placeholder.
    #[serde(default)]
    pub invoice_number: String,

    /// Issue date, printed as a long localized date string.
    pub date: NaiveDate,

    /// The party issuing the invoice.
    pub creator: Party,

    /// The party being billed.
    pub client: Party,

    /// Ordered line items. Insertion order determines print order.
    /// Empty is allowed while editing; export requires at least one.
    #[serde(default)]
    pub items: Vec<LineItem>,

    /// TDS withholding percentage applied to the taxable value.
    #[serde(default, deserialize_with = "coerce::numeric_or_zero")]
    pub tax_rate: f64,

    /// Discount value; meaning depends on `discount_type`.
    #[serde(default, deserialize_with = "coerce::numeric_or_zero")]
    pub discount: f64,

    #[serde(default)]
    pub discount_type: DiscountType,

    /// ISO-like currency code, used for the display symbol only.
    /// No conversion is performed.
    #[serde(default = "default_currency")]
    pub currency: String,

    // Bank details, printed verbatim.
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub ifsc_code: String,
    #[serde(default)]
    pub account_holder_name: String,

    /// Signature image source (data URI, raw base64, or file path).
    /// Opaque to the engine apart from presence; decoded only at export.
    #[serde(default)]
    pub signature: Option<String>,
}

fn default_currency() -> String {
    "INR".to_string()
}

/// One side of the transaction (creator or client).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    #[serde(default)]
    pub name: String,

    /// Free text; may contain newlines, rendered as separate lines.
    #[serde(default)]
    pub address: String,

    /// Optional PAN tax id, display-only.
    #[serde(default)]
    pub pan: Option<String>,

    /// Optional 15-character GSTIN. The first two characters encode the
    /// issuing state and drive the intra/inter-state tax split.
    #[serde(default)]
    pub gstin: Option<String>,
}

impl Party {
    /// The GST state code: the first two characters of the GSTIN.
    ///
    /// Returns `None` when the GSTIN is absent or empty. No checksum or
    /// format validation happens here; the prefix is extracted purely for
    /// routing the intra/inter-state split.
    pub fn state_code(&self) -> Option<&str> {
        let gstin = self.gstin.as_deref()?.trim();
        if gstin.is_empty() {
            return None;
        }
        Some(gstin.get(..2).unwrap_or(gstin))
    }
}

/// How the `discount` field is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount` is a percentage of the subtotal.
    #[default]
    Percentage,
    /// `discount` is a flat amount in the invoice currency.
    Fixed,
}

/// A single billed row on the invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "coerce::numeric_or_zero")]
    pub quantity: f64,

    /// Unit price in the invoice currency.
    #[serde(default, deserialize_with = "coerce::numeric_or_zero")]
    pub rate: f64,

    /// The line total. Invariant: `amount == round(quantity * rate)`,
    /// maintained by the caller whenever quantity or rate changes (use
    /// [`LineItem::recalculated`]). The tax engine trusts this value and
    /// recomputes nothing here.
    #[serde(default, deserialize_with = "coerce::numeric_or_zero")]
    pub amount: f64,

    /// Optional HSN classification code, display-only.
    #[serde(default)]
    pub hsn_code: Option<String>,
}

impl LineItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            quantity: 1.0,
            rate: 0.0,
            amount: 0.0,
            hsn_code: None,
        }
    }

    /// Returns a copy with `amount` rebuilt from quantity and rate.
    /// Call after changing either field to keep the line-total invariant.
    pub fn recalculated(mut self) -> Self {
        self.amount = (self.quantity * self.rate).round();
        self
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self.recalculated()
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self.recalculated()
    }
}

impl InvoiceDocument {
    /// The session-start default document.
    ///
    /// Pre-filling (a known client, a default HSN code) comes from the
    /// explicit [`SessionConfig`] — the engine never reads ambient state
    /// like URL parameters or environment variables.
    pub fn draft(config: &SessionConfig) -> Self {
        let hsn = config
            .default_hsn_code
            .clone()
            .unwrap_or_else(|| "998361".to_string());
        Self {
            invoice_number: String::new(),
            date: config
                .issue_date
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
            creator: Party::default(),
            client: config.prefill_client.clone().unwrap_or_default(),
            items: vec![LineItem {
                name: "Advertisement Services".to_string(),
                description: None,
                quantity: 1.0,
                rate: 0.0,
                amount: 0.0,
                hsn_code: Some(hsn),
            }],
            tax_rate: 0.0,
            discount: 0.0,
            discount_type: DiscountType::Percentage,
            currency: default_currency(),
            bank_name: String::new(),
            account_number: String::new(),
            ifsc_code: String::new(),
            account_holder_name: String::new(),
            signature: None,
        }
    }

    /// Returns a new document with the item at `index` replaced.
    ///
    /// Line items are edited by explicit replacement, never through
    /// aliased in-place mutation; insertion order is preserved as a
    /// first-class invariant. `None` when the index is out of bounds.
    pub fn with_item_replaced(&self, index: usize, item: LineItem) -> Option<Self> {
        if index >= self.items.len() {
            return None;
        }
        let mut doc = self.clone();
        doc.items[index] = item;
        Some(doc)
    }

    /// Returns a new document with `item` appended after the existing rows.
    pub fn with_item_added(&self, item: LineItem) -> Self {
        let mut doc = self.clone();
        doc.items.push(item);
        doc
    }

    /// Returns a new document with the item at `index` removed, remaining
    /// rows keeping their relative order. `None` when out of bounds.
    pub fn with_item_removed(&self, index: usize) -> Option<Self> {
        if index >= self.items.len() {
            return None;
        }
        let mut doc = self.clone();
        doc.items.remove(index);
        Some(doc)
    }
}

/// Explicit session configuration handed to the data-entry layer before any
/// document exists. Replaces ambient lookup (query parameters) with a value
/// the host constructs and owns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// A known client to pre-fill, if the host recognized one.
    #[serde(default)]
    pub prefill_client: Option<Party>,

    /// Default HSN code stamped on the initial line item.
    #[serde(default)]
    pub default_hsn_code: Option<String>,

    /// Issue date for the draft; today when absent.
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
}

/// The pre-flight readiness checklist shown next to the preview.
///
/// A read-only projection of the document; the five checks mirror what the
/// export surface displays. Only `has_items` (and the signature, with an
/// override) actually gate the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportChecklist {
    pub invoice_number_set: bool,
    pub client_name_set: bool,
    pub has_items: bool,
    pub bank_account_set: bool,
    pub signature_set: bool,
}

impl ExportChecklist {
    pub fn evaluate(doc: &InvoiceDocument) -> Self {
        Self {
            invoice_number_set: !doc.invoice_number.is_empty(),
            client_name_set: !doc.client.name.is_empty(),
            has_items: !doc.items.is_empty(),
            bank_account_set: !doc.account_number.is_empty(),
            signature_set: doc.signature.is_some(),
        }
    }

    pub fn ready(&self) -> bool {
        self.invoice_number_set
            && self.client_name_set
            && self.has_items
            && self.bank_account_set
            && self.signature_set
    }
}

mod coerce {
    //! Numeric-or-zero coercion, applied once at the deserialization
    //! boundary instead of scattered across call sites.

    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Num(f64),
        Text(String),
        Other(serde_json::Value),
    }

    pub fn numeric_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Loose>::deserialize(deserializer)?;
        Ok(match value {
            Some(Loose::Num(n)) if n.is_finite() => n,
            Some(Loose::Text(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .unwrap_or(0.0),
            _ => 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_json(items: &str, extra: &str) -> String {
        format!(
            r#"{{
                "invoiceNumber": "INV-1",
                "date": "2026-02-14",
                "creator": {{ "name": "A", "address": "addr" }},
                "client": {{ "name": "B", "address": "addr" }},
                "items": {items}
                {extra}
            }}"#
        )
    }

    #[test]
    fn test_numeric_string_coerces() {
        let json = doc_json(
            r#"[{ "name": "x", "quantity": "2", "rate": "500.5", "amount": 1001 }]"#,
            "",
        );
        let doc: InvoiceDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(doc.items[0].quantity, 2.0);
        assert_eq!(doc.items[0].rate, 500.5);
    }

    #[test]
    fn test_garbage_numeric_coerces_to_zero() {
        let json = doc_json(
            r#"[{ "name": "x", "quantity": "abc", "rate": null, "amount": "1e999" }]"#,
            r#", "discount": "not a number", "taxRate": {}"#,
        );
        let doc: InvoiceDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(doc.items[0].quantity, 0.0);
        assert_eq!(doc.items[0].rate, 0.0);
        assert_eq!(doc.items[0].amount, 0.0);
        assert_eq!(doc.discount, 0.0);
        assert_eq!(doc.tax_rate, 0.0);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = doc_json("[]", "");
        let doc: InvoiceDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(doc.currency, "INR");
        assert_eq!(doc.discount_type, DiscountType::Percentage);
        assert!(doc.signature.is_none());
        assert!(doc.items.is_empty());
    }

    #[test]
    fn test_state_code_extraction() {
        let party = Party {
            gstin: Some("08AAMCC2269E1ZL".to_string()),
            ..Party::default()
        };
        assert_eq!(party.state_code(), Some("08"));

        let empty = Party {
            gstin: Some("".to_string()),
            ..Party::default()
        };
        assert_eq!(empty.state_code(), None);
        assert_eq!(Party::default().state_code(), None);
    }

    #[test]
    fn test_recalculated_maintains_amount() {
        let item = LineItem::new("svc").with_quantity(3.0).with_rate(333.4);
        assert_eq!(item.amount, 1000.0);
    }

    #[test]
    fn test_replace_item_preserves_order() {
        let config = SessionConfig::default();
        let doc = InvoiceDocument::draft(&config)
            .with_item_added(LineItem::new("second"))
            .with_item_added(LineItem::new("third"));

        let replaced = doc
            .with_item_replaced(1, LineItem::new("middle"))
            .expect("index in bounds");
        let names: Vec<&str> = replaced.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Advertisement Services", "middle", "third"]);

        // Original snapshot is untouched
        assert_eq!(doc.items[1].name, "second");
        assert!(doc.with_item_replaced(9, LineItem::new("x")).is_none());
    }

    #[test]
    fn test_draft_uses_session_config() {
        let config = SessionConfig {
            prefill_client: Some(Party {
                name: "CLYROMEDIA PRIVATE LIMITED".to_string(),
                ..Party::default()
            }),
            default_hsn_code: Some("1234".to_string()),
            issue_date: Some(NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()),
        };
        let doc = InvoiceDocument::draft(&config);
        assert_eq!(doc.client.name, "CLYROMEDIA PRIVATE LIMITED");
        assert_eq!(doc.items[0].hsn_code.as_deref(), Some("1234"));
        assert_eq!(doc.date, NaiveDate::from_ymd_opt(2026, 2, 14).unwrap());
    }

    #[test]
    fn test_checklist_projection() {
        let mut doc = InvoiceDocument::draft(&SessionConfig::default());
        let checks = ExportChecklist::evaluate(&doc);
        assert!(checks.has_items);
        assert!(!checks.invoice_number_set);
        assert!(!checks.ready());

        doc.invoice_number = "INV-7".to_string();
        doc.client.name = "Client".to_string();
        doc.account_number = "123".to_string();
        doc.signature = Some("data:image/png;base64,AAAA".to_string());
        assert!(ExportChecklist::evaluate(&doc).ready());
    }
}
