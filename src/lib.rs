//! # Platen
//!
//! A fixed-page invoice engine.
//!
//! Most document pipelines lay content onto an infinite canvas and slice it
//! into pages afterwards. Platen does the opposite for the one document it
//! knows: **the A4 page is the fundamental unit.** Every invoice is computed,
//! laid out, previewed, and exported against the same 794×1123 logical page
//! box, so what the preview shows is byte-for-byte what the PDF contains.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!  [invoice]   — Document snapshot: parties, items, tax fields
//!       ↓
//!  [totals]    — Tax engine: subtotal, discount, GST split, TDS
//!       ↓
//!  [template]  — Invoice template: (document, totals) -> node tree
//!       ↓
//!  [layout]    — Fixed-box layout onto the canonical page
//!       ↓
//!  [export]    — Raster + JPEG + single-page PDF
//! ```
//!
//! The [`viewport`] module sits off to the side: it scales the fixed page
//! for an interactive preview and never feeds back into layout.

pub mod error;
pub mod export;
pub mod font;
pub mod image_loader;
pub mod invoice;
pub mod layout;
pub mod model;
pub mod style;
pub mod template;
pub mod text;
pub mod totals;
pub mod viewport;

pub use error::PlatenError;
pub use export::{ExportOptions, ExportPipeline, PageRasterizer, PdfArtifact, SkiaRasterizer};
pub use font::{FontContext, FontWeight};
pub use invoice::{
    DiscountType, ExportChecklist, InvoiceDocument, LineItem, Party, SessionConfig,
};
pub use layout::{LaidOutPage, LayoutEngine};
pub use template::Theme;
pub use totals::{compute_totals, currency_symbol, format_amount, ComputedTotals};
pub use viewport::ViewportScaler;

/// Parse an invoice document from JSON.
pub fn from_json(json: &str) -> Result<InvoiceDocument, PlatenError> {
    let doc: InvoiceDocument = serde_json::from_str(json)?;
    Ok(doc)
}

/// Lay out one invoice snapshot onto the canonical page.
///
/// Totals are computed here from the same snapshot that is rendered, so the
/// figures on the page can never drift from the document they came from.
pub fn render(doc: &InvoiceDocument, theme: Theme, fonts: &FontContext) -> LaidOutPage {
    let totals = compute_totals(doc);
    let tree = template::build_invoice_tree(doc, &totals, theme);
    LayoutEngine::new().layout(&tree, fonts)
}

/// Render and export one invoice snapshot as a PDF artifact.
///
/// This is the primary entry point for hosts that don't need to hold the
/// intermediate page.
pub fn export_invoice<R: PageRasterizer>(
    pipeline: &ExportPipeline<R>,
    doc: &InvoiceDocument,
    theme: Theme,
    fonts: &FontContext,
    options: &ExportOptions,
) -> Result<PdfArtifact, PlatenError> {
    let page = render(doc, theme, fonts);
    pipeline.export(doc, &page, fonts, options)
}
