//! # Export Pipeline
//!
//! Turns an invoice snapshot into a downloadable PDF artifact:
//! pre-flight validation, raster of the laid-out page at print
//! resolution, JPEG encoding, and the single-page PDF wrap.
//!
//! The pipeline is single-flight. A second export started while one is in
//! progress returns [`PlatenError::ExportInFlight`] instead of queuing, so
//! a double-triggered export can never produce two artifacts. Pre-flight
//! failures are checked before the in-flight flag is taken and therefore
//! never leave the pipeline latched busy.

pub mod pdf;
pub mod raster;

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::error::PlatenError;
use crate::font::FontContext;
use crate::invoice::InvoiceDocument;
use crate::layout::LaidOutPage;
use pdf::{PdfMetadata, PdfWriter};
pub use raster::{PageRasterizer, RasterImage, SkiaRasterizer, OVERSAMPLE};

/// JPEG quality for the page raster.
const JPEG_QUALITY: u8 = 90;

/// The finished export: a file name and the PDF bytes.
#[derive(Debug, Clone)]
pub struct PdfArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Knobs for one export run.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Skip the signature pre-flight check and export unsigned.
    pub allow_missing_signature: bool,
}

/// Single-flight PDF export pipeline, generic over the rasterizer so tests
/// can substitute a stub.
pub struct ExportPipeline<R: PageRasterizer = SkiaRasterizer> {
    rasterizer: R,
    in_flight: AtomicBool,
}

impl Default for ExportPipeline<SkiaRasterizer> {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportPipeline<SkiaRasterizer> {
    pub fn new() -> Self {
        Self::with_rasterizer(SkiaRasterizer::new())
    }
}

impl<R: PageRasterizer> ExportPipeline<R> {
    pub fn with_rasterizer(rasterizer: R) -> Self {
        Self {
            rasterizer,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Whether an export is currently running.
    pub fn is_exporting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Export one invoice snapshot as a PDF artifact.
    ///
    /// The caller passes the page laid out from the same snapshot, which
    /// keeps the document and its computed totals coherent in the output.
    pub fn export(
        &self,
        doc: &InvoiceDocument,
        page: &LaidOutPage,
        fonts: &FontContext,
        options: &ExportOptions,
    ) -> Result<PdfArtifact, PlatenError> {
        // Pre-flight before the in-flight flag: a rejected export must
        // leave the pipeline idle.
        if doc.items.is_empty() {
            return Err(PlatenError::NoLineItems);
        }
        if doc.signature.is_none() && !options.allow_missing_signature {
            return Err(PlatenError::MissingSignature);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PlatenError::ExportInFlight);
        }
        let _guard = InFlightGuard {
            flag: &self.in_flight,
        };

        let raster = self.rasterizer.rasterize(page, fonts)?;
        let jpeg = encode_jpeg(&raster)?;

        let metadata = PdfMetadata {
            title: Some(format!("Invoice {}", number_token(doc))),
            author: Some(doc.creator.name.clone()).filter(|n| !n.is_empty()),
        };
        let bytes = PdfWriter::new().write(&jpeg, raster.width_px, raster.height_px, &metadata)?;
        let file_name = file_name_for(doc);
        info!(
            file_name = %file_name,
            bytes = bytes.len(),
            "exported invoice pdf"
        );

        Ok(PdfArtifact { file_name, bytes })
    }
}

/// Clears the in-flight flag on every exit path.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

fn encode_jpeg(raster: &RasterImage) -> Result<Vec<u8>, PlatenError> {
    let mut buf = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    image::ImageEncoder::write_image(
        encoder,
        &raster.rgb,
        raster.width_px,
        raster.height_px,
        image::ColorType::Rgb8,
    )
    .map_err(|e| PlatenError::Raster(format!("jpeg encoding failed: {e}")))?;
    Ok(buf)
}

fn number_token(doc: &InvoiceDocument) -> String {
    if doc.invoice_number.trim().is_empty() {
        "Draft".to_string()
    } else {
        doc.invoice_number.trim().to_string()
    }
}

/// `Invoice_<number>.pdf`, with the number sanitized for file systems.
pub fn file_name_for(doc: &InvoiceDocument) -> String {
    format!("Invoice_{}.pdf", sanitize_token(&number_token(doc)))
}

fn sanitize_token(token: &str) -> String {
    let cleaned: String = token
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.chars().all(|c| c == '_') {
        "draft".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::SessionConfig;

    fn doc_numbered(number: &str) -> InvoiceDocument {
        let mut doc = InvoiceDocument::draft(&SessionConfig::default());
        doc.invoice_number = number.to_string();
        doc
    }

    #[test]
    fn test_file_name_plain_number() {
        assert_eq!(file_name_for(&doc_numbered("INV-042")), "Invoice_INV-042.pdf");
    }

    #[test]
    fn test_file_name_draft_fallback() {
        assert_eq!(file_name_for(&doc_numbered("")), "Invoice_Draft.pdf");
        assert_eq!(file_name_for(&doc_numbered("   ")), "Invoice_Draft.pdf");
    }

    #[test]
    fn test_file_name_sanitizes_separators() {
        assert_eq!(
            file_name_for(&doc_numbered("2026/02 #7")),
            "Invoice_2026_02__7.pdf"
        );
    }

    #[test]
    fn test_file_name_all_symbols_collapses_to_draft() {
        assert_eq!(file_name_for(&doc_numbered("///")), "Invoice_draft.pdf");
    }
}
