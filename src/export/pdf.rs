//! # PDF Serializer
//!
//! Writes the rasterized page into a single-page PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. The exported page is one JPEG
//! image XObject stretched over an A4 media box, so the subset of the spec
//! we need is small: a catalog, a page tree with one page, the image, and
//! one content stream. Writing the raw bytes ourselves keeps the engine
//! self-contained.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (catalog, pages, image, content, info)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::PlatenError;
use crate::model::{PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

/// A4 media box in PDF points (1 pt = 1/72 in, 25.4 mm per inch).
pub const PAGE_WIDTH_PT: f64 = PAGE_WIDTH_MM * 72.0 / 25.4;
pub const PAGE_HEIGHT_PT: f64 = PAGE_HEIGHT_MM * 72.0 / 25.4;

/// Document metadata for the Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
}

pub struct PdfWriter;

struct PdfObject {
    data: Vec<u8>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write a single-page PDF embedding the given JPEG as the full page.
    pub fn write(
        &self,
        jpeg: &[u8],
        width_px: u32,
        height_px: u32,
        metadata: &PdfMetadata,
    ) -> Result<Vec<u8>, PlatenError> {
        if jpeg.is_empty() || width_px == 0 || height_px == 0 {
            return Err(PlatenError::Pdf("empty page image".to_string()));
        }

        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog, 2 = Pages, then image, content, page, info.
        let mut objects: Vec<PdfObject> = vec![
            PdfObject { data: vec![] },
            PdfObject {
                data: b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
            },
            PdfObject { data: vec![] },
        ];

        // Image XObject: raw JPEG bytes pass through with DCTDecode.
        let image_obj_id = objects.len();
        let mut image_data: Vec<u8> = Vec::with_capacity(jpeg.len() + 256);
        let _ = write!(
            image_data,
            "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
             /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode \
             /Length {} >>\nstream\n",
            width_px,
            height_px,
            jpeg.len()
        );
        image_data.extend_from_slice(jpeg);
        image_data.extend_from_slice(b"\nendstream");
        objects.push(PdfObject { data: image_data });

        // Content stream: scale the unit image square over the media box.
        let content = format!(
            "q\n{:.2} 0 0 {:.2} 0 0 cm\n/Im0 Do\nQ\n",
            PAGE_WIDTH_PT, PAGE_HEIGHT_PT
        );
        let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
        let content_obj_id = objects.len();
        let mut content_data: Vec<u8> = Vec::new();
        let _ = write!(
            content_data,
            "<< /Length {} /Filter /FlateDecode >>\nstream\n",
            compressed.len()
        );
        content_data.extend_from_slice(&compressed);
        content_data.extend_from_slice(b"\nendstream");
        objects.push(PdfObject { data: content_data });

        let page_obj_id = objects.len();
        let page_dict = format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
             /Contents {} 0 R /Resources << /XObject << /Im0 {} 0 R >> >> >>",
            PAGE_WIDTH_PT, PAGE_HEIGHT_PT, content_obj_id, image_obj_id
        );
        objects.push(PdfObject {
            data: page_dict.into_bytes(),
        });

        objects[2].data =
            format!("<< /Type /Pages /Kids [{page_obj_id} 0 R] /Count 1 >>").into_bytes();

        let info_obj_id = if metadata.title.is_some() || metadata.author.is_some() {
            let id = objects.len();
            let mut info = String::from("<< ");
            if let Some(ref title) = metadata.title {
                let _ = write!(info, "/Title ({}) ", Self::escape_pdf_string(title));
            }
            if let Some(ref author) = metadata.author {
                let _ = write!(info, "/Author ({}) ", Self::escape_pdf_string(author));
            }
            let _ = write!(info, "/Producer (Platen 0.1) /Creator (Platen) >>");
            objects.push(PdfObject {
                data: info.into_bytes(),
            });
            Some(id)
        } else {
            None
        };

        Ok(self.serialize(&objects, info_obj_id))
    }

    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, objects: &[PdfObject], info_obj_id: Option<usize>) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; objects.len()];

        // Header
        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let header = format!("{} 0 obj\n", i);
            output.extend_from_slice(header.as_bytes());
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(output, "trailer\n<< /Size {} /Root 1 0 R", objects.len());
        if let Some(info_id) = info_obj_id {
            let _ = write!(output, " /Info {} 0 R", info_id);
        }
        let _ = write!(output, " >>\nstartxref\n{}\n%%EOF\n", xref_offset);

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A structurally valid 2-byte-magic JPEG stand-in is enough here; the
    // writer embeds bytes verbatim.
    fn fake_jpeg() -> Vec<u8> {
        vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(
            PdfWriter::escape_pdf_string("Hello (World)"),
            "Hello \\(World\\)"
        );
        assert_eq!(PdfWriter::escape_pdf_string("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_single_page_structure() {
        let bytes = PdfWriter::new()
            .write(&fake_jpeg(), 100, 141, &PdfMetadata::default())
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
        assert!(bytes.windows(4).any(|w| w == b"xref"));
        assert!(bytes.windows(7).any(|w| w == b"trailer"));
        assert!(bytes.windows(9).any(|w| w == b"DCTDecode"));
        assert!(bytes.windows(8).any(|w| w == b"/Count 1"));
    }

    #[test]
    fn test_media_box_is_a4_points() {
        let bytes = PdfWriter::new()
            .write(&fake_jpeg(), 100, 141, &PdfMetadata::default())
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/MediaBox [0 0 595.28 841.89]"));
    }

    #[test]
    fn test_metadata_written() {
        let metadata = PdfMetadata {
            title: Some("Invoice INV-7 (final)".to_string()),
            author: Some("Acme".to_string()),
        };
        let bytes = PdfWriter::new()
            .write(&fake_jpeg(), 10, 10, &metadata)
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Title (Invoice INV-7 \\(final\\))"));
        assert!(text.contains("/Author (Acme)"));
    }

    #[test]
    fn test_rejects_empty_image() {
        assert!(PdfWriter::new()
            .write(&[], 10, 10, &PdfMetadata::default())
            .is_err());
    }
}
