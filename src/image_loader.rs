//! # Image Loading and Decoding
//!
//! Resolves a signature image source string to decoded RGBA pixels the
//! rasterizer can composite onto the page. Sources may be data URIs, file
//! paths, or raw base64 strings; JPEG and PNG are accepted.

use std::io::Cursor;

use crate::error::PlatenError;

/// A decoded image ready for compositing.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// width * height * 4 bytes, straight (non-premultiplied) alpha.
    pub rgba: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

/// Load an image from a source string.
///
/// Supported `src` formats:
/// - `data:image/...;base64,...` — data URI
/// - File path (absolute or relative) — reads from disk
/// - Raw base64-encoded image data
pub fn load_image(src: &str) -> Result<LoadedImage, PlatenError> {
    let raw_bytes = read_source_bytes(src)?;
    decode_image_bytes(&raw_bytes)
}

/// Resolve the source string to raw image bytes.
fn read_source_bytes(src: &str) -> Result<Vec<u8>, PlatenError> {
    // Data URI: data:image/png;base64,iVBOR...
    if src.starts_with("data:image/") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| PlatenError::Image("invalid data URI: missing comma".to_string()))?;
        return base64_decode(&src[comma_pos + 1..]);
    }

    // Only match explicit path prefixes so base64 payloads (which contain
    // '/') are not mistaken for file paths.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        return std::fs::read(src)
            .map_err(|e| PlatenError::Image(format!("failed to read image file '{src}': {e}")));
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, PlatenError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input)
        .map_err(|e| PlatenError::Image(format!("base64 decode error: {e}")))
}

/// Detect the format from magic bytes, then decode to RGBA.
fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, PlatenError> {
    if data.len() < 4 {
        return Err(PlatenError::Image("image data too short".to_string()));
    }
    if !is_jpeg(data) && !is_png(data) {
        return Err(PlatenError::Image(
            "unsupported image format (expected JPEG or PNG)".to_string(),
        ));
    }

    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| PlatenError::Image(format!("format detection error: {e}")))?;
    let img = reader
        .decode()
        .map_err(|e| PlatenError::Image(format!("failed to decode image: {e}")))?;

    let rgba = img.to_rgba8();
    Ok(LoadedImage {
        width_px: rgba.width(),
        height_px: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_png(rgba: [u8; 4]) -> Vec<u8> {
        let mut img = image::RgbaImage::new(1, 1);
        img.put_pixel(0, 0, image::Rgba(rgba));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 1, 1, image::ColorType::Rgba8)
            .unwrap();
        buf
    }

    #[test]
    fn test_magic_byte_detection() {
        assert!(is_jpeg(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_jpeg(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(is_png(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(!is_png(&[0xFF, 0xD8, 0xFF, 0xE0]));
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(load_image("data:image/png;base64").is_err());
    }

    #[test]
    fn test_too_short_data() {
        assert!(decode_image_bytes(&[0x00, 0x01]).is_err());
    }

    #[test]
    fn test_unsupported_format() {
        assert!(decode_image_bytes(&[0x00, 0x01, 0x02, 0x03, 0x04]).is_err());
    }

    #[test]
    fn test_decode_minimal_png() {
        let buf = encode_png([255, 0, 0, 255]);
        let loaded = decode_image_bytes(&buf).unwrap();
        assert_eq!(loaded.width_px, 1);
        assert_eq!(loaded.height_px, 1);
        assert_eq!(loaded.rgba, vec![255, 0, 0, 255]);
    }

    #[test]
    fn test_decode_minimal_jpeg() {
        let img = image::RgbImage::from_fn(2, 2, |_, _| image::Rgb([0, 128, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 2, image::ColorType::Rgb8)
            .unwrap();

        let loaded = decode_image_bytes(&buf).unwrap();
        assert_eq!(loaded.width_px, 2);
        assert_eq!(loaded.height_px, 2);
        assert_eq!(loaded.rgba.len(), 2 * 2 * 4);
    }

    #[test]
    fn test_base64_data_uri() {
        use base64::Engine;
        let buf = encode_png([0, 255, 0, 255]);
        let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
        let loaded = load_image(&format!("data:image/png;base64,{b64}")).unwrap();
        assert_eq!(loaded.width_px, 1);
        assert_eq!(loaded.height_px, 1);
    }
}
