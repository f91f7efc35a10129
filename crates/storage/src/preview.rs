//! Preview derivation: decode, downscale to a bounded edge, re-encode.

use std::io::Cursor;

use deckgen_core::image::{ImageData, MIME_PNG};
use deckgen_pipeline::ImageStoreError;

/// Longest edge of a derived preview, in pixels.
pub const PREVIEW_MAX_EDGE: u32 = 384;

/// Downscale a full-resolution image into a PNG preview whose longest
/// edge is at most `max_edge`.  Aspect ratio is preserved; images already
/// small enough are only re-encoded.
pub fn derive_preview(source: &ImageData, max_edge: u32) -> Result<ImageData, ImageStoreError> {
    let bytes = source
        .decode()
        .map_err(|e| ImageStoreError::Codec(e.to_string()))?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| ImageStoreError::Codec(format!("Failed to decode image: {e}")))?;

    let thumbnail = decoded.thumbnail(max_edge, max_edge);

    let mut out = Cursor::new(Vec::new());
    thumbnail
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| ImageStoreError::Codec(format!("Failed to encode preview: {e}")))?;

    Ok(ImageData::encode(out.get_ref(), MIME_PNG))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encode a solid-color PNG of the given size as base64 image data.
    fn png_image(width: u32, height: u32) -> ImageData {
        let buffer = image::RgbImage::from_pixel(width, height, image::Rgb([12, 34, 56]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(buffer)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        ImageData::encode(out.get_ref(), MIME_PNG)
    }

    #[test]
    fn preview_is_bounded_and_keeps_aspect_ratio() {
        let preview = derive_preview(&png_image(1600, 900), PREVIEW_MAX_EDGE).unwrap();
        let decoded = image::load_from_memory(&preview.decode().unwrap()).unwrap();
        assert_eq!(decoded.width(), PREVIEW_MAX_EDGE);
        assert_eq!(decoded.height(), PREVIEW_MAX_EDGE * 9 / 16);
        assert_eq!(preview.mime_type, MIME_PNG);
    }

    #[test]
    fn small_images_are_not_upscaled() {
        let preview = derive_preview(&png_image(100, 60), PREVIEW_MAX_EDGE).unwrap();
        let decoded = image::load_from_memory(&preview.decode().unwrap()).unwrap();
        assert_eq!(decoded.width(), 100);
        assert_eq!(decoded.height(), 60);
    }

    #[test]
    fn garbage_payload_is_a_codec_error() {
        let bogus = ImageData::encode(b"not an image at all", MIME_PNG);
        let err = derive_preview(&bogus, PREVIEW_MAX_EDGE).unwrap_err();
        assert!(matches!(err, ImageStoreError::Codec(_)));
    }
}
