//! Upload validation and normalisation for the visual encoder.
//!
//! Uploads arrive in any common format; the encoder always receives an
//! RGB8 PNG so that alpha channels and palettes never reach the model.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use tracing::debug;

use crate::error_handler::EmbedError;

/// `true` if the content type names an image (`image/*`).
pub fn is_image_mime(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    essence
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
        && essence.len() > 6
}

/// Checks the mime hint before any decoding happens.
///
/// # Errors
/// [`EmbedError::InvalidInput`] when `mime` is not an image type.
pub fn ensure_image_mime(mime: &str) -> Result<(), EmbedError> {
    if is_image_mime(mime) {
        Ok(())
    } else {
        Err(EmbedError::InvalidInput(format!(
            "content type '{mime}' is not an image"
        )))
    }
}

/// Decodes arbitrary image bytes and re-encodes them as an RGB8 PNG.
///
/// # Errors
/// [`EmbedError::Encoding`] for empty or undecodable input.
pub fn normalize_to_png(bytes: &[u8]) -> Result<Vec<u8>, EmbedError> {
    if bytes.is_empty() {
        return Err(EmbedError::Encoding("image is empty".into()));
    }

    let img = image::load_from_memory(bytes)
        .map_err(|e| EmbedError::Encoding(format!("cannot decode image: {e}")))?;
    debug!(width = img.width(), height = img.height(), "decoded upload");

    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Cursor::new(Vec::with_capacity(bytes.len()));
    rgb.write_to(&mut out, ImageFormat::Png)
        .map_err(|e| EmbedError::Encoding(format!("cannot re-encode image: {e}")))?;
    Ok(out.into_inner())
}
