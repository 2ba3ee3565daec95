use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::{debug, warn};

use crate::utils::errors::{Result, RosterError};

/// Resize a photo to at most `max_width` pixels wide and re-encode it as JPEG.
pub fn compress_to_jpeg(bytes: &[u8], max_width: u32, quality: u8) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| RosterError::InvalidInput(format!("Failed to decode image: {}", e)))?;

    let resized = if max_width > 0 && img.width() > max_width {
        img.resize(max_width, u32::MAX, FilterType::Triangle)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
    let mut output = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|e| RosterError::InvalidInput(format!("Failed to encode image: {}", e)))?;

    debug!(
        "Compressed photo from {} to {} bytes ({}x{})",
        bytes.len(),
        output.len(),
        rgb.width(),
        rgb.height()
    );
    Ok(output)
}

/// Produce the base64 payload stored inline on the player record.
///
/// Falls back to the raw file bytes when the image cannot be decoded.
pub async fn encode_inline_photo(bytes: Vec<u8>, max_width: u32, quality: u8) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let payload = match compress_to_jpeg(&bytes, max_width, quality) {
            Ok(jpeg) => jpeg,
            Err(e) => {
                warn!("Storing photo without compression: {}", e);
                bytes
            }
        };
        STANDARD.encode(payload)
    })
    .await
    .map_err(|e| RosterError::InvalidInput(format!("Photo encoding task failed: {}", e)))
}
