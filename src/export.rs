use chrono::NaiveDate;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;

use crate::error::{PaintError, PaintResult};
use crate::surface::{PixelBuffer, RasterSurface};

/// A finished PNG export, ready for the host to save or download.
#[derive(Debug, Clone)]
pub struct ExportedPng {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// `{prefix}-YYYY-MM-DD.png`
pub fn export_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}.png", prefix, date.format("%Y-%m-%d"))
}

/// Today's export filename in local time.
pub fn today_filename(prefix: &str) -> String {
    export_filename(prefix, chrono::Local::now().date_naive())
}

pub fn encode_png(buffer: &PixelBuffer) -> PaintResult<Vec<u8>> {
    let (width, height) = buffer.size();
    if width == 0 || height == 0 {
        return Err(PaintError::InvalidDimensions { width, height });
    }
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(buffer.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .map_err(|err| PaintError::Encode(err.to_string()))?;
    Ok(bytes)
}
