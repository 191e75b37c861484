use thiserror::Error;

/// Errors surfaced by the painting core.
///
/// Operations that saturate or silently refuse (zoom clamping,
/// deleting the last layer, an unconfirmed clear) never produce one of these.
#[derive(Error, Debug)]
pub enum PaintError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Failed to encode PNG: {0}")]
    Encode(String),

    #[error("Invalid surface dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Layer index {index} out of range ({len} layers)")]
    LayerOutOfRange { index: usize, len: usize },

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid color {0:?}")]
    InvalidColor(String),

    #[error("Image import was dropped before decoding finished")]
    ImportCancelled,
}

pub type PaintResult<T> = Result<T, PaintError>;
