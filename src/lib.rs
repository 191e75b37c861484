#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod brush;
pub mod color;
pub mod compositor;
pub mod config;
pub mod debounce;
pub mod error;
pub mod export;
pub mod file_handler;
pub mod import;
pub mod input;
pub mod layer;
pub mod panels;
pub mod session;
pub mod surface;
pub mod texture_manager;
pub mod transform;
pub mod util;

pub use app::PaintApp;
pub use brush::{BrushSettings, Tool};
pub use config::PaintConfig;
pub use error::{PaintError, PaintResult};
pub use input::InputEvent;
pub use layer::{Layer, LayerId, LayerStore};
pub use session::Session;
pub use surface::{PixelBuffer, RasterSurface};
pub use transform::ViewTransform;
