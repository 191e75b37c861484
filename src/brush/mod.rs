use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::color;

mod raster;
mod stroke;

pub use raster::{draw_segment, segment_distance};
pub use stroke::StrokeInProgress;

/// Pressure reported for devices that have no pressure sensor (mouse).
pub const DEFAULT_PRESSURE: f32 = 0.5;

/// Alpha multiplier of the smooth brush relative to the configured opacity.
const SMOOTH_ALPHA_FACTOR: f32 = 0.3;

/// Every tool the user can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
    Blur,
    Smooth,
    Eyedropper,
    Pan,
    Move,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::Pencil,
        Tool::Eraser,
        Tool::Blur,
        Tool::Smooth,
        Tool::Eyedropper,
        Tool::Pan,
        Tool::Move,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pencil => "Pencil",
            Tool::Eraser => "Eraser",
            Tool::Blur => "Blur",
            Tool::Smooth => "Smooth",
            Tool::Eyedropper => "Eyedropper",
            Tool::Pan => "Pan",
            Tool::Move => "Move",
        }
    }

    /// Tools that rasterize a stroke into the active layer.
    pub fn paints(&self) -> bool {
        matches!(self, Tool::Pencil | Tool::Eraser | Tool::Blur | Tool::Smooth)
    }
}

/// User-adjustable brush parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    pub color: Color32,
    pub line_width: f32,
    /// Percent, 0..=100
    pub opacity: u8,
    pub rainbow: bool,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            color: Color32::BLACK,
            line_width: 5.0,
            opacity: 100,
            rainbow: false,
        }
    }
}

/// How stroke coverage is combined with the layer's existing pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOp {
    SourceOver,
    DestinationOut,
}

/// Fully resolved parameters for rasterizing one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub op: CompositeOp,
    pub color: Color32,
    pub width: f32,
    pub alpha: f32,
    /// Gaussian sigma applied to the stroke mask, if any
    pub blur: Option<f32>,
}

/// Maps device pressure to an intensity multiplier; the no-sensor default of
/// 0.5 is neutral.
pub fn pressure_factor(pressure: f32) -> f32 {
    if pressure.is_finite() {
        pressure.clamp(0.0, 1.0) / DEFAULT_PRESSURE
    } else {
        1.0
    }
}

/// Resolves the style for a segment painted with `tool` at time `now_millis`.
///
/// Returns `None` for tools that do not paint.
pub fn resolve_style(
    tool: Tool,
    settings: &BrushSettings,
    pressure: f32,
    now_millis: f64,
) -> Option<StrokeStyle> {
    let factor = pressure_factor(pressure);
    let base_alpha = f32::from(settings.opacity.min(100)) / 100.0;
    let alpha = (base_alpha * factor).clamp(0.0, 1.0);
    let paint_color = if settings.rainbow {
        color::rainbow_color(now_millis)
    } else {
        settings.color
    };
    let width = settings.line_width.max(0.0);

    let style = match tool {
        Tool::Pencil => StrokeStyle {
            op: CompositeOp::SourceOver,
            color: paint_color,
            width,
            alpha,
            blur: None,
        },
        Tool::Eraser => StrokeStyle {
            op: CompositeOp::DestinationOut,
            color: Color32::BLACK,
            width,
            alpha,
            blur: None,
        },
        Tool::Blur => StrokeStyle {
            op: CompositeOp::SourceOver,
            color: settings.color,
            width,
            alpha,
            blur: Some(width / 4.0 * factor),
        },
        Tool::Smooth => StrokeStyle {
            op: CompositeOp::SourceOver,
            color: paint_color,
            width,
            alpha: (base_alpha * SMOOTH_ALPHA_FACTOR * factor).clamp(0.0, 1.0),
            blur: None,
        },
        Tool::Eyedropper | Tool::Pan | Tool::Move => return None,
    };
    Some(style)
}
