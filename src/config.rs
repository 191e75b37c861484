use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::brush::{BrushSettings, Tool};
use crate::error::PaintResult;

/// Tunable defaults for a painting session.
///
/// Missing fields fall back to their defaults when deserializing, so older
/// saved configs keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintConfig {
    pub initial_tool: Tool,
    pub brush: BrushSettings,
    /// Factor applied by the zoom in / zoom out buttons
    pub zoom_step: f32,
    /// Idle window before a resize is applied
    pub resize_debounce_ms: f64,
    /// Height of one row in the layer list, used for drag reordering
    pub layer_row_height: f32,
    pub export_prefix: String,
    /// Color the eyedropper reports where the composite is transparent
    pub background: Color32,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            initial_tool: Tool::Pencil,
            brush: BrushSettings::default(),
            zoom_step: 1.2,
            resize_debounce_ms: 100.0,
            layer_row_height: 48.0,
            export_prefix: "drawing".to_owned(),
            background: Color32::WHITE,
        }
    }
}

impl PaintConfig {
    pub fn from_json(text: &str) -> PaintResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> PaintResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
