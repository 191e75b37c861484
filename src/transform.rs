use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 5.0;

/// Pan and zoom of the viewport over the document.
///
/// A document point `d` is shown at screen point `d * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    zoom: f32,
    pan: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    pub fn new(zoom: f32, pan: Vec2) -> Self {
        let zoom = if zoom.is_finite() { zoom.clamp(MIN_ZOOM, MAX_ZOOM) } else { 1.0 };
        Self { zoom, pan }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Maps a screen position to document space.
    pub fn to_document(&self, screen: Pos2) -> Pos2 {
        ((screen.to_vec2() - self.pan) / self.zoom).to_pos2()
    }

    /// Maps a document position to screen space.
    pub fn to_screen(&self, doc: Pos2) -> Pos2 {
        (doc.to_vec2() * self.zoom + self.pan).to_pos2()
    }

    /// Multiplies the zoom by `factor` while keeping the document point under
    /// `pivot` (screen space) fixed on screen.
    ///
    /// The result is clamped to [`MIN_ZOOM`, `MAX_ZOOM`]; non-finite results leave
    /// the view untouched.
    pub fn zoom_at(&mut self, factor: f32, pivot: Pos2) {
        let old_zoom = self.zoom;
        let new_zoom = old_zoom * factor;
        if new_zoom.is_nan() {
            log::warn!("Ignoring zoom request with factor {factor}");
            return;
        }
        let new_zoom = new_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if new_zoom == old_zoom {
            return;
        }
        let pivot = pivot.to_vec2();
        self.pan -= (pivot - self.pan) * (new_zoom / old_zoom - 1.0);
        self.zoom = new_zoom;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
