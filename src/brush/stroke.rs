use egui::Pos2;

use super::{BrushSettings, Tool, draw_segment, resolve_style};
use crate::layer::{LayerId, LayerStore};

/// A stroke between pointer-down and pointer-up.
///
/// The target layer is captured by identity when the stroke begins, so
/// selecting another layer, reordering or resizing mid-stroke never redirects
/// paint.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeInProgress {
    layer: LayerId,
    tool: Tool,
    last_point: Pos2,
}

impl StrokeInProgress {
    pub fn begin(layer: LayerId, tool: Tool, start: Pos2) -> Self {
        Self {
            layer,
            tool,
            last_point: start,
        }
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Last point in document space.
    pub fn last_point(&self) -> Pos2 {
        self.last_point
    }

    /// Paints the segment from the previous point to `point` (document space).
    ///
    /// Opacity is applied per segment, so overlapping segments of one stroke
    /// blend with each other. Returns false once the target layer no longer exists.
    pub fn extend_to(
        &mut self,
        store: &mut LayerStore,
        point: Pos2,
        settings: &BrushSettings,
        pressure: f32,
        now_millis: f64,
    ) -> bool {
        let Some(layer) = store.find_mut(self.layer) else {
            log::debug!("Stroke target {} is gone", self.layer);
            return false;
        };
        if let Some(style) = resolve_style(self.tool, settings, pressure, now_millis) {
            let offset = layer.position;
            draw_segment(layer.buffer_mut(), self.last_point - offset, point - offset, &style);
        }
        self.last_point = point;
        true
    }
}

#[cfg(test)]
mod tests {
    use egui::pos2;

    use super::*;

    #[test]
    fn test_extend_advances_last_point_on_captured_layer() {
        let mut store = LayerStore::new(20, 20);
        let target = store.active().id();
        let mut stroke = StrokeInProgress::begin(target, Tool::Pencil, pos2(2.0, 10.0));

        // a new active layer must not redirect the stroke
        store.add_layer(None);
        assert!(stroke.extend_to(&mut store, pos2(12.0, 10.0), &BrushSettings::default(), 0.5, 0.0));

        assert_eq!(stroke.last_point(), pos2(12.0, 10.0));
        assert_eq!(stroke.tool(), Tool::Pencil);
        assert_eq!(stroke.layer(), target);
        assert!(!store.layers()[0].buffer().is_blank());
        assert!(store.layers()[1].buffer().is_blank());
    }

    #[test]
    fn test_extend_fails_once_target_is_removed() {
        let mut store = LayerStore::new(8, 8);
        store.add_layer(None);
        let mut stroke = StrokeInProgress::begin(store.active().id(), Tool::Eraser, pos2(1.0, 1.0));
        assert!(store.remove_layer(1));

        assert!(!stroke.extend_to(&mut store, pos2(5.0, 5.0), &BrushSettings::default(), 0.5, 0.0));
        assert_eq!(stroke.last_point(), pos2(1.0, 1.0));
    }
}
