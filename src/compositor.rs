use egui::{Pos2, Rect, pos2};

use crate::layer::{Layer, LayerStore};
use crate::surface::{PixelBuffer, RasterSurface, Rgba, TRANSPARENT, source_over};
use crate::transform::ViewTransform;

/// Renders the document as seen through `view` into `target` (screen space).
///
/// Layers are painted bottom to top; hidden layers are skipped and each layer's
/// opacity scales its alpha.
pub fn render_visible(store: &LayerStore, view: &ViewTransform, target: &mut PixelBuffer) {
    target.clear();
    for layer in store.layers().iter().filter(|layer| layer.visible) {
        draw_layer(target, layer, view);
    }
}

/// Renders the document at 1:1 with no pan, sized to the document.
pub fn render_export(store: &LayerStore) -> PixelBuffer {
    let (width, height) = store.size();
    let mut target = PixelBuffer::new(width, height);
    let identity = ViewTransform::default();
    for layer in store.layers().iter().filter(|layer| layer.visible) {
        let position = layer.position;
        if position.x.fract() == 0.0 && position.y.fract() == 0.0 {
            // whole-pixel offsets map one to one
            target.draw_surface(layer.buffer(), position.x as i64, position.y as i64, layer.alpha());
        } else {
            draw_layer(&mut target, layer, &identity);
        }
    }
    target
}

/// Composite color of the document at a single document-space point.
pub fn composite_pixel(store: &LayerStore, doc: Pos2) -> Rgba {
    store
        .layers()
        .iter()
        .filter(|layer| layer.visible)
        .fold(TRANSPARENT, |base, layer| match layer_pixel(layer, doc) {
            Some(top) if top[3] > 0 => source_over(base, top, layer.alpha()),
            _ => base,
        })
}

/// The layer pixel covering document point `doc`, if any.
fn layer_pixel(layer: &Layer, doc: Pos2) -> Option<Rgba> {
    let local = doc - layer.position;
    layer
        .buffer()
        .read_pixel(local.x.floor() as i64, local.y.floor() as i64)
}

fn draw_layer(target: &mut PixelBuffer, layer: &Layer, view: &ViewTransform) {
    let alpha = layer.alpha();
    if alpha <= 0.0 {
        return;
    }
    let (w, h) = layer.buffer().size();
    let doc_rect = Rect::from_min_size(layer.position.to_pos2(), egui::vec2(w as f32, h as f32));
    let screen_rect = Rect::from_min_max(view.to_screen(doc_rect.min), view.to_screen(doc_rect.max))
        .intersect(Rect::from_min_max(
            Pos2::ZERO,
            pos2(target.width() as f32, target.height() as f32),
        ));
    if !screen_rect.is_positive() {
        return;
    }

    let x0 = screen_rect.min.x.floor() as i64;
    let y0 = screen_rect.min.y.floor() as i64;
    let x1 = screen_rect.max.x.ceil() as i64;
    let y1 = screen_rect.max.y.ceil() as i64;
    for y in y0..y1 {
        for x in x0..x1 {
            let doc = view.to_document(pos2(x as f32 + 0.5, y as f32 + 0.5));
            let Some(top) = layer_pixel(layer, doc) else {
                continue;
            };
            if top[3] == 0 {
                continue;
            }
            if let Some(base) = target.read_pixel(x, y) {
                target.write_pixel(x, y, source_over(base, top, alpha));
            }
        }
    }
}
