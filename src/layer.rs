use egui::Vec2;
use image::{RgbaImage, imageops};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{PaintError, PaintResult};
use crate::surface::{PixelBuffer, RasterSurface};

/// Stable identity of a layer, independent of its slot in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(Uuid);

impl LayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single raster layer in the document.
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    /// Display name of the layer
    pub name: String,
    /// Hidden layers are skipped by the compositor
    pub visible: bool,
    opacity: u8,
    /// Offset in document space at which the buffer is drawn
    pub position: Vec2,
    buffer: PixelBuffer,
    /// Bumped on every pixel mutation so thumbnails know when to refresh
    revision: u64,
}

impl Layer {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self::with_buffer(name, PixelBuffer::new(width, height))
    }

    fn with_buffer(name: &str, buffer: PixelBuffer) -> Self {
        Self {
            id: LayerId::new(),
            name: name.to_string(),
            visible: true,
            opacity: 100,
            position: Vec2::ZERO,
            buffer,
            revision: 0,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Opacity in percent, 0..=100.
    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: u8) {
        self.opacity = opacity.min(100);
    }

    /// Opacity as a multiplicative alpha factor.
    pub fn alpha(&self) -> f32 {
        f32::from(self.opacity) / 100.0
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Mutable pixel access; counts as a content change.
    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        self.revision += 1;
        &mut self.buffer
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// What the layer list shows for one layer.
#[derive(Debug, Clone, Copy)]
pub struct LayerSummary<'a> {
    pub id: LayerId,
    pub name: &'a str,
    pub visible: bool,
    pub opacity: u8,
    pub revision: u64,
    pub is_active: bool,
    pub thumbnail: &'a PixelBuffer,
}

/// Ordered stack of layers. Index 0 is painted first (bottom-most).
///
/// There is always at least one layer and the active index always points at
/// one of them.
#[derive(Debug, Clone)]
pub struct LayerStore {
    layers: Vec<Layer>,
    active: usize,
    width: u32,
    height: u32,
}

impl LayerStore {
    /// Creates a store holding a single empty "Background" layer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            layers: vec![Layer::new("Background", width, height)],
            active: 0,
            width,
            height,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    pub fn find_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.id == id)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Layer {
        &self.layers[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Layer {
        &mut self.layers[self.active]
    }

    pub fn select(&mut self, index: usize) -> PaintResult<()> {
        self.check_index(index)?;
        self.active = index;
        log::debug!("Active layer is now {} ({})", index, self.layers[index].name);
        Ok(())
    }

    /// Appends a transparent layer at the current document size and makes it active.
    pub fn add_layer(&mut self, name: Option<&str>) -> &Layer {
        let name = self.resolve_name(name);
        let layer = Layer::new(&name, self.width, self.height);
        self.push_active(layer)
    }

    /// Appends a layer holding `image` scaled to fit the document (aspect ratio
    /// preserved, centered) and makes it active.
    pub fn add_layer_from_image(&mut self, image: &RgbaImage, name: Option<&str>) -> &Layer {
        let name = self.resolve_name(name);
        let buffer = fit_image(image, self.width, self.height);
        self.push_active(Layer::with_buffer(&name, buffer))
    }

    /// Removes the layer at `index`. Refuses to remove the last remaining layer.
    ///
    /// Returns whether a layer was removed.
    pub fn remove_layer(&mut self, index: usize) -> bool {
        if self.layers.len() <= 1 {
            log::info!("Refusing to delete the only remaining layer");
            return false;
        }
        if index >= self.layers.len() {
            log::warn!("No layer at index {index} to delete");
            return false;
        }
        let removed = self.layers.remove(index);
        if self.active >= index {
            self.active = self.active.saturating_sub(1);
        }
        log::info!("Deleted layer {:?}; active layer is {}", removed.name, self.active);
        true
    }

    /// Moves the layer at `from` to `to`, keeping the active index on the same
    /// logical layer.
    pub fn reorder(&mut self, from: usize, to: usize) -> PaintResult<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);

        let active = self.active;
        self.active = if active == from {
            to
        } else if from < active && to >= active {
            active - 1
        } else if from > active && to <= active {
            active + 1
        } else {
            active
        };
        log::debug!("Moved layer {from} -> {to}; active layer is {}", self.active);
        Ok(())
    }

    pub fn set_visible(&mut self, index: usize, visible: bool) -> PaintResult<()> {
        self.layer_mut(index)?.visible = visible;
        Ok(())
    }

    /// Sets the opacity in percent; values above 100 saturate.
    pub fn set_opacity(&mut self, index: usize, opacity: u8) -> PaintResult<()> {
        self.layer_mut(index)?.set_opacity(opacity);
        Ok(())
    }

    pub fn set_position(&mut self, index: usize, position: Vec2) -> PaintResult<()> {
        self.layer_mut(index)?.position = position;
        Ok(())
    }

    pub fn rename(&mut self, index: usize, name: &str) -> PaintResult<()> {
        self.layer_mut(index)?.name = name.to_string();
        Ok(())
    }

    pub fn clear(&mut self, index: usize) -> PaintResult<()> {
        self.layer_mut(index)?.buffer_mut().clear();
        Ok(())
    }

    /// Resizes every layer to `width`x`height`, stretching existing content to
    /// fill the new size exactly.
    pub fn resize_all(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        log::info!(
            "Resizing {} layers from {}x{} to {}x{}",
            self.layers.len(),
            self.width,
            self.height,
            width,
            height
        );
        for layer in &mut self.layers {
            layer.buffer_mut().resize(width, height);
        }
        self.width = width;
        self.height = height;
    }

    pub fn summaries(&self) -> Vec<LayerSummary<'_>> {
        self.layers
            .iter()
            .enumerate()
            .map(|(index, layer)| LayerSummary {
                id: layer.id,
                name: &layer.name,
                visible: layer.visible,
                opacity: layer.opacity,
                revision: layer.revision,
                is_active: index == self.active,
                thumbnail: &layer.buffer,
            })
            .collect()
    }

    fn layer_mut(&mut self, index: usize) -> PaintResult<&mut Layer> {
        let len = self.layers.len();
        self.layers
            .get_mut(index)
            .ok_or(PaintError::LayerOutOfRange { index, len })
    }

    fn check_index(&self, index: usize) -> PaintResult<()> {
        if index < self.layers.len() {
            Ok(())
        } else {
            Err(PaintError::LayerOutOfRange {
                index,
                len: self.layers.len(),
            })
        }
    }

    fn resolve_name(&self, name: Option<&str>) -> String {
        match name {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => format!("Layer {}", self.layers.len() + 1),
        }
    }

    fn push_active(&mut self, layer: Layer) -> &Layer {
        log::info!("Added layer {:?}", layer.name);
        self.layers.push(layer);
        self.active = self.layers.len() - 1;
        &self.layers[self.active]
    }
}

/// Scales `image` to fit inside `width`x`height` without distortion and centers it
/// on a transparent buffer of that size.
fn fit_image(image: &RgbaImage, width: u32, height: u32) -> PixelBuffer {
    let mut canvas = RgbaImage::new(width, height);
    if image.width() == 0 || image.height() == 0 || width == 0 || height == 0 {
        return PixelBuffer::from_image(canvas);
    }
    let scale = (width as f32 / image.width() as f32).min(height as f32 / image.height() as f32);
    let fit_w = ((image.width() as f32 * scale).round() as u32).clamp(1, width);
    let fit_h = ((image.height() as f32 * scale).round() as u32).clamp(1, height);
    let scaled = if (fit_w, fit_h) == image.dimensions() {
        image.clone()
    } else {
        imageops::resize(image, fit_w, fit_h, imageops::FilterType::Triangle)
    };
    let x = i64::from((width - fit_w) / 2);
    let y = i64::from((height - fit_h) / 2);
    imageops::replace(&mut canvas, &scaled, x, y);
    PixelBuffer::from_image(canvas)
}
