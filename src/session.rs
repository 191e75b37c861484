use egui::{Color32, Pos2, Vec2, pos2};
use image::RgbaImage;

use crate::brush::{BrushSettings, DEFAULT_PRESSURE, StrokeInProgress, Tool};
use crate::compositor;
use crate::config::PaintConfig;
use crate::error::{PaintError, PaintResult};
use crate::export::{self, ExportedPng};
use crate::import::FinishedImport;
use crate::input::{InputEvent, Interaction, ListDrag, ModeKind, Transition, dispatch, pinch_geometry};
use crate::layer::{Layer, LayerStore, LayerSummary};
use crate::surface::{PixelBuffer, RasterSurface, source_over};
use crate::transform::ViewTransform;

/// One open document and everything the user is doing with it.
///
/// All mutation goes through `&mut self`; there is no shared or global state.
pub struct Session {
    config: PaintConfig,
    layers: LayerStore,
    view: ViewTransform,
    brush: BrushSettings,
    tool: Tool,
    interaction: Interaction,
    /// Screen-space composite shown to the user
    visible: PixelBuffer,
    needs_render: bool,
    /// Bumped every time `visible` is re-rendered
    surface_revision: u64,
}

impl Session {
    pub fn new(width: u32, height: u32, config: PaintConfig) -> PaintResult<Self> {
        if width == 0 || height == 0 {
            return Err(PaintError::InvalidDimensions { width, height });
        }
        log::info!("New {width}x{height} document");
        Ok(Self {
            layers: LayerStore::new(width, height),
            view: ViewTransform::default(),
            brush: config.brush,
            tool: config.initial_tool,
            interaction: Interaction::Idle,
            visible: PixelBuffer::new(width, height),
            needs_render: true,
            surface_revision: 0,
            config,
        })
    }

    pub fn config(&self) -> &PaintConfig {
        &self.config
    }

    pub fn size(&self) -> (u32, u32) {
        self.layers.size()
    }

    pub fn layers(&self) -> &LayerStore {
        &self.layers
    }

    pub fn layer_summaries(&self) -> Vec<LayerSummary<'_>> {
        self.layers.summaries()
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn mode(&self) -> ModeKind {
        self.interaction.kind()
    }

    // --- Tool parameters ---

    pub fn select_tool(&mut self, tool: Tool) {
        if tool != self.tool {
            log::info!("Tool changed: {} -> {}", self.tool.name(), tool.name());
            self.tool = tool;
        }
    }

    pub fn set_color(&mut self, color: Color32) {
        self.brush.color = color;
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.brush.line_width = width.max(0.0);
    }

    pub fn set_brush_opacity(&mut self, opacity: u8) {
        self.brush.opacity = opacity.min(100);
    }

    pub fn toggle_rainbow(&mut self) -> bool {
        self.brush.rainbow = !self.brush.rainbow;
        log::debug!("Rainbow mode {}", if self.brush.rainbow { "on" } else { "off" });
        self.brush.rainbow
    }

    // --- View ---

    pub fn zoom_at(&mut self, factor: f32, pivot: Pos2) {
        self.view.zoom_at(factor, pivot);
        self.needs_render = true;
    }

    /// Zooms in by the configured step about the center of the canvas.
    pub fn zoom_in(&mut self) {
        self.zoom_at(self.config.zoom_step, self.canvas_center());
    }

    pub fn zoom_out(&mut self) {
        self.zoom_at(1.0 / self.config.zoom_step, self.canvas_center());
    }

    pub fn reset_view(&mut self) {
        self.view.reset();
        self.needs_render = true;
    }

    fn canvas_center(&self) -> Pos2 {
        let (w, h) = self.visible.size();
        pos2(w as f32 / 2.0, h as f32 / 2.0)
    }

    // --- Layers ---

    pub fn add_layer(&mut self, name: Option<&str>) -> &Layer {
        self.needs_render = true;
        self.layers.add_layer(name)
    }

    pub fn add_layer_from_image(&mut self, image: &RgbaImage, name: Option<&str>) -> &Layer {
        self.needs_render = true;
        self.layers.add_layer_from_image(image, name)
    }

    /// Turns finished decodes into layers; failures are logged and skipped.
    pub fn apply_imports(&mut self, finished: Vec<FinishedImport>) -> usize {
        let mut added = 0;
        for import in finished {
            match import.result {
                Ok(image) => {
                    self.add_layer_from_image(&image, Some(&import.name));
                    added += 1;
                }
                Err(err) => log::error!("Could not import {}: {}", import.name, err),
            }
        }
        added
    }

    pub fn remove_layer(&mut self, index: usize) -> bool {
        let removed = self.layers.remove_layer(index);
        self.needs_render |= removed;
        removed
    }

    pub fn reorder_layers(&mut self, from: usize, to: usize) -> PaintResult<()> {
        self.layers.reorder(from, to)?;
        self.needs_render = true;
        Ok(())
    }

    pub fn select_layer(&mut self, index: usize) -> PaintResult<()> {
        self.layers.select(index)
    }

    pub fn set_layer_visible(&mut self, index: usize, visible: bool) -> PaintResult<()> {
        self.layers.set_visible(index, visible)?;
        self.needs_render = true;
        Ok(())
    }

    pub fn set_layer_opacity(&mut self, index: usize, opacity: u8) -> PaintResult<()> {
        self.layers.set_opacity(index, opacity)?;
        self.needs_render = true;
        Ok(())
    }

    pub fn set_layer_position(&mut self, index: usize, position: Vec2) -> PaintResult<()> {
        self.layers.set_position(index, position)?;
        self.needs_render = true;
        Ok(())
    }

    pub fn rename_layer(&mut self, index: usize, name: &str) -> PaintResult<()> {
        self.layers.rename(index, name)
    }

    /// Erases the active layer. Destructive, so the caller must have obtained
    /// the user's confirmation; without it nothing happens.
    pub fn clear_active_layer(&mut self, confirmed: bool) -> bool {
        if !confirmed {
            log::debug!("Clear layer not confirmed");
            return false;
        }
        let index = self.layers.active_index();
        if let Err(err) = self.layers.clear(index) {
            log::warn!("Clear layer failed: {err}");
            return false;
        }
        log::info!("Cleared layer {index}");
        self.needs_render = true;
        true
    }

    /// Resizes the document, stretching every layer's content.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("Ignoring resize to {width}x{height}");
            return;
        }
        if (width, height) == self.size() {
            return;
        }
        self.layers.resize_all(width, height);
        self.visible = PixelBuffer::new(width, height);
        self.needs_render = true;
    }

    // --- Input ---

    /// Feeds one input event through the interaction state machine.
    pub fn handle_event(&mut self, event: &InputEvent, now_millis: f64) -> Transition {
        let transition = dispatch(self.interaction.kind(), event, self.tool);
        match transition {
            Transition::Ignore => {}
            Transition::Enter(kind) => {
                self.end_interaction();
                self.enter(kind, event);
            }
            Transition::Update => self.update(event, now_millis),
            Transition::Sample => {
                self.end_interaction();
                if let Some(pos) = primary_position(event) {
                    let doc = self.view.to_document(pos);
                    self.sample_color(doc);
                }
            }
            Transition::Exit => self.end_interaction(),
        }
        transition
    }

    fn enter(&mut self, kind: ModeKind, event: &InputEvent) {
        let interaction = match (kind, event) {
            (ModeKind::PinchZooming, InputEvent::TouchStart { touches }) if touches.len() >= 2 => {
                let (_, distance) = pinch_geometry(touches[0].pos, touches[1].pos);
                Interaction::PinchZooming {
                    last_distance: distance,
                }
            }
            (ModeKind::ReorderingLayerList, InputEvent::ListPointerDown { index, y }) => {
                if *index >= self.layers.len() {
                    return;
                }
                Interaction::ReorderingLayerList(ListDrag::new(*index, *y, self.config.layer_row_height))
            }
            (kind, event) => {
                let Some(pos) = primary_position(event) else {
                    return;
                };
                match kind {
                    ModeKind::Drawing => {
                        let doc = self.view.to_document(pos);
                        let layer = self.layers.active().id();
                        Interaction::Drawing(StrokeInProgress::begin(layer, self.tool, doc))
                    }
                    ModeKind::Panning => Interaction::Panning { last_screen: pos },
                    ModeKind::DraggingLayerContent => {
                        let doc = self.view.to_document(pos);
                        let layer = self.layers.active();
                        Interaction::DraggingLayerContent {
                            layer: layer.id(),
                            grab_offset: doc.to_vec2() - layer.position,
                        }
                    }
                    _ => return,
                }
            }
        };
        log::debug!("Interaction: {}", interaction.kind().name());
        self.interaction = interaction;
    }

    fn update(&mut self, event: &InputEvent, now_millis: f64) {
        let mut finished = false;
        match &mut self.interaction {
            Interaction::Idle => {}
            Interaction::Drawing(stroke) => {
                if let Some(pos) = primary_position(event) {
                    let doc = self.view.to_document(pos);
                    let pressure = primary_pressure(event).unwrap_or(DEFAULT_PRESSURE);
                    finished = !stroke.extend_to(&mut self.layers, doc, &self.brush, pressure, now_millis);
                    self.needs_render = true;
                }
            }
            Interaction::Panning { last_screen } => {
                if let Some(pos) = primary_position(event) {
                    self.view.pan_by(pos - *last_screen);
                    *last_screen = pos;
                    self.needs_render = true;
                }
            }
            Interaction::PinchZooming { last_distance } => {
                if let InputEvent::TouchMove { touches } = event {
                    if touches.len() >= 2 {
                        let (mid, distance) = pinch_geometry(touches[0].pos, touches[1].pos);
                        if *last_distance > 0.0 && distance > 0.0 {
                            self.view.zoom_at(distance / *last_distance, mid);
                            self.needs_render = true;
                        }
                        *last_distance = distance;
                    }
                }
            }
            Interaction::DraggingLayerContent { layer, grab_offset } => {
                if let Some(pos) = primary_position(event) {
                    let doc = self.view.to_document(pos);
                    match self.layers.find_mut(*layer) {
                        Some(target) => {
                            target.position = doc.to_vec2() - *grab_offset;
                            self.needs_render = true;
                        }
                        None => finished = true,
                    }
                }
            }
            Interaction::ReorderingLayerList(drag) => {
                if let InputEvent::ListPointerMove { y } = event {
                    for (from, to) in drag.update(*y, self.layers.len()) {
                        if let Err(err) = self.layers.reorder(from, to) {
                            log::warn!("Layer reorder failed: {err}");
                        }
                        self.needs_render = true;
                    }
                }
            }
        }
        if finished {
            self.end_interaction();
        }
    }

    fn end_interaction(&mut self) {
        match &self.interaction {
            Interaction::Idle => {}
            Interaction::Drawing(stroke) => log::debug!(
                "{} stroke on layer {} ended at ({:.1}, {:.1})",
                stroke.tool().name(),
                stroke.layer(),
                stroke.last_point().x,
                stroke.last_point().y
            ),
            other => log::debug!("Interaction {} ended", other.kind().name()),
        }
        self.interaction = Interaction::Idle;
    }

    // --- Eyedropper ---

    /// Picks the composite color at a document point, makes it the paint color
    /// and switches back to the pencil.
    pub fn sample_color(&mut self, doc: Pos2) -> Color32 {
        let [r, g, b, a] = compositor::composite_pixel(&self.layers, doc);
        let background = self.config.background.to_srgba_unmultiplied();
        let [r, g, b, _] = source_over(background, [r, g, b, 255], f32::from(a) / 255.0);
        let color = Color32::from_rgb(r, g, b);
        log::info!("Sampled {} at ({:.1}, {:.1})", crate::color::to_hex(color), doc.x, doc.y);
        self.brush.color = color;
        self.select_tool(Tool::Pencil);
        color
    }

    // --- Output ---

    /// The screen-space composite, re-rendered if anything changed since the last call.
    pub fn visible_surface(&mut self) -> &PixelBuffer {
        if self.needs_render {
            compositor::render_visible(&self.layers, &self.view, &mut self.visible);
            self.needs_render = false;
            self.surface_revision += 1;
        }
        &self.visible
    }

    /// Changes whenever [`Self::visible_surface`] produced new pixels.
    pub fn surface_revision(&self) -> u64 {
        self.surface_revision
    }

    /// The document at 1:1, independent of pan and zoom.
    pub fn render_export(&self) -> PixelBuffer {
        compositor::render_export(&self.layers)
    }

    /// Encodes the export surface as a PNG named after today's date.
    pub fn download_png(&self) -> PaintResult<ExportedPng> {
        let bytes = export::encode_png(&self.render_export())?;
        let filename = export::today_filename(&self.config.export_prefix);
        log::info!("Exported {} ({} bytes)", filename, bytes.len());
        Ok(ExportedPng { filename, bytes })
    }
}

/// Screen position of the pointer or first touch carried by `event`.
fn primary_position(event: &InputEvent) -> Option<Pos2> {
    match event {
        InputEvent::PointerDown { pos, .. }
        | InputEvent::PointerMove { pos, .. }
        | InputEvent::PointerUp { pos } => Some(*pos),
        InputEvent::TouchStart { touches }
        | InputEvent::TouchMove { touches }
        | InputEvent::TouchEnd { touches } => touches.first().map(|touch| touch.pos),
        _ => None,
    }
}

fn primary_pressure(event: &InputEvent) -> Option<f32> {
    match event {
        InputEvent::PointerDown { pressure, .. } | InputEvent::PointerMove { pressure, .. } => *pressure,
        InputEvent::TouchStart { touches } | InputEvent::TouchMove { touches } => {
            touches.first().and_then(|touch| touch.force)
        }
        _ => None,
    }
}
