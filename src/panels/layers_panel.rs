use crate::PaintApp;
use crate::input::{InputEvent, Interaction, row_rect};
use crate::surface::RasterSurface;
use crate::texture_manager::{THUMBNAIL_EDGE, thumbnail_size};
use crate::util::time;

/// Deferred so rows can be drawn from borrowed layer summaries
enum LayerAction {
    Select(usize),
    SetVisible(usize, bool),
    SetOpacity(usize, u8),
    Rename(usize, String),
    Remove(usize),
    List(InputEvent),
}

pub fn layers_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::right("layers_panel")
        .resizable(true)
        .default_width(240.0)
        .show(ctx, |ui| {
            ui.heading("Layers");

            let PaintApp {
                session,
                thumbnails,
                ..
            } = app;
            let Some(session) = session else {
                return;
            };

            if ui.button("Add layer").clicked() {
                let name = session.add_layer(None).name.clone();
                log::info!("Added {name}");
            }
            ui.separator();

            let row_height = session.config().layer_row_height;
            let can_remove = session.layers().len() > 1;
            let dragged_row = match session.interaction() {
                Interaction::ReorderingLayerList(drag) => Some(drag.index()),
                _ => None,
            };
            let mut actions = Vec::new();

            egui::ScrollArea::vertical().show(ui, |ui| {
                // Rows are exactly `row_height` tall so they line up with the list drag slots
                let summaries = session.layer_summaries();
                let width = ui.available_width();
                let (list_rect, _) = ui.allocate_exact_size(
                    egui::vec2(width, row_height * summaries.len() as f32),
                    egui::Sense::hover(),
                );

                for (index, summary) in summaries.into_iter().enumerate() {
                    let row = row_rect(list_rect.min, width, row_height, index);
                    if !ui.is_rect_visible(row) {
                        continue;
                    }
                    let texture = thumbnails.thumbnail(summary.id, summary.revision, summary.thumbnail, ctx);
                    let [tw, th] = thumbnail_size(summary.thumbnail.size());

                    if dragged_row == Some(index) {
                        ui.painter().rect_filled(
                            row,
                            2.0,
                            ui.visuals().selection.bg_fill.gamma_multiply(0.3),
                        );
                    }
                    if summary.is_active {
                        ui.painter().rect_stroke(
                            row.shrink(0.5),
                            2.0,
                            egui::Stroke::new(1.0, ui.visuals().selection.stroke.color),
                        );
                    }

                    let mut row_ui = ui.new_child(
                        egui::UiBuilder::new()
                            .max_rect(row.shrink2(egui::vec2(4.0, 0.0)))
                            .layout(egui::Layout::left_to_right(egui::Align::Center)),
                    );
                    row_ui.set_clip_rect(row.intersect(ui.clip_rect()));
                    let ui = &mut row_ui;
                    ui.spacing_mut().item_spacing = egui::vec2(6.0, 0.0);

                    let handle = ui
                        .add(egui::Label::new("≡").sense(egui::Sense::drag()))
                        .on_hover_cursor(egui::CursorIcon::Grab);
                    let pointer_y = ctx.pointer_interact_pos().map(|pos| pos.y);
                    if let Some(y) = pointer_y {
                        if handle.drag_started() {
                            actions.push(LayerAction::List(InputEvent::ListPointerDown { index, y }));
                        } else if handle.dragged() {
                            actions.push(LayerAction::List(InputEvent::ListPointerMove { y }));
                        }
                    }
                    if handle.drag_stopped() {
                        actions.push(LayerAction::List(InputEvent::ListPointerUp));
                    }

                    let size = egui::vec2(tw as f32, th as f32);
                    let frame_size = egui::Vec2::splat(THUMBNAIL_EDGE as f32);
                    let (rect, thumb) = ui.allocate_exact_size(frame_size, egui::Sense::click());
                    ui.painter().rect_filled(rect, 2.0, egui::Color32::WHITE);
                    egui::Image::new(egui::load::SizedTexture::new(texture, size))
                        .paint_at(ui, egui::Rect::from_center_size(rect.center(), size));
                    if thumb.on_hover_text("Select layer").clicked() {
                        actions.push(LayerAction::Select(index));
                    }

                    let mut visible = summary.visible;
                    if ui.checkbox(&mut visible, "").on_hover_text("Visible").changed() {
                        actions.push(LayerAction::SetVisible(index, visible));
                    }

                    ui.vertical(|ui| {
                        let mut name = summary.name.to_owned();
                        let name_color = summary.is_active.then(|| ui.visuals().strong_text_color());
                        let name_response = ui.add(
                            egui::TextEdit::singleline(&mut name)
                                .desired_width(110.0)
                                .text_color_opt(name_color),
                        );
                        if name_response.changed() {
                            actions.push(LayerAction::Rename(index, name));
                        }
                        if name_response.gained_focus() && !summary.is_active {
                            actions.push(LayerAction::Select(index));
                        }

                        let mut opacity = summary.opacity;
                        if ui
                            .add(egui::Slider::new(&mut opacity, 0..=100).suffix("%"))
                            .changed()
                        {
                            actions.push(LayerAction::SetOpacity(index, opacity));
                        }
                    });

                    if ui.add_enabled(can_remove, egui::Button::new("🗑")).clicked() {
                        actions.push(LayerAction::Remove(index));
                    }
                }
            });

            let now = time::now_millis();
            for action in actions {
                let result = match action {
                    LayerAction::Select(index) => session.select_layer(index),
                    LayerAction::SetVisible(index, visible) => session.set_layer_visible(index, visible),
                    LayerAction::SetOpacity(index, opacity) => session.set_layer_opacity(index, opacity),
                    LayerAction::Rename(index, name) => session.rename_layer(index, &name),
                    LayerAction::Remove(index) => {
                        if !session.remove_layer(index) {
                            log::warn!("Cannot remove the last layer");
                        }
                        Ok(())
                    }
                    LayerAction::List(event) => {
                        session.handle_event(&event, now);
                        Ok(())
                    }
                };
                if let Err(err) = result {
                    log::warn!("Layer action failed: {err}");
                }
            }
        });
}
