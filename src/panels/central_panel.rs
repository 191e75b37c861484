use std::collections::BTreeMap;

use egui::{Pos2, Rect};

use crate::PaintApp;
use crate::brush::Tool;
use crate::input::{InputEvent, ModeKind, TouchPoint};
use crate::session::Session;

pub fn central_panel(app: &mut PaintApp, ctx: &egui::Context, now: f64) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none().fill(ctx.style().visuals.extreme_bg_color))
        .show(ctx, |ui| {
            let canvas_rect = ui.available_rect_before_wrap();
            let width = canvas_rect.width().floor().max(0.0) as u32;
            let height = canvas_rect.height().floor().max(0.0) as u32;

            if app.session.is_none() {
                match Session::new(width, height, app.config.clone()) {
                    Ok(session) => app.session = Some(session),
                    Err(err) => {
                        log::debug!("Canvas not ready: {err}");
                        return;
                    }
                }
            }
            let Some(session) = &mut app.session else {
                return;
            };

            // The document follows the canvas size once the window settles
            if (width, height) != session.size() && width > 0 && height > 0 {
                app.resize.request(width, height, now);
            }
            if let Some((width, height)) = app.resize.poll(now) {
                log::info!("Resizing document to {width}x{height}");
                session.resize(width, height);
            }
            if app.resize.is_pending() {
                ctx.request_repaint_after(std::time::Duration::from_millis(
                    app.config.resize_debounce_ms as u64,
                ));
            }

            let response = ui.allocate_rect(canvas_rect, egui::Sense::click_and_drag());

            let events = collect_events(
                ctx,
                canvas_rect,
                &mut app.touches,
                &mut app.pointer_inside,
            );
            for event in &events {
                session.handle_event(event, now);
            }

            // Trackpad pinch and ctrl+scroll
            if let Some(hover) = response.hover_pos() {
                let zoom_delta = ctx.input(|i| i.zoom_delta());
                if zoom_delta != 1.0 {
                    session.zoom_at(zoom_delta, (hover - canvas_rect.min).to_pos2());
                }
            }

            set_cursor(ctx, &response, session);

            session.visible_surface();
            let revision = session.surface_revision();
            if app.uploaded_revision != Some(revision) || app.canvas_texture.is_none() {
                let image = session.visible_surface().to_color_image();
                match &mut app.canvas_texture {
                    Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
                    None => {
                        app.canvas_texture =
                            Some(ctx.load_texture("canvas", image, egui::TextureOptions::NEAREST))
                    }
                }
                app.uploaded_revision = Some(revision);
            }

            let painter = ui.painter_at(canvas_rect);
            if let Some(texture) = &app.canvas_texture {
                let (w, h) = session.size();
                let rect = Rect::from_min_size(canvas_rect.min, egui::vec2(w as f32, h as f32));
                painter.rect_filled(rect, 0.0, app.config.background);
                painter.image(
                    texture.id(),
                    rect,
                    Rect::from_min_max(Pos2::ZERO, egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }

            if !session.interaction().is_idle() {
                ctx.request_repaint();
            }
        });
}

/// Translates this frame's raw egui events into canvas input, in canvas-local
/// coordinates. Pointer events are ignored while fingers are down, so touch
/// emulation does not paint twice.
fn collect_events(
    ctx: &egui::Context,
    canvas_rect: Rect,
    touches: &mut BTreeMap<u64, TouchPoint>,
    pointer_inside: &mut bool,
) -> Vec<InputEvent> {
    let to_local = |pos: Pos2| (pos - canvas_rect.min).to_pos2();
    let mut events = Vec::new();

    ctx.input(|i| {
        for event in &i.events {
            match event {
                egui::Event::Touch {
                    id, phase, pos, force, ..
                } => {
                    let point = TouchPoint {
                        pos: to_local(*pos),
                        force: *force,
                    };
                    match phase {
                        egui::TouchPhase::Start => {
                            if !canvas_rect.contains(*pos) {
                                continue;
                            }
                            touches.insert(id.0, point);
                            events.push(InputEvent::TouchStart {
                                touches: touches.values().copied().collect(),
                            });
                        }
                        egui::TouchPhase::Move => {
                            if let Some(touch) = touches.get_mut(&id.0) {
                                *touch = point;
                                events.push(InputEvent::TouchMove {
                                    touches: touches.values().copied().collect(),
                                });
                            }
                        }
                        egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                            if touches.remove(&id.0).is_some() {
                                events.push(InputEvent::TouchEnd {
                                    touches: touches.values().copied().collect(),
                                });
                            }
                        }
                    }
                }
                _ if !touches.is_empty() => {}
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    modifiers,
                } => {
                    if *pressed {
                        if canvas_rect.contains(*pos) {
                            events.push(InputEvent::PointerDown {
                                pos: to_local(*pos),
                                button: *button,
                                modifiers: *modifiers,
                                pressure: None,
                            });
                        }
                    } else {
                        events.push(InputEvent::PointerUp { pos: to_local(*pos) });
                    }
                }
                egui::Event::PointerMoved(pos) => {
                    let inside = canvas_rect.contains(*pos);
                    if inside {
                        events.push(InputEvent::pointer_move(to_local(*pos)));
                    } else if *pointer_inside {
                        events.push(InputEvent::PointerLeave);
                    }
                    *pointer_inside = inside;
                }
                egui::Event::PointerGone => {
                    if *pointer_inside {
                        events.push(InputEvent::PointerLeave);
                    }
                    *pointer_inside = false;
                }
                _ => {}
            }
        }
    });

    events
}

fn set_cursor(ctx: &egui::Context, response: &egui::Response, session: &Session) {
    if !response.hovered() && session.interaction().is_idle() {
        return;
    }
    let icon = match (session.mode(), session.tool()) {
        (ModeKind::Panning, _) | (ModeKind::DraggingLayerContent, _) => egui::CursorIcon::Grabbing,
        (_, Tool::Pan) => egui::CursorIcon::Grab,
        (_, Tool::Move) => egui::CursorIcon::Move,
        _ => egui::CursorIcon::Crosshair,
    };
    ctx.set_cursor_icon(icon);
}
