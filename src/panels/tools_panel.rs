use crate::PaintApp;
use crate::brush::Tool;
use crate::color::{parse_hex, to_hex};

pub fn tools_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(180.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let Some(session) = &mut app.session else {
                ui.label("Preparing canvas...");
                return;
            };

            let active_tool = session.tool();
            for tool in Tool::ALL {
                if ui.selectable_label(active_tool == tool, tool.name()).clicked() {
                    log::info!("Tool selected from UI: {}", tool.name());
                    session.select_tool(tool);
                }
            }
            ui.separator();

            // Brush parameters
            let mut brush = *session.brush();
            ui.horizontal(|ui| {
                ui.label("Color");
                if ui
                    .color_edit_button_srgba(&mut brush.color)
                    .changed()
                {
                    session.set_color(brush.color);
                }

                let hex = ui.add(egui::TextEdit::singleline(&mut app.hex_input).desired_width(70.0));
                if hex.lost_focus() {
                    match parse_hex(&app.hex_input) {
                        Ok(color) => session.set_color(color),
                        Err(err) => app.status = Some(err.to_string()),
                    }
                }
                if !hex.has_focus() {
                    app.hex_input = to_hex(session.brush().color);
                }
            });
            if ui
                .add(egui::Slider::new(&mut brush.line_width, 1.0..=50.0).text("Width"))
                .changed()
            {
                session.set_line_width(brush.line_width);
            }
            if ui
                .add(egui::Slider::new(&mut brush.opacity, 0..=100).text("Opacity").suffix("%"))
                .changed()
            {
                session.set_brush_opacity(brush.opacity);
            }
            if ui.selectable_label(brush.rainbow, "Rainbow").clicked() {
                session.toggle_rainbow();
            }
            ui.separator();

            // View
            ui.horizontal(|ui| {
                if ui.button("-").on_hover_text("Zoom out").clicked() {
                    session.zoom_out();
                }
                ui.label(format!("{:.0}%", session.view().zoom() * 100.0));
                if ui.button("+").on_hover_text("Zoom in").clicked() {
                    session.zoom_in();
                }
                if ui.button("Reset").clicked() {
                    session.reset_view();
                }
            });
            ui.separator();

            if ui.button("Clear layer").clicked() {
                app.confirm_clear = true;
            }
            let download = ui.button("Download PNG").clicked();
            ui.label(format!("Mode: {}", session.mode().name()));

            if download {
                app.download();
            }
            if let Some(status) = &app.status {
                ui.small(status.as_str());
            }
        });
}

/// Asks before wiping the active layer.
pub fn confirm_clear_dialog(app: &mut PaintApp, ctx: &egui::Context) {
    if !app.confirm_clear {
        return;
    }

    let mut confirmed = None;
    egui::Window::new("Clear layer?")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label("This erases everything on the active layer.");
            ui.horizontal(|ui| {
                if ui.button("Clear").clicked() {
                    confirmed = Some(true);
                }
                if ui.button("Cancel").clicked() {
                    confirmed = Some(false);
                }
            });
        });

    if let Some(confirmed) = confirmed {
        if let Some(session) = &mut app.session {
            session.clear_active_layer(confirmed);
        }
        app.confirm_clear = false;
    }
}
