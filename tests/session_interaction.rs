use egui::{Color32, Modifiers, PointerButton, Pos2, pos2, vec2};
use image::{Rgba, RgbaImage};
use layer_paint::import::FinishedImport;
use layer_paint::input::{ModeKind, TouchPoint, Transition};
use layer_paint::{InputEvent, PaintConfig, PaintError, RasterSurface, Session, Tool};

fn session(width: u32, height: u32) -> Session {
    Session::new(width, height, PaintConfig::default()).unwrap()
}

fn drag(session: &mut Session, points: &[Pos2]) {
    let (first, rest) = points.split_first().unwrap();
    session.handle_event(&InputEvent::primary_down(*first), 0.0);
    for point in rest {
        session.handle_event(&InputEvent::pointer_move(*point), 0.0);
    }
    let last = rest.last().unwrap_or(first);
    session.handle_event(&InputEvent::PointerUp { pos: *last }, 0.0);
}

fn pixel(session: &Session, layer: usize, x: i64, y: i64) -> [u8; 4] {
    session.layers().get(layer).unwrap().buffer().read_pixel(x, y).unwrap()
}

fn touches(points: &[Pos2]) -> Vec<TouchPoint> {
    points.iter().copied().map(TouchPoint::new).collect()
}

#[test]
fn test_zero_size_session_is_rejected() {
    let result = Session::new(0, 10, PaintConfig::default());
    assert!(matches!(result, Err(PaintError::InvalidDimensions { width: 0, height: 10 })));
}

#[test]
fn test_pencil_stroke_paints_active_layer() {
    let mut session = session(20, 20);
    session.set_color(Color32::RED);
    session.set_line_width(4.0);

    drag(&mut session, &[pos2(2.0, 10.0), pos2(18.0, 10.0)]);

    assert_eq!(pixel(&session, 0, 10, 10), [255, 0, 0, 255]);
    assert_eq!(pixel(&session, 0, 10, 2), [0, 0, 0, 0]);
    assert_eq!(session.mode(), ModeKind::Idle);
}

#[test]
fn test_click_without_movement_paints_nothing() {
    let mut session = session(10, 10);
    drag(&mut session, &[pos2(5.0, 5.0)]);
    assert!(session.layers().active().buffer().is_blank());
}

#[test]
fn test_eraser_clears_along_path() {
    let mut session = session(100, 100);
    let black = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
    session.add_layer_from_image(&black, Some("Ink"));
    session.select_tool(Tool::Eraser);
    session.set_line_width(10.0);

    drag(&mut session, &[pos2(10.0, 50.0), pos2(90.0, 50.0)]);

    assert_eq!(pixel(&session, 1, 50, 50)[3], 0);
    assert_eq!(pixel(&session, 1, 50, 54)[3], 0);
    assert_eq!(pixel(&session, 1, 50, 55), [0, 0, 0, 255]);
    assert_eq!(pixel(&session, 1, 50, 30), [0, 0, 0, 255]);
    assert_eq!(pixel(&session, 1, 0, 50), [0, 0, 0, 255]);
}

#[test]
fn test_stroke_stays_on_layer_it_started_on() {
    let mut session = session(20, 20);
    session.add_layer(Some("Top"));
    session.set_line_width(4.0);

    session.handle_event(&InputEvent::primary_down(pos2(2.0, 10.0)), 0.0);
    session.select_layer(0).unwrap();
    session.handle_event(&InputEvent::pointer_move(pos2(18.0, 10.0)), 0.0);
    session.handle_event(&InputEvent::PointerUp { pos: pos2(18.0, 10.0) }, 0.0);

    assert!(session.layers().get(0).unwrap().buffer().is_blank());
    assert_eq!(pixel(&session, 1, 10, 10), [0, 0, 0, 255]);
}

#[test]
fn test_pointer_leave_ends_stroke() {
    let mut session = session(20, 20);
    session.handle_event(&InputEvent::primary_down(pos2(2.0, 2.0)), 0.0);
    assert_eq!(session.mode(), ModeKind::Drawing);
    session.handle_event(&InputEvent::PointerLeave, 0.0);
    assert_eq!(session.mode(), ModeKind::Idle);

    // moves after leaving do not paint
    session.handle_event(&InputEvent::pointer_move(pos2(18.0, 18.0)), 0.0);
    assert!(session.layers().active().buffer().is_blank());
}

#[test]
fn test_pan_tool_drags_view() {
    let mut session = session(50, 50);
    session.select_tool(Tool::Pan);
    drag(&mut session, &[pos2(10.0, 10.0), pos2(20.0, 15.0), pos2(30.0, 25.0)]);

    assert_eq!(session.view().pan(), vec2(20.0, 15.0));
    assert!(session.layers().active().buffer().is_blank());
}

#[test]
fn test_ctrl_drag_pans_with_pencil() {
    let mut session = session(50, 50);
    session.handle_event(
        &InputEvent::PointerDown {
            pos: pos2(5.0, 5.0),
            button: PointerButton::Primary,
            modifiers: Modifiers::CTRL,
            pressure: None,
        },
        0.0,
    );
    assert_eq!(session.mode(), ModeKind::Panning);
    session.handle_event(&InputEvent::pointer_move(pos2(8.0, 1.0)), 0.0);
    assert_eq!(session.view().pan(), vec2(3.0, -4.0));
}

#[test]
fn test_middle_button_pans() {
    let mut session = session(50, 50);
    let transition = session.handle_event(
        &InputEvent::PointerDown {
            pos: pos2(5.0, 5.0),
            button: PointerButton::Middle,
            modifiers: Modifiers::NONE,
            pressure: None,
        },
        0.0,
    );
    assert_eq!(transition, Transition::Enter(ModeKind::Panning));
}

#[test]
fn test_pinch_zooms_about_midpoint() {
    let mut session = session(100, 100);
    session.handle_event(
        &InputEvent::TouchStart {
            touches: touches(&[pos2(40.0, 50.0), pos2(60.0, 50.0)]),
        },
        0.0,
    );
    assert_eq!(session.mode(), ModeKind::PinchZooming);

    session.handle_event(
        &InputEvent::TouchMove {
            touches: touches(&[pos2(30.0, 50.0), pos2(70.0, 50.0)]),
        },
        0.0,
    );
    assert!((session.view().zoom() - 2.0).abs() < 1e-4);
    let under_fingers = session.view().to_document(pos2(50.0, 50.0));
    assert!((under_fingers - pos2(50.0, 50.0)).length() < 1e-3);

    session.handle_event(
        &InputEvent::TouchEnd {
            touches: touches(&[pos2(30.0, 50.0)]),
        },
        0.0,
    );
    assert_eq!(session.mode(), ModeKind::Idle);
    assert!(session.layers().active().buffer().is_blank());
}

#[test]
fn test_zoom_buttons_clamp() {
    let mut session = session(100, 100);
    for _ in 0..50 {
        session.zoom_in();
    }
    assert_eq!(session.view().zoom(), 5.0);
    for _ in 0..50 {
        session.zoom_out();
    }
    assert!((session.view().zoom() - 0.1).abs() < 1e-6);
    session.reset_view();
    assert_eq!(session.view().zoom(), 1.0);
    assert_eq!(session.view().pan(), vec2(0.0, 0.0));
}

#[test]
fn test_move_tool_drags_layer_content() {
    let mut session = session(40, 40);
    session.add_layer(Some("Sticker"));
    session.select_tool(Tool::Move);

    drag(&mut session, &[pos2(10.0, 10.0), pos2(20.0, 20.0), pos2(25.0, 30.0)]);

    assert_eq!(session.layers().active().position, vec2(15.0, 20.0));
    assert_eq!(session.layers().get(0).unwrap().position, vec2(0.0, 0.0));
}

#[test]
fn test_list_drag_reorders_live() {
    let mut session = session(10, 10);
    session.add_layer(Some("A"));
    session.add_layer(Some("B"));
    session.add_layer(Some("C"));
    let background = session.layers().get(0).unwrap().id();
    let active = session.layers().active().id();
    let row = session.config().layer_row_height;

    session.handle_event(&InputEvent::ListPointerDown { index: 0, y: 20.0 }, 0.0);
    assert_eq!(session.mode(), ModeKind::ReorderingLayerList);

    session.handle_event(&InputEvent::ListPointerMove { y: 20.0 + row * 1.1 }, 0.0);
    assert_eq!(session.layers().index_of(background), Some(1));

    session.handle_event(&InputEvent::ListPointerMove { y: 20.0 + row * 2.1 }, 0.0);
    assert_eq!(session.layers().index_of(background), Some(2));

    session.handle_event(&InputEvent::ListPointerUp, 0.0);
    assert_eq!(session.mode(), ModeKind::Idle);
    assert_eq!(session.layers().active().id(), active);
    assert_eq!(session.layers().len(), 4);
}

#[test]
fn test_eyedropper_samples_visible_composite() {
    let mut session = session(10, 10);
    session.add_layer_from_image(&RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])), None);
    session.add_layer_from_image(&RgbaImage::from_pixel(10, 10, Rgba([0, 0, 255, 255])), None);
    session.set_layer_visible(2, false).unwrap();
    session.select_tool(Tool::Eyedropper);

    let transition = session.handle_event(&InputEvent::primary_down(pos2(3.0, 3.0)), 0.0);

    assert_eq!(transition, Transition::Sample);
    assert_eq!(session.brush().color, Color32::from_rgb(255, 0, 0));
    assert_eq!(session.tool(), Tool::Pencil);
    assert_eq!(session.mode(), ModeKind::Idle);
}

#[test]
fn test_eyedropper_on_empty_canvas_picks_background() {
    let mut session = session(10, 10);
    session.set_color(Color32::RED);
    session.select_tool(Tool::Eyedropper);
    session.handle_event(&InputEvent::primary_down(pos2(1.0, 1.0)), 0.0);
    assert_eq!(session.brush().color, Color32::WHITE);
}

#[test]
fn test_clear_requires_confirmation() {
    let mut session = session(10, 10);
    session.add_layer_from_image(&RgbaImage::from_pixel(10, 10, Rgba([0, 255, 0, 255])), None);

    assert!(!session.clear_active_layer(false));
    assert_eq!(pixel(&session, 1, 4, 4), [0, 255, 0, 255]);

    assert!(session.clear_active_layer(true));
    assert!(session.layers().active().buffer().is_blank());
    assert_eq!(session.layers().len(), 2);
}

#[test]
fn test_resize_stretches_layers_and_ignores_zero() {
    let mut session = session(10, 10);
    session.resize(20, 5);
    assert_eq!(session.size(), (20, 5));
    assert_eq!(session.visible_surface().size(), (20, 5));

    session.resize(0, 5);
    assert_eq!(session.size(), (20, 5));
}

#[test]
fn test_visible_surface_tracks_changes() {
    let mut session = session(10, 10);
    session.visible_surface();
    let revision = session.surface_revision();

    session.visible_surface();
    assert_eq!(session.surface_revision(), revision);

    session.set_color(Color32::BLUE);
    session.set_line_width(3.0);
    drag(&mut session, &[pos2(1.0, 5.0), pos2(9.0, 5.0)]);
    assert_eq!(session.visible_surface().read_pixel(5, 5), Some([0, 0, 255, 255]));
    assert!(session.surface_revision() > revision);
}

#[test]
fn test_download_png() {
    let session = session(6, 4);
    let export = session.download_png().unwrap();
    assert!(export.filename.starts_with("drawing-"));
    assert!(export.filename.ends_with(".png"));
    // drawing-YYYY-MM-DD.png
    assert_eq!(export.filename.len(), "drawing-2024-01-01.png".len());

    let decoded = image::load_from_memory(&export.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (6, 4));
}

#[test]
fn test_failed_import_adds_no_layer() {
    let mut session = session(8, 8);
    let finished = vec![
        FinishedImport {
            name: "broken".to_owned(),
            result: layer_paint::import::decode_image(b"not an image"),
        },
        FinishedImport {
            name: "photo".to_owned(),
            result: Ok(RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255]))),
        },
    ];

    assert_eq!(session.apply_imports(finished), 1);
    assert_eq!(session.layers().len(), 2);
    assert_eq!(session.layers().active().name, "photo");
    assert_eq!(pixel(&session, 1, 0, 0), [1, 2, 3, 255]);
}

#[test]
fn test_stroke_opacity_accumulates_per_segment() {
    let mut session = session(40, 40);
    session.set_brush_opacity(50);
    session.set_line_width(6.0);

    drag(&mut session, &[pos2(5.0, 20.0), pos2(20.0, 20.0), pos2(35.0, 20.0)]);

    // covered by one segment only
    let single = pixel(&session, 0, 12, 20)[3];
    assert_eq!(single, 128);
    // both segments overlap at the joint
    let joint = pixel(&session, 0, 20, 20)[3];
    assert!(joint > single);
    assert!((191..=192).contains(&joint));
}

#[test]
fn test_smooth_tool_paints_faintly() {
    let mut session = session(40, 40);
    session.select_tool(Tool::Smooth);
    session.set_color(Color32::RED);
    session.set_line_width(6.0);

    drag(&mut session, &[pos2(5.0, 20.0), pos2(35.0, 20.0)]);

    let [r, g, b, a] = pixel(&session, 0, 20, 20);
    assert_eq!([r, g, b], [255, 0, 0]);
    assert!((70..=85).contains(&a));
    assert_eq!(session.mode(), ModeKind::Idle);
}

#[test]
fn test_blur_tool_paints_soft_edges() {
    let mut session = session(40, 40);
    session.select_tool(Tool::Blur);
    session.set_color(Color32::RED);
    session.set_line_width(8.0);

    drag(&mut session, &[pos2(5.0, 20.0), pos2(35.0, 20.0)]);

    let center = pixel(&session, 0, 20, 20);
    assert_eq!(&center[..3], &[255, 0, 0]);
    assert!(center[3] > 200);

    // outside the hard radius, only the blur reaches
    let edge = pixel(&session, 0, 20, 26)[3];
    assert!(edge > 0);
    assert!(edge < center[3]);
    assert_eq!(pixel(&session, 0, 20, 39)[3], 0);
}

#[test]
fn test_rainbow_color_follows_clock() {
    let mut session = session(20, 20);
    session.set_color(Color32::RED);
    assert!(session.toggle_rainbow());

    // 6000 ms puts the hue at 120 degrees
    let now = 6000.0;
    session.handle_event(&InputEvent::primary_down(pos2(5.0, 10.0)), now);
    session.handle_event(&InputEvent::pointer_move(pos2(15.0, 10.0)), now);
    session.handle_event(&InputEvent::PointerUp { pos: pos2(15.0, 10.0) }, now);

    assert_eq!(pixel(&session, 0, 10, 10), [0, 255, 0, 255]);
}
