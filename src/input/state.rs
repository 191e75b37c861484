use egui::{PointerButton, Pos2, Vec2};

use super::{InputEvent, ListDrag};
use crate::brush::{StrokeInProgress, Tool};
use crate::layer::LayerId;

/// Which interaction is in progress. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeKind {
    #[default]
    Idle,
    Drawing,
    Panning,
    PinchZooming,
    DraggingLayerContent,
    ReorderingLayerList,
}

impl ModeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ModeKind::Idle => "Idle",
            ModeKind::Drawing => "Drawing",
            ModeKind::Panning => "Panning",
            ModeKind::PinchZooming => "PinchZooming",
            ModeKind::DraggingLayerContent => "DraggingLayerContent",
            ModeKind::ReorderingLayerList => "ReorderingLayerList",
        }
    }

    /// Modes driven by single-pointer canvas input.
    fn is_pointer_mode(&self) -> bool {
        matches!(
            self,
            ModeKind::Drawing | ModeKind::Panning | ModeKind::DraggingLayerContent
        )
    }
}

/// What the state machine decided to do with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to do
    Ignore,
    /// Feed the event to the current mode
    Update,
    /// Cancel the current mode and enter another
    Enter(ModeKind),
    /// One-shot color sample; ends in Idle
    Sample,
    /// Return to Idle
    Exit,
}

/// Decides how `event` affects the interaction currently in `mode`.
///
/// Pure: no state is touched, so the arbitration rules can be checked in isolation.
pub fn dispatch(mode: ModeKind, event: &InputEvent, tool: Tool) -> Transition {
    match event {
        InputEvent::PointerDown {
            button, modifiers, ..
        } => press(tool, *button, modifiers.ctrl),
        InputEvent::PointerMove { .. } if mode.is_pointer_mode() => Transition::Update,
        InputEvent::PointerUp { .. } | InputEvent::PointerLeave if mode.is_pointer_mode() => {
            Transition::Exit
        }
        InputEvent::TouchStart { touches } => match touches.len() {
            0 => Transition::Ignore,
            1 => press(tool, PointerButton::Primary, false),
            _ => Transition::Enter(ModeKind::PinchZooming),
        },
        InputEvent::TouchMove { touches } => match (mode, touches.len()) {
            (ModeKind::PinchZooming, n) if n >= 2 => Transition::Update,
            (mode, 1) if mode.is_pointer_mode() => Transition::Update,
            _ => Transition::Ignore,
        },
        InputEvent::TouchEnd { .. } if mode == ModeKind::PinchZooming || mode.is_pointer_mode() => {
            Transition::Exit
        }
        InputEvent::ListPointerDown { .. } => Transition::Enter(ModeKind::ReorderingLayerList),
        InputEvent::ListPointerMove { .. } if mode == ModeKind::ReorderingLayerList => {
            Transition::Update
        }
        InputEvent::ListPointerUp if mode == ModeKind::ReorderingLayerList => Transition::Exit,
        _ => Transition::Ignore,
    }
}

fn press(tool: Tool, button: PointerButton, ctrl: bool) -> Transition {
    if tool == Tool::Eyedropper {
        return Transition::Sample;
    }
    if tool == Tool::Move {
        return Transition::Enter(ModeKind::DraggingLayerContent);
    }
    match button {
        PointerButton::Middle => Transition::Enter(ModeKind::Panning),
        PointerButton::Primary if ctrl || tool == Tool::Pan => Transition::Enter(ModeKind::Panning),
        PointerButton::Primary if tool.paints() => Transition::Enter(ModeKind::Drawing),
        _ => Transition::Ignore,
    }
}

/// The interaction in progress together with what it captured on entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    Drawing(StrokeInProgress),
    Panning {
        last_screen: Pos2,
    },
    PinchZooming {
        last_distance: f32,
    },
    DraggingLayerContent {
        layer: LayerId,
        /// Pointer position minus layer position, in document space
        grab_offset: Vec2,
    },
    ReorderingLayerList(ListDrag),
}

impl Interaction {
    pub fn kind(&self) -> ModeKind {
        match self {
            Interaction::Idle => ModeKind::Idle,
            Interaction::Drawing(_) => ModeKind::Drawing,
            Interaction::Panning { .. } => ModeKind::Panning,
            Interaction::PinchZooming { .. } => ModeKind::PinchZooming,
            Interaction::DraggingLayerContent { .. } => ModeKind::DraggingLayerContent,
            Interaction::ReorderingLayerList(_) => ModeKind::ReorderingLayerList,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TouchPoint;
    use egui::{Modifiers, pos2};

    fn down(button: PointerButton, ctrl: bool) -> InputEvent {
        InputEvent::PointerDown {
            pos: pos2(1.0, 1.0),
            button,
            modifiers: Modifiers {
                ctrl,
                ..Modifiers::NONE
            },
            pressure: None,
        }
    }

    fn touches(n: usize) -> Vec<TouchPoint> {
        (0..n).map(|i| TouchPoint::new(pos2(i as f32 * 10.0, 0.0))).collect()
    }

    #[test]
    fn test_primary_press_draws() {
        let t = dispatch(ModeKind::Idle, &down(PointerButton::Primary, false), Tool::Pencil);
        assert_eq!(t, Transition::Enter(ModeKind::Drawing));
    }

    #[test]
    fn test_eyedropper_wins_over_pan_gestures() {
        for event in [down(PointerButton::Middle, false), down(PointerButton::Primary, true)] {
            assert_eq!(dispatch(ModeKind::Idle, &event, Tool::Eyedropper), Transition::Sample);
        }
    }

    #[test]
    fn test_middle_or_ctrl_pans() {
        assert_eq!(
            dispatch(ModeKind::Idle, &down(PointerButton::Middle, false), Tool::Pencil),
            Transition::Enter(ModeKind::Panning)
        );
        assert_eq!(
            dispatch(ModeKind::Idle, &down(PointerButton::Primary, true), Tool::Eraser),
            Transition::Enter(ModeKind::Panning)
        );
    }

    #[test]
    fn test_move_tool_drags_layer() {
        let t = dispatch(ModeKind::Idle, &down(PointerButton::Primary, false), Tool::Move);
        assert_eq!(t, Transition::Enter(ModeKind::DraggingLayerContent));
    }

    #[test]
    fn test_secondary_button_is_ignored() {
        let t = dispatch(ModeKind::Idle, &down(PointerButton::Secondary, false), Tool::Pencil);
        assert_eq!(t, Transition::Ignore);
    }

    #[test]
    fn test_second_finger_starts_pinch_even_mid_stroke() {
        let t = dispatch(ModeKind::Drawing, &InputEvent::TouchStart { touches: touches(2) }, Tool::Pencil);
        assert_eq!(t, Transition::Enter(ModeKind::PinchZooming));
    }

    #[test]
    fn test_moves_only_update_active_modes() {
        let mv = InputEvent::pointer_move(pos2(3.0, 3.0));
        assert_eq!(dispatch(ModeKind::Idle, &mv, Tool::Pencil), Transition::Ignore);
        assert_eq!(dispatch(ModeKind::Drawing, &mv, Tool::Pencil), Transition::Update);
        assert_eq!(dispatch(ModeKind::PinchZooming, &mv, Tool::Pencil), Transition::Ignore);
        assert_eq!(
            dispatch(ModeKind::PinchZooming, &InputEvent::TouchMove { touches: touches(2) }, Tool::Pencil),
            Transition::Update
        );
    }

    #[test]
    fn test_release_and_leave_exit() {
        for mode in [ModeKind::Drawing, ModeKind::Panning, ModeKind::DraggingLayerContent] {
            assert_eq!(dispatch(mode, &InputEvent::PointerUp { pos: pos2(0.0, 0.0) }, Tool::Pencil), Transition::Exit);
            assert_eq!(dispatch(mode, &InputEvent::PointerLeave, Tool::Pencil), Transition::Exit);
        }
        assert_eq!(dispatch(ModeKind::Idle, &InputEvent::PointerLeave, Tool::Pencil), Transition::Ignore);
        assert_eq!(
            dispatch(ModeKind::PinchZooming, &InputEvent::TouchEnd { touches: touches(1) }, Tool::Pencil),
            Transition::Exit
        );
    }

    #[test]
    fn test_list_drag_is_scoped_to_list_events() {
        assert_eq!(
            dispatch(ModeKind::Drawing, &InputEvent::ListPointerDown { index: 0, y: 0.0 }, Tool::Pencil),
            Transition::Enter(ModeKind::ReorderingLayerList)
        );
        assert_eq!(
            dispatch(ModeKind::ReorderingLayerList, &InputEvent::PointerLeave, Tool::Pencil),
            Transition::Ignore
        );
        assert_eq!(
            dispatch(ModeKind::ReorderingLayerList, &InputEvent::ListPointerUp, Tool::Pencil),
            Transition::Exit
        );
    }
}
