use egui::{Modifiers, PointerButton, Pos2};

mod list_drag;
mod state;

pub use list_drag::{ListDrag, row_rect};
pub use state::{Interaction, ModeKind, Transition, dispatch};

/// One active touch contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub pos: Pos2,
    /// Normalized pressure, when the device reports it
    pub force: Option<f32>,
}

impl TouchPoint {
    pub fn new(pos: Pos2) -> Self {
        Self { pos, force: None }
    }
}

/// Normalized input consumed by the interaction state machine.
///
/// Canvas positions are in screen space relative to the canvas origin. Touch
/// events carry every contact currently on the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        pos: Pos2,
        button: PointerButton,
        modifiers: Modifiers,
        pressure: Option<f32>,
    },
    PointerMove {
        pos: Pos2,
        pressure: Option<f32>,
    },
    PointerUp {
        pos: Pos2,
    },
    /// The pointer left the canvas
    PointerLeave,
    TouchStart {
        touches: Vec<TouchPoint>,
    },
    TouchMove {
        touches: Vec<TouchPoint>,
    },
    /// A contact lifted; `touches` holds the ones still down
    TouchEnd {
        touches: Vec<TouchPoint>,
    },
    /// Pointer pressed on a row of the layer list
    ListPointerDown {
        index: usize,
        y: f32,
    },
    ListPointerMove {
        y: f32,
    },
    ListPointerUp,
}

impl InputEvent {
    /// Convenience constructor for a plain primary-button press.
    pub fn primary_down(pos: Pos2) -> Self {
        InputEvent::PointerDown {
            pos,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
            pressure: None,
        }
    }

    pub fn pointer_move(pos: Pos2) -> Self {
        InputEvent::PointerMove { pos, pressure: None }
    }
}

/// Center point and spread of a two-finger contact.
pub fn pinch_geometry(a: Pos2, b: Pos2) -> (Pos2, f32) {
    (a.lerp(b, 0.5), a.distance(b))
}
