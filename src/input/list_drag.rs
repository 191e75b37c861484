use egui::{Pos2, Rect, pos2, vec2};

/// Drag of one row in the layer list.
///
/// The dragged row follows the pointer vertically; whenever its center crosses
/// the midpoint of a neighbouring row the two swap places.
#[derive(Debug, Clone, PartialEq)]
pub struct ListDrag {
    origin_index: usize,
    index: usize,
    start_y: f32,
    last_y: f32,
    row_height: f32,
}

impl ListDrag {
    pub fn new(index: usize, y: f32, row_height: f32) -> Self {
        Self {
            origin_index: index,
            index,
            start_y: y,
            last_y: y,
            row_height: row_height.max(1.0),
        }
    }

    /// Current slot of the dragged row.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Moves the pointer to `y` and returns the adjacent swaps `(from, to)` the
    /// list must apply, in order.
    pub fn update(&mut self, y: f32, len: usize) -> Vec<(usize, usize)> {
        self.last_y = y;
        let center = self.center();
        let mut swaps = Vec::new();
        loop {
            if self.index + 1 < len && center > self.slot_center(self.index + 1) {
                swaps.push((self.index, self.index + 1));
                self.index += 1;
            } else if self.index > 0 && center < self.slot_center(self.index - 1) {
                swaps.push((self.index, self.index - 1));
                self.index -= 1;
            } else {
                break;
            }
        }
        swaps
    }

    fn center(&self) -> f32 {
        self.slot_center(self.origin_index) + (self.last_y - self.start_y)
    }

    fn slot_center(&self, index: usize) -> f32 {
        (index as f32 + 0.5) * self.row_height
    }
}

/// Rect of row `index` in a list of fixed-height rows whose first row starts at `top_left`.
pub fn row_rect(top_left: Pos2, width: f32, row_height: f32, index: usize) -> Rect {
    let top = top_left.y + index as f32 * row_height;
    Rect::from_min_size(pos2(top_left.x, top), vec2(width, row_height))
}
