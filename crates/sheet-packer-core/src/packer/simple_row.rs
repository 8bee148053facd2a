use super::Packer;
use crate::geometry::{Rect, Size};

/// Left-to-right rows in input order; a slot that overflows the width starts a new row
/// below the tallest slot of the current one. Never rotates.
pub struct SimpleRowPacker {
    area: Rect,
    x: u32,
    y: u32,
    row_h: u32,
}

impl SimpleRowPacker {
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            x: area.x,
            y: area.y,
            row_h: 0,
        }
    }
}

impl Packer for SimpleRowPacker {
    fn pack(&mut self, size: Size) -> Option<(Rect, bool)> {
        if size.w == 0 || size.h == 0 || size.w > self.area.w {
            return None;
        }
        if self.x + size.w > self.area.right() {
            self.y += self.row_h;
            self.x = self.area.x;
            self.row_h = 0;
        }
        if self.y + size.h > self.area.bottom() {
            return None;
        }
        let slot = Rect::from_size(self.x, self.y, size);
        self.x += size.w;
        self.row_h = self.row_h.max(size.h);
        Some((slot, false))
    }
}
