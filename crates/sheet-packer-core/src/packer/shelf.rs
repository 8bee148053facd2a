use super::Packer;
use crate::geometry::{Rect, Size};

/// Which shelves a slot may go to before a new shelf is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShelfPolicy {
    /// Only the most recent shelf.
    NextFit,
    /// The first shelf, top to bottom, with room (FFDH when fed by decreasing height).
    FirstFit,
}

#[derive(Clone, Debug)]
struct Shelf {
    y: u32,
    h: u32,
    used_w: u32,
}

/// Shelf packer: horizontal rows whose height is fixed by the slot that opened them.
pub struct ShelfPacker {
    area: Rect,
    allow_rotation: bool,
    policy: ShelfPolicy,
    shelves: Vec<Shelf>,
    next_y: u32,
}

impl ShelfPacker {
    pub fn new(area: Rect, allow_rotation: bool, policy: ShelfPolicy) -> Self {
        Self {
            area,
            allow_rotation,
            policy,
            shelves: Vec::new(),
            next_y: area.y,
        }
    }

    /// `(y, height)` of each opened shelf.
    pub fn shelves(&self) -> Vec<(u32, u32)> {
        self.shelves.iter().map(|s| (s.y, s.h)).collect()
    }

    fn orientations(&self, size: Size) -> Vec<(Size, bool)> {
        let mut out = vec![(size, false)];
        if self.allow_rotation && size.w != size.h {
            out.push((size.rotated(), true));
        }
        out
    }

    /// Best orientation for an existing shelf: least unused height, upright on ties.
    fn fit_in_shelf(&self, shelf: &Shelf, size: Size) -> Option<(Size, bool)> {
        self.orientations(size)
            .into_iter()
            .filter(|(s, _)| s.h <= shelf.h && shelf.used_w + s.w <= self.area.w)
            .min_by_key(|(s, _)| shelf.h - s.h)
    }

    fn choose_shelf(&self, size: Size) -> Option<(usize, Size, bool)> {
        let candidates: Vec<usize> = match self.policy {
            ShelfPolicy::NextFit => self.shelves.len().checked_sub(1).into_iter().collect(),
            ShelfPolicy::FirstFit => (0..self.shelves.len()).collect(),
        };
        candidates.into_iter().find_map(|i| {
            self.fit_in_shelf(&self.shelves[i], size)
                .map(|(s, rot)| (i, s, rot))
        })
    }

    /// Orientation for a new shelf: the lower one that fits, upright on ties.
    fn open_shelf(&self, size: Size) -> Option<(Size, bool)> {
        self.orientations(size)
            .into_iter()
            .filter(|(s, _)| s.w <= self.area.w && self.next_y + s.h <= self.area.bottom())
            .min_by_key(|(s, _)| s.h)
    }
}

impl Packer for ShelfPacker {
    fn pack(&mut self, size: Size) -> Option<(Rect, bool)> {
        if size.w == 0 || size.h == 0 {
            return None;
        }
        if let Some((i, s, rotated)) = self.choose_shelf(size) {
            let shelf = &mut self.shelves[i];
            let slot = Rect::from_size(self.area.x + shelf.used_w, shelf.y, s);
            shelf.used_w += s.w;
            return Some((slot, rotated));
        }
        let (s, rotated) = self.open_shelf(size)?;
        let slot = Rect::from_size(self.area.x, self.next_y, s);
        self.shelves.push(Shelf {
            y: self.next_y,
            h: s.h,
            used_w: s.w,
        });
        self.next_y += s.h;
        Some((slot, rotated))
    }
}
