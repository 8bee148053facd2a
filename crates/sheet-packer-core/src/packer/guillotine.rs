use super::Packer;
use crate::config::{GuillotineChoice, GuillotineSplit};
use crate::geometry::{Rect, Size};

/// Guillotine packer: every placement cuts its free rectangle in two along one axis,
/// so the free list stays disjoint.
pub struct GuillotinePacker {
    allow_rotation: bool,
    choice: GuillotineChoice,
    split: GuillotineSplit,
    free: Vec<Rect>,
}

impl GuillotinePacker {
    pub fn new(
        area: Rect,
        allow_rotation: bool,
        choice: GuillotineChoice,
        split: GuillotineSplit,
    ) -> Self {
        let free = if area.is_empty() {
            Vec::new()
        } else {
            vec![area]
        };
        Self {
            allow_rotation,
            choice,
            split,
            free,
        }
    }

    pub fn free_rects(&self) -> &[Rect] {
        &self.free
    }

    fn score(choice: GuillotineChoice, fr: &Rect, w: u32, h: u32) -> (i64, i64) {
        let area_fit = fr.area() as i64 - w as i64 * h as i64;
        let leftover_h = (fr.w as i64 - w as i64).abs();
        let leftover_v = (fr.h as i64 - h as i64).abs();
        let short_fit = leftover_h.min(leftover_v);
        let long_fit = leftover_h.max(leftover_v);
        match choice {
            GuillotineChoice::BestAreaFit => (area_fit, short_fit),
            GuillotineChoice::BestShortSideFit => (short_fit, long_fit),
            GuillotineChoice::BestLongSideFit => (long_fit, short_fit),
            GuillotineChoice::WorstAreaFit => (-area_fit, -short_fit),
            GuillotineChoice::WorstShortSideFit => (-short_fit, -long_fit),
            GuillotineChoice::WorstLongSideFit => (-long_fit, -short_fit),
        }
    }

    fn choose(&self, w: u32, h: u32) -> Option<(usize, Rect, bool)> {
        let mut best: Option<((i64, i64), usize, Rect, bool)> = None;
        for (i, fr) in self.free.iter().enumerate() {
            if fr.w >= w && fr.h >= h {
                let s = Self::score(self.choice, fr, w, h);
                if best.as_ref().is_none_or(|(b, ..)| s < *b) {
                    best = Some((s, i, Rect::new(fr.x, fr.y, w, h), false));
                }
            }
            if self.allow_rotation && w != h && fr.w >= h && fr.h >= w {
                let s = Self::score(self.choice, fr, h, w);
                if best.as_ref().is_none_or(|(b, ..)| s < *b) {
                    best = Some((s, i, Rect::new(fr.x, fr.y, h, w), true));
                }
            }
        }
        best.map(|(_, idx, r, rot)| (idx, r, rot))
    }

    /// Cuts `fr` around `placed` (anchored at its top-left) into a bottom and a right piece.
    fn split(&self, fr: &Rect, placed: &Rect) -> (Option<Rect>, Option<Rect>) {
        let w_right = fr.right() - placed.right();
        let h_bottom = fr.bottom() - placed.bottom();

        let split_horizontal = match self.split {
            GuillotineSplit::SplitShorterLeftoverAxis => h_bottom < w_right,
            GuillotineSplit::SplitLongerLeftoverAxis => h_bottom > w_right,
            GuillotineSplit::SplitMinimizeArea => {
                w_right as u64 * fr.h as u64 <= fr.w as u64 * h_bottom as u64
            }
            GuillotineSplit::SplitMaximizeArea => {
                w_right as u64 * fr.h as u64 >= fr.w as u64 * h_bottom as u64
            }
            GuillotineSplit::SplitShorterAxis => fr.h < fr.w,
            GuillotineSplit::SplitLongerAxis => fr.h > fr.w,
        };

        let (bottom, right) = if split_horizontal {
            (
                Rect::new(fr.x, placed.bottom(), fr.w, h_bottom),
                Rect::new(placed.right(), fr.y, w_right, placed.h),
            )
        } else {
            (
                Rect::new(fr.x, placed.bottom(), placed.w, h_bottom),
                Rect::new(placed.right(), fr.y, w_right, fr.h),
            )
        };
        let keep = |r: Rect| (!r.is_empty()).then_some(r);
        (keep(bottom), keep(right))
    }

    fn place(&mut self, idx: usize, placed: &Rect) {
        let fr = self.free.swap_remove(idx);
        let (a, b) = self.split(&fr, placed);
        self.free.extend(a);
        self.free.extend(b);
        self.merge_free_list();
    }

    /// Joins neighbours that share a full edge.
    fn merge_free_list(&mut self) {
        let mut merged = true;
        while merged {
            merged = false;
            'outer: for i in 0..self.free.len() {
                for j in i + 1..self.free.len() {
                    let (a, b) = (self.free[i], self.free[j]);
                    let joined = if a.y == b.y && a.h == b.h && a.right() == b.x {
                        Some(Rect::new(a.x, a.y, a.w + b.w, a.h))
                    } else if a.y == b.y && a.h == b.h && b.right() == a.x {
                        Some(Rect::new(b.x, a.y, a.w + b.w, a.h))
                    } else if a.x == b.x && a.w == b.w && a.bottom() == b.y {
                        Some(Rect::new(a.x, a.y, a.w, a.h + b.h))
                    } else if a.x == b.x && a.w == b.w && b.bottom() == a.y {
                        Some(Rect::new(a.x, b.y, a.w, a.h + b.h))
                    } else {
                        None
                    };
                    if let Some(r) = joined {
                        self.free[i] = r;
                        self.free.remove(j);
                        merged = true;
                        break 'outer;
                    }
                }
            }
        }
    }
}

impl Packer for GuillotinePacker {
    fn pack(&mut self, size: Size) -> Option<(Rect, bool)> {
        if size.w == 0 || size.h == 0 {
            return None;
        }
        let (idx, place, rotated) = self.choose(size.w, size.h)?;
        self.place(idx, &place);
        Some((place, rotated))
    }
}
