use super::Packer;
use crate::config::MaxRectsHeuristic;
use crate::geometry::{Rect, Size};

/// Maximal-rectangles packer.
///
/// Keeps every maximal free rectangle of the area; after each insertion the free list
/// is split around the placed slot and pruned so that no free rectangle lies inside
/// another one.
pub struct MaxRectsPacker {
    area: Rect,
    allow_rotation: bool,
    heuristic: MaxRectsHeuristic,
    free: Vec<Rect>,
    used: Vec<Rect>,
}

impl MaxRectsPacker {
    /// `Auto` is expanded by the portfolio; a packer built with it scores like
    /// `BestShortSideFit`.
    pub fn new(area: Rect, allow_rotation: bool, heuristic: MaxRectsHeuristic) -> Self {
        let free = if area.is_empty() {
            Vec::new()
        } else {
            vec![area]
        };
        Self {
            area,
            allow_rotation,
            heuristic,
            free,
            used: Vec::new(),
        }
    }

    pub fn free_rects(&self) -> &[Rect] {
        &self.free
    }

    pub fn used_rects(&self) -> &[Rect] {
        &self.used
    }

    /// True when no free rectangle is contained in another.
    pub fn is_pruned(&self) -> bool {
        self.free.iter().enumerate().all(|(i, a)| {
            self.free
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !b.contains(a))
        })
    }

    fn place_rect(&mut self, node: &Rect) {
        let mut i = 0;
        let mut produced: Vec<Rect> = Vec::new();
        while i < self.free.len() {
            let fr = self.free[i];
            if fr.intersects(node) {
                self.free.swap_remove(i);
                split_free_node(fr, node, &mut produced);
            } else {
                i += 1;
            }
        }
        self.free.extend(produced);
        self.prune_free_list();
        self.used.push(*node);
        debug_assert!(self.is_pruned());
    }

    fn prune_free_list(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let a = self.free[i];
            let mut remove_i = false;
            let mut j = i + 1;
            while j < self.free.len() {
                let b = self.free[j];
                if b.contains(&a) {
                    remove_i = true;
                    break;
                }
                if a.contains(&b) {
                    self.free.remove(j);
                    continue;
                }
                j += 1;
            }
            if remove_i {
                self.free.remove(i);
            } else {
                i += 1;
            }
        }
    }

    fn score(&self, fr: &Rect, w: u32, h: u32) -> (i64, i64) {
        let leftover_h = (fr.w as i64 - w as i64).abs();
        let leftover_v = (fr.h as i64 - h as i64).abs();
        let short_fit = leftover_h.min(leftover_v);
        let long_fit = leftover_h.max(leftover_v);
        let area_fit = fr.area() as i64 - w as i64 * h as i64;
        match self.heuristic {
            MaxRectsHeuristic::BestAreaFit => (area_fit, short_fit),
            MaxRectsHeuristic::BestShortSideFit | MaxRectsHeuristic::Auto => {
                (short_fit, long_fit)
            }
            MaxRectsHeuristic::BestLongSideFit => (long_fit, short_fit),
            MaxRectsHeuristic::BottomLeft => (fr.y as i64 + h as i64, fr.x as i64),
            MaxRectsHeuristic::ContactPoint => {
                // maximize contact: negate for minimization
                let contact = self.contact_point_score(&Rect::new(fr.x, fr.y, w, h));
                (-(contact as i64), area_fit)
            }
        }
    }

    fn find_position(&self, w: u32, h: u32) -> Option<(Rect, bool)> {
        // (score1, score2, top, left)
        let mut best: Option<((i64, i64, u32, u32), Rect, bool)> = None;
        let mut orientations = vec![(w, h, false)];
        if self.allow_rotation && w != h {
            orientations.push((h, w, true));
        }

        for fr in &self.free {
            for &(ow, oh, rotated) in &orientations {
                if fr.w < ow || fr.h < oh {
                    continue;
                }
                // perfect fit early-out
                if fr.w == ow && fr.h == oh {
                    return Some((Rect::new(fr.x, fr.y, ow, oh), rotated));
                }
                let (s1, s2) = self.score(fr, ow, oh);
                let key = (s1, s2, fr.y + oh, fr.x);
                if best.as_ref().is_none_or(|(k, _, _)| key < *k) {
                    best = Some((key, Rect::new(fr.x, fr.y, ow, oh), rotated));
                }
            }
        }
        best.map(|(_, r, rot)| (r, rot))
    }

    fn contact_point_score(&self, node: &Rect) -> u64 {
        let mut score = 0u64;
        if node.x == self.area.x || node.right() == self.area.right() {
            score += node.h as u64;
        }
        if node.y == self.area.y || node.bottom() == self.area.bottom() {
            score += node.w as u64;
        }
        for u in &self.used {
            if node.x == u.right() || u.x == node.right() {
                score += overlap_1d(node.y, node.bottom(), u.y, u.bottom()) as u64;
            }
            if node.y == u.bottom() || u.y == node.bottom() {
                score += overlap_1d(node.x, node.right(), u.x, u.right()) as u64;
            }
        }
        score
    }
}

/// Pushes the maximal pieces of `fr` left around `node` (which intersects it).
fn split_free_node(fr: Rect, node: &Rect, out: &mut Vec<Rect>) {
    if node.x > fr.x {
        out.push(Rect::new(fr.x, fr.y, node.x - fr.x, fr.h));
    }
    if node.right() < fr.right() {
        out.push(Rect::new(node.right(), fr.y, fr.right() - node.right(), fr.h));
    }
    if node.y > fr.y {
        out.push(Rect::new(fr.x, fr.y, fr.w, node.y - fr.y));
    }
    if node.bottom() < fr.bottom() {
        out.push(Rect::new(fr.x, node.bottom(), fr.w, fr.bottom() - node.bottom()));
    }
}

fn overlap_1d(a1: u32, a2: u32, b1: u32, b2: u32) -> u32 {
    a2.min(b2).saturating_sub(a1.max(b1))
}

impl Packer for MaxRectsPacker {
    fn pack(&mut self, size: Size) -> Option<(Rect, bool)> {
        if size.w == 0 || size.h == 0 {
            return None;
        }
        let (place, rotated) = self.find_position(size.w, size.h)?;
        self.place_rect(&place);
        Some((place, rotated))
    }
}
