use super::Packer;
use crate::config::SkylineHeuristic;
use crate::geometry::{Rect, Size};

/// Horizontal segment of the skyline: `[x, x + w)` is filled up to `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SkylineNode {
    x: u32,
    y: u32,
    w: u32,
}

impl SkylineNode {
    fn right(&self) -> u32 {
        self.x + self.w
    }
}

/// Skyline packer: tracks the upper contour of placed slots and drops each new slot
/// onto it.
pub struct SkylinePacker {
    area: Rect,
    allow_rotation: bool,
    heuristic: SkylineHeuristic,
    skylines: Vec<SkylineNode>,
}

impl SkylinePacker {
    pub fn new(area: Rect, allow_rotation: bool, heuristic: SkylineHeuristic) -> Self {
        Self {
            area,
            allow_rotation,
            heuristic,
            skylines: vec![SkylineNode {
                x: area.x,
                y: area.y,
                w: area.w,
            }],
        }
    }

    /// Current contour as `(x, y, w)` triples.
    pub fn contour(&self) -> Vec<(u32, u32, u32)> {
        self.skylines.iter().map(|s| (s.x, s.y, s.w)).collect()
    }

    /// Lowest rectangle of `w x h` resting on the skyline starting at segment `i`.
    fn can_put(&self, mut i: usize, w: u32, h: u32) -> Option<Rect> {
        let mut rect = Rect::new(self.skylines[i].x, self.area.y, w, h);
        if rect.right() > self.area.right() {
            return None;
        }
        let mut width_left = w;
        loop {
            rect.y = rect.y.max(self.skylines[i].y);
            if rect.bottom() > self.area.bottom() {
                return None;
            }
            if self.skylines[i].w >= width_left {
                return Some(rect);
            }
            width_left -= self.skylines[i].w;
            i += 1;
            if i >= self.skylines.len() {
                return None;
            }
        }
    }

    /// Area trapped below `r` between the skyline and its bottom edge.
    fn wasted_area_for(&self, start: usize, r: &Rect) -> u64 {
        let mut area = 0u64;
        let mut width_left = r.w;
        let mut i = start;
        while width_left > 0 && i < self.skylines.len() {
            let seg = &self.skylines[i];
            let use_w = width_left.min(seg.w);
            area += (r.y - seg.y) as u64 * use_w as u64;
            width_left -= use_w;
            i += 1;
        }
        area
    }

    fn score(&self, i: usize, r: &Rect) -> (u64, u64) {
        match self.heuristic {
            SkylineHeuristic::BottomLeft => (r.bottom() as u64, self.skylines[i].w as u64),
            SkylineHeuristic::MinWaste => (self.wasted_area_for(i, r), r.bottom() as u64),
        }
    }

    fn find_skyline(&self, w: u32, h: u32) -> Option<(usize, Rect, bool)> {
        let mut best: Option<((u64, u64), usize, Rect, bool)> = None;
        for i in 0..self.skylines.len() {
            let mut candidates = vec![(w, h, false)];
            if self.allow_rotation && w != h {
                candidates.push((h, w, true));
            }
            for (cw, ch, rotated) in candidates {
                if let Some(r) = self.can_put(i, cw, ch) {
                    let s = self.score(i, &r);
                    if best.as_ref().is_none_or(|(b, ..)| s < *b) {
                        best = Some((s, i, r, rotated));
                    }
                }
            }
        }
        best.map(|(_, i, r, rot)| (i, r, rot))
    }

    fn split(&mut self, index: usize, rect: &Rect) {
        self.skylines.insert(
            index,
            SkylineNode {
                x: rect.x,
                y: rect.bottom(),
                w: rect.w,
            },
        );

        let i = index + 1;
        while i < self.skylines.len() {
            let prev_right = self.skylines[i - 1].right();
            if self.skylines[i].x >= prev_right {
                break;
            }
            let shrink = prev_right - self.skylines[i].x;
            if self.skylines[i].w <= shrink {
                self.skylines.remove(i);
            } else {
                self.skylines[i].x += shrink;
                self.skylines[i].w -= shrink;
                break;
            }
        }
    }

    fn merge(&mut self) {
        let mut i = 1;
        while i < self.skylines.len() {
            if self.skylines[i - 1].y == self.skylines[i].y {
                let w = self.skylines[i].w;
                self.skylines[i - 1].w += w;
                self.skylines.remove(i);
            } else {
                i += 1;
            }
        }
    }
}

impl Packer for SkylinePacker {
    fn pack(&mut self, size: Size) -> Option<(Rect, bool)> {
        if size.w == 0 || size.h == 0 || self.area.is_empty() {
            return None;
        }
        let (i, place, rotated) = self.find_skyline(size.w, size.h)?;
        self.split(i, &place);
        self.merge();
        Some((place, rotated))
    }
}
