//! Geometry primitives shared by the preprocessor, the packers and the assembler.

use crate::error::{Result, SheetPackerError};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_size(x: u32, y: u32, size: Size) -> Self {
        Self::new(x, y, size.w, size.h)
    }

    /// Builds a rectangle, rejecting zero sides.
    pub fn checked(x: u32, y: u32, w: u32, h: u32) -> Result<Self> {
        Ok(Self::from_size(x, y, Size::checked(w, h)?))
    }

    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Returns true if `r` lies fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }

    /// Returns true if the interiors of `self` and `r` share at least one pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        !(self.x >= r.right() || r.x >= self.right() || self.y >= r.bottom() || r.y >= self.bottom())
    }

    /// Same origin, width and height swapped.
    ///
    /// Degenerate rectangles stay degenerate; sizes are validated on entry (`Rect::checked`,
    /// `prepare_sprites`, `pack_layout`).
    pub fn rotate90(&self) -> Rect {
        Rect::new(self.x, self.y, self.h, self.w)
    }
}

/// Width/height pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Builds a size, rejecting zero sides.
    pub fn checked(w: u32, h: u32) -> Result<Self> {
        if w == 0 || h == 0 {
            return Err(SheetPackerError::InvalidDimension {
                key: String::new(),
                width: w,
                height: h,
            });
        }
        Ok(Self { w, h })
    }

    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    pub fn rotated(&self) -> Size {
        Size::new(self.h, self.w)
    }

    /// Grows both sides by `by` pixels.
    pub fn expand(&self, by: u32) -> Size {
        Size::new(self.w.saturating_add(by), self.h.saturating_add(by))
    }

    pub fn fits_in(&self, other: Size) -> bool {
        self.w <= other.w && self.h <= other.h
    }
}

impl From<(u32, u32)> for Size {
    fn from((w, h): (u32, u32)) -> Self {
        Size::new(w, h)
    }
}

/// Mirror flags describing how a sprite derives from its canonical unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Flip {
    pub x: bool,
    pub y: bool,
}

impl Flip {
    pub const NONE: Flip = Flip { x: false, y: false };
    pub const HORIZONTAL: Flip = Flip { x: true, y: false };
    pub const VERTICAL: Flip = Flip { x: false, y: true };
    pub const BOTH: Flip = Flip { x: true, y: true };

    pub fn is_none(&self) -> bool {
        !self.x && !self.y
    }
}

/// Smallest power of two that is `>= n`.
///
/// Fails with `InvalidDimension` for `0` and for values that would overflow `u32`.
pub fn round_up_to_power_of_two(n: u32) -> Result<u32> {
    if n == 0 {
        return Err(SheetPackerError::InvalidDimension {
            key: String::new(),
            width: n,
            height: n,
        });
    }
    n.checked_next_power_of_two()
        .ok_or(SheetPackerError::InvalidDimension {
            key: String::new(),
            width: n,
            height: n,
        })
}

/// Largest power of two that is `<= n` (`0` for `0`).
pub fn round_down_to_power_of_two(n: u32) -> u32 {
    if n == 0 { 0 } else { 1 << (31 - n.leading_zeros()) }
}

pub fn is_power_of_two(n: u32) -> bool {
    n.is_power_of_two()
}

/// True when `a` and `b` come closer than `padding` pixels on both axes.
///
/// With `padding == 0` this is a plain interior intersection test. Both rectangles are
/// expected to be non-empty (see `Rect::checked`).
pub fn rects_overlap(a: &Rect, b: &Rect, padding: u32) -> bool {
    let (ax1, ay1) = (a.x as u64, a.y as u64);
    let (bx1, by1) = (b.x as u64, b.y as u64);
    let (ax2, ay2) = (a.right() as u64 + padding as u64, a.bottom() as u64 + padding as u64);
    let (bx2, by2) = (b.right() as u64 + padding as u64, b.bottom() as u64 + padding as u64);
    ax1 < bx2 && bx1 < ax2 && ay1 < by2 && by1 < ay2
}
