//! Packing strategies and the shared driver that feeds units to them.

use crate::cancel::CancelToken;
use crate::config::{
    GuillotineChoice, GuillotineSplit, MaxRectsHeuristic, PackerConfig, SkylineHeuristic,
};
use crate::geometry::{Rect, Size, rects_overlap};
use crate::model::PlacementUnit;

pub mod auto;
pub mod guillotine;
pub mod maxrects;
pub mod shelf;
pub mod simple_row;
pub mod skyline;

use guillotine::GuillotinePacker;
use maxrects::MaxRectsPacker;
use shelf::{ShelfPacker, ShelfPolicy};
use simple_row::SimpleRowPacker;
use skyline::SkylinePacker;

/// A packer places reserved slots into a fixed area.
///
/// Implementations must never return overlapping slots or slots outside their area.
/// `pack` returns the slot (with post-rotation size) and whether it was rotated 90°,
/// or `None` if the slot cannot be placed.
pub trait Packer {
    fn pack(&mut self, size: Size) -> Option<(Rect, bool)>;
}

/// Geometric options shared by all strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackOptions {
    pub allow_rotation: bool,
    /// Gutter between neighbouring sprites.
    pub padding: u32,
    /// Gutter around the canvas.
    pub border_padding: u32,
    pub extrude: u32,
    /// Footprint shaping used when comparing results.
    pub power_of_two: bool,
    pub square: bool,
}

impl PackOptions {
    pub fn from_config(cfg: &PackerConfig) -> Self {
        Self {
            allow_rotation: cfg.allow_rotation,
            padding: cfg.padding,
            border_padding: cfg.border_padding,
            extrude: cfg.extrude,
            power_of_two: cfg.power_of_two,
            square: cfg.square,
        }
    }

    /// Slot size reserved for a unit of `size`.
    pub fn reserve(&self, size: Size) -> Size {
        size.expand(self.padding + self.extrude * 2)
    }

    /// Offset of the content inside its slot (extrude + half padding, symmetric gutter).
    pub fn content_offset(&self) -> u32 {
        self.extrude + self.padding / 2
    }

    /// Packable area of `canvas` once the border is removed.
    pub fn inner_area(&self, canvas: Size) -> Rect {
        let b = self.border_padding;
        Rect::new(
            b,
            b,
            canvas.w.saturating_sub(b.saturating_mul(2)),
            canvas.h.saturating_sub(b.saturating_mul(2)),
        )
    }

    /// Canvas size a placement with extents `used` would be emitted at.
    pub fn footprint(&self, used: Size) -> Size {
        let (mut w, mut h) = (used.w.max(1), used.h.max(1));
        if self.power_of_two {
            w = pow2_ceil(w);
            h = pow2_ceil(h);
        }
        if self.square {
            let m = w.max(h);
            w = m;
            h = m;
        }
        Size::new(w, h)
    }
}

fn pow2_ceil(v: u32) -> u32 {
    v.checked_next_power_of_two().unwrap_or(1 << 31)
}

/// Final position of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub unit: usize,
    /// Reserved rectangle including padding and extrusion.
    pub slot: Rect,
    /// Content rectangle in stored (post-rotation) orientation.
    pub frame: Rect,
    /// Stored rotated 90° clockwise.
    pub rotated: bool,
}

/// Placement of every unit on one canvas candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementResult {
    /// Canvas the run targeted.
    pub canvas: Size,
    /// One placement per unit, indexed by unit id.
    pub placements: Vec<Placement>,
    /// Right/bottom extent of all slots plus the border.
    pub used: Size,
}

impl PlacementResult {
    pub fn placement(&self, unit: usize) -> Option<&Placement> {
        self.placements.get(unit)
    }

    /// Sum of content areas.
    pub fn content_area(&self) -> u64 {
        self.placements.iter().map(|p| p.frame.area()).sum()
    }

    pub fn footprint(&self, opts: &PackOptions) -> Size {
        opts.footprint(self.used)
    }

    /// Content area over footprint area.
    pub fn occupancy(&self, opts: &PackOptions) -> f64 {
        let area = self.footprint(opts).area();
        if area == 0 {
            0.0
        } else {
            self.content_area() as f64 / area as f64
        }
    }

    /// Checks that frames keep `padding` apart and stay inside the canvas.
    pub fn is_consistent(&self, padding: u32) -> bool {
        let bounds = Rect::from_size(0, 0, self.canvas);
        let inside = self.placements.iter().all(|p| bounds.contains(&p.frame));
        let apart = self.placements.iter().enumerate().all(|(i, a)| {
            self.placements[i + 1..]
                .iter()
                .all(|b| !rects_overlap(&a.frame, &b.frame, padding))
        });
        inside && apart
    }
}

/// Why a strategy produced no placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackFailure {
    /// The canvas cannot hold every unit; `placed` units fit before the first miss.
    InsufficientSpace { placed: usize },
    Cancelled,
}

/// Stable processing orders used by the strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOrder {
    Input,
    /// Area descending, then longer side descending, then input order.
    AreaDesc,
    /// Height descending, then input order.
    HeightDesc,
}

impl UnitOrder {
    /// Indices into `units` in processing order.
    pub fn arrange(&self, units: &[PlacementUnit]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..units.len()).collect();
        match self {
            UnitOrder::Input => {}
            UnitOrder::AreaDesc => order.sort_by(|&a, &b| {
                let (sa, sb) = (units[a].size, units[b].size);
                sb.area()
                    .cmp(&sa.area())
                    .then_with(|| sb.w.max(sb.h).cmp(&sa.w.max(sa.h)))
                    .then_with(|| a.cmp(&b))
            }),
            UnitOrder::HeightDesc => order.sort_by(|&a, &b| {
                units[b]
                    .size
                    .h
                    .cmp(&units[a].size.h)
                    .then_with(|| a.cmp(&b))
            }),
        }
        order
    }
}

/// Concrete packing strategy (a method with its heuristic resolved).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    MaxRects(MaxRectsHeuristic),
    Guillotine(GuillotineChoice, GuillotineSplit),
    Shelf,
    ShelfFfdh,
    Skyline(SkylineHeuristic),
    SimpleRow,
}

impl Strategy {
    pub fn order(&self) -> UnitOrder {
        match self {
            Strategy::MaxRects(_) | Strategy::Guillotine(..) | Strategy::Skyline(_) => {
                UnitOrder::AreaDesc
            }
            Strategy::ShelfFfdh => UnitOrder::HeightDesc,
            Strategy::Shelf | Strategy::SimpleRow => UnitOrder::Input,
        }
    }

    /// Simple Row never rotates.
    pub fn supports_rotation(&self) -> bool {
        !matches!(self, Strategy::SimpleRow)
    }

    pub fn build(&self, area: Rect, allow_rotation: bool) -> Box<dyn Packer> {
        match *self {
            Strategy::MaxRects(h) => Box::new(MaxRectsPacker::new(area, allow_rotation, h)),
            Strategy::Guillotine(c, s) => {
                Box::new(GuillotinePacker::new(area, allow_rotation, c, s))
            }
            Strategy::Shelf => Box::new(ShelfPacker::new(area, allow_rotation, ShelfPolicy::NextFit)),
            Strategy::ShelfFfdh => {
                Box::new(ShelfPacker::new(area, allow_rotation, ShelfPolicy::FirstFit))
            }
            Strategy::Skyline(h) => Box::new(SkylinePacker::new(area, allow_rotation, h)),
            Strategy::SimpleRow => Box::new(SimpleRowPacker::new(area)),
        }
    }

    /// Short label, e.g. `maxrects-bssf`.
    pub fn label(&self) -> String {
        match self {
            Strategy::MaxRects(h) => format!(
                "maxrects-{}",
                match h {
                    MaxRectsHeuristic::BestShortSideFit | MaxRectsHeuristic::Auto => "bssf",
                    MaxRectsHeuristic::BestLongSideFit => "blsf",
                    MaxRectsHeuristic::BestAreaFit => "baf",
                    MaxRectsHeuristic::BottomLeft => "bl",
                    MaxRectsHeuristic::ContactPoint => "cp",
                }
            ),
            Strategy::Guillotine(c, s) => {
                let c = match c {
                    GuillotineChoice::BestAreaFit => "baf",
                    GuillotineChoice::BestShortSideFit => "bssf",
                    GuillotineChoice::BestLongSideFit => "blsf",
                    GuillotineChoice::WorstAreaFit => "waf",
                    GuillotineChoice::WorstShortSideFit => "wssf",
                    GuillotineChoice::WorstLongSideFit => "wlsf",
                };
                let s = match s {
                    GuillotineSplit::SplitShorterLeftoverAxis => "slas",
                    GuillotineSplit::SplitLongerLeftoverAxis => "llas",
                    GuillotineSplit::SplitMinimizeArea => "minas",
                    GuillotineSplit::SplitMaximizeArea => "maxas",
                    GuillotineSplit::SplitShorterAxis => "sas",
                    GuillotineSplit::SplitLongerAxis => "las",
                };
                format!("guillotine-{}-{}", c, s)
            }
            Strategy::Shelf => "shelf".into(),
            Strategy::ShelfFfdh => "shelf-ffdh".into(),
            Strategy::Skyline(SkylineHeuristic::BottomLeft) => "skyline-bl".into(),
            Strategy::Skyline(SkylineHeuristic::MinWaste) => "skyline-mw".into(),
            Strategy::SimpleRow => "simple-row".into(),
        }
    }
}

/// Packs every unit onto `canvas` with `strategy`.
///
/// Units are processed in the strategy's stable order; `cancel` is polled before each
/// placement. The first unit that does not fit fails the whole run.
pub fn pack_units(
    strategy: &Strategy,
    units: &[PlacementUnit],
    canvas: Size,
    opts: &PackOptions,
    cancel: &CancelToken,
) -> Result<PlacementResult, PackFailure> {
    let area = opts.inner_area(canvas);
    let allow_rotation = opts.allow_rotation && strategy.supports_rotation();
    let mut packer = strategy.build(area, allow_rotation);
    let off = opts.content_offset();

    let mut placements: Vec<Option<Placement>> = vec![None; units.len()];
    let mut used = Size::default();
    for (placed, idx) in strategy.order().arrange(units).into_iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(PackFailure::Cancelled);
        }
        let unit = &units[idx];
        let Some((slot, rotated)) = packer.pack(opts.reserve(unit.size)) else {
            return Err(PackFailure::InsufficientSpace { placed });
        };
        let content = if rotated {
            unit.size.rotated()
        } else {
            unit.size
        };
        used.w = used.w.max(slot.right());
        used.h = used.h.max(slot.bottom());
        placements[idx] = Some(Placement {
            unit: idx,
            slot,
            frame: Rect::from_size(slot.x + off, slot.y + off, content),
            rotated,
        });
    }

    let placements: Vec<Placement> = placements.into_iter().flatten().collect();
    if !units.is_empty() {
        used = used.expand(opts.border_padding);
    }
    Ok(PlacementResult {
        canvas,
        placements,
        used,
    })
}
