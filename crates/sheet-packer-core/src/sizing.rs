//! Canvas size search.
//!
//! Generates candidate canvases from a lower bound upwards and asks the packers for a
//! placement on each until one succeeds.

use crate::cancel::CancelToken;
use crate::config::{PackerConfig, SizingMode};
use crate::error::{Result, SheetPackerError};
use crate::geometry::{Size, round_down_to_power_of_two};
use crate::model::PlacementUnit;
use crate::packer::auto::{Trial, run_trials, trials_for};
use crate::packer::{PackFailure, PackOptions, PlacementResult};
use tracing::debug;

/// Successful search: final canvas and the winning placement.
#[derive(Debug, Clone)]
pub struct SizedPlacement {
    /// Canvas the atlas is emitted at.
    pub canvas: Size,
    /// Candidate canvas the placement was found on.
    pub candidate: Size,
    pub trial: Trial,
    pub result: PlacementResult,
}

/// Iterator over candidate canvases, smallest first.
#[derive(Debug, Clone)]
pub struct CandidateSizes {
    next: Option<Size>,
    cap: Size,
    power_of_two: bool,
    square: bool,
}

impl CandidateSizes {
    /// Manual sizing: the single canvas `size`.
    pub fn fixed(size: Size) -> Self {
        Self {
            next: Some(size),
            cap: size,
            power_of_two: false,
            square: false,
        }
    }

    fn step(&self, v: u32) -> u32 {
        if self.power_of_two {
            v.saturating_mul(2)
        } else {
            v.saturating_add((v / 4).max(1))
        }
    }

    /// Next candidate after `s`, or `None` once both sides are capped.
    fn grow(&self, s: Size) -> Option<Size> {
        if self.square {
            let cap = self.cap.w.min(self.cap.h);
            let v = self.step(s.w).min(cap);
            return (v > s.w).then_some(Size::new(v, v));
        }
        let w_open = s.w < self.cap.w;
        let h_open = s.h < self.cap.h;
        let grow_w = match (w_open, h_open) {
            (false, false) => return None,
            (true, false) => true,
            (false, true) => false,
            (true, true) => s.w <= s.h,
        };
        Some(if grow_w {
            Size::new(self.step(s.w).min(self.cap.w), s.h)
        } else {
            Size::new(s.w, self.step(s.h).min(self.cap.h))
        })
    }
}

impl Iterator for CandidateSizes {
    type Item = Size;

    fn next(&mut self) -> Option<Size> {
        let current = self.next?;
        self.next = self.grow(current);
        Some(current)
    }
}

/// Largest canvas the search may use: `max`, rounded down to a power of two when needed.
pub fn size_cap(cfg: &PackerConfig) -> Size {
    if cfg.power_of_two {
        Size::new(
            round_down_to_power_of_two(cfg.max_width),
            round_down_to_power_of_two(cfg.max_height),
        )
    } else {
        Size::new(cfg.max_width, cfg.max_height)
    }
}

/// Total reserved area of all units (slots, without border).
pub fn reserved_area(units: &[PlacementUnit], opts: &PackOptions) -> u64 {
    units.iter().map(|u| opts.reserve(u.size).area()).sum()
}

/// Smallest canvas worth trying: holds the largest slot, covers the total reserved area
/// and honours `min`, power-of-two and square constraints. May exceed the cap.
pub fn lower_bound(units: &[PlacementUnit], cfg: &PackerConfig) -> Size {
    let opts = PackOptions::from_config(cfg);
    let border = cfg.border_padding.saturating_mul(2);
    let (mut mw, mut mh) = (0u32, 0u32);
    for u in units {
        let r = opts.reserve(u.size);
        if cfg.allow_rotation {
            let side = r.w.min(r.h);
            mw = mw.max(side);
            mh = mh.max(side);
        } else {
            mw = mw.max(r.w);
            mh = mh.max(r.h);
        }
    }
    let mut s = Size::new(
        mw.saturating_add(border).max(cfg.min_width).max(1),
        mh.saturating_add(border).max(cfg.min_height).max(1),
    );
    let shape = |s: Size| {
        let mut s = s;
        if cfg.power_of_two {
            s = Size::new(pow2_at_least(s.w), pow2_at_least(s.h));
        }
        if cfg.square {
            let m = s.w.max(s.h);
            s = Size::new(m, m);
        }
        s
    };
    s = shape(s);

    let needed = reserved_area(units, &opts);
    let inner = |s: Size| s.w.saturating_sub(border) as u64 * s.h.saturating_sub(border) as u64;
    let unbounded = CandidateSizes {
        next: None,
        cap: Size::new(u32::MAX, u32::MAX),
        power_of_two: cfg.power_of_two,
        square: cfg.square,
    };
    while inner(s) < needed {
        match unbounded.grow(s) {
            Some(n) if n != s => s = n,
            _ => break,
        }
    }
    s
}

fn pow2_at_least(v: u32) -> u32 {
    v.checked_next_power_of_two().unwrap_or(u32::MAX)
}

/// Candidate canvases for `units` under `cfg`, or the error reported when even the
/// lower bound exceeds the maximum.
pub fn candidates(units: &[PlacementUnit], cfg: &PackerConfig) -> Result<CandidateSizes> {
    if cfg.sizing == SizingMode::Manual {
        return Ok(CandidateSizes::fixed(Size::new(cfg.max_width, cfg.max_height)));
    }
    let cap = size_cap(cfg);
    let start = lower_bound(units, cfg);
    if !start.fits_in(cap) {
        debug!(?start, ?cap, "lower bound exceeds maximum canvas");
        let at = if cfg.sizing == SizingMode::Automatic { start } else { cap };
        return Err(exhausted(cfg, units, at, 0));
    }
    Ok(CandidateSizes {
        next: Some(start),
        cap,
        power_of_two: cfg.power_of_two,
        square: cfg.square,
    })
}

fn exhausted(cfg: &PackerConfig, units: &[PlacementUnit], at: Size, placed: usize) -> SheetPackerError {
    match cfg.sizing {
        SizingMode::Automatic => SheetPackerError::AtlasTooLarge {
            key: None,
            width: at.w,
            height: at.h,
            max_width: cfg.max_width,
            max_height: cfg.max_height,
            required_area: reserved_area(units, &PackOptions::from_config(cfg)),
        },
        SizingMode::MinMax | SizingMode::Manual => SheetPackerError::InsufficientSpace {
            width: at.w,
            height: at.h,
            placed,
            total: units.len(),
        },
    }
}

/// First unit whose slot fits the largest canvas in neither orientation.
pub fn oversized_unit(units: &[PlacementUnit], cfg: &PackerConfig) -> Option<usize> {
    let opts = PackOptions::from_config(cfg);
    let inner = opts.inner_area(size_cap(cfg)).size();
    units.iter().position(|u| {
        let slot = opts.reserve(u.size);
        !(slot.fits_in(inner) || (cfg.allow_rotation && slot.rotated().fits_in(inner)))
    })
}

/// Canvas emitted for a placement found on `candidate`.
pub fn final_canvas(cfg: &PackerConfig, candidate: Size, result: &PlacementResult) -> Size {
    let opts = PackOptions::from_config(cfg);
    match cfg.sizing {
        SizingMode::Manual => candidate,
        SizingMode::Automatic => result.footprint(&opts),
        SizingMode::MinMax => opts.footprint(Size::new(
            result.used.w.max(cfg.min_width),
            result.used.h.max(cfg.min_height),
        )),
    }
}

/// Finds the first candidate canvas on which the configured method places every unit.
pub fn search(
    units: &[PlacementUnit],
    cfg: &PackerConfig,
    cancel: &CancelToken,
) -> Result<SizedPlacement> {
    let opts = PackOptions::from_config(cfg);
    let trials = trials_for(cfg);
    let mut last = (Size::new(cfg.max_width, cfg.max_height), 0usize);

    for (attempt, candidate) in candidates(units, cfg)?.enumerate() {
        if cancel.is_cancelled() {
            return Err(SheetPackerError::Cancelled);
        }
        match run_trials(&trials, units, candidate, &opts, cancel, cfg.parallel) {
            Ok(selected) => {
                let canvas = final_canvas(cfg, candidate, &selected.result);
                debug!(
                    attempt,
                    width = candidate.w,
                    height = candidate.h,
                    strategy = %selected.trial.label(),
                    "candidate packed"
                );
                return Ok(SizedPlacement {
                    canvas,
                    candidate,
                    trial: selected.trial,
                    result: selected.result,
                });
            }
            Err(PackFailure::Cancelled) => return Err(SheetPackerError::Cancelled),
            Err(PackFailure::InsufficientSpace { placed }) => {
                debug!(
                    attempt,
                    width = candidate.w,
                    height = candidate.h,
                    placed,
                    total = units.len(),
                    "candidate too small"
                );
                last = (candidate, placed);
            }
        }
    }
    Err(exhausted(cfg, units, last.0, last.1))
}
