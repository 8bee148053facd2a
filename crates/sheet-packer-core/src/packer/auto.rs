//! Portfolio packing: run several strategies on the same canvas and keep the densest
//! result.

use super::{PackFailure, PackOptions, PlacementResult, Strategy, pack_units};
use crate::cancel::CancelToken;
use crate::config::{MaxRectsHeuristic, PackerConfig, PackerMethod, SkylineHeuristic};
use crate::geometry::Size;
use crate::model::PlacementUnit;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One strategy run with a fixed rotation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trial {
    pub strategy: Strategy,
    pub allow_rotation: bool,
}

impl Trial {
    pub fn label(&self) -> String {
        if self.allow_rotation {
            format!("{}+rot", self.strategy.label())
        } else {
            self.strategy.label()
        }
    }
}

/// Strategies tried by `Auto`, in priority order (earlier wins ties).
pub fn portfolio(cfg: &PackerConfig) -> Vec<Strategy> {
    let mut out: Vec<Strategy> = MaxRectsHeuristic::ALL
        .iter()
        .map(|&h| Strategy::MaxRects(h))
        .collect();
    out.push(Strategy::Guillotine(cfg.g_choice, cfg.g_split));
    out.push(Strategy::Shelf);
    out.push(Strategy::ShelfFfdh);
    out.push(Strategy::Skyline(SkylineHeuristic::BottomLeft));
    out.push(Strategy::Skyline(SkylineHeuristic::MinWaste));
    out.push(Strategy::SimpleRow);
    out
}

/// Expands the configured method into the trials to run.
///
/// A fixed method yields a single trial; `Auto` (and MaxRects with the `Auto`
/// heuristic) yields one trial per strategy, each with and then without rotation when
/// rotation is allowed.
pub fn trials_for(cfg: &PackerConfig) -> Vec<Trial> {
    let strategies = match cfg.method {
        PackerMethod::Auto => portfolio(cfg),
        PackerMethod::MaxRects if cfg.mr_heuristic == MaxRectsHeuristic::Auto => {
            MaxRectsHeuristic::ALL
                .iter()
                .map(|&h| Strategy::MaxRects(h))
                .collect()
        }
        PackerMethod::MaxRects => vec![Strategy::MaxRects(cfg.mr_heuristic)],
        PackerMethod::Guillotine => vec![Strategy::Guillotine(cfg.g_choice, cfg.g_split)],
        PackerMethod::Shelf => vec![Strategy::Shelf],
        PackerMethod::ShelfFfdh => vec![Strategy::ShelfFfdh],
        PackerMethod::Skyline => vec![Strategy::Skyline(cfg.skyline_heuristic)],
        PackerMethod::SimpleRow => vec![Strategy::SimpleRow],
    };
    if strategies.len() == 1 {
        return vec![Trial {
            strategy: strategies[0],
            allow_rotation: cfg.allow_rotation && strategies[0].supports_rotation(),
        }];
    }
    let mut trials = Vec::with_capacity(strategies.len() * 2);
    for strategy in strategies {
        if cfg.allow_rotation && strategy.supports_rotation() {
            trials.push(Trial {
                strategy,
                allow_rotation: true,
            });
        }
        trials.push(Trial {
            strategy,
            allow_rotation: false,
        });
    }
    trials
}

/// Winning trial and its placement.
#[derive(Debug, Clone)]
pub struct Selected {
    pub trial: Trial,
    pub result: PlacementResult,
}

fn run_trial(
    trial: &Trial,
    units: &[PlacementUnit],
    canvas: Size,
    opts: &PackOptions,
    cancel: &CancelToken,
) -> Result<PlacementResult, PackFailure> {
    let opts = PackOptions {
        allow_rotation: trial.allow_rotation,
        ..*opts
    };
    let outcome = pack_units(&trial.strategy, units, canvas, &opts, cancel);
    match &outcome {
        Ok(r) => debug!(
            trial = %trial.label(),
            footprint = ?r.footprint(&opts),
            "trial packed"
        ),
        Err(f) => debug!(trial = %trial.label(), failure = ?f, "trial failed"),
    }
    outcome
}

/// Runs every trial on `canvas` and returns the best one.
///
/// Trials run on the rayon pool when the `parallel` feature is enabled and `parallel`
/// is set; results are reduced in trial order either way, so the choice is identical.
pub fn run_trials(
    trials: &[Trial],
    units: &[PlacementUnit],
    canvas: Size,
    opts: &PackOptions,
    cancel: &CancelToken,
    parallel: bool,
) -> Result<Selected, PackFailure> {
    let run = |t: &Trial| run_trial(t, units, canvas, opts, cancel);

    #[cfg(feature = "parallel")]
    let outcomes: Vec<Result<PlacementResult, PackFailure>> = if parallel {
        trials.par_iter().map(run).collect()
    } else {
        trials.iter().map(run).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<Result<PlacementResult, PackFailure>> = {
        let _ = parallel;
        trials.iter().map(run).collect()
    };

    let idx = select_best(&outcomes, opts)?;
    let trial = trials[idx];
    let result = outcomes
        .into_iter()
        .nth(idx)
        .and_then(|o| o.ok())
        .ok_or(PackFailure::InsufficientSpace { placed: 0 })?;
    Ok(Selected { trial, result })
}

/// Index of the successful outcome with the smallest footprint (highest occupancy);
/// the lowest index wins ties. Any cancellation cancels the whole selection.
pub fn select_best(
    outcomes: &[Result<PlacementResult, PackFailure>],
    opts: &PackOptions,
) -> Result<usize, PackFailure> {
    let mut best: Option<(u64, usize)> = None;
    let mut most_placed = 0;
    for (i, outcome) in outcomes.iter().enumerate() {
        match outcome {
            Err(PackFailure::Cancelled) => return Err(PackFailure::Cancelled),
            Err(PackFailure::InsufficientSpace { placed }) => {
                most_placed = most_placed.max(*placed);
            }
            Ok(r) => {
                let area = r.footprint(opts).area();
                if best.is_none_or(|(a, _)| area < a) {
                    best = Some((area, i));
                }
            }
        }
    }
    best.map(|(_, i)| i).ok_or(PackFailure::InsufficientSpace {
        placed: most_placed,
    })
}
