use rand::{Rng, SeedableRng};
use sheet_packer_core::cancel::CancelToken;
use sheet_packer_core::geometry::Size;
use sheet_packer_core::model::PlacementUnit;
use sheet_packer_core::packer::auto::{run_trials, select_best, trials_for};
use sheet_packer_core::packer::{PackFailure, PackOptions, PlacementResult, pack_units};
use sheet_packer_core::{MaxRectsHeuristic, PackerConfig, PackerMethod, pack_layout};

fn units(seed: u64, n: usize) -> Vec<PlacementUnit> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| PlacementUnit::new(i, Size::new(rng.gen_range(4..60), rng.gen_range(4..60))))
        .collect()
}

fn auto_cfg() -> PackerConfig {
    PackerConfig {
        method: PackerMethod::Auto,
        ..Default::default()
    }
}

#[test]
fn trial_counts() {
    let cfg = auto_cfg();
    let trials = trials_for(&cfg);
    assert_eq!(trials.len(), 21);
    assert_eq!(trials[0].label(), "maxrects-bssf+rot");
    assert_eq!(trials[1].label(), "maxrects-bssf");
    assert_eq!(trials.last().map(|t| t.label()), Some("simple-row".to_string()));

    let no_rot = PackerConfig {
        allow_rotation: false,
        ..auto_cfg()
    };
    assert_eq!(trials_for(&no_rot).len(), 11);

    let mr_auto = PackerConfig {
        method: PackerMethod::MaxRects,
        mr_heuristic: MaxRectsHeuristic::Auto,
        ..Default::default()
    };
    assert_eq!(trials_for(&mr_auto).len(), 10);

    let single = PackerConfig {
        method: PackerMethod::SimpleRow,
        ..Default::default()
    };
    let t = trials_for(&single);
    assert_eq!(t.len(), 1);
    assert!(!t[0].allow_rotation);
}

#[test]
fn auto_is_no_worse_than_any_trial() {
    let cfg = auto_cfg();
    let opts = PackOptions::from_config(&cfg);
    let trials = trials_for(&cfg);
    let canvas = Size::new(420, 420);
    for seed in [3u64, 8, 21] {
        let u = units(seed, 45);
        let best = run_trials(&trials, &u, canvas, &opts, &CancelToken::new(), false).unwrap();
        let best_area = best.result.footprint(&opts).area();
        for t in &trials {
            let o = PackOptions {
                allow_rotation: t.allow_rotation,
                ..opts
            };
            if let Ok(r) = pack_units(&t.strategy, &u, canvas, &o, &CancelToken::new()) {
                assert!(best_area <= r.footprint(&opts).area(), "{} beat auto", t.label());
            }
        }
    }
}

#[test]
fn parallel_flag_does_not_change_the_choice() {
    let cfg = auto_cfg();
    let opts = PackOptions::from_config(&cfg);
    let trials = trials_for(&cfg);
    let u = units(5, 60);
    let canvas = Size::new(512, 512);
    let seq = run_trials(&trials, &u, canvas, &opts, &CancelToken::new(), false).unwrap();
    let par = run_trials(&trials, &u, canvas, &opts, &CancelToken::new(), true).unwrap();
    assert_eq!(seq.trial, par.trial);
    assert_eq!(seq.result, par.result);
}

fn result(used: Size) -> PlacementResult {
    PlacementResult {
        canvas: Size::new(128, 128),
        placements: Vec::new(),
        used,
    }
}

#[test]
fn ties_go_to_the_earlier_trial() {
    let opts = PackOptions::from_config(&PackerConfig::default());
    let outcomes = vec![
        Err(PackFailure::InsufficientSpace { placed: 3 }),
        Ok(result(Size::new(40, 40))),
        Ok(result(Size::new(40, 40))),
        Ok(result(Size::new(20, 80))),
    ];
    assert_eq!(select_best(&outcomes, &opts), Ok(1));

    let better = vec![Ok(result(Size::new(50, 50))), Ok(result(Size::new(30, 30)))];
    assert_eq!(select_best(&better, &opts), Ok(1));
}

#[test]
fn cancellation_wins_over_results() {
    let opts = PackOptions::from_config(&PackerConfig::default());
    let outcomes = vec![Ok(result(Size::new(10, 10))), Err(PackFailure::Cancelled)];
    assert_eq!(select_best(&outcomes, &opts), Err(PackFailure::Cancelled));
}

#[test]
fn all_failures_report_most_placed() {
    let opts = PackOptions::from_config(&PackerConfig::default());
    let outcomes = vec![
        Err(PackFailure::InsufficientSpace { placed: 2 }),
        Err(PackFailure::InsufficientSpace { placed: 5 }),
    ];
    assert_eq!(
        select_best(&outcomes, &opts),
        Err(PackFailure::InsufficientSpace { placed: 5 })
    );
}

#[test]
fn auto_layout_is_deterministic() {
    let inputs: Vec<(String, u32, u32)> = units(11, 40)
        .into_iter()
        .map(|u| (format!("u{}", u.id), u.size.w, u.size.h))
        .collect();
    let a = pack_layout(inputs.clone(), auto_cfg()).unwrap();
    let b = pack_layout(inputs, auto_cfg()).unwrap();
    assert_eq!((a.width, a.height), (b.width, b.height));
    assert_eq!(a.entries, b.entries);
    assert_eq!(a.meta.method, b.meta.method);
    assert!(!a.meta.trim);
}
