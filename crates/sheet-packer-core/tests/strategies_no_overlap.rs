use rand::{Rng, SeedableRng};
use sheet_packer_core::cancel::CancelToken;
use sheet_packer_core::config::{
    GuillotineChoice, GuillotineSplit, MaxRectsHeuristic, SkylineHeuristic,
};
use sheet_packer_core::geometry::{Rect, Size, rects_overlap};
use sheet_packer_core::model::PlacementUnit;
use sheet_packer_core::packer::{PackOptions, Strategy, pack_units};

fn all_strategies() -> Vec<Strategy> {
    let mut out: Vec<Strategy> = MaxRectsHeuristic::ALL
        .iter()
        .map(|&h| Strategy::MaxRects(h))
        .collect();
    out.push(Strategy::Guillotine(
        GuillotineChoice::BestAreaFit,
        GuillotineSplit::SplitShorterLeftoverAxis,
    ));
    out.push(Strategy::Guillotine(
        GuillotineChoice::WorstLongSideFit,
        GuillotineSplit::SplitMaximizeArea,
    ));
    out.push(Strategy::Shelf);
    out.push(Strategy::ShelfFfdh);
    out.push(Strategy::Skyline(SkylineHeuristic::BottomLeft));
    out.push(Strategy::Skyline(SkylineHeuristic::MinWaste));
    out.push(Strategy::SimpleRow);
    out
}

fn random_units(seed: u64, n: usize) -> Vec<PlacementUnit> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| PlacementUnit::new(i, Size::new(rng.gen_range(8..40), rng.gen_range(8..40))))
        .collect()
}

#[test]
fn every_strategy_places_without_overlap() {
    let opts = PackOptions {
        allow_rotation: true,
        padding: 2,
        border_padding: 3,
        extrude: 1,
        power_of_two: false,
        square: false,
    };
    let canvas = Size::new(512, 512);
    let inner = Rect::new(3, 3, 506, 506);
    for seed in [1u64, 2, 3] {
        let units = random_units(seed, 40);
        for strategy in all_strategies() {
            let r = pack_units(&strategy, &units, canvas, &opts, &CancelToken::new())
                .unwrap_or_else(|f| panic!("{} failed: {:?}", strategy.label(), f));
            assert_eq!(r.placements.len(), units.len());
            assert!(r.is_consistent(opts.padding), "{}", strategy.label());
            for (i, p) in r.placements.iter().enumerate() {
                assert_eq!(p.unit, i);
                assert!(inner.contains(&p.slot), "{}: slot outside", strategy.label());
                let expected = if p.rotated {
                    units[i].size.rotated()
                } else {
                    units[i].size
                };
                assert_eq!(p.frame.size(), expected);
                assert_eq!(p.slot.size(), opts.reserve(expected));
            }
            for i in 0..r.placements.len() {
                for j in (i + 1)..r.placements.len() {
                    assert!(
                        !rects_overlap(&r.placements[i].slot, &r.placements[j].slot, 0),
                        "{}: slots {} and {} overlap",
                        strategy.label(),
                        i,
                        j
                    );
                }
            }
        }
    }
}

#[test]
fn strategies_are_deterministic() {
    let opts = PackOptions {
        allow_rotation: true,
        padding: 1,
        border_padding: 0,
        extrude: 0,
        power_of_two: false,
        square: false,
    };
    let units = random_units(99, 50);
    for strategy in all_strategies() {
        let a = pack_units(&strategy, &units, Size::new(600, 600), &opts, &CancelToken::new());
        let b = pack_units(&strategy, &units, Size::new(600, 600), &opts, &CancelToken::new());
        assert_eq!(a, b, "{}", strategy.label());
    }
}

#[test]
fn used_extent_includes_border() {
    let opts = PackOptions {
        allow_rotation: false,
        padding: 0,
        border_padding: 4,
        extrude: 0,
        power_of_two: true,
        square: false,
    };
    let units = vec![PlacementUnit::new(0, Size::new(10, 20))];
    let r = pack_units(&Strategy::SimpleRow, &units, Size::new(64, 64), &opts, &CancelToken::new())
        .unwrap();
    assert_eq!(r.placements[0].frame, Rect::new(4, 4, 10, 20));
    assert_eq!(r.used, Size::new(18, 28));
    assert_eq!(r.footprint(&opts), Size::new(32, 32));
}

#[test]
fn too_small_canvas_reports_insufficient_space() {
    let opts = PackOptions {
        allow_rotation: true,
        padding: 0,
        border_padding: 0,
        extrude: 0,
        power_of_two: false,
        square: false,
    };
    let units: Vec<PlacementUnit> = (0..5).map(|i| PlacementUnit::new(i, Size::new(32, 32))).collect();
    for strategy in all_strategies() {
        let r = pack_units(&strategy, &units, Size::new(64, 64), &opts, &CancelToken::new());
        assert!(
            matches!(r, Err(sheet_packer_core::PackFailure::InsufficientSpace { placed: 4 })),
            "{}: {:?}",
            strategy.label(),
            r.map(|r| r.used)
        );
    }
}
