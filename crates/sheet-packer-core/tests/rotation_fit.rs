use sheet_packer_core::cancel::CancelToken;
use sheet_packer_core::config::{
    GuillotineChoice, GuillotineSplit, MaxRectsHeuristic, SkylineHeuristic,
};
use sheet_packer_core::geometry::Size;
use sheet_packer_core::model::PlacementUnit;
use sheet_packer_core::packer::{PackFailure, PackOptions, Strategy, pack_units};

fn rotating_strategies() -> Vec<Strategy> {
    let mut out: Vec<Strategy> = MaxRectsHeuristic::ALL
        .iter()
        .map(|&h| Strategy::MaxRects(h))
        .collect();
    out.push(Strategy::Guillotine(
        GuillotineChoice::BestShortSideFit,
        GuillotineSplit::SplitLongerAxis,
    ));
    out.push(Strategy::Shelf);
    out.push(Strategy::ShelfFfdh);
    out.push(Strategy::Skyline(SkylineHeuristic::BottomLeft));
    out.push(Strategy::Skyline(SkylineHeuristic::MinWaste));
    out
}

fn opts(allow_rotation: bool) -> PackOptions {
    PackOptions {
        allow_rotation,
        padding: 0,
        border_padding: 0,
        extrude: 0,
        power_of_two: false,
        square: false,
    }
}

#[test]
fn wide_unit_fits_narrow_canvas_only_rotated() {
    let units = vec![PlacementUnit::new(0, Size::new(100, 20))];
    let canvas = Size::new(30, 120);
    for strategy in rotating_strategies() {
        let r = pack_units(&strategy, &units, canvas, &opts(true), &CancelToken::new())
            .unwrap_or_else(|f| panic!("{}: {:?}", strategy.label(), f));
        let p = r.placements[0];
        assert!(p.rotated, "{}", strategy.label());
        assert_eq!(p.frame.size(), Size::new(20, 100));
        assert_eq!((p.frame.x, p.frame.y), (0, 0));
    }
}

#[test]
fn without_rotation_the_unit_does_not_fit() {
    let units = vec![PlacementUnit::new(0, Size::new(100, 20))];
    let canvas = Size::new(30, 120);
    for strategy in rotating_strategies() {
        let r = pack_units(&strategy, &units, canvas, &opts(false), &CancelToken::new());
        assert_eq!(
            r.map(|r| r.used),
            Err(PackFailure::InsufficientSpace { placed: 0 }),
            "{}",
            strategy.label()
        );
    }
}

#[test]
fn simple_row_never_rotates() {
    let units = vec![PlacementUnit::new(0, Size::new(100, 20))];
    let r = pack_units(
        &Strategy::SimpleRow,
        &units,
        Size::new(30, 120),
        &opts(true),
        &CancelToken::new(),
    );
    assert_eq!(r.map(|r| r.used), Err(PackFailure::InsufficientSpace { placed: 0 }));
    assert!(!Strategy::SimpleRow.supports_rotation());
}
