use sheet_packer_core::cancel::CancelToken;
use sheet_packer_core::geometry::{Rect, Size};
use sheet_packer_core::model::PlacementUnit;
use sheet_packer_core::packer::shelf::{ShelfPacker, ShelfPolicy};
use sheet_packer_core::packer::{PackOptions, Packer, Strategy, pack_units};

fn tight() -> PackOptions {
    PackOptions {
        allow_rotation: false,
        padding: 0,
        border_padding: 0,
        extrude: 0,
        power_of_two: false,
        square: false,
    }
}

fn units(sizes: &[(u32, u32)]) -> Vec<PlacementUnit> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| PlacementUnit::new(i, Size::new(w, h)))
        .collect()
}

#[test]
fn ffdh_reuses_earlier_shelf() {
    let u = units(&[(60, 40), (60, 30), (30, 20)]);
    let r = pack_units(&Strategy::ShelfFfdh, &u, Size::new(100, 100), &tight(), &CancelToken::new())
        .unwrap();
    assert_eq!(r.placements[0].slot, Rect::new(0, 0, 60, 40));
    assert_eq!(r.placements[1].slot, Rect::new(0, 40, 60, 30));
    assert_eq!(r.placements[2].slot, Rect::new(60, 0, 30, 20));
    assert_eq!(r.used, Size::new(90, 70));
}

#[test]
fn next_fit_only_looks_at_the_last_shelf() {
    let u = units(&[(60, 40), (60, 30), (30, 20)]);
    let r = pack_units(&Strategy::Shelf, &u, Size::new(100, 100), &tight(), &CancelToken::new())
        .unwrap();
    assert_eq!(r.placements[2].slot, Rect::new(60, 40, 30, 20));
}

#[test]
fn ffdh_processes_tallest_first() {
    let u = units(&[(20, 10), (20, 50), (20, 30)]);
    let r = pack_units(&Strategy::ShelfFfdh, &u, Size::new(100, 100), &tight(), &CancelToken::new())
        .unwrap();
    assert_eq!((r.placements[1].slot.x, r.placements[1].slot.y), (0, 0));
    assert_eq!((r.placements[2].slot.x, r.placements[2].slot.y), (20, 0));
    assert_eq!((r.placements[0].slot.x, r.placements[0].slot.y), (40, 0));
}

#[test]
fn shelf_height_is_set_by_the_opening_slot() {
    let mut p = ShelfPacker::new(Rect::new(0, 0, 64, 64), false, ShelfPolicy::NextFit);
    p.pack(Size::new(16, 20)).unwrap();
    p.pack(Size::new(16, 8)).unwrap();
    // taller than the open shelf: a new one starts below
    let (slot, _) = p.pack(Size::new(16, 24)).unwrap();
    assert_eq!((slot.x, slot.y), (0, 20));
    assert_eq!(p.shelves(), vec![(0, 20), (20, 24)]);
    assert!(p.pack(Size::new(16, 30)).is_none());
}

#[test]
fn rotation_lowers_a_new_shelf() {
    let mut p = ShelfPacker::new(Rect::new(0, 0, 100, 100), true, ShelfPolicy::FirstFit);
    let (slot, rotated) = p.pack(Size::new(10, 40)).unwrap();
    assert!(rotated);
    assert_eq!(slot.size(), Size::new(40, 10));
}
