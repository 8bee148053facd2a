use rand::{Rng, SeedableRng};
use sheet_packer_core::config::MaxRectsHeuristic;
use sheet_packer_core::geometry::{Rect, Size};
use sheet_packer_core::packer::Packer;
use sheet_packer_core::packer::maxrects::MaxRectsPacker;

fn disjoint(rects: &[Rect]) -> bool {
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if rects[i].intersects(&rects[j]) {
                return false;
            }
        }
    }
    true
}

#[test]
fn free_list_stays_pruned_for_every_heuristic() {
    let area = Rect::new(0, 0, 256, 256);
    for h in MaxRectsHeuristic::ALL {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut p = MaxRectsPacker::new(area, true, h);
        for _ in 0..80 {
            let size = Size::new(rng.gen_range(4..48), rng.gen_range(4..48));
            if p.pack(size).is_none() {
                break;
            }
            assert!(p.is_pruned(), "{:?}: free rect inside another", h);
            for fr in p.free_rects() {
                assert!(area.contains(fr));
                assert!(
                    p.used_rects().iter().all(|u| !u.intersects(fr)),
                    "{:?}: free rect overlaps a placed slot",
                    h
                );
            }
        }
        assert!(disjoint(p.used_rects()), "{:?}: placed slots overlap", h);
        assert!(p.used_rects().iter().all(|u| area.contains(u)));
    }
}

#[test]
fn perfect_fit_fills_the_area() {
    let mut p = MaxRectsPacker::new(Rect::new(0, 0, 64, 64), false, MaxRectsHeuristic::BestAreaFit);
    for _ in 0..4 {
        assert!(p.pack(Size::new(32, 32)).is_some());
    }
    assert!(p.free_rects().is_empty());
    assert!(p.pack(Size::new(1, 1)).is_none());
}

#[test]
fn placement_respects_offset_area() {
    let area = Rect::new(5, 5, 50, 50);
    let mut p = MaxRectsPacker::new(area, true, MaxRectsHeuristic::BottomLeft);
    let (slot, rotated) = p.pack(Size::new(20, 10)).unwrap();
    assert!(!rotated);
    assert_eq!((slot.x, slot.y), (5, 5));
    assert!(p.pack(Size::new(60, 1)).is_none());
}

#[test]
fn maxrects_is_deterministic() {
    let sizes: Vec<Size> = {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        (0..60)
            .map(|_| Size::new(rng.gen_range(8..40), rng.gen_range(8..40)))
            .collect()
    };
    let run = || {
        let mut p = MaxRectsPacker::new(
            Rect::new(0, 0, 300, 300),
            true,
            MaxRectsHeuristic::ContactPoint,
        );
        sizes.iter().map(|&s| p.pack(s)).collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}
