use image::{Rgba, RgbaImage};
use sheet_packer_core::cancel::CancelToken;
use sheet_packer_core::geometry::Size;
use sheet_packer_core::model::PlacementUnit;
use sheet_packer_core::packer::{PackFailure, PackOptions, Strategy, pack_units};
use sheet_packer_core::sizing::search;
use sheet_packer_core::{PackerConfig, SheetPackerError, Sprite, pack_sprites_with_cancel};

fn sprites() -> Vec<Sprite> {
    (0..8)
        .map(|i| {
            Sprite::new(
                format!("s{i}"),
                RgbaImage::from_pixel(10 + i, 12, Rgba([i as u8, 1, 2, 255])),
            )
        })
        .collect()
}

#[test]
fn cancelled_token_aborts_pipeline() {
    let token = CancelToken::new();
    token.cancel();
    let err = pack_sprites_with_cancel(sprites(), PackerConfig::default(), &token)
        .err()
        .unwrap();
    assert!(err.is_cancelled());
}

#[test]
fn clones_share_the_flag() {
    let token = CancelToken::new();
    let other = token.clone();
    assert!(!other.is_cancelled());
    token.cancel();
    assert!(other.is_cancelled());
}

#[test]
fn pack_units_stops_before_placing() {
    let token = CancelToken::new();
    token.cancel();
    let units = vec![PlacementUnit::new(0, Size::new(4, 4))];
    let opts = PackOptions::from_config(&PackerConfig::default());
    let r = pack_units(&Strategy::Shelf, &units, Size::new(64, 64), &opts, &token);
    assert_eq!(r.map(|r| r.used), Err(PackFailure::Cancelled));
}

#[test]
fn search_reports_cancelled() {
    let token = CancelToken::new();
    token.cancel();
    let units: Vec<PlacementUnit> = (0..3).map(|i| PlacementUnit::new(i, Size::new(8, 8))).collect();
    let r = search(&units, &PackerConfig::default(), &token);
    assert!(matches!(r, Err(SheetPackerError::Cancelled)));
}

#[test]
fn untouched_token_does_not_interfere() {
    let out = pack_sprites_with_cancel(sprites(), PackerConfig::default(), &CancelToken::new())
        .unwrap();
    assert_eq!(out.atlas.entries.len(), 8);
}
