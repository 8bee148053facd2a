use image::{Rgba, RgbaImage};
use sheet_packer_core::prelude::*;

fn tile(key: String, w: u32, h: u32, shade: u8) -> Sprite {
    Sprite::new(key, RgbaImage::from_pixel(w, h, Rgba([shade, 0, 0, 255])))
}

#[test]
fn test_pack_stats_basic() {
    let cfg = PackerConfig {
        max_width: 256,
        max_height: 256,
        padding: 0,
        trim: false,
        method: PackerMethod::Skyline,
        ..Default::default()
    };

    // 4 distinct sprites of 64x64 each
    let sprites: Vec<Sprite> = (0..4)
        .map(|i| tile(format!("tex_{}", i), 64, 64, 40 * i as u8 + 1))
        .collect();

    let out = pack_sprites(sprites, cfg).expect("packing should succeed");
    let stats = out.stats();

    assert_eq!(stats.num_entries, 4);
    assert_eq!(stats.num_units, 4);
    assert_eq!(stats.num_aliases, 0);
    assert_eq!(stats.used_area, 4 * 64 * 64);

    assert!(stats.occupancy > 0.25, "Occupancy: {}", stats.occupancy);
    assert!(stats.occupancy <= 1.0);
    assert!(stats.canvas_area >= stats.used_area);

    assert_eq!(stats.num_rotated, 0);
    assert_eq!(stats.num_trimmed, 0);
    assert_eq!(stats.num_flipped, 0);
}

#[test]
fn test_pack_stats_counts_aliases_once() {
    let cfg = PackerConfig {
        padding: 0,
        ..Default::default()
    };
    let sprites: Vec<Sprite> = (0..3).map(|i| tile(format!("dup_{}", i), 20, 10, 9)).collect();

    let out = pack_sprites(sprites, cfg).unwrap();
    let stats = out.stats();
    assert_eq!(stats.num_entries, 3);
    assert_eq!(stats.num_units, 1);
    assert_eq!(stats.num_aliases, 2);
    assert_eq!(stats.used_area, 200);
    assert_eq!(out.atlas.entry("dup_2").and_then(|e| e.alias_of.clone()), Some("dup_0".into()));
}

#[test]
fn test_pack_stats_trimmed_and_flipped() {
    let cfg = PackerConfig {
        padding: 0,
        allow_flip: true,
        ..Default::default()
    };
    let mut left = RgbaImage::new(16, 16);
    left.put_pixel(2, 5, Rgba([255, 255, 255, 255]));
    left.put_pixel(6, 5, Rgba([0, 0, 255, 255]));
    let mut right = RgbaImage::new(16, 16);
    right.put_pixel(2, 5, Rgba([0, 0, 255, 255]));
    right.put_pixel(6, 5, Rgba([255, 255, 255, 255]));

    let out = pack_sprites(vec![Sprite::new("l", left), Sprite::new("r", right)], cfg).unwrap();
    let stats = out.stats();
    assert_eq!(stats.num_trimmed, 2);
    assert_eq!(stats.num_flipped, 1);
    assert_eq!(stats.num_units, 1);
}

#[test]
fn test_pack_stats_summary() {
    let cfg = PackerConfig {
        padding: 0,
        trim: false,
        ..Default::default()
    };
    let sprites: Vec<Sprite> = (0..3)
        .map(|i| tile(format!("s{}", i), 32, 32, 50 * i as u8 + 3))
        .collect();

    let out = pack_sprites(sprites, cfg).unwrap();
    let stats = out.stats();
    let summary = stats.summary();

    assert!(summary.contains("Canvas:"));
    assert!(summary.contains("Sprites: 3"));
    assert!(summary.contains("Occupancy:"));
}

#[test]
fn test_wasted_area() {
    let cfg = PackerConfig {
        sizing: SizingMode::Manual,
        max_width: 128,
        max_height: 128,
        padding: 0,
        trim: false,
        ..Default::default()
    };
    let out = pack_sprites(vec![tile("one".into(), 64, 64, 7)], cfg).unwrap();
    let stats = out.stats();

    assert_eq!(stats.canvas_area, 128 * 128);
    assert_eq!(stats.wasted_area(), 128 * 128 - 64 * 64);
    assert!((stats.waste_percentage() - 75.0).abs() < 1e-9);
}
