use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use sheet_packer_core::prelude::*;
use std::hint::black_box;

fn generate_sizes(count: usize, min_size: u32, max_size: u32) -> Vec<(String, u32, u32)> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(count as u64);
    (0..count)
        .map(|i| {
            let w = rng.gen_range(min_size..=max_size);
            let h = rng.gen_range(min_size..=max_size);
            (format!("sprite_{}", i), w, h)
        })
        .collect()
}

fn bench_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("methods");

    let methods = [
        ("MaxRects", PackerMethod::MaxRects),
        ("Guillotine", PackerMethod::Guillotine),
        ("Shelf", PackerMethod::Shelf),
        ("ShelfFFDH", PackerMethod::ShelfFfdh),
        ("Skyline", PackerMethod::Skyline),
        ("SimpleRow", PackerMethod::SimpleRow),
    ];

    for count in [50, 100, 200] {
        let sizes = generate_sizes(count, 16, 64);
        group.throughput(Throughput::Elements(count as u64));

        for (name, method) in methods {
            group.bench_with_input(BenchmarkId::new(name, count), &sizes, |b, sizes| {
                b.iter(|| {
                    let cfg = PackerConfig::builder()
                        .method(method)
                        .with_max_dimensions(4096, 4096)
                        .build();
                    black_box(pack_layout(sizes.clone(), cfg))
                });
            });
        }
    }

    group.finish();
}

fn bench_auto(c: &mut Criterion) {
    let mut group = c.benchmark_group("auto_portfolio");
    group.sample_size(10);

    let sizes = generate_sizes(100, 8, 96);
    for parallel in [false, true] {
        let label = if parallel { "parallel" } else { "sequential" };
        group.bench_with_input(BenchmarkId::new(label, 100), &sizes, |b, sizes| {
            b.iter(|| {
                let cfg = PackerConfig::builder()
                    .method(PackerMethod::Auto)
                    .with_max_dimensions(4096, 4096)
                    .parallel(parallel)
                    .build();
                black_box(pack_layout(sizes.clone(), cfg))
            });
        });
    }

    group.finish();
}

fn bench_sprite_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack_sprites");

    let sprites: Vec<Sprite> = generate_sizes(64, 8, 48)
        .into_iter()
        .enumerate()
        .map(|(i, (key, w, h))| {
            let mut img = image::RgbaImage::new(w + 4, h + 4);
            for y in 2..h + 2 {
                for x in 2..w + 2 {
                    img.put_pixel(x, y, image::Rgba([i as u8, x as u8, y as u8, 255]));
                }
            }
            Sprite::new(key, img)
        })
        .collect();

    group.bench_function("trim_dedupe_pack", |b| {
        b.iter(|| {
            let cfg = PackerConfig::builder()
                .with_max_dimensions(2048, 2048)
                .extrude(1)
                .build();
            black_box(pack_sprites(sprites.clone(), cfg))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_methods, bench_auto, bench_sprite_pipeline);
criterion_main!(benches);
