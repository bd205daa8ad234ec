// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use understory_paint::{
    ColorRamp, CycleMethod, GradientStop, InterpolationSpace, RampCache, RampLayout, Rgba8,
};

fn rgb(r: u8, g: u8, b: u8) -> Rgba8 {
    Rgba8 { r, g, b, a: 255 }
}

/// `n` evenly spaced stops cycling through a few hues.
fn even_stops(n: u16) -> Vec<GradientStop> {
    let hues = [rgb(255, 0, 0), rgb(0, 255, 0), rgb(0, 0, 255), rgb(255, 255, 0)];
    (0..n)
        .map(|i| {
            let offset = f32::from(i) / f32::from(n - 1);
            GradientStop::new(offset, hues[usize::from(i) % hues.len()])
        })
        .collect()
}

/// Two stops squeezed together near the start, forcing the slow layout.
fn crowded_stops() -> Vec<GradientStop> {
    vec![
        GradientStop::new(0.0, rgb(0, 0, 0)),
        GradientStop::new(0.002, rgb(255, 0, 0)),
        GradientStop::new(0.5, rgb(0, 255, 0)),
        GradientStop::new(1.0, rgb(255, 255, 255)),
    ]
}

fn bench_ramp(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_paint_ramp");

    for n in [2_u16, 8, 32] {
        let stops = even_stops(n);
        for space in [InterpolationSpace::Srgb, InterpolationSpace::LinearRgb] {
            group.bench_function(format!("build(stops={n},space={space:?})"), |b| {
                b.iter(|| {
                    let ramp = ColorRamp::new(black_box(&stops), space, CycleMethod::NoCycle);
                    black_box(ramp)
                });
            });
        }
    }

    let crowded = crowded_stops();
    group.bench_function("build_slow_layout", |b| {
        b.iter(|| {
            let ramp = ColorRamp::new(
                black_box(&crowded),
                InterpolationSpace::Srgb,
                CycleMethod::NoCycle,
            );
            black_box(ramp)
        });
    });

    let stops = even_stops(8);
    for layout in [RampLayout::Fast, RampLayout::Slow] {
        let Ok(ramp) = ColorRamp::with_layout(
            &stops,
            InterpolationSpace::Srgb,
            CycleMethod::Reflect,
            layout,
        ) else {
            continue;
        };
        group.bench_function(format!("sample_1024({layout:?})"), |b| {
            b.iter(|| {
                let mut acc = 0_u32;
                for i in 0..1024_u16 {
                    let color = ramp.sample(black_box(f32::from(i) / 512.0 - 0.5));
                    acc += u32::from(color.r);
                }
                black_box(acc)
            });
        });
    }

    group.bench_function("cache_hit", |b| {
        let mut cache = RampCache::default();
        b.iter(|| {
            let ramp =
                cache.get_or_build(black_box(&stops), InterpolationSpace::Srgb, CycleMethod::NoCycle);
            black_box(ramp)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_ramp);
criterion_main!(benches);
