// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Affine, Point};
use peniko::{Color, Gradient};
use understory_paint::{
    ColorRamp, CycleMethod, GradientStop, InterpolationSpace, LinearGeometry, LinearSampler,
    Paint, RadialGeometry, RadialSampler, Rgba8, device_to_local,
};

const WIDTH: usize = 512;
const ROWS: i32 = 16;

const CLEAR: Rgba8 = Rgba8 {
    r: 0,
    g: 0,
    b: 0,
    a: 0,
};

fn ramp(cycle: CycleMethod) -> Arc<ColorRamp> {
    let stops = [
        GradientStop::new(0.0, Rgba8 { r: 255, g: 0, b: 0, a: 255 }),
        GradientStop::new(0.5, Rgba8 { r: 0, g: 255, b: 0, a: 255 }),
        GradientStop::new(1.0, Rgba8 { r: 0, g: 0, b: 255, a: 255 }),
    ];
    Arc::new(ColorRamp::new(&stops, InterpolationSpace::Srgb, cycle).expect("valid stops"))
}

fn bench_samplers(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_paint_samplers");
    let to_local = device_to_local(Affine::translate((256.0, 8.0)) * Affine::rotate(0.3));
    let mut row = vec![CLEAR; WIDTH];

    let linear = LinearSampler::new(
        LinearGeometry::new(Point::new(-200.0, 0.0), Point::new(200.0, 40.0)),
        ramp(CycleMethod::Reflect),
    );
    group.bench_function(format!("linear_rows(w={WIDTH},h={ROWS})"), |b| {
        b.iter(|| {
            for y in 0..ROWS {
                linear.fill_row(black_box(to_local), 0, y, &mut row);
            }
            black_box(row[WIDTH - 1])
        });
    });

    let radial =
        RadialSampler::new(RadialGeometry::new(Point::ZERO, 300.0), ramp(CycleMethod::NoCycle))
            .expect("positive radius");
    assert!(radial.uses_fast_path(), "plain radial gradient");
    group.bench_function(format!("radial_fast_rows(w={WIDTH},h={ROWS})"), |b| {
        b.iter(|| {
            for y in 0..ROWS {
                radial.fill_row(black_box(to_local), 0, y, &mut row);
            }
            black_box(row[WIDTH - 1])
        });
    });
    group.bench_function(format!("radial_general_rows(w={WIDTH},h={ROWS})"), |b| {
        b.iter(|| {
            for y in 0..ROWS {
                radial.fill_row_general(black_box(to_local), 0, y, &mut row);
            }
            black_box(row[WIDTH - 1])
        });
    });

    let focal = RadialSampler::new(
        RadialGeometry::new(Point::ZERO, 300.0).with_focus(Point::new(120.0, -40.0), 20.0),
        ramp(CycleMethod::Repeat),
    )
    .expect("positive radius");
    group.bench_function(format!("radial_focal_rows(w={WIDTH},h={ROWS})"), |b| {
        b.iter(|| {
            for y in 0..ROWS {
                focal.fill_row(black_box(to_local), 0, y, &mut row);
            }
            black_box(row[WIDTH - 1])
        });
    });

    let gradient = Gradient::new_two_point_radial((40.0, 0.0), 10.0_f32, (0.0, 0.0), 250.0_f32)
        .with_stops([(0.0, Color::BLACK), (1.0, Color::WHITE)]);
    group.bench_function("paint_from_gradient", |b| {
        b.iter(|| black_box(Paint::from_gradient(black_box(&gradient))));
    });

    group.finish();
}

criterion_group!(benches, bench_samplers);
criterion_main!(benches);
