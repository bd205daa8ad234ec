// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Affine, Point};
use understory_paint::{
    EdgeCommand, MeshDesc, MeshGradient, MeshPatchDesc, MeshRenderOptions, MeshStop, Rgba8,
};

fn stop(edge: &str, r: u8, g: u8, b: u8) -> MeshStop {
    MeshStop::new(
        EdgeCommand::parse(edge).expect("valid edge"),
        Rgba8 { r, g, b, a: 255 },
    )
}

/// An `n` x `n` grid of slightly curved 50 x 50 cells.
fn grid(n: usize) -> MeshDesc {
    let mut rows = Vec::with_capacity(n);
    for row in 0..n {
        let mut patches = Vec::with_capacity(n);
        for column in 0..n {
            let shade = u8::try_from((row * 37 + column * 91) % 256).unwrap_or(0);
            let stops = match (row, column) {
                (0, 0) => vec![
                    stop("c 15,-5 35,5 50,0", 255, 0, 0),
                    stop("c 5,15 -5,35 0,50", 0, 255, 0),
                    stop("l -50,0", 0, 0, 255),
                    stop("l", 255, 255, 0),
                ],
                (0, _) => vec![
                    stop("c 15,-5 35,5 50,0", shade, 0, 0),
                    stop("c 5,15 -5,35 0,50", 0, shade, 0),
                    stop("l -50,0", 0, 0, shade),
                ],
                (_, 0) => vec![
                    stop("c 5,15 -5,35 0,50", 0, 0, 0),
                    stop("l -50,0", shade, shade, 0),
                    stop("l", 0, shade, shade),
                ],
                _ => vec![
                    stop("c 5,15 -5,35 0,50", 0, 0, 0),
                    stop("l -50,0", shade, 0, shade),
                ],
            };
            patches.push(MeshPatchDesc::new(stops));
        }
        rows.push(patches);
    }
    MeshDesc {
        origin: Point::ZERO,
        rows,
    }
}

fn bench_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_paint_mesh");

    for n in [1_usize, 4, 8] {
        let desc = grid(n);
        group.bench_function(format!("assemble(n={n})"), |b| {
            b.iter(|| black_box(MeshGradient::assemble(black_box(&desc))));
        });

        let mesh = MeshGradient::assemble(&desc).expect("valid mesh");
        for scale in [0.5, 1.0, 4.0] {
            group.bench_function(format!("render(n={n},scale={scale})"), |b| {
                b.iter(|| {
                    let mut leaves = 0_usize;
                    let stats = mesh.render(
                        black_box(Affine::scale(scale)),
                        &MeshRenderOptions::default(),
                        |_| leaves += 1,
                    );
                    black_box((stats, leaves))
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_mesh);
criterion_main!(benches);
