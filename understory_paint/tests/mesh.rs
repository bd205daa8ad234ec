// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end tests for mesh gradient assembly and rendering.
//!
//! Meshes are described the way a document would describe them, with
//! inherited edges and colors left out, and checked after assembly and
//! after subdivision.

use kurbo::{Affine, Point, Shape, Vec2};
use understory_paint::{
    EdgeCommand, EdgeParseError, MAX_SUBDIVISION_DEPTH, MeshDesc, MeshError, MeshErrorKind,
    MeshGradient, MeshLeaf, MeshPatchDesc, MeshRenderOptions, MeshStop, Paint, Rgba8, Side,
};

fn rgb(r: u8, g: u8, b: u8) -> Rgba8 {
    Rgba8 { r, g, b, a: 255 }
}

fn line(dx: f64, dy: f64, color: Rgba8) -> MeshStop {
    MeshStop::new(EdgeCommand::from(Vec2::new(dx, dy)), color)
}

fn parsed(edge: &str, color: Rgba8) -> MeshStop {
    MeshStop::new(EdgeCommand::parse(edge).unwrap(), color)
}

/// A 2x2 grid of 10x10 cells, each patch listing only the stops it owns.
fn grid_2x2() -> MeshDesc {
    MeshDesc {
        origin: Point::new(0.0, 0.0),
        rows: vec![
            vec![
                MeshPatchDesc::new(vec![
                    parsed("c 3,-2 7,2 10,0", rgb(255, 0, 0)),
                    line(0.0, 10.0, rgb(0, 255, 0)),
                    parsed("c -3,1 -7,-1 -10,0", rgb(0, 0, 255)),
                    parsed("l", rgb(255, 255, 0)),
                ]),
                MeshPatchDesc::new(vec![
                    line(10.0, 0.0, rgb(9, 9, 9)),
                    parsed("c 2,3 -2,7 0,10", rgb(0, 255, 255)),
                    line(-10.0, 0.0, rgb(255, 0, 255)),
                ]),
            ],
            vec![
                MeshPatchDesc::new(vec![
                    line(0.0, 10.0, rgb(9, 9, 9)),
                    line(-10.0, 0.0, rgb(128, 64, 32)),
                    parsed("l", rgb(32, 64, 128)),
                ]),
                MeshPatchDesc::new(vec![
                    line(0.0, 10.0, rgb(9, 9, 9)),
                    parsed("C 17,21 13,19 10,20", rgb(200, 200, 200)),
                ]),
            ],
        ],
    }
}

#[test]
fn shared_edges_are_exact_inverses() {
    let mesh = MeshGradient::assemble(&grid_2x2()).unwrap();
    assert_eq!((mesh.rows(), mesh.columns()), (2, 2), "grid size");
    let at = |row, column| mesh.patch(row, column).unwrap();

    assert_eq!(
        at(0, 1).patch.west,
        at(0, 0).patch.east.inverse(),
        "top row vertical seam"
    );
    assert_eq!(
        at(1, 0).patch.north,
        at(0, 0).patch.south.inverse(),
        "left column horizontal seam"
    );
    assert_eq!(
        at(1, 1).patch.north,
        at(0, 1).patch.south.inverse(),
        "right column horizontal seam"
    );
    assert_eq!(
        at(1, 1).patch.west,
        at(1, 0).patch.east.inverse(),
        "bottom row vertical seam"
    );

    for (index, patch) in mesh.patches().iter().enumerate() {
        let p = &patch.patch;
        assert_eq!(p.north.d, p.east.a, "patch {index}: north-east corner");
        assert_eq!(p.east.d, p.south.a, "patch {index}: south-east corner");
        assert_eq!(p.south.d, p.west.a, "patch {index}: south-west corner");
        assert_eq!(p.west.d, p.north.a, "patch {index}: north-west corner");
    }
    assert_eq!(at(1, 1).patch.south.a, Point::new(20.0, 20.0), "far corner");
    assert_eq!(at(1, 1).patch.south.d, Point::new(10.0, 20.0), "snapped");
}

#[test]
fn shared_corner_colors_are_equal() {
    let mesh = MeshGradient::assemble(&grid_2x2()).unwrap();
    let colors = |row, column| mesh.patch(row, column).unwrap().colors;

    // The center corner is shared by all four patches.
    let center = colors(0, 0).south;
    assert_eq!(center, rgb(0, 0, 255), "center color comes from the first patch");
    assert_eq!(colors(0, 1).west, center, "top right patch");
    assert_eq!(colors(1, 0).east, center, "bottom left patch");
    assert_eq!(colors(1, 1).north, center, "bottom right patch");

    assert_eq!(colors(0, 1).north, colors(0, 0).east, "top edge midpoint");
    assert_eq!(colors(1, 0).north, colors(0, 0).west, "left edge midpoint");
    assert_eq!(colors(1, 1).east, colors(0, 1).south, "right edge midpoint");
    assert_eq!(colors(1, 1).west, colors(1, 0).south, "bottom edge midpoint");

    assert_eq!(colors(0, 1).east, rgb(0, 255, 255), "own stop color");
    assert_eq!(colors(1, 1).south, rgb(200, 200, 200), "last patch's own color");
}

#[test]
fn assembly_errors_name_the_patch() {
    let mut desc = grid_2x2();
    desc.rows[1][1].stops.pop();
    assert_eq!(
        MeshGradient::assemble(&desc),
        Err(MeshError {
            row: 1,
            column: 1,
            kind: MeshErrorKind::NotEnoughStops {
                required: 2,
                found: 1,
            },
        }),
        "the last patch lost a stop"
    );

    let mut desc = grid_2x2();
    desc.rows[1].pop();
    assert_eq!(
        MeshGradient::assemble(&desc),
        Err(MeshError {
            row: 1,
            column: 0,
            kind: MeshErrorKind::RowLengthMismatch {
                expected: 2,
                found: 1,
            },
        }),
        "second row is short"
    );

    let mut desc = grid_2x2();
    desc.rows[0][1].stops[1] = parsed("c 2,3 -2,7", rgb(0, 0, 0));
    let err = MeshGradient::assemble(&desc).unwrap_err();
    assert_eq!((err.row, err.column), (0, 1), "position of the bad patch");
    assert_eq!(
        err.kind,
        MeshErrorKind::UnspecifiedPoint(Side::East),
        "only the closing edge may omit its end"
    );
    assert!(err.to_string().contains("east"), "{err}");

    let empty = MeshDesc {
        origin: Point::ZERO,
        rows: vec![Vec::new()],
    };
    assert_eq!(
        MeshGradient::assemble(&empty).map_err(|e| e.kind),
        Err(MeshErrorKind::Empty),
        "no patches"
    );
}

#[test]
fn edge_commands_parse() {
    assert_eq!(
        EdgeCommand::parse("c 1,2 3,4 5,6"),
        Ok(EdgeCommand::CurveTo {
            relative: true,
            c1: Point::new(1.0, 2.0),
            c2: Point::new(3.0, 4.0),
            to: Point::new(5.0, 6.0),
        }),
        "relative curve"
    );
    assert_eq!(
        EdgeCommand::parse("L 3 4"),
        Ok(EdgeCommand::line_to(Point::new(3.0, 4.0))),
        "absolute line"
    );
    assert_eq!(
        EdgeCommand::parse("l10-5"),
        Ok(EdgeCommand::from(Vec2::new(10.0, -5.0))),
        "a sign separates numbers"
    );
    assert_eq!(
        EdgeCommand::parse("z"),
        Err(EdgeParseError::UnsupportedCommand),
        "close path is not an edge"
    );
}

#[test]
fn leaves_tile_the_patch() {
    let desc = MeshDesc {
        origin: Point::new(5.0, 5.0),
        rows: vec![vec![MeshPatchDesc::new(vec![
            parsed("c 20,-15 60,15 80,0", rgb(255, 0, 0)),
            parsed("c 10,20 -10,40 0,60", rgb(0, 255, 0)),
            parsed("c -30,10 -50,-10 -80,0", rgb(0, 0, 255)),
            parsed("c -5,-20 5,-40", rgb(255, 255, 255)),
        ])]],
    };
    let mesh = MeshGradient::assemble(&desc).unwrap();
    let root = mesh.patch(0, 0).unwrap().patch.to_path().area();

    let mut leaves: Vec<MeshLeaf> = Vec::new();
    let stats = mesh.render(
        Affine::scale(2.0),
        &MeshRenderOptions::default(),
        |leaf| leaves.push(leaf),
    );
    assert_eq!(stats.leaves, leaves.len(), "one callback per leaf");
    assert!(stats.max_depth_reached > 0, "{stats:?}");

    let total: f64 = leaves.iter().map(|leaf| leaf.path.area()).sum();
    assert!(
        (total - root).abs() <= root.abs() * 1e-9,
        "leaves cover {total}, patch {root}"
    );
}

#[test]
fn adversarial_scale_is_depth_capped() {
    // Nearly uniform colors on a tiny patch viewed at an absurd scale.
    let gray = rgb(100, 100, 100);
    let almost = rgb(100, 100, 101);
    let desc = MeshDesc {
        origin: Point::ZERO,
        rows: vec![vec![MeshPatchDesc::new(vec![
            line(1e-3, 0.0, gray),
            line(0.0, 1e-3, almost),
            line(-1e-3, 0.0, gray),
            line(0.0, -1e-3, almost),
        ])]],
    };
    let mesh = MeshGradient::assemble(&desc).unwrap();
    let options = MeshRenderOptions {
        max_depth: u32::MAX,
        ..MeshRenderOptions::default()
    };
    let mut leaves = 0_usize;
    let stats = mesh.render(Affine::scale(1e12), &options, |_| leaves += 1);
    assert_eq!(stats.max_depth_reached, MAX_SUBDIVISION_DEPTH, "{stats:?}");
    assert_eq!(
        leaves,
        4_usize.pow(MAX_SUBDIVISION_DEPTH),
        "every branch stops at the cap"
    );
}

#[test]
fn mesh_paints_render_as_leaves() {
    let mesh = MeshGradient::assemble(&grid_2x2()).unwrap();
    let paint = Paint::from(mesh);
    assert!(paint.is_opaque(), "every corner color is opaque");
    assert!(
        paint.sample(Point::new(1.0, 1.0)).is_none(),
        "meshes are not sampled per pixel"
    );
    let mut row = [rgb(0, 0, 0); 4];
    assert!(
        !paint.fill_row(Affine::IDENTITY, 0, 0, &mut row),
        "meshes do not fill rows"
    );

    let mesh = paint.as_mesh().unwrap();
    let mut colors = Vec::new();
    mesh.render(
        Affine::IDENTITY,
        &MeshRenderOptions {
            max_depth: 0,
            ..MeshRenderOptions::default()
        },
        |leaf| colors.push(leaf.color),
    );
    assert_eq!(colors.len(), 4, "one leaf per patch");
}
