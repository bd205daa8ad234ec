// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mesh gradients: grids of Coons patches with per-corner colors.
//!
//! A [`MeshDesc`] lists, row by row, the stops of every patch. Each stop
//! contributes one edge and one corner color; edges and colors shared with
//! the patch above or to the left are inherited instead of repeated, so the
//! first patch needs four stops, the rest of the first row and the rest of
//! the first column three, and every other patch two.
//!
//! [`MeshGradient::assemble`] resolves the description into a validated grid
//! once. [`MeshGradient::render`] then subdivides every patch until its color
//! spread is invisible (or a depth cap is hit) and reports each leaf as a
//! flat-colored outline.

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, BezPath, Point};

use crate::bezier::{Bezier, MAX_SUBDIVISION_DEPTH};
use crate::color::{Rgba8, round_channel};
use crate::coons::{CoonsPatch, CornerWeights};
use crate::edge::EdgeCommand;
use crate::error::{MeshError, MeshErrorKind, Side};
use crate::ramp::narrow;

/// One stop of a mesh patch: the edge leaving a corner and that corner's color.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshStop {
    /// The edge starting at this corner.
    pub edge: EdgeCommand,
    /// Color of the corner.
    pub color: Rgba8,
}

impl MeshStop {
    /// Creates a stop.
    #[must_use]
    pub const fn new(edge: EdgeCommand, color: Rgba8) -> Self {
        Self { edge, color }
    }
}

/// The stops of one patch, in corner order starting from the first corner
/// the patch does not inherit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshPatchDesc {
    /// Stops of the patch.
    pub stops: Vec<MeshStop>,
}

impl MeshPatchDesc {
    /// Creates a patch description.
    #[must_use]
    pub fn new(stops: Vec<MeshStop>) -> Self {
        Self { stops }
    }
}

/// A mesh gradient description: a start point and rows of patches.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshDesc {
    /// Top-left corner of the first patch.
    pub origin: Point,
    /// Patch rows; every row must have the same length.
    pub rows: Vec<Vec<MeshPatchDesc>>,
}

/// Corner colors of a patch, named like [`CornerWeights`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CornerColors {
    /// Top-left color.
    pub north: Rgba8,
    /// Top-right color.
    pub east: Rgba8,
    /// Bottom-right color.
    pub south: Rgba8,
    /// Bottom-left color.
    pub west: Rgba8,
}

impl CornerColors {
    /// Bilinear blend at `(u, v)` in the unit square.
    ///
    /// `u` runs west to east and `v` north to south.
    #[must_use]
    pub fn blend(&self, u: f32, v: f32) -> Rgba8 {
        let channel = |n: u8, e: u8, s: u8, w: u8| {
            let top = lerp(u, f32::from(n), f32::from(e));
            let bottom = lerp(u, f32::from(w), f32::from(s));
            round_channel(lerp(v, top, bottom))
        };
        Rgba8 {
            r: channel(self.north.r, self.east.r, self.south.r, self.west.r),
            g: channel(self.north.g, self.east.g, self.south.g, self.west.g),
            b: channel(self.north.b, self.east.b, self.south.b, self.west.b),
            a: channel(self.north.a, self.east.a, self.south.a, self.west.a),
        }
    }

    fn is_opaque(&self) -> bool {
        [self.north, self.east, self.south, self.west]
            .iter()
            .all(|c| c.a == 0xFF)
    }
}

#[inline]
fn lerp(t: f32, a: f32, b: f32) -> f32 {
    (1.0 - t) * a + t * b
}

/// An assembled patch: geometry plus corner colors.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshPatch {
    /// The patch geometry.
    pub patch: CoonsPatch,
    /// The corner colors.
    pub colors: CornerColors,
}

/// Tuning for [`MeshGradient::render`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshRenderOptions {
    /// Subdivision depth limit; values above [`MAX_SUBDIVISION_DEPTH`] are clamped.
    pub max_depth: u32,
    /// A patch stops subdividing once [`CornerWeights::spread`] drops below this.
    pub flatness_threshold: f64,
}

impl Default for MeshRenderOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_SUBDIVISION_DEPTH,
            flatness_threshold: 1e-6,
        }
    }
}

/// A flat-colored piece of a rendered mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshLeaf {
    /// Closed outline in local coordinates.
    pub path: BezPath,
    /// Fill color.
    pub color: Rgba8,
}

/// Counters from one [`MeshGradient::render`] call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Number of leaves emitted.
    pub leaves: usize,
    /// Deepest subdivision level reached; root patches are level 0.
    pub max_depth_reached: u32,
}

/// A validated grid of [`MeshPatch`]es.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshGradient {
    columns: usize,
    patches: Vec<MeshPatch>,
}

impl MeshGradient {
    /// Resolves a mesh description into a patch grid.
    ///
    /// Fails on the first patch that is not fully defined, with its row and
    /// column; no partial mesh is returned.
    pub fn assemble(desc: &MeshDesc) -> Result<Self, MeshError> {
        Self::assemble_rows(desc).inspect_err(|err| log::warn!("mesh gradient rejected: {err}"))
    }

    fn assemble_rows(desc: &MeshDesc) -> Result<Self, MeshError> {
        let columns = desc.rows.first().map_or(0, Vec::len);
        if columns == 0 {
            return Err(MeshError {
                row: 0,
                column: 0,
                kind: MeshErrorKind::Empty,
            });
        }

        let mut patches: Vec<MeshPatch> = Vec::with_capacity(columns * desc.rows.len());
        let mut start = desc.origin;
        for (row, patch_descs) in desc.rows.iter().enumerate() {
            if patch_descs.len() != columns {
                return Err(MeshError {
                    row,
                    column: 0,
                    kind: MeshErrorKind::RowLengthMismatch {
                        expected: columns,
                        found: patch_descs.len(),
                    },
                });
            }
            for (column, patch_desc) in patch_descs.iter().enumerate() {
                let above = (row > 0).then(|| patches[(row - 1) * columns + column]);
                let left = (column > 0).then(|| patches[row * columns + column - 1]);
                let required = required_stops(row, column);
                let patch = build_patch(patch_desc, required, above, left, &mut start)
                    .and_then(|p| validate(&p.patch).map(|()| p))
                    .map_err(|kind| MeshError { row, column, kind })?;
                patches.push(patch);
            }
        }
        Ok(Self { columns, patches })
    }

    /// Number of patch rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.patches.len() / self.columns
    }

    /// Number of patches per row.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// The patch at `(row, column)`.
    #[must_use]
    pub fn patch(&self, row: usize, column: usize) -> Option<&MeshPatch> {
        if column >= self.columns {
            return None;
        }
        self.patches.get(row * self.columns + column)
    }

    /// All patches in row-major order.
    #[must_use]
    pub fn patches(&self) -> &[MeshPatch] {
        &self.patches
    }

    /// Whether every corner color is fully opaque.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.patches.iter().all(|p| p.colors.is_opaque())
    }

    /// Subdivides every patch and hands each flat-colored leaf to `sink`.
    ///
    /// `local_to_device` only decides how finely to subdivide; leaf outlines
    /// stay in local coordinates. Patches are rendered in row-major order and
    /// each patch's quadrants in NW, NE, SE, SW order.
    pub fn render(
        &self,
        local_to_device: Affine,
        options: &MeshRenderOptions,
        mut sink: impl FnMut(MeshLeaf),
    ) -> RenderStats {
        let [a, b, c, d, ..] = local_to_device.as_coeffs();
        let scale_x = a.hypot(b);
        let scale_y = c.hypot(d);
        let max_depth = options.max_depth.min(MAX_SUBDIVISION_DEPTH);

        let mut stats = RenderStats::default();
        for patch in &self.patches {
            let depth = patch
                .patch
                .estimate_step_count(scale_x, scale_y)
                .min(max_depth);
            let mut renderer = PatchRenderer {
                colors: &patch.colors,
                scale_x,
                scale_y,
                threshold: options.flatness_threshold,
                sink: &mut sink,
                stats: &mut stats,
            };
            renderer.render(&patch.patch, depth, 0);
        }
        log::trace!(
            "mesh gradient rendered {} leaves, depth {}",
            stats.leaves,
            stats.max_depth_reached
        );
        stats
    }
}

struct PatchRenderer<'a, F> {
    colors: &'a CornerColors,
    scale_x: f64,
    scale_y: f64,
    threshold: f64,
    sink: &'a mut F,
    stats: &'a mut RenderStats,
}

impl<F: FnMut(MeshLeaf)> PatchRenderer<'_, F> {
    fn render(&mut self, patch: &CoonsPatch, remaining: u32, level: u32) {
        if remaining == 0 || patch.weights.spread(self.scale_x, self.scale_y) < self.threshold {
            let centroid = patch.weights.centroid();
            let color = self.colors.blend(narrow(centroid.x), narrow(centroid.y));
            self.stats.leaves += 1;
            self.stats.max_depth_reached = self.stats.max_depth_reached.max(level);
            (self.sink)(MeshLeaf {
                path: patch.to_path(),
                color,
            });
            return;
        }
        for child in patch.subdivide().into_draw_order() {
            self.render(&child, remaining - 1, level + 1);
        }
    }
}

/// Stops a patch needs at its grid position.
fn required_stops(row: usize, column: usize) -> usize {
    match (row > 0, column > 0) {
        (false, false) => 4,
        (false, true) | (true, false) => 3,
        (true, true) => 2,
    }
}

#[derive(Default)]
struct PartialPatch {
    north: Option<Bezier>,
    east: Option<Bezier>,
    south: Option<Bezier>,
    west: Option<Bezier>,
}

/// Resolves one patch; `above` and `left` are its already assembled neighbors.
fn build_patch(
    desc: &MeshPatchDesc,
    required: usize,
    above: Option<MeshPatch>,
    left: Option<MeshPatch>,
    start: &mut Point,
) -> Result<MeshPatch, MeshErrorKind> {
    if desc.stops.len() < required {
        return Err(MeshErrorKind::NotEnoughStops {
            required,
            found: desc.stops.len(),
        });
    }
    let offset = usize::from(above.is_some());
    let closes_on_left = offset + required < 4;

    let mut edges = PartialPatch::default();
    let mut colors = CornerColors {
        north: desc.stops[0].color,
        east: desc.stops[0].color,
        south: desc.stops[0].color,
        west: desc.stops[0].color,
    };

    if let Some(above) = above {
        edges.north = Some(above.patch.south.inverse());
        colors.north = above.colors.west;
        colors.east = above.colors.south;
    }
    if let (true, Some(left)) = (closes_on_left, left) {
        edges.west = Some(left.patch.east.inverse());
        colors.west = left.colors.south;
    }

    for (i, stop) in desc.stops[..required].iter().enumerate() {
        match i + offset {
            0 => {
                let north = stop.edge.to_bezier(*start);
                *start = north.d;
                edges.north = Some(north);
                colors.north = left.map_or(stop.color, |l| l.colors.east);
            }
            1 => {
                let from = end_of(edges.north, Side::North)?;
                edges.east = Some(stop.edge.to_bezier(from));
                if above.is_none() {
                    colors.east = stop.color;
                }
            }
            2 => {
                let from = end_of(edges.east, Side::East)?;
                edges.south = Some(match (closes_on_left, left) {
                    (true, Some(left)) => stop.edge.to_closing_bezier(from, left.patch.east.d),
                    _ => stop.edge.to_bezier(from),
                });
                colors.south = stop.color;
            }
            _ => {
                let from = end_of(edges.south, Side::South)?;
                let close = edges
                    .north
                    .map(|n| n.a)
                    .ok_or(MeshErrorKind::MissingEdge(Side::North))?;
                edges.west = Some(stop.edge.to_closing_bezier(from, close));
                colors.west = stop.color;
            }
        }
    }

    let patch = CoonsPatch::new(
        edges.north.ok_or(MeshErrorKind::MissingEdge(Side::North))?,
        edges.east.ok_or(MeshErrorKind::MissingEdge(Side::East))?,
        edges.south.ok_or(MeshErrorKind::MissingEdge(Side::South))?,
        edges.west.ok_or(MeshErrorKind::MissingEdge(Side::West))?,
    );
    Ok(MeshPatch { patch, colors })
}

fn end_of(edge: Option<Bezier>, side: Side) -> Result<Point, MeshErrorKind> {
    edge.map(|e| e.d).ok_or(MeshErrorKind::MissingEdge(side))
}

fn validate(patch: &CoonsPatch) -> Result<(), MeshErrorKind> {
    let edges = [
        (Side::North, patch.north),
        (Side::East, patch.east),
        (Side::South, patch.south),
        (Side::West, patch.west),
    ];
    for (side, edge) in edges {
        if !edge.is_finite() {
            return Err(MeshErrorKind::UnspecifiedPoint(side));
        }
    }
    for pair in [0, 1, 2, 3].map(|i| (edges[i], edges[(i + 1) % 4])) {
        let ((_, previous), (side, edge)) = pair;
        if previous.d != edge.a {
            return Err(MeshErrorKind::Disconnected(side));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use kurbo::{Shape, Vec2};

    fn rgb(r: u8, g: u8, b: u8) -> Rgba8 {
        Rgba8 { r, g, b, a: 255 }
    }

    fn step(dx: f64, dy: f64, color: Rgba8) -> MeshStop {
        MeshStop::new(EdgeCommand::from(Vec2::new(dx, dy)), color)
    }

    /// One 10x10 patch of straight edges.
    fn single_patch(colors: [Rgba8; 4]) -> MeshDesc {
        MeshDesc {
            origin: Point::new(0.0, 0.0),
            rows: vec![vec![MeshPatchDesc::new(vec![
                step(10.0, 0.0, colors[0]),
                step(0.0, 10.0, colors[1]),
                step(-10.0, 0.0, colors[2]),
                step(0.0, -10.0, colors[3]),
            ])]],
        }
    }

    #[test]
    fn single_patch_assembles() {
        let mesh = MeshGradient::assemble(&single_patch([
            rgb(255, 0, 0),
            rgb(0, 255, 0),
            rgb(0, 0, 255),
            rgb(255, 255, 0),
        ]))
        .unwrap();
        assert_eq!((mesh.rows(), mesh.columns()), (1, 1), "one patch");
        let p = mesh.patch(0, 0).unwrap();
        assert_eq!(p.patch.north.a, Point::ZERO, "starts at the origin");
        assert_eq!(p.patch.south.a, Point::new(10.0, 10.0), "SE corner");
        assert_eq!(p.colors.east, rgb(0, 255, 0), "NE color from the second stop");
        assert!(mesh.patch(0, 1).is_none(), "out of range");
        assert!(mesh.is_opaque(), "opaque corners");
    }

    #[test]
    fn blend_hits_the_corners() {
        let colors = CornerColors {
            north: rgb(255, 0, 0),
            east: rgb(0, 255, 0),
            south: rgb(0, 0, 255),
            west: rgb(255, 255, 255),
        };
        let weights = CornerWeights::UNIT;
        let at = |p: Point| colors.blend(narrow(p.x), narrow(p.y));
        assert_eq!(at(weights.north), colors.north, "top-left");
        assert_eq!(at(weights.east), colors.east, "top-right");
        assert_eq!(at(weights.south), colors.south, "bottom-right");
        assert_eq!(at(weights.west), colors.west, "bottom-left");
        let center = colors.blend(0.5, 0.5);
        assert_eq!(center, Rgba8 { r: 128, g: 128, b: 128, a: 255 }, "average, rounded up");
    }

    #[test]
    fn uniform_patch_is_a_single_leaf() {
        let white = rgb(255, 255, 255);
        let mesh = MeshGradient::assemble(&single_patch([white; 4])).unwrap();
        let mut leaves = Vec::new();
        // Weights still spread, so only a depth of 0 stops at the root.
        let options = MeshRenderOptions {
            max_depth: 0,
            ..MeshRenderOptions::default()
        };
        let stats = mesh.render(Affine::IDENTITY, &options, |leaf| leaves.push(leaf));
        assert_eq!(stats, RenderStats { leaves: 1, max_depth_reached: 0 }, "root only");
        assert_eq!(leaves[0].color, white, "flat color");
        assert!((leaves[0].path.area().abs() - 100.0).abs() < 1e-9, "whole patch");
    }

    #[test]
    fn render_depth_follows_device_scale() {
        let mesh = MeshGradient::assemble(&single_patch([
            rgb(0, 0, 0),
            rgb(255, 0, 0),
            rgb(255, 255, 0),
            rgb(0, 255, 0),
        ]))
        .unwrap();
        let options = MeshRenderOptions::default();
        let small = mesh.render(Affine::scale(0.1), &options, |_| {});
        let large = mesh.render(Affine::scale(10.0), &options, |_| {});
        assert!(
            small.max_depth_reached < large.max_depth_reached,
            "{small:?} vs {large:?}"
        );
        assert!(large.max_depth_reached <= MAX_SUBDIVISION_DEPTH, "capped");
        assert_eq!(
            small.leaves,
            4_usize.pow(small.max_depth_reached),
            "uniform depth for a square patch"
        );
    }

    #[test]
    fn missing_stops_are_reported_with_position() {
        let mut desc = single_patch([rgb(0, 0, 0); 4]);
        desc.rows[0][0].stops.truncate(3);
        let err = MeshGradient::assemble(&desc).unwrap_err();
        assert_eq!(
            err,
            MeshError {
                row: 0,
                column: 0,
                kind: MeshErrorKind::NotEnoughStops {
                    required: 4,
                    found: 3
                }
            },
            "first patch needs four stops"
        );
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let err = MeshGradient::assemble(&MeshDesc::default()).unwrap_err();
        assert_eq!(err.kind, MeshErrorKind::Empty, "no rows");
    }

    #[test]
    fn unspecified_point_is_rejected() {
        let mut desc = single_patch([rgb(0, 0, 0); 4]);
        // An open end is only legal on the closing edge.
        desc.rows[0][0].stops[1].edge = EdgeCommand::parse("l").unwrap();
        let err = MeshGradient::assemble(&desc).unwrap_err();
        assert_eq!(err.kind, MeshErrorKind::UnspecifiedPoint(Side::East), "east is open");
    }
}
