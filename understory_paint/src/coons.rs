// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coons patches and their quadtree subdivision.
//!
//! A patch is bounded by four cubic edges laid head to tail:
//!
//! ```text
//!        north →
//!   NW ─────────── NE
//!    │              │
//!  ↑ west        east ↓
//!    │              │
//!   SW ─────────── SE
//!        ← south
//! ```
//!
//! Alongside the geometry, each patch carries [`CornerWeights`]: the position
//! of its corners in the unit square of the root patch. Subdividing both
//! in lockstep tells every leaf where it sits in the bilinear color blend.

use kurbo::{BezPath, Point};

use crate::bezier::{Bezier, distance_squared};

/// The four quadrants produced by one subdivision step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Subdivided<T> {
    /// Top-left quadrant.
    pub north_west: T,
    /// Top-right quadrant.
    pub north_east: T,
    /// Bottom-left quadrant.
    pub south_west: T,
    /// Bottom-right quadrant.
    pub south_east: T,
}

impl<T> Subdivided<T> {
    /// The quadrants in drawing order: NW, NE, SE, SW.
    #[must_use]
    pub fn into_draw_order(self) -> [T; 4] {
        [
            self.north_west,
            self.north_east,
            self.south_east,
            self.south_west,
        ]
    }
}

/// Corner positions of a (sub)patch inside the unit square of its root patch.
///
/// The root patch has `north = (0, 0)`, `east = (1, 0)`, `south = (1, 1)` and
/// `west = (0, 1)`, naming each corner after the edge that starts there.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CornerWeights {
    /// Weight of the top-left corner.
    pub north: Point,
    /// Weight of the top-right corner.
    pub east: Point,
    /// Weight of the bottom-right corner.
    pub south: Point,
    /// Weight of the bottom-left corner.
    pub west: Point,
}

impl CornerWeights {
    /// Weights of a root patch.
    pub const UNIT: Self = Self {
        north: Point::new(0.0, 0.0),
        east: Point::new(1.0, 0.0),
        south: Point::new(1.0, 1.0),
        west: Point::new(0.0, 1.0),
    };

    /// Splits the weight square into quadrants matching [`CoonsPatch::subdivide`].
    #[must_use]
    pub fn subdivide(&self) -> Subdivided<Self> {
        let mid_north = self.north.midpoint(self.east);
        let mid_west = self.north.midpoint(self.west);
        let mid_south = self.west.midpoint(self.south);
        let mid_east = self.east.midpoint(self.south);
        let center = mid_south.midpoint(mid_north);
        Subdivided {
            north_west: Self {
                north: self.north,
                east: mid_north,
                south: center,
                west: mid_west,
            },
            north_east: Self {
                north: mid_north,
                east: self.east,
                south: mid_east,
                west: center,
            },
            south_west: Self {
                north: mid_west,
                east: center,
                south: mid_south,
                west: self.west,
            },
            south_east: Self {
                north: center,
                east: mid_east,
                south: self.south,
                west: mid_south,
            },
        }
    }

    /// Average of the four corners.
    #[must_use]
    pub fn centroid(&self) -> Point {
        Point::new(
            (self.north.x + self.east.x + self.south.x + self.west.x) / 4.0,
            (self.north.y + self.east.y + self.south.y + self.west.y) / 4.0,
        )
    }

    /// Product of the scaled squared diagonals.
    ///
    /// Once this falls below about `1e-6`, the color spread across the patch
    /// is below one 8-bit step.
    #[must_use]
    pub fn spread(&self, scale_x: f64, scale_y: f64) -> f64 {
        distance_squared(self.north, self.south, scale_x, scale_y)
            * distance_squared(self.east, self.west, scale_x, scale_y)
    }
}

impl Default for CornerWeights {
    fn default() -> Self {
        Self::UNIT
    }
}

/// A Coons patch: four head-to-tail cubic edges plus its [`CornerWeights`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CoonsPatch {
    /// Top edge, NW to NE.
    pub north: Bezier,
    /// Right edge, NE to SE.
    pub east: Bezier,
    /// Bottom edge, SE to SW.
    pub south: Bezier,
    /// Left edge, SW to NW.
    pub west: Bezier,
    /// Corner positions in the root patch's unit square.
    pub weights: CornerWeights,
}

impl CoonsPatch {
    /// Creates a root patch from its edges.
    #[must_use]
    pub fn new(north: Bezier, east: Bezier, south: Bezier, west: Bezier) -> Self {
        Self {
            north,
            east,
            south,
            west,
            weights: CornerWeights::UNIT,
        }
    }

    /// Corner points in the order NW, NE, SE, SW.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [self.north.a, self.east.a, self.south.a, self.west.a]
    }

    /// Largest [`Bezier::estimate_step_count`] over the four edges.
    #[must_use]
    pub fn estimate_step_count(&self, scale_x: f64, scale_y: f64) -> u32 {
        [self.north, self.east, self.south, self.west]
            .iter()
            .map(|edge| edge.estimate_step_count(scale_x, scale_y))
            .max()
            .unwrap_or(0)
    }

    /// Splits the patch into four quadrants.
    ///
    /// Edges shared by two quadrants are exact inverses of each other, and
    /// all four quadrants meet in one center point.
    #[must_use]
    pub fn subdivide(&self) -> Subdivided<Self> {
        let Self {
            north,
            east,
            south,
            west,
            weights,
        } = *self;

        let mid_north_linear = north.a.midpoint(north.d);
        let mid_south_linear = south.d.midpoint(south.a);
        let mid_west_linear = north.a.midpoint(south.d);
        let mid_east_linear = north.d.midpoint(south.a);

        let (north_left, north_right) = north.split();
        let (south_right, south_left) = south.split();
        let (west_bottom, west_top) = west.split();
        let (east_top, east_bottom) = east.split();

        // Average of the opposite edges, running west to east and north to south.
        let across = north.midpoint(&south.inverse());
        let down = east.midpoint(&west.inverse());

        let (mut vertical_top, mut vertical_bottom) = Bezier::combine(
            &down,
            &Bezier::straight_line(north_left.d, south_left.a),
            &Bezier::straight_line(mid_north_linear, mid_south_linear),
        )
        .split();
        let (mut horizontal_left, mut horizontal_right) = Bezier::combine(
            &across,
            &Bezier::straight_line(west_top.a, east_top.d),
            &Bezier::straight_line(mid_west_linear, mid_east_linear),
        )
        .split();

        // Pin the interior curves to the edge midpoints and to one shared center.
        let center = vertical_top.d;
        horizontal_left.d = center;
        horizontal_right.a = center;
        vertical_top.a = north_left.d;
        vertical_bottom.d = south_left.a;
        horizontal_left.a = west_top.a;
        horizontal_right.d = east_top.d;

        let w = weights.subdivide();
        Subdivided {
            north_west: Self {
                north: north_left,
                east: vertical_top,
                south: horizontal_left.inverse(),
                west: west_top,
                weights: w.north_west,
            },
            north_east: Self {
                north: north_right,
                east: east_top,
                south: horizontal_right.inverse(),
                west: vertical_top.inverse(),
                weights: w.north_east,
            },
            south_west: Self {
                north: horizontal_left,
                east: vertical_bottom,
                south: south_left,
                west: west_bottom,
                weights: w.south_west,
            },
            south_east: Self {
                north: horizontal_right,
                east: east_bottom,
                south: south_right,
                west: vertical_bottom.inverse(),
                weights: w.south_east,
            },
        }
    }

    /// Closed outline of the patch: four cubic segments starting at NW.
    #[must_use]
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.north.a);
        for edge in [self.north, self.east, self.south, self.west] {
            path.curve_to(edge.b, edge.c, edge.d);
        }
        path.close_path();
        path
    }
}
