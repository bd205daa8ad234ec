// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cubic Bézier edges of mesh patches.

use kurbo::{CubicBez, Point};

/// Hard cap on the subdivision depth of a mesh patch.
pub const MAX_SUBDIVISION_DEPTH: u32 = 10;

/// A cubic Bézier edge of a mesh patch, from `a` to `d` with controls `b` and `c`.
///
/// Every operation returns a new curve; edges are shared between patches by value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bezier {
    /// Start point.
    pub a: Point,
    /// First control point.
    pub b: Point,
    /// Second control point.
    pub c: Point,
    /// End point.
    pub d: Point,
}

impl Bezier {
    /// Creates a curve from its four control points.
    #[must_use]
    pub const fn new(a: Point, b: Point, c: Point, d: Point) -> Self {
        Self { a, b, c, d }
    }

    /// A straight segment from `from` to `to`, with the controls at its thirds.
    #[must_use]
    pub fn straight_line(from: Point, to: Point) -> Self {
        Self {
            a: from,
            b: from.lerp(to, 1.0 / 3.0),
            c: from.lerp(to, 2.0 / 3.0),
            d: to,
        }
    }

    /// The same curve traversed from `d` to `a`.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            a: self.d,
            b: self.c,
            c: self.b,
            d: self.a,
        }
    }

    /// Splits the curve at `t = 0.5` (De Casteljau).
    #[must_use]
    pub fn split(&self) -> (Self, Self) {
        let ab = self.a.midpoint(self.b);
        let bc = self.b.midpoint(self.c);
        let cd = self.c.midpoint(self.d);
        let abc = ab.midpoint(bc);
        let bcd = bc.midpoint(cd);
        let mid = abc.midpoint(bcd);
        (
            Self::new(self.a, ab, abc, mid),
            Self::new(mid, bcd, cd, self.d),
        )
    }

    /// Control-point-wise `base + add - sub`.
    ///
    /// Used to build the interior curves of a Coons patch from its boundary.
    #[must_use]
    pub fn combine(base: &Self, add: &Self, sub: &Self) -> Self {
        let f = |p: Point, q: Point, r: Point| Point::new(p.x + q.x - r.x, p.y + q.y - r.y);
        Self {
            a: f(base.a, add.a, sub.a),
            b: f(base.b, add.b, sub.b),
            c: f(base.c, add.c, sub.c),
            d: f(base.d, add.d, sub.d),
        }
    }

    /// Control-point-wise midpoint of two curves.
    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        Self {
            a: self.a.midpoint(other.a),
            b: self.b.midpoint(other.b),
            c: self.c.midpoint(other.c),
            d: self.d.midpoint(other.d),
        }
    }

    /// Number of halvings needed before the curve is flat at the given device scale.
    ///
    /// The estimate grows with the logarithm of the control polygon's squared
    /// length after scaling, and never exceeds [`MAX_SUBDIVISION_DEPTH`].
    #[must_use]
    pub fn estimate_step_count(&self, scale_x: f64, scale_y: f64) -> u32 {
        let dist = |p: Point, q: Point| distance_squared(p, q, scale_x, scale_y);
        let spread = dist(self.a, self.b)
            .max(dist(self.c, self.d))
            .max(dist(self.a, self.c) / 4.0)
            .max(dist(self.b, self.d) / 4.0);
        let steps = (spread * 18.0).max(1.0);
        let exponent = if steps.is_finite() {
            binary_exponent(steps)
        } else {
            u32::MAX
        };
        (exponent.saturating_add(1) / 2).min(MAX_SUBDIVISION_DEPTH)
    }

    /// Whether every control point is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite() && self.c.is_finite() && self.d.is_finite()
    }

    /// The curve as a [`kurbo::CubicBez`].
    #[must_use]
    pub fn to_cubic(&self) -> CubicBez {
        CubicBez::new(self.a, self.b, self.c, self.d)
    }
}

impl From<CubicBez> for Bezier {
    fn from(cubic: CubicBez) -> Self {
        Self::new(cubic.p0, cubic.p1, cubic.p2, cubic.p3)
    }
}

impl From<Bezier> for CubicBez {
    fn from(bezier: Bezier) -> Self {
        bezier.to_cubic()
    }
}

/// Squared distance between two points after scaling each axis.
#[inline]
pub(crate) fn distance_squared(p: Point, q: Point, scale_x: f64, scale_y: f64) -> f64 {
    let dx = (q.x - p.x) * scale_x;
    let dy = (q.y - p.y) * scale_y;
    dx * dx + dy * dy
}

/// Unbiased binary exponent of a finite value `>= 1`.
fn binary_exponent(value: f64) -> u32 {
    let biased = (value.to_bits() >> 52) & 0x7ff;
    u32::try_from(biased.saturating_sub(1023)).unwrap_or(u32::MAX)
}
