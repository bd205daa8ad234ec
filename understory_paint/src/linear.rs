// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear gradient geometry and its per-row sampler.

use alloc::sync::Arc;

use kurbo::{Affine, Point, Vec2};

use crate::color::Rgba8;
use crate::ramp::{ColorRamp, narrow};

/// Gradient vector of a linear gradient, in local coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LinearGeometry {
    /// Point where the gradient position is 0.
    pub start: Point,
    /// Point where the gradient position is 1.
    pub end: Point,
}

impl LinearGeometry {
    /// Creates a gradient vector from `start` to `end`.
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }
}

/// Samples a linear gradient by projecting points onto its gradient vector.
#[derive(Clone, Debug)]
pub struct LinearSampler {
    geometry: LinearGeometry,
    ramp: Arc<ColorRamp>,
    /// `(end - start) / |end - start|²`, or `None` when start and end coincide.
    axis: Option<Vec2>,
}

impl LinearSampler {
    /// Creates a sampler for `geometry` colored by `ramp`.
    ///
    /// A zero-length (or non-finite) gradient vector is not an error: every
    /// point then gets the ramp's last stop color.
    #[must_use]
    pub fn new(geometry: LinearGeometry, ramp: Arc<ColorRamp>) -> Self {
        let delta = geometry.end - geometry.start;
        let length_sq = delta.hypot2();
        let axis = (length_sq > 0.0 && length_sq.is_finite()).then(|| delta / length_sq);
        Self {
            geometry,
            ramp,
            axis,
        }
    }

    /// The gradient vector.
    #[must_use]
    pub fn geometry(&self) -> LinearGeometry {
        self.geometry
    }

    /// The color ramp.
    #[must_use]
    pub fn ramp(&self) -> &Arc<ColorRamp> {
        &self.ramp
    }

    /// Whether start and end coincide.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.axis.is_none()
    }

    /// Whether every sampled color is fully opaque.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.ramp.is_opaque()
    }

    /// Unbounded gradient position of a local point, before cycling.
    ///
    /// Returns `None` for a degenerate gradient.
    #[must_use]
    pub fn position(&self, point: Point) -> Option<f64> {
        self.axis
            .map(|axis| (point - self.geometry.start).dot(axis))
    }

    /// Color of the gradient at a local point.
    #[must_use]
    pub fn sample(&self, point: Point) -> Rgba8 {
        match self.position(point) {
            Some(t) => self.ramp.sample(narrow(t)),
            None => self.ramp.last_color(),
        }
    }

    /// Fills `out` with the colors of device row `y`, starting at column `x`.
    ///
    /// Pixels are sampled at their centers. The gradient position advances by
    /// a constant per pixel, so the row costs one projection plus one add
    /// per pixel.
    pub fn fill_row(&self, device_to_local: Affine, x: i32, y: i32, out: &mut [Rgba8]) {
        let Some(axis) = self.axis else {
            out.fill(self.ramp.last_color());
            return;
        };
        let [a, b, ..] = device_to_local.as_coeffs();
        let origin = device_to_local * pixel_center(x, y);
        let mut t = (origin - self.geometry.start).dot(axis);
        let dt = Vec2::new(a, b).dot(axis);
        for pixel in out {
            *pixel = self.ramp.sample(narrow(t));
            t += dt;
        }
    }
}

/// Center of device pixel `(x, y)`.
#[inline]
pub(crate) fn pixel_center(x: i32, y: i32) -> Point {
    Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5)
}
