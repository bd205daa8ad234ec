// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Radial gradients with an optional focal point.
//!
//! The gradient position of a point `P` is measured along the ray from the
//! focus `F` through `P`: it is 0 on the focus circle (radius `fr`) and 1
//! where the ray leaves the outer circle `(C, r)`.
//!
//! Two evaluation strategies exist:
//!
//! - The **general path** intersects the ray with the outer circle for every
//!   pixel.
//! - The **fast path** applies when the focus is the center, the focus radius
//!   is 0, the ramp pads and uses the fast layout. The position is then just
//!   `|P - C| / r`; its square is a quadratic in the pixel index along a row,
//!   so it is stepped with forward differences and the square root comes from
//!   a small interpolated table.
//!
//! Both paths produce the same colors up to table rounding.

use alloc::sync::Arc;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, Point, Vec2};

use crate::color::Rgba8;
use crate::cycle::CycleMethod;
use crate::linear::pixel_center;
use crate::ramp::{ColorRamp, RampLayout, narrow};

/// The focus is kept at most this fraction of the radius away from the center.
const MAX_FOCUS_DISTANCE: f64 = 0.99;

/// Resolution of the square-root table used by the fast path.
const SQRT_LUT_SIZE: usize = 1 << 11;

/// Circles of a radial gradient, in local coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RadialGeometry {
    /// Center of the outer circle, where the gradient position reaches 1.
    pub center: Point,
    /// Radius of the outer circle.
    pub radius: f64,
    /// Center of the focus circle, where the gradient position is 0.
    pub focus: Point,
    /// Radius of the focus circle.
    pub focus_radius: f64,
}

impl RadialGeometry {
    /// A centered radial gradient (focus at the center, no focus radius).
    #[must_use]
    pub const fn new(center: Point, radius: f64) -> Self {
        Self {
            center,
            radius,
            focus: center,
            focus_radius: 0.0,
        }
    }

    /// Returns the geometry with a different focus circle.
    #[must_use]
    pub const fn with_focus(mut self, focus: Point, focus_radius: f64) -> Self {
        self.focus = focus;
        self.focus_radius = focus_radius;
        self
    }
}

/// Samples a radial gradient.
#[derive(Clone, Debug)]
pub struct RadialSampler {
    center: Point,
    radius: f64,
    focus: Point,
    focus_radius: f64,
    ramp: Arc<ColorRamp>,
    /// `sqrt(i / SQRT_LUT_SIZE)` for `i` in `0..=SQRT_LUT_SIZE`; empty unless the
    /// fast path applies.
    sqrt_lut: Vec<f32>,
}

impl RadialSampler {
    /// Creates a sampler, or `None` when the radius is not a positive finite number.
    ///
    /// A focus outside `0.99 * radius` of the center is pulled back onto that
    /// circle. A negative or non-finite focus radius is treated as 0.
    #[must_use]
    pub fn new(geometry: RadialGeometry, ramp: Arc<ColorRamp>) -> Option<Self> {
        let RadialGeometry {
            center,
            radius,
            mut focus,
            focus_radius,
        } = geometry;
        if !(radius > 0.0 && radius.is_finite()) || !center.is_finite() {
            return None;
        }
        if !focus.is_finite() {
            focus = center;
        }
        let offset = focus - center;
        let max_distance = radius * MAX_FOCUS_DISTANCE;
        if offset.hypot2() > max_distance * max_distance {
            let clamped = center + offset * (max_distance / offset.hypot());
            log::warn!(
                "radial gradient focus {focus:?} lies outside its circle; moved to {clamped:?}"
            );
            focus = clamped;
        }
        let focus_radius = if focus_radius.is_finite() {
            focus_radius.max(0.0)
        } else {
            0.0
        };

        let mut sampler = Self {
            center,
            radius,
            focus,
            focus_radius,
            ramp,
            sqrt_lut: Vec::new(),
        };
        if sampler.uses_fast_path() {
            sampler.sqrt_lut = sqrt_table();
        }
        Some(sampler)
    }

    /// Center of the outer circle.
    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }

    /// Radius of the outer circle.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Focus point, after clamping into the outer circle.
    #[must_use]
    pub fn focus(&self) -> Point {
        self.focus
    }

    /// Radius of the focus circle.
    #[must_use]
    pub fn focus_radius(&self) -> f64 {
        self.focus_radius
    }

    /// The color ramp.
    #[must_use]
    pub fn ramp(&self) -> &Arc<ColorRamp> {
        &self.ramp
    }

    /// Whether every sampled color is fully opaque.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.ramp.is_opaque()
    }

    /// Whether [`RadialSampler::fill_row`] takes the incremental fast path.
    #[must_use]
    pub fn uses_fast_path(&self) -> bool {
        self.focus == self.center
            && self.focus_radius == 0.0
            && self.ramp.cycle() == CycleMethod::NoCycle
            && self.ramp.layout() == RampLayout::Fast
    }

    /// Unbounded gradient position of a local point, before cycling.
    ///
    /// Points inside the focus circle are at position 0.
    #[must_use]
    pub fn position(&self, point: Point) -> f64 {
        let to_point = point - self.focus;
        let dist_sq = to_point.hypot2();
        if dist_sq <= self.focus_radius * self.focus_radius {
            return 0.0;
        }
        let to_edge = self.circle_intersection(point, to_point) - self.focus;
        let edge_sq = to_edge.hypot2();
        if self.focus_radius > 0.0 {
            let span = edge_sq.sqrt() - self.focus_radius;
            if span <= 0.0 {
                // The focus circle covers the whole ray.
                return 1.0;
            }
            (dist_sq.sqrt() - self.focus_radius) / span
        } else if edge_sq > 0.0 {
            (dist_sq / edge_sq).sqrt()
        } else {
            1.0
        }
    }

    /// Where the ray from the focus through `point` leaves the outer circle.
    fn circle_intersection(&self, point: Point, to_point: Vec2) -> Point {
        let Point { x: cx, y: cy } = self.center;
        let Point { x: fx, y: fy } = self.focus;
        let r_sq = self.radius * self.radius;

        if to_point.x.abs() <= to_point.y.abs() * 1e-9 {
            // Vertical ray: pick the circle point on the same side as `point`.
            let half_chord = (r_sq - (fx - cx) * (fx - cx)).max(0.0).sqrt();
            let y = if point.y > fy {
                cy + half_chord
            } else {
                cy - half_chord
            };
            return Point::new(fx, y);
        }

        let slope = to_point.y / to_point.x;
        let intercept = fy - slope * fx;
        let a = slope * slope + 1.0;
        let b = -2.0 * cx + 2.0 * slope * (intercept - cy);
        let c = cx * cx + (intercept - cy) * (intercept - cy) - r_sq;
        let mut det = (b * b - 4.0 * a * c).max(0.0).sqrt();
        if point.x < fx {
            det = -det;
        }
        let x = (-b + det) / (2.0 * a);
        Point::new(x, slope * x + intercept)
    }

    /// Color of the gradient at a local point.
    #[must_use]
    pub fn sample(&self, point: Point) -> Rgba8 {
        self.ramp.sample(narrow(self.position(point)))
    }

    /// Fills `out` with the colors of device row `y`, starting at column `x`.
    ///
    /// Pixels are sampled at their centers. Takes the fast path whenever
    /// [`RadialSampler::uses_fast_path`] holds.
    pub fn fill_row(&self, device_to_local: Affine, x: i32, y: i32, out: &mut [Rgba8]) {
        match self.ramp.fast_table() {
            Some(table) if self.uses_fast_path() => {
                self.fill_row_fast(table, device_to_local, x, y, out);
            }
            _ => self.fill_row_general(device_to_local, x, y, out),
        }
    }

    /// Like [`RadialSampler::fill_row`], but always evaluates the ray/circle
    /// intersection per pixel.
    pub fn fill_row_general(&self, device_to_local: Affine, x: i32, y: i32, out: &mut [Rgba8]) {
        let [a, b, ..] = device_to_local.as_coeffs();
        let step = Vec2::new(a, b);
        let origin = device_to_local * pixel_center(x, y);
        let mut column = 0.0;
        for pixel in out {
            *pixel = self.sample(origin + step * column);
            column += 1.0;
        }
    }

    fn fill_row_fast(
        &self,
        table: &[Rgba8],
        device_to_local: Affine,
        x: i32,
        y: i32,
        out: &mut [Rgba8],
    ) {
        let [a, b, ..] = device_to_local.as_coeffs();
        let start = device_to_local * pixel_center(x, y) - self.center;
        let inv_r_sq = 1.0 / (self.radius * self.radius);

        // g(i) = |start + i * (a, b)|² / r², stepped with forward differences.
        let mut g = start.hypot2() * inv_r_sq;
        let mut delta = (2.0 * (a * start.x + b * start.y) + a * a + b * b) * inv_r_sq;
        let delta_delta = 2.0 * (a * a + b * b) * inv_r_sq;

        let size = table.len() - 1;
        let clamp_color = table[size];
        let size = size as f32;
        let lut_scale = SQRT_LUT_SIZE as f32;
        for pixel in out {
            *pixel = if g >= 1.0 {
                clamp_color
            } else {
                let g_index = narrow(g).max(0.0) * lut_scale;
                let i = lut_index(g_index).min(SQRT_LUT_SIZE - 1);
                let lo = self.sqrt_lut[i];
                let hi = self.sqrt_lut[i + 1];
                let frac = g_index - i as f32;
                let distance = lo + frac * (hi - lo);
                table[lut_index(distance * size).min(table.len() - 1)]
            };
            g += delta;
            delta += delta_delta;
        }
    }
}

fn sqrt_table() -> Vec<f32> {
    (0..=SQRT_LUT_SIZE)
        .map(|i| (i as f32 / SQRT_LUT_SIZE as f32).sqrt())
        .collect()
}

#[inline]
#[expect(
    clippy::cast_possible_truncation,
    reason = "callers clamp the result to a table length"
)]
fn lut_index(value: f32) -> usize {
    value as usize
}
