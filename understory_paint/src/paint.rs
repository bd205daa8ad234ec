// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paints built from peniko gradients or mesh gradients.

use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::{Affine, Point};
use peniko::color::ColorSpaceTag;
use peniko::{Gradient, GradientKind};

use crate::cache::RampCache;
use crate::color::Rgba8;
use crate::cycle::CycleMethod;
use crate::error::{PaintError, RampError};
use crate::linear::{LinearGeometry, LinearSampler};
use crate::mesh::MeshGradient;
use crate::radial::{RadialGeometry, RadialSampler};
use crate::ramp::{ColorRamp, GradientStop, InterpolationSpace};

/// A resolved paint source.
///
/// The variant is fixed when the paint is created, so filling never
/// dispatches on anything but this enum.
#[derive(Clone, Debug)]
pub enum Paint {
    /// A linear gradient.
    Linear(LinearSampler),
    /// A radial gradient.
    Radial(RadialSampler),
    /// A mesh gradient; rendered as leaves, not per pixel.
    Mesh(MeshGradient),
}

impl Paint {
    /// Creates a gradient paint from a [`peniko::Gradient`].
    ///
    /// Radial gradients map their start circle to the focus circle and their
    /// end circle to the outer circle. Returns `Ok(None)` when the gradient
    /// paints nothing (a radial gradient without a positive end radius).
    pub fn from_gradient(gradient: &Gradient) -> Result<Option<Self>, PaintError> {
        Self::from_gradient_with(gradient, |stops, space, cycle| {
            ColorRamp::new(stops, space, cycle).map(Arc::new)
        })
    }

    /// Like [`Paint::from_gradient`], but takes the ramp from `cache`.
    pub fn from_gradient_cached(
        gradient: &Gradient,
        cache: &mut RampCache,
    ) -> Result<Option<Self>, PaintError> {
        Self::from_gradient_with(gradient, |stops, space, cycle| {
            cache.get_or_build(stops, space, cycle)
        })
    }

    fn from_gradient_with(
        gradient: &Gradient,
        ramp: impl FnOnce(
            &[GradientStop],
            InterpolationSpace,
            CycleMethod,
        ) -> Result<Arc<ColorRamp>, RampError>,
    ) -> Result<Option<Self>, PaintError> {
        if matches!(gradient.kind, GradientKind::Sweep(_)) {
            return Err(PaintError::UnsupportedKind);
        }
        let stops: Vec<GradientStop> = gradient.stops.iter().map(GradientStop::from).collect();
        let space = match gradient.interpolation_cs {
            ColorSpaceTag::LinearSrgb => InterpolationSpace::LinearRgb,
            _ => InterpolationSpace::Srgb,
        };
        let ramp = ramp(&stops, space, gradient.extend.into())?;

        Ok(match gradient.kind {
            GradientKind::Linear(line) => Some(Self::Linear(LinearSampler::new(
                LinearGeometry::new(line.start, line.end),
                ramp,
            ))),
            GradientKind::Radial(radial) => RadialSampler::new(
                RadialGeometry::new(radial.end_center, f64::from(radial.end_radius))
                    .with_focus(radial.start_center, f64::from(radial.start_radius)),
                ramp,
            )
            .map(Self::Radial),
            GradientKind::Sweep(_) => None,
        })
    }

    /// Whether every color this paint produces is fully opaque.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        match self {
            Self::Linear(s) => s.is_opaque(),
            Self::Radial(s) => s.is_opaque(),
            Self::Mesh(m) => m.is_opaque(),
        }
    }

    /// Color at a local point, or `None` for mesh gradients.
    #[must_use]
    pub fn sample(&self, point: Point) -> Option<Rgba8> {
        match self {
            Self::Linear(s) => Some(s.sample(point)),
            Self::Radial(s) => Some(s.sample(point)),
            Self::Mesh(_) => None,
        }
    }

    /// Fills `out` with the colors of device row `y`, starting at column `x`.
    ///
    /// Returns `false` (leaving `out` untouched) for mesh gradients, which are
    /// rendered through [`MeshGradient::render`] instead.
    pub fn fill_row(&self, device_to_local: Affine, x: i32, y: i32, out: &mut [Rgba8]) -> bool {
        match self {
            Self::Linear(s) => s.fill_row(device_to_local, x, y, out),
            Self::Radial(s) => s.fill_row(device_to_local, x, y, out),
            Self::Mesh(_) => return false,
        }
        true
    }

    /// Fills a rectangle of `width` pixels per row, starting at `(x, y)`.
    ///
    /// Row `i` of the rectangle starts at `out[i * stride]`; the number of
    /// rows is `out.len()` divided by `stride`, rounded up. Returns `false`
    /// for mesh gradients and for a zero stride.
    pub fn fill_rect(
        &self,
        device_to_local: Affine,
        x: i32,
        y: i32,
        width: usize,
        out: &mut [Rgba8],
        stride: usize,
    ) -> bool {
        if stride == 0 || matches!(self, Self::Mesh(_)) {
            return false;
        }
        let mut row_y = y;
        for row in out.chunks_mut(stride) {
            let len = width.min(row.len());
            self.fill_row(device_to_local, x, row_y, &mut row[..len]);
            row_y = row_y.saturating_add(1);
        }
        true
    }

    /// The mesh gradient, if this is one.
    #[must_use]
    pub fn as_mesh(&self) -> Option<&MeshGradient> {
        match self {
            Self::Mesh(m) => Some(m),
            _ => None,
        }
    }
}

impl From<LinearSampler> for Paint {
    fn from(sampler: LinearSampler) -> Self {
        Self::Linear(sampler)
    }
}

impl From<RadialSampler> for Paint {
    fn from(sampler: RadialSampler) -> Self {
        Self::Radial(sampler)
    }
}

impl From<MeshGradient> for Paint {
    fn from(mesh: MeshGradient) -> Self {
        Self::Mesh(mesh)
    }
}

/// Inverts a paint transform for row filling.
///
/// A singular or non-finite transform cannot be inverted; it is replaced by
/// the identity and a warning is logged.
#[must_use]
pub fn device_to_local(local_to_device: Affine) -> Affine {
    let det = local_to_device.determinant();
    if det == 0.0 || !det.is_finite() || !local_to_device.is_finite() {
        log::warn!("paint transform {local_to_device:?} is not invertible; using identity");
        return Affine::IDENTITY;
    }
    local_to_device.inverse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use kurbo::Vec2;
    use peniko::Color;

    fn black_white() -> [(f32, Color); 2] {
        [(0.0, Color::BLACK), (1.0, Color::WHITE)]
    }

    #[test]
    fn linear_gradient_converts() {
        let gradient = Gradient::new_linear((0.0, 0.0), (10.0, 0.0)).with_stops(black_white());
        let paint = Paint::from_gradient(&gradient).unwrap().unwrap();
        assert!(matches!(paint, Paint::Linear(_)), "linear variant");
        assert!(paint.is_opaque(), "opaque stops");
        let mid = paint.sample(Point::new(5.0, 0.0)).unwrap();
        assert!(mid.r.abs_diff(128) <= 1, "mid-gray: {mid:?}");
    }

    #[test]
    fn radial_gradient_maps_start_circle_to_focus() {
        let gradient = Gradient::new_two_point_radial((2.0, 0.0), 1.0_f32, (0.0, 0.0), 10.0_f32)
            .with_stops(black_white());
        let Some(Paint::Radial(sampler)) = Paint::from_gradient(&gradient).unwrap() else {
            panic!("expected a radial paint");
        };
        assert_eq!(sampler.focus(), Point::new(2.0, 0.0), "start center");
        assert_eq!(sampler.focus_radius(), 1.0, "start radius");
        assert_eq!(sampler.center(), Point::ZERO, "end center");
        assert_eq!(sampler.radius(), 10.0, "end radius");
    }

    #[test]
    fn zero_radius_paints_nothing() {
        let gradient = Gradient::new_radial((0.0, 0.0), 0.0_f32).with_stops(black_white());
        assert!(
            Paint::from_gradient(&gradient).unwrap().is_none(),
            "degenerate radial"
        );
    }

    #[test]
    fn sweep_gradients_are_unsupported() {
        let gradient = Gradient::new_sweep((0.0, 0.0), 0.0_f32, 1.0_f32).with_stops(black_white());
        assert_eq!(
            Paint::from_gradient(&gradient).unwrap_err(),
            PaintError::UnsupportedKind,
            "no sweep sampler"
        );
    }

    #[test]
    fn bad_stops_surface_as_ramp_errors() {
        let gradient = Gradient::new_linear((0.0, 0.0), (1.0, 0.0)).with_stops([(0.0, Color::BLACK)]);
        assert_eq!(
            Paint::from_gradient(&gradient).unwrap_err(),
            PaintError::Ramp(RampError::TooFewStops { count: 1 }),
            "single stop"
        );
    }

    #[test]
    fn cached_paints_share_ramps() {
        let gradient = Gradient::new_linear((0.0, 0.0), (4.0, 0.0)).with_stops(black_white());
        let mut cache = RampCache::default();
        let a = Paint::from_gradient_cached(&gradient, &mut cache).unwrap().unwrap();
        let b = Paint::from_gradient_cached(&gradient, &mut cache).unwrap().unwrap();
        let (Paint::Linear(a), Paint::Linear(b)) = (a, b) else {
            panic!("expected linear paints");
        };
        assert!(Arc::ptr_eq(a.ramp(), b.ramp()), "one ramp for both");
    }

    #[test]
    fn fill_rect_fills_each_row() {
        let gradient = Gradient::new_linear((0.0, 0.0), (0.0, 4.0)).with_stops(black_white());
        let paint = Paint::from_gradient(&gradient).unwrap().unwrap();
        let sentinel = Rgba8 {
            r: 1,
            g: 2,
            b: 3,
            a: 4,
        };
        let mut out = vec![sentinel; 4 * 5];
        assert!(paint.fill_rect(Affine::IDENTITY, 0, 0, 3, &mut out, 5), "filled");
        for row in 0..4 {
            let expected = paint.sample(Point::new(0.5, row as f64 + 0.5)).unwrap();
            assert_eq!(out[row * 5], expected, "row {row}");
            assert_eq!(out[row * 5 + 3], sentinel, "row {row} padding untouched");
        }
        assert!(!paint.fill_rect(Affine::IDENTITY, 0, 0, 3, &mut out, 0), "zero stride");
    }

    #[test]
    fn singular_transform_falls_back_to_identity() {
        assert_eq!(device_to_local(Affine::scale(0.0)), Affine::IDENTITY, "singular");
        let t = Affine::translate(Vec2::new(3.0, 4.0));
        assert_eq!(device_to_local(t) * Point::new(3.0, 4.0), Point::ZERO, "inverse");
    }
}
