// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-stop color ramps.
//!
//! A [`ColorRamp`] turns a resolved stop list into a lookup table once, so
//! that per-pixel sampling is a cycle remap plus an array index. Two table
//! layouts exist:
//!
//! - **Fast**: one flat table where each stop interval gets a number of
//!   entries proportional to its length (the shortest interval gets 255).
//!   Lookup is `table[floor(p * (len - 1))]`.
//! - **Slow**: one 256-entry table per interval plus the interval
//!   boundaries. Lookup scans for the interval first. This bounds memory when
//!   one tiny interval would otherwise blow up the flat table.
//!
//! The fast layout is chosen whenever its estimated size stays within
//! 5000 entries.

use alloc::vec;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::color::{Rgba8, TRANSPARENT, linear12_to_srgb, round_channel, srgb_to_linear12};
use crate::cycle::CycleMethod;
use crate::error::RampError;

/// Intervals at or below this length do not determine the fast table resolution.
const MIN_INTERVAL_LENGTH: f32 = 0.001;

/// Entries per interval in the slow layout.
const GRADIENT_SIZE: usize = 256;
const GRADIENT_SIZE_INDEX: usize = GRADIENT_SIZE - 1;

/// Largest estimated fast table that is still built as a single array.
const MAX_FAST_TABLE_SIZE: usize = 5000;

/// A resolved gradient stop.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GradientStop {
    /// Position of the stop along the gradient, in `[0, 1]`.
    pub offset: f32,
    /// Color of the stop (sRGB encoded, straight alpha).
    pub color: Rgba8,
}

impl GradientStop {
    /// Creates a new stop.
    #[must_use]
    pub const fn new(offset: f32, color: Rgba8) -> Self {
        Self { offset, color }
    }
}

impl From<&peniko::ColorStop> for GradientStop {
    fn from(stop: &peniko::ColorStop) -> Self {
        Self {
            offset: stop.offset,
            color: stop
                .color
                .to_alpha_color::<peniko::color::Srgb>()
                .to_rgba8(),
        }
    }
}

impl From<peniko::ColorStop> for GradientStop {
    fn from(stop: peniko::ColorStop) -> Self {
        Self::from(&stop)
    }
}

/// Color space in which stop colors are interpolated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum InterpolationSpace {
    /// Interpolate the sRGB-encoded channels directly.
    #[default]
    Srgb,
    /// Interpolate in linear light and re-encode each sample to sRGB.
    LinearRgb,
}

/// Memory layout of a [`ColorRamp`] lookup table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RampLayout {
    /// Single flat table indexed directly by the position.
    Fast,
    /// One 256-entry table per stop interval.
    Slow,
}

#[derive(Clone, Debug)]
enum Lookup {
    Fast {
        table: Vec<Rgba8>,
    },
    Slow {
        tables: Vec<[Rgba8; GRADIENT_SIZE]>,
        fractions: Vec<f32>,
        intervals: Vec<f32>,
    },
}

/// A color lookup table built from a stop list, a color space and a cycle policy.
///
/// Ramps are immutable once built and may be shared between samplers and
/// threads (see [`RampCache`](crate::RampCache)).
#[derive(Clone, Debug)]
pub struct ColorRamp {
    stops: Vec<GradientStop>,
    space: InterpolationSpace,
    cycle: CycleMethod,
    opaque: bool,
    lookup: Lookup,
}

impl ColorRamp {
    /// Builds a ramp, picking the layout from the estimated table size.
    ///
    /// Stops must be at least two, with finite offsets in `[0, 1]` that never
    /// decrease. If the first offset is above 0 or the last below 1, the
    /// end colors are extended to cover the full range.
    pub fn new(
        stops: &[GradientStop],
        space: InterpolationSpace,
        cycle: CycleMethod,
    ) -> Result<Self, RampError> {
        Self::build(stops, space, cycle, None)
    }

    /// Builds a ramp with a forced table layout.
    ///
    /// Mostly useful for comparing layouts; [`ColorRamp::new`] picks the
    /// right one on its own.
    pub fn with_layout(
        stops: &[GradientStop],
        space: InterpolationSpace,
        cycle: CycleMethod,
        layout: RampLayout,
    ) -> Result<Self, RampError> {
        Self::build(stops, space, cycle, Some(layout))
    }

    fn build(
        stops: &[GradientStop],
        space: InterpolationSpace,
        cycle: CycleMethod,
        layout: Option<RampLayout>,
    ) -> Result<Self, RampError> {
        validate_stops(stops)?;
        let stops = pad_stops(stops);
        let opaque = stops.iter().all(|s| s.color.a == 0xFF);

        let colors: Vec<WorkingColor> = stops
            .iter()
            .map(|s| WorkingColor::new(s.color, space))
            .collect();
        let fractions: Vec<f32> = stops.iter().map(|s| s.offset).collect();
        let intervals: Vec<f32> = fractions.windows(2).map(|w| w[1] - w[0]).collect();

        let min_interval = intervals
            .iter()
            .copied()
            .filter(|&d| d > MIN_INTERVAL_LENGTH)
            .fold(1.0_f32, f32::min);

        let layout = layout.unwrap_or_else(|| {
            let estimated: usize = intervals
                .iter()
                .map(|&d| table_len(d / min_interval * GRADIENT_SIZE as f32, |v| v.ceil()))
                .sum();
            if estimated > MAX_FAST_TABLE_SIZE {
                RampLayout::Slow
            } else {
                RampLayout::Fast
            }
        });

        let lookup = match layout {
            RampLayout::Fast => {
                Self::fast_lookup(&stops, &colors, &intervals, min_interval, space)
            }
            RampLayout::Slow => Self::slow_lookup(&stops, &colors, fractions, intervals, space),
        };

        let ramp = Self {
            stops,
            space,
            cycle,
            opaque,
            lookup,
        };
        log::debug!(
            "built {:?} color ramp: {} stops, {} entries, {:?}, {:?}, opaque: {}",
            ramp.layout(),
            ramp.stops.len(),
            ramp.table_len(),
            space,
            cycle,
            opaque
        );
        Ok(ramp)
    }

    fn fast_lookup(
        stops: &[GradientStop],
        colors: &[WorkingColor],
        intervals: &[f32],
        min_interval: f32,
        space: InterpolationSpace,
    ) -> Lookup {
        let counts: Vec<usize> = intervals
            .iter()
            .map(|&d| table_len(d / min_interval * GRADIENT_SIZE_INDEX as f32, |v| v.round()))
            .collect();
        let total = 1 + counts.iter().sum::<usize>();
        let mut table = vec![TRANSPARENT; total];

        let mut offset = 0;
        for (i, &count) in counts.iter().enumerate() {
            let segment = &mut table[offset..offset + count];
            interpolate_into(colors[i], colors[i + 1], space, segment);
            // Stop colors are reproduced exactly, whatever the working space.
            if let Some(first) = segment.first_mut() {
                *first = stops[i].color;
            }
            offset += count;
        }
        table[total - 1] = stops[stops.len() - 1].color;

        Lookup::Fast { table }
    }

    fn slow_lookup(
        stops: &[GradientStop],
        colors: &[WorkingColor],
        fractions: Vec<f32>,
        intervals: Vec<f32>,
        space: InterpolationSpace,
    ) -> Lookup {
        let mut tables = vec![[TRANSPARENT; GRADIENT_SIZE]; intervals.len()];
        for (i, table) in tables.iter_mut().enumerate() {
            interpolate_into(colors[i], colors[i + 1], space, table);
            table[0] = stops[i].color;
        }
        Lookup::Slow {
            tables,
            fractions,
            intervals,
        }
    }

    /// Samples the ramp at an unbounded position.
    ///
    /// The position is first mapped into `[0, 1]` with the ramp's
    /// [`CycleMethod`], then looked up.
    #[inline]
    #[must_use]
    pub fn sample(&self, position: f32) -> Rgba8 {
        self.lookup(self.cycle.remap(position))
    }

    /// Looks up a position that has already been mapped into `[0, 1]`.
    ///
    /// Out-of-range input is clamped.
    #[must_use]
    pub fn lookup(&self, position: f32) -> Rgba8 {
        let position = if position.is_nan() {
            0.0
        } else {
            position.clamp(0.0, 1.0)
        };
        match &self.lookup {
            Lookup::Fast { table } => {
                let size = table.len() - 1;
                table[scaled_index(position, size).min(size)]
            }
            Lookup::Slow {
                tables,
                fractions,
                intervals,
            } => {
                for (i, table) in tables.iter().enumerate() {
                    if position < fractions[i + 1] {
                        let delta = position - fractions[i];
                        let index = scaled_index(delta / intervals[i], GRADIENT_SIZE_INDEX);
                        return table[index.min(GRADIENT_SIZE_INDEX)];
                    }
                }
                self.last_color()
            }
        }
    }

    /// The layout of the lookup table.
    #[must_use]
    pub fn layout(&self) -> RampLayout {
        match self.lookup {
            Lookup::Fast { .. } => RampLayout::Fast,
            Lookup::Slow { .. } => RampLayout::Slow,
        }
    }

    /// Number of table entries across all intervals.
    #[must_use]
    pub fn table_len(&self) -> usize {
        match &self.lookup {
            Lookup::Fast { table } => table.len(),
            Lookup::Slow { tables, .. } => tables.len() * GRADIENT_SIZE,
        }
    }

    /// The flat lookup table, if the ramp uses the fast layout.
    ///
    /// The table has at least one entry; its last entry is the color of the
    /// last stop.
    #[must_use]
    pub fn fast_table(&self) -> Option<&[Rgba8]> {
        match &self.lookup {
            Lookup::Fast { table } => Some(table),
            Lookup::Slow { .. } => None,
        }
    }

    /// The stops the ramp was built from, padded to cover `[0, 1]`.
    #[must_use]
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Color of the first stop.
    #[must_use]
    pub fn first_color(&self) -> Rgba8 {
        self.stops[0].color
    }

    /// Color of the last stop.
    #[must_use]
    pub fn last_color(&self) -> Rgba8 {
        self.stops[self.stops.len() - 1].color
    }

    /// Whether every stop is fully opaque.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    /// The cycle policy applied by [`ColorRamp::sample`].
    #[must_use]
    pub fn cycle(&self) -> CycleMethod {
        self.cycle
    }

    /// The interpolation color space.
    #[must_use]
    pub fn interpolation_space(&self) -> InterpolationSpace {
        self.space
    }
}

/// A stop color in the space a ramp interpolates in.
///
/// sRGB ramps work on the 8-bit channel values. Linear-RGB ramps work on
/// 12-bit linear light, so dark colors keep their resolution until each
/// table entry is encoded back to sRGB. Alpha is always interpolated as is.
#[derive(Copy, Clone, Debug)]
struct WorkingColor([f32; 4]);

impl WorkingColor {
    fn new(color: Rgba8, space: InterpolationSpace) -> Self {
        let channel = |c: u8| match space {
            InterpolationSpace::Srgb => f32::from(c),
            InterpolationSpace::LinearRgb => f32::from(srgb_to_linear12(c)),
        };
        Self([
            channel(color.r),
            channel(color.g),
            channel(color.b),
            f32::from(color.a),
        ])
    }

    fn encode(self, space: InterpolationSpace) -> Rgba8 {
        let channel = |v: f32| match space {
            InterpolationSpace::Srgb => round_channel(v),
            InterpolationSpace::LinearRgb => linear12_to_srgb(v),
        };
        let [r, g, b, a] = self.0;
        Rgba8 {
            r: channel(r),
            g: channel(g),
            b: channel(b),
            a: round_channel(a),
        }
    }
}

/// Fills `out` with the colors from `from` (inclusive) towards `to` (exclusive).
///
/// Entry `i` is `from + i * (to - from) / out.len()` per working channel.
fn interpolate_into(
    from: WorkingColor,
    to: WorkingColor,
    space: InterpolationSpace,
    out: &mut [Rgba8],
) {
    if out.is_empty() {
        return;
    }
    let step = 1.0 / out.len() as f32;
    for (i, slot) in out.iter_mut().enumerate() {
        let i = i as f32;
        let mut color = from.0;
        for (channel, end) in color.iter_mut().zip(to.0) {
            *channel += i * (end - *channel) * step;
        }
        *slot = WorkingColor(color).encode(space);
    }
}

fn validate_stops(stops: &[GradientStop]) -> Result<(), RampError> {
    if stops.len() < 2 {
        return Err(RampError::TooFewStops { count: stops.len() });
    }
    let mut previous = 0.0_f32;
    for (index, stop) in stops.iter().enumerate() {
        if !stop.offset.is_finite() || !(0.0..=1.0).contains(&stop.offset) {
            return Err(RampError::InvalidOffset { index });
        }
        if stop.offset < previous {
            return Err(RampError::NonMonotonic { index });
        }
        previous = stop.offset;
    }
    Ok(())
}

fn pad_stops(stops: &[GradientStop]) -> Vec<GradientStop> {
    let mut padded = Vec::with_capacity(stops.len() + 2);
    let first = stops[0];
    let last = stops[stops.len() - 1];
    if first.offset > 0.0 {
        padded.push(GradientStop::new(0.0, first.color));
    }
    padded.extend_from_slice(stops);
    if last.offset < 1.0 {
        padded.push(GradientStop::new(1.0, last.color));
    }
    padded
}

/// Narrows a gradient position computed in `f64` geometry to ramp precision.
#[inline]
#[expect(
    clippy::cast_possible_truncation,
    reason = "ramp positions only need single precision; out-of-range values saturate"
)]
pub(crate) fn narrow(position: f64) -> f32 {
    position as f32
}

/// Rounds a non-negative table length estimate with `round`.
#[expect(
    clippy::cast_possible_truncation,
    reason = "interval ratios are bounded by 1 / MIN_INTERVAL_LENGTH"
)]
fn table_len(estimate: f32, round: fn(f32) -> f32) -> usize {
    round(estimate.max(0.0)) as usize
}

/// `floor(position * size)` for a position in `[0, 1]`.
#[inline]
#[expect(
    clippy::cast_possible_truncation,
    reason = "position is in [0, 1], so the product is at most `size`"
)]
fn scaled_index(position: f32, size: usize) -> usize {
    (position.max(0.0) * size as f32) as usize
}
