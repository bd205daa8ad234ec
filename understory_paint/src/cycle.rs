// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spread policies that map gradient positions back into `[0, 1]`.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Policy for gradient positions that fall outside of `[0, 1]`.
///
/// This is the SVG `spreadMethod`; it maps one-to-one onto [`peniko::Extend`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CycleMethod {
    /// Clamp to the nearest end (`pad`).
    #[default]
    NoCycle,
    /// Restart from the first stop each period (`repeat`).
    Repeat,
    /// Alternate direction each period (`reflect`).
    Reflect,
}

impl CycleMethod {
    /// Maps an unbounded gradient position into `[0, 1]`.
    ///
    /// The result is in `[0, 1]` for every input; NaN maps to `0`, and
    /// infinities map to `0` for the periodic policies.
    #[must_use]
    pub fn remap(self, position: f32) -> f32 {
        if position.is_nan() {
            return 0.0;
        }
        match self {
            Self::NoCycle => position.clamp(0.0, 1.0),
            Self::Repeat => {
                if !position.is_finite() {
                    return 0.0;
                }
                // `p - floor(p)` can round up to exactly 1 for tiny negative inputs.
                (position - position.floor()).clamp(0.0, 1.0)
            }
            Self::Reflect => {
                if !position.is_finite() {
                    return 0.0;
                }
                let magnitude = position.abs();
                let period = magnitude.floor();
                let fraction = magnitude - period;
                // `period` is integral, so the remainder is exactly 0 or 1.
                if period % 2.0 == 1.0 {
                    1.0 - fraction
                } else {
                    fraction
                }
            }
        }
    }
}

impl From<peniko::Extend> for CycleMethod {
    fn from(extend: peniko::Extend) -> Self {
        match extend {
            peniko::Extend::Pad => Self::NoCycle,
            peniko::Extend::Repeat => Self::Repeat,
            peniko::Extend::Reflect => Self::Reflect,
        }
    }
}

impl From<CycleMethod> for peniko::Extend {
    fn from(cycle: CycleMethod) -> Self {
        match cycle {
            CycleMethod::NoCycle => Self::Pad,
            CycleMethod::Repeat => Self::Repeat,
            CycleMethod::Reflect => Self::Reflect,
        }
    }
}
