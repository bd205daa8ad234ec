// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for ramp construction, mesh assembly and paint creation.

use core::fmt;

/// Error returned when a stop list cannot be turned into a [`ColorRamp`](crate::ColorRamp).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RampError {
    /// Fewer than two stops were supplied.
    TooFewStops {
        /// Number of stops supplied.
        count: usize,
    },
    /// The stop at `index` has a smaller offset than its predecessor.
    NonMonotonic {
        /// Index of the offending stop.
        index: usize,
    },
    /// The stop at `index` has an offset that is not finite or lies outside `[0, 1]`.
    InvalidOffset {
        /// Index of the offending stop.
        index: usize,
    },
}

impl fmt::Display for RampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewStops { count } => {
                write!(f, "a color ramp needs at least 2 stops, got {count}")
            }
            Self::NonMonotonic { index } => {
                write!(f, "stop {index} has a smaller offset than the stop before it")
            }
            Self::InvalidOffset { index } => {
                write!(f, "stop {index} has an offset outside of [0, 1]")
            }
        }
    }
}

impl core::error::Error for RampError {}

/// One of the four edges (or corners) of a mesh patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Top edge, traversed left to right.
    North,
    /// Right edge, traversed top to bottom.
    East,
    /// Bottom edge, traversed right to left.
    South,
    /// Left edge, traversed bottom to top.
    West,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
        })
    }
}

/// What went wrong while assembling a mesh gradient.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshErrorKind {
    /// The mesh has no rows or its first row has no patches.
    Empty,
    /// A row has a different number of patches than the first row.
    RowLengthMismatch {
        /// Patch count of the first row.
        expected: usize,
        /// Patch count of the offending row.
        found: usize,
    },
    /// A patch declares fewer stops than its grid position requires.
    NotEnoughStops {
        /// Stops required at this grid position.
        required: usize,
        /// Stops supplied.
        found: usize,
    },
    /// An edge was never defined, neither by a stop nor by a neighbor.
    MissingEdge(Side),
    /// An edge has a control point that is NaN or infinite.
    UnspecifiedPoint(Side),
    /// An edge does not start where the previous edge ends.
    Disconnected(Side),
}

/// Error returned when a mesh description cannot be assembled into a patch grid.
///
/// `row` and `column` identify the offending patch; no partial mesh is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshError {
    /// Row of the offending patch.
    pub row: usize,
    /// Column of the offending patch.
    pub column: usize,
    /// The failure.
    pub kind: MeshErrorKind,
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mesh patch ({}, {}): ", self.row, self.column)?;
        match self.kind {
            MeshErrorKind::Empty => f.write_str("mesh has no patches"),
            MeshErrorKind::RowLengthMismatch { expected, found } => {
                write!(f, "row has {found} patches, expected {expected}")
            }
            MeshErrorKind::NotEnoughStops { required, found } => {
                write!(f, "needs {required} stops, got {found}")
            }
            MeshErrorKind::MissingEdge(side) => write!(f, "{side} edge is missing"),
            MeshErrorKind::UnspecifiedPoint(side) => {
                write!(f, "{side} edge has an unspecified point")
            }
            MeshErrorKind::Disconnected(side) => {
                write!(f, "{side} edge does not continue the previous edge")
            }
        }
    }
}

impl core::error::Error for MeshError {}

/// Error returned when mesh-stop path data is not a single `l`, `L`, `c` or `C` command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeParseError {
    /// The command letter is missing or not one of `l L c C`.
    UnsupportedCommand,
    /// A required number is missing or malformed at the given byte offset.
    InvalidNumber {
        /// Byte offset into the input.
        offset: usize,
    },
    /// Input continues after the command.
    TrailingData {
        /// Byte offset into the input.
        offset: usize,
    },
}

impl fmt::Display for EdgeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedCommand => f.write_str("only commands c C l L are allowed"),
            Self::InvalidNumber { offset } => write!(f, "expected a number at offset {offset}"),
            Self::TrailingData { offset } => write!(f, "unexpected data at offset {offset}"),
        }
    }
}

impl core::error::Error for EdgeParseError {}

/// Error returned when a [`Paint`](crate::Paint) cannot be created from a gradient description.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintError {
    /// The stop list was rejected.
    Ramp(RampError),
    /// The gradient kind has no sampler here (sweep gradients).
    UnsupportedKind,
}

impl fmt::Display for PaintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ramp(err) => write!(f, "invalid gradient stops: {err}"),
            Self::UnsupportedKind => f.write_str("unsupported gradient kind"),
        }
    }
}

impl core::error::Error for PaintError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Ramp(err) => Some(err),
            Self::UnsupportedKind => None,
        }
    }
}

impl From<RampError> for PaintError {
    fn from(err: RampError) -> Self {
        Self::Ramp(err)
    }
}
