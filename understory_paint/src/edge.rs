// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge commands of mesh stops.
//!
//! Each stop of a mesh patch carries a one-command path fragment describing
//! the edge that leaves the corner: `l`/`L` for straight edges and `c`/`C`
//! for cubic ones, relative or absolute. The final point of the last edge of
//! a patch may be left out; it always closes back onto the patch start.

use kurbo::{Point, Vec2};
#[cfg(feature = "std")]
use svgtypes::Stream;

use crate::bezier::Bezier;
#[cfg(feature = "std")]
use crate::error::EdgeParseError;

/// Placeholder for a coordinate pair that was left out.
#[cfg(feature = "std")]
const UNSPECIFIED: Point = Point::new(f64::NAN, f64::NAN);

/// One edge of a mesh patch, starting at the previous corner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EdgeCommand {
    /// A straight edge.
    LineTo {
        /// Whether `to` is relative to the edge start.
        relative: bool,
        /// End of the edge; NaN when left unspecified.
        to: Point,
    },
    /// A cubic edge.
    CurveTo {
        /// Whether the points are relative to the edge start.
        relative: bool,
        /// First control point.
        c1: Point,
        /// Second control point.
        c2: Point,
        /// End of the edge; NaN when left unspecified.
        to: Point,
    },
}

impl EdgeCommand {
    /// An absolute straight edge to `to`.
    #[must_use]
    pub const fn line_to(to: Point) -> Self {
        Self::LineTo {
            relative: false,
            to,
        }
    }

    /// An absolute cubic edge.
    #[must_use]
    pub const fn curve_to(c1: Point, c2: Point, to: Point) -> Self {
        Self::CurveTo {
            relative: false,
            c1,
            c2,
            to,
        }
    }

    /// Builds the edge curve leaving `start`.
    ///
    /// Relative points are offset by `start`. An unspecified end point stays
    /// NaN; mesh assembly replaces it with the closing corner.
    #[must_use]
    pub fn to_bezier(&self, start: Point) -> Bezier {
        let resolve = |relative: bool, p: Point| {
            if relative {
                p + start.to_vec2()
            } else {
                p
            }
        };
        match *self {
            Self::LineTo { relative, to } => Bezier::straight_line(start, resolve(relative, to)),
            Self::CurveTo {
                relative,
                c1,
                c2,
                to,
            } => Bezier::new(
                start,
                resolve(relative, c1),
                resolve(relative, c2),
                resolve(relative, to),
            ),
        }
    }

    /// Builds the edge leaving `start` that closes a patch at `close`.
    ///
    /// The end point is snapped to `close`; an omitted end point of a line
    /// yields a straight edge to `close`.
    #[must_use]
    pub fn to_closing_bezier(&self, start: Point, close: Point) -> Bezier {
        if let Self::LineTo { to, .. } = self {
            if !to.is_finite() {
                return Bezier::straight_line(start, close);
            }
        }
        let mut edge = self.to_bezier(start);
        edge.d = close;
        edge
    }

    /// Whether the end point was left out.
    #[must_use]
    pub fn has_unspecified_end(&self) -> bool {
        let (Self::LineTo { to, .. } | Self::CurveTo { to, .. }) = self;
        !to.is_finite()
    }

    /// Parses a single `l`, `L`, `c` or `C` command.
    ///
    /// Numbers follow the SVG path grammar: separated by whitespace and/or a
    /// comma, or by nothing where a sign or second decimal point starts the
    /// next number. The last coordinate pair may be omitted.
    #[cfg(feature = "std")]
    pub fn parse(input: &str) -> Result<Self, EdgeParseError> {
        let mut s = Stream::from(input);
        s.skip_spaces();
        let (relative, is_curve) = match s.curr_byte() {
            Ok(b'l') => (true, false),
            Ok(b'L') => (false, false),
            Ok(b'c') => (true, true),
            Ok(b'C') => (false, true),
            _ => return Err(EdgeParseError::UnsupportedCommand),
        };
        s.advance(1);

        let command = if is_curve {
            let c1 = point(&mut s)?;
            let c2 = point(&mut s)?;
            let to = optional_point(&mut s)?;
            Self::CurveTo {
                relative,
                c1,
                c2,
                to,
            }
        } else {
            Self::LineTo {
                relative,
                to: optional_point(&mut s)?,
            }
        };

        s.skip_spaces();
        if !s.at_end() {
            return Err(EdgeParseError::TrailingData { offset: s.pos() });
        }
        Ok(command)
    }
}

/// Reads one number and the separator after it.
#[cfg(feature = "std")]
fn number(s: &mut Stream<'_>) -> Result<f64, EdgeParseError> {
    s.skip_spaces();
    let offset = s.pos();
    s.parse_list_number()
        .map_err(|_| EdgeParseError::InvalidNumber { offset })
}

#[cfg(feature = "std")]
fn point(s: &mut Stream<'_>) -> Result<Point, EdgeParseError> {
    Ok(Point::new(number(s)?, number(s)?))
}

#[cfg(feature = "std")]
fn optional_point(s: &mut Stream<'_>) -> Result<Point, EdgeParseError> {
    s.skip_spaces();
    if s.at_end() {
        Ok(UNSPECIFIED)
    } else {
        point(s)
    }
}

impl From<Vec2> for EdgeCommand {
    /// A relative straight edge along `delta`.
    fn from(delta: Vec2) -> Self {
        Self::LineTo {
            relative: true,
            to: delta.to_point(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_relative_curve() {
        assert_eq!(
            EdgeCommand::parse("c 1,2 3,4 5,6"),
            Ok(EdgeCommand::CurveTo {
                relative: true,
                c1: Point::new(1.0, 2.0),
                c2: Point::new(3.0, 4.0),
                to: Point::new(5.0, 6.0),
            }),
            "comma separated pairs"
        );
    }

    #[test]
    fn parses_absolute_line() {
        assert_eq!(
            EdgeCommand::parse("L 3 4"),
            Ok(EdgeCommand::line_to(Point::new(3.0, 4.0))),
            "space separated"
        );
        assert_eq!(
            EdgeCommand::parse("  l-1.5e1,.25  "),
            Ok(EdgeCommand::LineTo {
                relative: true,
                to: Point::new(-15.0, 0.25),
            }),
            "compact numbers with exponent"
        );
    }

    #[test]
    fn final_pair_may_be_omitted() {
        let line = EdgeCommand::parse("l").unwrap();
        assert!(line.has_unspecified_end(), "bare line");
        let curve = EdgeCommand::parse("C 0 0, 1 1").unwrap();
        assert!(curve.has_unspecified_end(), "curve without end point");
        assert!(
            !EdgeCommand::parse("C 0 0 1 1 2 2").unwrap().has_unspecified_end(),
            "complete curve"
        );
    }

    #[test]
    fn rejects_other_commands_and_garbage() {
        assert_eq!(EdgeCommand::parse("z"), Err(EdgeParseError::UnsupportedCommand), "close");
        assert_eq!(EdgeCommand::parse("M 0 0"), Err(EdgeParseError::UnsupportedCommand), "move");
        assert_eq!(EdgeCommand::parse(""), Err(EdgeParseError::UnsupportedCommand), "empty");
        assert_eq!(
            EdgeCommand::parse("L 1"),
            Err(EdgeParseError::InvalidNumber { offset: 3 }),
            "half a pair"
        );
        assert_eq!(
            EdgeCommand::parse("L 1 2 3"),
            Err(EdgeParseError::TrailingData { offset: 6 }),
            "extra number"
        );
        assert_eq!(
            EdgeCommand::parse("c 1 2 x 4"),
            Err(EdgeParseError::InvalidNumber { offset: 6 }),
            "offset of the bad number"
        );
    }

    #[test]
    fn numbers_may_run_together() {
        assert_eq!(
            EdgeCommand::parse("c1-2.5.5,3e1 4 5"),
            Ok(EdgeCommand::CurveTo {
                relative: true,
                c1: Point::new(1.0, -2.5),
                c2: Point::new(0.5, 30.0),
                to: Point::new(4.0, 5.0),
            }),
            "signs and decimal points split numbers"
        );
        assert_eq!(
            EdgeCommand::parse("L\t3,\n4"),
            Ok(EdgeCommand::line_to(Point::new(3.0, 4.0))),
            "tabs and newlines are whitespace"
        );
    }

    #[test]
    fn relative_edges_start_at_the_corner() {
        let start = Point::new(10.0, 20.0);
        let curve = EdgeCommand::parse("c 1 0 2 0 3 3").unwrap().to_bezier(start);
        assert_eq!(curve.a, start, "starts at the corner");
        assert_eq!(curve.b, Point::new(11.0, 20.0), "offset control");
        assert_eq!(curve.d, Point::new(13.0, 23.0), "offset end");

        let line = EdgeCommand::line_to(Point::new(13.0, 20.0)).to_bezier(start);
        assert_eq!(line.d, Point::new(13.0, 20.0), "absolute end");
        assert!((line.b - Point::new(11.0, 20.0)).hypot() < 1e-12, "line control at a third");
    }

    #[test]
    fn closing_edges_snap_to_the_patch_start() {
        let start = Point::new(0.0, 9.0);
        let open_line = EdgeCommand::parse("l").unwrap();
        assert!(!open_line.to_bezier(start).is_finite(), "open until closed");
        assert_eq!(
            open_line.to_closing_bezier(start, Point::ZERO),
            Bezier::straight_line(start, Point::ZERO),
            "straight edge to the closing corner"
        );

        let open_curve = EdgeCommand::parse("C 1 8 1 1").unwrap();
        let closed = open_curve.to_closing_bezier(start, Point::ZERO);
        assert_eq!(closed.b, Point::new(1.0, 8.0), "controls are kept");
        assert_eq!(closed.d, Point::ZERO, "end is the closing corner");

        let near = EdgeCommand::line_to(Point::new(1e-9, 0.0)).to_closing_bezier(start, Point::ZERO);
        assert_eq!(near.d, Point::ZERO, "specified ends are snapped too");
    }
}
