//! # Operating Lines
//!
//! The rectifying, feed and stripping lines of a binary column and the point
//! where the rectifying and feed lines cross.
//!
//! ## Line Equations
//!
//! | Line | Equation | Vertical when |
//! |------|----------|---------------|
//! | Rectifying | y = R/(R+1)·x + xd/(R+1) | R = -1 (at x = xd) |
//! | Feed | y = q/(q-1)·x - xf/(q-1) | q = 1 (at x = xf) |
//! | Stripping | through (xb, xb) and (xsol, ysol) | xsol = xb |
//!
//! Vertical lines are their own variant rather than a huge finite slope.
//! A computed slope whose magnitude exceeds [`VERTICAL_SLOPE_THRESHOLD`] is
//! treated as vertical too.

use crate::types::{ConfigError, Point, ensure_finite, ensure_fraction};
use serde::{Deserialize, Serialize};

/// Slopes larger than this (in magnitude) count as vertical.
pub const VERTICAL_SLOPE_THRESHOLD: f64 = 1e10;

/// Relative tolerance for declaring two slopes equal.
const PARALLEL_TOLERANCE: f64 = 1e-12;

// =============================================================================
// OPERATING LINE
// =============================================================================

/// A straight line on the x-y diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperatingLine {
    /// y = slope * x + intercept
    Sloped { slope: f64, intercept: f64 },
    /// x = constant
    Vertical { x: f64 },
}

impl OperatingLine {
    /// Build a line from slope and intercept. `vertical_x` is where the line
    /// sits if the slope turns out to be effectively infinite.
    fn from_slope(slope: f64, intercept: f64, vertical_x: f64) -> Self {
        if !slope.is_finite() || slope.abs() > VERTICAL_SLOPE_THRESHOLD {
            OperatingLine::Vertical { x: vertical_x }
        } else {
            OperatingLine::Sloped { slope, intercept }
        }
    }

    /// The line through two points.
    #[must_use]
    pub fn through(a: Point, b: Point) -> Self {
        let dx = b.x - a.x;
        if dx == 0.0 {
            return OperatingLine::Vertical { x: a.x };
        }
        let slope = (b.y - a.y) / dx;
        Self::from_slope(slope, a.y - slope * a.x, a.x)
    }

    /// The ordinate at `x`, or `None` for a vertical line.
    #[must_use]
    pub fn evaluate(&self, x: f64) -> Option<f64> {
        match *self {
            OperatingLine::Sloped { slope, intercept } => Some(slope * x + intercept),
            OperatingLine::Vertical { .. } => None,
        }
    }

    /// Slope of the line; infinite when vertical.
    #[must_use]
    pub fn slope(&self) -> f64 {
        match *self {
            OperatingLine::Sloped { slope, .. } => slope,
            OperatingLine::Vertical { .. } => f64::INFINITY,
        }
    }

    /// True for the vertical variant.
    #[must_use]
    pub fn is_vertical(&self) -> bool {
        matches!(self, OperatingLine::Vertical { .. })
    }

    /// True when the two lines never meet at a single point.
    #[must_use]
    pub fn is_parallel_to(&self, other: &OperatingLine) -> bool {
        match (*self, *other) {
            (OperatingLine::Vertical { .. }, OperatingLine::Vertical { .. }) => true,
            (OperatingLine::Sloped { slope: a, .. }, OperatingLine::Sloped { slope: b, .. }) => {
                (a - b).abs() <= PARALLEL_TOLERANCE * a.abs().max(b.abs()).max(1.0)
            }
            _ => false,
        }
    }

    /// The crossing point of two lines, if unique.
    #[must_use]
    pub fn intersect(&self, other: &OperatingLine) -> Option<Point> {
        if self.is_parallel_to(other) {
            return None;
        }
        match (*self, *other) {
            (OperatingLine::Vertical { x }, line) | (line, OperatingLine::Vertical { x }) => {
                line.evaluate(x).map(|y| Point::new(x, y))
            }
            (
                OperatingLine::Sloped {
                    slope: m1,
                    intercept: c1,
                },
                OperatingLine::Sloped {
                    slope: m2,
                    intercept: c2,
                },
            ) => {
                let x = (c2 - c1) / (m1 - m2);
                Some(Point::new(x, m1 * x + c1))
            }
        }
    }
}

/// Rectifying line for reflux ratio `reflux` and distillate `xd`.
#[must_use]
pub fn rectifying_line(reflux: f64, xd: f64) -> OperatingLine {
    if reflux == -1.0 {
        return OperatingLine::Vertical { x: xd };
    }
    OperatingLine::from_slope(reflux / (reflux + 1.0), xd / (reflux + 1.0), xd)
}

/// Feed (q) line for feed quality `q` and feed composition `xf`.
#[must_use]
pub fn feed_line(q: f64, xf: f64) -> OperatingLine {
    if q == 1.0 {
        return OperatingLine::Vertical { x: xf };
    }
    OperatingLine::from_slope(q / (q - 1.0), -xf / (q - 1.0), xf)
}

// =============================================================================
// FEED CONDITION
// =============================================================================

/// Reflux ratio, feed quality and feed composition, always supplied together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedCondition {
    /// Reflux ratio R.
    pub reflux: f64,
    /// Feed quality q (liquid fraction of the feed).
    pub q: f64,
    /// Feed composition xf.
    pub xf: f64,
}

impl FeedCondition {
    /// Create a validated feed condition.
    pub fn new(reflux: f64, q: f64, xf: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            reflux: ensure_finite("reflux ratio", reflux)?,
            q: ensure_finite("feed quality", q)?,
            xf: ensure_fraction("xf", xf)?,
        })
    }

    /// All three values or none; anything in between is an error.
    pub fn from_parts(
        reflux: Option<f64>,
        q: Option<f64>,
        xf: Option<f64>,
    ) -> Result<Option<Self>, ConfigError> {
        match (reflux, q, xf) {
            (None, None, None) => Ok(None),
            (Some(reflux), Some(q), Some(xf)) => Self::new(reflux, q, xf).map(Some),
            _ => {
                let missing: Vec<&str> = [
                    (reflux.is_none(), "reflux ratio"),
                    (q.is_none(), "feed quality"),
                    (xf.is_none(), "feed composition"),
                ]
                .iter()
                .filter(|(absent, _)| *absent)
                .map(|(_, name)| *name)
                .collect();
                Err(ConfigError::IncompleteFeed(missing.join(", ")))
            }
        }
    }
}

// =============================================================================
// OPERATING LINES
// =============================================================================

/// Column section that owns a point on the staircase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Rectifying,
    Stripping,
}

/// The three operating lines of a column with a single feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingLines {
    pub rectifying: OperatingLine,
    pub feed: OperatingLine,
    pub stripping: OperatingLine,
    /// Where the rectifying and feed lines cross.
    pub intersection: Point,
}

impl OperatingLines {
    /// Derive all lines for a feed condition and product targets.
    ///
    /// Fails if the rectifying and feed lines are parallel.
    pub fn new(feed: &FeedCondition, xd: f64, xb: f64) -> Result<Self, ConfigError> {
        let rectifying = rectifying_line(feed.reflux, xd);
        let feed_op = feed_line(feed.q, feed.xf);

        let intersection =
            rectifying
                .intersect(&feed_op)
                .ok_or(ConfigError::ParallelOperatingLines {
                    reflux: feed.reflux,
                    q: feed.q,
                })?;

        let stripping = OperatingLine::through(Point::diagonal(xb), intersection);

        Ok(Self {
            rectifying,
            feed: feed_op,
            stripping,
            intersection,
        })
    }

    /// Section for liquid composition `x`. Exactly at the intersection is
    /// stripping-side.
    #[must_use]
    pub fn section_at(&self, x: f64) -> Section {
        if x > self.intersection.x {
            Section::Rectifying
        } else {
            Section::Stripping
        }
    }

    /// The line for a section.
    #[must_use]
    pub fn line(&self, section: Section) -> &OperatingLine {
        match section {
            Section::Rectifying => &self.rectifying,
            Section::Stripping => &self.stripping,
        }
    }

    /// Ordinate of the active operating line at `x`.
    ///
    /// A vertical active line only arises for a stripping line with
    /// xsol = xb, where every remaining x is already at or below xb; the
    /// diagonal is used there.
    #[must_use]
    pub fn vapor_at(&self, x: f64) -> f64 {
        self.line(self.section_at(x)).evaluate(x).unwrap_or(x)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectifying_line_coefficients() {
        let line = rectifying_line(2.0, 0.9);
        let OperatingLine::Sloped { slope, intercept } = line else {
            unreachable!("R = 2 gives a sloped line");
        };
        assert!((slope - 2.0 / 3.0).abs() < 1e-12);
        assert!((intercept - 0.3).abs() < 1e-12);
        // Passes through (xd, xd).
        let y = line.evaluate(0.9).expect("sloped");
        assert!((y - 0.9).abs() < 1e-12);
    }

    #[test]
    fn degenerate_lines_are_vertical() {
        assert_eq!(feed_line(1.0, 0.5), OperatingLine::Vertical { x: 0.5 });
        assert_eq!(rectifying_line(-1.0, 0.9), OperatingLine::Vertical { x: 0.9 });
        assert_eq!(feed_line(1.0, 0.5).evaluate(0.5), None);
    }

    #[test]
    fn feed_line_passes_through_diagonal_at_xf() {
        let line = feed_line(0.4, 0.35);
        let y = line.evaluate(0.35).expect("sloped");
        assert!((y - 0.35).abs() < 1e-12);
    }

    #[test]
    fn saturated_liquid_intersection_is_closed_form() {
        let feed = FeedCondition::new(2.0, 1.0, 0.5).expect("feed");
        let lines = OperatingLines::new(&feed, 0.9, 0.1).expect("lines");
        assert_eq!(lines.intersection.x, 0.5);
        assert!((lines.intersection.y - 19.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn infinite_reflux_intersection_is_closed_form() {
        let feed = FeedCondition::new(-1.0, 0.5, 0.4).expect("feed");
        let lines = OperatingLines::new(&feed, 0.9, 0.1).expect("lines");
        assert_eq!(lines.intersection.x, 0.9);
        // Feed line q = 0.5: y = -x + 0.8
        assert!((lines.intersection.y + 0.1).abs() < 1e-12);
    }

    #[test]
    fn equal_slopes_are_parallel() {
        // R/(R+1) = q/(q-1) exactly when q = -R.
        let feed = FeedCondition::new(0.5, -0.5, 0.5).expect("feed");
        assert_eq!(
            OperatingLines::new(&feed, 0.9, 0.1),
            Err(ConfigError::ParallelOperatingLines {
                reflux: 0.5,
                q: -0.5
            })
        );
    }

    #[test]
    fn two_vertical_lines_are_parallel() {
        let feed = FeedCondition::new(-1.0, 1.0, 0.5).expect("feed");
        assert!(OperatingLines::new(&feed, 0.9, 0.1).is_err());
    }

    #[test]
    fn stripping_line_joins_bottoms_and_intersection() {
        let feed = FeedCondition::new(2.0, 1.0, 0.5).expect("feed");
        let lines = OperatingLines::new(&feed, 0.9, 0.1).expect("lines");
        let at_xb = lines.stripping.evaluate(0.1).expect("sloped");
        let at_xsol = lines.stripping.evaluate(0.5).expect("sloped");
        assert!((at_xb - 0.1).abs() < 1e-12);
        assert!((at_xsol - lines.intersection.y).abs() < 1e-12);
    }

    #[test]
    fn intersection_belongs_to_stripping_section() {
        let feed = FeedCondition::new(2.0, 1.0, 0.5).expect("feed");
        let lines = OperatingLines::new(&feed, 0.9, 0.1).expect("lines");
        assert_eq!(lines.section_at(0.5), Section::Stripping);
        assert_eq!(lines.section_at(0.5 + 1e-9), Section::Rectifying);
    }

    #[test]
    fn partial_feed_is_rejected() {
        assert_eq!(FeedCondition::from_parts(None, None, None), Ok(None));
        assert_eq!(
            FeedCondition::from_parts(Some(2.0), None, Some(0.5)),
            Err(ConfigError::IncompleteFeed("feed quality".to_string()))
        );
        assert_eq!(
            FeedCondition::from_parts(None, Some(1.0), None),
            Err(ConfigError::IncompleteFeed(
                "reflux ratio, feed composition".to_string()
            ))
        );
    }

    #[test]
    fn huge_slopes_count_as_vertical() {
        let line = OperatingLine::through(Point::new(0.5, 0.0), Point::new(0.5 + 1e-12, 1.0));
        assert!(line.is_vertical());
    }
}
