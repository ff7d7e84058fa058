// Copyright 2025 the Kurbo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported while building or scoring a stroke.

use core::fmt;

/// An error from building, driving or scoring a [`Stroke`](crate::Stroke).
///
/// Everything except [`DegenerateGeometry`](StrokeError::DegenerateGeometry)
/// is a configuration error: the caller misused the model, and the call
/// that reported it left the model unchanged.
#[derive(Clone, Debug, PartialEq)]
pub enum StrokeError {
    /// A second constraint tried to determine a point that already has a determiner.
    AlreadyDetermined {
        /// The contested point index.
        index: usize,
    },
    /// A constraint referred to a point index past the end of the stroke.
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of points in the stroke.
        len: usize,
    },
    /// A free-variable vector had the wrong length.
    FreeVariableCount {
        /// Sum of the free-parameter counts of all constraints.
        expected: usize,
        /// Length of the vector supplied.
        found: usize,
    },
    /// The stroke was frozen and accepts no more constraints.
    Frozen,
    /// A direction angle outside `[0, 2π]`.
    AngleOutOfRange {
        /// The rejected angle, in radians.
        angle: f64,
    },
    /// A lower bound above its upper bound.
    InvalidRange {
        /// Lower end.
        min: f64,
        /// Upper end.
        max: f64,
    },
    /// A point array whose length is not `3·N + 1` for some `N ≥ 1`.
    BadPointCount {
        /// Length of the rejected array.
        len: usize,
    },
    /// A segment index past the last segment.
    SegmentOutOfRange {
        /// The offending segment index.
        index: usize,
        /// Number of segments in the stroke.
        count: usize,
    },
    /// A constraint reads a point whose determiner comes later in the update order.
    ReadBeforeDetermined {
        /// Position of the reading constraint in the constraint list.
        constraint: usize,
        /// The point it reads too early.
        index: usize,
    },
    /// Curvature could not be evaluated because the tangent vanished.
    DegenerateGeometry {
        /// Segment where it happened.
        segment: usize,
        /// Curve parameter within that segment.
        t: f64,
    },
}

impl fmt::Display for StrokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrokeError::AlreadyDetermined { index } => {
                write!(f, "point {index} is already determined by another constraint")
            }
            StrokeError::IndexOutOfRange { index, len } => {
                write!(f, "point index {index} out of range for a stroke of {len} points")
            }
            StrokeError::FreeVariableCount { expected, found } => {
                write!(f, "expected {expected} free variables, got {found}")
            }
            StrokeError::Frozen => write!(f, "stroke is frozen"),
            StrokeError::AngleOutOfRange { angle } => {
                write!(f, "angle {angle} is outside [0, 2π]")
            }
            StrokeError::InvalidRange { min, max } => {
                write!(f, "invalid range [{min}, {max}]")
            }
            StrokeError::BadPointCount { len } => {
                write!(f, "{len} points do not form a chain of cubic segments")
            }
            StrokeError::SegmentOutOfRange { index, count } => {
                write!(f, "segment {index} out of range for a stroke of {count} segments")
            }
            StrokeError::ReadBeforeDetermined { constraint, index } => write!(
                f,
                "constraint {constraint} reads point {index} before it is determined"
            ),
            StrokeError::DegenerateGeometry { segment, t } => {
                write!(f, "degenerate tangent in segment {segment} at t = {t}")
            }
        }
    }
}

impl core::error::Error for StrokeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            StrokeError::FreeVariableCount {
                expected: 7,
                found: 5
            }
            .to_string(),
            "expected 7 free variables, got 5"
        );
        assert_eq!(
            StrokeError::AlreadyDetermined { index: 3 }.to_string(),
            "point 3 is already determined by another constraint"
        );
    }
}
