// Copyright 2025 the Kurbo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge strokes offset from a finished skeleton.
//!
//! An edge is a [`Stroke`] of its own, with the same number of segments as
//! the skeleton. Its anchors sit at a fixed distance along the skeleton's
//! left normal, its junction handles are parallel to the skeleton's
//! tangents, and it carries target points sampled from the exact offset
//! curve. Fitting it against [`Objective::TargetError`] pulls the handles
//! into shape.
//!
//! [`Objective::TargetError`]: crate::Objective::TargetError

use alloc::vec::Vec;

use core::f64::consts::PI;

use log::debug;
use smallvec::{smallvec, SmallVec};

use crate::common::normalize_angle;
use crate::{Bezier, Direction, Fixed, Point, Smooth, Stroke, StrokeError};

/// Which side of the skeleton an edge lies on, looking along it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// Along the left normal.
    Left,
    /// Against the left normal.
    Right,
}

impl Side {
    fn sign(self) -> f64 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }
}

/// Parameters of [`offset_stroke`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffsetConfig {
    /// Distance between the skeleton and each edge.
    pub radius: f64,
    /// Curve parameters, per segment, where target points are sampled.
    pub samples: SmallVec<[f64; 4]>,
}

impl Default for OffsetConfig {
    fn default() -> Self {
        OffsetConfig {
            radius: 0.05,
            samples: smallvec![0.2, 0.4, 0.6, 0.8],
        }
    }
}

fn offset_point(b: &Bezier, t: f64, distance: f64) -> Point {
    b.evaluate(t) + b.evaluate_left_normal(t) * distance
}

/// Build the edge stroke on `side` of `skeleton`.
///
/// The result starts from the skeleton's points, has every point
/// determined, and has been rebuilt once. Its free variables are the
/// handle lengths of the junction handles that carry a direction.
///
/// A skeleton with a `NaN` tangent at a junction yields
/// [`StrokeError::AngleOutOfRange`].
pub fn offset_stroke(
    skeleton: &Stroke,
    side: Side,
    config: &OffsetConfig,
) -> Result<Stroke, StrokeError> {
    let distance = side.sign() * config.radius;
    let beziers: Vec<Bezier> = skeleton.beziers().collect();
    let mut edge = Stroke::from_points(skeleton.points().to_vec())?;

    let mut anchors = Vec::with_capacity(beziers.len() + 1);
    anchors.push((0, offset_point(&beziers[0], 0.0, distance)));
    for (i, b) in beziers.iter().enumerate() {
        anchors.push((3 * (i + 1), offset_point(b, 1.0, distance)));
    }
    edge.add_constraint(Fixed::many(anchors))?;

    let start = normalize_angle(beziers[0].evaluate_d1(0.0).atan2());
    edge.add_constraint(Direction::new(0, 1, start)?)?;
    for (i, b) in beziers.iter().enumerate() {
        let junction = 3 * (i + 1);
        let angle = normalize_angle(b.evaluate_d1(1.0).atan2() + PI);
        edge.add_constraint(Direction::new(junction, junction - 1, angle)?)?;
    }
    for junction in (3..3 * beziers.len()).step_by(3) {
        edge.add_constraint(Smooth::new(junction + 1, junction - 1, junction))?;
    }

    for (i, b) in beziers.iter().enumerate() {
        for &t in &config.samples {
            edge.add_target_point(i, offset_point(b, t, distance))?;
        }
    }
    edge.fill_free_constraints()?;
    edge.update_model();
    debug!(
        "built {side:?} edge: {} segments, {} free variables, {} targets",
        edge.num_beziers(),
        edge.free_variable_count(),
        edge.targets().len()
    );
    Ok(edge)
}

/// The closed outline of a stroke: the left edge forward, then the right
/// edge backward.
pub fn outline(left: &Stroke, right: &Stroke) -> Vec<Bezier> {
    let mut result: Vec<Bezier> = left.beziers().collect();
    let start = result.len();
    result.extend(right.beziers().map(|b| b.reversed()));
    result[start..].reverse();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_skeleton() -> Stroke {
        let mut stroke = Stroke::new(1);
        stroke
            .add_constraint(Fixed::many([
                (0, Point::new(0.0, 0.0)),
                (1, Point::new(1.0 / 3.0, 0.0)),
                (2, Point::new(2.0 / 3.0, 0.0)),
                (3, Point::new(1.0, 0.0)),
            ]))
            .unwrap();
        stroke.update_model();
        stroke
    }

    /// Two quarter-ish turns joined smoothly at (1, 0).
    fn bent_skeleton() -> Stroke {
        let points = alloc::vec![
            Point::new(0.0, 0.0),
            Point::new(0.3, 0.0),
            Point::new(0.7, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.3, 0.0),
            Point::new(1.6, 0.3),
            Point::new(1.6, 0.6),
        ];
        Stroke::from_points(points).unwrap()
    }

    #[test]
    fn straight_left_edge() {
        let edge = offset_stroke(&straight_skeleton(), Side::Left, &OffsetConfig::default()).unwrap();
        assert!(edge.points()[0].is_close(Point::new(0.0, 0.05)));
        assert!(edge.points()[3].is_close(Point::new(1.0, 0.05)));
        // Handles keep the default length along the skeleton tangent.
        assert!(edge.points()[1].is_close(Point::new(0.2, 0.05)));
        assert!(edge.points()[2].is_close(Point::new(0.8, 0.05)));
        assert_eq!(edge.num_unconstrained_points(), 0);
        assert_eq!(edge.free_variable_count(), 2);
        assert_eq!(edge.targets().len(), 4);
        assert!(edge.targets()[1].point.is_close(Point::new(0.4, 0.05)));
        assert_eq!(edge.validate_order(), Ok(()));
        assert_eq!(edge.calculate_constraint_error(), 0.0);
    }

    #[test]
    fn straight_right_edge() {
        let config = OffsetConfig {
            radius: 0.1,
            ..OffsetConfig::default()
        };
        let edge = offset_stroke(&straight_skeleton(), Side::Right, &config).unwrap();
        assert!(edge.points()[0].is_close(Point::new(0.0, -0.1)));
        assert!(edge.points()[3].is_close(Point::new(1.0, -0.1)));
        assert!(edge.targets()[0].point.is_close(Point::new(0.2, -0.1)));
    }

    #[test]
    fn junctions_are_smooth() {
        let skeleton = bent_skeleton();
        let edge = offset_stroke(&skeleton, Side::Left, &OffsetConfig::default()).unwrap();
        assert_eq!(edge.num_beziers(), 2);
        assert_eq!(edge.free_variable_count(), 3);
        assert_eq!(edge.targets().len(), 8);
        let p = edge.points();
        assert!(p[3].is_close(Point::new(1.0, 0.05)));
        // The handle after the junction mirrors the one before it.
        assert!((p[4] - p[3]).to_point().is_close((p[3] - p[2]).to_point()));
        assert!((p[2] - p[3]).normalize().to_point().is_close(Point::new(-1.0, 0.0)));
        // End handle runs back along the final tangent, which points up.
        assert!((p[5] - p[6]).normalize().to_point().is_close(Point::new(0.0, -1.0)));
        assert_eq!(edge.validate_order(), Ok(()));
    }

    #[test]
    fn outline_closes() {
        let skeleton = bent_skeleton();
        let config = OffsetConfig::default();
        let left = offset_stroke(&skeleton, Side::Left, &config).unwrap();
        let right = offset_stroke(&skeleton, Side::Right, &config).unwrap();
        let segments = outline(&left, &right);
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0], left.bezier(0).unwrap());
        assert_eq!(segments[2], right.bezier(1).unwrap().reversed());
        assert_eq!(segments[3], right.bezier(0).unwrap().reversed());
        for pair in [(0, 1), (2, 3)] {
            assert_eq!(segments[pair.0].p2, segments[pair.1].p1);
        }
        assert_eq!(segments[1].p2, *left.points().last().unwrap());
        assert_eq!(segments[2].p1, *right.points().last().unwrap());
    }
}
