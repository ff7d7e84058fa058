// Copyright 2025 the Kurbo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The constraint graph over a chain of cubic segments.

use alloc::vec;
use alloc::vec::Vec;

use log::{debug, trace};

use crate::common::{sample_params, ENERGY_STEP};
use crate::{Bezier, Constraint, Free, Point, StrokeError, VariableLimits};

/// A point a segment should pass near, scored by
/// [`Stroke::calculate_target_error`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetPoint {
    /// Index of the segment.
    pub segment: usize,
    /// The point to approach.
    pub point: Point,
}

/// A chain of cubic Bézier segments whose points are derived by constraints.
///
/// The stroke holds `3·N + 1` points for `N` segments. Segment `i` is
/// points `3i..=3i+3`, so neighbouring segments share an endpoint.
///
/// Each point is written by at most one constraint. Once
/// [`fill_free_constraints`](Stroke::fill_free_constraints) has run, each
/// point is written by exactly one, and the whole point array is a function
/// of the free-variable vector.
///
/// Constraints run in the order they were added. A constraint that reads a
/// point has to be added after the constraint that determines it; nothing
/// reorders them. [`validate_order`](Stroke::validate_order) reports
/// violations.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawStroke"))]
pub struct Stroke {
    points: Vec<Point>,
    constraints: Vec<Constraint>,
    targets: Vec<TargetPoint>,
    frozen: bool,
}

/// A stroke as read from a serializer, before any checks.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
struct RawStroke {
    points: Vec<Point>,
    constraints: Vec<Constraint>,
    targets: Vec<TargetPoint>,
    frozen: bool,
}

/// Rebuilds through the same checks as [`Stroke::from_points`],
/// [`Stroke::add_constraint`] and [`Stroke::add_target_point`].
#[cfg(feature = "serde")]
impl TryFrom<RawStroke> for Stroke {
    type Error = StrokeError;

    fn try_from(raw: RawStroke) -> Result<Stroke, StrokeError> {
        let mut stroke = Stroke::from_points(raw.points)?;
        for constraint in raw.constraints {
            stroke.add_constraint(constraint)?;
        }
        for target in raw.targets {
            stroke.add_target_point(target.segment, target.point)?;
        }
        stroke.frozen = raw.frozen;
        Ok(stroke)
    }
}

impl Stroke {
    /// Create a stroke of `num_beziers` segments.
    ///
    /// Point `i` of `n` starts at `(i / n, i / n)`, and there are no
    /// constraints.
    ///
    /// # Panics
    ///
    /// Panics if `num_beziers` is zero.
    pub fn new(num_beziers: usize) -> Stroke {
        assert!(num_beziers > 0, "a stroke needs at least one segment");
        let num_points = 3 * num_beziers + 1;
        let points = (0..num_points)
            .map(|i| {
                let v = i as f64 / num_points as f64;
                Point::new(v, v)
            })
            .collect();
        Stroke {
            points,
            constraints: Vec::new(),
            targets: Vec::new(),
            frozen: false,
        }
    }

    /// Create an unconstrained stroke over existing points.
    pub fn from_points(points: Vec<Point>) -> Result<Stroke, StrokeError> {
        if points.len() < 4 || points.len() % 3 != 1 {
            return Err(StrokeError::BadPointCount { len: points.len() });
        }
        Ok(Stroke {
            points,
            constraints: Vec::new(),
            targets: Vec::new(),
            frozen: false,
        })
    }

    /// Number of segments.
    #[inline]
    pub fn num_beziers(&self) -> usize {
        self.points.len() / 3
    }

    /// The point array.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Overwrite one point.
    ///
    /// This is meant for seeding a point before
    /// [`fill_free_constraints`](Stroke::fill_free_constraints) picks up its
    /// coordinates; a determined point is rewritten by the next
    /// [`update_model`](Stroke::update_model).
    pub fn set_point(&mut self, index: usize, point: Point) -> Result<(), StrokeError> {
        let len = self.points.len();
        let slot = self
            .points
            .get_mut(index)
            .ok_or(StrokeError::IndexOutOfRange { index, len })?;
        *slot = point;
        Ok(())
    }

    /// The constraints, in update order.
    #[inline]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The target points.
    #[inline]
    pub fn targets(&self) -> &[TargetPoint] {
        &self.targets
    }

    /// Whether [`freeze`](Stroke::freeze) has been called.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Append a constraint.
    ///
    /// Fails, leaving the stroke unchanged, when the stroke is frozen, when
    /// an index is out of range, or when a determined point already has a
    /// determiner.
    pub fn add_constraint(&mut self, constraint: impl Into<Constraint>) -> Result<(), StrokeError> {
        let constraint = constraint.into();
        if self.frozen {
            return Err(StrokeError::Frozen);
        }
        let len = self.points.len();
        let determines = constraint.determines();
        for index in determines.iter().chain(constraint.reads().iter()) {
            if *index >= len {
                return Err(StrokeError::IndexOutOfRange { index: *index, len });
            }
        }
        let mut determined = self.determined_mask();
        for index in determines {
            if determined[index] {
                return Err(StrokeError::AlreadyDetermined { index });
            }
            determined[index] = true;
        }
        trace!("adding {} constraint {}", constraint.name(), self.constraints.len());
        self.constraints.push(constraint);
        Ok(())
    }

    /// Stop accepting constraints.
    pub fn freeze(&mut self) {
        debug!(
            "freezing stroke with {} constraints and {} free variables",
            self.constraints.len(),
            self.free_variable_count()
        );
        self.frozen = true;
    }

    /// [`fill_free_constraints`](Stroke::fill_free_constraints), then
    /// [`freeze`](Stroke::freeze).
    pub fn fill_and_freeze(&mut self) -> Result<usize, StrokeError> {
        let added = self.fill_free_constraints()?;
        self.freeze();
        Ok(added)
    }

    /// For each point, the position of the constraint that determines it.
    pub fn determiners(&self) -> Vec<Option<usize>> {
        let mut result = vec![None; self.points.len()];
        for (i, c) in self.constraints.iter().enumerate() {
            for index in c.determines() {
                result[index] = Some(i);
            }
        }
        result
    }

    fn determined_mask(&self) -> Vec<bool> {
        self.determiners().iter().map(Option::is_some).collect()
    }

    /// Number of points no constraint determines.
    pub fn num_unconstrained_points(&self) -> usize {
        self.determiners().iter().filter(|d| d.is_none()).count()
    }

    /// Give every undetermined point a [`Free`] constraint seeded at its
    /// current coordinates.
    ///
    /// The new constraints are appended in index order. Returns how many
    /// were added. A frozen stroke with undetermined points reports
    /// [`StrokeError::Frozen`].
    pub fn fill_free_constraints(&mut self) -> Result<usize, StrokeError> {
        let undetermined: Vec<usize> = self
            .determiners()
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_none())
            .map(|(i, _)| i)
            .collect();
        if undetermined.is_empty() {
            return Ok(0);
        }
        if self.frozen {
            return Err(StrokeError::Frozen);
        }
        for &index in &undetermined {
            self.constraints
                .push(Free::new(index, self.points[index]).into());
        }
        debug!("backfilled free constraints for points {:?}", undetermined);
        Ok(undetermined.len())
    }

    /// Sum of the free-parameter counts of all constraints.
    pub fn free_variable_count(&self) -> usize {
        self.constraints
            .iter()
            .map(Constraint::num_free_variables)
            .sum()
    }

    /// All free parameters, constraint by constraint in insertion order.
    pub fn get_free_variables(&self) -> Vec<f64> {
        self.constraints
            .iter()
            .flat_map(Constraint::free_variables)
            .collect()
    }

    /// Bounds matching [`get_free_variables`](Stroke::get_free_variables) element by element.
    pub fn get_free_variable_limits(&self) -> Vec<VariableLimits> {
        self.constraints
            .iter()
            .flat_map(Constraint::limits)
            .collect()
    }

    /// Hand the free parameters back to the constraints, then rebuild.
    ///
    /// The length of `values` is checked before anything is written.
    pub fn set_free_variables(&mut self, values: &[f64]) -> Result<(), StrokeError> {
        let expected = self.free_variable_count();
        if values.len() != expected {
            return Err(StrokeError::FreeVariableCount {
                expected,
                found: values.len(),
            });
        }
        let mut offset = 0;
        for c in &mut self.constraints {
            offset += c.set_free_variables(&values[offset..]);
        }
        self.update_model();
        Ok(())
    }

    /// Apply every constraint to the point array, in insertion order.
    pub fn update_model(&mut self) {
        for c in &self.constraints {
            c.update_model(&mut self.points);
        }
    }

    /// Check that no constraint reads a point whose determiner comes later.
    ///
    /// Points nobody determines are fine to read; they keep their value.
    /// This only reports the first problem, it does not reorder anything.
    pub fn validate_order(&self) -> Result<(), StrokeError> {
        let determiners = self.determiners();
        for (i, c) in self.constraints.iter().enumerate() {
            for index in c.reads() {
                if matches!(determiners[index], Some(d) if d > i) {
                    return Err(StrokeError::ReadBeforeDetermined {
                        constraint: i,
                        index,
                    });
                }
            }
        }
        Ok(())
    }

    /// The segments, as copies of each run of four points.
    ///
    /// Calling this again starts over from the first segment.
    pub fn beziers(&self) -> impl Iterator<Item = Bezier> + Clone + '_ {
        self.points
            .windows(4)
            .step_by(3)
            .map(|w| Bezier::new(w[0], w[1], w[2], w[3]))
    }

    /// Segment `index`, if there is one.
    pub fn bezier(&self, index: usize) -> Option<Bezier> {
        let start = index.checked_mul(3)?;
        let end = start.checked_add(4)?;
        match self.points.get(start..end)? {
            [p1, c1, c2, p2] => Some(Bezier::new(*p1, *c1, *c2, *p2)),
            _ => None,
        }
    }

    /// The on-curve points where segments join, including both ends.
    pub fn fixed_points(&self) -> impl Iterator<Item = Point> + Clone + '_ {
        self.points.iter().copied().step_by(3)
    }

    /// Evaluate the whole stroke at `t ∈ [0, N]`.
    ///
    /// The integer part picks the segment, the rest is the parameter
    /// within it. Values below 0 or above `N` extend the first or last
    /// segment.
    pub fn evaluate(&self, t: f64) -> Point {
        let last = self.num_beziers() - 1;
        let segment = if t > 0.0 { (t as usize).min(last) } else { 0 };
        let start = 3 * segment;
        let b = Bezier::new(
            self.points[start],
            self.points[start + 1],
            self.points[start + 2],
            self.points[start + 3],
        );
        b.evaluate(t - segment as f64)
    }

    /// Ask segment `segment` to pass near `point`.
    pub fn add_target_point(&mut self, segment: usize, point: Point) -> Result<(), StrokeError> {
        let count = self.num_beziers();
        if segment >= count {
            return Err(StrokeError::SegmentOutOfRange {
                index: segment,
                count,
            });
        }
        self.targets.push(TargetPoint { segment, point });
        Ok(())
    }

    /// Sum of the constraint residuals against the current points.
    pub fn calculate_constraint_error(&self) -> f64 {
        self.constraints
            .iter()
            .map(|c| c.calculate_error(&self.points))
            .sum()
    }

    /// Sum of the bending energies of the segments.
    ///
    /// A segment with a vanishing tangent makes this non-finite; see
    /// [`checked_energy`](Stroke::checked_energy).
    pub fn calculate_energy(&self) -> f64 {
        self.beziers().map(|b| b.evaluate_energy()).sum()
    }

    /// Sum of the bending energies, failing on the first curvature sample
    /// taken where the tangent vanishes.
    pub fn checked_energy(&self) -> Result<f64, StrokeError> {
        let mut total = 0.0;
        for (segment, b) in self.beziers().enumerate() {
            for t in sample_params(ENERGY_STEP) {
                let k = b
                    .checked_curvature(t)
                    .ok_or(StrokeError::DegenerateGeometry { segment, t })?;
                total += ENERGY_STEP * k;
            }
        }
        Ok(total)
    }

    /// Sum of the approximate lengths of the segments.
    pub fn calculate_length(&self) -> f64 {
        self.beziers().map(|b| b.evaluate_length()).sum()
    }

    /// Sum of the second-derivative energies of the segments.
    pub fn calculate_second_derivative(&self) -> f64 {
        self.beziers().map(|b| b.second_derivative_energy()).sum()
    }

    /// Sum over target points of the distance to their segment.
    pub fn calculate_target_error(&self) -> f64 {
        self.targets
            .iter()
            .filter_map(|target| Some(self.bezier(target.segment)?.distance(target.point)))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, Fixed, Mirror};
    use core::f64::consts::PI;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Round-trips the current free variables, like an optimizer that
    /// accepts its starting point.
    fn keep_current(stroke: &mut Stroke) {
        let vars = stroke.get_free_variables();
        stroke.set_free_variables(&vars).unwrap();
    }

    #[test]
    fn stroke_size() {
        assert_eq!(Stroke::new(1).points().len(), 4);
        assert_eq!(Stroke::new(6).points().len(), 19);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let n = rng.random_range(1..50);
            let stroke = Stroke::new(n);
            assert_eq!(stroke.points().len(), 3 * n + 1);
            assert_eq!(stroke.num_beziers(), n);
            assert_eq!(stroke.beziers().count(), n);
            assert_eq!(stroke.fixed_points().count(), n + 1);
        }
    }

    #[test]
    #[should_panic(expected = "at least one segment")]
    fn stroke_zero_segments() {
        let _ = Stroke::new(0);
    }

    #[test]
    fn default_layout() {
        let stroke = Stroke::new(1);
        assert_eq!(stroke.points()[0], Point::ZERO);
        assert_eq!(stroke.points()[2], Point::new(0.5, 0.5));
    }

    #[test]
    fn fixed_scenario() {
        let mut stroke = Stroke::new(1);
        let target = Point::new(3.0, 3.0);
        let last = *stroke.points().last().unwrap();
        assert_eq!(stroke.calculate_constraint_error(), 0.0);
        assert_eq!(stroke.num_unconstrained_points(), 4);

        stroke.add_constraint(Fixed::new(0, target)).unwrap();
        assert!(!stroke.points()[0].is_close(target));
        assert!(stroke.calculate_constraint_error() > 0.0);
        assert_eq!(stroke.num_unconstrained_points(), 3);

        stroke.update_model();
        assert!(stroke.points()[0].is_close(target));
        assert!(stroke.points()[3].is_close(last));
        assert_eq!(stroke.calculate_constraint_error(), 0.0);

        keep_current(&mut stroke);
        assert!(stroke.points()[0].is_close(target));
        assert_eq!(stroke.num_unconstrained_points(), 3);
    }

    #[test]
    fn fill_backfills_every_point() {
        let mut stroke = Stroke::new(1);
        let p0 = stroke.points()[0];
        assert_eq!(stroke.fill_free_constraints(), Ok(4));
        assert_eq!(stroke.num_unconstrained_points(), 0);
        assert_eq!(stroke.constraints().len(), 4);
        assert_eq!(stroke.free_variable_count(), 8);
        keep_current(&mut stroke);
        assert!(p0.is_close(stroke.points()[0]));
        assert_eq!(stroke.fill_free_constraints(), Ok(0));
    }

    #[test]
    fn fill_determines_exactly_once() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let n = rng.random_range(1..8);
            let mut stroke = Stroke::new(n);
            for i in (0..stroke.points().len()).step_by(3) {
                if rng.random_bool(0.5) {
                    stroke.add_constraint(Fixed::new(i, (i as f64, 0.0))).unwrap();
                }
            }
            stroke.fill_free_constraints().unwrap();
            let mut counts = vec![0; stroke.points().len()];
            for c in stroke.constraints() {
                for index in c.determines() {
                    counts[index] += 1;
                }
            }
            assert!(counts.iter().all(|&c| c == 1));
            assert_eq!(stroke.num_unconstrained_points(), 0);
        }
    }

    #[test]
    fn fixed_and_fill_reproduce_targets() {
        let mut stroke = Stroke::new(2);
        let seeds = stroke.points().to_vec();
        stroke.add_constraint(Fixed::new(0, (0.1, 0.2))).unwrap();
        stroke.add_constraint(Fixed::new(6, (0.9, 0.2))).unwrap();
        stroke.fill_free_constraints().unwrap();
        stroke.update_model();
        assert_eq!(stroke.points()[0], Point::new(0.1, 0.2));
        assert_eq!(stroke.points()[6], Point::new(0.9, 0.2));
        for i in 1..6 {
            assert_eq!(stroke.points()[i], seeds[i]);
        }
    }

    #[test]
    fn update_is_idempotent() {
        let mut stroke = Stroke::new(2);
        stroke.add_constraint(Fixed::new(0, (0.0, 0.0))).unwrap();
        stroke.add_constraint(Fixed::new(3, (1.0, 0.0))).unwrap();
        stroke
            .add_constraint(Direction::new(3, 2, PI).unwrap())
            .unwrap();
        stroke.add_constraint(Mirror::new(4, 2, 3)).unwrap();
        stroke.fill_free_constraints().unwrap();
        stroke.update_model();
        let first = stroke.points().to_vec();
        stroke.update_model();
        assert_eq!(stroke.points(), &first[..]);
    }

    #[test]
    fn double_determination_rejected() {
        let mut stroke = Stroke::new(1);
        stroke.add_constraint(Fixed::new(1, (0.0, 0.0))).unwrap();
        let err = stroke.add_constraint(Free::new(1, (1.0, 1.0)));
        assert_eq!(err, Err(StrokeError::AlreadyDetermined { index: 1 }));
        assert_eq!(stroke.constraints().len(), 1);

        let err = stroke.add_constraint(Fixed::many([(2, Point::ZERO), (2, Point::ZERO)]));
        assert_eq!(err, Err(StrokeError::AlreadyDetermined { index: 2 }));
        assert_eq!(stroke.constraints().len(), 1);
    }

    #[test]
    fn index_out_of_range_rejected() {
        let mut stroke = Stroke::new(1);
        assert_eq!(
            stroke.add_constraint(Mirror::new(2, 0, 9)),
            Err(StrokeError::IndexOutOfRange { index: 9, len: 4 })
        );
        assert!(stroke.set_point(4, Point::ZERO).is_err());
        assert!(stroke.add_target_point(1, Point::ZERO).is_err());
    }

    #[test]
    fn free_variable_count_mismatch() {
        let mut stroke = Stroke::new(1);
        stroke.fill_free_constraints().unwrap();
        let before = stroke.get_free_variables();
        assert_eq!(
            stroke.set_free_variables(&[1.0; 7]),
            Err(StrokeError::FreeVariableCount {
                expected: 8,
                found: 7
            })
        );
        assert_eq!(stroke.get_free_variables(), before);
    }

    #[test]
    fn free_variables_align_with_limits() {
        let mut stroke = Stroke::new(2);
        stroke.add_constraint(Fixed::new(3, (0.5, 0.5))).unwrap();
        stroke
            .add_constraint(Direction::new(3, 2, PI).unwrap())
            .unwrap();
        stroke.fill_free_constraints().unwrap();
        let vars = stroke.get_free_variables();
        let limits = stroke.get_free_variable_limits();
        assert_eq!(vars.len(), limits.len());
        assert_eq!(vars.len(), stroke.free_variable_count());
        assert_eq!(vars[0], 0.2);
        assert_eq!(limits[0], VariableLimits::new(Some(0.0), Some(10.0)));
        assert_eq!(limits[1], VariableLimits::UNBOUNDED);
    }

    #[test]
    fn set_free_variables_rebuilds() {
        let mut stroke = Stroke::new(1);
        stroke.add_constraint(Fixed::new(0, (0.0, 0.0))).unwrap();
        stroke.add_constraint(Direction::new(0, 1, 0.0).unwrap()).unwrap();
        stroke.set_free_variables(&[2.0]).unwrap();
        assert!(stroke.points()[1].is_close(Point::new(2.0, 0.0)));
    }

    #[test]
    fn freeze_blocks_constraints() {
        let mut stroke = Stroke::new(1);
        stroke.add_constraint(Fixed::new(0, (0.0, 0.0))).unwrap();
        assert_eq!(stroke.fill_and_freeze(), Ok(3));
        assert!(stroke.is_frozen());
        assert_eq!(
            stroke.add_constraint(Fixed::new(0, (1.0, 1.0))),
            Err(StrokeError::Frozen)
        );
        assert_eq!(stroke.fill_free_constraints(), Ok(0));

        let mut stroke = Stroke::new(1);
        stroke.freeze();
        assert_eq!(stroke.fill_free_constraints(), Err(StrokeError::Frozen));
    }

    #[test]
    fn order_validation() {
        let mut stroke = Stroke::new(1);
        stroke.add_constraint(Mirror::new(2, 0, 1)).unwrap();
        assert_eq!(stroke.validate_order(), Ok(()));
        stroke.add_constraint(Fixed::new(1, (1.0, 0.0))).unwrap();
        assert_eq!(
            stroke.validate_order(),
            Err(StrokeError::ReadBeforeDetermined {
                constraint: 0,
                index: 1
            })
        );
    }

    #[test]
    fn beziers_restart() {
        let stroke = Stroke::new(3);
        let first: Vec<Bezier> = stroke.beziers().collect();
        let second: Vec<Bezier> = stroke.beziers().collect();
        assert_eq!(first, second);
        assert_eq!(first[1].p1, stroke.points()[3]);
        assert_eq!(first[1].p2, stroke.points()[6]);
        assert_eq!(stroke.bezier(1), Some(first[1]));
        assert_eq!(stroke.bezier(3), None);
        assert_eq!(stroke.bezier(usize::MAX / 3), None);
        assert_eq!(stroke.bezier(usize::MAX), None);
        assert_eq!(first[0].p2, first[1].p1);
    }

    #[test]
    fn global_evaluate() {
        let stroke = Stroke::new(2);
        assert_eq!(stroke.evaluate(0.0), stroke.points()[0]);
        assert_eq!(stroke.evaluate(1.0), stroke.points()[3]);
        assert_eq!(stroke.evaluate(2.0), stroke.points()[6]);
        let b = stroke.bezier(1).unwrap();
        assert!(stroke.evaluate(1.5).is_close(b.evaluate(0.5)));
    }

    #[test]
    fn scores() {
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
        assert!((stroke.calculate_length() - 1.0).abs() < 1e-9);
        assert_eq!(stroke.calculate_energy(), 0.0);
        assert_eq!(stroke.checked_energy(), Ok(0.0));
        assert!(stroke.calculate_second_derivative().abs() < 1e-12);

        stroke.add_target_point(0, Point::new(0.5, 0.1)).unwrap();
        assert!((stroke.calculate_target_error() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn degenerate_energy() {
        let p = Point::new(0.5, 0.5);
        let mut stroke = Stroke::from_points(vec![p; 4]).unwrap();
        stroke.update_model();
        assert!(!stroke.calculate_energy().is_finite());
        assert_eq!(
            stroke.checked_energy(),
            Err(StrokeError::DegenerateGeometry { segment: 0, t: 0.0 })
        );
    }

    #[test]
    fn from_points_checks_length() {
        assert!(Stroke::from_points(vec![Point::ZERO; 7]).is_ok());
        assert_eq!(
            Stroke::from_points(vec![Point::ZERO; 5]).unwrap_err(),
            StrokeError::BadPointCount { len: 5 }
        );
        assert!(Stroke::from_points(vec![Point::ZERO; 1]).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_checks_invariants() {
        let ok = r#"{"points":[{"x":0.0,"y":0.0},{"x":0.3,"y":0.0},{"x":0.7,"y":0.0},{"x":1.0,"y":0.0}],
            "constraints":[{"Fixed":{"pins":[[0,{"x":0.0,"y":0.0}]]}}],
            "targets":[{"segment":0,"point":{"x":0.5,"y":0.1}}],"frozen":true}"#;
        let stroke: Stroke = serde_json::from_str(ok).unwrap();
        assert!(stroke.is_frozen());
        assert_eq!(stroke.constraints().len(), 1);
        assert_eq!(stroke.targets().len(), 1);

        let four = r#"[{"x":0.0,"y":0.0},{"x":0.3,"y":0.0},{"x":0.7,"y":0.0},{"x":1.0,"y":0.0}]"#;
        let malformed = [
            (
                r#"{"points":[],"constraints":[],"targets":[],"frozen":false}"#.to_string(),
                "do not form a chain",
            ),
            (
                format!(
                    r#"{{"points":{four},"constraints":[{{"Mirror":{{"index":2,"from":0,"mirror":9}}}}],"targets":[],"frozen":false}}"#
                ),
                "out of range",
            ),
            (
                format!(
                    r#"{{"points":{four},"constraints":[{{"Fixed":{{"pins":[[1,{{"x":0.0,"y":0.0}}]]}}}},{{"Fixed":{{"pins":[[1,{{"x":1.0,"y":0.0}}]]}}}}],"targets":[],"frozen":false}}"#
                ),
                "already determined",
            ),
            (
                format!(
                    r#"{{"points":{four},"constraints":[],"targets":[{{"segment":1,"point":{{"x":0.0,"y":0.0}}}}],"frozen":false}}"#
                ),
                "segment 1 out of range",
            ),
        ];
        for (json, message) in malformed {
            let err = serde_json::from_str::<Stroke>(&json).unwrap_err();
            assert!(err.to_string().contains(message), "{err}");
        }
    }
}
