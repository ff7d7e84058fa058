// Copyright 2025 the Kurbo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cubic Bézier segments and the differential geometry scored by the optimizer.

use crate::common::{sample_params, CLOSEST_T_STEP, ENERGY_STEP, LENGTH_STEP, NORMALIZE_EPSILON};
use crate::{Point, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A single cubic Bézier segment.
///
/// Inside a [`Stroke`](crate::Stroke) this is a copy of four consecutive
/// points of the point array; editing it does not write back.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bezier {
    /// The start point.
    pub p1: Point,
    /// The handle leaving the start point.
    pub c1: Point,
    /// The handle entering the end point.
    pub c2: Point,
    /// The end point.
    pub p2: Point,
}

impl Bezier {
    /// Create a new cubic Bézier segment.
    #[inline]
    pub fn new<P: Into<Point>>(p1: P, c1: P, c2: P, p2: P) -> Bezier {
        Bezier {
            p1: p1.into(),
            c1: c1.into(),
            c2: c2.into(),
            p2: p2.into(),
        }
    }

    /// Evaluate the position at parameter `t`.
    ///
    /// There is no clamping; samplers that step a little past the ends
    /// of `[0, 1]` get the polynomial extension of the curve.
    #[inline]
    pub fn evaluate(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        let v = self.p1.to_vec2() * (mt * mt * mt)
            + (self.c1.to_vec2() * (mt * mt * 3.0)
                + (self.c2.to_vec2() * (mt * 3.0) + self.p2.to_vec2() * t) * t)
                * t;
        v.to_point()
    }

    /// First derivative with respect to `t`.
    #[inline]
    pub fn evaluate_d1(&self, t: f64) -> Vec2 {
        let mt = 1.0 - t;
        (self.c1 - self.p1) * (3.0 * mt * mt)
            + (self.c2 - self.c1) * (6.0 * mt * t)
            + (self.p2 - self.c2) * (3.0 * t * t)
    }

    /// Second derivative with respect to `t`.
    #[inline]
    pub fn evaluate_d2(&self, t: f64) -> Vec2 {
        let mt = 1.0 - t;
        let a = (self.c2 - self.c1) - (self.c1 - self.p1);
        let b = (self.p2 - self.c2) - (self.c2 - self.c1);
        a * (6.0 * mt) + b * (6.0 * t)
    }

    /// Unit normal on the left of the direction of travel.
    ///
    /// This is the tangent turned by +90° and normalized. When the tangent
    /// is shorter than 1e-4 the result is [`Vec2::ZERO`].
    #[inline]
    pub fn evaluate_left_normal(&self, t: f64) -> Vec2 {
        self.evaluate_d1(t).turn_90().normalize()
    }

    /// Unsigned curvature `|B' × B''| / |B'|³`.
    ///
    /// At a cusp the speed goes to zero and this returns a huge value,
    /// infinity or `NaN`. That is the expected answer for degenerate
    /// geometry; use [`Bezier::checked_curvature`] to detect it instead.
    #[inline]
    pub fn evaluate_curvature(&self, t: f64) -> f64 {
        let d1 = self.evaluate_d1(t);
        let d2 = self.evaluate_d2(t);
        let speed = d1.hypot();
        d1.cross(d2).abs() / (speed * speed * speed)
    }

    /// Curvature, or `None` if the tangent at `t` is shorter than 1e-4 or
    /// the result is not finite.
    pub fn checked_curvature(&self, t: f64) -> Option<f64> {
        if self.evaluate_d1(t).hypot() < NORMALIZE_EPSILON {
            return None;
        }
        Some(self.evaluate_curvature(t)).filter(|k| k.is_finite())
    }

    /// Approximate arc length, as the sum of chords between samples
    /// spaced 0.05 apart in `t`.
    pub fn evaluate_length(&self) -> f64 {
        let mut last = self.p1;
        let mut length = 0.0;
        for t in sample_params(LENGTH_STEP) {
            let p = self.evaluate(t);
            length += last.distance(p);
            last = p;
        }
        length
    }

    /// Bending energy: curvature summed over samples spaced 0.01 apart in
    /// `t`, each weighted by the step.
    ///
    /// Non-finite curvature samples propagate into the result.
    pub fn evaluate_energy(&self) -> f64 {
        sample_params(ENERGY_STEP)
            .map(|t| ENERGY_STEP * self.evaluate_curvature(t))
            .sum()
    }

    /// The integral of `|B''(t)|²` over `[0, 1]`.
    ///
    /// `B''` is linear in `t`, so this is exact. Unlike the bending energy
    /// it stays finite when the curve has a cusp.
    pub fn second_derivative_energy(&self) -> f64 {
        let a = self.evaluate_d2(0.0);
        let b = self.evaluate_d2(1.0);
        (a.hypot2() + a.dot(b) + b.hypot2()) / 3.0
    }

    /// The sampled parameter closest to `p`.
    ///
    /// This is a plain scan of `t = 0, 0.1, …, 1.0` returning the arg-min;
    /// the first sample wins ties. There is no refinement between samples.
    pub fn closest_t(&self, p: Point) -> f64 {
        let mut best_t = 0.0;
        let mut best_dist = f64::INFINITY;
        for t in sample_params(CLOSEST_T_STEP) {
            let dist = p.distance_squared(self.evaluate(t));
            if dist < best_dist {
                best_dist = dist;
                best_t = t;
            }
        }
        best_t
    }

    /// Distance from `p` to the curve point at [`Bezier::closest_t`].
    pub fn distance(&self, p: Point) -> f64 {
        p.distance(self.evaluate(self.closest_t(p)))
    }

    /// The same curve traversed in the opposite direction.
    #[must_use]
    #[inline]
    pub fn reversed(&self) -> Bezier {
        Bezier::new(self.p2, self.c2, self.c1, self.p1)
    }

    /// Is this segment finite?
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.p1.is_finite() && self.c1.is_finite() && self.c2.is_finite() && self.p2.is_finite()
    }
}
