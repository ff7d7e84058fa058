// Copyright 2025 the Kurbo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glue between a [`Stroke`] and a numerical minimizer.
//!
//! The minimizer itself is not part of this crate. Anything that can
//! minimize a box-bounded function of a flat `f64` vector can drive a
//! stroke by implementing [`Minimizer`]; [`fit`] runs it and commits the
//! result.

use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, trace, warn};

use crate::{Stroke, StrokeError, VariableLimits};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Relative step of the forward-difference gradient.
pub const FINITE_DIFFERENCE_STEP: f64 = 1e-9;

/// Per-score weights of a combined objective.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weights {
    /// Weight of [`Stroke::calculate_constraint_error`].
    pub constraint_error: f64,
    /// Weight of [`Stroke::calculate_energy`].
    pub energy: f64,
    /// Weight of [`Stroke::calculate_length`].
    pub length: f64,
    /// Weight of [`Stroke::calculate_target_error`].
    pub target_error: f64,
    /// Weight of [`Stroke::calculate_second_derivative`].
    pub second_derivative: f64,
}

/// Which aggregate score of a stroke to minimize.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Objective {
    /// [`Stroke::calculate_constraint_error`].
    ConstraintError,
    /// [`Stroke::calculate_energy`].
    Energy,
    /// [`Stroke::calculate_length`].
    Length,
    /// [`Stroke::calculate_target_error`].
    TargetError,
    /// [`Stroke::calculate_second_derivative`].
    SecondDerivative,
    /// A weighted sum of all of the above.
    Weighted(Weights),
}

impl Objective {
    /// Score the stroke as it stands. Does not rebuild it.
    pub fn score(&self, stroke: &Stroke) -> f64 {
        match self {
            Objective::ConstraintError => stroke.calculate_constraint_error(),
            Objective::Energy => stroke.calculate_energy(),
            Objective::Length => stroke.calculate_length(),
            Objective::TargetError => stroke.calculate_target_error(),
            Objective::SecondDerivative => stroke.calculate_second_derivative(),
            Objective::Weighted(w) => {
                // Skip zero weights so an unused non-finite score stays out.
                let mut total = 0.0;
                let terms: [(f64, fn(&Stroke) -> f64); 5] = [
                    (w.constraint_error, Stroke::calculate_constraint_error),
                    (w.energy, Stroke::calculate_energy),
                    (w.length, Stroke::calculate_length),
                    (w.target_error, Stroke::calculate_target_error),
                    (w.second_derivative, Stroke::calculate_second_derivative),
                ];
                for (weight, f) in terms {
                    if weight != 0.0 {
                        total += weight * f(stroke);
                    }
                }
                total
            }
        }
    }
}

/// A bounded minimization problem over a flat vector.
pub trait Problem {
    /// Starting point.
    fn initial(&self) -> Vec<f64>;

    /// Bounds, one per element of [`initial`](Problem::initial).
    fn limits(&self) -> Vec<VariableLimits>;

    /// Evaluate the objective at `x`.
    fn value(&mut self, x: &[f64]) -> Result<f64, StrokeError>;

    /// Gradient at `x`.
    ///
    /// The default is [`forward_difference`].
    fn gradient(&mut self, x: &[f64]) -> Result<Vec<f64>, StrokeError> {
        forward_difference(self, x)
    }

    /// Called by the minimizer once per completed iteration.
    fn iteration(&mut self, _iteration: usize) {}
}

/// Forward-difference gradient of `problem` at `x`.
///
/// The step for element `i` is [`FINITE_DIFFERENCE_STEP`] scaled by
/// `max(1, |x[i]|)`, with the sign of `x[i]`.
pub fn forward_difference<P: Problem + ?Sized>(
    problem: &mut P,
    x: &[f64],
) -> Result<Vec<f64>, StrokeError> {
    let f0 = problem.value(x)?;
    let mut probe = x.to_vec();
    let mut gradient = Vec::with_capacity(x.len());
    for (i, &xi) in x.iter().enumerate() {
        let sign = if xi < 0.0 { -1.0 } else { 1.0 };
        let h = FINITE_DIFFERENCE_STEP * sign * xi.abs().max(1.0);
        probe[i] = xi + h;
        // The step actually taken, after rounding.
        let dx = probe[i] - xi;
        let f1 = problem.value(&probe)?;
        gradient.push((f1 - f0) / dx);
        probe[i] = xi;
    }
    Ok(gradient)
}

/// The result of a minimization.
#[derive(Clone, Debug, PartialEq)]
pub struct Minimum {
    /// The best vector found.
    pub x: Vec<f64>,
    /// Objective value at `x`.
    pub value: f64,
    /// Whether the minimizer considers itself converged.
    pub success: bool,
    /// Why the minimizer stopped.
    pub message: String,
    /// Number of iterations run.
    pub iterations: usize,
}

/// A numerical minimizer.
///
/// Implementations must report failure through [`Minimum::success`]
/// rather than retrying; errors from the problem are passed through.
pub trait Minimizer {
    /// Minimize `problem`, starting from [`Problem::initial`].
    fn minimize(&mut self, problem: &mut dyn Problem) -> Result<Minimum, StrokeError>;
}

/// A [`Stroke`] exposed as a [`Problem`] over its free variables.
pub struct StrokeProblem<'a> {
    stroke: &'a mut Stroke,
    objective: Objective,
    penalty: Option<f64>,
    evaluations: usize,
    on_iteration: Option<&'a mut dyn FnMut(usize, &Stroke)>,
}

impl<'a> StrokeProblem<'a> {
    /// Bind `stroke` to `objective`.
    pub fn new(stroke: &'a mut Stroke, objective: Objective) -> StrokeProblem<'a> {
        StrokeProblem {
            stroke,
            objective,
            penalty: None,
            evaluations: 0,
            on_iteration: None,
        }
    }

    /// Add `weight` times the total bound violation to every value.
    ///
    /// For minimizers that ignore [`Problem::limits`].
    #[must_use]
    pub fn with_limit_penalty(mut self, weight: f64) -> StrokeProblem<'a> {
        self.penalty = Some(weight);
        self
    }

    /// Call `f` with the iteration index and the stroke after each iteration.
    #[must_use]
    pub fn with_iteration_callback(
        mut self,
        f: &'a mut dyn FnMut(usize, &Stroke),
    ) -> StrokeProblem<'a> {
        self.on_iteration = Some(f);
        self
    }

    /// The stroke, as of the last evaluation.
    pub fn stroke(&self) -> &Stroke {
        self.stroke
    }

    /// Number of calls to [`Problem::value`] so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    fn limit_violation(&self, x: &[f64]) -> f64 {
        self.stroke
            .get_free_variable_limits()
            .iter()
            .zip(x)
            .map(|(limits, v)| limits.violation(*v))
            .sum()
    }
}

impl Problem for StrokeProblem<'_> {
    fn initial(&self) -> Vec<f64> {
        self.stroke.get_free_variables()
    }

    fn limits(&self) -> Vec<VariableLimits> {
        self.stroke.get_free_variable_limits()
    }

    fn value(&mut self, x: &[f64]) -> Result<f64, StrokeError> {
        self.stroke.set_free_variables(x)?;
        self.evaluations += 1;
        let mut value = self.objective.score(self.stroke);
        if let Some(weight) = self.penalty {
            value += weight * self.limit_violation(x);
        }
        trace!("evaluation {}: {value}", self.evaluations);
        Ok(value)
    }

    fn iteration(&mut self, iteration: usize) {
        trace!("iteration {iteration} after {} evaluations", self.evaluations);
        if let Some(f) = self.on_iteration.as_mut() {
            f(iteration, &*self.stroke);
        }
    }
}

/// Minimize `objective` over the free variables of `stroke`.
///
/// `callback` sees the iteration index and the stroke after each
/// iteration. The vector the minimizer returns is written back to the
/// stroke exactly once, whether or not it reports success.
pub fn fit<M, F>(
    stroke: &mut Stroke,
    objective: Objective,
    minimizer: &mut M,
    mut callback: F,
) -> Result<Minimum, StrokeError>
where
    M: Minimizer + ?Sized,
    F: FnMut(usize, &Stroke),
{
    let mut problem =
        StrokeProblem::new(stroke, objective).with_iteration_callback(&mut callback);
    let minimum = minimizer.minimize(&mut problem)?;
    let evaluations = problem.evaluations();
    stroke.set_free_variables(&minimum.x)?;
    if minimum.success {
        debug!(
            "fit finished after {} iterations, {evaluations} evaluations: {} ({})",
            minimum.iterations, minimum.value, minimum.message
        );
    } else {
        warn!(
            "fit failed after {} iterations: {}",
            minimum.iterations, minimum.message
        );
    }
    Ok(minimum)
}
