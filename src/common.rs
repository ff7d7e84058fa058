// Copyright 2025 the Kurbo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Common numerical helpers and tolerances.

#![allow(missing_docs)]

/// Defines a trait that chooses between libstd or libm implementations of float methods.
macro_rules! define_float_funcs {
    ($(
        fn $name:ident(self $(,$arg:ident: $arg_ty:ty)*) -> $ret:ty
        => $lname:ident;
    )+) => {
        #[cfg(not(feature = "std"))]
        pub(crate) trait FloatFuncs : Sized {
            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret;)+
        }

        #[cfg(not(feature = "std"))]
        impl FloatFuncs for f64 {
            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret {
                #[cfg(feature = "libm")]
                return libm::$lname(self $(,$arg as _)*);

                #[cfg(not(feature = "libm"))]
                compile_error!("stroke_skeleton requires either the `std` or `libm` feature")
            })+
        }
    }
}

define_float_funcs! {
    fn abs(self) -> Self => fabs;
    fn atan2(self, other: Self) -> Self => atan2;
    fn hypot(self, other: Self) -> Self => hypot;
    fn sin_cos(self) -> (Self, Self) => sincos;
}

/// Below this magnitude a vector is treated as having no direction.
pub const NORMALIZE_EPSILON: f64 = 1e-4;

/// Distance under which two points count as the same point.
pub const PROXIMITY_TOLERANCE: f64 = 1e-4;

/// Parameter step used when summing chord lengths.
pub const LENGTH_STEP: f64 = 0.05;

/// Parameter step used when summing curvature.
pub const ENERGY_STEP: f64 = 0.01;

/// Parameter step of the coarse closest-point scan.
pub const CLOSEST_T_STEP: f64 = 0.1;

/// Uniform samples of the unit parameter interval.
///
/// Yields `0, step, 2·step, …` up to and including the last sample not
/// past `1 + step / 2`, so the endpoint is covered even when `step` does
/// not divide 1 exactly. Samples are computed by multiplication, so they
/// do not accumulate rounding error.
///
/// # Panics
///
/// Panics if `step` is not strictly positive.
pub fn sample_params(step: f64) -> impl Iterator<Item = f64> + Clone {
    assert!(step > 0.0, "sample step must be positive");
    let count = ((1.0 + 0.5 * step) / step) as usize;
    (0..=count).map(move |i| i as f64 * step)
}

/// Wrap an angle into `[0, 2π)`.
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let tau = core::f64::consts::TAU;
    let r = angle % tau;
    if r < 0.0 {
        r + tau
    } else {
        r
    }
}
