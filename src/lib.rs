// Copyright 2025 the Kurbo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stroke skeletons: chains of cubic Bézier segments driven by constraints.
//!
//! A [`Stroke`] is an array of `3·N + 1` control points for `N` segments.
//! [`Constraint`]s derive points from constants, from other points, or
//! from a handful of free parameters. Once every point has a determiner,
//! the free parameters of all constraints, flattened into one vector, are
//! the only degrees of freedom of the shape, and a numerical minimizer can
//! search over them against one of the stroke's scores.
//!
//! # Examples
//!
//! Pin both ends of the first segment, pull its first handle along the x
//! axis, and continue smoothly through the junction:
//!
//! ```
//! use stroke_skeleton::{Direction, Fixed, Free, Mirror, Point, Stroke};
//!
//! let mut stroke = Stroke::new(2);
//! stroke.add_constraint(Fixed::new(0, (0.0, 0.0))).unwrap();
//! stroke.add_constraint(Fixed::new(3, (1.0, 0.0))).unwrap();
//! stroke.add_constraint(Direction::new(0, 1, 0.0).unwrap()).unwrap();
//! stroke.add_constraint(Free::new(2, (0.7, 0.2))).unwrap();
//! stroke.add_constraint(Mirror::new(4, 2, 3)).unwrap();
//! assert_eq!(stroke.validate_order(), Ok(()));
//! // Points 5 and 6 get free constraints seeded where they are now.
//! assert_eq!(stroke.fill_free_constraints(), Ok(2));
//!
//! let mut x = stroke.get_free_variables();
//! assert_eq!(x.len(), 1 + 2 + 2 * 2);
//! x[0] = 0.5;
//! stroke.set_free_variables(&x).unwrap();
//! assert!(stroke.points()[1].is_close(Point::new(0.5, 0.0)));
//! assert!(stroke.points()[4].is_close(Point::new(1.3, -0.2)));
//! ```
//!
//! Driving a fit needs a [`Minimizer`]; see [`fit`].
//!
//! # Feature Flags
//!
//! The following crate [feature flags](https://doc.rust-lang.org/cargo/reference/features.html#dependency-features) are available:
//!
//! - `std` (enabled by default): Get floating point functions from the standard library
//!   (likely using your target's libc).
//! - `libm`: Use floating point implementations from [libm][].
//!   This is useful for `no_std` environments.
//!   However, note that the `libm` crate is not as efficient as the standard library.
//! - `mint`: Enable `From`/`Into` conversion of [`Point`] and [`Vec2`] with [mint][] types.
//! - `serde`: Implement `serde::Deserialize` and `serde::Serialize` on value types,
//!   constraints and [`Stroke`], so a finished skeleton can be saved and reloaded.
//! - `schemars`: Add best-effort support for using these types in JSON schemas using [schemars][].
//!
//! At least one of `std` and `libm` is required; `std` overrides `libm`.
//! Note that this crate does require that an allocator is available (i.e. it uses [alloc]).
//!
//! Progress is reported through the [log] facade; no logger is installed.
//!
//! [libm]: https://docs.rs/libm
//! [mint]: https://docs.rs/mint
//! [schemars]: https://docs.rs/schemars
//! [log]: https://docs.rs/log

// LINEBENDER LINT SET - lib.rs - v1
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]
#![allow(
    clippy::unreadable_literal,
    clippy::many_single_char_names,
    clippy::excessive_precision
)]
// The following lints are part of the Linebender standard set,
// but resolving them has been deferred for now.
#![allow(
    missing_debug_implementations,
    variant_size_differences,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::missing_assert_message,
    clippy::exhaustive_enums,
    clippy::use_self,
    clippy::wildcard_imports,
    clippy::return_self_not_must_use,
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason
)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("stroke_skeleton requires either the `std` or `libm` feature");

// Suppress the unused_crate_dependencies lint when both std and libm are specified.
#[cfg(all(feature = "std", feature = "libm"))]
use libm as _;

extern crate alloc;

mod bezier;
pub mod common;
mod constraint;
mod error;
mod objective;
pub mod offset;
mod point;
mod stroke;
mod vec2;

pub use crate::bezier::*;
pub use crate::constraint::*;
pub use crate::error::*;
pub use crate::objective::*;
pub use crate::point::*;
pub use crate::stroke::*;
pub use crate::vec2::*;
