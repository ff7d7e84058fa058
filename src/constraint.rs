// Copyright 2025 the Kurbo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Constraints that derive stroke points from free parameters and other points.
//!
//! Every constraint *determines* zero or more point indices, *reads* zero or
//! more others, and owns zero, one or two free parameters. Updating the
//! model is a pure function of those parameters and the points read; no
//! constraint holds state beyond its parameters.

use core::f64::consts::TAU;

use arrayvec::ArrayVec;
use smallvec::{smallvec, SmallVec};

use crate::{Point, StrokeError, Vec2};

/// Most free parameters a single constraint owns.
pub const MAX_FREE_VARIABLES: usize = 2;

/// Handle length a [`Direction`] or [`Angle`] starts from.
pub const DEFAULT_HANDLE_LENGTH: f64 = 0.2;

/// Bounds on the handle length of a [`Direction`] or [`Angle`].
pub const HANDLE_LENGTH_LIMITS: VariableLimits = VariableLimits::new(Some(0.0), Some(10.0));

/// Point indices a constraint determines or reads.
pub type PointIndices = SmallVec<[usize; 4]>;

/// The free parameters of one constraint.
pub type FreeVariables = ArrayVec<f64, MAX_FREE_VARIABLES>;

/// The bounds of the free parameters of one constraint.
pub type Limits = ArrayVec<VariableLimits, MAX_FREE_VARIABLES>;

/// Box bounds on a single free variable; `None` means unbounded on that side.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableLimits {
    /// Lower bound.
    pub min: Option<f64>,
    /// Upper bound.
    pub max: Option<f64>,
}

impl VariableLimits {
    /// No bound on either side.
    pub const UNBOUNDED: VariableLimits = VariableLimits::new(None, None);

    /// Create limits from optional ends.
    #[inline]
    pub const fn new(min: Option<f64>, max: Option<f64>) -> VariableLimits {
        VariableLimits { min, max }
    }

    /// Whether `value` satisfies both bounds.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }

    /// Move `value` onto the nearest point inside the bounds.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        let value = self.min.map_or(value, |min| value.max(min));
        self.max.map_or(value, |max| value.min(max))
    }

    /// How far `value` lies outside the bounds; zero inside.
    #[inline]
    pub fn violation(&self, value: f64) -> f64 {
        let below = self.min.map_or(0.0, |min| (min - value).max(0.0));
        let above = self.max.map_or(0.0, |max| (value - max).max(0.0));
        below + above
    }
}

/// Pins one or more points to constant coordinates.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fixed {
    pins: SmallVec<[(usize, Point); 1]>,
}

impl Fixed {
    /// Pin point `index` to `value`.
    pub fn new(index: usize, value: impl Into<Point>) -> Fixed {
        Fixed {
            pins: smallvec![(index, value.into())],
        }
    }

    /// Pin several points at once.
    pub fn many(pins: impl IntoIterator<Item = (usize, Point)>) -> Fixed {
        Fixed {
            pins: pins.into_iter().collect(),
        }
    }

    /// The pinned `(index, value)` pairs.
    pub fn pins(&self) -> &[(usize, Point)] {
        &self.pins
    }
}

/// A point placed directly by two free variables, its coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Free {
    index: usize,
    value: Point,
}

impl Free {
    /// A free point seeded at `value`.
    pub fn new(index: usize, value: impl Into<Point>) -> Free {
        Free {
            index,
            value: value.into(),
        }
    }

    /// The index of the point.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The current coordinates.
    pub fn value(&self) -> Point {
        self.value
    }
}

/// Reflects one point through another: `point = 2·mirror − from`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mirror {
    index: usize,
    from: usize,
    mirror: usize,
}

impl Mirror {
    /// Determine `index` as the reflection of `from` through `mirror`.
    pub fn new(index: usize, from: usize, mirror: usize) -> Mirror {
        Mirror {
            index,
            from,
            mirror,
        }
    }
}

/// Places a point at a free distance from another along a fixed angle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Direction {
    from: usize,
    to: usize,
    angle: f64,
    distance: f64,
}

impl Direction {
    /// Determine `to` as `from + distance · (cos angle, sin angle)`.
    ///
    /// The angle must lie in `[0, 2π]`. The distance is the free variable;
    /// it starts at [`DEFAULT_HANDLE_LENGTH`] and is bounded by
    /// [`HANDLE_LENGTH_LIMITS`].
    pub fn new(from: usize, to: usize, angle: f64) -> Result<Direction, StrokeError> {
        if !(0.0..=TAU).contains(&angle) {
            return Err(StrokeError::AngleOutOfRange { angle });
        }
        Ok(Direction {
            from,
            to,
            angle,
            distance: DEFAULT_HANDLE_LENGTH,
        })
    }

    /// Start from a different distance.
    #[must_use]
    pub fn with_distance(mut self, distance: f64) -> Direction {
        self.distance = distance;
        self
    }

    /// The fixed angle, in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// The current distance.
    pub fn distance(&self) -> f64 {
        self.distance
    }
}

/// Places a junction handle at a free angle within a range and a free
/// distance from its anchor.
///
/// The range is what the glyph designer specifies for the junction; the
/// handle on the other side is usually tied to this one with a [`Mirror`]
/// or [`Smooth`] constraint.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Angle {
    index: usize,
    from: usize,
    min_angle: f64,
    max_angle: f64,
    angle: f64,
    distance: f64,
}

impl Angle {
    /// Determine `index` from `from` with an angle in `[min_angle, max_angle]`.
    ///
    /// The angle starts in the middle of the range, the distance at
    /// [`DEFAULT_HANDLE_LENGTH`].
    pub fn new(
        index: usize,
        from: usize,
        min_angle: f64,
        max_angle: f64,
    ) -> Result<Angle, StrokeError> {
        if min_angle.is_nan() || max_angle.is_nan() || min_angle > max_angle {
            return Err(StrokeError::InvalidRange {
                min: min_angle,
                max: max_angle,
            });
        }
        Ok(Angle {
            index,
            from,
            min_angle,
            max_angle,
            angle: 0.5 * (min_angle + max_angle),
            distance: DEFAULT_HANDLE_LENGTH,
        })
    }

    /// The admissible angle range.
    pub fn range(&self) -> (f64, f64) {
        (self.min_angle, self.max_angle)
    }

    /// The current angle.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// The current distance.
    pub fn distance(&self) -> f64 {
        self.distance
    }
}

/// Repeats the offset between a reference pair: `point = base + (reference − reference_base)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SameOffset {
    index: usize,
    base: usize,
    reference: usize,
    reference_base: usize,
}

impl SameOffset {
    /// Determine `index` so that `index − base` equals `reference − reference_base`.
    pub fn new(index: usize, base: usize, reference: usize, reference_base: usize) -> SameOffset {
        SameOffset {
            index,
            base,
            reference,
            reference_base,
        }
    }
}

/// Keeps the tangent continuous across a junction.
///
/// `point = junction + ratio · (junction − other)`, where `other` is the
/// handle on the far side of the junction. A ratio of 1, the default,
/// gives C1 continuity; other positive ratios give G1.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Smooth {
    index: usize,
    other: usize,
    junction: usize,
    ratio: f64,
}

impl Smooth {
    /// Determine handle `index` from the opposite handle `other` around `junction`.
    pub fn new(index: usize, other: usize, junction: usize) -> Smooth {
        Smooth {
            index,
            other,
            junction,
            ratio: 1.0,
        }
    }

    /// Scale the determined handle relative to the opposite one.
    #[must_use]
    pub fn with_ratio(mut self, ratio: f64) -> Smooth {
        self.ratio = ratio;
        self
    }
}

/// Any constraint a [`Stroke`](crate::Stroke) can hold.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Constraint {
    /// See [`Fixed`].
    Fixed(Fixed),
    /// See [`Free`].
    Free(Free),
    /// See [`Mirror`].
    Mirror(Mirror),
    /// See [`Direction`].
    Direction(Direction),
    /// See [`Angle`].
    Angle(Angle),
    /// See [`SameOffset`].
    SameOffset(SameOffset),
    /// See [`Smooth`].
    Smooth(Smooth),
}

impl Constraint {
    /// A short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Constraint::Fixed(_) => "fixed",
            Constraint::Free(_) => "free",
            Constraint::Mirror(_) => "mirror",
            Constraint::Direction(_) => "direction",
            Constraint::Angle(_) => "angle",
            Constraint::SameOffset(_) => "same offset",
            Constraint::Smooth(_) => "smooth",
        }
    }

    /// Number of free parameters.
    pub fn num_free_variables(&self) -> usize {
        match self {
            Constraint::Free(_) | Constraint::Angle(_) => 2,
            Constraint::Direction(_) => 1,
            _ => 0,
        }
    }

    /// Current values of the free parameters.
    pub fn free_variables(&self) -> FreeVariables {
        let mut vars = FreeVariables::new();
        match self {
            Constraint::Free(c) => {
                vars.push(c.value.x);
                vars.push(c.value.y);
            }
            Constraint::Direction(c) => vars.push(c.distance),
            Constraint::Angle(c) => {
                vars.push(c.angle);
                vars.push(c.distance);
            }
            _ => (),
        }
        vars
    }

    /// Take this constraint's parameters from the front of `values`.
    ///
    /// Returns how many values were consumed.
    ///
    /// # Panics
    ///
    /// Panics if `values` is shorter than [`Constraint::num_free_variables`].
    pub fn set_free_variables(&mut self, values: &[f64]) -> usize {
        match self {
            Constraint::Free(c) => c.value = Point::new(values[0], values[1]),
            Constraint::Direction(c) => c.distance = values[0],
            Constraint::Angle(c) => {
                c.angle = values[0];
                c.distance = values[1];
            }
            _ => (),
        }
        self.num_free_variables()
    }

    /// Bounds of the free parameters, in the order of [`Constraint::free_variables`].
    pub fn limits(&self) -> Limits {
        let mut limits = Limits::new();
        match self {
            Constraint::Free(_) => {
                limits.push(VariableLimits::UNBOUNDED);
                limits.push(VariableLimits::UNBOUNDED);
            }
            Constraint::Direction(_) => limits.push(HANDLE_LENGTH_LIMITS),
            Constraint::Angle(c) => {
                limits.push(VariableLimits::new(Some(c.min_angle), Some(c.max_angle)));
                limits.push(HANDLE_LENGTH_LIMITS);
            }
            _ => (),
        }
        limits
    }

    /// Point indices this constraint writes.
    pub fn determines(&self) -> PointIndices {
        match self {
            Constraint::Fixed(c) => c.pins.iter().map(|(index, _)| *index).collect(),
            Constraint::Free(c) => smallvec![c.index],
            Constraint::Mirror(c) => smallvec![c.index],
            Constraint::Direction(c) => smallvec![c.to],
            Constraint::Angle(c) => smallvec![c.index],
            Constraint::SameOffset(c) => smallvec![c.index],
            Constraint::Smooth(c) => smallvec![c.index],
        }
    }

    /// Point indices this constraint reads.
    pub fn reads(&self) -> PointIndices {
        match self {
            Constraint::Fixed(_) | Constraint::Free(_) => PointIndices::new(),
            Constraint::Mirror(c) => smallvec![c.from, c.mirror],
            Constraint::Direction(c) => smallvec![c.from],
            Constraint::Angle(c) => smallvec![c.from],
            Constraint::SameOffset(c) => smallvec![c.base, c.reference, c.reference_base],
            Constraint::Smooth(c) => smallvec![c.other, c.junction],
        }
    }

    /// Write the determined points.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of range for `points`. A
    /// [`Stroke`](crate::Stroke) checks indices when the constraint is added.
    pub fn update_model(&self, points: &mut [Point]) {
        match self {
            Constraint::Fixed(c) => {
                for (index, value) in &c.pins {
                    points[*index] = *value;
                }
            }
            Constraint::Free(c) => points[c.index] = c.value,
            Constraint::Mirror(c) => points[c.index] = points[c.mirror].reflect(points[c.from]),
            Constraint::Direction(c) => {
                points[c.to] = points[c.from] + Vec2::from_angle(c.angle) * c.distance;
            }
            Constraint::Angle(c) => {
                points[c.index] = points[c.from] + Vec2::from_angle(c.angle) * c.distance;
            }
            Constraint::SameOffset(c) => {
                points[c.index] = points[c.base] + (points[c.reference] - points[c.reference_base]);
            }
            Constraint::Smooth(c) => {
                let junction = points[c.junction];
                points[c.index] = junction + (junction - points[c.other]) * c.ratio;
            }
        }
    }

    /// Residual against the current points.
    ///
    /// Only [`Fixed`] has one: the summed distance of each pinned point
    /// from its target. Everything else is satisfied by construction.
    pub fn calculate_error(&self, points: &[Point]) -> f64 {
        match self {
            Constraint::Fixed(c) => c
                .pins
                .iter()
                .map(|(index, value)| value.distance(points[*index]))
                .sum(),
            _ => 0.0,
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),+) => {
        $(impl From<$variant> for Constraint {
            #[inline]
            fn from(c: $variant) -> Constraint {
                Constraint::$variant(c)
            }
        })+
    };
}

impl_from_variant!(Fixed, Free, Mirror, Direction, Angle, SameOffset, Smooth);
