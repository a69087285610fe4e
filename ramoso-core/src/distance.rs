//! Algebraic contract for distance values.
//!
//! The traversal and the accumulator never assume a floating-point distance.
//! Any type that is totally ordered, has a zero, and supports bound
//! composition (`plus`) and non-negative differences (`minus`) can drive a
//! query: integer costs, floats, or composite distances alike.

use core::cmp::Ordering;
use core::fmt;

/// Distance type consumed by the metric-tree query engine.
///
/// Implementations must satisfy:
///
/// - `compare` is a total order consistent with `plus` (adding a non-negative
///   value never moves a distance down the order).
/// - `identity` is the least valid distance and the neutral element of `plus`.
/// - `minus` is only called with `self >= other` and yields a valid distance.
///
/// # Examples
/// ```
/// use ramoso_core::DistanceValue;
///
/// let a = 7_u32;
/// let b = 3_u32;
/// assert_eq!(a.magnitude_diff(&b), 4);
/// assert_eq!(b.magnitude_diff(&a), 4);
/// assert_eq!(a.max_with(&b), 7);
/// assert_eq!(u32::identity(), 0);
/// ```
pub trait DistanceValue: Clone + fmt::Debug {
    /// The zero distance ("no distance yet").
    fn identity() -> Self;

    /// Totally orders two distances.
    fn compare(&self, other: &Self) -> Ordering;

    /// Composes two bounds.
    #[must_use]
    fn plus(&self, other: &Self) -> Self;

    /// Subtracts `other` from `self`; callers guarantee `self >= other`.
    #[must_use]
    fn minus(&self, other: &Self) -> Self;

    /// Reports whether the value can take part in ordering and arithmetic.
    ///
    /// The engine rejects invalid distances instead of letting them corrupt
    /// the candidate queue. Floating-point implementations reject NaN and
    /// negative values.
    fn is_valid(&self) -> bool {
        true
    }

    /// Returns `|self - other|` using only `compare` and `minus`.
    #[must_use]
    fn magnitude_diff(&self, other: &Self) -> Self {
        if self.compare(other) == Ordering::Greater {
            self.minus(other)
        } else {
            other.minus(self)
        }
    }

    /// Returns the larger of two distances, preferring `self` on ties.
    #[must_use]
    fn max_with(&self, other: &Self) -> Self {
        if other.compare(self) == Ordering::Greater {
            other.clone()
        } else {
            self.clone()
        }
    }

    /// Returns `self - other` clamped at [`DistanceValue::identity`].
    #[must_use]
    fn saturating_minus(&self, other: &Self) -> Self {
        if self.compare(other) == Ordering::Greater {
            self.minus(other).max_with(&Self::identity())
        } else {
            Self::identity()
        }
    }

    /// Returns `true` when `self` is strictly greater than `other`.
    fn exceeds(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Greater
    }
}

macro_rules! impl_float_distance {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl DistanceValue for $ty {
                #[rustfmt::skip]
                fn identity() -> Self { 0.0 }

                fn compare(&self, other: &Self) -> Ordering {
                    self.total_cmp(other)
                }

                #[rustfmt::skip]
                fn plus(&self, other: &Self) -> Self { self + other }

                #[rustfmt::skip]
                fn minus(&self, other: &Self) -> Self { self - other }

                fn is_valid(&self) -> bool {
                    !self.is_nan() && *self >= 0.0
                }
            }
        )+
    };
}

macro_rules! impl_unsigned_distance {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl DistanceValue for $ty {
                #[rustfmt::skip]
                fn identity() -> Self { 0 }

                fn compare(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }

                // Saturate so a wide threshold plus a wide radius never wraps
                // around into a tighter bound.
                #[rustfmt::skip]
                fn plus(&self, other: &Self) -> Self { self.saturating_add(*other) }

                #[rustfmt::skip]
                fn minus(&self, other: &Self) -> Self { self.saturating_sub(*other) }
            }
        )+
    };
}

macro_rules! impl_signed_distance {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl DistanceValue for $ty {
                #[rustfmt::skip]
                fn identity() -> Self { 0 }

                fn compare(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }

                #[rustfmt::skip]
                fn plus(&self, other: &Self) -> Self { self.saturating_add(*other) }

                #[rustfmt::skip]
                fn minus(&self, other: &Self) -> Self { self.saturating_sub(*other) }

                fn is_valid(&self) -> bool {
                    *self >= 0
                }
            }
        )+
    };
}

impl_float_distance!(f32, f64);
impl_unsigned_distance!(u8, u16, u32, u64, usize);
impl_signed_distance!(i32, i64);

/// Pruning bound maintained by a [`crate::KnnHeap`].
///
/// `Unbounded` stands for "+infinity": it is reported until `k` results have
/// been admitted and never prunes anything.
///
/// # Examples
/// ```
/// use ramoso_core::Threshold;
///
/// let open = Threshold::<f64>::Unbounded;
/// assert!(open.admits(&1e300));
///
/// let bound = Threshold::Bounded(2.0_f64);
/// assert!(bound.admits(&2.0));
/// assert!(!bound.admits(&2.5));
/// assert!(bound.admits_within(&2.5, &1.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Threshold<D> {
    /// Fewer than `k` results seen so far.
    Unbounded,
    /// Worst distance currently accepted.
    Bounded(D),
}

impl<D: DistanceValue> Threshold<D> {
    /// Returns `true` when a result at `distance` may still enter the answer.
    ///
    /// Ties with the bound are admitted.
    pub fn admits(&self, distance: &D) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Bounded(bound) => !distance.exceeds(bound),
        }
    }

    /// Returns `true` unless `lower_bound > threshold + slack`.
    ///
    /// Used by the parent-distance shortcut, where `slack` is the covering
    /// radius of the entry under inspection.
    pub fn admits_within(&self, lower_bound: &D, slack: &D) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Bounded(bound) => !lower_bound.exceeds(&bound.plus(slack)),
        }
    }

    /// Returns the bound, or `None` while unbounded.
    pub fn as_bound(&self) -> Option<&D> {
        match self {
            Self::Unbounded => None,
            Self::Bounded(bound) => Some(bound),
        }
    }

    /// Returns `true` while fewer than `k` results have been admitted.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}
