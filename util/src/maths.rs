//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::{Float, FloatConst};

/// Wrap an angle in radians into the range (-pi, pi].
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float + FloatConst,
{
    wrap_half_turn(angle, T::PI())
}

/// Wrap an angle in degrees into the range (-180, 180].
pub fn wrap_180<T>(angle: T) -> T
where
    T: Float + From<u8>,
{
    wrap_half_turn(angle, <T as From<u8>>::from(180))
}

/// Get the signed shortest angular distance from `b` to `a` in radians, in the range (-pi, pi].
///
/// Positive values mean `a` is counter-clockwise of `b` (in a right-handed frame).
pub fn ang_diff<T>(a: T, b: T) -> T
where
    T: Float + FloatConst,
{
    wrap_pi(a - b)
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap into (-half, half] where `half` is half a full turn in the angle's units.
fn wrap_half_turn<T>(angle: T, half: T) -> T
where
    T: Float,
{
    let full = half + half;
    let r = rem_euclid(angle + half, full) - half;

    // rem_euclid gives [-half, half), flip the lower bound over to keep +half
    if r <= -half {
        half
    } else {
        r
    }
}
