//! Equality and hashing for floats embedded in hashable IR values.
//!
//! Both helpers treat `+0.0` and `-0.0` as the same value and every NaN as
//! equal to every other NaN, so that `Eq` and `Hash` stay consistent.

use std::hash::{Hash, Hasher};

use num_complex::Complex64;

/// Hashes a f64 using its bit representation.
#[inline]
pub(crate) fn hash_f64<H: Hasher>(value: f64, state: &mut H) {
    if value == 0.0 {
        0.0f64.to_bits().hash(state);
    } else if value.is_nan() {
        f64::NAN.to_bits().hash(state);
    } else {
        value.to_bits().hash(state);
    }
}

/// Compares two f64 values, treating NaNs as equal.
#[inline]
pub(crate) fn eq_f64(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

#[inline]
pub(crate) fn hash_complex<H: Hasher>(value: Complex64, state: &mut H) {
    hash_f64(value.re, state);
    hash_f64(value.im, state);
}

#[inline]
pub(crate) fn eq_complex(a: Complex64, b: Complex64) -> bool {
    eq_f64(a.re, b.re) && eq_f64(a.im, b.im)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHasher;

    fn hash_of(value: f64) -> u64 {
        let mut hasher = FxHasher::default();
        hash_f64(value, &mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_signed_zero() {
        assert!(eq_f64(0.0, -0.0));
        assert_eq!(hash_of(0.0), hash_of(-0.0));
    }

    #[test]
    fn test_nan() {
        assert!(eq_f64(f64::NAN, f64::NAN));
        assert_eq!(hash_of(f64::NAN), hash_of(-f64::NAN));
        assert!(!eq_f64(f64::NAN, 1.0));
    }
}
