//! Tolerance-based equality for scalars, vectors and matrices.
//!
//! All comparisons defer to [`NumericPolicy::approx_equal`]; complex numbers
//! compare their real and imaginary parts independently.

use crate::float::NumericFieldError;
use crate::policy::NumericPolicy;

/// A complex number with binary64 parts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

impl Complex {
    /// Builds `re + im·i`.
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

/// A real or complex scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// Real number.
    Real(f64),
    /// Complex number.
    Complex(Complex),
}

impl Scalar {
    fn parts(self) -> (f64, f64) {
        match self {
            Scalar::Real(x) => (x, 0.0),
            Scalar::Complex(z) => (z.re, z.im),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Real(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Real(value as f64)
    }
}

impl From<Complex> for Scalar {
    fn from(value: Complex) -> Self {
        Scalar::Complex(value)
    }
}

/// Approximate equality of two scalars.
///
/// When either side is complex, a real operand is treated as having a zero
/// imaginary part and both parts must match.
pub fn approx_equal_number(
    a: impl Into<Scalar>,
    b: impl Into<Scalar>,
    policy: &NumericPolicy,
) -> Result<bool, NumericFieldError> {
    match (a.into(), b.into()) {
        (Scalar::Real(x), Scalar::Real(y)) => policy.approx_equal(x, y),
        (a, b) => {
            let (ar, ai) = a.parts();
            let (br, bi) = b.parts();
            Ok(policy.approx_equal(ar, br)? && policy.approx_equal(ai, bi)?)
        }
    }
}

/// Element-wise approximate equality; vectors of different length are unequal.
pub fn approx_equal_vectors<T>(u: &[T], v: &[T], policy: &NumericPolicy) -> Result<bool, NumericFieldError>
where
    T: Copy + Into<Scalar>,
{
    if u.len() != v.len() {
        return Ok(false);
    }
    for (x, y) in u.iter().zip(v) {
        if !approx_equal_number(*x, *y, policy)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Element-wise approximate equality; any shape mismatch makes the matrices unequal.
pub fn approx_equal_matrices<T>(
    a: &[Vec<T>],
    b: &[Vec<T>],
    policy: &NumericPolicy,
) -> Result<bool, NumericFieldError>
where
    T: Copy + Into<Scalar>,
{
    if a.len() != b.len() {
        return Ok(false);
    }
    for (row_a, row_b) in a.iter().zip(b) {
        if !approx_equal_vectors(row_a, row_b, policy)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Largest element-wise `|a - b|` (modulus for complex entries).
///
/// Rows and columns are paired up to the shorter length. Empty input, and
/// differences that are NaN, contribute nothing, so the result is at least `0.0`.
pub fn max_abs_diff<T>(a: &[Vec<T>], b: &[Vec<T>]) -> f64
where
    T: Copy + Into<Scalar>,
{
    let mut maximum = 0.0;
    for (row_a, row_b) in a.iter().zip(b) {
        for (x, y) in row_a.iter().zip(row_b) {
            let (xr, xi) = Into::<Scalar>::into(*x).parts();
            let (yr, yi) = Into::<Scalar>::into(*y).parts();
            let diff = (xr - yr).hypot(xi - yi);
            if diff > maximum {
                maximum = diff;
            }
        }
    }
    maximum
}
