mod lcp;
mod matrix;
mod vector;

pub use lcp::{lcp_gauss_seidel, GaussSeidel};
pub use matrix::{MatMN, MatN};
pub use vector::VecN;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionError {
    #[error("expected a square matrix, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
}

/// Dot product of two slices, zero when their lengths differ.
pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter()
        .zip(b.iter())
        .fold(0.0, |dot, (&lhs, &rhs)| dot + lhs * rhs)
}

/// `false` for NaN and both infinities.
#[inline]
pub fn is_finite(x: f32) -> bool {
    x.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_check() {
        assert!(is_finite(0.0));
        assert!(is_finite(-1.0e30));
        assert!(!is_finite(f32::NAN));
        assert!(!is_finite(f32::INFINITY));
        assert!(!is_finite(f32::NEG_INFINITY));
        assert!(!is_finite(1.0 / 0.0));
    }
}
