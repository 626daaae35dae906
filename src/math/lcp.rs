use bevy::prelude::*;

use super::{is_finite, MatN, VecN};

/// Solves `a * x = b` with `a.dim()` Gauss-Seidel sweeps starting from zero.
///
/// Updates that are not finite, e.g. from a zero diagonal, are skipped so the
/// affected entry simply keeps its previous value.
pub fn lcp_gauss_seidel(a: &MatN, b: &VecN) -> VecN {
    GaussSeidel::default().solve(a, b)
}

/// Tuning knobs for the Gauss-Seidel relaxation.
///
/// The default runs exactly one sweep per unknown with no early exit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GaussSeidel {
    /// Number of sweeps, `None` uses the system size.
    pub sweeps: Option<usize>,
    /// Stop once no update in a sweep is larger than this.
    pub tolerance: Option<f32>,
}

impl GaussSeidel {
    pub fn solve(&self, a: &MatN, b: &VecN) -> VecN {
        let n = b.len();
        debug_assert_eq!(a.dim(), n);

        let sweeps = self.sweeps.unwrap_or(n);
        let mut x = VecN::new(n);
        for sweep in 0..sweeps {
            let mut largest = 0.0_f32;
            for i in 0..n {
                let dx = (b[i] - a.row(i).dot(&x)) / a[i][i];
                if is_finite(dx) {
                    x[i] += dx;
                    largest = largest.max(dx.abs());
                } else {
                    trace!("skipping non finite update for row {i} in sweep {sweep}");
                }
            }
            if let Some(tolerance) = self.tolerance {
                if largest <= tolerance {
                    break;
                }
            }
        }
        x
    }
}
