use core::ops::{Index, IndexMut, Mul, MulAssign};

use bevy::prelude::Vec3;

use super::{DimensionError, VecN};

/// Rectangular `rows x cols` matrix stored as row vectors.
///
/// `m[i]` is row `i` as a slice, entries can be written but a row can't be
/// swapped for one of another length:
///
/// ```compile_fail
/// use sly_constraints::math::{MatMN, VecN};
///
/// let mut m = MatMN::new(2, 3);
/// m[0] = VecN::new(5);
/// ```
///
/// Multiplying matrices with incompatible inner dimensions yields an empty
/// (zero sized) matrix instead of panicking, check [`MatMN::is_empty`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatMN {
    rows: Vec<VecN>,
    cols: usize,
}

impl MatMN {
    /// Zero matrix with `m` rows and `n` columns.
    pub fn new(m: usize, n: usize) -> Self {
        Self {
            rows: vec![VecN::new(n); m],
            cols: n,
        }
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn num_cols(&self) -> usize {
        self.cols
    }

    /// `true` when either dimension is zero, which is how a dimension
    /// mismatch in a product is reported.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols == 0
    }

    pub fn fill(&mut self, value: f32) {
        for row in self.rows.iter_mut() {
            row.fill(value);
        }
    }

    #[inline]
    pub fn row(&self, m: usize) -> &VecN {
        &self.rows[m]
    }

    /// Writes `v` into row `m` starting at column `offset`.
    #[inline]
    pub fn set_vec3_at(&mut self, m: usize, offset: usize, v: Vec3) {
        self.rows[m].set_vec3_at(offset, v);
    }

    pub fn transpose(&self) -> MatMN {
        let mut mat = MatMN::new(self.cols, self.num_rows());
        for (m, row) in self.rows.iter().enumerate() {
            for (n, &value) in row.iter().enumerate() {
                mat.rows[n][m] = value;
            }
        }
        mat
    }
}

impl<const M: usize, const N: usize> From<&[[f32; N]; M]> for MatMN {
    fn from(a: &[[f32; N]; M]) -> Self {
        Self {
            rows: a.iter().map(|&row| VecN::from(row)).collect(),
            cols: N,
        }
    }
}

impl From<MatN> for MatMN {
    #[inline]
    fn from(m: MatN) -> Self {
        let cols = m.dim();
        Self { rows: m.rows, cols }
    }
}

// rows come out as slices so their length can't be changed from outside
impl Index<usize> for MatMN {
    type Output = [f32];
    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.rows[index]
    }
}

impl IndexMut<usize> for MatMN {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.rows[index]
    }
}

impl MulAssign<f32> for MatMN {
    fn mul_assign(&mut self, rhs: f32) {
        for row in self.rows.iter_mut() {
            *row *= rhs;
        }
    }
}

impl Mul<f32> for &MatMN {
    type Output = MatMN;
    fn mul(self, rhs: f32) -> MatMN {
        let mut tmp = self.clone();
        tmp *= rhs;
        tmp
    }
}

impl Mul<f32> for MatMN {
    type Output = MatMN;
    fn mul(mut self, rhs: f32) -> MatMN {
        self *= rhs;
        self
    }
}

impl Mul<&VecN> for &MatMN {
    type Output = VecN;
    fn mul(self, rhs: &VecN) -> VecN {
        if self.cols != rhs.len() {
            return VecN::new(0);
        }
        let mut tmp = VecN::new(self.num_rows());
        for (m, row) in self.rows.iter().enumerate() {
            tmp[m] = row.dot(rhs);
        }
        tmp
    }
}

impl Mul<&MatMN> for &MatMN {
    type Output = MatMN;
    fn mul(self, rhs: &MatMN) -> MatMN {
        if self.cols != rhs.num_rows() {
            return MatMN::new(0, 0);
        }
        let rhs_transpose = rhs.transpose();

        let mut tmp = MatMN::new(self.num_rows(), rhs.cols);
        for (m, row) in self.rows.iter().enumerate() {
            for (n, col) in rhs_transpose.rows.iter().enumerate() {
                tmp.rows[m][n] = row.dot(col);
            }
        }
        tmp
    }
}

/// Square `n x n` matrix.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatN {
    rows: Vec<VecN>,
}

impl MatN {
    /// Zero matrix of size `n x n`.
    pub fn new(n: usize) -> Self {
        Self {
            rows: vec![VecN::new(n); n],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut mat = MatN::new(n);
        mat.set_identity();
        mat
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn row(&self, i: usize) -> &VecN {
        &self.rows[i]
    }

    pub fn set_identity(&mut self) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = if i == j { 1.0 } else { 0.0 };
            }
        }
    }

    pub fn fill(&mut self, value: f32) {
        for row in self.rows.iter_mut() {
            row.fill(value);
        }
    }

    /// Transposes in place.
    pub fn transpose(&mut self) {
        let n = self.dim();
        for i in 0..n {
            for j in (i + 1)..n {
                let tmp = self.rows[i][j];
                self.rows[i][j] = self.rows[j][i];
                self.rows[j][i] = tmp;
            }
        }
    }
}

impl TryFrom<MatMN> for MatN {
    type Error = DimensionError;

    fn try_from(m: MatMN) -> Result<Self, Self::Error> {
        if m.num_rows() != m.num_cols() {
            return Err(DimensionError::NotSquare {
                rows: m.num_rows(),
                cols: m.num_cols(),
            });
        }
        Ok(Self { rows: m.rows })
    }
}

impl Index<usize> for MatN {
    type Output = [f32];
    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.rows[index]
    }
}

impl IndexMut<usize> for MatN {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.rows[index]
    }
}

impl MulAssign<f32> for MatN {
    fn mul_assign(&mut self, rhs: f32) {
        for row in self.rows.iter_mut() {
            *row *= rhs;
        }
    }
}

impl Mul<&VecN> for &MatN {
    type Output = VecN;
    fn mul(self, rhs: &VecN) -> VecN {
        if self.dim() != rhs.len() {
            return VecN::new(0);
        }
        let mut tmp = VecN::new(self.dim());
        for (i, row) in self.rows.iter().enumerate() {
            tmp[i] = row.dot(rhs);
        }
        tmp
    }
}

impl Mul<&MatN> for &MatN {
    type Output = MatN;
    fn mul(self, rhs: &MatN) -> MatN {
        let n = self.dim();
        if n != rhs.dim() {
            return MatN::new(0);
        }
        let mut tmp = MatN::new(n);
        for i in 0..n {
            for j in 0..n {
                tmp.rows[i][j] = (0..n).map(|k| self.rows[i][k] * rhs.rows[k][j]).sum();
            }
        }
        tmp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmn_transpose() {
        let m0 = MatMN::from(&[[1., 2.], [3., 4.], [5., 6.]]);
        let m1 = m0.transpose();
        assert_eq!(m1, MatMN::from(&[[1., 3., 5.], [2., 4., 6.]]));
        assert_eq!(m1.transpose(), m0);
    }

    #[test]
    fn product_shape() {
        let a = MatMN::new(2, 3);
        let b = MatMN::new(3, 4);
        let c = &a * &b;
        assert_eq!((c.num_rows(), c.num_cols()), (2, 4));
        assert!(!c.is_empty());
    }

    #[test]
    fn product_values() {
        let a = MatMN::from(&[[1., 2., 3.], [4., 5., 6.]]);
        let b = MatMN::from(&[[7., 8.], [9., 10.], [11., 12.]]);
        assert_eq!(&a * &b, MatMN::from(&[[58., 64.], [139., 154.]]));
    }

    #[test]
    fn mismatched_product_is_empty() {
        let a = MatMN::new(2, 3);
        let b = MatMN::new(2, 3);
        let c = &a * &b;
        assert!(c.is_empty());
        assert_eq!(c.num_rows(), 0);

        let v = &a * &VecN::new(2);
        assert_eq!(v.len(), 0);
    }

    #[test]
    fn matrix_vector() {
        let a = MatMN::from(&[[1., 0., 2.], [0., 3., 0.]]);
        let v = VecN::from([1.0, 2.0, 3.0]);
        assert_eq!(&a * &v, VecN::from([7.0, 6.0]));
    }

    #[test]
    fn scalar_multiply() {
        let a = MatMN::from(&[[1., -2.], [0.5, 4.]]);
        assert_eq!(&a * 2.0, MatMN::from(&[[2., -4.], [1., 8.]]));
    }

    #[test]
    fn fill_sets_every_entry() {
        let mut a = MatMN::new(2, 2);
        a.fill(3.0);
        assert_eq!(a, MatMN::from(&[[3., 3.], [3., 3.]]));
    }

    #[test]
    fn square_transpose_in_place() {
        let mut m = MatN::try_from(MatMN::from(&[[1., 2.], [3., 4.]])).unwrap();
        m.transpose();
        assert_eq!(MatMN::from(m), MatMN::from(&[[1., 3.], [2., 4.]]));
    }

    #[test]
    fn identity_is_neutral() {
        let a = MatN::try_from(MatMN::from(&[[2., 1., 0.], [1., 3., 1.], [0., 1., 4.]])).unwrap();
        let i = MatN::identity(3);
        assert_eq!(&a * &i, a);
        assert_eq!(&i * &a, a);

        let v = VecN::from([1.0, -1.0, 2.0]);
        assert_eq!(&i * &v, v);
    }

    #[test]
    fn rows_are_written_in_place() {
        let mut m = MatMN::new(2, 3);
        m[0].fill(1.0);
        m[1][2] = 5.0;
        m.set_vec3_at(1, 0, Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(m, MatMN::from(&[[1., 1., 1.], [2., 3., 4.]]));
        assert_eq!(m.row(1).vec3_at(0), Vec3::new(2.0, 3.0, 4.0));

        let t = m.transpose();
        assert_eq!((t.num_rows(), t.num_cols()), (3, 2));
        assert_eq!(t[2][1], 4.0);
    }

    #[test]
    fn non_square_conversion_fails() {
        let err = MatN::try_from(MatMN::new(1, 12)).unwrap_err();
        assert_eq!(err, DimensionError::NotSquare { rows: 1, cols: 12 });
    }
}
