use core::ops::{Add, AddAssign, Deref, DerefMut, Mul, MulAssign, Neg, Sub, SubAssign};

use bevy::prelude::Vec3;

use super::dot;

/// Heap backed vector whose length is fixed when it is created.
///
/// Cloning duplicates the buffer, two `VecN` values never share storage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VecN(Vec<f32>);

impl VecN {
    /// Zero vector of length `n`.
    #[inline]
    pub fn new(n: usize) -> Self {
        Self(vec![0.0; n])
    }

    #[inline]
    pub fn from_vec3(v: Vec3) -> Self {
        Self(v.to_array().to_vec())
    }

    #[inline]
    pub fn fill(&mut self, value: f32) {
        self.0.fill(value);
    }

    /// Dot product, zero when the lengths differ.
    #[inline]
    pub fn dot(&self, rhs: &Self) -> f32 {
        dot(&self.0, &rhs.0)
    }

    /// Reads three consecutive components starting at `offset`.
    #[inline]
    pub fn vec3_at(&self, offset: usize) -> Vec3 {
        Vec3::from_slice(&self.0[offset..offset + 3])
    }

    /// Writes `v` into three consecutive components starting at `offset`.
    #[inline]
    pub fn set_vec3_at(&mut self, offset: usize, v: Vec3) {
        self.0[offset..offset + 3].copy_from_slice(&v.to_array());
    }
}

impl Deref for VecN {
    type Target = [f32];
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// only element access, the length stays fixed
impl DerefMut for VecN {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<f32>> for VecN {
    #[inline]
    fn from(v: Vec<f32>) -> Self {
        Self(v)
    }
}

impl<const N: usize> From<[f32; N]> for VecN {
    #[inline]
    fn from(a: [f32; N]) -> Self {
        Self(a.to_vec())
    }
}

impl MulAssign<f32> for VecN {
    #[inline]
    fn mul_assign(&mut self, rhs: f32) {
        for x in self.0.iter_mut() {
            *x *= rhs;
        }
    }
}

impl Mul<f32> for &VecN {
    type Output = VecN;
    #[inline]
    fn mul(self, rhs: f32) -> VecN {
        let mut tmp = self.clone();
        tmp *= rhs;
        tmp
    }
}

impl Mul<f32> for VecN {
    type Output = VecN;
    #[inline]
    fn mul(mut self, rhs: f32) -> VecN {
        self *= rhs;
        self
    }
}

impl Neg for VecN {
    type Output = VecN;
    #[inline]
    fn neg(self) -> VecN {
        self * -1.0
    }
}

impl AddAssign<&VecN> for VecN {
    #[inline]
    fn add_assign(&mut self, rhs: &VecN) {
        for (lhs, &rhs) in self.0.iter_mut().zip(rhs.0.iter()) {
            *lhs += rhs;
        }
    }
}

impl AddAssign<VecN> for VecN {
    #[inline]
    fn add_assign(&mut self, rhs: VecN) {
        *self += &rhs;
    }
}

impl SubAssign<&VecN> for VecN {
    #[inline]
    fn sub_assign(&mut self, rhs: &VecN) {
        for (lhs, &rhs) in self.0.iter_mut().zip(rhs.0.iter()) {
            *lhs -= rhs;
        }
    }
}

impl SubAssign<VecN> for VecN {
    #[inline]
    fn sub_assign(&mut self, rhs: VecN) {
        *self -= &rhs;
    }
}

impl Add<&VecN> for &VecN {
    type Output = VecN;
    #[inline]
    fn add(self, rhs: &VecN) -> VecN {
        let mut tmp = self.clone();
        tmp += rhs;
        tmp
    }
}

impl Add<VecN> for VecN {
    type Output = VecN;
    #[inline]
    fn add(mut self, rhs: VecN) -> VecN {
        self += &rhs;
        self
    }
}

impl Sub<&VecN> for &VecN {
    type Output = VecN;
    #[inline]
    fn sub(self, rhs: &VecN) -> VecN {
        let mut tmp = self.clone();
        tmp -= rhs;
        tmp
    }
}

impl Sub<VecN> for VecN {
    type Output = VecN;
    #[inline]
    fn sub(mut self, rhs: VecN) -> VecN {
        self -= &rhs;
        self
    }
}
