//! Fixed-size complex matrix kernels for SU(3) and SU(2).
//!
//! Link variables are 3×3 complex matrices; the heatbath kernel works in
//! embedded SU(2) subgroups, which are represented as real quaternions
//! `a₀·I + i(a₁σ₁ + a₂σ₂ + a₃σ₃)` instead of complex 2×2 matrices. Shapes
//! are fixed at compile time and all products are explicit loops without
//! dynamic dispatch or hidden shape checks.

use std::ops::{Add, Index, IndexMut, Mul, Sub};

use num_complex::Complex64;
use num_traits::{One, Zero};
use rand::Rng;
use rand_distr::StandardNormal;

/// Dense 3×3 complex matrix, row major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3(pub(crate) [[Complex64; 3]; 3]);

impl Matrix3 {
    pub fn zero() -> Self {
        Matrix3([[Complex64::zero(); 3]; 3])
    }

    pub fn identity() -> Self {
        let mut m = Self::zero();
        for i in 0..3 {
            m.0[i][i] = Complex64::one();
        }
        m
    }

    /// Diagonal matrix c·I.
    pub fn diagonal(c: Complex64) -> Self {
        let mut m = Self::zero();
        for i in 0..3 {
            m.0[i][i] = c;
        }
        m
    }

    /// Conjugate transpose U†.
    pub fn adjoint(&self) -> Self {
        let mut out = Self::zero();
        for i in 0..3 {
            for j in 0..3 {
                out.0[i][j] = self.0[j][i].conj();
            }
        }
        out
    }

    pub fn trace(&self) -> Complex64 {
        self.0[0][0] + self.0[1][1] + self.0[2][2]
    }

    /// Re Tr(U), the quantity entering the Wilson action.
    pub fn re_trace(&self) -> f64 {
        self.trace().re
    }

    /// Determinant by cofactor expansion along the first row.
    pub fn determinant(&self) -> Complex64 {
        let m = &self.0;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Scale every entry by a real factor.
    pub fn scale(&self, factor: f64) -> Self {
        let mut out = *self;
        for row in out.0.iter_mut() {
            for entry in row.iter_mut() {
                *entry *= factor;
            }
        }
        out
    }

    /// Frobenius norm of U†U − I. Zero for an exactly unitary matrix.
    pub fn unitarity_deviation(&self) -> f64 {
        let gram = self.adjoint() * *self;
        let mut sum = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                let target = if i == j {
                    Complex64::one()
                } else {
                    Complex64::zero()
                };
                sum += (gram.0[i][j] - target).norm_sqr();
            }
        }
        sum.sqrt()
    }

    /// Largest entry-wise absolute difference to another matrix.
    pub fn max_abs_diff(&self, other: &Matrix3) -> f64 {
        let mut max = 0.0_f64;
        for i in 0..3 {
            for j in 0..3 {
                max = max.max((self.0[i][j] - other.0[i][j]).norm());
            }
        }
        max
    }

    /// Nearest SU(3) matrix by row Gram–Schmidt plus a determinant phase fix.
    ///
    /// Restores the group-manifold invariant after accumulated floating-point
    /// drift. Deterministic; never applied implicitly by the update path.
    pub fn reunitarized(&self) -> Self {
        let mut rows = self.0;
        for i in 0..3 {
            for k in 0..i {
                let proj = inner(&rows[k], &rows[i]);
                for j in 0..3 {
                    let sub = proj * rows[k][j];
                    rows[i][j] -= sub;
                }
            }
            let norm = inner(&rows[i], &rows[i]).re.sqrt();
            for j in 0..3 {
                rows[i][j] /= norm;
            }
        }
        let mut out = Matrix3(rows);
        // |det| = 1 after orthonormalization; rotate one row to make det = 1
        let det = out.determinant();
        for j in 0..3 {
            out.0[0][j] *= det.conj();
        }
        out
    }

    /// Haar-distributed SU(3) matrix: complex Gaussian entries orthonormalized
    /// by Gram–Schmidt, determinant phase absorbed into the first row.
    pub fn haar_random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut m = Self::zero();
        for i in 0..3 {
            for j in 0..3 {
                let re: f64 = rng.sample(StandardNormal);
                let im: f64 = rng.sample(StandardNormal);
                m.0[i][j] = Complex64::new(re, im);
            }
        }
        m.reunitarized()
    }
}

/// Hermitian inner product of two rows, ⟨a, b⟩ = Σ āᵢ bᵢ.
fn inner(a: &[Complex64; 3], b: &[Complex64; 3]) -> Complex64 {
    let mut sum = Complex64::zero();
    for i in 0..3 {
        sum += a[i].conj() * b[i];
    }
    sum
}

impl Index<(usize, usize)> for Matrix3 {
    type Output = Complex64;

    fn index(&self, (i, j): (usize, usize)) -> &Complex64 {
        &self.0[i][j]
    }
}

impl IndexMut<(usize, usize)> for Matrix3 {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Complex64 {
        &mut self.0[i][j]
    }
}

impl Mul for Matrix3 {
    type Output = Matrix3;

    fn mul(self, rhs: Matrix3) -> Matrix3 {
        let mut out = Matrix3::zero();
        for i in 0..3 {
            for k in 0..3 {
                let a = self.0[i][k];
                for j in 0..3 {
                    out.0[i][j] += a * rhs.0[k][j];
                }
            }
        }
        out
    }
}

impl Add for Matrix3 {
    type Output = Matrix3;

    fn add(self, rhs: Matrix3) -> Matrix3 {
        let mut out = self;
        for i in 0..3 {
            for j in 0..3 {
                out.0[i][j] += rhs.0[i][j];
            }
        }
        out
    }
}

impl Sub for Matrix3 {
    type Output = Matrix3;

    fn sub(self, rhs: Matrix3) -> Matrix3 {
        let mut out = self;
        for i in 0..3 {
            for j in 0..3 {
                out.0[i][j] -= rhs.0[i][j];
            }
        }
        out
    }
}

/// SU(2) element (or a real multiple of one) in quaternion form:
/// `a₀·I + i·(a₁σ₁ + a₂σ₂ + a₃σ₃)` with real coefficients.
///
/// As a 2×2 matrix this reads
/// `[[a₀ + i·a₃, a₂ + i·a₁], [−a₂ + i·a₁, a₀ − i·a₃]]`,
/// and the coefficient norm equals √det, so unit quaternions are exactly
/// the SU(2) matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Su2 {
    pub a: [f64; 4],
}

impl Su2 {
    pub fn identity() -> Self {
        Su2 { a: [1.0, 0.0, 0.0, 0.0] }
    }

    pub fn new(a0: f64, a1: f64, a2: f64, a3: f64) -> Self {
        Su2 { a: [a0, a1, a2, a3] }
    }

    /// Quaternion product matching 2×2 matrix multiplication.
    ///
    /// The units `eₖ = iσₖ` square to −1 and satisfy `e₁e₂ = −e₃`, hence the
    /// sign of the cross term.
    pub fn mul(&self, rhs: &Su2) -> Su2 {
        let [a0, a1, a2, a3] = self.a;
        let [b0, b1, b2, b3] = rhs.a;
        Su2 {
            a: [
                a0 * b0 - a1 * b1 - a2 * b2 - a3 * b3,
                a0 * b1 + b0 * a1 - (a2 * b3 - a3 * b2),
                a0 * b2 + b0 * a2 - (a3 * b1 - a1 * b3),
                a0 * b3 + b0 * a3 - (a1 * b2 - a2 * b1),
            ],
        }
    }

    /// Conjugate (adjoint of the matrix form). Inverse for unit quaternions.
    pub fn conjugate(&self) -> Su2 {
        Su2 {
            a: [self.a[0], -self.a[1], -self.a[2], -self.a[3]],
        }
    }

    pub fn norm(&self) -> f64 {
        self.a.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    pub fn normalized(&self) -> Su2 {
        let n = self.norm();
        Su2 {
            a: [self.a[0] / n, self.a[1] / n, self.a[2] / n, self.a[3] / n],
        }
    }

    /// Scalar part of `self ⊗ conj(other)`; for unit quaternions this is
    /// `½ Re Tr(A B†)`.
    pub fn dot(&self, other: &Su2) -> f64 {
        self.a.iter().zip(other.a.iter()).map(|(x, y)| x * y).sum()
    }

    /// Haar-uniform SU(2) element: normalized 4D Gaussian.
    pub fn haar_random<R: Rng + ?Sized>(rng: &mut R) -> Su2 {
        loop {
            let q = Su2 {
                a: [
                    rng.sample(StandardNormal),
                    rng.sample(StandardNormal),
                    rng.sample(StandardNormal),
                    rng.sample(StandardNormal),
                ],
            };
            if q.norm() > 1e-12 {
                return q.normalized();
            }
        }
    }

    /// Project a complex 2×2 block onto the quaternion subspace.
    ///
    /// For any 2×2 complex W, the quaternion q returned here is the unique
    /// one with `Re Tr(A·W) = 2·(a₀q₀ − a·q)` for every quaternion A, which
    /// is all the heatbath weight sees of W. Returns (q/‖q‖, ‖q‖).
    pub fn project_block(
        w00: Complex64,
        w01: Complex64,
        w10: Complex64,
        w11: Complex64,
    ) -> (Su2, f64) {
        let q = Su2 {
            a: [
                0.5 * (w00.re + w11.re),
                0.5 * (w01.im + w10.im),
                0.5 * (w01.re - w10.re),
                0.5 * (w00.im - w11.im),
            ],
        };
        let k = q.norm();
        if k < f64::MIN_POSITIVE {
            (Su2::identity(), 0.0)
        } else {
            (q.normalized(), k)
        }
    }

    /// Embed into SU(3) as the identity outside rows/columns (i, j).
    pub fn embed(&self, i: usize, j: usize) -> Matrix3 {
        debug_assert!(i < j && j < 3);
        let [a0, a1, a2, a3] = self.a;
        let mut m = Matrix3::identity();
        m.0[i][i] = Complex64::new(a0, a3);
        m.0[i][j] = Complex64::new(a2, a1);
        m.0[j][i] = Complex64::new(-a2, a1);
        m.0[j][j] = Complex64::new(a0, -a3);
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_identity_is_multiplicative_unit() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let u = Matrix3::haar_random(&mut rng);
        assert!((u * Matrix3::identity()).max_abs_diff(&u) < 1e-15);
        assert!((Matrix3::identity() * u).max_abs_diff(&u) < 1e-15);
    }

    #[test]
    fn test_haar_random_is_special_unitary() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..50 {
            let u = Matrix3::haar_random(&mut rng);
            assert!(
                u.unitarity_deviation() < 1e-12,
                "U†U far from identity: {}",
                u.unitarity_deviation()
            );
            assert!(
                (u.determinant() - Complex64::one()).norm() < 1e-12,
                "determinant drifted from 1"
            );
        }
    }

    #[test]
    fn test_reunitarize_restores_perturbed_matrix() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let u = Matrix3::haar_random(&mut rng);
        let drifted = u.scale(1.0 + 1e-4);
        assert!(drifted.unitarity_deviation() > 1e-5);
        let restored = drifted.reunitarized();
        assert!(restored.unitarity_deviation() < 1e-12);
        assert!((restored.determinant() - Complex64::one()).norm() < 1e-12);
    }

    #[test]
    fn test_su2_mul_matches_matrix_product() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let p = Su2::haar_random(&mut rng);
        let q = Su2::haar_random(&mut rng);
        let lhs = p.mul(&q).embed(0, 1);
        let rhs = p.embed(0, 1) * q.embed(0, 1);
        assert!(lhs.max_abs_diff(&rhs) < 1e-14, "quaternion product disagrees with matrix product");
    }

    #[test]
    fn test_su2_conjugate_is_inverse() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let p = Su2::haar_random(&mut rng);
        let unit = p.mul(&p.conjugate());
        assert!((unit.a[0] - 1.0).abs() < 1e-14);
        for k in 1..4 {
            assert!(unit.a[k].abs() < 1e-14);
        }
    }

    #[test]
    fn test_embed_is_special_unitary() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let p = Su2::haar_random(&mut rng);
        for &(i, j) in &[(0, 1), (0, 2), (1, 2)] {
            let m = p.embed(i, j);
            assert!(m.unitarity_deviation() < 1e-14);
            assert!((m.determinant() - Complex64::one()).norm() < 1e-14);
        }
    }

    #[test]
    fn test_project_block_roundtrip() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let p = Su2::haar_random(&mut rng);
        let m = p.embed(0, 1);
        let (v, k) = Su2::project_block(m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)]);
        assert!((k - 1.0).abs() < 1e-14, "unit quaternion should project with k = 1");
        for i in 0..4 {
            assert!((v.a[i] - p.a[i]).abs() < 1e-14);
        }
    }

    #[test]
    fn test_determinant_of_product() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let u = Matrix3::haar_random(&mut rng);
        let v = Matrix3::haar_random(&mut rng);
        let lhs = (u * v).determinant();
        let rhs = u.determinant() * v.determinant();
        assert!((lhs - rhs).norm() < 1e-12);
    }
}
