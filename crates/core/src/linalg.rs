//! Column-major dense matrices and the serial gemm kernels used as backend defaults.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, Sub};

use num_complex::Complex64;
use num_traits::{One, Zero};

/// Scalar type of wavefunction coefficients and projector inner products.
///
/// The operator buffers themselves are real (D, Q) or `Complex64` (U); the
/// apply kernels are generic so that Gamma-point (real) and generic k-point
/// (complex) wavefunctions share one implementation.
pub trait NlScalar:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + AddAssign
    + 'static
{
    fn from_re(value: f64) -> Self;
    fn conj(self) -> Self;
    /// Modulus, used by tolerance checks.
    fn norm(self) -> f64;
}

impl NlScalar for f64 {
    fn from_re(value: f64) -> Self {
        value
    }

    fn conj(self) -> Self {
        self
    }

    fn norm(self) -> f64 {
        self.abs()
    }
}

impl NlScalar for Complex64 {
    fn from_re(value: f64) -> Self {
        Complex64::new(value, 0.0)
    }

    fn conj(self) -> Self {
        Complex64::conj(&self)
    }

    fn norm(self) -> f64 {
        Complex64::norm(self)
    }
}

/// Dense column-major matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: NlScalar> Matrix<T> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }

    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), rows * cols, "data length must match dimensions");
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn idx(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        col * self.rows + row
    }

    pub fn at(&self, row: usize, col: usize) -> T {
        self.data[self.idx(row, col)]
    }

    pub fn at_mut(&mut self, row: usize, col: usize) -> &mut T {
        let idx = self.idx(row, col);
        &mut self.data[idx]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn col(&self, col: usize) -> &[T] {
        self.cols_slice(col, 1)
    }

    /// Contiguous storage of columns `[col0, col0 + n)`.
    pub fn cols_slice(&self, col0: usize, n: usize) -> &[T] {
        assert!(col0 + n <= self.cols, "column range out of bounds");
        &self.data[col0 * self.rows..(col0 + n) * self.rows]
    }

    pub fn cols_slice_mut(&mut self, col0: usize, n: usize) -> &mut [T] {
        assert!(col0 + n <= self.cols, "column range out of bounds");
        &mut self.data[col0 * self.rows..(col0 + n) * self.rows]
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

fn check_gemm_dims<A, B, C>(
    m: usize,
    n: usize,
    k: usize,
    a: &[A],
    lda: usize,
    b: &[B],
    ldb: usize,
    c: &[C],
    ldc: usize,
    a_rows: usize,
    a_cols: usize,
) {
    assert!(
        lda >= a_rows && ldb >= k && ldc >= m,
        "leading dimensions too small"
    );
    assert!(a.len() >= (a_cols - 1) * lda + a_rows, "matrix A too short");
    assert!(b.len() >= (n - 1) * ldb + k, "matrix B too short");
    assert!(c.len() >= (n - 1) * ldc + m, "matrix C too short");
}

/// `C(m×n) += A(m×k)·B(k×n)`, all column-major with the given leading dimensions.
pub fn gemm_acc<T: NlScalar>(
    m: usize,
    n: usize,
    k: usize,
    a: &[T],
    lda: usize,
    b: &[T],
    ldb: usize,
    c: &mut [T],
    ldc: usize,
) {
    if m == 0 || n == 0 || k == 0 {
        return;
    }
    check_gemm_dims(m, n, k, a, lda, b, ldb, c, ldc, m, k);
    for j in 0..n {
        for p in 0..k {
            let bv = b[j * ldb + p];
            for i in 0..m {
                c[j * ldc + i] += a[p * lda + i] * bv;
            }
        }
    }
}

/// `C(m×n) += A(m×k)·B(k×n)` with a real-valued `A` block.
pub fn gemm_re_acc<T: NlScalar>(
    m: usize,
    n: usize,
    k: usize,
    a: &[f64],
    lda: usize,
    b: &[T],
    ldb: usize,
    c: &mut [T],
    ldc: usize,
) {
    if m == 0 || n == 0 || k == 0 {
        return;
    }
    check_gemm_dims(m, n, k, a, lda, b, ldb, c, ldc, m, k);
    for j in 0..n {
        for p in 0..k {
            let bv = b[j * ldb + p];
            for i in 0..m {
                c[j * ldc + i] += T::from_re(a[p * lda + i]) * bv;
            }
        }
    }
}

/// `C(m×n) = Aᴴ·B` where `A` is stored as `k×m`. Overwrites `C`.
pub fn gemm_ct<T: NlScalar>(
    m: usize,
    n: usize,
    k: usize,
    a: &[T],
    lda: usize,
    b: &[T],
    ldb: usize,
    c: &mut [T],
    ldc: usize,
) {
    if m == 0 || n == 0 {
        return;
    }
    if k == 0 {
        for j in 0..n {
            for i in 0..m {
                c[j * ldc + i] = T::zero();
            }
        }
        return;
    }
    check_gemm_dims(m, n, k, a, lda, b, ldb, c, ldc, k, m);
    for j in 0..n {
        for i in 0..m {
            let mut acc = T::zero();
            for p in 0..k {
                acc += a[i * lda + p].conj() * b[j * ldb + p];
            }
            c[j * ldc + i] = acc;
        }
    }
}
