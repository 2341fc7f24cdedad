//! Rayon-parallel CPU backend for the pwnl operator kernels.
//!
//! Parallelism is over output columns: each worker owns a disjoint column
//! range of `C`, so concurrent accumulation into the same location never
//! occurs and no locking is needed.

use pwnl_core::backend::NlBackend;
use pwnl_core::linalg::NlScalar;
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        Self
    }
}

fn check_dims<A, B, C>(
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

impl NlBackend for CpuBackend {
    fn gemm_acc<T: NlScalar>(
        &self,
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
        check_dims(m, n, k, a, lda, b, ldb, c, ldc, m, k);
        c.par_chunks_mut(ldc)
            .zip(b.par_chunks(ldb))
            .take(n)
            .for_each(|(c_col, b_col)| {
                for p in 0..k {
                    let bv = b_col[p];
                    for i in 0..m {
                        c_col[i] += a[p * lda + i] * bv;
                    }
                }
            });
    }

    fn gemm_re_acc<T: NlScalar>(
        &self,
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
        check_dims(m, n, k, a, lda, b, ldb, c, ldc, m, k);
        c.par_chunks_mut(ldc)
            .zip(b.par_chunks(ldb))
            .take(n)
            .for_each(|(c_col, b_col)| {
                for p in 0..k {
                    let bv = b_col[p];
                    for i in 0..m {
                        c_col[i] += T::from_re(a[p * lda + i]) * bv;
                    }
                }
            });
    }

    fn gemm_ct<T: NlScalar>(
        &self,
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
        check_dims(m, n, k, a, lda, b, ldb, c, ldc, k, m);
        c.par_chunks_mut(ldc)
            .zip(b.par_chunks(ldb))
            .take(n)
            .for_each(|(c_col, b_col)| {
                for i in 0..m {
                    let mut acc = T::zero();
                    for p in 0..k {
                        acc += a[i * lda + p].conj() * b_col[p];
                    }
                    c_col[i] = acc;
                }
            });
    }
}
