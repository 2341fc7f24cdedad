//! Backend trait for the dense kernels driving operator application.
//!
//! The defaults are straightforward serial loops; `pwnl-backend-cpu`
//! overrides them with rayon-parallel versions that give each worker a
//! disjoint range of output columns, so no locking is ever needed.

use crate::context::MemoryKind;
use crate::linalg::{self, NlScalar};

pub trait NlBackend {
    /// Memory space device-side consumers read operator buffers from.
    /// `Device` makes operator construction take a mirrored snapshot of the
    /// packed buffer.
    fn memory_kind(&self) -> MemoryKind {
        MemoryKind::Host
    }

    /// Hard barrier: every kernel issued so far must have completed before
    /// this returns. Inner products are synchronized through this before any
    /// `apply` consumes them.
    fn barrier(&self) {}

    /// `C(m×n) += A(m×k)·B(k×n)`, column-major with leading dimensions.
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
        linalg::gemm_acc(m, n, k, a, lda, b, ldb, c, ldc);
    }

    /// `C(m×n) += A(m×k)·B(k×n)` with a real-valued `A` (packed D/Q block).
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
        linalg::gemm_re_acc(m, n, k, a, lda, b, ldb, c, ldc);
    }

    /// `C(m×n) = Aᴴ·B` with `A` stored `k×m`; the projector inner product.
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
        linalg::gemm_ct(m, n, k, a, lda, b, ldb, c, ldc);
    }
}
