//! Orchestration: drive D, Q and U application over chunks, spins and columns.

use num_complex::Complex64;

use crate::backend::NlBackend;
use crate::beta::BetaProjectors;
use crate::hubbard::UOperator;
use crate::linalg::{Matrix, NlScalar};
use crate::operator::NonLocalOperator;
use crate::spin::SpinRange;
use crate::wave_functions::WaveFunctions;

/// Apply the non-local parts of the Hamiltonian (D) and overlap (Q) operators.
///
/// The projector inner product `⟨β|φ⟩` dominates the cost, so it is computed
/// once per chunk and spinor component and shared between the D and the Q
/// application. The barrier after each inner product is a hard ordering
/// requirement: no `apply` may consume the matrix before it is resident.
pub fn apply_non_local_d_q<T: NlScalar, B: NlBackend>(
    backend: &B,
    spins: SpinRange,
    idx0: usize,
    n: usize,
    beta: &BetaProjectors<T>,
    phi: &WaveFunctions<T>,
    d_op: Option<&NonLocalOperator>,
    mut hphi: Option<&mut WaveFunctions<T>>,
    q_op: Option<&NonLocalOperator>,
    mut sphi: Option<&mut WaveFunctions<T>>,
) {
    assert_eq!(
        d_op.is_some(),
        hphi.is_some(),
        "D operator and its output block must be supplied together"
    );
    assert_eq!(
        q_op.is_some(),
        sphi.is_some(),
        "Q operator and its output block must be supplied together"
    );

    for ichunk in 0..beta.num_chunks() {
        for ispn in spins.iter() {
            let beta_phi = beta.inner(backend, ichunk, phi, ispn, idx0, n);
            backend.barrier();

            if let (Some(d), Some(h)) = (d_op, hphi.as_deref_mut()) {
                d.apply(backend, beta, ichunk, ispn, &beta_phi, h, idx0, n);
                if !d.is_diag() {
                    // off-diagonal block fed by the same input component
                    d.apply(backend, beta, ichunk, 2 + ispn, &beta_phi, h, idx0, n);
                }
            }
            if let (Some(q), Some(s)) = (q_op, sphi.as_deref_mut()) {
                q.apply(backend, beta, ichunk, ispn, &beta_phi, s, idx0, n);
            }
        }
    }
}

/// Apply the overlap operator `S = 1 + Σ_a |β⟩ Q_a ⟨β|`.
///
/// `sphi` is first overwritten with `phi` on the requested columns; an absent
/// Q operator (norm-conserving cell) degrades to that plain copy.
pub fn apply_s_operator<T: NlScalar, B: NlBackend>(
    backend: &B,
    spins: SpinRange,
    idx0: usize,
    n: usize,
    beta: &BetaProjectors<T>,
    phi: &WaveFunctions<T>,
    q_op: Option<&NonLocalOperator>,
    sphi: &mut WaveFunctions<T>,
) {
    for ispn in spins.iter() {
        sphi.copy_cols_from(phi, ispn, idx0, n);
    }
    if q_op.is_some() {
        apply_non_local_d_q(backend, spins, idx0, n, beta, phi, None, None, q_op, Some(sphi));
    }
}

/// Apply the Hubbard correction:
/// `hphi[:, idx0..idx0+n] += |w⟩ · U_channel · ⟨w|φ⟩` over the full orbital
/// manifold (not per-atom chunks, since U may eventually couple atoms).
pub fn apply_u_operator<B: NlBackend>(
    backend: &B,
    spins: SpinRange,
    idx0: usize,
    n: usize,
    hub_wf: &WaveFunctions<Complex64>,
    phi: &WaveFunctions<Complex64>,
    um: &UOperator,
    hphi: &mut WaveFunctions<Complex64>,
) {
    let nhwf = um.nhwf();
    if nhwf == 0 || n == 0 {
        return;
    }
    assert_eq!(hub_wf.num_rows(), phi.num_rows(), "basis sizes must match");
    assert_eq!(
        hub_wf.num_cols(),
        nhwf,
        "Hubbard wavefunction count must match the U manifold"
    );
    let num_rows = phi.num_rows();

    for ispn in spins.iter() {
        let mut dagger = Matrix::zeros(nhwf, n);
        backend.gemm_ct(
            nhwf,
            n,
            num_rows,
            hub_wf.component(0).as_slice(),
            num_rows,
            phi.component(ispn).cols_slice(idx0, n),
            num_rows,
            dagger.as_mut_slice(),
            nhwf,
        );
        backend.barrier();

        let channel = if um.num_channels() > 1 { ispn } else { 0 };
        let mut mixed = Matrix::zeros(nhwf, n);
        backend.gemm_acc(
            nhwf,
            n,
            nhwf,
            um.channel(channel).as_slice(),
            nhwf,
            dagger.as_slice(),
            nhwf,
            mixed.as_mut_slice(),
            nhwf,
        );
        backend.gemm_acc(
            num_rows,
            n,
            nhwf,
            hub_wf.component(0).as_slice(),
            num_rows,
            mixed.as_slice(),
            nhwf,
            hphi.component_mut(ispn).cols_slice_mut(idx0, n),
            num_rows,
        );
    }
}
