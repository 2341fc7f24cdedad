//! Non-local operator engine: packed D and Q matrices and their application.

use crate::backend::NlBackend;
use crate::beta::{BetaProjectors, ChunkAtom};
use crate::context::{Context, ContextError, MemoryKind};
use crate::linalg::{Matrix, NlScalar};
use crate::mirror::Mirrored;
use crate::packed::PackedLayout;
use crate::spin::spin_block_components;
use crate::wave_functions::WaveFunctions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    D,
    Q,
}

/// Packed block-diagonal operator over the beta-projector basis.
///
/// Built once from the initialized context and immutable afterwards, apart
/// from the device mirror taken at construction when the processing unit is
/// `Device`. The sole mutating entry points are [`NonLocalOperator::apply`]
/// and [`NonLocalOperator::apply_atom`], and they mutate only the
/// caller-owned output block.
#[derive(Debug, Clone)]
pub struct NonLocalOperator {
    kind: OperatorKind,
    layout: PackedLayout,
    op: Mirrored<f64>,
    is_diag: bool,
}

impl NonLocalOperator {
    /// D operator: per-atom screened pseudopotential coefficients, one block
    /// per spin channel, consumed verbatim from the radial-integral producer.
    pub fn d(ctx: &Context) -> Result<Self, ContextError> {
        ctx.ensure_initialized()?;
        let uc = ctx.unit_cell();
        let num_blocks = ctx.num_spin_blocks();
        let dims: Vec<usize> = (0..uc.num_atoms()).map(|ia| uc.mt_basis_size(ia)).collect();
        let layout = PackedLayout::new(dims, num_blocks);

        let mut buf = vec![0.0; layout.packed_size()];
        for ia in 0..uc.num_atoms() {
            let nbf = layout.block_dim(ia);
            let d_mtrx = &uc.atom(ia).d_mtrx;
            for ispn in 0..num_blocks {
                let range = layout.block_range(ispn, ia);
                buf[range].copy_from_slice(&d_mtrx[ispn * nbf * nbf..(ispn + 1) * nbf * nbf]);
            }
        }

        Ok(Self::finish(
            OperatorKind::D,
            layout,
            buf,
            ctx.num_mag_dims() != 3,
            ctx.processing_unit(),
        ))
    }

    /// Q operator: type-level augmentation coefficients, spin-independent.
    /// The same values are replicated into every diagonal spin block; species
    /// without augmentation contribute a zero-sized block.
    pub fn q(ctx: &Context) -> Result<Self, ContextError> {
        ctx.ensure_initialized()?;
        let uc = ctx.unit_cell();
        let num_blocks = ctx.num_spins();
        let dims: Vec<usize> = (0..uc.num_atoms())
            .map(|ia| {
                let atom_type = uc.atom_type(ia);
                if atom_type.augment() {
                    atom_type.mt_basis_size
                } else {
                    0
                }
            })
            .collect();
        let layout = PackedLayout::new(dims, num_blocks);

        let mut buf = vec![0.0; layout.packed_size()];
        for ia in 0..uc.num_atoms() {
            let nbf = layout.block_dim(ia);
            if nbf == 0 {
                continue;
            }
            let q_coeffs = uc
                .atom_type(ia)
                .q_coeffs
                .as_deref()
                .unwrap_or(&[]);
            for ispn in 0..num_blocks {
                let range = layout.block_range(ispn, ia);
                buf[range].copy_from_slice(q_coeffs);
            }
        }

        Ok(Self::finish(
            OperatorKind::Q,
            layout,
            buf,
            true,
            ctx.processing_unit(),
        ))
    }

    fn finish(
        kind: OperatorKind,
        layout: PackedLayout,
        buf: Vec<f64>,
        is_diag: bool,
        pu: MemoryKind,
    ) -> Self {
        let mut op = Mirrored::new(buf);
        if pu == MemoryKind::Device {
            op.sync_to_device();
        }
        Self {
            kind,
            layout,
            op,
            is_diag,
        }
    }

    pub fn kind(&self) -> OperatorKind {
        self.kind
    }

    /// Whether the operator is diagonal in spin; when `false`, callers must
    /// also iterate the off-diagonal spin blocks.
    pub fn is_diag(&self) -> bool {
        self.is_diag
    }

    pub fn num_spin_blocks(&self) -> usize {
        self.layout.num_spin_blocks()
    }

    pub fn packed_size(&self) -> usize {
        self.layout.packed_size()
    }

    pub fn layout(&self) -> &PackedLayout {
        &self.layout
    }

    pub fn buffer(&self) -> &Mirrored<f64> {
        &self.op
    }

    /// Matrix element for basis pair `(xi1, xi2)` of atom `ia` in spin block
    /// `ispn`. Out-of-range indices are a fatal precondition failure.
    pub fn value(&self, xi1: usize, xi2: usize, ispn: usize, ia: usize) -> f64 {
        self.op.host()[self.layout.index(xi1, xi2, ispn, ia)]
    }

    /// Packed `n×n` block of atom `ia` for one spin block (column-major).
    pub fn block(&self, ispn: usize, ia: usize) -> &[f64] {
        &self.op.host()[self.layout.block_range(ispn, ia)]
    }

    /// Apply this operator for one chunk and spin block:
    /// `op_phi[:, idx0..idx0+n] += Σ_atoms |β_a⟩ · (M_a · P_a)`, where `P` is
    /// the precomputed inner-product matrix for the block's input component.
    pub fn apply<T: NlScalar, B: NlBackend>(
        &self,
        backend: &B,
        beta: &BetaProjectors<T>,
        ichunk: usize,
        ispn_block: usize,
        beta_phi: &Matrix<T>,
        op_phi: &mut WaveFunctions<T>,
        idx0: usize,
        n: usize,
    ) {
        assert!(
            ispn_block < self.layout.num_spin_blocks(),
            "spin block {ispn_block} out of range ({} blocks)",
            self.layout.num_spin_blocks()
        );
        let chunk = beta.chunk(ichunk);
        assert_eq!(
            beta_phi.rows(),
            chunk.num_beta,
            "inner-product rows must match the chunk's projector count"
        );
        assert_eq!(beta_phi.cols(), n, "inner-product columns must match the band count");
        if n == 0 || chunk.num_beta == 0 {
            return;
        }

        let mut work = Matrix::<T>::zeros(chunk.num_beta, n);
        for atom in &chunk.atoms {
            self.accumulate_block(backend, atom, ispn_block, beta_phi, &mut work, n);
        }
        self.project_out(backend, beta, ichunk, ispn_block, &work, op_phi, idx0, n);
    }

    /// Single-atom variant of [`NonLocalOperator::apply`], isolating atom
    /// `ia`'s contribution (per-atom decompositions such as force and stress
    /// derivatives).
    pub fn apply_atom<T: NlScalar, B: NlBackend>(
        &self,
        backend: &B,
        beta: &BetaProjectors<T>,
        ichunk: usize,
        ia: usize,
        ispn_block: usize,
        beta_phi: &Matrix<T>,
        op_phi: &mut WaveFunctions<T>,
        idx0: usize,
        n: usize,
    ) {
        let chunk = beta.chunk(ichunk);
        assert_eq!(beta_phi.rows(), chunk.num_beta);
        assert_eq!(beta_phi.cols(), n);
        let atom = match chunk.atoms.iter().find(|a| a.ia == ia) {
            Some(atom) => atom.clone(),
            None => panic!("atom {ia} is not part of chunk {ichunk}"),
        };
        if n == 0 || atom.nbf == 0 {
            return;
        }

        let dim = self.layout.block_dim(atom.ia);
        if dim == 0 {
            return;
        }
        let mut work = Matrix::<T>::zeros(atom.nbf, n);
        backend.gemm_re_acc(
            dim,
            n,
            dim,
            self.block(ispn_block, atom.ia),
            dim,
            &beta_phi.as_slice()[atom.offset..],
            chunk.num_beta,
            work.as_mut_slice(),
            atom.nbf,
        );

        let (out_comp, _) = spin_block_components(ispn_block);
        assert!(out_comp < op_phi.num_components(), "output spin component missing");
        assert_eq!(op_phi.num_rows(), beta.num_rows());
        let num_rows = beta.num_rows();
        backend.gemm_acc(
            num_rows,
            n,
            atom.nbf,
            beta.pw_coeffs(ichunk).cols_slice(atom.offset, atom.nbf),
            num_rows,
            work.as_slice(),
            atom.nbf,
            op_phi.component_mut(out_comp).cols_slice_mut(idx0, n),
            num_rows,
        );
    }

    /// `work[offset..offset+nbf, :] += M_a · beta_phi[offset..offset+nbf, :]`.
    fn accumulate_block<T: NlScalar, B: NlBackend>(
        &self,
        backend: &B,
        atom: &ChunkAtom,
        ispn_block: usize,
        beta_phi: &Matrix<T>,
        work: &mut Matrix<T>,
        n: usize,
    ) {
        let dim = self.layout.block_dim(atom.ia);
        if dim == 0 {
            // species without data for this operator; contributes nothing
            return;
        }
        assert_eq!(
            dim, atom.nbf,
            "atom {}: inner-product block size does not match declared basis size",
            atom.ia
        );
        let ld = beta_phi.rows();
        backend.gemm_re_acc(
            dim,
            n,
            dim,
            self.block(ispn_block, atom.ia),
            dim,
            &beta_phi.as_slice()[atom.offset..],
            ld,
            &mut work.as_mut_slice()[atom.offset..],
            ld,
        );
    }

    /// `op_phi[:, idx0..idx0+n] += |β_chunk⟩ · work`.
    fn project_out<T: NlScalar, B: NlBackend>(
        &self,
        backend: &B,
        beta: &BetaProjectors<T>,
        ichunk: usize,
        ispn_block: usize,
        work: &Matrix<T>,
        op_phi: &mut WaveFunctions<T>,
        idx0: usize,
        n: usize,
    ) {
        let (out_comp, _) = spin_block_components(ispn_block);
        assert!(out_comp < op_phi.num_components(), "output spin component missing");
        assert_eq!(op_phi.num_rows(), beta.num_rows());
        let num_rows = beta.num_rows();
        let chunk = beta.chunk(ichunk);
        backend.gemm_acc(
            num_rows,
            n,
            chunk.num_beta,
            beta.pw_coeffs(ichunk).as_slice(),
            num_rows,
            work.as_slice(),
            chunk.num_beta,
            op_phi.component_mut(out_comp).cols_slice_mut(idx0, n),
            num_rows,
        );
    }
}
